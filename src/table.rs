// src/table.rs
use std::collections::hash_map::Entry as MapEntry;
use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::error::RouteError;
use crate::model::{Params, Route, RouteDef, RouteMatch, View};
use crate::pattern::{PathPattern, split_path};

/// PK-DB クライアントのルート定義 (path, name, view, props)
pub const PKDB_ROUTES: [(&str, &str, View, bool); 12] = [
    ("/", "Home", View::Home, false),
    ("/studies", "Studies", View::Studies, false),
    ("/groups", "Groups", View::Groups, false),
    ("/individuals", "Individuals", View::Individuals, false),
    ("/interventions", "Interventions", View::Interventions, false),
    ("/outputs", "Outputs", View::Outputs, false),
    ("/timecourses", "Timecourses", View::Timecourses, false),
    ("/references", "References", View::References, false),
    ("/about", "About", View::About, false),
    ("/account", "Account", View::Account, false),
    ("/studies/:id", "StudyDetail", View::StudyDetail, true),
    ("/timecourses/:id", "TimecourseDetail", View::TimecourseDetail, true),
];

/// ナビゲーション先の指定方法
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// 具体的なパス (例: "/studies/42")
    Path(String),
    /// シンボル名 + プレースホルダの値
    Named { name: String, params: Params },
}

#[derive(Debug, Clone)]
struct Entry {
    route: Route,
    pattern: PathPattern,
}

/// 起動時に一度だけ構築される不変のルートテーブル
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<Entry>,
    by_name: HashMap<String, usize>,
}

impl RouteTable {
    /// ルート一覧からテーブルを構築する。
    /// パターンの妥当性と name / path の一意性をここで検査する。
    pub fn new(routes: Vec<Route>) -> Result<Self, RouteError> {
        let mut entries = Vec::with_capacity(routes.len());
        let mut by_name = HashMap::with_capacity(routes.len());
        let mut paths = HashSet::with_capacity(routes.len());

        for route in routes {
            let pattern = PathPattern::parse(&route.path)?;

            match by_name.entry(route.name.clone()) {
                MapEntry::Occupied(_) => return Err(RouteError::DuplicateName(route.name)),
                MapEntry::Vacant(slot) => {
                    slot.insert(entries.len());
                }
            }
            if !paths.insert(route.path.clone()) {
                return Err(RouteError::DuplicatePath(route.path));
            }

            trace!(name = %route.name, path = %route.path, view = %route.view, "ルート登録");
            entries.push(Entry { route, pattern });
        }

        debug!(routes = entries.len(), "ルートテーブル構築完了");
        Ok(Self { entries, by_name })
    }

    /// PK-DB クライアントの標準ルートテーブル
    pub fn pkdb() -> Result<Self, RouteError> {
        let routes = PKDB_ROUTES
            .iter()
            .map(|&(path, name, view, props)| Route::new(path, name, view, props))
            .collect();
        Self::new(routes)
    }

    /// vue-router 定義ファイルから抽出したルートでテーブルを構築する
    pub fn from_definitions(defs: &[RouteDef]) -> Result<Self, RouteError> {
        let mut routes = Vec::with_capacity(defs.len());
        for def in defs {
            let path = def.path.clone().ok_or_else(|| {
                let label = def.name.as_deref().or(def.component.as_deref());
                RouteError::MissingPath(label.unwrap_or("<anonymous>").to_string())
            })?;
            let component = def.component.as_deref().unwrap_or_default();
            let view: View = component.parse()?;
            // name が省略されている場合はコンポーネント名で代用する
            let name = def.name.clone().unwrap_or_else(|| view.as_str().to_string());
            routes.push(Route::new(path, name, view, def.props));
        }
        Self::new(routes)
    }

    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.entries.iter().map(|e| &e.route)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Route> {
        self.by_name.get(name).map(|&i| &self.entries[i].route)
    }

    /// 具体的なパスをルートに解決する。
    ///
    /// 固定セグメントの多いパターンが優先される。同点の場合は先に登録されたルート。
    /// `?query` と `#fragment` は照合前に取り除き、クエリは `RouteMatch::query` に入る。
    pub fn resolve(&self, path: &str) -> Result<RouteMatch<'_>, RouteError> {
        let not_found = || RouteError::NotFound {
            path: path.to_string(),
        };

        let without_hash = path.split_once('#').map_or(path, |(p, _)| p);
        let (pathname, query) = match without_hash.split_once('?') {
            Some((p, q)) => (p, parse_query(q)),
            None => (without_hash, Params::new()),
        };

        let parts = split_path(pathname).ok_or_else(not_found)?;

        let mut best: Option<(&Entry, Params)> = None;
        for entry in &self.entries {
            if let Some(params) = entry.pattern.match_segments(&parts) {
                let better = best
                    .as_ref()
                    .is_none_or(|(b, _)| entry.pattern.specificity() > b.pattern.specificity());
                if better {
                    best = Some((entry, params));
                }
            }
        }

        let (entry, params) = best.ok_or_else(not_found)?;
        debug!(path, route = %entry.route.name, "パス解決");
        Ok(RouteMatch {
            route: &entry.route,
            params,
            query,
        })
    }

    /// シンボル名とプレースホルダの値から具体的なパスを組み立てる
    pub fn href(&self, name: &str, params: &Params) -> Result<String, RouteError> {
        let &index = self
            .by_name
            .get(name)
            .ok_or_else(|| RouteError::UnknownRoute(name.to_string()))?;
        let entry = &self.entries[index];
        entry.pattern.build(&entry.route.name, params)
    }

    /// パス指定・名前指定のどちらからでもルートを解決する。
    /// 名前指定の場合は、より具体的なルートがあっても指定されたルートを返す。
    pub fn navigate(&self, location: &Location) -> Result<RouteMatch<'_>, RouteError> {
        let (name, params) = match location {
            Location::Path(path) => return self.resolve(path),
            Location::Named { name, params } => (name, params),
        };

        let path = self.href(name, params)?;
        let entry = &self.entries[self.by_name[name.as_str()]];
        let not_found = || RouteError::NotFound { path: path.clone() };
        let parts = split_path(&path).ok_or_else(not_found)?;
        let params = entry.pattern.match_segments(&parts).ok_or_else(not_found)?;

        debug!(path = %path, route = %entry.route.name, "名前指定で解決");
        Ok(RouteMatch {
            route: &entry.route,
            params,
            query: Params::new(),
        })
    }
}

fn parse_query(query: &str) -> Params {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(s: &str) -> String {
    urlencoding::decode(s)
        .map(|c| c.into_owned())
        .unwrap_or_else(|_| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn literal_paths_resolve_to_themselves() {
        let table = RouteTable::pkdb().unwrap();
        for (path, name, view, _) in PKDB_ROUTES.iter().filter(|r| !r.0.contains(':')) {
            let m = table.resolve(path).unwrap();
            assert_eq!(m.route.path, *path);
            assert_eq!(m.route.name, *name);
            assert_eq!(m.view(), *view);
            assert!(m.params.is_empty());
        }
    }

    #[test]
    fn detail_paths_bind_id() {
        let table = RouteTable::pkdb().unwrap();

        let m = table.resolve("/studies/42").unwrap();
        assert_eq!(m.route.name, "StudyDetail");
        assert_eq!(m.params, params(&[("id", "42")]));
        assert_eq!(m.props(), Some(&params(&[("id", "42")])));

        let m = table.resolve("/timecourses/7").unwrap();
        assert_eq!(m.view(), View::TimecourseDetail);
        assert_eq!(m.params, params(&[("id", "7")]));
    }

    #[test]
    fn unknown_paths_are_not_found() {
        let table = RouteTable::pkdb().unwrap();
        for path in ["/does-not-exist", "/studies/1/2", "studies", "", "/groups/3", "//", "//?x"] {
            assert_eq!(
                table.resolve(path),
                Err(RouteError::NotFound { path: path.to_string() })
            );
        }
    }

    #[test]
    fn static_segment_beats_placeholder() {
        let table = RouteTable::new(vec![
            Route::new("/studies/:id", "StudyDetail", View::StudyDetail, true),
            Route::new("/studies/new", "NewStudy", View::Studies, false),
        ])
        .unwrap();
        assert_eq!(table.resolve("/studies/new").unwrap().route.name, "NewStudy");
        assert_eq!(table.resolve("/studies/new2").unwrap().route.name, "StudyDetail");
    }

    #[test]
    fn query_and_fragment_are_split_off() {
        let table = RouteTable::pkdb().unwrap();
        let m = table.resolve("/studies/9?tab=groups&q=a%20b#top").unwrap();
        assert_eq!(m.route.name, "StudyDetail");
        assert_eq!(m.params, params(&[("id", "9")]));
        assert_eq!(m.query, params(&[("q", "a b"), ("tab", "groups")]));

        assert_eq!(table.resolve("/studies/").unwrap().route.name, "Studies");
        assert_eq!(table.resolve("/?x").unwrap().route.name, "Home");
    }

    #[test]
    fn href_builds_concrete_paths() {
        let table = RouteTable::pkdb().unwrap();
        assert_eq!(table.href("StudyDetail", &params(&[("id", "9")])).unwrap(), "/studies/9");
        assert_eq!(table.href("Home", &Params::new()).unwrap(), "/");
        assert_eq!(
            table.href("About", &params(&[("id", "ignored")])).unwrap(),
            "/about"
        );
    }

    #[test]
    fn href_reports_missing_parameter_and_unknown_route() {
        let table = RouteTable::pkdb().unwrap();
        assert_eq!(
            table.href("StudyDetail", &Params::new()),
            Err(RouteError::MissingParameter {
                route: "StudyDetail".into(),
                param: "id".into()
            })
        );
        assert_eq!(
            table.href("Nope", &Params::new()),
            Err(RouteError::UnknownRoute("Nope".into()))
        );
    }

    #[test]
    fn navigate_accepts_both_location_kinds() {
        let table = RouteTable::pkdb().unwrap();
        let by_name = table
            .navigate(&Location::Named {
                name: "TimecourseDetail".into(),
                params: params(&[("id", "tc/1")]),
            })
            .unwrap();
        assert_eq!(by_name.route.name, "TimecourseDetail");
        assert_eq!(by_name.params, params(&[("id", "tc/1")]));

        let by_path = table.navigate(&Location::Path("/outputs".into())).unwrap();
        assert_eq!(by_path.view(), View::Outputs);
    }

    #[test]
    fn named_navigation_keeps_the_named_route() {
        let table = RouteTable::new(vec![
            Route::new("/studies/:id", "StudyDetail", View::StudyDetail, true),
            Route::new("/studies/new", "NewStudy", View::Studies, false),
        ])
        .unwrap();

        let m = table
            .navigate(&Location::Named {
                name: "StudyDetail".into(),
                params: params(&[("id", "new")]),
            })
            .unwrap();
        assert_eq!(m.route.name, "StudyDetail");
        assert_eq!(m.params, params(&[("id", "new")]));

        // パス指定では固定セグメントのルートが優先される
        let m = table.navigate(&Location::Path("/studies/new".into())).unwrap();
        assert_eq!(m.route.name, "NewStudy");
    }

    #[test]
    fn definition_without_path_names_the_route() {
        let def = RouteDef {
            path: None,
            name: Some("About".into()),
            component: Some("About".into()),
            module: None,
            props: false,
            has_children: false,
            source_file: "src/router/index.js".into(),
        };
        assert_eq!(
            RouteTable::from_definitions(&[def]).unwrap_err(),
            RouteError::MissingPath("About".into())
        );
    }

    #[test]
    fn construction_rejects_duplicates() {
        let dup_name = RouteTable::new(vec![
            Route::new("/a", "A", View::Home, false),
            Route::new("/b", "A", View::About, false),
        ]);
        assert_eq!(dup_name.unwrap_err(), RouteError::DuplicateName("A".into()));

        let dup_path = RouteTable::new(vec![
            Route::new("/a", "A", View::Home, false),
            Route::new("/a", "B", View::About, false),
        ]);
        assert_eq!(dup_path.unwrap_err(), RouteError::DuplicatePath("/a".into()));
    }

    #[test]
    fn table_is_unique_and_complete() {
        let table = RouteTable::pkdb().unwrap();
        assert_eq!(table.len(), 12);

        let mut names: Vec<_> = table.routes().map(|r| r.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 12);

        let mut paths: Vec<_> = table.routes().map(|r| r.path.as_str()).collect();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), 12);

        let props: Vec<_> = table.routes().filter(|r| r.props).map(|r| r.view).collect();
        assert_eq!(props, vec![View::StudyDetail, View::TimecourseDetail]);
    }

    #[test]
    fn resolve_is_idempotent() {
        let table = RouteTable::pkdb().unwrap();
        for path in ["/", "/studies/42", "/missing"] {
            assert_eq!(table.resolve(path), table.resolve(path));
        }
    }
}
