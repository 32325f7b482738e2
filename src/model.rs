// src/model.rs
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::RouteError;

/// プレースホルダ名 → 値 のマッピング (順序付きで比較・出力が安定する)
pub type Params = BTreeMap<String, String>;

/// クライアントが描画するビュー (コンポーネント) の一覧
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum View {
    Home,
    Studies,
    Groups,
    Individuals,
    Interventions,
    Outputs,
    Timecourses,
    References,
    About,
    Account,
    StudyDetail,
    TimecourseDetail,
}

impl View {
    pub const ALL: [View; 12] = [
        View::Home,
        View::Studies,
        View::Groups,
        View::Individuals,
        View::Interventions,
        View::Outputs,
        View::Timecourses,
        View::References,
        View::About,
        View::Account,
        View::StudyDetail,
        View::TimecourseDetail,
    ];

    /// コンポーネントの識別子 (import 時のローカル名)
    pub fn as_str(self) -> &'static str {
        match self {
            View::Home => "Home",
            View::Studies => "Studies",
            View::Groups => "Groups",
            View::Individuals => "Individuals",
            View::Interventions => "Interventions",
            View::Outputs => "Outputs",
            View::Timecourses => "Timecourses",
            View::References => "References",
            View::About => "About",
            View::Account => "Account",
            View::StudyDetail => "StudyDetail",
            View::TimecourseDetail => "TimecourseDetail",
        }
    }

    /// クライアント側で import されるモジュール指定子
    /// 例: `@/components/detail/StudyDetail`
    pub fn module(self) -> &'static str {
        match self {
            View::Home => "@/components/Home",
            View::Studies => "@/components/Studies",
            View::Groups => "@/components/Groups",
            View::Individuals => "@/components/Individuals",
            View::Interventions => "@/components/Interventions",
            View::Outputs => "@/components/Outputs",
            View::Timecourses => "@/components/Timecourses",
            View::References => "@/components/References",
            View::About => "@/components/About",
            View::Account => "@/components/auth/Account",
            View::StudyDetail => "@/components/detail/StudyDetail",
            View::TimecourseDetail => "@/components/detail/TimecourseDetail",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for View {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        View::ALL
            .into_iter()
            .find(|view| view.as_str() == s)
            .ok_or_else(|| RouteError::UnknownView(s.to_string()))
    }
}

/// パス・名前とビューの対応付け
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    /// パスパターン (例: "/studies", "/studies/:id")
    pub path: String,

    /// プログラム的なナビゲーションに使うシンボル名
    pub name: String,

    pub view: View,

    /// true の場合、プレースホルダの値をビューの入力プロパティとして渡す
    pub props: bool,
}

impl Route {
    pub fn new(path: impl Into<String>, name: impl Into<String>, view: View, props: bool) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            view,
            props,
        }
    }
}

/// `resolve` の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,

    /// パスから取り出したプレースホルダの値 (デコード済み)
    pub params: Params,

    /// `?` 以降のクエリ文字列
    #[serde(skip_serializing_if = "Params::is_empty")]
    pub query: Params,
}

impl RouteMatch<'_> {
    pub fn view(&self) -> View {
        self.route.view
    }

    /// ビューに入力プロパティとして渡す値。
    /// `props` が false のルートでは None (ビュー自身がパスを解釈する)。
    pub fn props(&self) -> Option<&Params> {
        self.route.props.then_some(&self.params)
    }
}

/// vue-router 定義ファイルから抽出した 1 ルート分の情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDef {
    pub path: Option<String>,

    pub name: Option<String>,

    /// `component:` に指定された識別子
    /// `() => import("…")` の場合は指定子のファイル名部分
    pub component: Option<String>,

    /// コンポーネントの import 指定子 (例: "@/components/Home")
    pub module: Option<String>,

    pub props: bool,

    /// `children` を持つかどうか (ネストしたルートはサポート外)
    pub has_children: bool,

    /// このルート定義が書かれているソースファイルへのパス
    pub source_file: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_round_trips_through_identifier() {
        for view in View::ALL {
            assert_eq!(view.as_str().parse::<View>(), Ok(view));
        }
    }

    #[test]
    fn unknown_identifier_is_rejected() {
        assert_eq!(
            "Dashboard".parse::<View>(),
            Err(RouteError::UnknownView("Dashboard".into()))
        );
    }

    #[test]
    fn props_only_forwarded_when_enabled() {
        let detail = Route::new("/studies/:id", "StudyDetail", View::StudyDetail, true);
        let list = Route::new("/studies", "Studies", View::Studies, false);
        let params: Params = [("id".to_string(), "42".to_string())].into();

        let m = RouteMatch { route: &detail, params: params.clone(), query: Params::new() };
        assert_eq!(m.props(), Some(&params));

        let m = RouteMatch { route: &list, params: Params::new(), query: Params::new() };
        assert_eq!(m.props(), None);
    }
}
