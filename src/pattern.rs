// src/pattern.rs
use std::fmt;

use crate::error::RouteError;
use crate::model::Params;

/// パスパターンを構成する 1 セグメント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// 固定文字列 (例: "studies")
    Static(String),
    /// 名前付きプレースホルダ (例: ":id" → "id")
    Param(String),
}

/// コンパイル済みのパスパターン
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// "/studies/:id" のようなパターン文字列を解析する。
    ///
    /// - 先頭は必ず '/'
    /// - 空セグメント (連続した '/' や末尾の '/') は不可
    /// - プレースホルダは 1 つまで
    pub fn parse(raw: &str) -> Result<Self, RouteError> {
        let invalid = |reason: &str| RouteError::InvalidPattern {
            pattern: raw.to_string(),
            reason: reason.to_string(),
        };

        let Some(rest) = raw.strip_prefix('/') else {
            return Err(invalid("must start with '/'"));
        };

        let mut segments = Vec::new();
        if !rest.is_empty() {
            for part in rest.split('/') {
                if part.is_empty() {
                    return Err(invalid("empty segment"));
                }
                match part.strip_prefix(':') {
                    Some(name) => {
                        if !is_param_name(name) {
                            return Err(invalid("placeholder name must be an identifier"));
                        }
                        segments.push(Segment::Param(name.to_string()));
                    }
                    None => segments.push(Segment::Static(part.to_string())),
                }
            }
        }

        let placeholders = segments
            .iter()
            .filter(|s| matches!(s, Segment::Param(_)))
            .count();
        if placeholders > 1 {
            return Err(invalid("at most one placeholder is supported"));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// プレースホルダ名 (なければ None)
    pub fn placeholder(&self) -> Option<&str> {
        self.segments.iter().find_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Static(_) => None,
        })
    }

    /// 固定セグメントの数。大きいほど具体的なパターン。
    pub fn specificity(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Static(_)))
            .count()
    }

    /// 分割済みのパスセグメントと照合し、マッチすればプレースホルダの値を返す
    pub fn match_segments(&self, parts: &[&str]) -> Option<Params> {
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = Params::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Static(text) => {
                    if text != part {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if part.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), decode(part));
                }
            }
        }
        Some(params)
    }

    /// プレースホルダに値を埋め込んで具体的なパスを組み立てる
    pub fn build(&self, route: &str, params: &Params) -> Result<String, RouteError> {
        if self.segments.is_empty() {
            return Ok("/".to_string());
        }

        let mut path = String::new();
        for segment in &self.segments {
            path.push('/');
            match segment {
                Segment::Static(text) => path.push_str(text),
                Segment::Param(name) => {
                    let value = params
                        .get(name)
                        .filter(|v| !v.is_empty())
                        .ok_or_else(|| RouteError::MissingParameter {
                            route: route.to_string(),
                            param: name.clone(),
                        })?;
                    path.push_str(&urlencoding::encode(value));
                }
            }
        }
        Ok(path)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// 具体的なパスをセグメントに分割する。
/// 末尾の '/' は 1 つだけ無視する ("/studies/" → ["studies"])。
/// "//" は空セグメント 1 つとして扱い、ルートにはマッチしない。
pub fn split_path(path: &str) -> Option<Vec<&str>> {
    let rest = path.strip_prefix('/')?;
    if rest.is_empty() {
        return Some(Vec::new());
    }
    let rest = rest.strip_suffix('/').unwrap_or(rest);
    Some(rest.split('/').collect())
}

fn is_param_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn decode(part: &str) -> String {
    urlencoding::decode(part)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| part.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_static_and_param_segments() {
        let p = PathPattern::parse("/studies/:id").unwrap();
        assert_eq!(
            p.segments(),
            &[Segment::Static("studies".into()), Segment::Param("id".into())]
        );
        assert_eq!(p.placeholder(), Some("id"));
        assert_eq!(p.specificity(), 1);

        let root = PathPattern::parse("/").unwrap();
        assert!(root.segments().is_empty());
        assert_eq!(root.placeholder(), None);
    }

    #[test]
    fn rejects_malformed_patterns() {
        for raw in ["studies", "/studies/", "//x", "/a/:", "/a/:1x", "/:a/:b"] {
            assert!(
                matches!(PathPattern::parse(raw), Err(RouteError::InvalidPattern { .. })),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn matches_only_same_segment_count() {
        let p = PathPattern::parse("/timecourses/:id").unwrap();
        assert_eq!(p.match_segments(&["timecourses", "7"]).unwrap()["id"], "7");
        assert!(p.match_segments(&["timecourses"]).is_none());
        assert!(p.match_segments(&["timecourses", "7", "x"]).is_none());
        assert!(p.match_segments(&["timecourses", ""]).is_none());
        assert!(p.match_segments(&["studies", "7"]).is_none());
    }

    #[test]
    fn decodes_and_encodes_values() {
        let p = PathPattern::parse("/studies/:id").unwrap();
        let params = p.match_segments(&["studies", "PKDB%2000001"]).unwrap();
        assert_eq!(params["id"], "PKDB 00001");
        assert_eq!(p.build("StudyDetail", &params).unwrap(), "/studies/PKDB%2000001");
    }

    #[test]
    fn build_requires_non_empty_value() {
        let p = PathPattern::parse("/studies/:id").unwrap();
        let params: Params = [("id".to_string(), String::new())].into();
        assert_eq!(
            p.build("StudyDetail", &params),
            Err(RouteError::MissingParameter {
                route: "StudyDetail".into(),
                param: "id".into()
            })
        );
    }

    #[test]
    fn split_path_ignores_one_trailing_slash() {
        assert_eq!(split_path("/"), Some(vec![]));
        assert_eq!(split_path("/studies/"), Some(vec!["studies"]));
        assert_eq!(split_path("/studies/42"), Some(vec!["studies", "42"]));
        assert_eq!(split_path("studies"), None);
        assert_eq!(split_path("//"), Some(vec![""]));
    }
}
