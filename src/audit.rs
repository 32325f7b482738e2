// src/audit.rs
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::SourceError;
use crate::model::{RouteDef, View};
use crate::parser::parse_routes_in_file;
use crate::resolver::{find_router_files, resolve_component_path, source_root_for};
use crate::table::RouteTable;

/// ソース上のルート定義とルートテーブルの差異
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    /// テーブルにあるがソースにないルート
    MissingRoute { name: String },
    /// ソースにあるがテーブルにないルート
    UnexpectedRoute {
        name: String,
        path: Option<String>,
        source_file: PathBuf,
    },
    PathMismatch {
        name: String,
        expected: String,
        found: Option<String>,
    },
    ViewMismatch {
        name: String,
        expected: View,
        found: Option<String>,
    },
    PropsMismatch {
        name: String,
        expected: bool,
        found: bool,
    },
    /// children を持つルート (ネストしたルートはテーブルで表現できない)
    NestedRoutes { name: String },
    /// import 指定子に対応するコンポーネントファイルが存在しない
    MissingComponent { name: String, module: String },
}

/// `check` の結果
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditReport {
    pub router_files: Vec<PathBuf>,
    pub routes: usize,
    pub findings: Vec<Finding>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// ルート定義の識別名。name がなければ component で代用する。
fn def_name(def: &RouteDef) -> String {
    def.name
        .clone()
        .or_else(|| def.component.clone())
        .unwrap_or_else(|| "<anonymous>".to_string())
}

/// 抽出したルート定義をテーブルと突き合わせる
pub fn audit(defs: &[RouteDef], table: &RouteTable) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut seen = HashSet::new();

    for def in defs {
        let name = def_name(def);

        if def.has_children {
            findings.push(Finding::NestedRoutes { name: name.clone() });
        }

        let Some(route) = table.get(&name) else {
            findings.push(Finding::UnexpectedRoute {
                name,
                path: def.path.clone(),
                source_file: def.source_file.clone(),
            });
            continue;
        };
        seen.insert(route.name.as_str());

        if def.path.as_deref() != Some(route.path.as_str()) {
            findings.push(Finding::PathMismatch {
                name: name.clone(),
                expected: route.path.clone(),
                found: def.path.clone(),
            });
        }
        if def.component.as_deref() != Some(route.view.as_str()) {
            findings.push(Finding::ViewMismatch {
                name: name.clone(),
                expected: route.view,
                found: def.component.clone(),
            });
        }
        if def.props != route.props {
            findings.push(Finding::PropsMismatch {
                name,
                expected: route.props,
                found: def.props,
            });
        }
    }

    for route in table.routes() {
        if !seen.contains(route.name.as_str()) {
            findings.push(Finding::MissingRoute {
                name: route.name.clone(),
            });
        }
    }

    findings
}

/// 各ルート定義の import 指定子がファイルに解決できるか確認する
pub fn check_components(defs: &[RouteDef], src_root: &Path) -> Result<Vec<Finding>, SourceError> {
    let mut findings = Vec::new();
    for def in defs {
        let Some(module) = &def.module else {
            continue;
        };
        if resolve_component_path(module, &def.source_file, src_root)?.is_none() {
            warn!(module = %module, "コンポーネントファイルが見つかりません");
            findings.push(Finding::MissingComponent {
                name: def_name(def),
                module: module.clone(),
            });
        }
    }
    Ok(findings)
}

/// プロジェクトを走査し、ルーティングファイルを解析してテーブルと突き合わせる
pub fn check_project(project_root: &Path, table: &RouteTable) -> Result<AuditReport, SourceError> {
    // 1) ルーティングファイルを探す
    let router_files = find_router_files(project_root);
    if router_files.is_empty() {
        return Err(SourceError::NoRouterFile(project_root.to_path_buf()));
    }

    // 2) 見つけたファイルを順に解析し、コンポーネントの存在も確認する
    let mut defs = Vec::new();
    let mut findings = Vec::new();
    for router_file in &router_files {
        info!("解析中: {:?}", router_file);
        let file_defs = parse_routes_in_file(router_file)?;
        findings.extend(check_components(&file_defs, &source_root_for(router_file))?);
        defs.extend(file_defs);
    }

    // 3) テーブルとの差異を先頭に並べる
    let mut report_findings = audit(&defs, table);
    report_findings.extend(findings);

    Ok(AuditReport {
        router_files,
        routes: defs.len(),
        findings: report_findings,
    })
}
