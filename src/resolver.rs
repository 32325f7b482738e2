// src/resolver.rs
use path_absolutize::Absolutize;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::error::SourceError;

/// 探索時に無視するディレクトリ
const SKIP_DIRS: [&str; 4] = ["node_modules", "dist", ".git", "target"];

/// コンポーネントの候補として試す拡張子・ファイル名
const CANDIDATE_SUFFIXES: [&str; 5] = [".vue", ".js", ".ts", "/index.vue", "/index.js"];

/// プロジェクト配下から vue-router の定義ファイルを探す。
///
/// 対象: `router/index.{js,ts}` と `router.{js,ts}`
/// 戻り値はソート・重複除去済み。
pub fn find_router_files(project_root: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(project_root)
        .into_iter()
        .filter_entry(|e| {
            !(e.file_type().is_dir()
                && e.file_name()
                    .to_str()
                    .is_some_and(|name| SKIP_DIRS.contains(&name)))
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| is_router_file(e.path()))
        .map(|e| e.into_path())
        .collect();

    found.sort();
    found.dedup();
    debug!(count = found.len(), "ルーティングファイル探索完了");
    found
}

fn is_router_file(path: &Path) -> bool {
    let Some(fname) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let parent_is_router = path
        .parent()
        .and_then(|p| p.file_name())
        .is_some_and(|n| n == "router");

    matches!(fname, "router.js" | "router.ts")
        || (parent_is_router && matches!(fname, "index.js" | "index.ts"))
}

/// `@/` エイリアスの基準となる `src` ディレクトリを推定する。
/// ルーティングファイルの祖先で最も近い `src` を返し、なければ親ディレクトリ。
pub fn source_root_for(router_file: &Path) -> PathBuf {
    router_file
        .ancestors()
        .skip(1)
        .find(|dir| dir.file_name().is_some_and(|n| n == "src"))
        .or_else(|| router_file.parent())
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

/// import 指定子 (`specifier`) を実際のコンポーネントファイルに解決する。
///
/// - `@/components/Home` → `<src_root>/components/Home`
/// - `./Home`, `../components/Home` → `importer` のディレクトリ基準
/// - それ以外 (パッケージ名) は解決しない
///
/// 戻り値:
/// - Ok(Some(path)) → 見つかったファイルの絶対パス
/// - Ok(None)       → 見つからなかった
pub fn resolve_component_path(
    specifier: &str,
    importer: &Path,
    src_root: &Path,
) -> Result<Option<PathBuf>, SourceError> {
    // 1) 指定子の種類に応じて基準パスを決める
    let candidate_base = if let Some(rest) = specifier.strip_prefix("@/") {
        src_root.join(rest)
    } else if specifier.starts_with("./") || specifier.starts_with("../") {
        let parent_dir = importer.parent().unwrap_or_else(|| Path::new("."));
        parent_dir.join(specifier)
    } else {
        trace!(specifier, "パッケージ指定子のため解決しません");
        return Ok(None);
    };

    // 2) 指定子そのもの、続いて拡張子付きの候補を列挙
    let base = candidate_base.to_string_lossy().into_owned();
    let candidates = std::iter::once(candidate_base.clone())
        .chain(CANDIDATE_SUFFIXES.iter().map(|suffix| PathBuf::from(format!("{base}{suffix}"))));

    // 3) 絶対パス化し、最初に存在するファイルを返却
    for cand in candidates {
        let abs = cand
            .absolutize()
            .map_err(|source| SourceError::Io {
                path: cand.clone(),
                source,
            })?
            .to_path_buf();
        if fs::metadata(&abs).is_ok_and(|m| m.is_file()) {
            return Ok(Some(abs));
        }
    }

    Ok(None)
}
