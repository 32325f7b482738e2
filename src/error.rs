// src/error.rs
use std::path::PathBuf;

use thiserror::Error;

/// ルートテーブルの構築・解決時に発生するエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// どのルートにもマッチしなかった
    #[error("no route matches path `{path}`")]
    NotFound { path: String },

    /// 名前付きナビゲーションで必要なプレースホルダ値が渡されなかった
    #[error("route `{route}` requires parameter `{param}`")]
    MissingParameter { route: String, param: String },

    /// 指定された名前のルートが存在しない
    #[error("no route named `{0}`")]
    UnknownRoute(String),

    /// コンポーネント識別子が既知の View に対応しない
    #[error("unknown view `{0}`")]
    UnknownView(String),

    /// ソース上のルート定義に path がない
    #[error("route `{0}` has no path")]
    MissingPath(String),

    #[error("duplicate route name `{0}`")]
    DuplicateName(String),

    #[error("duplicate route path `{0}`")]
    DuplicatePath(String),

    #[error("invalid path pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// vue-router 定義ファイルの探索・解析時に発生するエラー
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    /// プロジェクト配下にルーティングファイルが見つからなかった
    #[error("no router file found under {0:?}")]
    NoRouterFile(PathBuf),
}
