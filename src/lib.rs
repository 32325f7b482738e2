// src/lib.rs
//! PK-DB クライアントのルートテーブル。
//!
//! パス (または名前 + パラメータ) をビューに解決し、
//! vue-router の定義ファイルとの突き合わせも行う。

pub mod audit;
pub mod error;
pub mod model;
pub mod parser;
pub mod pattern;
pub mod resolver;
pub mod table;

pub use error::{RouteError, SourceError};
pub use model::{Params, Route, RouteDef, RouteMatch, View};
pub use table::{Location, RouteTable};
