// src/main.rs

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pkdb_routes::audit::check_project;
use pkdb_routes::parser::parse_routes_in_file;
use pkdb_routes::{Params, Route, RouteTable};

/// CLI 引数定義
#[derive(Parser, Debug)]
#[command(
    name = "pkdb-routes",
    version,
    about = "PK-DB クライアントのルートテーブルを解決・検査する CLI ツール"
)]
struct Cli {
    /// 組み込みテーブルの代わりに使う vue-router 定義ファイル
    /// 例: `--source pkdb_client/src/router/index.js`
    #[arg(short = 's', long = "source", value_name = "FILE", global = true)]
    source: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// ルートテーブルを JSON で出力する
    List,

    /// 具体的なパスをルートに解決する
    Resolve {
        /// 例: `/studies/42`
        path: String,
    },

    /// ルート名とパラメータからパスを組み立てる
    Href {
        /// 例: `StudyDetail`
        name: String,

        /// `KEY=VALUE` 形式のプレースホルダの値
        #[arg(value_parser = parse_key_value)]
        params: Vec<(String, String)>,
    },

    /// クライアントのルーティングファイルを組み込みテーブルと突き合わせる
    Check {
        /// 解析対象のクライアントプロジェクトルート
        #[arg(short = 'r', long = "project-root", value_name = "DIR")]
        project_root: PathBuf,
    },
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("`{s}` は KEY=VALUE 形式ではありません"))
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pkdb_routes=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// `--source` が指定されていればそのファイルから、なければ組み込みのテーブルを構築する
fn load_table(source: Option<&PathBuf>) -> Result<RouteTable, Box<dyn std::error::Error>> {
    let table = match source {
        Some(path) => {
            let defs = parse_routes_in_file(&path.canonicalize()?)?;
            RouteTable::from_definitions(&defs)?
        }
        None => RouteTable::pkdb()?,
    };
    debug!(routes = table.len(), "ルートテーブル読み込み");
    Ok(table)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1) ログ出力 (stderr) を初期化し、CLI 引数をパース
    init_tracing();
    let cli = Cli::parse();

    // 2) 起動時に一度だけテーブルを構築し、以降は不変の値として渡す
    let table = load_table(cli.source.as_ref())?;

    // 3) サブコマンドごとに結果を JSON (または素のパス) で標準出力へ
    match cli.command {
        Command::List => {
            let routes: Vec<&Route> = table.routes().collect();
            println!("{}", serde_json::to_string_pretty(&routes)?);
        }
        Command::Resolve { path } => match table.resolve(&path) {
            Ok(route_match) => println!("{}", serde_json::to_string_pretty(&route_match)?),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
        Command::Href { name, params } => {
            let params: Params = params.into_iter().collect();
            match table.href(&name, &params) {
                Ok(href) => println!("{href}"),
                Err(e) => {
                    eprintln!("Error: {e}");
                    std::process::exit(1);
                }
            }
        }
        Command::Check { project_root } => {
            let project_dir = project_root.canonicalize()?; // 絶対化
            let report = check_project(&project_dir, &table)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.is_clean() {
                eprintln!("Error: {} 件の差異が見つかりました。", report.findings.len());
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
