// src/main.rs
mod config;
mod document;
mod error;
mod fetch;
mod models;
mod renderer;
mod snapshot;
mod tui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::{DEFAULT_CONFIG_PATH, load_config};
use document::HostDocument;
use fetch::Fetcher;
use models::Config;
use renderer::{TracingSink, render_document, run_once};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tui::{App, TuiApp};

#[derive(Parser)]
#[command(name = "run-explorer", version, about = "Render MLflow run summaries into a host page")]
struct Cli {
    /// 配置文件路径
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 加载实验记录并写入宿主页面
    Render {
        #[arg(long)]
        page: Option<PathBuf>,
        /// 输出路径，缺省时打印到标准输出
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// 在终端中查看实验记录
    View {
        #[arg(long)]
        page: Option<PathBuf>,
    },
    /// 从 MLflow 文件存储导出 experiments.json
    Snapshot {
        #[arg(long)]
        mlruns: Option<PathBuf>,
        #[arg(long)]
        run_id: Option<String>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Command::Render { page, out } => render(config, page, out).await,
        Command::View { page } => view(config, page).await,
        Command::Snapshot {
            mlruns,
            run_id,
            out,
        } => export_snapshot(config, mlruns, run_id, out),
    }
}

async fn render(config: Config, page: Option<PathBuf>, out: Option<PathBuf>) -> Result<()> {
    let page = page.unwrap_or_else(|| PathBuf::from(&config.general.page_path));
    let out = out.or_else(|| config.general.output_path.as_ref().map(PathBuf::from));

    let mut document = HostDocument::load(&page)?;
    let fetcher = Fetcher::from_config(&config.fetch, &page)?;

    // 失败已由诊断通道报告，页面保持原样
    render_document(
        &mut document,
        &config.elements,
        &fetcher,
        &config.general.data_path,
        &TracingSink,
    )
    .await;

    match out {
        Some(path) => {
            document.save(&path)?;
            info!("Wrote rendered page to {}", path.display());
        }
        None => print!("{}", document.as_str()),
    }
    Ok(())
}

async fn view(config: Config, page: Option<PathBuf>) -> Result<()> {
    let page = page.unwrap_or_else(|| PathBuf::from(&config.general.page_path));
    let fetcher = Fetcher::from_config(&config.fetch, &page)?;

    let mut app = App::new();
    run_once(
        &fetcher,
        &config.general.data_path,
        &mut app.table,
        &mut app.heading,
        &TracingSink,
    )
    .await;

    let mut tui_app = TuiApp::new(app, config)?;
    tui_app.run()
}

fn export_snapshot(
    config: Config,
    mlruns: Option<PathBuf>,
    run_id: Option<String>,
    out: Option<PathBuf>,
) -> Result<()> {
    let mlruns = mlruns.unwrap_or_else(|| PathBuf::from(&config.snapshot.mlruns_dir));
    let out = out.unwrap_or_else(|| PathBuf::from(&config.snapshot.output_path));
    let run_id = run_id.or(config.snapshot.run_id);

    let record = snapshot::snapshot_run(&mlruns, run_id.as_deref())
        .with_context(|| format!("Failed to snapshot runs under {}", mlruns.display()))?;
    snapshot::write_snapshot(&record, &out)
}
