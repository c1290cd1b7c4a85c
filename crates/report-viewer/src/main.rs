use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use report_viewer::api::server::start_server;
use report_viewer::source::{DirReportSource, HttpReportSource, ReportSource};
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

#[derive(Parser)]
#[command(name = "report-viewer")]
#[command(about = "Serve the monthly audit points reports as a browsable table")]
#[command(version)]
struct Args {
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short = 'p', long, default_value = "8090")]
    port: u16,

    /// Directory holding months.json and the report_<YYYYMM>.json files
    #[arg(long, env = "REPORTS_DIR", default_value = ".", conflicts_with = "reports_url")]
    reports_dir: PathBuf,

    /// Base URL the report files are published under
    #[arg(long, env = "REPORTS_URL")]
    reports_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .format_timestamp(None)
        .parse_default_env()
        .init();

    let args = Args::parse();

    let source: Arc<dyn ReportSource> = match &args.reports_url {
        Some(url) => {
            let base = Url::parse(url).with_context(|| format!("invalid reports URL: {url}"))?;
            info!("Serving reports from {base}");
            Arc::new(HttpReportSource::new(base).context("failed to build HTTP client")?)
        }
        None => {
            info!("Serving reports from {}", args.reports_dir.display());
            Arc::new(DirReportSource::new(&args.reports_dir))
        }
    };

    start_server(&args.host, args.port, source)
        .await
        .context("report viewer server failed")
}
