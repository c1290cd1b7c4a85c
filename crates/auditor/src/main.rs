mod audit;
mod config;
mod report;

use crate::audit::runner::{run_audit, AuditOptions};
use crate::config::Config;
use alloy::primitives::Address;
use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use log::{info, LevelFilter};
use shared::node::{NodeAdminApi, RpcNodeAdmin};
use shared::web3::{CheckInRegistry, JvCoreContract, JVCORE_ADDRESS};
use std::str::FromStr;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "audit-network")]
#[command(about = "Audit the Jouleverse core node roster against a live node")]
#[command(version)]
struct Args {
    /// Node endpoint: http(s)/ws(s) URL or path to geth.ipc (overrides config)
    endpoint: Option<String>,

    /// Configuration file path
    #[arg(long)]
    config: Option<String>,

    /// Environment file path
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Roster JSON file (defaults to the built-in roster)
    #[arg(short = 'r', long)]
    roster: Option<String>,

    /// Query JVCore check-in state for roster entries with a core id
    #[arg(long)]
    check_in: bool,

    /// JVCore contract address used with --check-in
    #[arg(long)]
    jvcore_address: Option<String>,

    /// Do not ask the node to dial roster nodes missing from its peer table
    #[arg(long)]
    no_reconnect: bool,

    /// Append join date, node id and peer client name to every line
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .format_timestamp(None)
        .parse_default_env()
        .init();

    let args = Args::parse();

    let config = Config::load(&args.config, &args.env_file)?
        .with_rpc_url(args.endpoint)
        .with_roster_path(args.roster)
        .with_jvcore_address(args.jvcore_address);

    let roster = config.load_roster()?;
    let endpoint = config.get_rpc_url()?;
    info!("Auditing {} roster nodes via {}", roster.len(), endpoint);

    let node = RpcNodeAdmin::connect(&endpoint)
        .await
        .with_context(|| format!("cannot attach to node: {endpoint}"))?;

    let jvcore = if args.check_in {
        let address = match &config.jvcore_address {
            Some(address) => Address::from_str(address)
                .with_context(|| format!("invalid JVCore address: {address}"))?,
            None => JVCORE_ADDRESS,
        };
        Some(JvCoreContract::new(address, node.provider().clone())?)
    } else {
        None
    };

    let options = AuditOptions {
        reconnect: !args.no_reconnect,
        verbose: args.verbose,
    };
    let api: Arc<dyn NodeAdminApi> = Arc::new(node);
    let run = run_audit(
        api,
        &roster,
        jvcore.as_ref().map(|c| c as &dyn CheckInRegistry),
        &options,
        Local::now().fixed_offset(),
    )
    .await?;

    print!("{}", run.report);

    let summary = run.reconnects.finish().await;
    if summary.requested > 0 {
        info!(
            "Peer requests: {} sent, {} accepted, {} failed",
            summary.requested, summary.accepted, summary.failed
        );
    }

    Ok(())
}
