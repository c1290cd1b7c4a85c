use crate::audit::{AuditEntry, NetworkAudit, ReportGroup};
use chrono::{DateTime, FixedOffset};
use shared::node::BlockSummary;
use std::collections::HashMap;
use std::fmt::Write;

const RULE: &str = "===============================================";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// The chain counts as producing blocks while its head is younger than this.
pub const MAX_BLOCK_AGE_SECS: i64 = 60;

#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// On-chain check-in state per core id; `None` when check-ins were not queried.
    pub check_ins: Option<HashMap<u64, bool>>,
    /// Append join date, node id and peer client name to every line.
    pub verbose: bool,
}

pub fn chain_is_live(latest: &BlockSummary, now: &DateTime<FixedOffset>) -> bool {
    now.timestamp() - (latest.timestamp as i64) < MAX_BLOCK_AGE_SECS
}

fn format_rate(rate: Option<f64>) -> String {
    rate.map_or_else(|| "-".to_string(), |r| r.to_string())
}

fn write_node_line(
    out: &mut String,
    group: ReportGroup,
    entry: &AuditEntry<'_>,
    options: &ReportOptions,
) -> std::fmt::Result {
    let node = entry.node;
    if group == ReportGroup::AuditNode {
        write!(out, "{}(a) {} ✅ connected {} 0", node.node_type, node.ip, node.owner)?;
    } else {
        let glyph = if entry.connected() { "✅" } else { "❌" };
        write!(
            out,
            "{} {} {} {} {} {}",
            node.node_type,
            node.ip,
            glyph,
            entry.status,
            node.owner,
            format_rate(entry.block_rate)
        )?;
        if let Some(error) = &entry.error {
            write!(out, " ({error})")?;
        }
    }

    if let Some(check_ins) = &options.check_ins {
        match node.core_id {
            Some(core_id) => {
                let glyph = if check_ins.get(&core_id).copied().unwrap_or(false) {
                    "👍"
                } else {
                    "💔"
                };
                write!(out, " {glyph} {core_id}")?;
            }
            None => write!(out, " ❔ --")?,
        }
    }

    if options.verbose {
        write!(
            out,
            " {} {} {}",
            node.since.as_deref().unwrap_or("-"),
            node.id,
            entry.peer_name.as_deref().unwrap_or("-")
        )?;
    }
    writeln!(out)
}

/// Renders the plaintext audit report.
pub fn render_report(
    audit: &NetworkAudit<'_>,
    latest: &BlockSummary,
    now: &DateTime<FixedOffset>,
    options: &ReportOptions,
) -> Result<String, std::fmt::Error> {
    let mut out = String::new();

    writeln!(out, "Jouleverse Network Audit Report")?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "Report Time: {}", now.format(TIME_FORMAT))?;
    writeln!(out, "------------- blockchain status ---------------")?;
    let chain_glyph = if chain_is_live(latest, now) { "🟢" } else { "🔴" };
    writeln!(out, "Blockchain Status: {chain_glyph}")?;
    writeln!(out, "Latest Block Height: {}", latest.number)?;
    match DateTime::from_timestamp(latest.timestamp as i64, 0) {
        Some(block_time) => writeln!(
            out,
            "Latest Block Time: {}",
            block_time.with_timezone(now.offset()).format(TIME_FORMAT)
        )?,
        None => writeln!(out, "Latest Block Time: {}", latest.timestamp)?,
    }

    let counts = audit.live_counts();
    writeln!(
        out,
        "Network Size: {} nodes ({} miners, {} witnesses+miner*s)",
        counts.total, counts.miners, counts.witnesses
    )?;
    writeln!(out, "---------------- nodes status -----------------")?;

    for (group, entry) in audit.report_order() {
        write_node_line(&mut out, group, entry, options)?;
    }

    Ok(out)
}
