use super::reconnect::PendingReconnects;
use super::NetworkAudit;
use crate::report::{render_report, ReportOptions};
use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use log::{debug, warn};
use shared::models::Roster;
use shared::node::NodeAdminApi;
use shared::web3::CheckInRegistry;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct AuditOptions {
    pub reconnect: bool,
    pub verbose: bool,
}

pub struct AuditRun {
    pub report: String,
    /// Still in flight when the report is ready; await to log their outcome.
    pub reconnects: PendingReconnects,
}

/// One pass over the node: each query is a blocking round-trip and any failure aborts
/// the run. Peer dials are the exception and proceed in the background.
pub async fn run_audit(
    api: Arc<dyn NodeAdminApi>,
    roster: &Roster,
    check_in_registry: Option<&dyn CheckInRegistry>,
    options: &AuditOptions,
    now: DateTime<FixedOffset>,
) -> Result<AuditRun> {
    let node_info = api.node_info().await.context("failed to read node info")?;
    let peers = api.peers().await.context("failed to read peer table")?;
    debug!("Node {} has {} peers", node_info.id, peers.len());

    let reconnects = if options.reconnect {
        PendingReconnects::spawn(api.clone(), roster, &node_info.id, &peers)
    } else {
        PendingReconnects::none()
    };

    let clique_status = api
        .clique_status()
        .await
        .context("failed to read clique status")?;
    let audit = NetworkAudit::reconcile(roster, &node_info.id, &peers, &clique_status);
    if audit.audit_node().is_none() {
        warn!(
            "Node {} is not a witness in the roster; the audit node line is omitted",
            node_info.id
        );
    }

    let latest = api
        .latest_block()
        .await
        .context("failed to read latest block")?;

    let check_ins = match check_in_registry {
        Some(registry) => {
            let mut check_ins = HashMap::new();
            for (_, entry) in audit.report_order() {
                let Some(core_id) = entry.node.core_id else {
                    continue;
                };
                if check_ins.contains_key(&core_id) {
                    continue;
                }
                let checked_in = registry
                    .is_checked_in(core_id)
                    .await
                    .with_context(|| format!("failed to read check-in of core {core_id}"))?;
                check_ins.insert(core_id, checked_in);
            }
            Some(check_ins)
        }
        None => None,
    };

    let report_options = ReportOptions {
        check_ins,
        verbose: options.verbose,
    };
    let report = render_report(&audit, &latest, &now, &report_options)?;

    Ok(AuditRun { report, reconnects })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::tests::{peer, sample_roster};
    use shared::node::{CliqueStatus, MockNodeAdmin};
    use shared::web3::MockCheckInRegistry;

    fn now() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-02-01T10:00:00+08:00").unwrap()
    }

    fn mock_node() -> MockNodeAdmin {
        MockNodeAdmin::new("audit")
            .with_peers(vec![peer("w1", "10.0.0.1"), peer("m1", "10.0.1.1")])
            .with_clique_status(CliqueStatus {
                sealer_activity: HashMap::from([("0xaaaa".to_string(), 64)]),
                num_blocks: 64,
            })
            .with_latest_block(77, (now().timestamp() - 5) as u64)
    }

    #[tokio::test]
    async fn test_run_audit_renders_and_dials() {
        let roster = sample_roster();
        let node = mock_node();
        let options = AuditOptions {
            reconnect: true,
            verbose: false,
        };

        let run = run_audit(Arc::new(node.clone()), &roster, None, &options, now())
            .await
            .unwrap();

        assert!(run.report.contains("Latest Block Height: 77"));
        assert!(run.report.contains("Network Size: 3 nodes (1 miners, 2 witnesses+miner*s)"));
        assert!(run.report.contains("miner 10.0.1.1 ✅ connected owner-m1 1\n"));
        assert!(run.report.contains("witness(a) 10.0.0.9 ✅ connected owner-audit 0\n"));

        let summary = run.reconnects.finish().await;
        assert_eq!(summary.requested, 4);
        assert_eq!(node.added_peers().await.len(), 4);
    }

    #[tokio::test]
    async fn test_run_audit_without_reconnect() {
        let roster = sample_roster();
        let node = mock_node();
        let run = run_audit(
            Arc::new(node.clone()),
            &roster,
            None,
            &AuditOptions::default(),
            now(),
        )
        .await
        .unwrap();

        assert_eq!(run.reconnects.finish().await.requested, 0);
        assert!(node.added_peers().await.is_empty());
    }

    #[tokio::test]
    async fn test_run_audit_queries_check_ins() {
        let mut nodes = sample_roster().nodes().to_vec();
        nodes[1].core_id = Some(9);
        let roster = Roster::new(nodes).unwrap();
        let registry = MockCheckInRegistry::new(HashMap::from([(9, true)]));

        let run = run_audit(
            Arc::new(mock_node()),
            &roster,
            Some(&registry as &dyn CheckInRegistry),
            &AuditOptions::default(),
            now(),
        )
        .await
        .unwrap();

        assert!(run.report.contains("miner 10.0.1.1 ✅ connected owner-m1 1 👍 9\n"));
        assert!(run.report.contains("owner-w3 0 ❔ --\n"));
    }
}
