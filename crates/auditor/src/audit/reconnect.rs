use log::{debug, info, warn};
use shared::models::Roster;
use shared::node::{NodeAdminApi, NodeApiError, PeerInfo};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::task::JoinSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconnectSummary {
    pub requested: usize,
    pub accepted: usize,
    pub failed: usize,
}

/// `admin_addPeer` requests issued for roster nodes missing from the peer table.
///
/// The requests run alongside report generation. Their outcome only feeds the log:
/// a dial that succeeds shows up as a connected peer on the next run.
pub struct PendingReconnects {
    tasks: JoinSet<(String, Result<bool, NodeApiError>)>,
}

impl PendingReconnects {
    pub fn none() -> Self {
        Self {
            tasks: JoinSet::new(),
        }
    }

    /// Spawns one dial per roster node that is neither connected nor the auditing node.
    pub fn spawn(
        api: Arc<dyn NodeAdminApi>,
        roster: &Roster,
        own_id: &str,
        peers: &[PeerInfo],
    ) -> Self {
        let connected: HashSet<&str> = peers.iter().map(|p| p.id.as_str()).collect();
        let mut tasks = JoinSet::new();

        for node in roster.nodes() {
            if node.id == own_id || connected.contains(node.id.as_str()) {
                continue;
            }
            let Some(enode) = node.enode.clone() else {
                debug!(
                    "No enode recorded for {} {} {}, not reconnecting",
                    node.node_type, node.ip, node.owner
                );
                continue;
            };

            info!(
                "disconnected. trying to add peer: {} {} {}",
                node.ip, node.node_type, node.owner
            );
            let api = api.clone();
            let ip = node.ip.clone();
            tasks.spawn(async move {
                let result = api.add_peer(&enode).await;
                (ip, result)
            });
        }

        Self { tasks }
    }

    /// Waits for outstanding requests and logs their outcome. Never fails.
    pub async fn finish(mut self) -> ReconnectSummary {
        let mut summary = ReconnectSummary {
            requested: self.tasks.len(),
            ..Default::default()
        };

        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok((ip, Ok(true))) => {
                    debug!("Peer request for {ip} accepted");
                    summary.accepted += 1;
                }
                Ok((ip, Ok(false))) => {
                    warn!("Node declined peer request for {ip}");
                    summary.failed += 1;
                }
                Ok((ip, Err(e))) => {
                    warn!("Peer request for {ip} failed: {e}");
                    summary.failed += 1;
                }
                Err(e) => {
                    warn!("Peer request task aborted: {e}");
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}
