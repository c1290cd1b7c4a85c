pub mod reconnect;
pub mod runner;

use log::debug;
use shared::models::{CoreNode, NodeType, Roster};
use shared::node::{enode_ip, CliqueStatus, PeerInfo};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
    /// Seen in the peer table, but not at the address the roster expects.
    Error,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Connected => write!(f, "connected"),
            ConnectionStatus::Disconnected => write!(f, "disconnected"),
            ConnectionStatus::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry<'a> {
    pub node: &'a CoreNode,
    pub status: ConnectionStatus,
    /// Share of the sealing window produced by this node. `None` for miners absent
    /// from the sealer activity.
    pub block_rate: Option<f64>,
    pub error: Option<String>,
    /// Client name reported by the peer connection.
    pub peer_name: Option<String>,
}

impl AuditEntry<'_> {
    pub fn connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    /// A sealing miner counts as live even when it is not a direct peer.
    pub fn is_live(&self) -> bool {
        self.connected() || (self.node.is_miner() && self.block_rate.is_some_and(|r| r > 0.0))
    }
}

/// Report sections, in print order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReportGroup {
    Miner,
    AuditNode,
    MinerCandidate,
    ConnectedWitness,
    DisconnectedWitness,
}

/// Live node tally. Both `total` and `witnesses` include the auditing node itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveCounts {
    pub total: usize,
    pub miners: usize,
    pub witnesses: usize,
}

/// Roster reconciled against one snapshot of the node's peers and sealing activity.
#[derive(Debug, Clone)]
pub struct NetworkAudit<'a> {
    entries: Vec<AuditEntry<'a>>,
    audit_node: Option<usize>,
}

impl<'a> NetworkAudit<'a> {
    pub fn reconcile(
        roster: &'a Roster,
        own_id: &str,
        peers: &[PeerInfo],
        clique_status: &CliqueStatus,
    ) -> Self {
        let mut entries: Vec<AuditEntry<'a>> = roster
            .nodes()
            .iter()
            .map(|node| AuditEntry {
                node,
                status: ConnectionStatus::Disconnected,
                block_rate: if node.is_miner() { None } else { Some(0.0) },
                error: None,
                peer_name: None,
            })
            .collect();

        let by_id: HashMap<&str, usize> = roster
            .nodes()
            .iter()
            .enumerate()
            .map(|(idx, node)| (node.id.as_str(), idx))
            .collect();

        let signers: HashMap<String, usize> = roster
            .nodes()
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_miner())
            .filter_map(|(idx, node)| node.signer_key().map(|key| (key, idx)))
            .collect();

        let audit_node = by_id
            .get(own_id)
            .copied()
            .filter(|&idx| roster.nodes()[idx].node_type.is_witness_class());
        if let Some(idx) = audit_node {
            entries[idx].status = ConnectionStatus::Connected;
            entries[idx].block_rate = Some(0.0);
        }

        for (address, sealed) in &clique_status.sealer_activity {
            match signers.get(&address.to_lowercase()) {
                Some(&idx) => {
                    entries[idx].block_rate = Some(if clique_status.num_blocks == 0 {
                        0.0
                    } else {
                        *sealed as f64 / clique_status.num_blocks as f64
                    });
                }
                None => debug!("Sealer {address} is not in the roster"),
            }
        }

        for peer in peers {
            let Some(&idx) = by_id.get(peer.id.as_str()) else {
                continue;
            };
            if Some(idx) == audit_node {
                continue;
            }

            let entry = &mut entries[idx];
            match enode_ip(&peer.enode) {
                Some(ip) if ip == entry.node.ip => {
                    entry.status = ConnectionStatus::Connected;
                    entry.error = None;
                    entry.peer_name = Some(peer.name.clone());
                }
                Some(ip) => {
                    entry.status = ConnectionStatus::Error;
                    entry.error = Some(format!("IP mismatch: peer ip = {ip}"));
                }
                None => {
                    entry.status = ConnectionStatus::Error;
                    entry.error = Some(format!("unrecognized peer address: {}", peer.enode));
                }
            }
        }

        Self {
            entries,
            audit_node,
        }
    }

    pub fn audit_node(&self) -> Option<&AuditEntry<'a>> {
        self.audit_node.map(|idx| &self.entries[idx])
    }

    pub fn live_counts(&self) -> LiveCounts {
        let mut miners = 0;
        let mut others = 0;
        for (idx, entry) in self.entries.iter().enumerate() {
            if Some(idx) == self.audit_node || !entry.is_live() {
                continue;
            }
            if entry.node.is_miner() {
                miners += 1;
            } else {
                others += 1;
            }
        }

        LiveCounts {
            total: miners + others + 1,
            miners,
            witnesses: others + 1,
        }
    }

    fn group_of(&self, idx: usize) -> ReportGroup {
        if Some(idx) == self.audit_node {
            return ReportGroup::AuditNode;
        }
        let entry = &self.entries[idx];
        match entry.node.node_type {
            NodeType::Miner => ReportGroup::Miner,
            NodeType::MinerCandidate => ReportGroup::MinerCandidate,
            NodeType::Witness | NodeType::Audit => match entry.status {
                ConnectionStatus::Disconnected => ReportGroup::DisconnectedWitness,
                ConnectionStatus::Connected | ConnectionStatus::Error => {
                    ReportGroup::ConnectedWitness
                }
            },
        }
    }

    /// Entries grouped by section, roster order within a section.
    pub fn report_order(&self) -> Vec<(ReportGroup, &AuditEntry<'a>)> {
        let mut order: Vec<(ReportGroup, usize)> = (0..self.entries.len())
            .map(|idx| (self.group_of(idx), idx))
            .collect();
        order.sort_by_key(|&(group, idx)| (group, idx));
        order
            .into_iter()
            .map(|(group, idx)| (group, &self.entries[idx]))
            .collect()
    }
}
