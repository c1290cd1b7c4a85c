use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum NodeType {
    #[serde(rename = "miner")]
    Miner,
    #[serde(rename = "witness")]
    Witness,
    #[serde(rename = "audit")]
    Audit,
    /// Miner-ready candidate: staked, not yet voted in as a signer.
    #[serde(rename = "miner*", alias = "miner-candidate")]
    MinerCandidate,
}

impl NodeType {
    pub fn label(&self) -> &'static str {
        match self {
            NodeType::Miner => "miner",
            NodeType::Witness => "witness",
            NodeType::Audit => "audit",
            NodeType::MinerCandidate => "miner*",
        }
    }

    /// Witness-class entries relay and observe only. The audit node is one of them.
    pub fn is_witness_class(&self) -> bool {
        matches!(self, NodeType::Witness | NodeType::Audit)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A participant the network operators expect to find online.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CoreNode {
    pub owner: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub ip: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enode: Option<String>,
    /// Date the node joined the core set, as `YYYYMMDD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
    #[serde(rename = "coreId", default, skip_serializing_if = "Option::is_none")]
    pub core_id: Option<u64>,
}

impl CoreNode {
    pub fn is_miner(&self) -> bool {
        self.node_type == NodeType::Miner
    }

    /// Signer address normalised for lookups against sealer activity.
    pub fn signer_key(&self) -> Option<String> {
        self.signer.as_ref().map(|s| s.to_lowercase())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("failed to read roster file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid roster json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("roster is empty")]
    Empty,
    #[error("duplicate node id in roster: {0}")]
    DuplicateId(String),
    #[error("miner {id} ({owner}) has no signer address")]
    MissingSigner { id: String, owner: String },
    #[error("{node_type} {id} ({owner}) must not carry a signer address")]
    UnexpectedSigner {
        id: String,
        owner: String,
        node_type: NodeType,
    },
}

/// Hand-maintained list of expected nodes, kept in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct Roster {
    nodes: Vec<CoreNode>,
}

impl Roster {
    pub fn new(nodes: Vec<CoreNode>) -> Result<Self, RosterError> {
        if nodes.is_empty() {
            return Err(RosterError::Empty);
        }

        let mut seen = HashSet::with_capacity(nodes.len());
        for node in &nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(RosterError::DuplicateId(node.id.clone()));
            }
            match (node.node_type, &node.signer) {
                (NodeType::Miner, None) => {
                    return Err(RosterError::MissingSigner {
                        id: node.id.clone(),
                        owner: node.owner.clone(),
                    });
                }
                (NodeType::Witness | NodeType::Audit, Some(_)) => {
                    return Err(RosterError::UnexpectedSigner {
                        id: node.id.clone(),
                        owner: node.owner.clone(),
                        node_type: node.node_type,
                    });
                }
                _ => {}
            }
        }

        Ok(Self { nodes })
    }

    pub fn from_json(content: &str) -> Result<Self, RosterError> {
        let nodes: Vec<CoreNode> = serde_json::from_str(content)?;
        Self::new(nodes)
    }

    pub fn load(path: &Path) -> Result<Self, RosterError> {
        let content = std::fs::read_to_string(path).map_err(|source| RosterError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn nodes(&self) -> &[CoreNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
