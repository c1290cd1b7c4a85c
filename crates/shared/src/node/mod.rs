pub mod enode;
pub mod mock;
pub mod rpc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use enode::enode_ip;
pub use mock::MockNodeAdmin;
pub use rpc::RpcNodeAdmin;

/// Entry of the node's live connection table (`admin_peers`).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PeerInfo {
    pub id: String,
    pub enode: String,
    #[serde(default)]
    pub name: String,
}

/// Identity of the node being queried (`admin_nodeInfo`).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct NodeInfo {
    pub id: String,
    #[serde(default)]
    pub enode: String,
    #[serde(default)]
    pub name: String,
}

/// Sealing tally over the clique module's rolling window (`clique_status`).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CliqueStatus {
    #[serde(default)]
    pub sealer_activity: HashMap<String, u64>,
    pub num_blocks: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockSummary {
    pub number: u64,
    /// Seconds since the unix epoch.
    pub timestamp: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum NodeApiError {
    #[error("failed to connect to {endpoint}: {message}")]
    Connect { endpoint: String, message: String },
    #[error("rpc call {method} failed: {message}")]
    Rpc {
        method: &'static str,
        message: String,
    },
    #[error("block {0} not found")]
    MissingBlock(u64),
    #[error("contract call {function} failed: {message}")]
    Contract {
        function: &'static str,
        message: String,
    },
}

/// Administrative surface of a running node used by the audit.
#[async_trait]
pub trait NodeAdminApi: Send + Sync {
    async fn node_info(&self) -> Result<NodeInfo, NodeApiError>;

    async fn peers(&self) -> Result<Vec<PeerInfo>, NodeApiError>;

    async fn clique_status(&self) -> Result<CliqueStatus, NodeApiError>;

    async fn latest_block(&self) -> Result<BlockSummary, NodeApiError>;

    /// Ask the node to dial `enode`. The node answers as soon as the request is queued,
    /// so `Ok(true)` does not mean the peer is connected yet.
    async fn add_peer(&self, enode: &str) -> Result<bool, NodeApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_geth_peer() {
        let content = r#"{
            "enode": "enode://dbf6ba9d@119.29.202.168:30311",
            "id": "958a680d9c0fd958b21e5f851539c93b12466a668b37dd4eb3b831f28ac1f199",
            "name": "Geth/v1.10.26-stable/linux-amd64/go1.18.5",
            "caps": ["eth/66", "eth/67", "snap/1"],
            "network": {"localAddress": "10.0.0.2:30311", "remoteAddress": "119.29.202.168:30311",
                        "inbound": false, "trusted": false, "static": false},
            "protocols": {"eth": {"version": 67}}
        }"#;

        let peer: PeerInfo = serde_json::from_str(content).unwrap();
        assert_eq!(peer.name, "Geth/v1.10.26-stable/linux-amd64/go1.18.5");
        assert_eq!(enode_ip(&peer.enode), Some("119.29.202.168"));
    }

    #[test]
    fn test_deserialize_clique_status() {
        let content = r#"{
            "inturnPercent": 100,
            "numBlocks": 64,
            "sealerActivity": {
                "0xA23e676de107F45A2C873109b6976c1D69b4ad55": 32,
                "0x93196aeEb56fe0F5672d84b8F50C123b5dA50329": 32
            }
        }"#;

        let status: CliqueStatus = serde_json::from_str(content).unwrap();
        assert_eq!(status.num_blocks, 64);
        assert_eq!(
            status.sealer_activity["0xA23e676de107F45A2C873109b6976c1D69b4ad55"],
            32
        );
    }
}
