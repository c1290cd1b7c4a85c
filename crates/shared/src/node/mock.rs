use super::{BlockSummary, CliqueStatus, NodeAdminApi, NodeApiError, NodeInfo, PeerInfo};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-memory node used by tests and dry runs.
#[derive(Clone, Default)]
pub struct MockNodeAdmin {
    node_info: NodeInfo,
    peers: Vec<PeerInfo>,
    clique_status: CliqueStatus,
    latest_block: BlockSummary,
    reject_add_peer: bool,
    added_peers: Arc<Mutex<Vec<String>>>,
}

impl MockNodeAdmin {
    pub fn new(node_id: &str) -> Self {
        Self {
            node_info: NodeInfo {
                id: node_id.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn with_peers(mut self, peers: Vec<PeerInfo>) -> Self {
        self.peers = peers;
        self
    }

    pub fn with_clique_status(mut self, status: CliqueStatus) -> Self {
        self.clique_status = status;
        self
    }

    pub fn with_latest_block(mut self, number: u64, timestamp: u64) -> Self {
        self.latest_block = BlockSummary { number, timestamp };
        self
    }

    /// Makes every `add_peer` call fail, as a node with the admin API locked down would.
    pub fn rejecting_add_peer(mut self) -> Self {
        self.reject_add_peer = true;
        self
    }

    pub async fn added_peers(&self) -> Vec<String> {
        self.added_peers.lock().await.clone()
    }
}

#[async_trait]
impl NodeAdminApi for MockNodeAdmin {
    async fn node_info(&self) -> Result<NodeInfo, NodeApiError> {
        Ok(self.node_info.clone())
    }

    async fn peers(&self) -> Result<Vec<PeerInfo>, NodeApiError> {
        Ok(self.peers.clone())
    }

    async fn clique_status(&self) -> Result<CliqueStatus, NodeApiError> {
        Ok(self.clique_status.clone())
    }

    async fn latest_block(&self) -> Result<BlockSummary, NodeApiError> {
        Ok(self.latest_block)
    }

    async fn add_peer(&self, enode: &str) -> Result<bool, NodeApiError> {
        self.added_peers.lock().await.push(enode.to_string());
        if self.reject_add_peer {
            return Err(NodeApiError::Rpc {
                method: "admin_addPeer",
                message: "the method admin_addPeer does not exist/is not available".to_string(),
            });
        }
        Ok(true)
    }
}
