use super::{BlockSummary, CliqueStatus, NodeAdminApi, NodeApiError, NodeInfo, PeerInfo};
use alloy::primitives::U64;
use alloy::providers::{Provider, RootProvider};
use alloy::rpc::client::ClientBuilder;
use async_trait::async_trait;
use log::debug;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RawBlockHeader {
    number: U64,
    timestamp: U64,
}

/// JSON-RPC client for a geth-style node with the `admin` and `clique` namespaces enabled.
#[derive(Clone)]
pub struct RpcNodeAdmin {
    provider: RootProvider,
}

impl RpcNodeAdmin {
    /// Connects over http(s), ws(s) or an IPC socket path, depending on `endpoint`.
    pub async fn connect(endpoint: &str) -> Result<Self, NodeApiError> {
        let client = ClientBuilder::default()
            .connect(endpoint)
            .await
            .map_err(|e| NodeApiError::Connect {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })?;
        debug!("Connected to node at {endpoint}");
        Ok(Self {
            provider: RootProvider::new(client),
        })
    }

    pub fn provider(&self) -> &RootProvider {
        &self.provider
    }
}

fn rpc_error(method: &'static str, err: impl std::fmt::Display) -> NodeApiError {
    NodeApiError::Rpc {
        method,
        message: err.to_string(),
    }
}

#[async_trait]
impl NodeAdminApi for RpcNodeAdmin {
    async fn node_info(&self) -> Result<NodeInfo, NodeApiError> {
        self.provider
            .raw_request("admin_nodeInfo".into(), ())
            .await
            .map_err(|e| rpc_error("admin_nodeInfo", e))
    }

    async fn peers(&self) -> Result<Vec<PeerInfo>, NodeApiError> {
        self.provider
            .raw_request("admin_peers".into(), ())
            .await
            .map_err(|e| rpc_error("admin_peers", e))
    }

    async fn clique_status(&self) -> Result<CliqueStatus, NodeApiError> {
        self.provider
            .raw_request("clique_status".into(), ())
            .await
            .map_err(|e| rpc_error("clique_status", e))
    }

    async fn latest_block(&self) -> Result<BlockSummary, NodeApiError> {
        let number = self
            .provider
            .get_block_number()
            .await
            .map_err(|e| rpc_error("eth_blockNumber", e))?;

        // Clique headers carry signer data in extraData, so only the fields we need are decoded.
        let header: Option<RawBlockHeader> = self
            .provider
            .raw_request("eth_getBlockByNumber".into(), (U64::from(number), false))
            .await
            .map_err(|e| rpc_error("eth_getBlockByNumber", e))?;

        let header = header.ok_or(NodeApiError::MissingBlock(number))?;
        Ok(BlockSummary {
            number: header.number.to::<u64>(),
            timestamp: header.timestamp.to::<u64>(),
        })
    }

    async fn add_peer(&self, enode: &str) -> Result<bool, NodeApiError> {
        self.provider
            .raw_request("admin_addPeer".into(), (enode.to_string(),))
            .await
            .map_err(|e| rpc_error("admin_addPeer", e))
    }
}
