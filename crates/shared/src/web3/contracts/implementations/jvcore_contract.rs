use crate::node::NodeApiError;
use crate::web3::contracts::core::contract::{AbiError, Contract};
use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, U256};
use alloy::providers::Provider;
use async_trait::async_trait;
use std::collections::HashMap;

/// On-chain record of whether a core has checked in for the current period.
#[async_trait]
pub trait CheckInRegistry: Send + Sync {
    async fn is_checked_in(&self, core_id: u64) -> Result<bool, NodeApiError>;
}

#[derive(Clone)]
pub struct JvCoreContract<P: Provider> {
    pub instance: Contract<P>,
}

impl<P: Provider> JvCoreContract<P> {
    pub fn new(address: Address, provider: P) -> Result<Self, AbiError> {
        let instance = Contract::new(address, provider, "jvcore.json")?;
        Ok(Self { instance })
    }

    pub async fn is_liveness(&self, core_id: u64) -> Result<bool, NodeApiError> {
        let contract_error = |e: alloy::contract::Error| NodeApiError::Contract {
            function: "isLiveness",
            message: e.to_string(),
        };

        let values = self
            .instance
            .instance()
            .function("isLiveness", &[U256::from(core_id).into()])
            .map_err(contract_error)?
            .call()
            .await
            .map_err(contract_error)?;
        decode_liveness(&values)
    }
}

fn decode_liveness(values: &[DynSolValue]) -> Result<bool, NodeApiError> {
    values
        .first()
        .and_then(DynSolValue::as_bool)
        .ok_or_else(|| NodeApiError::Contract {
            function: "isLiveness",
            message: format!("unexpected return value: {values:?}"),
        })
}

#[async_trait]
impl<P: Provider> CheckInRegistry for JvCoreContract<P> {
    async fn is_checked_in(&self, core_id: u64) -> Result<bool, NodeApiError> {
        self.is_liveness(core_id).await
    }
}

#[derive(Clone, Default)]
pub struct MockCheckInRegistry {
    checked_in: HashMap<u64, bool>,
}

impl MockCheckInRegistry {
    pub fn new(checked_in: HashMap<u64, bool>) -> Self {
        Self { checked_in }
    }
}

#[async_trait]
impl CheckInRegistry for MockCheckInRegistry {
    async fn is_checked_in(&self, core_id: u64) -> Result<bool, NodeApiError> {
        Ok(self.checked_in.get(&core_id).copied().unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web3::contracts::constants::addresses::JVCORE_ADDRESS;
    use alloy::providers::RootProvider;
    use url::Url;

    #[test]
    fn test_embedded_abi_exposes_is_liveness() {
        let provider = RootProvider::new_http(Url::parse("http://localhost:8545").unwrap());
        let contract = JvCoreContract::new(JVCORE_ADDRESS, provider).unwrap();
        assert_eq!(*contract.instance.address(), JVCORE_ADDRESS);
        assert!(contract
            .instance
            .instance()
            .function("isLiveness", &[U256::from(3u64).into()])
            .is_ok());
    }

    #[test]
    fn test_decode_liveness_requires_a_bool() {
        assert!(decode_liveness(&[DynSolValue::Bool(true)]).unwrap());
        assert!(!decode_liveness(&[DynSolValue::Bool(false)]).unwrap());

        let empty = decode_liveness(&[]).unwrap_err();
        assert!(matches!(
            empty,
            NodeApiError::Contract {
                function: "isLiveness",
                ..
            }
        ));
        assert!(decode_liveness(&[DynSolValue::Uint(U256::from(1), 256)]).is_err());
    }

    #[tokio::test]
    async fn test_mock_registry_defaults_to_not_checked_in() {
        let registry = MockCheckInRegistry::new(HashMap::from([(5, true)]));
        assert!(registry.is_checked_in(5).await.unwrap());
        assert!(!registry.is_checked_in(6).await.unwrap());
    }
}
