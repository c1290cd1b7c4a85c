use alloy::{
    contract::{ContractInstance, Interface},
    json_abi::JsonAbi,
    primitives::Address,
    providers::Provider,
};

macro_rules! include_abi {
    ($path:expr) => {{
        const ABI_BYTES: &[u8] = include_bytes!($path);
        ABI_BYTES
    }};
}

#[derive(Debug, thiserror::Error)]
pub enum AbiError {
    #[error("unknown ABI file: {0}")]
    Unknown(String),
    #[error("invalid ABI {path}: {source}")]
    Invalid {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone)]
pub struct Contract<P: Provider> {
    instance: ContractInstance<P>,
}

impl<P: Provider> Contract<P> {
    pub fn new(address: Address, provider: P, abi_file_path: &str) -> Result<Self, AbiError> {
        let abi = Self::parse_abi(abi_file_path)?;
        Ok(Self {
            instance: ContractInstance::new(address, provider, Interface::new(abi)),
        })
    }

    fn parse_abi(path: &str) -> Result<JsonAbi, AbiError> {
        let artifact = match path {
            "jvcore.json" => include_abi!("../../../../../../artifacts/abi/jvcore.json"),
            _ => return Err(AbiError::Unknown(path.to_string())),
        };

        serde_json::from_slice(artifact).map_err(|source| AbiError::Invalid {
            path: path.to_string(),
            source,
        })
    }

    pub fn instance(&self) -> &ContractInstance<P> {
        &self.instance
    }

    pub fn address(&self) -> &Address {
        self.instance.address()
    }
}
