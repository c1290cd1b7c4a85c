use alloy::primitives::{hex, Address};

/// JVCore NFT registry on Jouleverse mainnet; holds the per-core check-in state.
pub const JVCORE_ADDRESS: Address =
    Address::new(hex!("0x8d214415b9c5F5E4Cf4CbCfb4a5DEd47fb516392"));
