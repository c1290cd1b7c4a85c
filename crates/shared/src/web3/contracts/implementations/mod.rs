pub mod jvcore_contract;
