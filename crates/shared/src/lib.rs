pub mod models;
pub mod node;
pub mod web3;
