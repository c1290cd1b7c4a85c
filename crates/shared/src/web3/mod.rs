pub mod contracts;

pub use contracts::constants::addresses::JVCORE_ADDRESS;
pub use contracts::implementations::jvcore_contract::{
    CheckInRegistry, JvCoreContract, MockCheckInRegistry,
};
