pub mod asset;
pub mod contract;
pub mod entropy;
pub mod error;
pub mod execute;
pub mod lottery;
pub mod msg;
pub mod query;
pub mod registry;
pub mod snatch;
pub mod state;

pub use crate::error::ContractError;
