//! Ethereum infrastructure - Alloy call executor

mod provider;
pub(crate) mod types;

pub use provider::{create_executor, AlloyExecutor, CallExecutor, ProviderConfig};
