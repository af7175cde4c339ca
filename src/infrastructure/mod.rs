//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - Alloy-based call executor implementations
//! - ABI loading and capabilities using alloy-json-abi / alloy-dyn-abi

pub mod abi;
pub mod ethereum;

pub use abi::{AbiScanner, AbiTable, ContractAbi};
pub use ethereum::{create_executor, AlloyExecutor, CallExecutor, ProviderConfig};
