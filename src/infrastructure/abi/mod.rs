//! ABI infrastructure - alloy-backed capabilities and ABI loading

pub mod args;
mod contract;
mod registry;
mod scanner;

pub use contract::ContractAbi;
pub use registry::AbiTable;
pub use scanner::AbiScanner;
