//! Domain layer - call model and capability contracts
//!
//! Nothing in here talks to the network; the pipeline in `multicall` and
//! the implementations in `infrastructure` build on these types.

pub mod abi;
pub mod call;
