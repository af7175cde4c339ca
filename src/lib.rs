//! Batched read-only contract calls through a Multicall aggregator
//!
//! Build a [`CallSpec`] per contract read, collect them in a request from a
//! [`Client`], and execute the request in one of the aggregator [`Mode`]s.
//! Decoded values land in the [`OutputSlot`]s handed in with each call.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod multicall;

pub use domain::abi::{AbiError, CallEncoder, ReturnDecoder, SlotDecoder, SlotLayout};
pub use domain::call::wire::MULTICALL3_ADDRESS;
pub use domain::call::{BlockSelector, CallSpec, Mode, MulticallError, OutputSlot};
pub use infrastructure::{AbiScanner, AbiTable, CallExecutor, ContractAbi, ProviderConfig};
pub use multicall::{Client, RequestBuilder, Response, WirePayload};
