//! ABI capabilities
//!
//! This module defines the traits a call uses to turn a method name and
//! arguments into calldata, and raw return bytes back into values,
//! independent of the underlying implementation (alloy-dyn-abi).

mod codec;
mod error;

pub use codec::{CallEncoder, ReturnDecoder, SlotDecoder, SlotLayout};
pub use error::AbiError;
