//! ABI capability errors

use thiserror::Error;

/// Errors raised while encoding calldata or decoding return data
#[derive(Debug, Error)]
pub enum AbiError {
    /// The interface has no function with this name
    #[error("method `{0}` not found in contract interface")]
    UnknownMethod(String),

    /// No overload of the function takes the given number of arguments
    #[error("no overload of `{method}` takes {given} argument(s)")]
    NoMatchingOverload { method: String, given: usize },

    /// Arguments did not match the function inputs
    #[error("failed to encode `{method}`: {source}")]
    Encode {
        method: String,
        #[source]
        source: alloy_dyn_abi::Error,
    },

    /// Return bytes did not match the expected output shape
    #[error("failed to decode `{method}`: {source}")]
    Decode {
        method: String,
        #[source]
        source: alloy_dyn_abi::Error,
    },

    /// The interface description itself could not be parsed
    #[error("invalid contract interface: {0}")]
    InvalidAbi(String),
}
