//! Batch execution errors

use std::time::Duration;

use alloy_primitives::Address;
use thiserror::Error;

use crate::domain::abi::AbiError;

/// Errors returned by a batch request
#[derive(Debug, Error)]
pub enum MulticallError {
    /// The batch mode name is not one the aggregator understands
    #[error("method not supported: {0}")]
    MethodNotSupported(String),

    /// `call` mode needs exactly one call
    #[error("wrong call param: call mode expects exactly 1 call, got {count}")]
    WrongCallParam { count: usize },

    /// The aggregator response has the wrong shape for the mode
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// A single call's return data could not be decoded
    #[error("unpack multicall error at call {index} ({target} {method}): {source}")]
    UnpackMulticall {
        index: usize,
        target: Address,
        method: String,
        #[source]
        source: AbiError,
    },

    /// A call has no output slot for one of its decoders
    #[error("call {index} has no output slot {slot}")]
    MissingOutput { index: usize, slot: usize },

    /// The node did not answer within the request timeout
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Abi(#[from] AbiError),

    #[error(transparent)]
    Executor(anyhow::Error),
}
