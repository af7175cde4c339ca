//! Response decoding - raw aggregator bytes back onto each call

use std::fmt::Display;

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Bytes, B256, U256};
use alloy_sol_types::SolCall;
use tracing::{debug, error, warn};

use super::encoder::single_call;
use crate::domain::abi::AbiError;
use crate::domain::call::wire::{IMulticall, WORD_SIZE};
use crate::domain::call::{CallSpec, Mode, MulticallError, OutputSlot};

/// Outcome of one executed batch
///
/// Decoded values live in the calls' [`OutputSlot`]s; this holds what the
/// aggregator reported about the batch itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub mode: Mode,
    /// One flag per call, in call order. Always `true` in `call` and
    /// `aggregate` modes since a failure there fails the whole response.
    pub success: Vec<bool>,
    /// Block the aggregator executed at, when the mode reports it
    pub block_number: Option<u64>,
    pub block_hash: Option<B256>,
    /// Set in `getCurrentBlockTimestamp` mode
    pub timestamp: Option<u64>,
    pub raw: Bytes,
}

impl Response {
    fn new(mode: Mode, raw: Bytes) -> Self {
        Self {
            mode,
            success: Vec::new(),
            block_number: None,
            block_hash: None,
            timestamp: None,
            raw,
        }
    }

    pub fn len(&self) -> usize {
        self.success.len()
    }

    pub fn is_empty(&self) -> bool {
        self.success.is_empty()
    }

    /// Whether call `index` succeeded on-chain
    pub fn is_success(&self, index: usize) -> bool {
        self.success.get(index).copied().unwrap_or(false)
    }
}

/// A decoded value waiting to be written
struct Staged {
    slot: OutputSlot,
    values: Vec<DynSolValue>,
}

/// Decode `raw` according to `mode`, writing into each call's outputs
///
/// Writes are staged and only committed once the whole response decoded,
/// so a failed response leaves every output slot untouched.
pub fn decode(
    mode: Mode,
    calls: &[CallSpec],
    require_success: bool,
    raw: Bytes,
) -> Result<Response, MulticallError> {
    let mut response = Response::new(mode, raw);
    let mut staged = Vec::new();

    match mode {
        Mode::Call => {
            let call = single_call(calls)?;
            let values = call
                .primary_decoder()
                .decode_return(&call.method, &response.raw)
                .map_err(|err| {
                    error!(
                        contract = %call.target,
                        method = %call.method,
                        error = %err,
                        "failed to unpack call"
                    );
                    MulticallError::Abi(err)
                })?;
            staged.push(stage(0, call, 0, values)?);
            response.success.push(true);
        }
        Mode::Aggregate => {
            let result = IMulticall::aggregateCall::abi_decode_returns(&response.raw)
                .map_err(|err| malformed(mode, err))?;
            check_len(mode, result.returnData.len(), calls.len())?;
            response.block_number = Some(block_number(result.blockNumber)?);

            for (index, (call, data)) in calls.iter().zip(&result.returnData).enumerate() {
                // reaching this far means the aggregate itself succeeded
                response.success.push(true);
                let values = call
                    .primary_decoder()
                    .decode_return(&call.method, data)
                    .map_err(|err| unpack_error(index, call, err))?;
                staged.push(stage(index, call, 0, values)?);
            }
        }
        Mode::TryAggregate => {
            let results = IMulticall::tryAggregateCall::abi_decode_returns(&response.raw)
                .map_err(|err| malformed(mode, err))?;
            check_len(mode, results.len(), calls.len())?;
            decode_results(calls, &results, require_success, &mut response, &mut staged)?;
        }
        Mode::TryBlockAndAggregate => {
            let result = IMulticall::tryBlockAndAggregateCall::abi_decode_returns(&response.raw)
                .map_err(|err| malformed(mode, err))?;
            check_len(mode, result.returnData.len(), calls.len())?;
            response.block_number = Some(block_number(result.blockNumber)?);
            response.block_hash = Some(result.blockHash);
            decode_results(
                calls,
                &result.returnData,
                require_success,
                &mut response,
                &mut staged,
            )?;
        }
        Mode::GetCurrentBlockTimestamp => {
            response.timestamp = Some(block_timestamp(&response.raw)?);
        }
    }

    for Staged { slot, values } in staged {
        slot.fill(values);
    }
    Ok(response)
}

/// Per-call decoding for the `try*` modes
fn decode_results(
    calls: &[CallSpec],
    results: &[IMulticall::Result],
    require_success: bool,
    response: &mut Response,
    staged: &mut Vec<Staged>,
) -> Result<(), MulticallError> {
    for (index, (call, result)) in calls.iter().zip(results).enumerate() {
        response.success.push(result.success);
        if !result.success {
            continue;
        }

        match decode_with_fallback(call, &result.returnData) {
            Ok((slot, values)) => staged.push(stage(index, call, slot, values)?),
            Err(err) if require_success => return Err(unpack_error(index, call, err)),
            Err(err) => {
                warn!(
                    index,
                    contract = %call.target,
                    method = %call.method,
                    error = %err,
                    "no decoder matched call result, leaving outputs empty"
                );
            }
        }
    }
    Ok(())
}

/// Try each decoder in order, returning the index of the first that fits
fn decode_with_fallback(
    call: &CallSpec,
    data: &[u8],
) -> Result<(usize, Vec<DynSolValue>), AbiError> {
    let mut last_err = None;
    for (slot, decoder) in call.decoder_chain().iter().enumerate() {
        match decoder.decode_return(&call.method, data) {
            Ok(values) => return Ok((slot, values)),
            Err(err) => {
                debug!(slot, method = %call.method, error = %err, "decoder did not match");
                last_err = Some(err);
            }
        }
    }
    Err(last_err.unwrap_or_else(|| AbiError::UnknownMethod(call.method.clone())))
}

fn stage(
    index: usize,
    call: &CallSpec,
    slot: usize,
    values: Vec<DynSolValue>,
) -> Result<Staged, MulticallError> {
    let slot = call
        .outputs
        .get(slot)
        .cloned()
        .ok_or(MulticallError::MissingOutput { index, slot })?;
    Ok(Staged { slot, values })
}

fn unpack_error(index: usize, call: &CallSpec, source: AbiError) -> MulticallError {
    error!(
        index,
        contract = %call.target,
        method = %call.method,
        error = %source,
        "failed to unpack call result"
    );
    MulticallError::UnpackMulticall {
        index,
        target: call.target,
        method: call.method.clone(),
        source,
    }
}

fn malformed(mode: Mode, err: impl Display) -> MulticallError {
    error!(%mode, error = %err, "failed to unpack aggregator response");
    MulticallError::UnexpectedResponse(format!("malformed {} response: {}", mode, err))
}

fn check_len(mode: Mode, got: usize, expected: usize) -> Result<(), MulticallError> {
    if got != expected {
        error!(%mode, got, expected, "aggregator result count mismatch");
        return Err(MulticallError::UnexpectedResponse(format!(
            "{} returned {} results for {} calls",
            mode, got, expected
        )));
    }
    Ok(())
}

fn block_number(value: U256) -> Result<u64, MulticallError> {
    u64::try_from(value).map_err(|_| {
        MulticallError::UnexpectedResponse(format!("block number {} overflows u64", value))
    })
}

/// Read a `uint256` timestamp; only the low 8 bytes are significant
fn block_timestamp(raw: &[u8]) -> Result<u64, MulticallError> {
    if raw.len() != WORD_SIZE {
        return Err(MulticallError::UnexpectedResponse(format!(
            "timestamp must be {} bytes, got {}",
            WORD_SIZE,
            raw.len()
        )));
    }
    let mut low = [0u8; 8];
    low.copy_from_slice(&raw[WORD_SIZE - 8..]);
    Ok(u64::from_be_bytes(low))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use alloy_primitives::Address;

    use crate::infrastructure::abi::ContractAbi;

    fn pair() -> Arc<ContractAbi> {
        Arc::new(
            ContractAbi::from_signatures(
                "Pair",
                ["function getReserves() view returns (uint112, uint112, uint32)"],
            )
            .unwrap(),
        )
    }

    fn word(n: u64) -> DynSolValue {
        DynSolValue::Uint(U256::from(n), 256)
    }

    #[test]
    fn test_call_mode_writes_first_output() {
        let out = OutputSlot::new();
        let mut call = CallSpec::new(pair(), Address::repeat_byte(1), "getReserves");
        call.set_outputs(vec![out.clone()]);
        call.normalize();

        let raw = DynSolValue::Tuple(vec![word(10), word(20), word(30)]).abi_encode_params();
        let response = decode(Mode::Call, &[call], false, raw.into()).unwrap();

        assert_eq!(response.success, vec![true]);
        assert_eq!(
            out.get().unwrap(),
            vec![
                DynSolValue::Uint(U256::from(10), 112),
                DynSolValue::Uint(U256::from(20), 112),
                DynSolValue::Uint(U256::from(30), 32),
            ]
        );
    }

    #[test]
    fn test_call_mode_decode_error_is_unwrapped() {
        let mut call = CallSpec::new(pair(), Address::repeat_byte(1), "getReserves");
        call.set_outputs(vec![OutputSlot::new()]);

        let err = decode(Mode::Call, &[call], false, Bytes::from(vec![0u8; 4])).unwrap_err();
        assert!(matches!(err, MulticallError::Abi(AbiError::Decode { .. })));
    }

    #[test]
    fn test_missing_output_slot() {
        let call = CallSpec::new(pair(), Address::repeat_byte(1), "getReserves");
        let raw = DynSolValue::Tuple(vec![word(1), word(2), word(3)]).abi_encode_params();

        let err = decode(Mode::Call, &[call], false, raw.into()).unwrap_err();
        assert!(matches!(err, MulticallError::MissingOutput { index: 0, slot: 0 }));
    }

    #[test]
    fn test_timestamp_low_bytes() {
        let mut raw = vec![0u8; 32];
        raw[24..].copy_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x00, 0xBC, 0x61, 0x4E]);

        let response = decode(Mode::GetCurrentBlockTimestamp, &[], false, raw.into()).unwrap();
        assert_eq!(response.timestamp, Some(12_345_678));
        assert!(response.is_empty());
    }

    #[test]
    fn test_timestamp_wrong_length() {
        for len in [0, 8, 31, 33, 64] {
            let err = decode(Mode::GetCurrentBlockTimestamp, &[], false, vec![0u8; len].into())
                .unwrap_err();
            assert!(matches!(err, MulticallError::UnexpectedResponse(_)), "len {}", len);
        }
    }

    #[test]
    fn test_aggregate_garbage_is_unexpected() {
        let err = decode(Mode::Aggregate, &[], false, Bytes::from(vec![0xff; 7])).unwrap_err();
        assert!(matches!(err, MulticallError::UnexpectedResponse(_)));
    }

    #[test]
    fn test_block_number_overflow() {
        assert!(block_number(U256::MAX).is_err());
        assert_eq!(block_number(U256::from(19_000_000u64)).unwrap(), 19_000_000);
    }
}
