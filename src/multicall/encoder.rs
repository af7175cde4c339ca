//! Request encoding - one wire payload per batch

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::SolCall;
use tracing::error;

use crate::domain::call::wire::IMulticall;
use crate::domain::call::{CallSpec, Mode, MulticallError};

/// Calldata and the address it is sent to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WirePayload {
    pub target: Address,
    pub data: Bytes,
}

/// Build the payload for `mode`
///
/// Pure apart from invoking each call's encoder. Any per-call encode
/// failure aborts the whole batch before anything is sent.
pub fn encode(
    mode: Mode,
    calls: &[CallSpec],
    require_success: bool,
    aggregator: Address,
) -> Result<WirePayload, MulticallError> {
    match mode {
        Mode::Call => {
            let call = single_call(calls)?;
            Ok(WirePayload {
                target: call.target,
                data: encode_one(call)?,
            })
        }
        Mode::Aggregate => {
            let calls = encode_calls(calls)?;
            Ok(WirePayload {
                target: aggregator,
                data: IMulticall::aggregateCall { calls }.abi_encode().into(),
            })
        }
        Mode::TryAggregate => {
            let calls = encode_calls(calls)?;
            Ok(WirePayload {
                target: aggregator,
                data: IMulticall::tryAggregateCall {
                    requireSuccess: require_success,
                    calls,
                }
                .abi_encode()
                .into(),
            })
        }
        Mode::TryBlockAndAggregate => {
            let calls = encode_calls(calls)?;
            Ok(WirePayload {
                target: aggregator,
                data: IMulticall::tryBlockAndAggregateCall {
                    requireSuccess: require_success,
                    calls,
                }
                .abi_encode()
                .into(),
            })
        }
        Mode::GetCurrentBlockTimestamp => Ok(WirePayload {
            target: aggregator,
            data: IMulticall::getCurrentBlockTimestampCall {}.abi_encode().into(),
        }),
    }
}

/// The only call of a `call` mode request
pub(crate) fn single_call(calls: &[CallSpec]) -> Result<&CallSpec, MulticallError> {
    match calls {
        [call] => Ok(call),
        _ => Err(MulticallError::WrongCallParam { count: calls.len() }),
    }
}

fn encode_one(call: &CallSpec) -> Result<Bytes, MulticallError> {
    call.encoder
        .encode_call(&call.method, &call.args)
        .map_err(|err| {
            error!(
                contract = %call.target,
                method = %call.method,
                error = %err,
                "failed to build call data"
            );
            MulticallError::Abi(err)
        })
}

fn encode_calls(calls: &[CallSpec]) -> Result<Vec<IMulticall::Call>, MulticallError> {
    calls
        .iter()
        .map(|call| {
            Ok(IMulticall::Call {
                target: call.target,
                callData: encode_one(call)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use alloy_dyn_abi::{DynSolValue, JsonAbiExt};
    use alloy_primitives::U256;

    use crate::domain::call::wire::MULTICALL3_ADDRESS;
    use crate::infrastructure::abi::ContractAbi;

    fn token() -> Arc<ContractAbi> {
        Arc::new(
            ContractAbi::from_signatures(
                "Token",
                [
                    "function balanceOf(address owner) view returns (uint256)",
                    "function totalSupply() view returns (uint256)",
                ],
            )
            .unwrap(),
        )
    }

    fn balance_of(target: Address, owner: Address) -> CallSpec {
        CallSpec::new(token(), target, "balanceOf").args(vec![DynSolValue::Address(owner)])
    }

    #[test]
    fn test_call_mode_targets_the_call() {
        let target = Address::repeat_byte(0x01);
        let calls = vec![CallSpec::new(token(), target, "totalSupply")];

        let payload = encode(Mode::Call, &calls, false, MULTICALL3_ADDRESS).unwrap();
        assert_eq!(payload.target, target);
        assert_eq!(hex::encode(&payload.data), "18160ddd");
    }

    #[test]
    fn test_call_mode_needs_exactly_one_call() {
        let target = Address::repeat_byte(0x01);

        let err = encode(Mode::Call, &[], false, MULTICALL3_ADDRESS).unwrap_err();
        assert!(matches!(err, MulticallError::WrongCallParam { count: 0 }));

        let two = vec![
            CallSpec::new(token(), target, "totalSupply"),
            CallSpec::new(token(), target, "totalSupply"),
        ];
        let err = encode(Mode::Call, &two, false, MULTICALL3_ADDRESS).unwrap_err();
        assert!(matches!(err, MulticallError::WrongCallParam { count: 2 }));
    }

    #[test]
    fn test_aggregate_wraps_pairs_in_order() {
        let first = Address::repeat_byte(0x01);
        let second = Address::repeat_byte(0x02);
        let owner = Address::repeat_byte(0xaa);
        let calls = vec![
            balance_of(first, owner),
            CallSpec::new(token(), second, "totalSupply"),
        ];

        let payload = encode(Mode::Aggregate, &calls, false, MULTICALL3_ADDRESS).unwrap();
        assert_eq!(payload.target, MULTICALL3_ADDRESS);

        let decoded = IMulticall::aggregateCall::abi_decode(&payload.data).unwrap();
        assert_eq!(decoded.calls.len(), 2);
        assert_eq!(decoded.calls[0].target, first);
        assert_eq!(&decoded.calls[0].callData[..4], &[0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(decoded.calls[1].target, second);
        assert_eq!(&decoded.calls[1].callData[..], &[0x18, 0x16, 0x0d, 0xdd]);
    }

    #[test]
    fn test_aggregate_calldata_decodes_back_to_args() {
        let owner = Address::repeat_byte(0xaa);
        let calls = vec![
            balance_of(Address::repeat_byte(0x01), owner),
            balance_of(Address::repeat_byte(0x02), Address::ZERO),
        ];

        let payload = encode(Mode::TryAggregate, &calls, false, MULTICALL3_ADDRESS).unwrap();
        let decoded = IMulticall::tryAggregateCall::abi_decode(&payload.data).unwrap();

        let abi = token();
        let function = abi.function("balanceOf", 1).unwrap();
        for (wire, expected) in decoded.calls.iter().zip([owner, Address::ZERO]) {
            assert_eq!(&wire.callData[..4], &function.selector()[..]);
            let args = function.abi_decode_input(&wire.callData[4..]).unwrap();
            assert_eq!(args, vec![DynSolValue::Address(expected)]);
        }
    }

    #[test]
    fn test_try_aggregate_carries_require_success() {
        let calls = vec![balance_of(Address::repeat_byte(0x01), Address::ZERO)];

        for require_success in [true, false] {
            let payload =
                encode(Mode::TryAggregate, &calls, require_success, MULTICALL3_ADDRESS).unwrap();
            let decoded = IMulticall::tryAggregateCall::abi_decode(&payload.data).unwrap();
            assert_eq!(decoded.requireSuccess, require_success);
            assert_eq!(decoded.calls.len(), 1);
        }
    }

    #[test]
    fn test_try_block_and_aggregate_selector() {
        let calls = vec![balance_of(Address::repeat_byte(0x01), Address::ZERO)];
        let payload =
            encode(Mode::TryBlockAndAggregate, &calls, true, MULTICALL3_ADDRESS).unwrap();
        assert_eq!(&payload.data[..4], &IMulticall::tryBlockAndAggregateCall::SELECTOR);
    }

    #[test]
    fn test_encode_failure_aborts_batch() {
        let target = Address::repeat_byte(0x01);
        let calls = vec![
            CallSpec::new(token(), target, "totalSupply"),
            CallSpec::new(token(), target, "balanceOf")
                .args(vec![DynSolValue::Uint(U256::from(1), 256)]),
        ];

        let err = encode(Mode::Aggregate, &calls, false, MULTICALL3_ADDRESS).unwrap_err();
        assert!(matches!(err, MulticallError::Abi(_)));
    }

    #[test]
    fn test_timestamp_ignores_calls() {
        let calls = vec![CallSpec::new(token(), Address::repeat_byte(0x01), "missing")];
        let payload =
            encode(Mode::GetCurrentBlockTimestamp, &calls, false, MULTICALL3_ADDRESS).unwrap();
        assert_eq!(payload.target, MULTICALL3_ADDRESS);
        assert_eq!(hex::encode(&payload.data), "0f28c97d");
    }
}
