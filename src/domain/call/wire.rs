//! Aggregator contract interface

use alloy_primitives::{address, Address};
use alloy_sol_types::sol;

/// Canonical Multicall3 deployment, same address on most EVM chains
pub const MULTICALL3_ADDRESS: Address = address!("cA11bde05977b3631167028862bE2a173976CA11");

/// Width of a single ABI-encoded `uint256` return value
pub const WORD_SIZE: usize = 32;

sol! {
    /// The subset of the Multicall/Multicall2/Multicall3 interface used here
    interface IMulticall {
        #[derive(Debug, PartialEq, Eq)]
        struct Call {
            address target;
            bytes callData;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct Result {
            bool success;
            bytes returnData;
        }

        function aggregate(Call[] calldata calls) external returns (uint256 blockNumber, bytes[] memory returnData);

        function tryAggregate(bool requireSuccess, Call[] calldata calls) external returns (Result[] memory returnData);

        function tryBlockAndAggregate(bool requireSuccess, Call[] calldata calls) external returns (uint256 blockNumber, bytes32 blockHash, Result[] memory returnData);

        function getCurrentBlockTimestamp() external view returns (uint256 timestamp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_sol_types::SolCall;

    #[test]
    fn test_selectors() {
        assert_eq!(IMulticall::aggregateCall::SELECTOR, [0x25, 0x2d, 0xba, 0x42]);
        assert_eq!(IMulticall::tryAggregateCall::SELECTOR, [0xbc, 0xe3, 0x8b, 0xd7]);
        assert_eq!(IMulticall::tryBlockAndAggregateCall::SELECTOR, [0x39, 0x95, 0x42, 0xe9]);
        assert_eq!(IMulticall::getCurrentBlockTimestampCall::SELECTOR, [0x0f, 0x28, 0xc9, 0x7d]);
    }
}
