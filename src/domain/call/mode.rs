//! Batch modes and block selectors

use std::fmt;
use std::str::FromStr;

use alloy_primitives::B256;

use super::MulticallError;

/// How a batch is sent and how its response is read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// One call sent straight to its own target
    Call,
    /// `aggregate`: all calls must succeed on-chain
    Aggregate,
    /// `tryAggregate`: each call reports its own success flag
    TryAggregate,
    /// `tryBlockAndAggregate`: like `TryAggregate`, plus block number and hash
    TryBlockAndAggregate,
    /// `getCurrentBlockTimestamp`: ignores the calls entirely
    GetCurrentBlockTimestamp,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::Call,
        Mode::Aggregate,
        Mode::TryAggregate,
        Mode::TryBlockAndAggregate,
        Mode::GetCurrentBlockTimestamp,
    ];

    /// Name of the aggregator method (or `call` for direct calls)
    pub const fn method_name(&self) -> &'static str {
        match self {
            Mode::Call => "call",
            Mode::Aggregate => "aggregate",
            Mode::TryAggregate => "tryAggregate",
            Mode::TryBlockAndAggregate => "tryBlockAndAggregate",
            Mode::GetCurrentBlockTimestamp => "getCurrentBlockTimestamp",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

impl FromStr for Mode {
    type Err = MulticallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|mode| mode.method_name() == s)
            .ok_or_else(|| MulticallError::MethodNotSupported(s.to_string()))
    }
}

/// The block a read is evaluated at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockSelector {
    Number(u64),
    Hash(B256),
}

impl fmt::Display for BlockSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockSelector::Number(n) => write!(f, "#{}", n),
            BlockSelector::Hash(h) => write!(f, "{}", h),
        }
    }
}

impl FromStr for BlockSelector {
    type Err = String;

    /// Accepts a decimal block number or a 32-byte `0x` hash
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with("0x") || s.starts_with("0X") {
            if s.len() == 66 {
                return s
                    .parse::<B256>()
                    .map(BlockSelector::Hash)
                    .map_err(|e| format!("invalid block hash: {}", e));
            }
            return u64::from_str_radix(&s[2..], 16)
                .map(BlockSelector::Number)
                .map_err(|e| format!("invalid block number: {}", e));
        }
        s.parse::<u64>()
            .map(BlockSelector::Number)
            .map_err(|e| format!("invalid block number: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_round_trips_through_name() {
        for mode in Mode::ALL {
            assert_eq!(mode.method_name().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_unknown_mode() {
        let err = "blockAndAggregate".parse::<Mode>().unwrap_err();
        assert!(matches!(err, MulticallError::MethodNotSupported(name) if name == "blockAndAggregate"));
    }

    #[test]
    fn test_parse_block_selector() {
        assert_eq!("17000000".parse::<BlockSelector>().unwrap(), BlockSelector::Number(17_000_000));
        assert_eq!("0x10".parse::<BlockSelector>().unwrap(), BlockSelector::Number(16));

        let hash = format!("0x{}", "ab".repeat(32));
        assert_eq!(
            hash.parse::<BlockSelector>().unwrap(),
            BlockSelector::Hash(B256::repeat_byte(0xab))
        );
        assert!("latest".parse::<BlockSelector>().is_err());
    }
}
