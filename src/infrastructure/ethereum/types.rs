//! Type conversions between domain types and Alloy types

use alloy::rpc::types::BlockId;

use crate::domain::call::BlockSelector;

/// Convert an optional block selector into an Alloy block id (latest when unset)
pub fn block_id(selector: Option<BlockSelector>) -> BlockId {
    match selector {
        Some(BlockSelector::Number(number)) => BlockId::number(number),
        Some(BlockSelector::Hash(hash)) => BlockId::hash(hash),
        None => BlockId::latest(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::B256;

    #[test]
    fn test_block_id() {
        assert_eq!(block_id(None), BlockId::latest());
        assert_eq!(block_id(Some(BlockSelector::Number(7))), BlockId::number(7));

        let hash = B256::repeat_byte(0x42);
        assert_eq!(block_id(Some(BlockSelector::Hash(hash))), BlockId::hash(hash));
    }
}
