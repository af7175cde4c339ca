//! Encode and decode capability traits

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::Bytes;

use super::AbiError;

/// Turns a method name and its arguments into calldata
///
/// Implementations are shared between requests, so they must be
/// immutable after construction.
pub trait CallEncoder: Send + Sync {
    /// Encode `method(args...)`, including the 4-byte selector
    fn encode_call(&self, method: &str, args: &[DynSolValue]) -> Result<Bytes, AbiError>;
}

/// Interprets the raw return bytes of a method
pub trait ReturnDecoder: Send + Sync {
    /// Decode the return data of `method` into its output values
    ///
    /// # Returns
    /// * `Ok(values)` - One value per declared output
    /// * `Err(...)` - If the bytes do not match the output shape
    fn decode_return(&self, method: &str, data: &[u8]) -> Result<Vec<DynSolValue>, AbiError>;
}

/// Interprets a raw 32-byte storage word
pub trait SlotDecoder: Send + Sync {
    fn decode_slot(&self, word: &[u8]) -> Result<Vec<DynSolValue>, AbiError>;
}

/// A list of ABI types a storage word is decoded as
///
/// Decoding follows standard ABI parameter rules, so every type occupies a
/// full 32-byte word. Values packed into one slot are not split apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotLayout(Vec<DynSolType>);

impl SlotLayout {
    pub fn new(types: Vec<DynSolType>) -> Self {
        Self(types)
    }

    /// Parse a layout from Solidity type names (e.g. `["uint256"]` or `["address"]`)
    pub fn parse<'a>(types: impl IntoIterator<Item = &'a str>) -> Result<Self, AbiError> {
        types
            .into_iter()
            .map(|ty| {
                DynSolType::parse(ty.trim())
                    .map_err(|e| AbiError::InvalidAbi(format!("bad type '{}': {}", ty, e)))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn types(&self) -> &[DynSolType] {
        &self.0
    }
}

impl SlotDecoder for SlotLayout {
    fn decode_slot(&self, word: &[u8]) -> Result<Vec<DynSolValue>, AbiError> {
        if self.0.is_empty() {
            return Ok(Vec::new());
        }

        let decoded = DynSolType::Tuple(self.0.clone())
            .abi_decode_params(word)
            .map_err(|source| AbiError::Decode {
                method: "storage slot".to_string(),
                source,
            })?;

        match decoded {
            DynSolValue::Tuple(values) => Ok(values),
            other => Ok(vec![other]),
        }
    }
}
