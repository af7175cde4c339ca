//! Contract interface capability backed by alloy-json-abi

use alloy_dyn_abi::{DynSolType, DynSolValue, FunctionExt, JsonAbiExt, Specifier};
use alloy_json_abi::{Function, JsonAbi};
use alloy_primitives::Bytes;

use crate::domain::abi::{AbiError, CallEncoder, ReturnDecoder};

/// A parsed contract interface
///
/// Implements both [`CallEncoder`] and [`ReturnDecoder`]. Overloaded
/// functions are resolved by argument count when encoding, and by the first
/// overload whose outputs fit the data when decoding.
#[derive(Debug, Clone)]
pub struct ContractAbi {
    name: String,
    abi: JsonAbi,
}

impl ContractAbi {
    pub fn new(name: impl Into<String>, abi: JsonAbi) -> Self {
        Self {
            name: name.into(),
            abi,
        }
    }

    /// Parse a JSON ABI array
    pub fn from_json(name: impl Into<String>, json: &str) -> Result<Self, AbiError> {
        let abi: JsonAbi =
            serde_json::from_str(json).map_err(|e| AbiError::InvalidAbi(e.to_string()))?;
        Ok(Self::new(name, abi))
    }

    /// Parse human-readable signatures,
    /// e.g. `function balanceOf(address) view returns (uint256)`
    pub fn from_signatures<'a>(
        name: impl Into<String>,
        signatures: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, AbiError> {
        let abi = JsonAbi::parse(signatures).map_err(|e| AbiError::InvalidAbi(e.to_string()))?;
        Ok(Self::new(name, abi))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// All overloads of `method`
    pub fn overloads(&self, method: &str) -> Result<&[Function], AbiError> {
        self.abi
            .function(method)
            .map(Vec::as_slice)
            .filter(|overloads| !overloads.is_empty())
            .ok_or_else(|| AbiError::UnknownMethod(method.to_string()))
    }

    /// The overload of `method` taking `argc` arguments
    pub fn function(&self, method: &str, argc: usize) -> Result<&Function, AbiError> {
        self.overloads(method)?
            .iter()
            .find(|function| function.inputs.len() == argc)
            .ok_or_else(|| AbiError::NoMatchingOverload {
                method: method.to_string(),
                given: argc,
            })
    }

    /// Resolved input types of the overload of `method` taking `argc` arguments
    pub fn input_types(&self, method: &str, argc: usize) -> Result<Vec<DynSolType>, AbiError> {
        self.function(method, argc)?
            .inputs
            .iter()
            .map(|param| {
                param.resolve().map_err(|source| AbiError::Encode {
                    method: method.to_string(),
                    source,
                })
            })
            .collect()
    }
}

impl CallEncoder for ContractAbi {
    fn encode_call(&self, method: &str, args: &[DynSolValue]) -> Result<Bytes, AbiError> {
        let function = self.function(method, args.len())?;
        function
            .abi_encode_input(args)
            .map(Bytes::from)
            .map_err(|source| AbiError::Encode {
                method: method.to_string(),
                source,
            })
    }
}

impl ReturnDecoder for ContractAbi {
    fn decode_return(&self, method: &str, data: &[u8]) -> Result<Vec<DynSolValue>, AbiError> {
        let mut last_err = None;
        for function in self.overloads(method)? {
            match function.abi_decode_output(data) {
                Ok(values) => return Ok(values),
                Err(source) => last_err = Some(source),
            }
        }

        // overloads() never returns an empty slice
        Err(match last_err {
            Some(source) => AbiError::Decode {
                method: method.to_string(),
                source,
            },
            None => AbiError::UnknownMethod(method.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, U256};

    fn erc20() -> ContractAbi {
        ContractAbi::from_signatures(
            "ERC20",
            [
                "function balanceOf(address owner) view returns (uint256)",
                "function transfer(address to, uint256 amount) returns (bool)",
                "function decimals() view returns (uint8)",
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_encode_transfer() {
        let abi = erc20();
        let to = Address::from_slice(&hex::decode("1234567890123456789012345678901234567890").unwrap());

        let calldata = abi
            .encode_call(
                "transfer",
                &[DynSolValue::Address(to), DynSolValue::Uint(U256::from(1000), 256)],
            )
            .unwrap();

        assert_eq!(
            hex::encode(&calldata),
            "a9059cbb000000000000000000000000123456789012345678901234567890123456789000000000000000000000000000000000000000000000000000000000000003e8"
        );
    }

    #[test]
    fn test_encode_unknown_method() {
        let err = erc20().encode_call("mint", &[]).unwrap_err();
        assert!(matches!(err, AbiError::UnknownMethod(name) if name == "mint"));
    }

    #[test]
    fn test_encode_wrong_arg_count() {
        let err = erc20().encode_call("balanceOf", &[]).unwrap_err();
        assert!(matches!(err, AbiError::NoMatchingOverload { given: 0, .. }));
    }

    #[test]
    fn test_encode_wrong_arg_type() {
        let err = erc20()
            .encode_call("balanceOf", &[DynSolValue::Bool(true)])
            .unwrap_err();
        assert!(matches!(err, AbiError::Encode { .. }));
    }

    #[test]
    fn test_decode_return() {
        let data = DynSolValue::Uint(U256::from(18), 256).abi_encode();
        let values = erc20().decode_return("decimals", &data).unwrap();
        assert_eq!(values, vec![DynSolValue::Uint(U256::from(18), 8)]);
    }

    #[test]
    fn test_decode_short_return() {
        let err = erc20().decode_return("balanceOf", &[0u8; 4]).unwrap_err();
        assert!(matches!(err, AbiError::Decode { .. }));
    }

    #[test]
    fn test_from_json() {
        let json = r#"[{
            "type": "function",
            "name": "totalSupply",
            "inputs": [],
            "outputs": [{"name": "", "type": "uint256"}],
            "stateMutability": "view"
        }]"#;
        let abi = ContractAbi::from_json("Token", json).unwrap();
        assert_eq!(abi.name(), "Token");
        assert_eq!(abi.encode_call("totalSupply", &[]).unwrap().len(), 4);
    }

    #[test]
    fn test_input_types() {
        let types = erc20().input_types("transfer", 2).unwrap();
        assert_eq!(types, vec![DynSolType::Address, DynSolType::Uint(256)]);
    }
}
