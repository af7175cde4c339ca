//! Textual argument parsing and value formatting
//!
//! Used by the command line to turn `0x..`, `1000`, `[1,2]`, `(a,b)` style
//! arguments into ABI values and to print decoded results back.

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Address, FixedBytes, I256, U256};
use anyhow::{anyhow, bail, Context, Result};

/// Parse one argument per type
pub fn parse_args(types: &[DynSolType], args: &[&str]) -> Result<Vec<DynSolValue>> {
    if types.len() != args.len() {
        bail!(
            "Argument count mismatch: expected {} arguments, got {}",
            types.len(),
            args.len()
        );
    }

    types
        .iter()
        .zip(args)
        .enumerate()
        .map(|(i, (ty, arg))| {
            parse_value(ty, arg)
                .with_context(|| format!("argument {} (type {})", i + 1, ty.sol_type_name()))
        })
        .collect()
}

/// Parse a single value according to its type
pub fn parse_value(ty: &DynSolType, arg: &str) -> Result<DynSolValue> {
    let arg = arg.trim();
    match ty {
        DynSolType::Address => arg
            .parse::<Address>()
            .map(DynSolValue::Address)
            .map_err(|e| anyhow!("Invalid address: {}", e)),

        DynSolType::Bool => match arg.to_lowercase().as_str() {
            "true" | "1" => Ok(DynSolValue::Bool(true)),
            "false" | "0" => Ok(DynSolValue::Bool(false)),
            _ => bail!("Invalid bool: expected true/false, got '{}'", arg),
        },

        DynSolType::Int(size) => {
            let value = match strip_hex(arg) {
                Some(digits) => I256::from_be_bytes(left_pad::<32>(digits)?),
                None => arg
                    .parse::<I256>()
                    .map_err(|e| anyhow!("Invalid integer: {}", e))?,
            };
            Ok(DynSolValue::Int(value, *size))
        }

        DynSolType::Uint(size) => {
            let value = match strip_hex(arg) {
                Some(digits) => U256::from_be_bytes(left_pad::<32>(digits)?),
                None => arg
                    .parse::<U256>()
                    .map_err(|e| anyhow!("Invalid unsigned integer: {}", e))?,
            };
            Ok(DynSolValue::Uint(value, *size))
        }

        DynSolType::Bytes => Ok(DynSolValue::Bytes(decode_hex(arg)?)),

        DynSolType::FixedBytes(size) => {
            let bytes = decode_hex(arg)?;
            if bytes.len() != *size {
                bail!(
                    "Invalid bytes length: expected {} bytes, got {}",
                    size,
                    bytes.len()
                );
            }
            let mut word = [0u8; 32];
            word[..bytes.len()].copy_from_slice(&bytes);
            Ok(DynSolValue::FixedBytes(FixedBytes::from(word), *size))
        }

        DynSolType::String => {
            let unquoted = arg
                .strip_prefix('"')
                .and_then(|s| s.strip_suffix('"'))
                .unwrap_or(arg);
            Ok(DynSolValue::String(unquoted.to_string()))
        }

        DynSolType::Array(inner) => {
            let items = split_list(arg, '[', ']')?;
            items
                .iter()
                .map(|item| parse_value(inner, item))
                .collect::<Result<Vec<_>>>()
                .map(DynSolValue::Array)
        }

        DynSolType::FixedArray(inner, size) => {
            let items = split_list(arg, '[', ']')?;
            if items.len() != *size {
                bail!(
                    "Fixed array size mismatch: expected {} elements, got {}",
                    size,
                    items.len()
                );
            }
            items
                .iter()
                .map(|item| parse_value(inner, item))
                .collect::<Result<Vec<_>>>()
                .map(DynSolValue::FixedArray)
        }

        DynSolType::Tuple(types) => {
            let items = split_list(arg, '(', ')')?;
            if items.len() != types.len() {
                bail!(
                    "Tuple size mismatch: expected {} elements, got {}",
                    types.len(),
                    items.len()
                );
            }
            types
                .iter()
                .zip(&items)
                .map(|(ty, item)| parse_value(ty, item))
                .collect::<Result<Vec<_>>>()
                .map(DynSolValue::Tuple)
        }

        _ => bail!("Unsupported type: {}", ty.sol_type_name()),
    }
}

/// Split a comma separated list at the top nesting level, keeping nested
/// brackets and parentheses intact
pub fn split_top_level(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match c {
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(input[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }

    let last = input[start..].trim();
    if !last.is_empty() || !parts.is_empty() {
        parts.push(last);
    }
    parts
}

fn split_list(arg: &str, open: char, close: char) -> Result<Vec<&str>> {
    let inner = arg
        .strip_prefix(open)
        .and_then(|s| s.strip_suffix(close))
        .ok_or_else(|| anyhow!("expected value enclosed in '{}...{}'", open, close))?;
    Ok(split_top_level(inner))
}

fn strip_hex(s: &str) -> Option<&str> {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
}

fn decode_hex(s: &str) -> Result<Vec<u8>> {
    hex::decode(strip_hex(s).unwrap_or(s)).map_err(|e| anyhow!("Invalid hex: {}", e))
}

/// Hex digits left-padded to `N` bytes
fn left_pad<const N: usize>(digits: &str) -> Result<[u8; N]> {
    let digits = if digits.len() % 2 == 1 {
        format!("0{}", digits)
    } else {
        digits.to_string()
    };
    let bytes = hex::decode(&digits).map_err(|e| anyhow!("Invalid hex: {}", e))?;
    if bytes.len() > N {
        bail!("Hex value too large: expected max {} bytes, got {}", N, bytes.len());
    }
    let mut padded = [0u8; N];
    padded[N - bytes.len()..].copy_from_slice(&bytes);
    Ok(padded)
}

/// Format a decoded value for display
pub fn format_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Int(i, _) => i.to_string(),
        DynSolValue::Uint(u, _) => u.to_string(),
        DynSolValue::FixedBytes(word, size) => {
            format!("0x{}", hex::encode(&word.as_slice()[..(*size).min(32)]))
        }
        DynSolValue::Address(addr) => addr.to_checksum(None),
        DynSolValue::Function(func) => format!("0x{}", hex::encode(func.as_slice())),
        DynSolValue::Bytes(bytes) => format!("0x{}", hex::encode(bytes)),
        DynSolValue::String(s) => format!("{:?}", s),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) => {
            let items: Vec<String> = items.iter().map(format_value).collect();
            format!("[{}]", items.join(", "))
        }
        DynSolValue::Tuple(fields) => {
            let fields: Vec<String> = fields.iter().map(format_value).collect();
            format!("({})", fields.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        let ty = DynSolType::Bool;
        assert!(matches!(parse_value(&ty, "true"), Ok(DynSolValue::Bool(true))));
        assert!(matches!(parse_value(&ty, "0"), Ok(DynSolValue::Bool(false))));
        assert!(parse_value(&ty, "maybe").is_err());
    }

    #[test]
    fn test_parse_uint_hex_and_decimal() {
        let ty = DynSolType::Uint(256);
        assert_eq!(
            parse_value(&ty, "0x3e8").unwrap(),
            DynSolValue::Uint(U256::from(1000), 256)
        );
        assert_eq!(
            parse_value(&ty, "1000").unwrap(),
            DynSolValue::Uint(U256::from(1000), 256)
        );
    }

    #[test]
    fn test_parse_nested_array_of_tuples() {
        let ty = DynSolType::parse("(uint256,bool)[]").unwrap();
        let value = parse_value(&ty, "[(1,true),(2,false)]").unwrap();
        assert_eq!(
            value,
            DynSolValue::Array(vec![
                DynSolValue::Tuple(vec![
                    DynSolValue::Uint(U256::from(1), 256),
                    DynSolValue::Bool(true)
                ]),
                DynSolValue::Tuple(vec![
                    DynSolValue::Uint(U256::from(2), 256),
                    DynSolValue::Bool(false)
                ]),
            ])
        );
    }

    #[test]
    fn test_parse_empty_array() {
        let ty = DynSolType::parse("uint256[]").unwrap();
        assert_eq!(parse_value(&ty, "[]").unwrap(), DynSolValue::Array(vec![]));
    }

    #[test]
    fn test_parse_fixed_bytes() {
        let ty = DynSolType::FixedBytes(4);
        let value = parse_value(&ty, "0xdeadbeef").unwrap();
        assert_eq!(format_value(&value), "0xdeadbeef");
        assert!(parse_value(&ty, "0xdead").is_err());
    }

    #[test]
    fn test_argument_count_mismatch() {
        let types = vec![DynSolType::Address, DynSolType::Uint(256)];
        let err = parse_args(&types, &["0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0"]).unwrap_err();
        assert!(err.to_string().contains("Argument count mismatch"));
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(split_top_level("1,[2,3],(4,5)"), vec!["1", "[2,3]", "(4,5)"]);
        assert!(split_top_level("").is_empty());
    }

    #[test]
    fn test_format_value() {
        let value = DynSolValue::Tuple(vec![
            DynSolValue::Uint(U256::from(7), 112),
            DynSolValue::String("hi".into()),
        ]);
        assert_eq!(format_value(&value), "(7, \"hi\")");
    }
}
