//! ABI table - parsed contract interfaces by name

use std::collections::HashMap;
use std::sync::Arc;

use super::ContractAbi;

/// Contract interfaces indexed by name
///
/// Built once at startup and shared by reference; entries are handed out as
/// `Arc`s so calls can hold on to their codec without borrowing the table.
#[derive(Debug, Default, Clone)]
pub struct AbiTable {
    contracts: HashMap<String, Arc<ContractAbi>>,
    /// Number of files scanned
    pub scanned_files: usize,
    /// Scan errors
    pub errors: Vec<String>,
}

impl AbiTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a contract interface
    ///
    /// Note: First interface for a given name wins (no overwrite)
    pub fn insert(&mut self, abi: ContractAbi) {
        self.contracts
            .entry(abi.name().to_string())
            .or_insert_with(|| Arc::new(abi));
    }

    pub fn get(&self, name: &str) -> Option<Arc<ContractAbi>> {
        self.contracts.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Merge another table into this one (first wins)
    pub fn merge(&mut self, other: Self) {
        self.scanned_files = self.scanned_files.saturating_add(other.scanned_files);
        self.errors.extend(other.errors);
        for (name, abi) in other.contracts {
            self.contracts.entry(name).or_insert(abi);
        }
    }

    /// Sorted contract names
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.contracts.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(name: &str, method: &str) -> ContractAbi {
        let signature = format!("function {}() view returns (uint256)", method);
        ContractAbi::from_signatures(name, [signature.as_str()]).unwrap()
    }

    #[test]
    fn test_table_insert_get() {
        let mut table = AbiTable::new();
        table.insert(pool("Pool", "getReserves"));

        assert_eq!(table.len(), 1);
        assert!(table.get("Pool").is_some());
        assert!(table.get("Token").is_none());
    }

    #[test]
    fn test_first_wins() {
        let mut table = AbiTable::new();
        table.insert(pool("Pool", "getReserves"));
        table.insert(pool("Pool", "getTradeInfo"));

        let abi = table.get("Pool").unwrap();
        assert!(abi.overloads("getReserves").is_ok());
        assert!(abi.overloads("getTradeInfo").is_err());
    }

    #[test]
    fn test_merge() {
        let mut left = AbiTable::new();
        left.insert(pool("Pool", "getReserves"));
        left.scanned_files = 2;

        let mut right = AbiTable::new();
        right.insert(pool("Pool", "getTradeInfo"));
        right.insert(pool("Token", "totalSupply"));
        right.scanned_files = 3;
        right.errors.push("bad.json: eof".into());

        left.merge(right);
        assert_eq!(left.names(), vec!["Pool", "Token"]);
        assert_eq!(left.scanned_files, 5);
        assert_eq!(left.errors.len(), 1);
        assert!(left.get("Pool").unwrap().overloads("getReserves").is_ok());
    }
}
