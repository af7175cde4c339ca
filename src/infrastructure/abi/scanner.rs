//! ABI file scanner - builds an [`AbiTable`] from artifacts on disk

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::{AbiTable, ContractAbi};

/// Files larger than this are skipped
const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// ABI file scanner
pub struct AbiScanner;

impl AbiScanner {
    /// Scan a single root directory for ABI files
    ///
    /// Every `*.json` file holding either a raw ABI array or an object with
    /// an `abi` key becomes one entry, named after the file stem.
    pub fn scan(root: impl AsRef<Path>) -> AbiTable {
        let root = root.as_ref();
        let mut table = AbiTable::new();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !Self::is_ignored_dir(e.path()))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    table.errors.push(err.to_string());
                    continue;
                }
            };

            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|s| s.to_str()) != Some("json")
            {
                continue;
            }

            match entry.metadata() {
                Ok(meta) if meta.len() > MAX_FILE_SIZE => continue,
                Ok(_) => {}
                Err(err) => {
                    table.errors.push(format!("{}: {}", path.display(), err));
                    continue;
                }
            }

            table.scanned_files += 1;

            match Self::load_abi_file(path) {
                Ok(Some(abi)) => table.insert(abi),
                Ok(None) => {}
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping ABI file");
                    table.errors.push(format!("{}: {:#}", path.display(), err));
                }
            }
        }

        debug!(
            root = %root.display(),
            contracts = table.len(),
            scanned = table.scanned_files,
            "ABI scan finished"
        );
        table
    }

    /// Scan multiple root directories
    pub fn scan_roots(roots: &[PathBuf]) -> AbiTable {
        let mut table = AbiTable::new();
        for root in roots {
            table.merge(Self::scan(root));
        }
        table
    }

    /// Load a single ABI file, `None` if it holds no ABI
    fn load_abi_file(path: &Path) -> anyhow::Result<Option<ContractAbi>> {
        let content = fs::read_to_string(path)?;
        let value: serde_json::Value = serde_json::from_str(&content)?;

        let abi_value = if value.is_array() {
            value
        } else if let Some(abi) = value.get("abi") {
            abi.clone()
        } else {
            return Ok(None);
        };

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .context("file name is not valid UTF-8")?;
        let abi = serde_json::from_value(abi_value).context("malformed ABI")?;

        Ok(Some(ContractAbi::new(name, abi)))
    }

    /// Check if a path should be ignored
    fn is_ignored_dir(path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|name| matches!(name, ".git" | "target" | "node_modules" | "cache"))
            .unwrap_or(false)
    }
}
