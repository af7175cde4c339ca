use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, B256};
use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ethbatch::config::{self, Config};
use ethbatch::infrastructure::abi::args::{format_value, parse_args, split_top_level};
use ethbatch::{
    AbiScanner, AbiTable, BlockSelector, CallSpec, Client, ContractAbi, Mode, OutputSlot,
    ProviderConfig, SlotLayout,
};

#[derive(Debug, Parser)]
#[command(
    name = "ethbatch",
    version,
    about = "Batch read-only contract calls through a Multicall aggregator"
)]
struct Args {
    /// HTTP JSON-RPC endpoint (e.g. http://localhost:8545)
    #[arg(long, global = true)]
    rpc: Option<String>,

    /// WebSocket endpoint (e.g. ws://localhost:8546)
    #[arg(long, global = true)]
    ws: Option<String>,

    /// IPC path (e.g. ~/.ethereum/geth.ipc). Unix only.
    #[arg(long, global = true)]
    ipc: Option<PathBuf>,

    /// Aggregator address, defaults to the canonical Multicall3 deployment
    #[arg(long, global = true)]
    multicall: Option<Address>,

    /// Block number or hash to read at (default: latest)
    #[arg(long, global = true)]
    block: Option<BlockSelector>,

    /// Request timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the current block timestamp reported by the aggregator
    Timestamp,

    /// Run a single call directly against its contract
    Call {
        target: Address,
        /// `function name(types) returns (types)` or `<AbiName>.<method>`
        signature: String,
        args: Vec<String>,
    },

    /// Run several calls in one aggregator round trip
    Batch {
        /// `<target>=<signature>[=<comma separated args>]`
        #[arg(required = true)]
        calls: Vec<String>,

        #[arg(long, value_enum, default_value_t = BatchMode::Try)]
        mode: BatchMode,

        /// Fail the batch when any call fails
        #[arg(long)]
        strict: bool,
    },

    /// Read and decode a storage slot
    Storage {
        account: Address,
        slot: B256,
        /// ABI types of the value, each taking a full 32-byte word (e.g. `uint256` or `address`)
        types: Vec<String>,
    },

    /// List ABIs found under the configured ABI paths
    Abis,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BatchMode {
    Aggregate,
    Try,
    TryBlock,
}

impl From<BatchMode> for Mode {
    fn from(mode: BatchMode) -> Self {
        match mode {
            BatchMode::Aggregate => Mode::Aggregate,
            BatchMode::Try => Mode::TryAggregate,
            BatchMode::TryBlock => Mode::TryBlockAndAggregate,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let args = Args::parse();
    let config = config::load();
    let table = AbiScanner::scan_roots(&config.abi_roots());

    if let Command::Abis = args.command {
        info!(files = table.scanned_files, abis = table.len(), "scanned ABI paths");
        for name in table.names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let client = connect(&args, &config).await?;
    let request = client.request().block(args.block);

    match args.command {
        Command::Timestamp => {
            let timestamp = request.get_current_block_timestamp().await?;
            println!("{}", timestamp);
        }
        Command::Call {
            target,
            signature,
            args: call_args,
        } => {
            let call_args: Vec<&str> = call_args.iter().map(String::as_str).collect();
            let call = resolve_call(&table, target, &signature, &call_args)?;
            let out = OutputSlot::new();
            request.add_call(call, vec![out.clone()]).call().await?;
            print_values(out.take().unwrap_or_default());
        }
        Command::Batch {
            calls,
            mode,
            strict,
        } => {
            let mut request = request.require_success(strict);
            let mut outputs = Vec::with_capacity(calls.len());
            for entry in &calls {
                let (target, signature, call_args) = split_batch_entry(entry)?;
                let call = resolve_call(&table, target, signature, &call_args)
                    .with_context(|| format!("invalid call '{}'", entry))?;
                let out = OutputSlot::new();
                request.push_call(call, vec![out.clone()]);
                outputs.push(out);
            }

            let response = request.execute(mode.into()).await?;
            if let Some(number) = response.block_number {
                info!(block = number, hash = ?response.block_hash, "batch executed");
            }
            for (index, (entry, out)) in calls.iter().zip(&outputs).enumerate() {
                match out.get() {
                    Some(values) => println!("[{}] {} -> {}", index, entry, join_values(&values)),
                    None if response.is_success(index) => {
                        println!("[{}] {} -> <undecodable>", index, entry)
                    }
                    None => println!("[{}] {} -> <failed>", index, entry),
                }
            }
        }
        Command::Storage {
            account,
            slot,
            types,
        } => {
            let layout = SlotLayout::parse(types.iter().map(String::as_str))?;
            let values = request.get_storage_at(account, slot, &layout).await?;
            print_values(values);
        }
        // listed before connecting
        Command::Abis => {}
    }

    Ok(())
}

async fn connect(args: &Args, config: &Config) -> Result<Client> {
    let endpoint = endpoint_from_args_and_config(args, config)?;
    let timeout = args
        .timeout_ms
        .map(Duration::from_millis)
        .or_else(|| config.timeout());
    let mut client = Client::connect(endpoint).await?.with_timeout(timeout);
    if let Some(multicall) = args.multicall.or(config.multicall) {
        client = client.with_multicall(multicall);
    }
    Ok(client)
}

/// Command line arguments take precedence over the config file
fn endpoint_from_args_and_config(args: &Args, config: &Config) -> Result<ProviderConfig> {
    let ipc = args.ipc.clone().or_else(|| config.ipc.as_ref().map(PathBuf::from));
    if let Some(path) = ipc {
        #[cfg(unix)]
        return Ok(ProviderConfig::Ipc(path));
        #[cfg(not(unix))]
        bail!("IPC endpoint {} is only supported on Unix", path.display());
    }
    if let Some(url) = args.ws.clone().or_else(|| config.ws.clone()) {
        return Ok(ProviderConfig::WebSocket(url));
    }
    let url = args
        .rpc
        .clone()
        .or_else(|| config.rpc.clone())
        .unwrap_or_else(|| "http://localhost:8545".to_string());
    Ok(ProviderConfig::Http(url))
}

/// Build a call from `function ...` or `<AbiName>.<method>`
fn resolve_call(
    table: &AbiTable,
    target: Address,
    signature: &str,
    args: &[&str],
) -> Result<CallSpec> {
    let signature = signature.trim();
    let (contract, method) = match signature.split_once('.') {
        Some((name, method)) if !signature.contains('(') => {
            let contract = table
                .get(name)
                .ok_or_else(|| anyhow!("no ABI named '{}' under the configured ABI paths", name))?;
            (contract, method.to_string())
        }
        _ => {
            let signature = if signature.starts_with("function ") {
                signature.to_string()
            } else {
                format!("function {}", signature)
            };
            let contract = ContractAbi::from_signatures("inline", [signature.as_str()])?;
            let method = contract
                .abi()
                .functions()
                .next()
                .map(|function| function.name.clone())
                .ok_or_else(|| anyhow!("'{}' does not declare a function", signature))?;
            (Arc::new(contract), method)
        }
    };

    let types = contract.input_types(&method, args.len())?;
    let values = parse_args(&types, args)?;
    Ok(CallSpec::new(contract, target, method).args(values))
}

fn split_batch_entry(entry: &str) -> Result<(Address, &str, Vec<&str>)> {
    let mut parts = entry.splitn(3, '=');
    let (Some(target), Some(signature)) = (parts.next(), parts.next()) else {
        bail!("expected <target>=<signature>[=<args>], got '{}'", entry);
    };
    let target = target
        .trim()
        .parse::<Address>()
        .with_context(|| format!("invalid target address '{}'", target))?;
    let args = parts.next().map(split_top_level).unwrap_or_default();
    Ok((target, signature, args))
}

fn join_values(values: &[DynSolValue]) -> String {
    values.iter().map(format_value).collect::<Vec<_>>().join(", ")
}

fn print_values(values: Vec<DynSolValue>) {
    for value in &values {
        println!("{}", format_value(value));
    }
}
