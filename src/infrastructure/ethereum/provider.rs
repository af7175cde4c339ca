//! Call executor abstraction and Alloy implementations

use std::path::PathBuf;

use alloy::network::Ethereum;
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::{
    fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
    Identity, Provider, ProviderBuilder, RootProvider,
};
use alloy::rpc::types::TransactionRequest;
use anyhow::{Context, Result};
use tracing::trace;

use super::types::block_id;
use crate::domain::call::BlockSelector;

/// Provider configuration
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    /// HTTP JSON-RPC endpoint
    Http(String),
    /// WebSocket endpoint
    WebSocket(String),
    /// IPC socket path (Unix only)
    #[cfg(unix)]
    Ipc(PathBuf),
}

impl ProviderConfig {
    /// Get display name for this endpoint
    pub fn display(&self) -> String {
        match self {
            ProviderConfig::Http(url) => url.clone(),
            ProviderConfig::WebSocket(url) => url.clone(),
            #[cfg(unix)]
            ProviderConfig::Ipc(path) => path.display().to_string(),
        }
    }
}

/// Read-only access to a node
///
/// This is the only place the batch pipeline touches the network. A call
/// is cancelled by dropping its future.
#[async_trait::async_trait]
pub trait CallExecutor: Send + Sync + 'static {
    /// Execute a read-only call (eth_call), optionally pinned to a block
    async fn call(&self, target: Address, data: Bytes, block: Option<BlockSelector>)
        -> Result<Bytes>;

    /// Read a raw storage slot (eth_getStorageAt)
    async fn storage_at(
        &self,
        account: Address,
        slot: U256,
        block: Option<BlockSelector>,
    ) -> Result<B256>;

    /// Get endpoint display name
    fn endpoint_name(&self) -> String;
}

type FilledProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider,
    Ethereum,
>;

/// Enum-based executor that stores the concrete provider for each transport
pub enum AlloyExecutor {
    Http {
        provider: FilledProvider,
        endpoint: String,
    },
    WebSocket {
        provider: FilledProvider,
        endpoint: String,
    },
    #[cfg(unix)]
    Ipc {
        provider: FilledProvider,
        endpoint: String,
    },
}

/// Create an executor from configuration
pub async fn create_executor(config: ProviderConfig) -> Result<AlloyExecutor> {
    match config {
        ProviderConfig::Http(url) => {
            let rpc_url = url.parse().context("Invalid HTTP URL")?;
            let provider = ProviderBuilder::new().connect_http(rpc_url);
            Ok(AlloyExecutor::Http {
                provider,
                endpoint: url,
            })
        }
        ProviderConfig::WebSocket(url) => {
            let provider = ProviderBuilder::new()
                .connect(&url)
                .await
                .context("Failed to create WebSocket provider")?;
            Ok(AlloyExecutor::WebSocket {
                provider,
                endpoint: url,
            })
        }
        #[cfg(unix)]
        ProviderConfig::Ipc(path) => {
            use alloy::providers::IpcConnect;
            let ipc = IpcConnect::new(path.to_string_lossy().to_string());
            let provider = ProviderBuilder::new()
                .connect_ipc(ipc)
                .await
                .context("Failed to create IPC provider")?;
            Ok(AlloyExecutor::Ipc {
                provider,
                endpoint: path.display().to_string(),
            })
        }
    }
}

// Run the same expression against whichever transport is active
macro_rules! with_provider {
    ($self:ident, $provider:ident => $body:expr) => {
        match $self {
            AlloyExecutor::Http {
                provider: $provider,
                ..
            } => $body,
            AlloyExecutor::WebSocket {
                provider: $provider,
                ..
            } => $body,
            #[cfg(unix)]
            AlloyExecutor::Ipc {
                provider: $provider,
                ..
            } => $body,
        }
    };
}

#[async_trait::async_trait]
impl CallExecutor for AlloyExecutor {
    async fn call(
        &self,
        target: Address,
        data: Bytes,
        block: Option<BlockSelector>,
    ) -> Result<Bytes> {
        trace!(to = %target, len = data.len(), ?block, "eth_call");
        let request = TransactionRequest::default().to(target).input(data.into());
        let block = block_id(block);
        let output = with_provider!(self, p => p.call(request).block(block).await)
            .with_context(|| format!("eth_call to {} failed", target))?;
        Ok(output)
    }

    async fn storage_at(
        &self,
        account: Address,
        slot: U256,
        block: Option<BlockSelector>,
    ) -> Result<B256> {
        trace!(%account, %slot, ?block, "eth_getStorageAt");
        let block = block_id(block);
        let value = with_provider!(self, p => p.get_storage_at(account, slot).block_id(block).await)
            .with_context(|| format!("eth_getStorageAt {} at slot {:#x} failed", account, slot))?;
        Ok(B256::from(value))
    }

    fn endpoint_name(&self) -> String {
        match self {
            AlloyExecutor::Http { endpoint, .. } => endpoint.clone(),
            AlloyExecutor::WebSocket { endpoint, .. } => endpoint.clone(),
            #[cfg(unix)]
            AlloyExecutor::Ipc { endpoint, .. } => endpoint.clone(),
        }
    }
}
