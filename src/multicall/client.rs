//! Shared batching client

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::Address;
use tracing::info;

use super::RequestBuilder;
use crate::domain::call::wire::MULTICALL3_ADDRESS;
use crate::infrastructure::ethereum::{create_executor, CallExecutor, ProviderConfig};

/// Holds the executor and aggregator address shared by every request
///
/// Cheap to clone. Requests built from the same client may run
/// concurrently; each owns its own calls and outputs.
#[derive(Clone)]
pub struct Client {
    executor: Arc<dyn CallExecutor>,
    multicall: Address,
    timeout: Option<Duration>,
}

impl Client {
    pub fn new(executor: Arc<dyn CallExecutor>) -> Self {
        Self {
            executor,
            multicall: MULTICALL3_ADDRESS,
            timeout: None,
        }
    }

    pub fn with_executor<E: CallExecutor>(executor: E) -> Self {
        Self::new(Arc::new(executor))
    }

    /// Connect to a node over the configured transport
    pub async fn connect(config: ProviderConfig) -> anyhow::Result<Self> {
        let endpoint = config.display();
        let executor = create_executor(config).await?;
        info!(%endpoint, "connected to node");
        Ok(Self::with_executor(executor))
    }

    /// Use a different aggregator deployment
    pub fn with_multicall(mut self, multicall: Address) -> Self {
        self.multicall = multicall;
        self
    }

    /// Default timeout applied to every request
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn multicall(&self) -> Address {
        self.multicall
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn endpoint_name(&self) -> String {
        self.executor.endpoint_name()
    }

    pub(crate) fn executor(&self) -> &dyn CallExecutor {
        self.executor.as_ref()
    }

    /// Start a new batch
    pub fn request(&self) -> RequestBuilder {
        RequestBuilder::new(self.clone())
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("endpoint", &self.executor.endpoint_name())
            .field("multicall", &self.multicall)
            .field("timeout", &self.timeout)
            .finish()
    }
}
