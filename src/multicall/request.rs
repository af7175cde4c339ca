//! Request builder - collects calls and runs the encode/execute/decode pipeline

use std::time::Duration;

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Bytes, B256, U256};
use tracing::{debug, error};

use super::decoder::{decode, Response};
use super::encoder::{encode, WirePayload};
use super::Client;
use crate::domain::abi::SlotDecoder;
use crate::domain::call::{BlockSelector, CallSpec, Mode, MulticallError, OutputSlot};

/// A single batch under construction
///
/// Created by [`Client::request`] and consumed by [`RequestBuilder::execute`];
/// build a new one for every batch.
#[derive(Debug)]
pub struct RequestBuilder {
    client: Client,
    calls: Vec<CallSpec>,
    require_success: bool,
    block: Option<BlockSelector>,
    timeout: Option<Duration>,
}

impl RequestBuilder {
    pub(crate) fn new(client: Client) -> Self {
        let timeout = client.timeout();
        Self {
            client,
            calls: Vec::new(),
            require_success: false,
            block: None,
            timeout,
        }
    }

    /// Add a call and the slots its decoders write into
    pub fn add_call(mut self, call: CallSpec, outputs: Vec<OutputSlot>) -> Self {
        self.push_call(call, outputs);
        self
    }

    /// Same as [`add_call`](Self::add_call) for use in loops
    pub fn push_call(&mut self, mut call: CallSpec, outputs: Vec<OutputSlot>) {
        call.normalize();
        call.set_outputs(outputs);
        self.calls.push(call);
    }

    /// Fail the batch when any `try*` call fails to decode
    pub fn require_success(mut self, require_success: bool) -> Self {
        self.require_success = require_success;
        self
    }

    /// Pin the read to a block number, replacing any block hash
    pub fn block_number(mut self, number: u64) -> Self {
        self.block = Some(BlockSelector::Number(number));
        self
    }

    /// Pin the read to a block hash, replacing any block number
    pub fn block_hash(mut self, hash: B256) -> Self {
        self.block = Some(BlockSelector::Hash(hash));
        self
    }

    pub fn block(mut self, block: Option<BlockSelector>) -> Self {
        self.block = block;
        self
    }

    /// Bound the network call; overrides the client default
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn calls(&self) -> &[CallSpec] {
        &self.calls
    }

    pub fn block_selector(&self) -> Option<BlockSelector> {
        self.block
    }

    /// Encode the batch without sending it
    pub fn payload(&self, mode: Mode) -> Result<WirePayload, MulticallError> {
        encode(mode, &self.calls, self.require_success, self.client.multicall())
    }

    /// Run the batch in `mode`
    ///
    /// Encode errors and calls with fewer output slots than decoders are
    /// reported before anything is sent. Dropping the returned future
    /// cancels the network call.
    pub async fn execute(self, mode: Mode) -> Result<Response, MulticallError> {
        let payload = self.payload(mode)?;
        if mode != Mode::GetCurrentBlockTimestamp {
            check_outputs(&self.calls)?;
        }
        debug!(
            %mode,
            calls = self.calls.len(),
            to = %payload.target,
            block = ?self.block,
            "executing batch"
        );
        let raw = self.submit(payload).await?;
        decode(mode, &self.calls, self.require_success, raw)
    }

    /// Run the batch in the mode named by an aggregator method
    pub async fn execute_method(self, method: &str) -> Result<Response, MulticallError> {
        let mode = method.parse::<Mode>()?;
        self.execute(mode).await
    }

    pub async fn call(self) -> Result<Response, MulticallError> {
        self.execute(Mode::Call).await
    }

    pub async fn aggregate(self) -> Result<Response, MulticallError> {
        self.execute(Mode::Aggregate).await
    }

    pub async fn try_aggregate(self) -> Result<Response, MulticallError> {
        self.execute(Mode::TryAggregate).await
    }

    pub async fn try_block_and_aggregate(self) -> Result<Response, MulticallError> {
        self.execute(Mode::TryBlockAndAggregate).await
    }

    /// Current block timestamp as seen by the aggregator
    pub async fn get_current_block_timestamp(self) -> Result<u64, MulticallError> {
        let response = self.execute(Mode::GetCurrentBlockTimestamp).await?;
        response.timestamp.ok_or_else(|| {
            MulticallError::UnexpectedResponse("missing block timestamp".to_string())
        })
    }

    /// Read a storage word of `account` and decode it, bypassing the aggregator
    pub async fn get_storage_at(
        &self,
        account: alloy_primitives::Address,
        key: B256,
        decoder: &dyn SlotDecoder,
    ) -> Result<Vec<DynSolValue>, MulticallError> {
        let slot = U256::from_be_bytes(key.0);
        let executor = self.client.executor();
        let word = self
            .bounded(executor.storage_at(account, slot, self.block))
            .await
            .map_err(|err| {
                error!(%account, %key, error = %err, "failed to read storage");
                err
            })?;
        debug!(%account, %key, value = %word, "raw storage word");

        decoder.decode_slot(word.as_slice()).map_err(|err| {
            error!(%account, %key, error = %err, "failed to unpack storage word");
            MulticallError::Abi(err)
        })
    }

    async fn submit(&self, payload: WirePayload) -> Result<Bytes, MulticallError> {
        let executor = self.client.executor();
        self.bounded(executor.call(payload.target, payload.data, self.block))
            .await
            .map_err(|err| {
                error!(to = %payload.target, error = %err, "failed to call multicall");
                err
            })
    }

    /// Apply the request timeout to an executor future
    async fn bounded<T>(
        &self,
        fut: impl std::future::Future<Output = anyhow::Result<T>>,
    ) -> Result<T, MulticallError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| MulticallError::Timeout(limit))?
                .map_err(MulticallError::Executor),
            None => fut.await.map_err(MulticallError::Executor),
        }
    }
}

/// Every decoder in a call's fallback chain needs an output slot to write to
fn check_outputs(calls: &[CallSpec]) -> Result<(), MulticallError> {
    for (index, call) in calls.iter().enumerate() {
        let needed = call.decoder_chain().len();
        if call.outputs.len() < needed {
            error!(
                index,
                contract = %call.target,
                method = %call.method,
                decoders = needed,
                outputs = call.outputs.len(),
                "call has fewer output slots than decoders"
            );
            return Err(MulticallError::MissingOutput {
                index,
                slot: call.outputs.len(),
            });
        }
    }
    Ok(())
}
