//! A single logical call and the slots its results are written to

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::Address;

use crate::domain::abi::{CallEncoder, ReturnDecoder};

/// A write destination for one decoded return value list
///
/// Cloning yields another handle to the same slot: the caller keeps one and
/// hands the other to the request, then reads it back after execution.
#[derive(Debug, Clone, Default)]
pub struct OutputSlot(Arc<Mutex<Option<Vec<DynSolValue>>>>);

impl OutputSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoded values, if a decoder wrote into this slot
    pub fn get(&self) -> Option<Vec<DynSolValue>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Take the decoded values out, leaving the slot empty
    pub fn take(&self) -> Option<Vec<DynSolValue>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    pub fn is_filled(&self) -> bool {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    pub(crate) fn fill(&self, values: Vec<DynSolValue>) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = Some(values);
    }
}

/// One logical contract call inside a batch
///
/// `decoders` is the ordered fallback chain tried against the return data;
/// decoder `j` writes into `outputs[j]`. When no decoders are given the
/// call decodes with the same interface it was encoded with.
#[derive(Clone)]
pub struct CallSpec {
    pub(crate) encoder: Arc<dyn CallEncoder>,
    own_decoder: Arc<dyn ReturnDecoder>,
    pub(crate) decoders: Vec<Arc<dyn ReturnDecoder>>,
    pub(crate) target: Address,
    pub(crate) method: String,
    pub(crate) args: Vec<DynSolValue>,
    pub(crate) outputs: Vec<OutputSlot>,
}

impl CallSpec {
    /// Create a call of `method` on `target`, encoded and decoded by `codec`
    pub fn new<C>(codec: Arc<C>, target: Address, method: impl Into<String>) -> Self
    where
        C: CallEncoder + ReturnDecoder + 'static,
    {
        Self {
            encoder: codec.clone(),
            own_decoder: codec,
            decoders: Vec::new(),
            target,
            method: method.into(),
            args: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Set the call arguments
    pub fn args(mut self, args: Vec<DynSolValue>) -> Self {
        self.args = args;
        self
    }

    /// Append a candidate decoder to the fallback chain
    pub fn decoder(mut self, decoder: Arc<dyn ReturnDecoder>) -> Self {
        self.decoders.push(decoder);
        self
    }

    /// Replace the fallback chain
    pub fn decoders(mut self, decoders: Vec<Arc<dyn ReturnDecoder>>) -> Self {
        self.decoders = decoders;
        self
    }

    pub fn target(&self) -> Address {
        self.target
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn outputs(&self) -> &[OutputSlot] {
        &self.outputs
    }

    pub(crate) fn set_outputs(&mut self, outputs: Vec<OutputSlot>) {
        self.outputs = outputs;
    }

    /// Default the fallback chain to the call's own interface
    pub(crate) fn normalize(&mut self) {
        if self.decoders.is_empty() {
            self.decoders.push(self.own_decoder.clone());
        }
    }

    /// The fallback chain, never empty
    pub(crate) fn decoder_chain(&self) -> &[Arc<dyn ReturnDecoder>] {
        if self.decoders.is_empty() {
            std::slice::from_ref(&self.own_decoder)
        } else {
            &self.decoders
        }
    }

    pub(crate) fn primary_decoder(&self) -> &Arc<dyn ReturnDecoder> {
        &self.decoder_chain()[0]
    }
}

impl fmt::Debug for CallSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallSpec")
            .field("target", &self.target)
            .field("method", &self.method)
            .field("args", &self.args)
            .field("decoders", &self.decoder_chain().len())
            .field("outputs", &self.outputs.len())
            .finish()
    }
}
