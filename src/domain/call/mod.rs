//! Call model for batched contract reads
//!
//! A [`CallSpec`] describes one logical call; a [`Mode`] picks how a batch of
//! them is sent through the aggregator contract described in [`wire`].

mod error;
mod mode;
mod spec;
pub mod wire;

pub use error::MulticallError;
pub use mode::{BlockSelector, Mode};
pub use spec::{CallSpec, OutputSlot};
