//! Batching pipeline: encode, execute through the aggregator, decode

mod client;
pub mod decoder;
pub mod encoder;
mod request;

pub use client::Client;
pub use decoder::Response;
pub use encoder::WirePayload;
pub use request::RequestBuilder;
