mod http;

use crate::core::error::{DecodeError, TransportError};
use crate::core::models::{Decode, Payload};
use async_trait::async_trait;

pub use http::HttpTransport;

/// Capability that performs one network fetch per call.
///
/// Implementations report every failure (connection, timeout, non-success
/// status) as a [`TransportError`]; the poller never retries on its own.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn fetch(&self, endpoint: &str) -> Result<Response, TransportError>;
}

/// A completed response whose body has not been decoded yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn text(&self) -> Result<String, DecodeError> {
        Ok(String::from_utf8(self.body.clone())?)
    }

    pub fn json(&self) -> Result<serde_json::Value, DecodeError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn decode(&self, decode: Decode) -> Result<Payload, DecodeError> {
        match decode {
            Decode::Json => self.json().map(Payload::Json),
            Decode::Text => self.text().map(Payload::Text),
        }
    }
}
