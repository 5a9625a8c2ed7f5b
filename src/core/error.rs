use std::string::FromUtf8Error;
use thiserror::Error;

/// Raised by `PollerBuilder::build` when the configuration is unusable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("transport failure: {0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("response body is not valid UTF-8: {0}")]
    Text(#[from] FromUtf8Error),

    #[error("response body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure of a single poll cycle, handed to the error callback.
#[derive(Error, Debug)]
pub enum PollError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl PollError {
    pub fn is_transport(&self) -> bool {
        matches!(self, PollError::Transport(_))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, PollError::Decode(_))
    }
}
