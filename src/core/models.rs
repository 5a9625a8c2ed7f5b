use serde_json::Value;
use std::fmt;

/// Observable lifecycle marker of a poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Inactive,
    Waiting,
    InFlight,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Inactive => "inactive",
            Phase::Waiting => "waiting",
            Phase::InFlight => "in-flight",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a response body is turned into a [`Payload`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Decode {
    #[default]
    Json,
    Text,
}

impl Decode {
    pub fn from_text_flag(text: bool) -> Self {
        if text {
            Decode::Text
        } else {
            Decode::Json
        }
    }
}

/// A successfully decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Text(String),
}

impl Payload {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            Payload::Json(_) => None,
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Text(_) => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Payload::Text(text) => Some(text),
            Payload::Json(_) => None,
        }
    }
}
