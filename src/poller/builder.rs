use crate::core::error::{ConfigError, PollError};
use crate::core::models::{Decode, Payload};
use crate::core::settings::{PollSettings, DEFAULT_INTERVAL_MS};
use crate::poller::{DataHandler, ErrorHandler, Poller};
use crate::transport::{HttpTransport, Transport};
use std::sync::Arc;
use std::time::Duration;

/// Collects the configuration of a [`Poller`].
///
/// `endpoint` and `on_data` are required; [`PollerBuilder::build`] reports
/// either one missing as [`ConfigError::MissingField`].
pub struct PollerBuilder<T = HttpTransport> {
    endpoint: Option<String>,
    on_data: Option<DataHandler>,
    on_error: Option<ErrorHandler>,
    decode: Decode,
    interval: Duration,
    one_shot: bool,
    transport: T,
}

impl PollerBuilder<HttpTransport> {
    pub fn new() -> Self {
        Self::with_transport(HttpTransport::new())
    }
}

impl Default for PollerBuilder<HttpTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> PollerBuilder<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            endpoint: None,
            on_data: None,
            on_error: None,
            decode: Decode::default(),
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            one_shot: false,
            transport,
        }
    }

    /// Seeds decoding, interval and one-shot mode from the `[poll]` settings
    /// section.
    pub fn with_settings(self, settings: &PollSettings) -> Self {
        self.decode(settings.decode())
            .interval(settings.interval())
            .one_shot(settings.one_shot)
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn on_data<F>(mut self, on_data: F) -> Self
    where
        F: Fn(Payload) + Send + Sync + 'static,
    {
        self.on_data = Some(Arc::new(on_data));
        self
    }

    pub fn on_error<F>(mut self, on_error: F) -> Self
    where
        F: Fn(PollError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(on_error));
        self
    }

    pub fn decode(mut self, decode: Decode) -> Self {
        self.decode = decode;
        self
    }

    /// Shorthand for `decode(Decode::Text)`.
    pub fn text(self) -> Self {
        self.decode(Decode::Text)
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval_ms(self, interval_ms: u64) -> Self {
        self.interval(Duration::from_millis(interval_ms))
    }

    pub fn one_shot(mut self, one_shot: bool) -> Self {
        self.one_shot = one_shot;
        self
    }

    pub fn transport<U: Transport>(self, transport: U) -> PollerBuilder<U> {
        PollerBuilder {
            endpoint: self.endpoint,
            on_data: self.on_data,
            on_error: self.on_error,
            decode: self.decode,
            interval: self.interval,
            one_shot: self.one_shot,
            transport,
        }
    }

    /// Validates the configuration. Never touches the network.
    pub fn build(self) -> Result<Poller<T>, ConfigError> {
        let endpoint = self
            .endpoint
            .filter(|e| !e.trim().is_empty())
            .ok_or(ConfigError::MissingField("endpoint"))?;
        let on_data = self.on_data.ok_or(ConfigError::MissingField("on_data"))?;
        let on_error: ErrorHandler = match self.on_error {
            Some(on_error) => on_error,
            None => Arc::new(ignore_error),
        };

        Ok(Poller::from_parts(
            endpoint,
            on_data,
            on_error,
            self.decode,
            self.interval,
            self.one_shot,
            self.transport,
        ))
    }
}

fn ignore_error(_: PollError) {}
