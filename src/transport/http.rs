use crate::core::error::TransportError;
use crate::core::settings::HttpSettings;
use crate::transport::{Response, Transport};
use async_trait::async_trait;

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Client with the default `[http]` settings: 30 second request timeout
    /// and the crate's user agent.
    pub fn new() -> Self {
        Self::from_settings(&HttpSettings::default()).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to build configured HTTP client, using reqwest defaults");
            Self::with_client(reqwest::Client::new())
        })
    }

    pub fn from_settings(settings: &HttpSettings) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .user_agent(settings.user_agent.as_str())
            .build()?;

        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, endpoint: &str) -> Result<Response, TransportError> {
        let request_error = |source| TransportError::Request {
            endpoint: endpoint.to_string(),
            source,
        };

        let response = self
            .client
            .get(endpoint)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await.map_err(request_error)?;
        tracing::trace!(endpoint, status = status.as_u16(), len = body.len(), "Fetched response");

        Ok(Response::new(status.as_u16(), body.to_vec()))
    }
}
