use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::classify::{MarkerSet, classify_body};
use crate::error::AppResult;

/// Result of one request: whether it failed, and which markers the body
/// carried. Timing is the caller's concern.
#[derive(Debug, Clone, Copy)]
pub struct FetchOutcome {
    pub failed: bool,
    pub markers: MarkerSet,
}

impl FetchOutcome {
    #[must_use]
    pub fn failure() -> Self {
        Self {
            failed: true,
            markers: MarkerSet::EMPTY,
        }
    }
}

/// The external transport capability: issue one request against the fixed
/// target and classify whatever output bytes were produced.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self) -> FetchOutcome;
}

/// Builds the shared HTTP client. A zero timeout disables the deadline.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn build_client(timeout: Option<Duration>) -> AppResult<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// Production transport: one GET per fetch. Any transport error, timeout, or
/// HTTP error status counts as a failed request; the body is classified only
/// when the server answered successfully.
pub struct HttpTransport {
    client: Client,
    target: Option<Url>,
}

impl HttpTransport {
    #[must_use]
    pub fn new(client: Client, target: Option<Url>) -> Self {
        Self { client, target }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self) -> FetchOutcome {
        let Some(target) = self.target.as_ref() else {
            return FetchOutcome::failure();
        };

        let response = match self.client.get(target.clone()).send().await {
            Ok(response) => response,
            Err(err) => {
                debug!("Request failed: {}", err);
                return FetchOutcome::failure();
            }
        };

        if !response.status().is_success() {
            debug!("Request failed with status {}", response.status());
            return FetchOutcome::failure();
        }

        match response.bytes().await {
            Ok(body) => FetchOutcome {
                failed: false,
                markers: classify_body(&body),
            },
            Err(err) => {
                debug!("Failed to read response body: {}", err);
                FetchOutcome::failure()
            }
        }
    }
}
