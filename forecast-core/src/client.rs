use async_trait::async_trait;
use reqwest::Client;
use tracing::instrument;

use crate::{error::FetchFailure, request::ForecastRequest};

/// Transport seam for issuing one forecast fetch.
#[async_trait]
pub trait ForecastTransport: Send + Sync {
    /// Perform the request and return the full response body.
    async fn fetch(&self, request: &ForecastRequest) -> Result<String, FetchFailure>;
}

/// HTTP transport backed by reqwest.
///
/// Pooling is disabled, so each fetch opens its own connection and fully
/// closes it on every exit path (success, HTTP error, or read failure).
#[derive(Debug, Clone)]
pub struct ForecastClient {
    http: Client,
}

impl ForecastClient {
    pub fn new() -> Result<Self, FetchFailure> {
        let http = Client::builder().pool_max_idle_per_host(0).build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl ForecastTransport for ForecastClient {
    #[instrument(skip(self, request), fields(city = request.city()))]
    async fn fetch(&self, request: &ForecastRequest) -> Result<String, FetchFailure> {
        let response = self.http.get(request.url().clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            // The body, if any, is discarded with the response.
            return Err(FetchFailure::Http(status));
        }

        // A failure mid-read surfaces as Network; the partial buffer is dropped.
        Ok(response.text().await?)
    }
}
