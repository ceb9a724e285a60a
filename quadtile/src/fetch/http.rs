//! HTTP fetcher built on reqwest.

use std::rc::Rc;

use bytes::Bytes;
use tokio::task::LocalSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::{AssetFetcher, FetchCallback, FetchError};
use crate::config::LayerConfig;

/// Fetches tile content over HTTP(S).
///
/// Each request runs as a task on the given [`LocalSet`] so its completion
/// callback executes on the scheduler thread. The request races against
/// its cancellation token; a cancelled request is dropped mid-flight and
/// its callback never runs.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    local: Rc<LocalSet>,
}

impl HttpFetcher {
    /// Creates a fetcher using the timeout and user agent from `config`.
    pub fn new(local: Rc<LocalSet>, config: &LayerConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| FetchError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(local, client))
    }

    /// Creates a fetcher around an existing client.
    pub fn with_client(local: Rc<LocalSet>, client: reqwest::Client) -> Self {
        Self { client, local }
    }
}

async fn get_bytes(client: &reqwest::Client, url: &str) -> Result<Bytes, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::Http(format!("Request failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(FetchError::Status {
            status: response.status().as_u16(),
            url: url.to_string(),
        });
    }

    response
        .bytes()
        .await
        .map_err(|e| FetchError::Body(e.to_string()))
}

impl AssetFetcher for HttpFetcher {
    fn fetch(&self, url: &str, cancel: CancellationToken, on_complete: FetchCallback) {
        let client = self.client.clone();
        let url = url.to_string();

        self.local.spawn_local(async move {
            trace!(url = %url, "HTTP fetch started");

            let result = tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    debug!(url = %url, "HTTP fetch cancelled");
                    return;
                }

                result = get_bytes(&client, &url) => result,
            };

            on_complete(result);
        });
    }
}
