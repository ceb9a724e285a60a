//! Cancellable asset retrieval.
//!
//! A tile starts at most one fetch at a time. It keeps the [`FetchHandle`]
//! so that `destroy()` can cancel the request synchronously; the fetcher
//! receives a clone of the same [`CancellationToken`] and stops work as
//! soon as it is cancelled.
//!
//! # Implementations
//!
//! - [`HttpFetcher`] - reqwest-based fetcher running on a tokio `LocalSet`
//! - [`ManualFetcher`](crate::testing::ManualFetcher) - records requests and
//!   lets tests deliver completions by hand

mod http;

pub use http::HttpFetcher;

use bytes::Bytes;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors reported by an [`AssetFetcher`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request could not be sent or the connection failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The response body could not be read.
    #[error("Failed to read response: {0}")]
    Body(String),

    /// The request was cancelled before it completed.
    #[error("Fetch cancelled")]
    Cancelled,
}

/// Outcome delivered to a fetch completion callback.
pub type FetchResult = Result<Bytes, FetchError>;

/// Completion callback for a single fetch.
///
/// Invoked at most once, on the scheduler thread.
pub type FetchCallback = Box<dyn FnOnce(FetchResult) + 'static>;

/// Source of binary tile content.
pub trait AssetFetcher {
    /// Start fetching `url`.
    ///
    /// `on_complete` is called at most once, either from within this call or
    /// later on the same thread. Once `cancel` is cancelled the fetcher
    /// should abandon the request and may skip the callback entirely.
    fn fetch(&self, url: &str, cancel: CancellationToken, on_complete: FetchCallback);
}

/// An in-flight fetch owned by a tile.
#[derive(Debug, Clone)]
pub struct FetchHandle {
    url: String,
    token: CancellationToken,
}

impl FetchHandle {
    /// Creates a handle for a fetch of `url` controlled by `token`.
    pub fn new(url: impl Into<String>, token: CancellationToken) -> Self {
        Self {
            url: url.into(),
            token,
        }
    }

    /// The URL being fetched.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Signals the fetch to stop. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns true once the fetch has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The token shared with the fetcher.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_cancel_reaches_fetcher_token() {
        let token = CancellationToken::new();
        let fetcher_side = token.clone();
        let handle = FetchHandle::new("http://tiles.test/4/5/3.png", token);

        assert!(!handle.is_cancelled());
        handle.cancel();

        assert!(handle.is_cancelled());
        assert!(fetcher_side.is_cancelled());
    }

    #[test]
    fn test_handle_cancel_is_idempotent() {
        let handle = FetchHandle::new("http://tiles.test/0/0/0.png", CancellationToken::new());
        handle.cancel();
        handle.cancel();
        assert!(handle.is_cancelled());
        assert_eq!(handle.url(), "http://tiles.test/0/0/0.png");
    }

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::Status {
            status: 404,
            url: "http://tiles.test/1/0/0.png".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 404 from http://tiles.test/1/0/0.png");
        assert_eq!(FetchError::Cancelled.to_string(), "Fetch cancelled");
    }
}
