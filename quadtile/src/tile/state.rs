//! Load states of an asset-backed tile.

use std::fmt;

/// Where an [`AssetTile`](super::AssetTile) is in its load pipeline.
///
/// ```text
/// Created -> PlaceholderPending -> PlaceholderBuilt -> FetchInFlight -> Attached
///                                                                   \-> Aborted
///                                                                   \-> Failed
/// ```
///
/// `Destroyed` is reachable from every state and is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadState {
    /// Nothing has been requested yet.
    Created,
    /// A deferred placeholder step is queued.
    PlaceholderPending,
    /// The placeholder renderable exists and a deferred fetch step is
    /// queued, or has just run.
    PlaceholderBuilt,
    /// A fetch is running.
    FetchInFlight,
    /// The asset is attached and the tile is ready.
    Attached,
    /// The fetch was cancelled or its result could not be attached.
    Aborted,
    /// The fetch or decode failed.
    Failed,
    /// The tile released everything it owned.
    Destroyed,
}

impl LoadState {
    /// Returns true once no further progress happens without a new request.
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            LoadState::Attached | LoadState::Aborted | LoadState::Failed | LoadState::Destroyed
        )
    }

    /// Returns true if a new request re-issues the fetch.
    pub fn can_retry(&self) -> bool {
        matches!(self, LoadState::Aborted | LoadState::Failed)
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadState::Created => "created",
            LoadState::PlaceholderPending => "placeholder-pending",
            LoadState::PlaceholderBuilt => "placeholder-built",
            LoadState::FetchInFlight => "fetch-in-flight",
            LoadState::Attached => "attached",
            LoadState::Aborted => "aborted",
            LoadState::Failed => "failed",
            LoadState::Destroyed => "destroyed",
        };
        f.write_str(name)
    }
}
