//! Quadtree LOD tiles with asynchronous asset loading.
//!
//! Each [`tile::AssetTile`] is one node of a quadtree addressed by a
//! [`coord::Quadcode`]. The owning tree calls `request_async()` when the
//! tile becomes visible and `destroy()` when it is evicted; the tile takes
//! care of building its placeholder on a later scheduler turn, fetching
//! its texture, and dropping results that arrive after eviction.
//!
//! # Modules
//!
//! - [`coord`] - quadcodes, tile coordinates and world geometry
//! - [`scheduler`] - single-threaded deferral
//! - [`url`] - tile URL templates
//! - [`fetch`] - cancellable asset retrieval
//! - [`asset`] - texture decoding
//! - [`render`] - placeholder renderables
//! - [`tile`] - the tile lifecycle
//! - [`config`] - layer configuration
//! - [`logging`] - tracing subscriber setup
//! - [`testing`] - deterministic doubles for tests

pub mod asset;
pub mod config;
pub mod coord;
pub mod fetch;
pub mod logging;
pub mod render;
pub mod scheduler;
pub mod testing;
pub mod tile;
pub mod url;

pub use coord::Quadcode;
pub use tile::{AssetTile, LayerContext, LoadState, Tile};
