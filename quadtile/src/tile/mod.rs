//! Tile lifecycle.
//!
//! A tile is one node of the quadtree, addressed by its [`Quadcode`]. The
//! tree that owns it drives it through two calls only:
//!
//! - [`Tile::request_async`] - start acquiring content, never blocking
//! - [`Tile::destroy`] - release everything, idempotent and safe at any time
//!
//! [`BaseTile`] carries identity only. [`AssetTile`] adds the deferred
//! placeholder step and a cancellable texture fetch.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//!
//! use quadtile::config::LayerConfig;
//! use quadtile::coord::Quadcode;
//! use quadtile::testing::{ManualFetcher, ManualScheduler};
//! use quadtile::tile::{AssetTile, LayerContext, LoadState, Tile};
//! use quadtile::url::UrlTemplate;
//!
//! let scheduler = Rc::new(ManualScheduler::new());
//! let fetcher = Rc::new(ManualFetcher::new());
//! let layer = LayerContext::new(LayerConfig::default(), scheduler.clone(), fetcher.clone());
//! let path = Rc::new(UrlTemplate::new("http://host/{z}/{x}/{y}.png"));
//!
//! let tile = AssetTile::new(Quadcode::parse("0123").unwrap(), path, &layer);
//! tile.request_async();
//! scheduler.advance();
//!
//! assert_eq!(tile.load_state(), LoadState::FetchInFlight);
//! assert_eq!(fetcher.urls(), vec!["http://host/4/5/3.png".to_string()]);
//!
//! tile.destroy();
//! assert!(fetcher.was_cancelled(0));
//! ```

mod asset_tile;
mod base;
mod context;
mod error;
mod state;

pub use asset_tile::AssetTile;
pub use base::{BaseTile, TileBase};
pub use context::LayerContext;
pub use error::{LoadError, TileError};
pub use state::LoadState;

use crate::coord::Quadcode;

/// The contract every tile variant satisfies.
///
/// All methods take `&self`; tiles use interior mutability so that
/// deferred work and fetch completions can update them without the owner
/// handing out mutable access.
pub trait Tile {
    /// The tile's quadtree address.
    fn quadcode(&self) -> &Quadcode;

    /// Begin acquiring the tile's content.
    ///
    /// Returns immediately. Repeated calls are tolerated.
    fn request_async(&self);

    /// Release everything the tile owns and cancel outstanding work.
    ///
    /// Subsequent calls are no-ops.
    fn destroy(&self);

    /// Returns true once the tile's content is attached.
    fn is_ready(&self) -> bool;

    /// Returns true once `destroy` has run.
    fn is_destroyed(&self) -> bool;
}
