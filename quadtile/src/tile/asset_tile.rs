//! Asset-backed tile: deferred placeholder, cancellable fetch, attach.
//!
//! ```text
//! request_async()
//!       |
//!       v  (next scheduler turn)
//! build placeholder --> start fetch --> decode --> attach --> ready
//!       ^                    ^               ^
//!       |                    |               |
//!   destroy() here       destroy() here  destroy() here
//!   skips everything     cancels token   completion is dropped
//! ```
//!
//! The tile's mutable state lives behind `Rc<RefCell<..>>`. Deferred steps
//! and fetch callbacks only hold a `Weak` reference, so a tile that has been
//! dropped by its owner is never kept alive by outstanding work.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::{LayerContext, LoadError, LoadState, Tile, TileBase, TileError};
use crate::asset::AssetHandle;
use crate::coord::{LatLonBounds, Quadcode, TileCoord, TileGeometry, WorldPoint};
use crate::fetch::{FetchError, FetchHandle, FetchResult};
use crate::render::{Renderable, RenderError};
use crate::url::TileUrlBuilder;

/// A tile whose content is a single texture fetched from a URL.
///
/// Dropping an `AssetTile` destroys it.
pub struct AssetTile {
    inner: Rc<Inner>,
}

struct Inner {
    quadcode: Quadcode,
    path: Rc<dyn TileUrlBuilder>,
    layer: LayerContext,
    state: RefCell<State>,
}

struct State {
    base: TileBase,
    load_state: LoadState,
    step_pending: bool,
    renderable: Option<Renderable>,
    pending_fetch: Option<FetchHandle>,
    asset: Option<AssetHandle>,
    last_error: Option<TileError>,
}

impl AssetTile {
    /// Creates a tile for `quadcode`.
    ///
    /// Nothing is built or fetched until [`Tile::request_async`] is called.
    pub fn new(quadcode: Quadcode, path: Rc<dyn TileUrlBuilder>, layer: &LayerContext) -> Self {
        let base = TileBase::new(quadcode.clone(), &layer.config);

        Self {
            inner: Rc::new(Inner {
                quadcode,
                path,
                layer: layer.clone(),
                state: RefCell::new(State {
                    base,
                    load_state: LoadState::Created,
                    step_pending: false,
                    renderable: None,
                    pending_fetch: None,
                    asset: None,
                    last_error: None,
                }),
            }),
        }
    }

    pub fn load_state(&self) -> LoadState {
        self.inner.state.borrow().load_state
    }

    /// A snapshot of the placeholder renderable, once built.
    ///
    /// The copy shares the attached texture but not later changes: a view
    /// taken before the fetch completes keeps an empty material.
    pub fn renderable(&self) -> Option<Renderable> {
        self.inner.state.borrow().renderable.clone()
    }

    /// Run `f` against the current renderable without copying it.
    ///
    /// `f` must not call back into this tile.
    pub fn with_renderable<R>(&self, f: impl FnOnce(&Renderable) -> R) -> Option<R> {
        self.inner.state.borrow().renderable.as_ref().map(f)
    }

    /// The attached asset.
    pub fn asset(&self) -> Option<AssetHandle> {
        self.inner.state.borrow().asset.clone()
    }

    pub fn has_pending_fetch(&self) -> bool {
        self.inner.state.borrow().pending_fetch.is_some()
    }

    /// URL of the fetch currently in flight.
    pub fn fetch_url(&self) -> Option<String> {
        self.inner
            .state
            .borrow()
            .pending_fetch
            .as_ref()
            .map(|fetch| fetch.url().to_string())
    }

    /// The URL this tile fetches its asset from.
    pub fn url(&self) -> String {
        self.inner.url()
    }

    /// The most recent failure the tile absorbed.
    pub fn last_error(&self) -> Option<TileError> {
        self.inner.state.borrow().last_error.clone()
    }

    pub fn coord(&self) -> TileCoord {
        self.inner.state.borrow().base.coord()
    }

    pub fn bounds(&self) -> LatLonBounds {
        self.inner.state.borrow().base.bounds()
    }

    /// World geometry; `None` once destroyed.
    pub fn geometry(&self) -> Option<TileGeometry> {
        self.inner.state.borrow().base.geometry().copied()
    }

    pub fn center(&self) -> Option<WorldPoint> {
        self.geometry().map(|geometry| geometry.center)
    }

    pub fn side(&self) -> Option<f64> {
        self.geometry().map(|geometry| geometry.side)
    }

    #[cfg(test)]
    fn with_state<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        f(&mut self.inner.state.borrow_mut())
    }
}

impl Tile for AssetTile {
    fn quadcode(&self) -> &Quadcode {
        &self.inner.quadcode
    }

    fn request_async(&self) {
        let inner = &self.inner;
        let mut state = inner.state.borrow_mut();

        if state.base.is_destroyed() {
            trace!(quadcode = %inner.quadcode, "request on destroyed tile ignored");
            return;
        }
        if state.step_pending {
            trace!(quadcode = %inner.quadcode, "request coalesced into pending step");
            return;
        }
        if state.load_state != LoadState::Created && !state.load_state.can_retry() {
            trace!(
                quadcode = %inner.quadcode,
                state = %state.load_state,
                "request ignored"
            );
            return;
        }

        state.step_pending = true;
        state.load_state = if needs_placeholder(&state) {
            LoadState::PlaceholderPending
        } else {
            LoadState::PlaceholderBuilt
        };
        drop(state);

        let weak = Rc::downgrade(inner);
        inner.layer.scheduler.defer(Box::new(move || run_step(&weak)));
        trace!(quadcode = %inner.quadcode, "deferred step scheduled");
    }

    fn destroy(&self) {
        self.inner.destroy();
    }

    fn is_ready(&self) -> bool {
        self.inner.state.borrow().base.is_ready()
    }

    fn is_destroyed(&self) -> bool {
        self.inner.state.borrow().base.is_destroyed()
    }
}

impl Drop for AssetTile {
    fn drop(&mut self) {
        if self.inner.state.try_borrow_mut().is_ok() {
            self.inner.destroy();
        } else {
            warn!(quadcode = %self.inner.quadcode, "tile dropped while busy");
        }
    }
}

impl Inner {
    fn url(&self) -> String {
        let coord = self.quadcode.to_tile();
        self.path.tile_url(&coord, &self.quadcode)
    }

    fn destroy(&self) {
        let mut state = self.state.borrow_mut();
        if !state.base.destroy() {
            return;
        }

        if let Some(fetch) = state.pending_fetch.take() {
            fetch.cancel();
            debug!(quadcode = %self.quadcode, url = fetch.url(), "fetch cancelled");
        }
        state.renderable = None;
        state.asset = None;
        state.step_pending = false;
        state.load_state = LoadState::Destroyed;
    }

    fn build_placeholder(&self, state: &State) -> Result<Renderable, RenderError> {
        let geometry = state
            .base
            .geometry()
            .filter(|geometry| geometry.is_valid())
            .ok_or(RenderError::MissingGeometry {
                side: state.base.geometry().map_or(f64::NAN, |g| g.side),
            })?;

        self.layer.factory.create(geometry.center, geometry.side)
    }
}

/// A renderable whose material was released cannot take an asset, so it is
/// rebuilt like a missing one.
fn needs_placeholder(state: &State) -> bool {
    state
        .renderable
        .as_ref()
        .map_or(true, |renderable| !renderable.has_asset_slot())
}

/// The deferred step: build the placeholder if needed, then start the fetch.
fn run_step(weak: &Weak<Inner>) {
    let Some(inner) = weak.upgrade() else {
        trace!("deferred step skipped, tile dropped");
        return;
    };

    let mut guard = inner.state.borrow_mut();
    let state = &mut *guard;
    state.step_pending = false;

    if state.base.is_destroyed() {
        debug!(quadcode = %inner.quadcode, "deferred step skipped, tile destroyed");
        return;
    }

    if needs_placeholder(state) {
        match inner.build_placeholder(state) {
            Ok(renderable) => {
                state.renderable = Some(renderable);
                state.load_state = LoadState::PlaceholderBuilt;
                trace!(quadcode = %inner.quadcode, "placeholder built");
            }
            Err(err) => {
                debug!(quadcode = %inner.quadcode, error = %err, "placeholder skipped");
                state.load_state = LoadState::Failed;
                state.last_error = Some(TileError::MissingGeometry {
                    quadcode: inner.quadcode.clone(),
                });
                return;
            }
        }
    }

    let coord = state.base.coord();
    let url = inner.url();
    let token = CancellationToken::new();
    state.pending_fetch = Some(FetchHandle::new(url.clone(), token.clone()));
    state.load_state = LoadState::FetchInFlight;
    drop(guard);

    debug!(
        quadcode = %inner.quadcode,
        x = coord.x,
        y = coord.y,
        z = coord.z,
        url = %url,
        "fetch started"
    );

    let callback_weak = Rc::downgrade(&inner);
    let callback_token = token.clone();
    inner.layer.fetcher.fetch(
        &url,
        token,
        Box::new(move |result: FetchResult| {
            let Some(inner) = callback_weak.upgrade() else {
                trace!("fetch completed after tile was dropped");
                return;
            };
            complete_fetch(&inner, &callback_token, result);
        }),
    );
}

/// Fetch completion: decode and attach, unless the tile moved on.
fn complete_fetch(inner: &Inner, token: &CancellationToken, result: FetchResult) {
    let mut guard = inner.state.borrow_mut();
    let state = &mut *guard;

    if state.base.is_destroyed() || token.is_cancelled() {
        debug!(quadcode = %inner.quadcode, "stale fetch completion dropped");
        return;
    }

    state.pending_fetch = None;

    let bytes = match result {
        Ok(bytes) => bytes,
        Err(FetchError::Cancelled) => {
            debug!(quadcode = %inner.quadcode, "fetch aborted");
            state.load_state = LoadState::Aborted;
            return;
        }
        Err(err) => {
            fail(inner, state, LoadError::Fetch(err));
            return;
        }
    };

    let asset: AssetHandle = match inner.layer.decoder.decode(&bytes) {
        Ok(texture) => Rc::new(texture),
        Err(err) => {
            fail(inner, state, LoadError::Decode(err));
            return;
        }
    };

    let attached = match state.renderable.as_mut() {
        Some(renderable) => renderable.attach_asset(Rc::clone(&asset)),
        None => Err(RenderError::MissingAssetSlot),
    };

    if let Err(err) = attached {
        debug!(quadcode = %inner.quadcode, error = %err, "decoded asset dropped");
        state.load_state = LoadState::Aborted;
        state.last_error = Some(TileError::StaleCompletion {
            quadcode: inner.quadcode.clone(),
        });
        return;
    }

    debug!(
        quadcode = %inner.quadcode,
        width = asset.width(),
        height = asset.height(),
        "asset attached"
    );
    state.asset = Some(asset);
    state.base.set_ready(true);
    state.load_state = LoadState::Attached;
}

fn fail(inner: &Inner, state: &mut State, source: LoadError) {
    warn!(quadcode = %inner.quadcode, error = %source, "tile load failed");
    state.load_state = LoadState::Failed;
    state.last_error = Some(TileError::FetchFailed {
        quadcode: inner.quadcode.clone(),
        source,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayerConfig;
    use crate::testing::{solid_png, ManualFetcher, ManualScheduler, RecordingFactory};
    use crate::url::UrlTemplate;

    struct Fixture {
        scheduler: Rc<ManualScheduler>,
        fetcher: Rc<ManualFetcher>,
        factory: Rc<RecordingFactory>,
        layer: LayerContext,
    }

    fn fixture() -> Fixture {
        let scheduler = Rc::new(ManualScheduler::new());
        let fetcher = Rc::new(ManualFetcher::new());
        let factory: Rc<RecordingFactory> = Rc::new(RecordingFactory::default());
        let layer = LayerContext::new(LayerConfig::default(), scheduler.clone(), fetcher.clone())
            .with_factory(factory.clone());

        Fixture {
            scheduler,
            fetcher,
            factory,
            layer,
        }
    }

    fn tile(fx: &Fixture, code: &str) -> AssetTile {
        let path = Rc::new(UrlTemplate::new("http://host/{z}/{x}/{y}.png"));
        AssetTile::new(Quadcode::parse(code).unwrap(), path, &fx.layer)
    }

    #[test]
    fn test_new_tile_is_idle() {
        let fx = fixture();
        let tile = tile(&fx, "0123");

        assert_eq!(tile.load_state(), LoadState::Created);
        assert!(tile.renderable().is_none());
        assert!(!tile.has_pending_fetch());
        assert_eq!(tile.url(), "http://host/4/5/3.png");
        assert_eq!(fx.scheduler.pending(), 0);
    }

    #[test]
    fn test_request_defers_work() {
        let fx = fixture();
        let tile = tile(&fx, "0123");

        tile.request_async();

        assert_eq!(tile.load_state(), LoadState::PlaceholderPending);
        assert_eq!(fx.scheduler.pending(), 1);
        assert_eq!(fx.factory.calls(), 0);
        assert_eq!(fx.fetcher.count(), 0);
    }

    #[test]
    fn test_step_builds_placeholder_then_fetches() {
        let fx = fixture();
        let tile = tile(&fx, "0123");

        tile.request_async();
        assert_eq!(fx.scheduler.advance(), 1);

        assert_eq!(tile.load_state(), LoadState::FetchInFlight);
        assert_eq!(fx.factory.calls(), 1);
        assert_eq!(fx.fetcher.urls(), vec!["http://host/4/5/3.png".to_string()]);
        assert_eq!(tile.fetch_url().as_deref(), Some("http://host/4/5/3.png"));

        let renderable = tile.renderable().unwrap();
        let geometry = tile.geometry().unwrap();
        assert_eq!(renderable.geometry.width, geometry.side);
        assert_eq!(
            renderable.transform.position,
            [geometry.center.x, 0.0, geometry.center.y]
        );
    }

    #[test]
    fn test_success_attaches_asset() {
        let fx = fixture();
        let tile = tile(&fx, "0123");

        tile.request_async();
        fx.scheduler.advance();
        assert!(fx.fetcher.succeed(0, solid_png(2, 2).unwrap()));

        assert!(tile.is_ready());
        assert_eq!(tile.load_state(), LoadState::Attached);
        assert!(!tile.has_pending_fetch());

        let asset = tile.asset().unwrap();
        assert_eq!(asset.width(), 2);
        assert!(Rc::ptr_eq(tile.renderable().unwrap().asset().unwrap(), &asset));
        assert!(tile.last_error().is_none());
    }

    #[test]
    fn test_fetch_error_leaves_tile_not_ready() {
        let fx = fixture();
        let tile = tile(&fx, "0123");

        tile.request_async();
        fx.scheduler.advance();
        fx.fetcher.fail(
            0,
            FetchError::Status {
                status: 404,
                url: "http://host/4/5/3.png".to_string(),
            },
        );

        assert!(!tile.is_ready());
        assert_eq!(tile.load_state(), LoadState::Failed);
        assert!(tile.renderable().is_some());
        assert!(matches!(
            tile.last_error(),
            Some(TileError::FetchFailed {
                source: LoadError::Fetch(FetchError::Status { status: 404, .. }),
                ..
            })
        ));
    }

    #[test]
    fn test_decode_error_leaves_tile_not_ready() {
        let fx = fixture();
        let tile = tile(&fx, "0123");

        tile.request_async();
        fx.scheduler.advance();
        fx.fetcher.succeed(0, b"not an image".to_vec());

        assert!(!tile.is_ready());
        assert!(tile.asset().is_none());
        assert!(matches!(
            tile.last_error(),
            Some(TileError::FetchFailed {
                source: LoadError::Decode(_),
                ..
            })
        ));
    }

    #[test]
    fn test_cancelled_result_aborts() {
        let fx = fixture();
        let tile = tile(&fx, "0123");

        tile.request_async();
        fx.scheduler.advance();
        fx.fetcher.fail(0, FetchError::Cancelled);

        assert_eq!(tile.load_state(), LoadState::Aborted);
        assert!(!tile.is_ready());
    }

    #[test]
    fn test_retry_after_failure_refetches_only() {
        let fx = fixture();
        let tile = tile(&fx, "0123");

        tile.request_async();
        fx.scheduler.advance();
        fx.fetcher.fail(0, FetchError::Http("connection reset".to_string()));

        tile.request_async();
        fx.scheduler.advance();

        assert_eq!(fx.factory.calls(), 1);
        assert_eq!(fx.fetcher.count(), 2);
        assert_eq!(tile.load_state(), LoadState::FetchInFlight);

        fx.fetcher.succeed(1, solid_png(1, 1).unwrap());
        assert!(tile.is_ready());
    }

    #[test]
    fn test_request_while_in_flight_is_noop() {
        let fx = fixture();
        let tile = tile(&fx, "0123");

        tile.request_async();
        fx.scheduler.advance();
        tile.request_async();

        assert_eq!(fx.scheduler.pending(), 0);
        assert_eq!(fx.fetcher.count(), 1);
    }

    #[test]
    fn test_missing_geometry_skips_placeholder() {
        let fx = fixture();
        let tile = tile(&fx, "0123");
        tile.with_state(|state| state.base.clear_geometry());

        tile.request_async();
        fx.scheduler.advance();

        assert!(tile.renderable().is_none());
        assert_eq!(fx.factory.calls(), 0);
        assert_eq!(fx.fetcher.count(), 0);
        assert_eq!(tile.load_state(), LoadState::Failed);
        assert!(matches!(
            tile.last_error(),
            Some(TileError::MissingGeometry { .. })
        ));
    }

    #[test]
    fn test_released_slot_drops_asset() {
        let fx = fixture();
        let tile = tile(&fx, "0123");

        tile.request_async();
        fx.scheduler.advance();
        tile.with_state(|state| {
            if let Some(renderable) = state.renderable.as_mut() {
                renderable.release_material();
            }
        });
        fx.fetcher.succeed(0, solid_png(1, 1).unwrap());

        assert!(!tile.is_ready());
        assert!(tile.asset().is_none());
        assert_eq!(tile.load_state(), LoadState::Aborted);
        assert!(matches!(
            tile.last_error(),
            Some(TileError::StaleCompletion { .. })
        ));
    }

    #[test]
    fn test_retry_rebuilds_released_slot() {
        let fx = fixture();
        let tile = tile(&fx, "0123");

        tile.request_async();
        fx.scheduler.advance();
        tile.with_state(|state| {
            if let Some(renderable) = state.renderable.as_mut() {
                renderable.release_material();
            }
        });
        fx.fetcher.succeed(0, solid_png(1, 1).unwrap());
        assert_eq!(tile.load_state(), LoadState::Aborted);

        tile.request_async();
        assert_eq!(tile.load_state(), LoadState::PlaceholderPending);
        fx.scheduler.advance();

        assert_eq!(fx.factory.calls(), 2);
        assert!(tile.with_renderable(Renderable::has_asset_slot).unwrap());

        fx.fetcher.succeed(1, solid_png(1, 1).unwrap());
        assert!(tile.is_ready());
        assert_eq!(tile.load_state(), LoadState::Attached);
    }

    #[test]
    fn test_retry_is_not_settled_while_queued() {
        let fx = fixture();
        let tile = tile(&fx, "0123");

        tile.request_async();
        fx.scheduler.advance();
        fx.fetcher.fail(0, FetchError::Http("timeout".to_string()));
        assert!(tile.load_state().is_settled());

        tile.request_async();

        assert_eq!(tile.load_state(), LoadState::PlaceholderBuilt);
        assert!(!tile.load_state().is_settled());
        assert_eq!(fx.scheduler.pending(), 1);
    }

    #[test]
    fn test_destroy_while_holding_view() {
        let fx = fixture();
        let tile = tile(&fx, "0123");

        tile.request_async();
        fx.scheduler.advance();
        let view = tile.renderable();

        tile.destroy();

        assert!(tile.is_destroyed());
        assert!(tile.renderable().is_none());
        assert!(fx.fetcher.was_cancelled(0));
        assert!(view.is_some_and(|renderable| renderable.has_asset_slot()));
    }

    #[test]
    fn test_completion_while_holding_view() {
        let fx = fixture();
        let tile = tile(&fx, "0123");

        tile.request_async();
        fx.scheduler.advance();
        let view = tile.renderable().unwrap();

        assert!(fx.fetcher.succeed(0, solid_png(2, 2).unwrap()));

        assert!(tile.is_ready());
        assert!(view.asset().is_none());
        let asset = tile.asset().unwrap();
        let attached = tile.with_renderable(|renderable| {
            renderable
                .asset()
                .is_some_and(|current| Rc::ptr_eq(current, &asset))
        });
        assert_eq!(attached, Some(true));
    }

    #[test]
    fn test_destroy_releases_everything() {
        let fx = fixture();
        let tile = tile(&fx, "0123");

        tile.request_async();
        fx.scheduler.advance();
        fx.fetcher.succeed(0, solid_png(1, 1).unwrap());
        assert!(tile.is_ready());

        tile.destroy();

        assert!(tile.is_destroyed());
        assert!(!tile.is_ready());
        assert!(tile.renderable().is_none());
        assert!(tile.asset().is_none());
        assert!(!tile.has_pending_fetch());
        assert!(tile.geometry().is_none());
        assert_eq!(tile.load_state(), LoadState::Destroyed);
    }

    #[test]
    fn test_drop_cancels_fetch() {
        let fx = fixture();
        let tile = tile(&fx, "0123");

        tile.request_async();
        fx.scheduler.advance();
        drop(tile);

        assert!(fx.fetcher.was_cancelled(0));
        // Completion for a dropped tile is ignored.
        assert!(fx.fetcher.succeed(0, solid_png(1, 1).unwrap()));
    }

    #[test]
    fn test_drop_before_step() {
        let fx = fixture();
        let tile = tile(&fx, "0123");

        tile.request_async();
        drop(tile);
        fx.scheduler.run_until_idle();

        assert_eq!(fx.factory.calls(), 0);
        assert_eq!(fx.fetcher.count(), 0);
    }

    #[test]
    fn test_synchronous_completion() {
        let scheduler = Rc::new(ManualScheduler::new());
        let fetcher = Rc::new(ManualFetcher::immediate(Ok(solid_png(1, 1).unwrap().into())));
        let layer = LayerContext::new(LayerConfig::default(), scheduler.clone(), fetcher.clone());
        let path = Rc::new(UrlTemplate::new("http://host/{quadcode}"));
        let tile = AssetTile::new(Quadcode::parse("2").unwrap(), path, &layer);

        tile.request_async();
        scheduler.advance();

        assert!(tile.is_ready());
        assert_eq!(fetcher.count(), 1);
    }
}
