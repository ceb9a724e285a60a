//! Deterministic doubles for the tile collaborators.
//!
//! These let tests drive a tile one step at a time: advance the scheduler
//! by hand, deliver fetch completions in any order (including after the
//! tile was destroyed) and count placeholder constructions.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io::Cursor;

use bytes::Bytes;
use image::{ImageFormat, Rgba, RgbaImage};
use tokio_util::sync::CancellationToken;

use crate::coord::{Quadcode, TileCoord, WorldPoint};
use crate::fetch::{AssetFetcher, FetchCallback, FetchError, FetchResult};
use crate::render::{PlaneFactory, Renderable, RenderableFactory, RenderError};
use crate::scheduler::{Deferred, Scheduler};
use crate::url::{TileUrlBuilder, UrlTemplate};

/// A scheduler that only runs work when told to.
#[derive(Default)]
pub struct ManualScheduler {
    queue: RefCell<VecDeque<Deferred>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued tasks.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Run one turn: every task queued before this call.
    ///
    /// Tasks deferred while the turn runs wait for the next turn. Returns
    /// the number of tasks that ran.
    pub fn advance(&self) -> usize {
        let turn: Vec<Deferred> = self.queue.borrow_mut().drain(..).collect();
        let count = turn.len();
        for task in turn {
            task();
        }
        count
    }

    /// Run turns until the queue is empty. Returns the total number of
    /// tasks that ran.
    pub fn run_until_idle(&self) -> usize {
        let mut total = 0;
        loop {
            let ran = self.advance();
            if ran == 0 {
                return total;
            }
            total += ran;
        }
    }
}

impl Scheduler for ManualScheduler {
    fn defer(&self, task: Deferred) {
        self.queue.borrow_mut().push_back(task);
    }
}

struct Request {
    url: String,
    token: CancellationToken,
    callback: Option<FetchCallback>,
}

/// A fetcher that records requests and completes them on demand.
///
/// Completions are delivered even when the request was cancelled, so tests
/// can check that tiles ignore stale results.
#[derive(Default)]
pub struct ManualFetcher {
    requests: RefCell<Vec<Request>>,
    immediate: Option<FetchResult>,
}

impl ManualFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fetcher that completes every request with `result` before
    /// `fetch` returns.
    pub fn immediate(result: FetchResult) -> Self {
        Self {
            requests: RefCell::default(),
            immediate: Some(result),
        }
    }

    /// Number of fetches started.
    pub fn count(&self) -> usize {
        self.requests.borrow().len()
    }

    /// URLs in the order they were requested.
    pub fn urls(&self) -> Vec<String> {
        self.requests
            .borrow()
            .iter()
            .map(|request| request.url.clone())
            .collect()
    }

    /// Returns true if request `index` has been cancelled.
    pub fn was_cancelled(&self, index: usize) -> bool {
        self.requests
            .borrow()
            .get(index)
            .is_some_and(|request| request.token.is_cancelled())
    }

    /// Deliver `result` to request `index`.
    ///
    /// Returns false if there is no such request or it already completed.
    pub fn complete(&self, index: usize, result: FetchResult) -> bool {
        let callback = self
            .requests
            .borrow_mut()
            .get_mut(index)
            .and_then(|request| request.callback.take());

        match callback {
            Some(callback) => {
                callback(result);
                true
            }
            None => false,
        }
    }

    /// Complete request `index` with `body`.
    pub fn succeed(&self, index: usize, body: impl Into<Bytes>) -> bool {
        self.complete(index, Ok(body.into()))
    }

    /// Fail request `index` with `error`.
    pub fn fail(&self, index: usize, error: FetchError) -> bool {
        self.complete(index, Err(error))
    }
}

impl AssetFetcher for ManualFetcher {
    fn fetch(&self, url: &str, cancel: CancellationToken, on_complete: FetchCallback) {
        let callback = match &self.immediate {
            Some(result) => {
                on_complete(result.clone());
                None
            }
            None => Some(on_complete),
        };

        self.requests.borrow_mut().push(Request {
            url: url.to_string(),
            token: cancel,
            callback,
        });
    }
}

/// A factory that counts how many placeholders it built.
#[derive(Default)]
pub struct RecordingFactory<F = PlaneFactory> {
    inner: F,
    calls: Cell<usize>,
}

impl<F: RenderableFactory> RecordingFactory<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            calls: Cell::new(0),
        }
    }

    /// Number of `create` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl<F: RenderableFactory> RenderableFactory for RecordingFactory<F> {
    fn create(&self, center: WorldPoint, side: f64) -> Result<Renderable, RenderError> {
        self.calls.set(self.calls.get() + 1);
        self.inner.create(center, side)
    }
}

/// A URL builder that counts how many fetch keys it produced.
pub struct RecordingUrlBuilder<U = UrlTemplate> {
    inner: U,
    calls: Cell<usize>,
}

impl<U: TileUrlBuilder> RecordingUrlBuilder<U> {
    pub fn new(inner: U) -> Self {
        Self {
            inner,
            calls: Cell::new(0),
        }
    }

    /// Number of `tile_url` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl<U: TileUrlBuilder> TileUrlBuilder for RecordingUrlBuilder<U> {
    fn tile_url(&self, tile: &TileCoord, quadcode: &Quadcode) -> String {
        self.calls.set(self.calls.get() + 1);
        self.inner.tile_url(tile, quadcode)
    }
}

/// Encode a solid grey PNG of the given size.
pub fn solid_png(width: u32, height: u32) -> Result<Vec<u8>, image::ImageError> {
    let image = RgbaImage::from_pixel(width, height, Rgba([128, 128, 128, 255]));
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}
