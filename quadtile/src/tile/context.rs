//! Collaborators shared by the tiles of one layer.

use std::rc::Rc;

use crate::asset::{AssetDecoder, ImageDecoder};
use crate::config::LayerConfig;
use crate::fetch::AssetFetcher;
use crate::render::{PlaneFactory, RenderableFactory};
use crate::scheduler::Scheduler;

/// Everything a tile needs from its layer.
///
/// Cheap to clone; every tile keeps its own copy of the handles.
#[derive(Clone)]
pub struct LayerContext {
    pub config: LayerConfig,
    pub scheduler: Rc<dyn Scheduler>,
    pub fetcher: Rc<dyn AssetFetcher>,
    pub decoder: Rc<dyn AssetDecoder>,
    pub factory: Rc<dyn RenderableFactory>,
}

impl LayerContext {
    /// Creates a context with the image decoder and plane factory derived
    /// from `config`.
    pub fn new(
        config: LayerConfig,
        scheduler: Rc<dyn Scheduler>,
        fetcher: Rc<dyn AssetFetcher>,
    ) -> Self {
        let decoder = Rc::new(ImageDecoder::from_config(&config));
        let factory = Rc::new(PlaneFactory::from_config(&config));

        Self {
            config,
            scheduler,
            fetcher,
            decoder,
            factory,
        }
    }

    /// Replace the asset decoder.
    pub fn with_decoder(mut self, decoder: Rc<dyn AssetDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Replace the placeholder factory.
    pub fn with_factory(mut self, factory: Rc<dyn RenderableFactory>) -> Self {
        self.factory = factory;
        self
    }
}
