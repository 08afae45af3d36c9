//! Public entry point.
//!
//! ```ignore
//! let mut spriter = Spriter::new(config)?;
//! spriter.add("icons/home.svg", bytes);
//! let output = spriter.compile(&modes)?;
//! for artifact in output.artifacts() { /* write */ }
//! ```
//!
//! Shapes are normalized once, on the first `compile` after they were added.
//! Later calls with other mode tables reuse the processed collection.

use std::collections::BTreeMap;
use std::sync::Arc;

use rayon::prelude::*;

use crate::collection::{ShapeCollection, Sorter};
use crate::config::{ConfigError, ModeConfig, ShapeConfig, SpriteConfig};
use crate::error::{Result, SpriteError};
use crate::mode::{Artifact, ModeOutput, compile_mode};
use crate::queue::ProcessingQueue;
use crate::render::{BuiltinRenderer, TemplateRenderer};
use crate::shape::SkippedShape;
use crate::transform::{Cleaner, CleanerChain, DimensionRenderer, UsvgRenderer};
use crate::{debug, log};

/// Result of one `compile` call.
#[derive(Debug)]
pub struct CompileOutput {
    /// Per mode: its output, or the error that failed only this mode.
    pub modes: BTreeMap<String, Result<ModeOutput>>,
    /// Every shape dropped so far, with the reason.
    pub skipped: Vec<SkippedShape>,
}

impl CompileOutput {
    /// Artifacts of all successful modes.
    pub fn artifacts(&self) -> impl Iterator<Item = &Artifact> {
        self.modes
            .values()
            .filter_map(|result| result.as_ref().ok())
            .flat_map(|output| &output.artifacts)
    }

    /// Modes that failed, with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &SpriteError)> {
        self.modes
            .iter()
            .filter_map(|(name, result)| result.as_ref().err().map(|e| (name.as_str(), e)))
    }
}

pub struct Spriter {
    config: SpriteConfig,
    shape_config: Arc<ShapeConfig>,
    queue: ProcessingQueue,
    collection: ShapeCollection,
    skipped: Vec<SkippedShape>,
    cleaner: Box<dyn Cleaner>,
    dimensions: Box<dyn DimensionRenderer>,
    renderer: Box<dyn TemplateRenderer>,
    sorter: Option<Sorter>,
}

impl Spriter {
    /// Create a spriter; the cleaner chain comes from `shape.transform`.
    pub fn new(config: SpriteConfig) -> Result<Self> {
        config.validate().map_err(configuration)?;
        let cleaner = CleanerChain::from_names(&config.shape.transform)?;
        Ok(Self {
            shape_config: Arc::new(config.shape.clone()),
            queue: ProcessingQueue::new(config.effective_limit()),
            collection: ShapeCollection::new(),
            skipped: Vec::new(),
            cleaner: Box::new(cleaner),
            dimensions: Box::new(UsvgRenderer::default()),
            renderer: Box::new(BuiltinRenderer),
            sorter: None,
            config,
        })
    }

    pub fn with_cleaner(mut self, cleaner: impl Cleaner + 'static) -> Self {
        self.cleaner = Box::new(cleaner);
        self
    }

    pub fn with_dimension_renderer(mut self, renderer: impl DimensionRenderer + 'static) -> Self {
        self.dimensions = Box::new(renderer);
        self
    }

    pub fn with_renderer(mut self, renderer: impl TemplateRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Replace the default id order of shapes.
    pub fn with_sorter(mut self, sorter: Sorter) -> Self {
        self.sorter = Some(sorter);
        self
    }

    pub fn config(&self) -> &SpriteConfig {
        &self.config
    }

    /// Enqueue a shape with the configured `[shape]` settings.
    pub fn add(&mut self, name: impl Into<String>, source: impl Into<Vec<u8>>) {
        let config = Arc::clone(&self.shape_config);
        self.queue.enqueue(name, source.into(), config);
    }

    /// Enqueue a shape with its own settings.
    pub fn add_with_config(
        &mut self,
        name: impl Into<String>,
        source: impl Into<Vec<u8>>,
        config: ShapeConfig,
    ) -> Result<()> {
        config.validate().map_err(configuration)?;
        self.queue.enqueue(name, source.into(), Arc::new(config));
        Ok(())
    }

    /// Processed shapes, in sprite order.
    pub fn shapes(&self) -> &ShapeCollection {
        &self.collection
    }

    pub fn skipped(&self) -> &[SkippedShape] {
        &self.skipped
    }

    /// Normalize pending shapes, then compile every mode.
    pub fn compile(&mut self, modes: &BTreeMap<String, ModeConfig>) -> Result<CompileOutput> {
        if modes.is_empty() {
            return Err(SpriteError::Configuration("no modes configured".into()));
        }

        self.process_pending();

        let shapes = self.collection.shapes();
        let renderer = &*self.renderer;
        let config = &self.config;

        let results: BTreeMap<String, Result<ModeOutput>> = modes
            .par_iter()
            .map(|(name, mode)| {
                let result = compile_mode(name, mode, config, shapes, renderer);
                (name.clone(), result)
            })
            .collect();

        for (name, result) in &results {
            if let Err(e) = result {
                log!("error"; "mode `{}` failed: {}", name, e);
            }
        }

        Ok(CompileOutput {
            modes: results,
            skipped: self.skipped.clone(),
        })
    }

    /// Run the queue (if anything is pending) and restore the sprite order.
    fn process_pending(&mut self) {
        if self.queue.is_empty() {
            debug!("sprite"; "reusing {} processed shapes", self.collection.len());
            return;
        }

        let skipped = self
            .queue
            .run(&*self.cleaner, &*self.dimensions, &mut self.collection);
        self.collection.sort(self.sorter.as_ref());

        log!(
            "sprite";
            "{} shapes ready, {} skipped",
            self.collection.len(),
            skipped.len()
        );
        self.skipped.extend(skipped);
    }
}

fn configuration(err: ConfigError) -> SpriteError {
    SpriteError::Configuration(err.to_string())
}
