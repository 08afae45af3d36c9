//! Shapes and the normalization pipeline.
//!
//! # Modules
//!
//! - [`align`]: alignment expansion into distributed copies
//! - [`dimension`]: size resolution, scaling and icon centering
//! - [`padding`]: viewBox growth for padding
//! - [`meta`]: `<title>` / `<desc>` injection
//! - [`namespace`]: id and class rewriting
//! - [`stylesheet`]: selector rewriting inside `<style>` elements
//!
//! # Lifecycle
//!
//! ```text
//! Ingested ─clean─► Cleaned ─resize─► Dimensioned ─pad─► Padded
//!                                                           │
//!              Ready ◄─freeze─ Annotated ◄─annotate─────────┘
//! ```
//!
//! A `Ready` shape owns an immutable snapshot of its document behind an
//! `Arc`. Distributed copies and per-mode clones share that snapshot;
//! namespacing derives a separate document that can be reset at any time.

pub mod align;
pub mod dimension;
pub mod meta;
pub mod namespace;
pub mod padding;
pub mod stylesheet;

pub use align::{Alignment, distribute};
pub use namespace::{NamespaceOptions, namespace_token};

use std::fmt;
use std::sync::Arc;

use crate::config::{IdConfig, Meta, Padding, ShapeConfig};
use crate::error::{Result, SpriteError};
use crate::svg::{Document, ViewBox};
use crate::transform::{Cleaner, DimensionRenderer};

/// Pipeline stage of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Ingested,
    Cleaned,
    Dimensioned,
    Padded,
    Annotated,
    Ready,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Resolved geometry of a shape.
///
/// `width`/`height` are the outer size in output pixels (padding included
/// once the shape is padded).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub width: f64,
    pub height: f64,
    pub view_box: Option<ViewBox>,
    pub scale: f64,
    pub padding: Padding,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            view_box: None,
            scale: 1.0,
            padding: Padding::default(),
        }
    }
}

/// Frozen document of a `Ready` shape.
#[derive(Debug)]
pub struct Snapshot {
    pub document: Document,
    pub svg: String,
}

/// A shape that failed processing.
#[derive(Debug, Clone)]
pub struct SkippedShape {
    pub name: String,
    pub reason: SpriteError,
}

/// One source document plus everything derived from it.
#[derive(Debug, Clone)]
pub struct Shape {
    name: String,
    id: String,
    base: String,
    state: Option<String>,
    stage: Stage,
    /// Mutable document while the shape moves through the pipeline.
    working: Option<Document>,
    ready: Option<Arc<Snapshot>>,
    namespaced: Option<Document>,
    geometry: Geometry,
    precision: usize,
    align: f64,
    master: Option<String>,
    copies: usize,
    meta: Meta,
}

impl Shape {
    // ========================================================================
    // Pipeline
    // ========================================================================

    /// Run the full pipeline on one source document.
    pub fn process(
        name: &str,
        source: &[u8],
        config: &ShapeConfig,
        cleaner: &dyn Cleaner,
        renderer: &dyn DimensionRenderer,
    ) -> Result<Self> {
        let mut shape = Self::ingest(name, source, &config.id)?;
        shape.clean(cleaner)?;
        shape.resize(renderer, config)?;
        shape.pad()?;
        let meta = config.metadata.resolve(&shape.id);
        shape.annotate(&meta)?;
        shape.freeze()?;
        Ok(shape)
    }

    /// Parse a source document and derive the shape's identity.
    pub fn ingest(name: &str, source: &[u8], id_config: &IdConfig) -> Result<Self> {
        let text = std::str::from_utf8(source)
            .map_err(|e| SpriteError::invalid_input(name, format!("not UTF-8: {e}")))?;
        let document =
            Document::parse(text).map_err(|e| SpriteError::invalid_input(name, e.0))?;

        let id = id_config.generate(name);
        let (base, state) = id_config.split_state(&id);

        Ok(Self {
            name: name.to_string(),
            base: base.to_string(),
            state: state.map(str::to_string),
            id,
            stage: Stage::Ingested,
            working: Some(document),
            ready: None,
            namespaced: None,
            geometry: Geometry::default(),
            precision: 2,
            align: 0.0,
            master: None,
            copies: 0,
            meta: Meta::default(),
        })
    }

    /// Pass the document through the cleaner and parse the result again.
    pub fn clean(&mut self, cleaner: &dyn Cleaner) -> Result<()> {
        self.expect_stage(Stage::Ingested)?;
        let serialized = self.working_mut()?.to_standalone();

        let cleaned = cleaner
            .clean(serialized.as_bytes())
            .map_err(|source| SpriteError::Clean {
                name: self.name.clone(),
                source,
            })?;
        let text = String::from_utf8(cleaned).map_err(|e| SpriteError::Clean {
            name: self.name.clone(),
            source: crate::error::TransformError::new(format!("cleaner output is not UTF-8: {e}")),
        })?;
        let document = Document::parse(&text).map_err(|e| SpriteError::Clean {
            name: self.name.clone(),
            source: crate::error::TransformError::new(format!("cleaner output: {}", e.0)),
        })?;

        self.working = Some(document);
        self.stage = Stage::Cleaned;
        Ok(())
    }

    /// Resolve dimensions, scale to the maximum box and center icons.
    pub fn resize(&mut self, renderer: &dyn DimensionRenderer, config: &ShapeConfig) -> Result<()> {
        self.expect_stage(Stage::Cleaned)?;
        let name = self.name.clone();
        let precision = config.dimension.precision;
        let document = self.working_mut()?;

        let geometry = dimension::resize(&name, document, renderer, config)?;
        self.geometry = geometry;
        self.precision = precision;
        self.stage = Stage::Dimensioned;
        Ok(())
    }

    /// Grow the viewBox and outer size by the padding.
    pub fn pad(&mut self) -> Result<()> {
        self.expect_stage(Stage::Dimensioned)?;
        let mut geometry = self.geometry;
        let precision = self.precision;
        padding::apply(self.working_mut()?, &mut geometry, precision);
        self.geometry = geometry;
        self.stage = Stage::Padded;
        Ok(())
    }

    /// Inject title/description metadata.
    pub fn annotate(&mut self, meta: &Meta) -> Result<()> {
        self.expect_stage(Stage::Padded)?;
        let id = self.id.clone();
        self::meta::annotate(&mut self.working_mut()?.root, &id, meta);
        self.meta = meta.clone();
        self.stage = Stage::Annotated;
        Ok(())
    }

    /// Serialize the document once and freeze it.
    pub fn freeze(&mut self) -> Result<()> {
        self.expect_stage(Stage::Annotated)?;
        let document = self
            .working
            .take()
            .ok_or_else(|| SpriteError::not_permitted(&self.name, "document already frozen"))?;
        let svg = document.serialize();
        self.ready = Some(Arc::new(Snapshot { document, svg }));
        self.stage = Stage::Ready;
        Ok(())
    }

    fn expect_stage(&self, stage: Stage) -> Result<()> {
        if self.stage == stage {
            Ok(())
        } else {
            Err(SpriteError::not_permitted(
                &self.name,
                format!("shape is {}, expected {}", self.stage, stage),
            ))
        }
    }

    fn working_mut(&mut self) -> Result<&mut Document> {
        let name = &self.name;
        self.working
            .as_mut()
            .ok_or_else(|| SpriteError::not_permitted(name, "document is frozen"))
    }

    // ========================================================================
    // Namespacing
    // ========================================================================

    /// Derive a namespaced document from the Ready snapshot.
    ///
    /// Calling this again without [`reset_namespace`](Self::reset_namespace)
    /// is a no-op.
    pub fn namespace(&mut self, token: &str, options: &NamespaceOptions) -> Result<()> {
        let Some(snapshot) = self.ready.as_ref() else {
            return Err(SpriteError::not_permitted(
                &self.name,
                format!("cannot namespace a shape that is {}", self.stage),
            ));
        };
        if self.namespaced.is_some() {
            return Ok(());
        }

        let mut document = snapshot.document.clone();
        namespace::rewrite(&mut document.root, token, options);
        self.namespaced = Some(document);
        Ok(())
    }

    pub fn reset_namespace(&mut self) {
        self.namespaced = None;
    }

    pub fn is_namespaced(&self) -> bool {
        self.namespaced.is_some()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Source name the shape was added with.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Id without the pseudo-state suffix.
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn width(&self) -> f64 {
        self.geometry.width
    }

    pub fn height(&self) -> f64 {
        self.geometry.height
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    pub fn align(&self) -> f64 {
        self.align
    }

    /// Id of the canonical shape this copy was derived from.
    pub fn master(&self) -> Option<&str> {
        self.master.as_deref()
    }

    pub fn is_master(&self) -> bool {
        self.master.is_none()
    }

    /// Number of distributed copies (canonical shapes only).
    pub fn copies(&self) -> usize {
        self.copies
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn snapshot(&self) -> Option<&Arc<Snapshot>> {
        self.ready.as_ref()
    }

    /// The document to embed: namespaced if available, otherwise the snapshot.
    pub fn document(&self) -> Option<&Document> {
        self.namespaced
            .as_ref()
            .or_else(|| self.ready.as_deref().map(|snapshot| &snapshot.document))
    }

    /// Serialized Ready document.
    pub fn svg(&self) -> Option<&str> {
        self.ready.as_deref().map(|snapshot| snapshot.svg.as_str())
    }

    pub(crate) fn rename(&mut self, base: &str, pseudo: &str) {
        self.base = base.to_string();
        self.id = match &self.state {
            Some(state) => format!("{base}{pseudo}{state}"),
            None => base.to_string(),
        };
    }
}

/// A Ready shape with the given id and outer size, for tests.
#[cfg(test)]
pub(crate) fn test_shape(id: &str, width: f64, height: f64) -> Shape {
    let source = format!(r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}"><rect width="{width}" height="{height}"/></svg>"#);
    Shape::process(
        &format!("{id}.svg"),
        source.as_bytes(),
        &ShapeConfig::default(),
        &crate::transform::Passthrough,
        &crate::transform::UsvgRenderer::default(),
    )
    .unwrap()
}
