//! Sprite modes.
//!
//! # Modules
//!
//! - [`strategy`]: per-kind selection, layout and embedding ([`LayoutStrategy`])
//! - [`compose`]: composite sprite document
//! - [`data`]: template data model
//! - [`bust`]: cache-busting file names
//!
//! # Compilation
//!
//! ```text
//! shapes ─► select ─► namespace ─► layout ─► compose ─► bust ─► render
//!                                                               │
//!                                 sprite + stylesheet + example ◄┘
//! ```
//!
//! Each mode works on its own clones of the shape handles, so modes compile
//! independently (and in parallel) over one shared collection.

pub mod bust;
pub mod compose;
pub mod data;
pub mod strategy;

pub use data::{Point, Position, Selectors, ShapeData, TemplateData};
pub use strategy::LayoutStrategy;

use std::fmt;

use serde::Serialize;

use crate::config::{ModeConfig, ModeKind, SpriteConfig, SvgConfig};
use crate::error::{Result, SpriteError};
use crate::render::{self, TemplateRenderer};
use crate::shape::{NamespaceOptions, Shape, namespace_token};
use crate::{debug, log};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Sprite,
    Stylesheet,
    Example,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sprite => "sprite",
            Self::Stylesheet => "stylesheet",
            Self::Example => "example",
        })
    }
}

/// An output file, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    /// Destination, relative to the output directory.
    pub path: String,
    pub contents: String,
}

#[derive(Debug, Clone)]
pub struct ModeOutput {
    pub artifacts: Vec<Artifact>,
    pub data: TemplateData,
}

impl ModeOutput {
    pub fn artifact(&self, kind: ArtifactKind) -> Option<&Artifact> {
        self.artifacts.iter().find(|artifact| artifact.kind == kind)
    }

    pub fn sprite(&self) -> Option<&str> {
        self.artifact(ArtifactKind::Sprite)
            .map(|artifact| artifact.contents.as_str())
    }
}

/// Compile one `[mode.<name>]` table over sorted, Ready shapes.
pub fn compile_mode(
    name: &str,
    mode: &ModeConfig,
    config: &SpriteConfig,
    shapes: &[Shape],
    renderer: &dyn TemplateRenderer,
) -> Result<ModeOutput> {
    let kind = mode
        .resolve_kind(name)
        .map_err(|e| SpriteError::Configuration(format!("mode `{name}`: {e}")))?;

    let mut shapes: Vec<Shape> = shapes
        .iter()
        .filter(|shape| kind.includes(shape, mode))
        .cloned()
        .collect();
    namespace(&mut shapes, kind, &config.svg)?;

    let arrangement = kind.layout(&shapes, mode)?;
    let sprite = compose::sprite(kind, mode, &config.svg, &shapes, &arrangement)?;

    let mut data = TemplateData::build(name, kind, mode, &shapes, &arrangement);
    if mode.busts(kind) {
        let hash = bust::content_hash(sprite.as_bytes());
        data.sprite = bust::busted_path(&data.sprite, &hash);
    }

    let mut artifacts = vec![Artifact {
        kind: ArtifactKind::Sprite,
        path: data.sprite.clone(),
        contents: sprite,
    }];

    if let Some(path) = data.stylesheet.clone() {
        let mut css = renderer.render(ArtifactKind::Stylesheet, &data)?;
        if mode.minify {
            match render::minify_css(&css) {
                Some(minified) => css = minified,
                None => debug!("mode"; "{}: stylesheet left unminified", name),
            }
        }
        artifacts.push(Artifact {
            kind: ArtifactKind::Stylesheet,
            path,
            contents: css,
        });
    }

    if let Some(path) = data.example.clone() {
        let html = renderer.render(ArtifactKind::Example, &data)?;
        artifacts.push(Artifact {
            kind: ArtifactKind::Example,
            path,
            contents: html,
        });
    }

    log!("mode"; "{} ({}): {} shapes -> {}", name, kind, data.shapes.len(), data.sprite);
    Ok(ModeOutput { artifacts, data })
}

/// Namespace the embedded shapes of one mode, from their Ready snapshots.
///
/// Shape ids and view fragments are reserved, so no inner id can shadow them.
fn namespace(shapes: &mut [Shape], kind: ModeKind, svg: &SvgConfig) -> Result<()> {
    let mut options = NamespaceOptions::from(svg);
    options.reserved = shapes
        .iter()
        .flat_map(|shape| {
            let view = (kind == ModeKind::View).then(|| data::view_fragment(shape.id()));
            std::iter::once(shape.id().to_string()).chain(view)
        })
        .collect();

    let count = shapes.iter().filter(|shape| shape.is_master()).count();

    for (index, shape) in shapes
        .iter_mut()
        .filter(|shape| shape.is_master())
        .enumerate()
    {
        shape.reset_namespace();
        if svg.namespaces() {
            shape.namespace(&namespace_token(index, count), &options)?;
        }
    }
    Ok(())
}
