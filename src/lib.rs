//! svg-sprite - merge SVG files into sprites.
//!
//! # Modules
//!
//! | Module         | Purpose                                               |
//! |----------------|-------------------------------------------------------|
//! | [`config`]     | `sprite.toml` and its side files                      |
//! | [`svg`]        | Document tree, viewBox and number helpers             |
//! | [`transform`]  | Cleaner and dimension renderer collaborators          |
//! | [`shape`]      | Normalization pipeline, distribution, namespacing     |
//! | [`queue`]      | Bounded worker pool running the pipeline              |
//! | [`collection`] | Processed shapes and their order                      |
//! | [`layout`]     | Linear layouts and the bin packer                     |
//! | [`mode`]       | Per-mode composition, data model and cache busting    |
//! | [`render`]     | Stylesheet and example rendering                      |
//! | [`spriter`]    | Public entry point                                    |

pub mod logger;

pub mod collection;
pub mod config;
pub mod error;
pub mod layout;
pub mod mode;
pub mod queue;
pub mod render;
pub mod shape;
pub mod spriter;
pub mod svg;
pub mod transform;

pub use collection::{ShapeCollection, Sorter};
pub use config::{ModeConfig, ModeKind, ShapeConfig, SpriteConfig};
pub use error::{Result, SpriteError, TransformError};
pub use layout::Layout;
pub use mode::{Artifact, ArtifactKind, ModeOutput, TemplateData};
pub use render::{BuiltinRenderer, TemplateRenderer};
pub use shape::{Shape, SkippedShape};
pub use spriter::{CompileOutput, Spriter};
pub use transform::{Cleaner, CleanerChain, DimensionRenderer, Passthrough, UsvgCleaner, UsvgRenderer};
