//! External collaborators of the normalization pipeline.
//!
//! - [`Cleaner`]: rewrites a serialized document (optimization, cleanup)
//! - [`DimensionRenderer`]: measures documents without usable size attributes
//!
//! Both are traits so callers can plug in their own tools. The defaults are
//! built on `usvg`:
//!
//! | Name                     | Behavior                                      |
//! |--------------------------|-----------------------------------------------|
//! | [`Passthrough`]          | returns the input unchanged                   |
//! | [`UsvgCleaner`]          | parses and writes the document with `usvg`    |
//! | [`CleanerChain`]         | runs cleaners in order (`shape.transform`)    |
//! | [`UsvgRenderer`]         | stroke-inclusive bounding box of the content  |
//!
//! Closures `Fn(&[u8]) -> Result<Vec<u8>, TransformError>` are cleaners too.

use usvg::{Node, Rect, Tree};

use crate::error::{SpriteError, TransformError};
use crate::svg::ViewBox;

type TransformResult<T> = std::result::Result<T, TransformError>;

// ============================================================================
// Cleaner
// ============================================================================

/// Document transformation applied before dimensions are resolved.
pub trait Cleaner: Send + Sync {
    fn clean(&self, svg: &[u8]) -> TransformResult<Vec<u8>>;
}

impl<F> Cleaner for F
where
    F: Fn(&[u8]) -> TransformResult<Vec<u8>> + Send + Sync,
{
    fn clean(&self, svg: &[u8]) -> TransformResult<Vec<u8>> {
        self(svg)
    }
}

/// Leaves documents untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Cleaner for Passthrough {
    fn clean(&self, svg: &[u8]) -> TransformResult<Vec<u8>> {
        Ok(svg.to_vec())
    }
}

/// Normalizes documents by round-tripping them through `usvg`.
///
/// Shapes, transforms and styles are resolved into plain paths, which drops
/// unsupported or invisible content.
#[derive(Debug, Clone)]
pub struct UsvgCleaner {
    /// DPI for unit conversion.
    pub dpi: f32,
}

impl Default for UsvgCleaner {
    fn default() -> Self {
        Self { dpi: 96.0 }
    }
}

impl Cleaner for UsvgCleaner {
    fn clean(&self, svg: &[u8]) -> TransformResult<Vec<u8>> {
        let options = usvg::Options {
            dpi: self.dpi,
            ..Default::default()
        };
        let tree = Tree::from_data(svg, &options)?;

        let write_options = usvg::WriteOptions {
            indent: usvg::Indent::None,
            ..Default::default()
        };
        Ok(tree.to_string(&write_options).into_bytes())
    }
}

/// Ordered list of cleaners.
#[derive(Default)]
pub struct CleanerChain {
    cleaners: Vec<Box<dyn Cleaner>>,
}

impl CleanerChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, cleaner: impl Cleaner + 'static) -> Self {
        self.cleaners.push(Box::new(cleaner));
        self
    }

    /// Build a chain from configured names (`usvg`, `none`).
    pub fn from_names(names: &[String]) -> Result<Self, SpriteError> {
        names.iter().try_fold(Self::new(), |chain, name| {
            match name.trim().to_ascii_lowercase().as_str() {
                "usvg" => Ok(chain.with(UsvgCleaner::default())),
                "none" | "passthrough" => Ok(chain.with(Passthrough)),
                other => Err(SpriteError::Configuration(format!(
                    "unknown transform `{other}` (expected `usvg` or `none`)"
                ))),
            }
        })
    }

    pub fn len(&self) -> usize {
        self.cleaners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cleaners.is_empty()
    }
}

impl Cleaner for CleanerChain {
    fn clean(&self, svg: &[u8]) -> TransformResult<Vec<u8>> {
        let mut current = svg.to_vec();
        for cleaner in &self.cleaners {
            current = cleaner.clean(&current)?;
        }
        Ok(current)
    }
}

// ============================================================================
// Dimension renderer
// ============================================================================

/// Measures a document that has no usable size.
pub trait DimensionRenderer: Send + Sync {
    /// Region covered by the rendered content, in user units.
    fn bounds(&self, svg: &[u8]) -> TransformResult<ViewBox>;
}

/// Measures documents with `usvg`.
///
/// The stroke-inclusive bounding box of all content is used; documents
/// without visible content fall back to the size `usvg` resolved.
#[derive(Debug, Clone)]
pub struct UsvgRenderer {
    pub dpi: f32,
}

impl Default for UsvgRenderer {
    fn default() -> Self {
        Self { dpi: 96.0 }
    }
}

impl DimensionRenderer for UsvgRenderer {
    fn bounds(&self, svg: &[u8]) -> TransformResult<ViewBox> {
        let options = usvg::Options {
            dpi: self.dpi,
            ..Default::default()
        };
        let tree = Tree::from_data(svg, &options)?;

        let (x, y, width, height) = match stroke_bounds(&tree) {
            Some(bounds) => (bounds.x(), bounds.y(), bounds.width(), bounds.height()),
            None => (0.0, 0.0, tree.size().width(), tree.size().height()),
        };
        Ok(ViewBox::new(
            f64::from(x),
            f64::from(y),
            f64::from(width),
            f64::from(height),
        ))
    }
}

/// Union of the stroke bounding boxes of all nodes.
fn stroke_bounds(tree: &Tree) -> Option<Rect> {
    let mut bounds = None;
    collect_bounds(tree.root(), &mut bounds);
    bounds
}

fn collect_bounds(group: &usvg::Group, bounds: &mut Option<Rect>) {
    for node in group.children() {
        *bounds = union(*bounds, node.stroke_bounding_box());
        if let Node::Group(nested) = node {
            collect_bounds(nested, bounds);
        }
    }
}

fn union(a: Option<Rect>, b: Rect) -> Option<Rect> {
    match a {
        Some(a) => {
            let left = a.x().min(b.x());
            let top = a.y().min(b.y());
            let right = a.right().max(b.right());
            let bottom = a.bottom().max(b.bottom());
            Rect::from_xywh(left, top, right - left, bottom - top)
        }
        None => Some(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough() {
        assert_eq!(Passthrough.clean(b"<svg/>").unwrap(), b"<svg/>");
    }

    #[test]
    fn test_closure_cleaner() {
        let upper = |svg: &[u8]| -> TransformResult<Vec<u8>> { Ok(svg.to_ascii_uppercase()) };
        let chain = CleanerChain::new().with(Passthrough).with(upper);
        assert_eq!(chain.clean(b"<svg/>").unwrap(), b"<SVG/>");
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_chain_from_names() {
        assert!(CleanerChain::from_names(&[]).unwrap().is_empty());
        assert_eq!(
            CleanerChain::from_names(&["usvg".into(), "none".into()])
                .unwrap()
                .len(),
            2
        );
        let err = CleanerChain::from_names(&["svgo".into()]).err().unwrap();
        assert!(matches!(err, SpriteError::Configuration(_)));
    }

    #[test]
    fn test_usvg_cleaner_output_parses() {
        let cleaned = UsvgCleaner::default()
            .clean(br#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><rect width="5" height="5"/></svg>"#)
            .unwrap();
        let text = String::from_utf8(cleaned).unwrap();
        assert!(crate::svg::Document::parse(&text).is_ok());
    }

    #[test]
    fn test_usvg_cleaner_rejects_garbage() {
        assert!(UsvgCleaner::default().clean(b"not svg").is_err());
    }

    #[test]
    fn test_renderer_measures_content() {
        let bounds = UsvgRenderer::default()
            .bounds(br#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100"><rect x="10" y="10" width="30" height="20"/></svg>"#)
            .unwrap();
        assert!((bounds.x - 10.0).abs() < 1e-3);
        assert!((bounds.y - 10.0).abs() < 1e-3);
        assert!((bounds.width - 30.0).abs() < 1e-3);
        assert!((bounds.height - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_union() {
        let a = Rect::from_xywh(0.0, 0.0, 100.0, 100.0);
        let b = Rect::from_xywh(-10.0, -10.0, 50.0, 50.0).unwrap();
        let merged = union(a, b).unwrap();
        assert_eq!(merged.x(), -10.0);
        assert_eq!(merged.right(), 100.0);
    }
}
