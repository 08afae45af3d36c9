//! Alignment expansion.
//!
//! A shape may be listed several times in a sprite's stylesheet, each time
//! under a different name and alignment, without its geometry being written
//! more than once. The first alignment entry renames the shape itself; every
//! further entry produces a copy that shares the shape's document and points
//! back to it through `master`.
//!
//! ```text
//! icon  +  [left-%s: 0, right-%s: 1]
//!   -> left-icon  (master, align 0)
//!   -> right-icon (copy of left-icon, align 1)
//! ```

use super::Shape;
use crate::config::apply_template;
use crate::debug;

/// One alignment entry: a name template and a cross-axis fraction in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    pub template: String,
    pub fraction: f64,
}

impl Alignment {
    pub fn new(template: impl Into<String>, fraction: f64) -> Self {
        Self {
            template: template.into(),
            fraction: fraction.clamp(0.0, 1.0),
        }
    }

    /// `("%s", 0)`: keep the name, align to the start.
    pub fn identity() -> Self {
        Self::new("%s", 0.0)
    }
}

/// Expand a processed shape into its positioned variants.
///
/// The returned list always starts with the canonical shape. With a single
/// entry (or none) it contains exactly that shape.
pub fn distribute(mut shape: Shape, alignments: &[Alignment], pseudo: &str) -> Vec<Shape> {
    let Some((first, rest)) = alignments.split_first() else {
        return vec![shape];
    };

    let original_base = shape.base.clone();
    shape.rename(&apply_template(&first.template, &original_base), pseudo);
    shape.align = first.fraction;

    let mut copies = Vec::with_capacity(rest.len());
    for alignment in rest {
        let mut copy = shape.clone();
        copy.rename(&apply_template(&alignment.template, &original_base), pseudo);
        copy.align = alignment.fraction;
        copy.master = Some(shape.id.clone());
        copy.copies = 0;
        debug!("align"; "{} -> {} ({})", shape.id, copy.id, alignment.fraction);
        copies.push(copy);
    }

    shape.copies = copies.len();
    let mut shapes = Vec::with_capacity(copies.len() + 1);
    shapes.push(shape);
    shapes.extend(copies);
    shapes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::test_shape;
    use std::sync::Arc;

    #[test]
    fn test_identity_distribution() {
        let shapes = distribute(test_shape("icon", 10.0, 10.0), &[Alignment::identity()], "~");
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].id(), "icon");
        assert_eq!(shapes[0].master(), None);
        assert_eq!(shapes[0].copies(), 0);
    }

    #[test]
    fn test_two_entry_distribution() {
        let shapes = distribute(
            test_shape("icon", 10.0, 10.0),
            &[Alignment::new("left-%s", 0.0), Alignment::new("right-%s", 1.0)],
            "~",
        );
        assert_eq!(shapes.len(), 2);

        let (master, copy) = (&shapes[0], &shapes[1]);
        assert_eq!(master.id(), "left-icon");
        assert_eq!(master.align(), 0.0);
        assert_eq!(master.copies(), 1);

        assert_eq!(copy.id(), "right-icon");
        assert_eq!(copy.base(), "right-icon");
        assert_eq!(copy.align(), 1.0);
        assert_eq!(copy.master(), Some("left-icon"));

        // Copies share the processed document
        let a = master.snapshot().unwrap();
        let b = copy.snapshot().unwrap();
        assert!(Arc::ptr_eq(a, b));
    }

    #[test]
    fn test_state_is_preserved() {
        let shapes = distribute(
            test_shape("icon~hover", 10.0, 10.0),
            &[Alignment::new("%s", 0.0), Alignment::new("x-", 0.5)],
            "~",
        );
        assert_eq!(shapes[0].id(), "icon~hover");
        assert_eq!(shapes[1].id(), "x-icon~hover");
        assert_eq!(shapes[1].base(), "x-icon");
        assert_eq!(shapes[1].state(), Some("hover"));
    }

    #[test]
    fn test_fraction_is_clamped() {
        assert_eq!(Alignment::new("%s", 3.0).fraction, 1.0);
        assert_eq!(Alignment::new("%s", -1.0).fraction, 0.0);
    }
}
