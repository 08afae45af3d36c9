//! Linear layouts: vertical, horizontal and diagonal.

use rustc_hash::FxHashMap;

use super::{Arrangement, Placement};
use crate::shape::Shape;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Shapes advance along y, alignment applies to x.
    Vertical,
    /// Shapes advance along x, alignment applies to y.
    Horizontal,
}

/// Stack canonical shapes along `axis`.
///
/// Each shape is offset on the cross axis by `(extent - size) * align`.
/// Distributed copies reuse their master's main-axis offset and compute
/// their own cross-axis offset, so a copy describes the same geometry seen
/// through a different alignment.
pub fn stack(shapes: &[Shape], axis: Axis) -> Arrangement {
    let main = |shape: &Shape| match axis {
        Axis::Vertical => shape.height(),
        Axis::Horizontal => shape.width(),
    };
    let cross = |shape: &Shape| match axis {
        Axis::Vertical => shape.width(),
        Axis::Horizontal => shape.height(),
    };

    let extent = shapes.iter().map(cross).fold(0.0_f64, f64::max);

    let mut offsets: FxHashMap<&str, f64> = FxHashMap::default();
    let mut cursor = 0.0;
    for shape in shapes.iter().filter(|shape| shape.is_master()) {
        offsets.insert(shape.id(), cursor);
        cursor += main(shape);
    }

    let placements = shapes
        .iter()
        .enumerate()
        .filter_map(|(index, shape)| {
            let lookup = shape.master().unwrap_or(shape.id());
            let along = *offsets.get(lookup)?;
            let across = (extent - cross(shape)) * shape.align();
            let (x, y) = match axis {
                Axis::Vertical => (across, along),
                Axis::Horizontal => (along, across),
            };
            Some(Placement { index, x, y })
        })
        .collect();

    let (width, height) = match axis {
        Axis::Vertical => (extent, cursor),
        Axis::Horizontal => (cursor, extent),
    };

    Arrangement {
        width,
        height,
        placements,
    }
}

/// Place canonical shapes corner to corner; copies are dropped.
pub fn diagonal(shapes: &[Shape]) -> Arrangement {
    let (mut x, mut y) = (0.0, 0.0);
    let mut placements = Vec::new();

    for (index, shape) in shapes.iter().enumerate() {
        if !shape.is_master() {
            continue;
        }
        placements.push(Placement { index, x, y });
        x += shape.width();
        y += shape.height();
    }

    Arrangement {
        width: x,
        height: y,
        placements,
    }
}
