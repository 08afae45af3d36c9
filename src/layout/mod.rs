//! Sprite layout engines.
//!
//! # Modules
//!
//! - [`linear`]: vertical, horizontal and diagonal placement
//! - [`packer`]: growing binary-tree bin packer
//!
//! A layout turns the sorted shape list into absolute positions plus the
//! canvas size:
//!
//! | Layout       | Copies      | Canvas                              |
//! |--------------|-------------|-------------------------------------|
//! | `vertical`   | positioned  | max width × summed height           |
//! | `horizontal` | positioned  | summed width × max height           |
//! | `diagonal`   | dropped     | summed width × summed height        |
//! | `packed`     | dropped     | grown to fit, roughly square        |

pub mod linear;
pub mod packer;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::shape::Shape;

pub use packer::{Packer, Packing};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Vertical,
    Horizontal,
    Diagonal,
    #[default]
    Packed,
}

impl Layout {
    /// Whether distributed copies can be expressed by displacing the master.
    pub fn is_displaceable(self) -> bool {
        matches!(self, Self::Vertical | Self::Horizontal)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vertical => "vertical",
            Self::Horizontal => "horizontal",
            Self::Diagonal => "diagonal",
            Self::Packed => "packed",
        }
    }
}

/// Position of one shape, by index into the laid out shape list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub index: usize,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Arrangement {
    pub width: f64,
    pub height: f64,
    /// In shape list order; shapes the layout cannot express are absent.
    pub placements: Vec<Placement>,
}

impl Arrangement {
    pub fn placement_of(&self, index: usize) -> Option<&Placement> {
        self.placements.iter().find(|p| p.index == index)
    }
}

/// Compute positions for `shapes` (already sorted).
pub fn arrange(layout: Layout, shapes: &[Shape]) -> Result<Arrangement> {
    match layout {
        Layout::Vertical => Ok(linear::stack(shapes, linear::Axis::Vertical)),
        Layout::Horizontal => Ok(linear::stack(shapes, linear::Axis::Horizontal)),
        Layout::Diagonal => Ok(linear::diagonal(shapes)),
        Layout::Packed => packed(shapes),
    }
}

/// Pack canonical shapes, largest side first (stable for equal sizes).
fn packed(shapes: &[Shape]) -> Result<Arrangement> {
    let mut order: Vec<usize> = (0..shapes.len())
        .filter(|&i| shapes[i].is_master())
        .collect();
    let side = |i: usize| shapes[i].width().max(shapes[i].height());
    order.sort_by(|&a, &b| side(b).total_cmp(&side(a)));

    let blocks: Vec<(f64, f64)> = order
        .iter()
        .map(|&i| (shapes[i].width(), shapes[i].height()))
        .collect();
    let packing = Packer::new().pack(&blocks)?;

    let mut placements: Vec<Placement> = order
        .into_iter()
        .zip(packing.positions)
        .map(|(index, (x, y))| Placement { index, x, y })
        .collect();
    placements.sort_by_key(|p| p.index);

    Ok(Arrangement {
        width: packing.width,
        height: packing.height,
        placements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Alignment, distribute, test_shape};

    fn ids<'a>(shapes: &'a [Shape], arrangement: &Arrangement) -> Vec<&'a str> {
        arrangement
            .placements
            .iter()
            .map(|p| shapes[p.index].id())
            .collect()
    }

    #[test]
    fn test_layout_parsing() {
        #[derive(Deserialize)]
        struct Wrapper {
            layout: Layout,
        }
        let w: Wrapper = toml::from_str(r#"layout = "diagonal""#).unwrap();
        assert_eq!(w.layout, Layout::Diagonal);
        assert_eq!(Layout::default(), Layout::Packed);
        assert!(Layout::Vertical.is_displaceable());
        assert!(!Layout::Packed.is_displaceable());
    }

    #[test]
    fn test_vertical_stack() {
        let shapes = vec![test_shape("a", 20.0, 10.0), test_shape("b", 10.0, 30.0)];
        let arrangement = arrange(Layout::Vertical, &shapes).unwrap();
        assert_eq!((arrangement.width, arrangement.height), (20.0, 40.0));
        assert_eq!(arrangement.placements[0], Placement { index: 0, x: 0.0, y: 0.0 });
        assert_eq!(arrangement.placements[1], Placement { index: 1, x: 0.0, y: 10.0 });
    }

    #[test]
    fn test_horizontal_stack_with_copies() {
        let icon = test_shape("icon", 10.0, 10.0);
        let wide = test_shape("wide", 30.0, 20.0);
        let mut shapes = distribute(
            icon,
            &[Alignment::new("left-%s", 0.0), Alignment::new("right-%s", 1.0)],
            "~",
        );
        shapes.push(wide);
        shapes.sort_by(|a, b| a.id().cmp(b.id()));
        // left-icon, right-icon (copy), wide

        let arrangement = arrange(Layout::Horizontal, &shapes).unwrap();
        assert_eq!((arrangement.width, arrangement.height), (40.0, 20.0));
        assert_eq!(ids(&shapes, &arrangement), vec!["left-icon", "right-icon", "wide"]);

        let left = arrangement.placements[0];
        let right = arrangement.placements[1];
        assert_eq!((left.x, left.y), (0.0, 0.0));
        // Copy keeps the master's main-axis offset, own cross-axis alignment
        assert_eq!((right.x, right.y), (0.0, 10.0));
        assert_eq!((arrangement.placements[2].x, arrangement.placements[2].y), (10.0, 0.0));
    }

    #[test]
    fn test_diagonal_drops_copies() {
        let shapes = distribute(
            test_shape("icon", 10.0, 5.0),
            &[Alignment::new("%s", 0.0), Alignment::new("%s-alt", 1.0)],
            "~",
        );
        let arrangement = arrange(Layout::Diagonal, &shapes).unwrap();
        assert_eq!(arrangement.placements.len(), 1);
        assert_eq!((arrangement.width, arrangement.height), (10.0, 5.0));
    }

    #[test]
    fn test_packed_example() {
        let shapes = vec![
            test_shape("a", 100.0, 100.0),
            test_shape("b", 50.0, 50.0),
            test_shape("c", 50.0, 50.0),
        ];
        let arrangement = arrange(Layout::Packed, &shapes).unwrap();
        assert_eq!((arrangement.width, arrangement.height), (150.0, 100.0));
        let positions: Vec<_> = arrangement.placements.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(positions, vec![(0.0, 0.0), (100.0, 0.0), (100.0, 50.0)]);
    }

    #[test]
    fn test_packed_sorts_by_size() {
        let shapes = vec![test_shape("small", 10.0, 10.0), test_shape("big", 40.0, 20.0)];
        let arrangement = arrange(Layout::Packed, &shapes).unwrap();
        // `big` is placed first, at the origin
        let big = arrangement.placement_of(1).unwrap();
        assert_eq!((big.x, big.y), (0.0, 0.0));
        assert_eq!(arrangement.placements[0].index, 0);
    }
}
