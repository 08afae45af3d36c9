//! Growing binary-tree bin packer.
//!
//! Blocks are placed into a tree of free rectangles. Placing a block marks a
//! node as used and splits its remainder into a `down` node (below the block,
//! full node width) and a `right` node (beside the block, block height). When
//! no free node fits, the root grows to the right or downwards, whichever
//! keeps the canvas closer to square.
//!
//! ```text
//!  +--------+-------+
//!  | block  | right |
//!  +--------+-------+
//!  |      down      |
//!  +----------------+
//! ```
//!
//! Nodes live in an arena and refer to each other through indices, so the
//! whole tree is dropped at once when packing is done.

use crate::error::{Result, SpriteError};

type NodeId = usize;

#[derive(Debug, Clone, Copy)]
struct Node {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    used: bool,
    down: Option<NodeId>,
    right: Option<NodeId>,
}

impl Node {
    fn free(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            used: false,
            down: None,
            right: None,
        }
    }
}

/// Result of packing: one position per block plus the canvas size.
#[derive(Debug, Clone, PartialEq)]
pub struct Packing {
    pub width: f64,
    pub height: f64,
    pub positions: Vec<(f64, f64)>,
}

#[derive(Debug, Default)]
pub struct Packer {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Packer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pack blocks in the given order.
    ///
    /// Callers should sort blocks by decreasing size first; growth can fail
    /// for blocks larger than the canvas in both directions otherwise.
    pub fn pack(mut self, blocks: &[(f64, f64)]) -> Result<Packing> {
        let Some(&(first_width, first_height)) = blocks.first() else {
            return Ok(Packing {
                width: 0.0,
                height: 0.0,
                positions: Vec::new(),
            });
        };

        self.nodes.clear();
        self.root = self.alloc(Node::free(0.0, 0.0, first_width, first_height));

        let mut positions = Vec::with_capacity(blocks.len());
        for &(width, height) in blocks {
            let id = match self.find(self.root, width, height) {
                Some(id) => self.split(id, width, height),
                None => self.grow(width, height)?,
            };
            let node = self.nodes[id];
            positions.push((node.x, node.y));
        }

        let root = self.nodes[self.root];
        Ok(Packing {
            width: root.width,
            height: root.height,
            positions,
        })
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// First free node (right before down) that can hold the block.
    fn find(&self, id: NodeId, width: f64, height: f64) -> Option<NodeId> {
        let node = &self.nodes[id];
        if node.used {
            node.right
                .and_then(|right| self.find(right, width, height))
                .or_else(|| node.down.and_then(|down| self.find(down, width, height)))
        } else if width <= node.width && height <= node.height {
            Some(id)
        } else {
            None
        }
    }

    fn split(&mut self, id: NodeId, width: f64, height: f64) -> NodeId {
        let node = self.nodes[id];
        let down = self.alloc(Node::free(
            node.x,
            node.y + height,
            node.width,
            node.height - height,
        ));
        let right = self.alloc(Node::free(
            node.x + width,
            node.y,
            node.width - width,
            height,
        ));

        let node = &mut self.nodes[id];
        node.used = true;
        node.down = Some(down);
        node.right = Some(right);
        id
    }

    fn grow(&mut self, width: f64, height: f64) -> Result<NodeId> {
        let root = self.nodes[self.root];

        let can_grow_down = width <= root.width;
        let can_grow_right = height <= root.height;

        // Keep the canvas roughly square
        let should_grow_right = can_grow_right && root.height >= root.width + width;
        let should_grow_down = can_grow_down && root.width >= root.height + height;

        if should_grow_right {
            self.grow_right(width, height)
        } else if should_grow_down {
            self.grow_down(width, height)
        } else if can_grow_right {
            self.grow_right(width, height)
        } else if can_grow_down {
            self.grow_down(width, height)
        } else {
            Err(SpriteError::Layout(format!(
                "cannot place {width}x{height} block next to a {}x{} canvas",
                root.width, root.height
            )))
        }
    }

    fn grow_right(&mut self, width: f64, height: f64) -> Result<NodeId> {
        let old = self.nodes[self.root];
        let right = self.alloc(Node::free(old.width, 0.0, width, old.height));
        let root = self.alloc(Node {
            x: 0.0,
            y: 0.0,
            width: old.width + width,
            height: old.height,
            used: true,
            down: Some(self.root),
            right: Some(right),
        });
        self.root = root;
        self.place_after_growth(width, height)
    }

    fn grow_down(&mut self, width: f64, height: f64) -> Result<NodeId> {
        let old = self.nodes[self.root];
        let down = self.alloc(Node::free(0.0, old.height, old.width, height));
        let root = self.alloc(Node {
            x: 0.0,
            y: 0.0,
            width: old.width,
            height: old.height + height,
            used: true,
            down: Some(down),
            right: Some(self.root),
        });
        self.root = root;
        self.place_after_growth(width, height)
    }

    fn place_after_growth(&mut self, width: f64, height: f64) -> Result<NodeId> {
        match self.find(self.root, width, height) {
            Some(id) => Ok(self.split(id, width, height)),
            None => Err(SpriteError::Layout(format!(
                "no room for {width}x{height} block after growing the canvas"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlaps(a: (f64, f64, f64, f64), b: (f64, f64, f64, f64)) -> bool {
        a.0 < b.0 + b.2 && b.0 < a.0 + a.2 && a.1 < b.1 + b.3 && b.1 < a.1 + a.3
    }

    /// Deterministic pseudo-random sizes (xorshift).
    fn random_blocks(seed: u64, count: usize) -> Vec<(f64, f64)> {
        let mut state = seed;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state % 120 + 1) as f64
        };
        let mut blocks: Vec<(f64, f64)> = (0..count).map(|_| (next(), next())).collect();
        blocks.sort_by(|a, b| b.0.max(b.1).total_cmp(&a.0.max(a.1)));
        blocks
    }

    #[test]
    fn test_example_layout() {
        let packing = Packer::new()
            .pack(&[(100.0, 100.0), (50.0, 50.0), (50.0, 50.0)])
            .unwrap();
        assert_eq!(packing.positions, vec![(0.0, 0.0), (100.0, 0.0), (100.0, 50.0)]);
        assert_eq!((packing.width, packing.height), (150.0, 100.0));
    }

    #[test]
    fn test_empty() {
        let packing = Packer::new().pack(&[]).unwrap();
        assert_eq!((packing.width, packing.height), (0.0, 0.0));
        assert!(packing.positions.is_empty());
    }

    #[test]
    fn test_single_block() {
        let packing = Packer::new().pack(&[(30.0, 20.0)]).unwrap();
        assert_eq!(packing.positions, vec![(0.0, 0.0)]);
        assert_eq!((packing.width, packing.height), (30.0, 20.0));
    }

    #[test]
    fn test_no_overlap_and_containment() {
        for seed in [1_u64, 7, 42, 1234, 99_991] {
            let blocks = random_blocks(seed, 40);
            let packing = Packer::new().pack(&blocks).unwrap();

            let rects: Vec<_> = blocks
                .iter()
                .zip(&packing.positions)
                .map(|(&(w, h), &(x, y))| (x, y, w, h))
                .collect();

            for (i, a) in rects.iter().enumerate() {
                assert!(a.0 >= 0.0 && a.1 >= 0.0, "seed {seed}: negative position");
                assert!(a.0 + a.2 <= packing.width, "seed {seed}: exceeds width");
                assert!(a.1 + a.3 <= packing.height, "seed {seed}: exceeds height");
                for b in &rects[i + 1..] {
                    assert!(!overlaps(*a, *b), "seed {seed}: {a:?} overlaps {b:?}");
                }
            }
        }
    }

    #[test]
    fn test_oversized_unsorted_block_fails() {
        let err = Packer::new()
            .pack(&[(10.0, 10.0), (20.0, 20.0)])
            .unwrap_err();
        assert!(matches!(err, SpriteError::Layout(_)));
    }
}
