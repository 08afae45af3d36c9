//! Shape collection.
//!
//! Processed shapes (canonical shapes and their distributed copies) are
//! appended here by the queue's coordinating thread. Completion order is not
//! submission order, so the collection is sorted before any layout runs.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::shape::Shape;

/// Comparator deciding the order of shapes in every sprite.
pub type Sorter = Arc<dyn Fn(&Shape, &Shape) -> Ordering + Send + Sync>;

/// Default order: lexicographic by id.
pub fn by_id(a: &Shape, b: &Shape) -> Ordering {
    a.id().cmp(b.id())
}

#[derive(Debug, Clone, Default)]
pub struct ShapeCollection {
    shapes: Vec<Shape>,
}

impl ShapeCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.shapes.iter().any(|shape| shape.id() == id)
    }

    pub fn get(&self, id: &str) -> Option<&Shape> {
        self.shapes.iter().find(|shape| shape.id() == id)
    }

    /// Stable sort with the given comparator (or [`by_id`]).
    pub fn sort(&mut self, sorter: Option<&Sorter>) {
        match sorter {
            Some(sorter) => self.shapes.sort_by(|a, b| sorter(a, b)),
            None => self.shapes.sort_by(by_id),
        }
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter()
    }

    /// Canonical shapes only.
    pub fn masters(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter().filter(|shape| shape.is_master())
    }

    /// The canonical shape of a distributed copy (`None` for canonical shapes).
    pub fn master_of(&self, shape: &Shape) -> Option<&Shape> {
        let master = shape.master()?;
        self.masters().find(|candidate| candidate.id() == master)
    }

    /// The shape whose geometry applies to `shape`: its master, or itself.
    pub fn resolve<'a>(&'a self, shape: &'a Shape) -> &'a Shape {
        self.master_of(shape).unwrap_or(shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Alignment, distribute, test_shape};

    #[test]
    fn test_default_sort_is_by_id() {
        let mut collection = ShapeCollection::new();
        for id in ["c", "a", "b"] {
            collection.push(test_shape(id, 1.0, 1.0));
        }
        collection.sort(None);
        let ids: Vec<_> = collection.iter().map(Shape::id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_custom_sorter() {
        let mut collection = ShapeCollection::new();
        collection.push(test_shape("small", 1.0, 1.0));
        collection.push(test_shape("large", 9.0, 9.0));
        let by_width: Sorter = Arc::new(|a: &Shape, b: &Shape| a.width().total_cmp(&b.width()));
        collection.sort(Some(&by_width));
        assert_eq!(collection.shapes()[0].id(), "small");
    }

    #[test]
    fn test_master_lookup() {
        let mut collection = ShapeCollection::new();
        for shape in distribute(
            test_shape("icon", 4.0, 2.0),
            &[Alignment::new("%s", 0.0), Alignment::new("%s-end", 1.0)],
            "~",
        ) {
            collection.push(shape);
        }

        let copy = collection.get("icon-end").unwrap();
        let master = collection.master_of(copy).unwrap();
        assert_eq!(master.id(), "icon");
        assert_eq!(collection.resolve(copy).width(), 4.0);

        let canonical = collection.get("icon").unwrap();
        assert!(collection.master_of(canonical).is_none());
        assert_eq!(collection.resolve(canonical).id(), "icon");
        assert_eq!(collection.masters().count(), 1);
    }
}
