//! Region quadtree over axis-aligned bounds.
//!
//! An object overlapping several quadrants is stored in each of them;
//! queries de-duplicate.

use std::hash::Hash;

use ahash::AHashSet;
use smallvec::SmallVec;
use tumble_core::Rect;

use super::Collider;
use crate::constants::{QUADTREE_MAX_DEPTH, QUADTREE_MAX_OBJECTS};

#[derive(Debug, Clone)]
pub struct QuadTree<T = Collider> {
    bounds: Rect,
    depth: u32,
    max_depth: u32,
    max_objects: usize,
    objects: SmallVec<[(Rect, T); 4]>,
    children: Option<Box<[QuadTree<T>; 4]>>,
}

impl<T: Copy + Eq + Hash> QuadTree<T> {
    pub fn new(bounds: Rect) -> Self {
        Self::with_limits(bounds, QUADTREE_MAX_DEPTH, QUADTREE_MAX_OBJECTS)
    }

    pub fn with_limits(bounds: Rect, max_depth: u32, max_objects: usize) -> Self {
        Self::node(bounds, 0, max_depth, max_objects)
    }

    fn node(bounds: Rect, depth: u32, max_depth: u32, max_objects: usize) -> Self {
        Self {
            bounds,
            depth,
            max_depth,
            max_objects,
            objects: SmallVec::new(),
            children: None,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn is_subdivided(&self) -> bool {
        self.children.is_some()
    }

    /// Stored entries across all nodes, counting multi-node objects once per node
    pub fn entry_count(&self) -> usize {
        self.objects.len()
            + self
                .children
                .iter()
                .flat_map(|children| children.iter())
                .map(|child| child.entry_count())
                .sum::<usize>()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
        self.children = None;
    }

    /// Insert an object; objects outside this node's bounds are ignored
    pub fn insert(&mut self, item: T, bounds: &Rect) {
        if !self.bounds.overlaps(bounds) {
            return;
        }

        if let Some(children) = self.children.as_mut() {
            for child in children.iter_mut() {
                child.insert(item, bounds);
            }
            return;
        }

        if self.objects.len() < self.max_objects || self.depth >= self.max_depth {
            self.objects.push((*bounds, item));
            return;
        }

        self.subdivide();
        if let Some(children) = self.children.as_mut() {
            for child in children.iter_mut() {
                child.insert(item, bounds);
            }
        }
    }

    /// Objects whose bounds overlap `area`, each reported once
    pub fn query(&self, area: &Rect) -> Vec<T> {
        let mut seen = AHashSet::new();
        let mut found = Vec::new();
        self.query_into(area, &mut seen, &mut found);
        found
    }

    fn query_into(&self, area: &Rect, seen: &mut AHashSet<T>, found: &mut Vec<T>) {
        if !self.bounds.overlaps(area) {
            return;
        }

        for (bounds, item) in &self.objects {
            if bounds.overlaps(area) && seen.insert(*item) {
                found.push(*item);
            }
        }

        if let Some(children) = &self.children {
            for child in children.iter() {
                child.query_into(area, seen, found);
            }
        }
    }

    /// Split into four quadrants and push the stored objects down
    fn subdivide(&mut self) {
        let Rect { x, y, w, h } = self.bounds;
        let (hw, hh) = (w * 0.5, h * 0.5);
        let depth = self.depth + 1;
        let (max_depth, max_objects) = (self.max_depth, self.max_objects);
        let child = |x, y| Self::node(Rect::new(x, y, hw, hh), depth, max_depth, max_objects);

        let mut children = Box::new([
            child(x, y),
            child(x + hw, y),
            child(x, y + hh),
            child(x + hw, y + hh),
        ]);

        for (bounds, item) in self.objects.drain(..) {
            for node in children.iter_mut() {
                node.insert(item, &bounds);
            }
        }
        self.children = Some(children);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_without_split() {
        let mut tree = QuadTree::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        for i in 0..4_u32 {
            tree.insert(i, &Rect::new(i as f32 * 10.0, 0.0, 5.0, 5.0));
        }
        assert!(!tree.is_subdivided());
        assert_eq!(tree.entry_count(), 4);
    }

    #[test]
    fn test_split_on_overflow() {
        let mut tree = QuadTree::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        for i in 0..5_u32 {
            tree.insert(i, &Rect::new(i as f32 * 10.0 + 1.0, 1.0, 5.0, 5.0));
        }
        assert!(tree.is_subdivided());

        let mut found = tree.query(&Rect::new(0.0, 0.0, 100.0, 100.0));
        found.sort();
        assert_eq!(found, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_spanning_object_reported_once() {
        let mut tree = QuadTree::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        for i in 0..4_u32 {
            tree.insert(i, &Rect::new(i as f32 * 5.0 + 1.0, 1.0, 2.0, 2.0));
        }
        // Straddles all four quadrants after the split
        tree.insert(99, &Rect::new(40.0, 40.0, 20.0, 20.0));

        assert!(tree.entry_count() > 5);
        let found = tree.query(&Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(found.iter().filter(|&&item| item == 99).count(), 1);
        assert_eq!(found.len(), 5);
    }

    #[test]
    fn test_query_filters_by_object_bounds() {
        let mut tree = QuadTree::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        tree.insert(1_u32, &Rect::new(0.0, 0.0, 5.0, 5.0));
        tree.insert(2_u32, &Rect::new(40.0, 40.0, 5.0, 5.0));

        assert_eq!(tree.query(&Rect::new(38.0, 38.0, 4.0, 4.0)), vec![2]);
    }

    #[test]
    fn test_outside_object_ignored() {
        let mut tree = QuadTree::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        tree.insert(1_u32, &Rect::new(500.0, 500.0, 5.0, 5.0));
        assert_eq!(tree.entry_count(), 0);
    }

    #[test]
    fn test_depth_limit_stops_splitting() {
        let mut tree = QuadTree::with_limits(Rect::new(0.0, 0.0, 64.0, 64.0), 2, 1);
        for i in 0..10_u32 {
            tree.insert(i, &Rect::new(1.0, 1.0, 1.0, 1.0));
        }
        assert_eq!(tree.query(&Rect::new(0.0, 0.0, 4.0, 4.0)).len(), 10);
    }
}
