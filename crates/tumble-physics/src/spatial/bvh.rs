//! Bounding volume hierarchy built by recursive median split.

use tumble_core::{Ray, Rect};

use super::Collider;

#[derive(Debug, Clone)]
enum BvhNode<T> {
    Leaf { bounds: Rect, item: T },
    Branch {
        bounds: Rect,
        left: usize,
        right: usize,
    },
}

impl<T> BvhNode<T> {
    fn bounds(&self) -> Rect {
        match self {
            BvhNode::Leaf { bounds, .. } | BvhNode::Branch { bounds, .. } => *bounds,
        }
    }
}

/// Binary BVH stored in a flat node arena
#[derive(Debug, Clone)]
pub struct Bvh<T = Collider> {
    nodes: Vec<BvhNode<T>>,
    root: Option<usize>,
}

impl<T: Copy> Bvh<T> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Bounds of everything in the tree
    pub fn bounds(&self) -> Option<Rect> {
        self.root.map(|root| self.nodes[root].bounds())
    }

    /// Rebuild from a snapshot of `(bounds, item)` pairs
    pub fn build(&mut self, mut objects: Vec<(Rect, T)>) {
        self.clear();
        if objects.is_empty() {
            return;
        }
        self.nodes.reserve(objects.len() * 2 - 1);
        self.root = Some(self.build_recursive(&mut objects));
    }

    fn build_recursive(&mut self, objects: &mut [(Rect, T)]) -> usize {
        if let [(bounds, item)] = objects {
            self.nodes.push(BvhNode::Leaf {
                bounds: *bounds,
                item: *item,
            });
            return self.nodes.len() - 1;
        }

        let bounds = objects
            .iter()
            .map(|(bounds, _)| *bounds)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default();

        // Median split on min-x or min-y, whichever axis spans further
        let mid = objects.len() / 2;
        if bounds.w > bounds.h {
            objects.select_nth_unstable_by(mid, |a, b| a.0.x.total_cmp(&b.0.x));
        } else {
            objects.select_nth_unstable_by(mid, |a, b| a.0.y.total_cmp(&b.0.y));
        }

        let (lower, upper) = objects.split_at_mut(mid);
        let left = self.build_recursive(lower);
        let right = self.build_recursive(upper);
        self.nodes.push(BvhNode::Branch {
            bounds,
            left,
            right,
        });
        self.nodes.len() - 1
    }

    /// Items whose bounds overlap `area`
    pub fn query(&self, area: &Rect) -> Vec<T> {
        let mut found = Vec::new();
        let mut stack: Vec<usize> = self.root.into_iter().collect();

        while let Some(index) = stack.pop() {
            match &self.nodes[index] {
                BvhNode::Leaf { bounds, item } => {
                    if bounds.overlaps(area) {
                        found.push(*item);
                    }
                }
                BvhNode::Branch { bounds, left, right } => {
                    if bounds.overlaps(area) {
                        stack.push(*right);
                        stack.push(*left);
                    }
                }
            }
        }

        found
    }

    /// Nearest item whose bounds the ray enters within `max_distance`, with
    /// the entry distance
    pub fn raycast(&self, ray: &Ray, max_distance: f32) -> Option<(T, f32)> {
        let mut best: Option<(T, f32)> = None;
        let mut stack: Vec<usize> = self.root.into_iter().collect();

        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            let Some((t_enter, _)) = ray.intersect_rect(&node.bounds()) else {
                continue;
            };
            let limit = best.map_or(max_distance, |(_, t)| t);
            if t_enter > limit {
                continue;
            }

            match node {
                BvhNode::Leaf { item, .. } => best = Some((*item, t_enter)),
                BvhNode::Branch { left, right, .. } => {
                    stack.push(*right);
                    stack.push(*left);
                }
            }
        }

        best
    }
}

impl<T: Copy> Default for Bvh<T> {
    fn default() -> Self {
        Self::new()
    }
}
