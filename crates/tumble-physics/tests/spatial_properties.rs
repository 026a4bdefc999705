//! Spatial structures cross-checked against brute force.

use proptest::prelude::*;
use tumble_core::Rect;
use tumble_physics::{Bvh, QuadTree, SpatialHashGrid, SweepAndPrune};

fn rect() -> impl Strategy<Value = Rect> {
    (0.0f32..200.0, 0.0f32..200.0, 1.0f32..40.0, 1.0f32..40.0)
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

fn objects() -> impl Strategy<Value = Vec<(Rect, usize)>> {
    prop::collection::vec(rect(), 0..40).prop_map(|rects| {
        rects
            .into_iter()
            .enumerate()
            .map(|(i, r)| (r, i))
            .collect()
    })
}

fn overlapping(objects: &[(Rect, usize)], area: &Rect) -> Vec<usize> {
    objects
        .iter()
        .filter(|(bounds, _)| bounds.overlaps(area))
        .map(|(_, item)| *item)
        .collect()
}

fn sorted(mut items: Vec<usize>) -> Vec<usize> {
    items.sort_unstable();
    items
}

proptest! {
    #[test]
    fn test_sweep_matches_brute_force(objects in objects()) {
        let mut expected = Vec::new();
        for (i, (a, _)) in objects.iter().enumerate() {
            for (j, (b, _)) in objects.iter().enumerate().skip(i + 1) {
                if a.intersects(b) {
                    expected.push((i, j));
                }
            }
        }

        let mut pairs: Vec<(usize, usize)> = SweepAndPrune::find_pairs(&objects)
            .into_iter()
            .map(|(a, b)| (a.min(b), a.max(b)))
            .collect();
        pairs.sort_unstable();

        prop_assert_eq!(pairs, expected);
    }

    #[test]
    fn test_grid_query_complete_and_unique(
        objects in objects(),
        area in rect(),
        cell in 8.0f32..64.0,
    ) {
        let mut grid = SpatialHashGrid::new(cell);
        for (bounds, item) in &objects {
            grid.insert(*item, bounds);
        }

        let found = grid.query(&area);
        let unique = sorted(found.clone());
        prop_assert!(unique.windows(2).all(|w| w[0] != w[1]));
        for item in overlapping(&objects, &area) {
            prop_assert!(found.contains(&item), "missing {}", item);
        }
    }

    #[test]
    fn test_quadtree_query_exact(objects in objects(), area in rect()) {
        let mut tree = QuadTree::new(Rect::new(0.0, 0.0, 256.0, 256.0));
        for (bounds, item) in &objects {
            tree.insert(*item, bounds);
        }

        prop_assert_eq!(sorted(tree.query(&area)), overlapping(&objects, &area));
    }

    #[test]
    fn test_bvh_query_exact(objects in objects(), area in rect()) {
        let mut bvh = Bvh::new();
        bvh.build(objects.clone());

        prop_assert_eq!(sorted(bvh.query(&area)), overlapping(&objects, &area));
    }
}
