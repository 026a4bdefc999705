//! Sweep-and-prune along the x axis.

use tumble_core::Rect;

/// Broad-phase pair finder
pub struct SweepAndPrune;

impl SweepAndPrune {
    /// All pairs whose bounds strictly overlap.
    ///
    /// Objects are sorted by min-x; each one is compared only with the
    /// following objects that start before it ends.
    pub fn find_pairs<T: Copy>(objects: &[(Rect, T)]) -> Vec<(T, T)> {
        let mut sorted: Vec<&(Rect, T)> = objects.iter().collect();
        sorted.sort_by(|a, b| a.0.x.total_cmp(&b.0.x));

        let mut pairs = Vec::new();
        for (i, (bounds, item)) in sorted.iter().enumerate() {
            for (other_bounds, other) in sorted[i + 1..]
                .iter()
                .take_while(|(candidate, _)| candidate.x <= bounds.right())
            {
                if bounds.intersects(other_bounds) {
                    pairs.push((*item, *other));
                }
            }
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_pairs() {
        let objects = vec![
            (Rect::new(0.0, 0.0, 10.0, 10.0), 'a'),
            (Rect::new(5.0, 5.0, 10.0, 10.0), 'b'),
            (Rect::new(8.0, 50.0, 10.0, 10.0), 'c'),
            (Rect::new(100.0, 0.0, 10.0, 10.0), 'd'),
        ];

        assert_eq!(SweepAndPrune::find_pairs(&objects), vec![('a', 'b')]);
    }

    #[test]
    fn test_touching_is_not_a_pair() {
        let objects = vec![
            (Rect::new(0.0, 0.0, 10.0, 10.0), 1),
            (Rect::new(10.0, 0.0, 10.0, 10.0), 2),
        ];
        assert!(SweepAndPrune::find_pairs(&objects).is_empty());
    }

    #[test]
    fn test_unsorted_input() {
        let objects = vec![
            (Rect::new(50.0, 0.0, 10.0, 10.0), 3),
            (Rect::new(0.0, 0.0, 100.0, 10.0), 1),
            (Rect::new(20.0, 0.0, 5.0, 5.0), 2),
        ];
        let mut pairs: Vec<(i32, i32)> = SweepAndPrune::find_pairs(&objects)
            .into_iter()
            .map(|(a, b)| (a.min(b), a.max(b)))
            .collect();
        pairs.sort();
        assert_eq!(pairs, vec![(1, 2), (1, 3)]);
    }
}
