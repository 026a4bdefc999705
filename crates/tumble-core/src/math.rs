//! Math utilities
//!
//! Re-exports from glam and the 2-D primitives used for collision detection.
//!
//! Rect overlap is strict: rects that only touch along an edge do not
//! intersect, and a rect with non-positive width or height never intersects
//! anything. Circle tests are inclusive (`d² <= r²`). None of the predicates
//! allocate or panic on degenerate input.

pub use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle stored as top-left corner plus size
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Create a rect from min and max corners
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    /// Create a rect from center and half-extents
    pub fn from_center_half_extents(center: Vec2, half_extents: Vec2) -> Self {
        Self::from_min_max(center - half_extents, center + half_extents)
    }

    /// Bounding square of a circle
    pub fn from_circle(circle: &Circle) -> Self {
        Self::from_center_half_extents(circle.center, Vec2::splat(circle.radius))
    }

    /// Bounds of a point cloud; `None` when empty
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self::from_min_max(min, max))
    }

    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new(self.right(), self.bottom())
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Get the center of the rect
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.w, self.h)
    }

    pub fn area(&self) -> f32 {
        self.w * self.h
    }

    /// A rect without positive area (NaN extents count as empty)
    pub fn is_empty(&self) -> bool {
        !(self.w > 0.0 && self.h > 0.0)
    }

    /// Corners clockwise from the top-left
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.x, self.y),
            Vec2::new(self.right(), self.y),
            Vec2::new(self.right(), self.bottom()),
            Vec2::new(self.x, self.bottom()),
        ]
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.w, self.h)
    }

    /// Grow every side by `margin`
    pub fn expanded(&self, margin: f32) -> Self {
        Self::new(
            self.x - margin,
            self.y - margin,
            self.w + margin * 2.0,
            self.h + margin * 2.0,
        )
    }

    /// Check if a point lies inside (min inclusive, max exclusive)
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Strict overlap test
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Closed-interval overlap: touching edges and zero-sized rects count.
    ///
    /// Used for tree traversal, where a degenerate collider must still be
    /// reachable.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x <= other.right()
            && other.x <= self.right()
            && self.y <= other.bottom()
            && other.y <= self.bottom()
    }

    pub fn intersects_circle(&self, circle: &Circle) -> bool {
        circle.intersects_rect(self)
    }

    /// Overlapping region of two intersecting rects
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        Some(Rect::from_min_max(
            self.min().max(other.min()),
            self.max().min(other.max()),
        ))
    }

    /// Smallest rect containing both
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_min_max(self.min().min(other.min()), self.max().max(other.max()))
    }

    /// Closest point of the rect to `point`. Never panics on inverted rects.
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            point.x.max(self.x).min(self.right()),
            point.y.max(self.y).min(self.bottom()),
        )
    }
}

/// Circle given by center and radius
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self {
            center: Vec2::new(x, y),
            radius,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_circle(self)
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            center: self.center + offset,
            radius: self.radius,
        }
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        self.center.distance_squared(point) <= self.radius * self.radius
    }

    /// Check if this circle intersects another
    pub fn intersects(&self, other: &Circle) -> bool {
        let radii = self.radius + other.radius;
        self.center.distance_squared(other.center) <= radii * radii
    }

    /// Closest-point test against a rect
    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        self.contains_point(rect.closest_point(self.center))
    }
}

/// Convex quadrilateral given by its corners in winding order
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OrientedBox {
    pub corners: [Vec2; 4],
}

impl OrientedBox {
    pub fn new(corners: [Vec2; 4]) -> Self {
        Self { corners }
    }

    /// Axis-aligned box with the rect's corners
    pub fn from_rect(rect: &Rect) -> Self {
        Self::new(rect.corners())
    }

    pub fn center(&self) -> Vec2 {
        self.corners.iter().copied().sum::<Vec2>() * 0.25
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_points(self.corners).unwrap_or_default()
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self::new(self.corners.map(|c| c + offset))
    }

    /// Rotate about `pivot` by a precomputed `(sin, cos)` pair
    pub fn rotated_about(&self, pivot: Vec2, sin: f32, cos: f32) -> Self {
        Self::new(self.corners.map(|c| rotate_about(c, pivot, sin, cos)))
    }

    /// Edge normals of the two distinct edge directions (not normalized)
    pub fn axes(&self) -> [Vec2; 2] {
        [
            (self.corners[1] - self.corners[0]).perp(),
            (self.corners[2] - self.corners[1]).perp(),
        ]
    }

    /// Projection interval of the corners onto `axis`
    pub fn project(&self, axis: Vec2) -> (f32, f32) {
        self.corners
            .iter()
            .map(|c| c.dot(axis))
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), d| {
                (lo.min(d), hi.max(d))
            })
    }

    /// Separating-axis test, preceded by a cheap bounds rejection
    pub fn intersects(&self, other: &OrientedBox) -> bool {
        if !self.bounds().overlaps(&other.bounds()) {
            return false;
        }

        self.axes()
            .into_iter()
            .chain(other.axes())
            .filter(|axis| axis.length_squared() > 0.0)
            .all(|axis| {
                let (min_a, max_a) = self.project(axis);
                let (min_b, max_b) = other.project(axis);
                max_a >= min_b && max_b >= min_a
            })
    }
}

/// Arbitrary polygon; collision uses its bounds only
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polygon {
    pub vertices: Vec<Vec2>,
}

impl Polygon {
    pub fn new(vertices: Vec<Vec2>) -> Self {
        Self { vertices }
    }

    /// Vertex bounds; an empty polygon has empty bounds at the origin
    pub fn bounds(&self) -> Rect {
        Rect::from_points(self.vertices.iter().copied()).unwrap_or_default()
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self::new(self.vertices.iter().map(|v| *v + offset).collect())
    }

    pub fn rotated_about(&self, pivot: Vec2, sin: f32, cos: f32) -> Self {
        Self::new(
            self.vertices
                .iter()
                .map(|v| rotate_about(*v, pivot, sin, cos))
                .collect(),
        )
    }

    pub fn intersects(&self, other: &Polygon) -> bool {
        self.bounds().intersects(&other.bounds())
    }

    pub fn intersects_circle(&self, circle: &Circle) -> bool {
        circle.intersects_rect(&self.bounds())
    }
}

/// Segment swept by a radius
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Capsule {
    pub start: Vec2,
    pub end: Vec2,
    pub radius: f32,
}

impl Capsule {
    pub fn new(start: Vec2, end: Vec2, radius: f32) -> Self {
        Self { start, end, radius }
    }

    pub fn center(&self) -> Vec2 {
        (self.start + self.end) * 0.5
    }

    pub fn bounds(&self) -> Rect {
        let r = Vec2::splat(self.radius);
        Rect::from_min_max(self.start.min(self.end) - r, self.start.max(self.end) + r)
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self::new(self.start + offset, self.end + offset, self.radius)
    }

    pub fn rotated_about(&self, pivot: Vec2, sin: f32, cos: f32) -> Self {
        Self::new(
            rotate_about(self.start, pivot, sin, cos),
            rotate_about(self.end, pivot, sin, cos),
            self.radius,
        )
    }

    pub fn intersects_circle(&self, circle: &Circle) -> bool {
        point_segment_distance(circle.center, self.start, self.end) <= self.radius + circle.radius
    }
}

/// Distance from `point` to the segment `a..b`
pub fn point_segment_distance(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}

/// Rotate `point` about `pivot` by a precomputed `(sin, cos)` pair
pub fn rotate_about(point: Vec2, pivot: Vec2, sin: f32, cos: f32) -> Vec2 {
    let d = point - pivot;
    pivot + Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
}

/// Move `value` toward `target` by at most `max_delta`, never overshooting
pub fn approach(value: f32, target: f32, max_delta: f32) -> f32 {
    if value > target {
        (value - max_delta).max(target)
    } else {
        (value + max_delta).min(target)
    }
}

/// A ray for spatial queries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Ray origin
    pub origin: Vec2,
    /// Ray direction (normalized, zero for a degenerate ray)
    pub direction: Vec2,
}

impl Ray {
    /// Create a new ray
    pub fn new(origin: Vec2, direction: Vec2) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn at(&self, t: f32) -> Vec2 {
        self.origin + self.direction * t
    }

    /// Slab test against a rect, returns (t_enter, t_exit) if hit
    pub fn intersect_rect(&self, rect: &Rect) -> Option<(f32, f32)> {
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;

        for (origin, dir, lo, hi) in [
            (self.origin.x, self.direction.x, rect.x, rect.right()),
            (self.origin.y, self.direction.y, rect.y, rect.bottom()),
        ] {
            if dir == 0.0 {
                if origin < lo || origin > hi {
                    return None;
                }
                continue;
            }
            let t1 = (lo - origin) / dir;
            let t2 = (hi - origin) / dir;
            t_enter = t_enter.max(t1.min(t2));
            t_exit = t_exit.min(t1.max(t2));
        }

        if t_enter <= t_exit && t_exit >= 0.0 {
            Some((t_enter.max(0.0), t_exit))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rect_creation() {
        let rect = Rect::from_min_max(Vec2::ZERO, Vec2::new(4.0, 2.0));
        assert_eq!(rect.center(), Vec2::new(2.0, 1.0));
        assert_eq!(rect.size(), Vec2::new(4.0, 2.0));
        assert_eq!(rect.max(), Vec2::new(4.0, 2.0));
    }

    #[test]
    fn test_rect_contains_point() {
        let rect = Rect::new(0.0, 0.0, 1.0, 1.0);
        assert!(rect.contains_point(Vec2::splat(0.5)));
        assert!(!rect.contains_point(Vec2::splat(2.0)));
    }

    #[test]
    fn test_rect_intersection() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        let c = Rect::new(20.0, 0.0, 5.0, 5.0);

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert_eq!(a.intersection(&b), Some(Rect::new(5.0, 5.0, 5.0, 5.0)));
        assert_eq!(a.intersection(&c), None);
    }

    #[test]
    fn test_rect_touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(a.overlaps(&b));
    }

    #[test]
    fn test_degenerate_rect_never_intersects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&Rect::new(5.0, 5.0, 0.0, 3.0)));
        assert!(!a.intersects(&Rect::new(5.0, 5.0, 3.0, -1.0)));
        assert!(!Rect::new(1.0, 1.0, f32::NAN, 1.0).intersects(&a));
    }

    #[test]
    fn test_rect_union() {
        let a = Rect::new(0.0, 0.0, 2.0, 2.0);
        let b = Rect::new(5.0, -1.0, 1.0, 1.0);
        assert_eq!(a.union(&b), Rect::new(0.0, -1.0, 6.0, 3.0));
    }

    #[test]
    fn test_circle_intersection() {
        let a = Circle::new(0.0, 0.0, 1.0);
        let b = Circle::new(1.5, 0.0, 1.0);
        let c = Circle::new(5.0, 0.0, 1.0);

        assert!(a.intersects(&a));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_circle_rect() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(Circle::new(12.0, 5.0, 3.0).intersects_rect(&rect));
        assert!(!Circle::new(14.0, 14.0, 3.0).intersects_rect(&rect));
        // Center inside
        assert!(Circle::new(5.0, 5.0, 0.5).intersects_rect(&rect));
        // Inverted rect must not panic
        let _ = Circle::new(0.0, 0.0, 1.0).intersects_rect(&Rect::new(5.0, 5.0, -10.0, -10.0));
    }

    #[test]
    fn test_oriented_box_sat() {
        let a = OrientedBox::from_rect(&Rect::new(0.0, 0.0, 10.0, 10.0));
        let (sin, cos) = 45f32.to_radians().sin_cos();
        // Diamond whose bounds overlap `a` while its edges stay clear
        let b = OrientedBox::from_rect(&Rect::new(10.5, 10.5, 6.0, 6.0)).rotated_about(
            Vec2::new(13.5, 13.5),
            sin,
            cos,
        );
        assert!(a.bounds().overlaps(&b.bounds()));
        assert!(!a.intersects(&b));

        let c = OrientedBox::from_rect(&Rect::new(8.0, 8.0, 6.0, 6.0)).rotated_about(
            Vec2::new(11.0, 11.0),
            sin,
            cos,
        );
        assert!(a.intersects(&c));
    }

    #[test]
    fn test_oriented_box_degenerate_axes() {
        let flat = OrientedBox::from_rect(&Rect::new(0.0, 0.0, 0.0, 0.0));
        let a = OrientedBox::from_rect(&Rect::new(-1.0, -1.0, 2.0, 2.0));
        assert!(flat.intersects(&a));
    }

    #[test]
    fn test_polygon_and_capsule() {
        let empty = Polygon::default();
        assert!(empty.bounds().is_empty());
        assert!(
            !empty.intersects(&Polygon::new(vec![Vec2::ZERO, Vec2::ONE]))
        );

        let tri = Polygon::new(vec![Vec2::ZERO, Vec2::new(4.0, 0.0), Vec2::new(0.0, 4.0)]);
        assert_eq!(tri.bounds(), Rect::new(0.0, 0.0, 4.0, 4.0));
        assert!(tri.intersects_circle(&Circle::new(5.0, 2.0, 1.5)));

        let capsule = Capsule::new(Vec2::ZERO, Vec2::new(10.0, 0.0), 1.0);
        assert_eq!(capsule.bounds(), Rect::new(-1.0, -1.0, 12.0, 2.0));
        assert!(capsule.intersects_circle(&Circle::new(5.0, 2.5, 2.0)));
        assert!(!capsule.intersects_circle(&Circle::new(5.0, 4.0, 2.0)));

        let point = Capsule::new(Vec2::ONE, Vec2::ONE, 0.0);
        assert!(point.intersects_circle(&Circle::new(1.0, 2.0, 1.0)));
    }

    #[test]
    fn test_point_segment_distance() {
        let a = Vec2::ZERO;
        let b = Vec2::new(10.0, 0.0);
        let distance = point_segment_distance;
        assert!((distance(Vec2::new(5.0, 3.0), a, b) - 3.0).abs() < 0.0001);
        assert!((distance(Vec2::new(-4.0, 3.0), a, b) - 5.0).abs() < 0.0001);
        // Degenerate segment
        assert!((distance(Vec2::new(3.0, 4.0), a, a) - 5.0).abs() < 0.0001);
    }

    #[test]
    fn test_rotate_about() {
        let (sin, cos) = 90f32.to_radians().sin_cos();
        let p = rotate_about(Vec2::new(2.0, 1.0), Vec2::new(1.0, 1.0), sin, cos);
        assert!((p - Vec2::new(1.0, 2.0)).length() < 0.0001);
    }

    #[test]
    fn test_approach() {
        assert_eq!(approach(5.0, 0.0, 2.0), 3.0);
        assert_eq!(approach(1.0, 0.0, 2.0), 0.0);
        assert_eq!(approach(-1.0, 0.0, 0.5), -0.5);
    }

    #[test]
    fn test_ray_rect_intersection() {
        let ray = Ray::new(Vec2::new(-5.0, 0.5), Vec2::X);
        let rect = Rect::new(0.0, 0.0, 1.0, 1.0);

        let (t_min, t_max) = ray.intersect_rect(&rect).expect("ray should hit");
        assert!((ray.at(t_min).x - 0.0).abs() < 0.001);
        assert!((t_max - 6.0).abs() < 0.001);

        let miss = Ray::new(Vec2::new(-5.0, 3.0), Vec2::X);
        assert!(miss.intersect_rect(&rect).is_none());

        let behind = Ray::new(Vec2::new(5.0, 0.5), Vec2::X);
        assert!(behind.intersect_rect(&rect).is_none());
    }

    fn rect_strategy() -> impl Strategy<Value = Rect> {
        (-100.0f32..100.0, -100.0f32..100.0, 0.0f32..50.0, 0.0f32..50.0)
            .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
    }

    fn circle_strategy() -> impl Strategy<Value = Circle> {
        (-100.0f32..100.0, -100.0f32..100.0, 0.0f32..30.0)
            .prop_map(|(x, y, r)| Circle::new(x, y, r))
    }

    proptest! {
        #[test]
        fn prop_rect_intersection_is_symmetric(a in rect_strategy(), b in rect_strategy()) {
            prop_assert_eq!(a.intersects(&b), b.intersects(&a));
        }

        #[test]
        fn prop_circle_intersection_is_symmetric(a in circle_strategy(), b in circle_strategy()) {
            prop_assert_eq!(a.intersects(&b), b.intersects(&a));
            prop_assert!(a.intersects(&a));
        }

        #[test]
        fn prop_rect_circle_is_symmetric(r in rect_strategy(), c in circle_strategy()) {
            prop_assert_eq!(r.intersects_circle(&c), c.intersects_rect(&r));
        }

        #[test]
        fn prop_distant_circles_never_collide(a in circle_strategy(), gap in 0.01f32..100.0) {
            let b = Circle::new(a.center.x + a.radius + gap + 5.0, a.center.y, 5.0);
            prop_assert!(!a.intersects(&b));
        }
    }
}
