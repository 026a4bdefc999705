//! Integration helpers and contact snap offsets.
//!
//! A snap offset is the translation that moves the *moving* shape out of the
//! *other* shape. Offsets always fully separate the pair along the chosen
//! axis, so after applying one the strict overlap tests report no contact.

use glam::Vec2;
use tumble_core::math::approach;
use tumble_core::{Circle, OrientedBox, Rect};

/// Integrate accumulated force into velocity, then clear force and
/// acceleration. A non-positive mass ignores the force.
pub fn apply_forces(
    velocity: &mut Vec2,
    acceleration: &mut Vec2,
    force: &mut Vec2,
    mass: f32,
    delta_time: f32,
) {
    if mass > 0.0 {
        *acceleration += *force / mass;
    }
    *velocity += *acceleration * delta_time;
    *force = Vec2::ZERO;
    *acceleration = Vec2::ZERO;
}

/// Linear friction toward zero per axis, then density drag.
pub fn apply_resistance(velocity: &mut Vec2, friction: f32, density: f32, delta_time: f32) {
    if friction > 0.0 {
        let deceleration = friction * delta_time;
        velocity.x = approach(velocity.x, 0.0, deceleration);
        velocity.y = approach(velocity.y, 0.0, deceleration);
    }
    if density > 0.0 {
        *velocity *= (1.0 - density * delta_time).max(0.0);
    }
}

/// Limit speed to `max_speed`, keeping direction
pub fn clamp_velocity(velocity: Vec2, max_speed: f32) -> Vec2 {
    velocity.clamp_length_max(max_speed)
}

/// Zero every component whose magnitude is below `threshold`
pub fn zero_small_components(velocity: Vec2, threshold: f32) -> Vec2 {
    Vec2::new(
        if velocity.x.abs() < threshold { 0.0 } else { velocity.x },
        if velocity.y.abs() < threshold { 0.0 } else { velocity.y },
    )
}

/// Separation of two overlapping rects along the axis of least penetration.
///
/// The push direction opposes `motion` on that axis; without motion it
/// follows the relative position of the centres.
pub fn rect_snap_offset(moving: &Rect, other: &Rect, motion: Vec2) -> Vec2 {
    let Some(overlap) = moving.intersection(other) else {
        return Vec2::ZERO;
    };

    if overlap.w < overlap.h {
        let push_back = push_negative(motion.x, moving.center().x - other.center().x);
        if push_back {
            Vec2::new(other.x - moving.right(), 0.0)
        } else {
            Vec2::new(other.right() - moving.x, 0.0)
        }
    } else {
        let push_back = push_negative(motion.y, moving.center().y - other.center().y);
        if push_back {
            Vec2::new(0.0, other.y - moving.bottom())
        } else {
            Vec2::new(0.0, other.bottom() - moving.y)
        }
    }
}

/// Separation of two overlapping circles along the line of centres.
///
/// Concentric circles are pushed back along the dominant axis of `motion`.
pub fn circle_snap_offset(moving: &Circle, other: &Circle, motion: Vec2) -> Vec2 {
    let delta = moving.center - other.center;
    let distance = delta.length();
    let overlap = moving.radius + other.radius - distance;
    if overlap <= 0.0 {
        return Vec2::ZERO;
    }

    if distance > 0.0 {
        return delta / distance * overlap;
    }

    if motion.x.abs() > motion.y.abs() {
        Vec2::new(if motion.x > 0.0 { -overlap } else { overlap }, 0.0)
    } else {
        Vec2::new(0.0, if motion.y > 0.0 { -overlap } else { overlap })
    }
}

/// Separation of a moving circle from a rect.
///
/// A centre inside the rect exits through the nearest edge.
pub fn circle_rect_snap_offset(moving: &Circle, other: &Rect) -> Vec2 {
    let center = moving.center;
    let radius = moving.radius;
    let closest = other.closest_point(center);
    let delta = center - closest;
    let distance = delta.length();

    if distance > 0.0 {
        let overlap = radius - distance;
        if overlap <= 0.0 {
            return Vec2::ZERO;
        }
        return delta / distance * overlap;
    }

    let left = center.x - other.x;
    let right = other.right() - center.x;
    let top = center.y - other.y;
    let bottom = other.bottom() - center.y;
    let nearest = left.min(right).min(top).min(bottom);

    if nearest == left {
        Vec2::new(-(left + radius), 0.0)
    } else if nearest == right {
        Vec2::new(right + radius, 0.0)
    } else if nearest == top {
        Vec2::new(0.0, -(top + radius))
    } else {
        Vec2::new(0.0, bottom + radius)
    }
}

/// Separation of a moving rect from a circle
pub fn rect_circle_snap_offset(moving: &Rect, other: &Circle) -> Vec2 {
    -circle_rect_snap_offset(other, moving)
}

/// Separation of two oriented boxes along the separating-axis candidate with
/// the least overlap. Zero when the boxes are separated.
pub fn oriented_snap_offset(moving: &OrientedBox, other: &OrientedBox, motion: Vec2) -> Vec2 {
    let mut best: Option<(Vec2, f32, (f32, f32), (f32, f32))> = None;

    for axis in moving.axes().into_iter().chain(other.axes()) {
        let Some(normal) = axis.try_normalize() else {
            continue;
        };
        let a = moving.project(normal);
        let b = other.project(normal);
        let overlap = a.1.min(b.1) - a.0.max(b.0);
        if overlap <= 0.0 {
            return Vec2::ZERO;
        }
        if best.is_none_or(|(_, least, _, _)| overlap < least) {
            best = Some((normal, overlap, a, b));
        }
    }

    let Some((normal, _, (min_a, max_a), (min_b, max_b))) = best else {
        return Vec2::ZERO;
    };

    let relative = (moving.center() - other.center()).dot(normal);
    if push_negative(motion.dot(normal), relative) {
        normal * (min_b - max_a)
    } else {
        normal * (max_b - min_a)
    }
}

/// Whether to push toward negative coordinates on an axis: against the
/// motion, or away from the other shape when not moving along it.
fn push_negative(motion: f32, relative: f32) -> bool {
    if motion > 0.0 {
        true
    } else if motion < 0.0 {
        false
    } else {
        relative < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_forces() {
        let mut velocity = Vec2::ZERO;
        let mut acceleration = Vec2::new(1.0, 0.0);
        let mut force = Vec2::new(0.0, 20.0);

        apply_forces(&mut velocity, &mut acceleration, &mut force, 2.0, 0.5);

        assert_eq!(velocity, Vec2::new(0.5, 5.0));
        assert_eq!(force, Vec2::ZERO);
        assert_eq!(acceleration, Vec2::ZERO);
    }

    #[test]
    fn test_apply_forces_massless() {
        let mut velocity = Vec2::ONE;
        let mut acceleration = Vec2::ZERO;
        let mut force = Vec2::new(100.0, 100.0);

        apply_forces(&mut velocity, &mut acceleration, &mut force, 0.0, 1.0);
        assert_eq!(velocity, Vec2::ONE);
    }

    #[test]
    fn test_apply_resistance_never_overshoots() {
        let mut velocity = Vec2::new(0.05, -10.0);
        apply_resistance(&mut velocity, 1.0, 0.0, 0.1);
        assert_eq!(velocity.x, 0.0);
        assert!((velocity.y + 9.9).abs() < 1e-5);

        let mut velocity = Vec2::new(10.0, 0.0);
        apply_resistance(&mut velocity, 0.0, 20.0, 0.1);
        assert_eq!(velocity, Vec2::ZERO);
    }

    #[test]
    fn test_clamp_velocity() {
        let clamped = clamp_velocity(Vec2::new(3000.0, 4000.0), 800.0);
        assert!((clamped.length() - 800.0).abs() < 0.01);
        assert!((clamped.x / clamped.y - 0.75).abs() < 1e-4);
        assert_eq!(clamp_velocity(Vec2::new(1.0, 1.0), 800.0), Vec2::ONE);
    }

    #[test]
    fn test_rect_snap_moving_right() {
        let moving = Rect::new(20.0, 0.0, 10.0, 10.0);
        let other = Rect::new(15.0, 0.0, 10.0, 10.0);

        let offset = rect_snap_offset(&moving, &other, Vec2::new(20.0, 0.0));
        assert_eq!(offset, Vec2::new(-15.0, 0.0));
        assert!(!moving.translated(offset).intersects(&other));
    }

    #[test]
    fn test_rect_snap_vertical() {
        let moving = Rect::new(0.0, 8.0, 10.0, 10.0);
        let other = Rect::new(0.0, 15.0, 10.0, 10.0);

        let offset = rect_snap_offset(&moving, &other, Vec2::new(0.0, 5.0));
        assert_eq!(offset, Vec2::new(0.0, -3.0));
    }

    #[test]
    fn test_rect_snap_without_motion_uses_relative_position() {
        let moving = Rect::new(12.0, 0.0, 10.0, 10.0);
        let other = Rect::new(5.0, 0.0, 10.0, 10.0);

        let offset = rect_snap_offset(&moving, &other, Vec2::ZERO);
        assert_eq!(offset, Vec2::new(3.0, 0.0));
    }

    #[test]
    fn test_rect_snap_separated() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert_eq!(rect_snap_offset(&a, &b, Vec2::X), Vec2::ZERO);
    }

    #[test]
    fn test_circle_snap() {
        let moving = Circle::new(0.0, 0.0, 5.0);
        let other = Circle::new(8.0, 0.0, 5.0);
        let offset = circle_snap_offset(&moving, &other, Vec2::X);
        assert!((offset - Vec2::new(-2.0, 0.0)).length() < 1e-5);

        // Concentric falls back to the motion axis
        let offset = circle_snap_offset(&moving, &Circle::new(0.0, 0.0, 1.0), Vec2::new(0.0, -3.0));
        assert_eq!(offset, Vec2::new(0.0, 6.0));
    }

    #[test]
    fn test_circle_rect_snap() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);

        let outside = Circle::new(12.0, 5.0, 3.0);
        let offset = circle_rect_snap_offset(&outside, &rect);
        assert!((offset - Vec2::new(1.0, 0.0)).length() < 1e-5);

        let inside = Circle::new(2.0, 5.0, 1.0);
        let offset = circle_rect_snap_offset(&inside, &rect);
        assert_eq!(offset, Vec2::new(-3.0, 0.0));
        assert!(
            !inside.translated(offset).intersects_rect(&rect.expanded(-1e-3))
        );
    }

    #[test]
    fn test_rect_circle_snap_is_negated() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let circle = Circle::new(12.0, 5.0, 3.0);
        let offset = rect_circle_snap_offset(&rect, &circle);
        assert!((offset - Vec2::new(-1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_oriented_snap() {
        let moving = OrientedBox::from_rect(&Rect::new(8.0, 0.0, 10.0, 10.0));
        let other = OrientedBox::from_rect(&Rect::new(15.0, 0.0, 10.0, 10.0));

        let offset = oriented_snap_offset(&moving, &other, Vec2::new(5.0, 0.0));
        assert!((offset - Vec2::new(-3.0, 0.0)).length() < 1e-5);

        let apart = OrientedBox::from_rect(&Rect::new(40.0, 0.0, 10.0, 10.0));
        assert_eq!(oriented_snap_offset(&moving, &apart, Vec2::X), Vec2::ZERO);
    }

    #[test]
    fn test_zero_small_components() {
        assert_eq!(
            zero_small_components(Vec2::new(0.05, -3.0), 0.1),
            Vec2::new(0.0, -3.0)
        );
    }
}
