//! Collision tests.
//!
//! Simple disk-disk overlap for live projectile/player collision, plus a
//! ray-circle intersection used by lag-compensated hit validation.

use crate::core::vec2::Vec2;

/// Whether two circles overlap.
#[inline]
pub fn circles_overlap(pos_a: Vec2, radius_a: f32, pos_b: Vec2, radius_b: f32) -> bool {
    let combined = radius_a + radius_b;
    pos_a.distance_squared(pos_b) <= combined * combined
}

/// Ray-circle intersection. `origin`/`direction` define the ray
/// (`direction` need not be normalized for this test, since only the sign
/// and relative magnitude of `t` matter for the smaller-non-negative-root
/// rule); `center`/`radius` define the circle.
///
/// Returns the smallest non-negative `t` such that `origin + t*direction`
/// lies on the circle, or `None` if the ray misses or both roots are
/// negative.
pub fn ray_circle_intersect(origin: Vec2, direction: Vec2, center: Vec2, radius: f32) -> Option<f32> {
    let f = origin - center;
    let a = direction.length_squared();
    if a <= f32::EPSILON {
        return None;
    }
    let b = 2.0 * f.dot(direction);
    let c = f.length_squared() - radius * radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_disc = discriminant.sqrt();
    let t1 = (-b - sqrt_disc) / (2.0 * a);
    let t2 = (-b + sqrt_disc) / (2.0 * a);

    let (smaller, larger) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };

    if smaller >= 0.0 {
        Some(smaller)
    } else if larger >= 0.0 {
        Some(larger)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn circles_overlap_is_symmetric(
            ax in -100.0f32..100.0, ay in -100.0f32..100.0, ra in 0.0f32..10.0,
            bx in -100.0f32..100.0, by in -100.0f32..100.0, rb in 0.0f32..10.0,
        ) {
            let a = Vec2::new(ax, ay);
            let b = Vec2::new(bx, by);
            prop_assert_eq!(circles_overlap(a, ra, b, rb), circles_overlap(b, rb, a, ra));
        }
    }

    #[test]
    fn circles_overlap_true_and_false() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(1.0, 0.0);
        assert!(circles_overlap(a, 0.6, b, 0.6));

        let c = Vec2::new(2.0, 0.0);
        assert!(!circles_overlap(a, 0.6, c, 0.6));
    }

    #[test]
    fn ray_hits_circle_ahead() {
        let origin = Vec2::new(-5.0, 0.0);
        let direction = Vec2::new(1.0, 0.0);
        let center = Vec2::new(0.0, 0.0);
        let t = ray_circle_intersect(origin, direction, center, 0.5).unwrap();
        assert!((t - 4.5).abs() < 1e-4);
    }

    #[test]
    fn ray_misses_circle_behind() {
        let origin = Vec2::new(5.0, 0.0);
        let direction = Vec2::new(1.0, 0.0);
        let center = Vec2::new(0.0, 0.0);
        assert!(ray_circle_intersect(origin, direction, center, 0.5).is_none());
    }

    #[test]
    fn ray_misses_circle_off_axis() {
        let origin = Vec2::new(-5.0, 5.0);
        let direction = Vec2::new(1.0, 0.0);
        let center = Vec2::new(0.0, 0.0);
        assert!(ray_circle_intersect(origin, direction, center, 0.5).is_none());
    }
}
