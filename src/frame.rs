//! Ground-frame tracking.
//!
//! The ground frame is the actor's local coordinate system. Its "up" is
//! world up rotated by the ground angle, so slope-relative movement math
//! stays the same on any incline. Positive angles rotate counter-clockwise:
//! a ramp rising to the right has a positive angle.

use std::f32::consts::{PI, TAU};

use bevy::prelude::*;

/// Wrap an angle into `(-PI, PI]`. Angles already in range come back
/// bit-for-bit unchanged.
pub fn wrap_angle(angle: f32) -> f32 {
    if angle > -PI && angle <= PI {
        return angle;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Signed angle that rotates `from` onto `to` (counter-clockwise positive).
///
/// Returns `None` when either vector is zero-length or non-finite.
pub fn signed_angle(from: Vec2, to: Vec2) -> Option<f32> {
    let from = from.try_normalize()?;
    let to = to.try_normalize()?;
    let angle = from.perp_dot(to).atan2(from.dot(to));
    angle.is_finite().then_some(angle)
}

/// Ground angle implied by a surface normal.
///
/// This is the signed angle between world down and the inverted normal,
/// which equals the angle between world up and the normal.
pub fn surface_angle(normal: Vec2) -> Option<f32> {
    signed_angle(Vec2::NEG_Y, -normal)
}

/// The actor's ground-aligned basis.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct GroundFrame {
    angle: f32,
    right: Vec2,
    up: Vec2,
}

impl Default for GroundFrame {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl GroundFrame {
    /// Build the frame for a ground angle (radians).
    ///
    /// Non-finite angles fall back to flat ground.
    pub fn new(angle: f32) -> Self {
        let angle = if angle.is_finite() { wrap_angle(angle) } else { 0.0 };
        let (sin, cos) = angle.sin_cos();
        Self {
            angle,
            right: Vec2::new(cos, sin),
            up: Vec2::new(-sin, cos),
        }
    }

    /// Frame aligned to a surface normal.
    pub fn from_normal(normal: Vec2) -> Option<Self> {
        surface_angle(normal).map(Self::new)
    }

    /// The ground angle in radians.
    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Local right: world right rotated by the ground angle.
    #[inline]
    pub fn right(&self) -> Vec2 {
        self.right
    }

    /// Local left.
    #[inline]
    pub fn left(&self) -> Vec2 {
        -self.right
    }

    /// Local up: world up rotated by the ground angle.
    #[inline]
    pub fn up(&self) -> Vec2 {
        self.up
    }

    /// Local down.
    #[inline]
    pub fn down(&self) -> Vec2 {
        -self.up
    }

    /// Project a world-space vector into this frame (x = along right, y = along up).
    pub fn to_local(&self, world_vec: Vec2) -> Vec2 {
        Vec2::new(world_vec.dot(self.right), world_vec.dot(self.up))
    }

    /// Convert a local-space vector to world space.
    pub fn to_world(&self, local_vec: Vec2) -> Vec2 {
        self.right * local_vec.x + self.up * local_vec.y
    }

    /// Signed rotation from this frame to a surface with the given normal.
    pub fn angle_to_surface(&self, normal: Vec2) -> Option<f32> {
        surface_angle(normal).map(|angle| wrap_angle(angle - self.angle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_6};

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn flat_frame_is_world_axes() {
        let frame = GroundFrame::default();
        assert_eq!(frame.angle(), 0.0);
        assert!(approx(frame.up(), Vec2::Y));
        assert!(approx(frame.down(), Vec2::NEG_Y));
        assert!(approx(frame.right(), Vec2::X));
        assert!(approx(frame.left(), Vec2::NEG_X));
    }

    #[test]
    fn positive_angle_rotates_counter_clockwise() {
        let frame = GroundFrame::new(FRAC_PI_2);
        assert!(approx(frame.right(), Vec2::Y));
        assert!(approx(frame.up(), Vec2::NEG_X));
    }

    #[test]
    fn local_round_trip() {
        let frame = GroundFrame::new(0.3);
        let world = Vec2::new(2.0, -1.5);
        assert!(approx(frame.to_world(frame.to_local(world)), world));
    }

    #[test]
    fn wrap_angle_range() {
        assert!((wrap_angle(PI + 0.5) - (0.5 - PI)).abs() < 1e-5);
        assert!((wrap_angle(-PI) - PI).abs() < 1e-5);
        assert!((wrap_angle(TAU + 0.25) - 0.25).abs() < 1e-5);
        assert!((wrap_angle(-TAU - 0.25) + 0.25).abs() < 1e-5);
        let inside = 0.785_398_2 - 1e-3;
        assert_eq!(wrap_angle(inside), inside);
        assert_eq!(wrap_angle(PI), PI);
    }

    #[test]
    fn signed_angle_direction() {
        assert!((signed_angle(Vec2::X, Vec2::Y).unwrap() - FRAC_PI_2).abs() < 1e-5);
        assert!((signed_angle(Vec2::Y, Vec2::X).unwrap() + FRAC_PI_2).abs() < 1e-5);
        assert!(signed_angle(Vec2::ZERO, Vec2::X).is_none());
        assert!(signed_angle(Vec2::X, Vec2::new(f32::NAN, 1.0)).is_none());
    }

    #[test]
    fn surface_angle_of_ramps() {
        // Flat ground.
        assert!(surface_angle(Vec2::Y).unwrap().abs() < 1e-6);

        // Ramp rising to the right: normal leans left.
        let uphill = Vec2::new(-FRAC_PI_6.sin(), FRAC_PI_6.cos());
        assert!((surface_angle(uphill).unwrap() - FRAC_PI_6).abs() < 1e-5);

        // Ramp falling to the right: normal leans right.
        let downhill = Vec2::new(FRAC_PI_4.sin(), FRAC_PI_4.cos());
        assert!((surface_angle(downhill).unwrap() + FRAC_PI_4).abs() < 1e-5);

        // Wall facing left.
        assert!((surface_angle(Vec2::NEG_X).unwrap() - FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn frame_from_normal_matches_surface() {
        let normal = Vec2::new(-FRAC_PI_6.sin(), FRAC_PI_6.cos());
        let frame = GroundFrame::from_normal(normal).unwrap();
        assert!(approx(frame.up(), normal));
        assert!(frame.to_local(normal).x.abs() < 1e-6);
    }

    #[test]
    fn angle_to_surface_is_relative() {
        let frame = GroundFrame::new(FRAC_PI_6);
        let normal = Vec2::new(-FRAC_PI_6.sin(), FRAC_PI_6.cos());
        assert!(frame.angle_to_surface(normal).unwrap().abs() < 1e-5);
        assert!((frame.angle_to_surface(Vec2::Y).unwrap() + FRAC_PI_6).abs() < 1e-5);
    }

    #[test]
    fn non_finite_angle_is_flat() {
        assert_eq!(GroundFrame::new(f32::NAN), GroundFrame::default());
    }
}
