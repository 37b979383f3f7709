//! Gravity and launch (jump) velocity changes.
//!
//! Both operations are pure: they take a world-space velocity and return
//! the updated one.

use bevy::prelude::*;

use crate::frame::GroundFrame;

/// Axis gravity pulls along.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GravityFrame {
    /// Gravity pulls along world down. On slopes this has a tangential
    /// component, so grounded actors slide.
    World,
    /// Gravity pulls along the ground frame's down. Grounded actors are
    /// pressed into the slope and never slide.
    #[default]
    Local,
}

/// Gravity and launch parameters.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct GravityConfig {
    /// Signed acceleration along up (units/second^2). Negative pulls down.
    pub acceleration: f32,
    /// Speed added along the ground frame's up when launching.
    pub launch_speed: f32,
    /// Axis gravity is applied along.
    pub frame: GravityFrame,
    /// Remove the existing up component of velocity before launching, so
    /// repeated launches do not stack.
    pub cancel_vertical_on_launch: bool,
}

impl Default for GravityConfig {
    fn default() -> Self {
        Self {
            acceleration: -9.81,
            launch_speed: 10.0,
            frame: GravityFrame::Local,
            cancel_vertical_on_launch: true,
        }
    }
}

impl GravityConfig {
    /// Create a gravity module with the given acceleration and launch speed.
    pub fn new(acceleration: f32, launch_speed: f32) -> Self {
        Self {
            acceleration,
            launch_speed,
            ..default()
        }
    }

    /// Builder: set the gravity frame.
    pub fn with_frame(mut self, frame: GravityFrame) -> Self {
        self.frame = frame;
        self
    }

    /// Builder: keep existing vertical velocity on launch.
    pub fn stacking_launches(mut self) -> Self {
        self.cancel_vertical_on_launch = false;
        self
    }

    /// Add one step of gravity to `velocity`.
    pub fn apply_gravity(&self, velocity: Vec2, frame: &GroundFrame, dt: f32) -> Vec2 {
        let up = match self.frame {
            GravityFrame::World => Vec2::Y,
            GravityFrame::Local => frame.up(),
        };
        velocity + up * (self.acceleration * dt)
    }

    /// Launch along the ground frame's up.
    pub fn launch(&self, velocity: Vec2, frame: &GroundFrame) -> Vec2 {
        let up = frame.up();
        let base = if self.cancel_vertical_on_launch {
            velocity - up * velocity.dot(up)
        } else {
            velocity
        };
        base + up * self.launch_speed
    }

    /// Seconds until a launch from rest reaches its apex.
    ///
    /// Returns `None` when gravity does not pull down.
    pub fn time_to_apex(&self) -> Option<f32> {
        (self.acceleration < 0.0).then(|| self.launch_speed / -self.acceleration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_6;

    // ==================== Gravity Tests ====================

    #[test]
    fn gravity_accumulates_over_steps() {
        let gravity = GravityConfig::new(-20.0, 10.0);
        let frame = GroundFrame::default();
        let mut velocity = Vec2::ZERO;
        for _ in 0..10 {
            velocity = gravity.apply_gravity(velocity, &frame, 0.02);
        }
        assert!((velocity.y + 4.0).abs() < 1e-4);
        assert_eq!(velocity.x, 0.0);
    }

    #[test]
    fn local_gravity_follows_slope() {
        let gravity = GravityConfig::new(-10.0, 0.0);
        let frame = GroundFrame::new(FRAC_PI_6);
        let velocity = gravity.apply_gravity(Vec2::ZERO, &frame, 0.1);
        // Entirely into the slope, nothing along it.
        assert!(frame.to_local(velocity).x.abs() < 1e-6);
        assert!((frame.to_local(velocity).y + 1.0).abs() < 1e-5);
    }

    #[test]
    fn world_gravity_ignores_slope() {
        let gravity = GravityConfig::new(-10.0, 0.0).with_frame(GravityFrame::World);
        let frame = GroundFrame::new(FRAC_PI_6);
        let velocity = gravity.apply_gravity(Vec2::ZERO, &frame, 0.1);
        assert!((velocity - Vec2::new(0.0, -1.0)).length() < 1e-6);
    }

    // ==================== Launch Tests ====================

    #[test]
    fn launch_cancels_existing_up_component() {
        let gravity = GravityConfig::new(-20.0, 8.0);
        let frame = GroundFrame::default();
        let velocity = gravity.launch(Vec2::new(3.0, -5.0), &frame);
        assert_eq!(velocity, Vec2::new(3.0, 8.0));

        // Triggering again does not stack.
        let again = gravity.launch(velocity, &frame);
        assert_eq!(again, Vec2::new(3.0, 8.0));
    }

    #[test]
    fn stacking_launch_adds_speed() {
        let gravity = GravityConfig::new(-20.0, 8.0).stacking_launches();
        let frame = GroundFrame::default();
        let velocity = gravity.launch(Vec2::new(0.0, 2.0), &frame);
        assert_eq!(velocity, Vec2::new(0.0, 10.0));
    }

    #[test]
    fn launch_follows_ground_frame() {
        let gravity = GravityConfig::new(-20.0, 5.0);
        let frame = GroundFrame::new(FRAC_PI_6);
        let velocity = gravity.launch(Vec2::ZERO, &frame);
        assert!((velocity - frame.up() * 5.0).length() < 1e-5);
    }

    #[test]
    fn launch_then_gravity_round_trip() {
        let gravity = GravityConfig::new(-20.0, 10.0).stacking_launches();
        let frame = GroundFrame::default();
        let before = Vec2::new(0.0, -1.5);
        let dt = 0.01;

        let mut velocity = gravity.launch(before, &frame);
        let apex = gravity.time_to_apex().unwrap();
        let steps = (apex / dt).round() as usize;
        for _ in 0..steps {
            velocity = gravity.apply_gravity(velocity, &frame, dt);
        }
        assert!((velocity.y - before.y).abs() < 1e-3);

        // The full arc mirrors the launch speed.
        for _ in 0..steps {
            velocity = gravity.apply_gravity(velocity, &frame, dt);
        }
        assert!((velocity.y - (before.y - gravity.launch_speed)).abs() < 1e-3);
    }

    #[test]
    fn no_apex_without_downward_gravity() {
        assert!(GravityConfig::new(0.0, 10.0).time_to_apex().is_none());
        assert!(GravityConfig::new(5.0, 10.0).time_to_apex().is_none());
    }
}
