//! Position and rotation composition.
//!
//! After resolution the actor may have a new ground angle and a correction
//! that snaps its contact point onto a surface. The compositor turns those
//! into the final pose:
//!
//! - Rotation happens about the ground-contact point, not the center, so a
//!   grounded actor never lifts off or sinks in when the angle changes.
//! - The correction ("teleport") is clamped to the distance the actor
//!   intended to travel this step.
//! - The part of the teleport already along the travel direction is taken
//!   out of the travel, so snapping never double-counts motion.
//! - Teleport and travel together move the contact point no further than
//!   the intended travel. Only the rotation offset may add to that, and it
//!   leaves the contact point where it is.

use bevy::prelude::*;

use crate::frame::GroundFrame;

/// Final pose of a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Final center position.
    pub position: Vec2,
    /// Final ground angle.
    pub angle: f32,
    /// Length of the teleport after clamping.
    pub teleport_distance: f32,
}

/// Offset that keeps the contact point fixed while the actor rotates from
/// `old_angle` to `new_angle`.
pub fn rotation_offset(old_angle: f32, new_angle: f32, half_width: f32) -> Vec2 {
    let old_up = GroundFrame::new(old_angle).up();
    let new_up = GroundFrame::new(new_angle).up();
    (new_up - old_up) * half_width
}

/// Clamp a correction to at most `budget` long.
pub fn clamp_teleport(teleport: Vec2, budget: f32) -> Vec2 {
    let budget = budget.max(0.0);
    if teleport.length_squared() > budget * budget {
        teleport.normalize_or_zero() * budget
    } else {
        teleport
    }
}

/// Inputs of [`compose`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Composition {
    /// Center at the start of the step.
    pub start: Vec2,
    /// Ground angle at the start of the step.
    pub old_angle: f32,
    /// Ground angle after resolution.
    pub new_angle: f32,
    /// Summed resolver correction.
    pub correction: Vec2,
    /// Velocity before resolution.
    pub intended_velocity: Vec2,
    /// Velocity after resolution.
    pub velocity: Vec2,
    /// Actor half-width.
    pub half_width: f32,
}

/// Compose the final pose of a step lasting `dt` seconds.
pub fn compose(input: &Composition, dt: f32) -> Placement {
    let rotation = rotation_offset(input.old_angle, input.new_angle, input.half_width);
    let budget = input.intended_velocity.length() * dt;
    let teleport = clamp_teleport(input.correction, budget);
    let covered = input
        .velocity
        .try_normalize()
        .map_or(Vec2::ZERO, |direction| direction * teleport.dot(direction));
    let translation = clamp_teleport(teleport + input.velocity * dt - covered, budget);

    Placement {
        position: input.start + rotation + translation,
        angle: GroundFrame::new(input.new_angle).angle(),
        teleport_distance: teleport.length(),
    }
}
