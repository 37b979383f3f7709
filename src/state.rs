//! Actor state and marker components.
//!
//! [`ActorState`] is the single source of truth for a kinematic actor. The
//! marker components indicate the current physical state of an actor and
//! are automatically added/removed by the controller systems.

use bevy::prelude::*;

use crate::frame::GroundFrame;

/// Runtime state of a kinematic actor, mutated once per fixed step.
///
/// Velocity is stored in the ground frame: `ground_speed` along local right
/// and `vertical_speed` along local up. While airborne the angle is zero, so
/// both are world components.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct ActorState {
    /// World-space center position.
    pub position: Vec2,
    /// Ground angle in radians (0 = flat, counter-clockwise positive).
    pub angle: f32,
    /// Signed speed along the local right axis.
    pub ground_speed: f32,
    /// Signed speed along the local up axis.
    pub vertical_speed: f32,
    /// Whether the actor is standing on walkable ground.
    pub grounded: bool,
    /// `grounded` at the start of the last step.
    pub was_grounded: bool,
    /// Set while the jump button is held after a press edge.
    pub jump_latched: bool,
}

impl Default for ActorState {
    fn default() -> Self {
        Self::spawn(Vec2::ZERO, true)
    }
}

impl ActorState {
    /// Fresh state at rest.
    pub fn spawn(position: Vec2, grounded: bool) -> Self {
        Self {
            position,
            angle: 0.0,
            ground_speed: 0.0,
            vertical_speed: 0.0,
            grounded,
            was_grounded: grounded,
            jump_latched: false,
        }
    }

    /// The ground frame for the current angle.
    pub fn frame(&self) -> GroundFrame {
        GroundFrame::new(self.angle)
    }

    /// World-space velocity reconstructed from the ground-frame components.
    pub fn velocity(&self) -> Vec2 {
        self.frame()
            .to_world(Vec2::new(self.ground_speed, self.vertical_speed))
    }

    /// Whether the last step touched down.
    pub fn just_landed(&self) -> bool {
        self.grounded && !self.was_grounded
    }

    /// Whether the last step left the ground.
    pub fn just_left_ground(&self) -> bool {
        !self.grounded && self.was_grounded
    }

    /// Whether every field is finite.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.angle.is_finite()
            && self.ground_speed.is_finite()
            && self.vertical_speed.is_finite()
    }
}

/// Ground contact found by the last step.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct SurfaceContact {
    /// Contact point on the surface.
    pub point: Vec2,
    /// Outward surface normal.
    pub normal: Vec2,
    /// Ground angle implied by the normal.
    pub angle: f32,
}

/// Wall contact found by the last step.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct WallContact {
    /// Direction from the actor toward the wall.
    pub direction: Vec2,
    /// Outward wall normal.
    pub normal: Vec2,
    /// Probe distance to the wall.
    pub distance: f32,
}

/// Contacts reported by the last step.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Default)]
#[reflect(Component)]
pub struct ActorContacts {
    /// Ground the actor stands on, if any.
    pub floor: Option<SurfaceContact>,
    /// Wall the actor was stopped by, if any.
    pub wall: Option<WallContact>,
    /// Overhead surface that stopped the actor rising, if any.
    pub ceiling: Option<WallContact>,
    /// Length of the contact-point correction after clamping.
    pub teleport_distance: f32,
}

/// Marker component indicating the actor is grounded.
///
/// This is a marker component - it has no data, just indicates state.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use kinematic_slope_controller::prelude::*;
///
/// // Grounded is a marker component - just use it in queries
/// fn check_grounded(grounded: Option<&Grounded>) -> bool {
///     grounded.is_some()
/// }
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Grounded;

/// Marker component indicating the actor is airborne.
///
/// Mutually exclusive with [`Grounded`].
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Airborne;

/// Present while the last step ended against a wall.
///
/// Mirrors [`ActorContacts::wall`] so systems can filter with
/// `With<TouchingWall>`. Replaced when the blocking side changes, removed on
/// the first step without a wall contact.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct TouchingWall {
    /// Contact that stopped the actor.
    pub contact: WallContact,
}

impl TouchingWall {
    /// Side probe direction that found the wall. Follows the ground frame,
    /// so it tilts with the slope the actor stands on.
    pub fn direction(&self) -> Vec2 {
        self.contact.direction
    }

    /// Wall lies toward negative x.
    pub fn is_left(&self) -> bool {
        self.contact.direction.x < 0.0
    }

    /// Wall lies toward positive x.
    pub fn is_right(&self) -> bool {
        self.contact.direction.x > 0.0
    }

    /// Whether moving with `velocity` would push further into the wall.
    pub fn blocks(&self, velocity: Vec2) -> bool {
        velocity.dot(self.contact.direction) > 0.0
    }
}

impl From<WallContact> for TouchingWall {
    fn from(contact: WallContact) -> Self {
        Self { contact }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_6;

    #[test]
    fn spawn_is_at_rest() {
        let state = ActorState::spawn(Vec2::new(1.0, 2.0), false);
        assert_eq!(state.velocity(), Vec2::ZERO);
        assert_eq!(state.angle, 0.0);
        assert!(!state.grounded);
        assert!(!state.was_grounded);
    }

    #[test]
    fn velocity_reconstructs_from_frame() {
        let state = ActorState {
            angle: FRAC_PI_6,
            ground_speed: 2.0,
            vertical_speed: 0.0,
            ..default()
        };
        let expected = Vec2::new(FRAC_PI_6.cos(), FRAC_PI_6.sin()) * 2.0;
        assert!((state.velocity() - expected).length() < 1e-5);
    }

    #[test]
    fn transitions() {
        let mut state = ActorState::spawn(Vec2::ZERO, false);
        state.grounded = true;
        assert!(state.just_landed());
        assert!(!state.just_left_ground());

        state.was_grounded = true;
        state.grounded = false;
        assert!(state.just_left_ground());
        assert!(!state.just_landed());
    }

    #[test]
    fn non_finite_state_detected() {
        let mut state = ActorState::default();
        assert!(state.is_finite());
        state.position.x = f32::NAN;
        assert!(!state.is_finite());
    }

    #[test]
    fn touching_wall_side_on_a_slope() {
        // Right-hand side probe while standing on a 30 degree incline.
        let right = Vec2::new(FRAC_PI_6.cos(), FRAC_PI_6.sin());
        let wall = TouchingWall::from(WallContact {
            direction: right,
            normal: Vec2::NEG_X,
            distance: 0.02,
        });
        assert!(wall.is_right());
        assert!(!wall.is_left());
        assert_eq!(wall.direction(), right);
    }

    #[test]
    fn touching_wall_blocks_only_toward_it() {
        let wall = TouchingWall::from(WallContact {
            direction: Vec2::NEG_X,
            normal: Vec2::X,
            distance: 0.0,
        });
        assert!(wall.is_left());
        assert!(wall.blocks(Vec2::new(-2.0, 1.0)));
        assert!(!wall.blocks(Vec2::new(2.0, 0.0)));
        // Rising or falling along the wall face is not blocked.
        assert!(!wall.blocks(Vec2::Y));
    }
}
