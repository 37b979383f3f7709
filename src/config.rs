//! Controller configuration.
//!
//! This module defines movement tuning, slope limits, probe fan settings,
//! jump policy and the actor's shape. Everything here is fixed for the
//! actor's lifetime and validated once when the controller is built.

use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;

use crate::collision::SurfaceFilter;
use crate::error::ControllerError;

/// Margin applied to every slope-limit comparison (radians).
///
/// A surface is within a limit only when its angle is below
/// `limit - ANGLE_EPSILON`, so angles sitting on the limit classify the
/// same way on every step instead of flapping between wall and slope.
pub const ANGLE_EPSILON: f32 = 1e-3;

/// Horizontal input magnitudes below this are treated as no input.
pub const INPUT_DEADZONE: f32 = 1e-3;

/// Largest accepted descend limit. The ledge probe reaches
/// `tan(max_descend_angle)` times the step travel, which must stay finite.
pub const MAX_DESCEND_LIMIT: f32 = 89.0 * std::f32::consts::PI / 180.0;

/// Whether `angle` (absolute, radians) is inside `limit`, with
/// [`ANGLE_EPSILON`] of slack taken off the limit. The trimmed limit itself
/// counts as inside.
#[inline]
pub fn within_limit(angle: f32, limit: f32) -> bool {
    angle.abs() <= limit - ANGLE_EPSILON
}

/// Physical extent of the actor and probe insets.
///
/// The actor is treated as round in its local frame: `half_width` is the
/// distance from its center to its edge along any local axis, and its
/// ground-contact point is `half_width` below the center.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct ActorShape {
    /// Distance from center to edge (world units).
    pub half_width: f32,
    /// Lift of the floor probe origin above the actor's bottom, and inset of
    /// the outermost wall probes from the actor's top and bottom.
    pub skin_width: f32,
    /// Inset of probe origins along the cast direction, so probes never start
    /// exactly on a surface the actor is resting against.
    pub margin: f32,
}

impl Default for ActorShape {
    fn default() -> Self {
        Self {
            half_width: 0.5,
            skin_width: 0.01,
            margin: 0.01,
        }
    }
}

impl ActorShape {
    /// Create a shape with the given half-width and default insets.
    pub fn new(half_width: f32) -> Self {
        Self {
            half_width,
            ..default()
        }
    }

    /// Builder: set skin width.
    pub fn with_skin_width(mut self, skin_width: f32) -> Self {
        self.skin_width = skin_width;
        self
    }

    /// Builder: set probe margin.
    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    /// Check the shape is usable.
    pub fn validate(&self) -> Result<(), ControllerError> {
        positive("half_width", self.half_width)?;
        non_negative("skin_width", self.skin_width)?;
        non_negative("margin", self.margin)?;
        if self.margin >= self.half_width {
            return Err(ControllerError::invalid(
                "margin",
                "must be smaller than half_width",
            ));
        }
        if self.skin_width >= self.half_width {
            return Err(ControllerError::invalid(
                "skin_width",
                "must be smaller than half_width",
            ));
        }
        Ok(())
    }
}

/// When a jump edge is allowed to launch.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JumpCondition {
    /// Only while grounded.
    #[default]
    Grounded,
    /// Whenever vertical speed is not positive (grounded, at the apex or falling).
    NotRising,
    /// On every press.
    Always,
}

/// Jump triggering rules.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JumpPolicy {
    /// Condition checked on the press edge.
    pub condition: JumpCondition,
    /// Release the latch when the actor leaves the ground while the button is
    /// still held, allowing another edge without releasing the button.
    pub release_latch_on_leave_ground: bool,
}

impl JumpPolicy {
    /// Whether a press edge may launch in the given state.
    pub fn permits(&self, grounded: bool, vertical_speed: f32) -> bool {
        match self.condition {
            JumpCondition::Grounded => grounded,
            JumpCondition::NotRising => grounded || vertical_speed <= 0.0,
            JumpCondition::Always => true,
        }
    }
}

/// Fall-speed drag applied while airborne and moving sideways.
///
/// Multiplying vertical speed by `factor` each step approximates a
/// decaying-exponential cap on fall speed.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct AirDrag {
    /// Multiplier applied to vertical speed (0.0-1.0).
    pub factor: f32,
    /// Drag applies only while falling at least this fast.
    pub min_fall_speed: f32,
    /// Drag applies only while falling at most this fast.
    pub max_fall_speed: f32,
    /// Drag applies only while moving sideways faster than this.
    pub min_horizontal_speed: f32,
}

impl Default for AirDrag {
    fn default() -> Self {
        Self {
            factor: 0.98,
            min_fall_speed: 0.5,
            max_fall_speed: 12.0,
            min_horizontal_speed: 2.0,
        }
    }
}

/// How a fan of parallel probes selects the hit it acts on.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FanSelection {
    /// The first qualifying probe in cast order.
    #[default]
    FirstHit,
    /// The qualifying probe with the smallest distance.
    Nearest,
}

/// Movement and collision tuning for a kinematic actor.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct ControllerConfig {
    // === Grounded Movement ===
    /// Acceleration when input agrees with the current direction (units/second^2).
    pub ground_acceleration: f32,
    /// Acceleration when input opposes the current direction.
    pub ground_deceleration: f32,
    /// Deceleration with no input while grounded.
    pub ground_friction: f32,

    // === Airborne Movement ===
    /// Acceleration in the air when input agrees with the current direction.
    pub air_acceleration: f32,
    /// Acceleration in the air when input opposes the current direction.
    pub air_deceleration: f32,
    /// Optional fall-speed drag.
    pub air_drag: Option<AirDrag>,

    // === Speed Limits ===
    /// Maximum ground-speed magnitude (units/second).
    pub max_horizontal_speed: f32,
    /// Maximum vertical speed magnitude while airborne.
    pub max_vertical_speed: f32,

    // === Slope Settings ===
    /// Steepest surface change the actor walks onto (radians).
    pub max_climb_angle: f32,
    /// Steepest downward surface change the actor stays glued to (radians).
    pub max_descend_angle: f32,

    // === Probe Settings ===
    /// Number of parallel wall probes per side.
    pub ray_count: u32,
    /// Which wall probe wins when several hit.
    pub fan_selection: FanSelection,
    /// Collidable-surface filter for every probe.
    pub surface_filter: SurfaceFilter,

    // === Jump Settings ===
    /// Jump triggering rules.
    pub jump: JumpPolicy,

    // === Lifecycle ===
    /// Grounded flag of a freshly spawned actor.
    pub start_grounded: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            ground_acceleration: 5.0,
            ground_deceleration: 50.0,
            ground_friction: 5.0,

            air_acceleration: 5.0,
            air_deceleration: 25.0,
            air_drag: None,

            max_horizontal_speed: 15.0,
            max_vertical_speed: 15.0,

            max_climb_angle: 50f32.to_radians(),
            max_descend_angle: 50f32.to_radians(),

            ray_count: 3,
            fan_selection: FanSelection::FirstHit,
            surface_filter: SurfaceFilter::ALL,

            jump: JumpPolicy::default(),

            start_grounded: true,
        }
    }
}

impl ControllerConfig {
    /// Create a config tuned for responsive player control.
    pub fn player() -> Self {
        Self {
            ground_acceleration: 40.0,
            ground_deceleration: 80.0,
            ground_friction: 30.0,
            air_acceleration: 20.0,
            air_deceleration: 40.0,
            max_horizontal_speed: 8.0,
            max_vertical_speed: 20.0,
            ..default()
        }
    }

    /// Builder: set grounded acceleration curve.
    pub fn with_ground_movement(mut self, acceleration: f32, deceleration: f32, friction: f32) -> Self {
        self.ground_acceleration = acceleration;
        self.ground_deceleration = deceleration;
        self.ground_friction = friction;
        self
    }

    /// Builder: set airborne acceleration curve.
    pub fn with_air_movement(mut self, acceleration: f32, deceleration: f32) -> Self {
        self.air_acceleration = acceleration;
        self.air_deceleration = deceleration;
        self
    }

    /// Builder: enable air drag.
    pub fn with_air_drag(mut self, drag: AirDrag) -> Self {
        self.air_drag = Some(drag);
        self
    }

    /// Builder: set max horizontal speed.
    pub fn with_max_horizontal_speed(mut self, speed: f32) -> Self {
        self.max_horizontal_speed = speed;
        self
    }

    /// Builder: set max vertical speed.
    pub fn with_max_vertical_speed(mut self, speed: f32) -> Self {
        self.max_vertical_speed = speed;
        self
    }

    /// Builder: set slope limits in radians.
    pub fn with_slope_limits(mut self, climb: f32, descend: f32) -> Self {
        self.max_climb_angle = climb;
        self.max_descend_angle = descend;
        self
    }

    /// Builder: set slope limits in degrees.
    pub fn with_slope_limits_degrees(self, climb: f32, descend: f32) -> Self {
        self.with_slope_limits(climb.to_radians(), descend.to_radians())
    }

    /// Builder: set wall probe count.
    pub fn with_ray_count(mut self, count: u32) -> Self {
        self.ray_count = count;
        self
    }

    /// Builder: set fan selection policy.
    pub fn with_fan_selection(mut self, selection: FanSelection) -> Self {
        self.fan_selection = selection;
        self
    }

    /// Builder: set the surface filter.
    pub fn with_surface_filter(mut self, filter: SurfaceFilter) -> Self {
        self.surface_filter = filter;
        self
    }

    /// Builder: set the jump policy.
    pub fn with_jump_policy(mut self, jump: JumpPolicy) -> Self {
        self.jump = jump;
        self
    }

    /// Builder: spawn airborne instead of grounded.
    pub fn starting_airborne(mut self) -> Self {
        self.start_grounded = false;
        self
    }

    /// Check every value is in range.
    pub fn validate(&self) -> Result<(), ControllerError> {
        non_negative("ground_acceleration", self.ground_acceleration)?;
        non_negative("ground_deceleration", self.ground_deceleration)?;
        non_negative("ground_friction", self.ground_friction)?;
        non_negative("air_acceleration", self.air_acceleration)?;
        non_negative("air_deceleration", self.air_deceleration)?;
        positive("max_horizontal_speed", self.max_horizontal_speed)?;
        positive("max_vertical_speed", self.max_vertical_speed)?;

        if !(self.max_climb_angle > ANGLE_EPSILON && self.max_climb_angle < FRAC_PI_2) {
            return Err(ControllerError::invalid(
                "max_climb_angle",
                "must be between 0 and 90 degrees",
            ));
        }
        if !(self.max_descend_angle > ANGLE_EPSILON && self.max_descend_angle <= MAX_DESCEND_LIMIT) {
            return Err(ControllerError::invalid(
                "max_descend_angle",
                "must be between 0 and 89 degrees",
            ));
        }
        if self.ray_count == 0 {
            return Err(ControllerError::invalid("ray_count", "must be at least 1"));
        }
        if let Some(drag) = &self.air_drag {
            if !(drag.factor > 0.0 && drag.factor <= 1.0) {
                return Err(ControllerError::invalid(
                    "air_drag.factor",
                    "must be in (0, 1]",
                ));
            }
            if !(drag.min_fall_speed <= drag.max_fall_speed) {
                return Err(ControllerError::invalid(
                    "air_drag.max_fall_speed",
                    "must not be below min_fall_speed",
                ));
            }
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ControllerError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ControllerError::invalid(field, format!("must be positive, got {value}")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ControllerError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ControllerError::invalid(
            field,
            format!("must be non-negative, got {value}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(ControllerConfig::default().validate(), Ok(()));
        assert_eq!(ControllerConfig::player().validate(), Ok(()));
        assert_eq!(ActorShape::default().validate(), Ok(()));
    }

    #[test]
    fn config_player_preset() {
        let player = ControllerConfig::player();
        let default = ControllerConfig::default();
        assert!(player.ground_acceleration >= default.ground_acceleration);
    }

    #[test]
    fn slope_limits_in_degrees() {
        let config = ControllerConfig::default().with_slope_limits_degrees(45.0, 30.0);
        assert!((config.max_climb_angle - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
        assert!((config.max_descend_angle - std::f32::consts::FRAC_PI_6).abs() < 1e-6);
    }

    #[test]
    fn rejects_zero_rays() {
        let error = ControllerConfig::default().with_ray_count(0).validate().unwrap_err();
        assert!(matches!(
            error,
            ControllerError::InvalidConfig { field: "ray_count", .. }
        ));
    }

    #[test]
    fn rejects_vertical_climb_limit() {
        let config = ControllerConfig::default().with_slope_limits_degrees(90.0, 45.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_descend_limit_near_vertical() {
        let config = ControllerConfig::default().with_slope_limits_degrees(45.0, 89.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_negative_speeds() {
        let config = ControllerConfig::default().with_max_horizontal_speed(-1.0);
        assert!(config.validate().is_err());
        let config = ControllerConfig::default().with_max_vertical_speed(f32::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_air_drag() {
        let config = ControllerConfig::default().with_air_drag(AirDrag {
            factor: 1.5,
            ..default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn shape_margin_must_fit() {
        assert!(ActorShape::new(0.5).with_margin(0.5).validate().is_err());
        assert!(ActorShape::new(0.5).with_skin_width(0.6).validate().is_err());
        assert!(ActorShape::new(0.0).validate().is_err());
    }

    #[test]
    fn within_limit_uses_epsilon() {
        let limit = 0.5;
        assert!(within_limit(limit - 0.01, limit));
        assert!(within_limit(limit - ANGLE_EPSILON, limit));
        assert!(within_limit(limit - 2.0 * ANGLE_EPSILON, limit));
        assert!(!within_limit(limit + 2.0 * ANGLE_EPSILON, limit));
        assert!(!within_limit(limit, limit));
        assert!(!within_limit(limit - ANGLE_EPSILON * 0.5, limit));
        assert!(within_limit(-(limit - 0.01), limit));
    }

    #[test]
    fn jump_policy_conditions() {
        let grounded = JumpPolicy::default();
        assert!(grounded.permits(true, 0.0));
        assert!(!grounded.permits(false, -1.0));

        let not_rising = JumpPolicy {
            condition: JumpCondition::NotRising,
            ..default()
        };
        assert!(not_rising.permits(false, -1.0));
        assert!(!not_rising.permits(false, 2.0));

        let always = JumpPolicy {
            condition: JumpCondition::Always,
            ..default()
        };
        assert!(always.permits(false, 5.0));
    }
}
