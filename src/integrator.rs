//! Ground-speed integration.
//!
//! Ground-speed is advanced with three curves: acceleration when input
//! agrees with the current direction, deceleration when it opposes it, and
//! friction when there is no input. Grounded and airborne states use
//! separate constants, and friction only applies on the ground.

use crate::config::{AirDrag, ControllerConfig};

/// Advance ground-speed by one step.
///
/// `input` must already be sanitized into `[-1, 1]` with the deadzone
/// applied (see [`ControlInput::axis`](crate::intent::ControlInput::axis)).
pub fn integrate_ground_speed(
    speed: f32,
    input: f32,
    grounded: bool,
    dt: f32,
    config: &ControllerConfig,
) -> f32 {
    let (acceleration, deceleration) = if grounded {
        (config.ground_acceleration, config.ground_deceleration)
    } else {
        (config.air_acceleration, config.air_deceleration)
    };

    let total = if input != 0.0 && (speed == 0.0 || input.signum() == speed.signum()) {
        input * acceleration
    } else if input != 0.0 {
        input * deceleration
    } else if speed != 0.0 && grounded {
        -speed.signum() * config.ground_friction
    } else {
        0.0
    };

    let mut next = speed + total * dt;

    // Friction stops the actor, it never reverses it.
    if input == 0.0 && speed != 0.0 && next.signum() != speed.signum() {
        next = 0.0;
    }

    next.clamp(-config.max_horizontal_speed, config.max_horizontal_speed)
}

/// Apply fall-speed drag to vertical speed.
pub fn apply_air_drag(vertical: f32, ground_speed: f32, grounded: bool, drag: &AirDrag) -> f32 {
    let fall_speed = -vertical;
    let falling = fall_speed >= drag.min_fall_speed && fall_speed <= drag.max_fall_speed;
    if !grounded && falling && ground_speed.abs() > drag.min_horizontal_speed {
        vertical * drag.factor
    } else {
        vertical
    }
}

/// Clamp airborne vertical speed to the configured maximum.
pub fn clamp_vertical_speed(vertical: f32, grounded: bool, config: &ControllerConfig) -> f32 {
    if grounded {
        vertical
    } else {
        vertical.clamp(-config.max_vertical_speed, config.max_vertical_speed)
    }
}
