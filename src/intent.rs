//! Input snapshot component.
//!
//! Inputs represent the desired movement from player input or AI. The
//! controller samples [`ControlInput`] once at the start of each step and
//! holds it constant for the whole step.

use bevy::prelude::*;

use crate::config::INPUT_DEADZONE;

/// Per-step input for a kinematic actor.
///
/// This component only stores raw state. Jump edge detection and latching
/// happen inside the controller step, so callers simply mirror the button.
///
/// # Example
///
/// ```rust
/// use kinematic_slope_controller::prelude::*;
///
/// let mut input = ControlInput::new();
/// input.set_horizontal(2.0);
/// assert_eq!(input.horizontal, 1.0);
///
/// input.set_jump_held(true);
/// assert!(input.jump_held);
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Default)]
#[reflect(Component)]
pub struct ControlInput {
    /// Horizontal axis (-1.0 = left, 1.0 = right).
    pub horizontal: f32,
    /// Raw jump button state.
    pub jump_held: bool,
}

impl ControlInput {
    /// Create an empty input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Input holding the horizontal axis at `axis`.
    pub fn moving(axis: f32) -> Self {
        let mut input = Self::default();
        input.set_horizontal(axis);
        input
    }

    /// Set the horizontal axis, clamped to `[-1, 1]`.
    pub fn set_horizontal(&mut self, axis: f32) {
        self.horizontal = if axis.is_finite() {
            axis.clamp(-1.0, 1.0)
        } else {
            0.0
        };
    }

    /// Set the raw jump button state.
    pub fn set_jump_held(&mut self, held: bool) {
        self.jump_held = held;
    }

    /// Builder: hold jump.
    pub fn with_jump(mut self) -> Self {
        self.jump_held = true;
        self
    }

    /// Clear all input.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether the horizontal axis is outside the deadzone.
    pub fn is_moving(&self) -> bool {
        self.horizontal.abs() > INPUT_DEADZONE
    }

    /// Horizontal axis with the deadzone applied and range enforced.
    ///
    /// Inputs written directly to the public field bypass the setter, so
    /// the controller always reads through this.
    pub fn axis(&self) -> f32 {
        if self.horizontal.is_finite() && self.is_moving() {
            self.horizontal.clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_is_clamped() {
        let mut input = ControlInput::new();
        input.set_horizontal(-3.0);
        assert_eq!(input.horizontal, -1.0);
        input.set_horizontal(f32::NAN);
        assert_eq!(input.horizontal, 0.0);
    }

    #[test]
    fn axis_applies_deadzone() {
        let input = ControlInput {
            horizontal: INPUT_DEADZONE * 0.5,
            jump_held: false,
        };
        assert!(!input.is_moving());
        assert_eq!(input.axis(), 0.0);
    }

    #[test]
    fn axis_sanitizes_direct_writes() {
        let input = ControlInput {
            horizontal: 4.0,
            jump_held: false,
        };
        assert_eq!(input.axis(), 1.0);
    }

    #[test]
    fn clear_resets_everything() {
        let mut input = ControlInput::moving(0.5).with_jump();
        input.clear();
        assert_eq!(input, ControlInput::default());
    }
}
