//! The per-step controller pipeline.
//!
//! [`KinematicController::step`] runs one fixed step for one actor:
//!
//! 1. Integrate ground-speed from input and apply optional air drag.
//! 2. Compose the world velocity in the current ground frame, add gravity,
//!    and launch on a jump press edge.
//! 3. Resolve collisions against the injected [`GeometryProbe`].
//! 4. Compose the final pose and store velocity back in the new frame.
//!
//! The step is a pure function of its inputs. It never fails: degenerate
//! probes are skipped inside the resolver, and a step that would produce a
//! non-finite state is discarded in favour of the previous state.

use bevy::log::{debug, warn};
use bevy::prelude::*;

use crate::backend::GeometryProbe;
use crate::compositor::{compose, Composition};
use crate::config::{ActorShape, ControllerConfig};
use crate::debug::ProbeSegment;
use crate::error::ControllerError;
use crate::frame::GroundFrame;
use crate::gravity::GravityConfig;
use crate::integrator::{apply_air_drag, clamp_vertical_speed, integrate_ground_speed};
use crate::intent::ControlInput;
use crate::resolver::{CollisionResolver, Motion};
use crate::state::{ActorContacts, ActorState};

/// Collaborators and tuning for one kinematic actor.
///
/// Build with [`KinematicController::builder`] to get validation, or use
/// [`Default`] for the stock tuning.
///
/// # Example
///
/// ```rust
/// use kinematic_slope_controller::prelude::*;
///
/// let controller = KinematicController::builder()
///     .shape(ActorShape::new(0.5))
///     .gravity(GravityConfig::new(-20.0, 8.0))
///     .config(ControllerConfig::player())
///     .build()
///     .unwrap();
/// assert_eq!(controller.shape.half_width, 0.5);
///
/// let missing = KinematicController::builder().shape(ActorShape::default()).build();
/// assert_eq!(missing.unwrap_err(), ControllerError::MissingGravity);
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Default)]
#[reflect(Component)]
pub struct KinematicController {
    /// Movement and collision tuning.
    pub config: ControllerConfig,
    /// Actor extent and probe insets.
    pub shape: ActorShape,
    /// Gravity and launch.
    pub gravity: GravityConfig,
}

/// Builder for [`KinematicController`].
#[derive(Debug, Clone, Default)]
pub struct KinematicControllerBuilder {
    config: ControllerConfig,
    shape: Option<ActorShape>,
    gravity: Option<GravityConfig>,
}

impl KinematicControllerBuilder {
    /// Set the actor shape.
    pub fn shape(mut self, shape: ActorShape) -> Self {
        self.shape = Some(shape);
        self
    }

    /// Set the gravity module.
    pub fn gravity(mut self, gravity: GravityConfig) -> Self {
        self.gravity = Some(gravity);
        self
    }

    /// Set the tuning. Defaults to [`ControllerConfig::default`].
    pub fn config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate and build the controller.
    pub fn build(self) -> Result<KinematicController, ControllerError> {
        let shape = self.shape.ok_or(ControllerError::MissingShape)?;
        let gravity = self.gravity.ok_or(ControllerError::MissingGravity)?;

        shape.validate()?;
        self.config.validate()?;
        if !gravity.acceleration.is_finite() {
            return Err(ControllerError::invalid(
                "gravity.acceleration",
                "must be finite",
            ));
        }
        if !(gravity.launch_speed.is_finite() && gravity.launch_speed >= 0.0) {
            return Err(ControllerError::invalid(
                "gravity.launch_speed",
                format!("must be non-negative, got {}", gravity.launch_speed),
            ));
        }

        Ok(KinematicController {
            config: self.config,
            shape,
            gravity,
        })
    }
}

/// Result of [`KinematicController::step`].
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// Updated actor state.
    pub state: ActorState,
    /// Contacts found during the step.
    pub contacts: ActorContacts,
    /// Every probe cast during the step.
    pub probes: Vec<ProbeSegment>,
    /// Whether a jump launched this step.
    pub launched: bool,
}

impl StepOutcome {
    fn unchanged(state: ActorState) -> Self {
        Self {
            state,
            contacts: ActorContacts::default(),
            probes: Vec::new(),
            launched: false,
        }
    }
}

impl KinematicController {
    /// Start building a controller.
    pub fn builder() -> KinematicControllerBuilder {
        KinematicControllerBuilder::default()
    }

    /// A fresh actor state at `position` honouring `start_grounded`.
    pub fn spawn_state(&self, position: Vec2) -> ActorState {
        ActorState::spawn(position, self.config.start_grounded)
    }

    /// Advance `state` by one step of `dt` seconds.
    ///
    /// A non-positive or non-finite `dt` leaves the state unchanged.
    pub fn step(
        &self,
        state: &ActorState,
        input: &ControlInput,
        probe: impl GeometryProbe,
        dt: f32,
    ) -> StepOutcome {
        if !(dt.is_finite() && dt > 0.0) {
            return StepOutcome::unchanged(*state);
        }

        let frame = state.frame();
        let mut grounded = state.grounded;

        let ground_speed =
            integrate_ground_speed(state.ground_speed, input.axis(), grounded, dt, &self.config);
        let vertical_speed = match &self.config.air_drag {
            Some(drag) => apply_air_drag(state.vertical_speed, ground_speed, grounded, drag),
            None => state.vertical_speed,
        };

        let mut velocity = frame.to_world(Vec2::new(ground_speed, vertical_speed));
        velocity = self.gravity.apply_gravity(velocity, &frame, dt);

        let pressed = input.jump_held && !state.jump_latched;
        let launched = pressed
            && self
                .config
                .jump
                .permits(grounded, frame.to_local(velocity).y);
        if launched {
            velocity = self.gravity.launch(velocity, &frame);
            grounded = false;
            debug!("jump launched at {}", state.position);
        }

        if !grounded {
            let local = frame.to_local(velocity);
            let vertical = clamp_vertical_speed(local.y, grounded, &self.config);
            velocity = frame.to_world(Vec2::new(local.x, vertical));
        }

        let resolver = CollisionResolver::new(&self.config, &self.shape, probe, dt);
        let resolution = resolver.resolve(Motion {
            position: state.position,
            velocity,
            angle: frame.angle(),
            grounded,
        });

        let placement = compose(
            &Composition {
                start: state.position,
                old_angle: frame.angle(),
                new_angle: resolution.motion.angle,
                correction: resolution.correction,
                intended_velocity: velocity,
                velocity: resolution.motion.velocity,
                half_width: self.shape.half_width,
            },
            dt,
        );

        let local = GroundFrame::new(placement.angle).to_local(resolution.motion.velocity);
        let mut next = ActorState {
            position: placement.position,
            angle: placement.angle,
            ground_speed: local.x,
            vertical_speed: local.y,
            grounded: resolution.motion.grounded,
            was_grounded: state.grounded,
            jump_latched: input.jump_held,
        };

        // Walking off an edge lets a held button count as a fresh press.
        if self.config.jump.release_latch_on_leave_ground && !launched && next.just_left_ground() {
            next.jump_latched = false;
        }

        if !next.is_finite() {
            warn!("discarding non-finite step result for actor at {}", state.position);
            return StepOutcome::unchanged(*state);
        }

        StepOutcome {
            state: next,
            contacts: ActorContacts {
                floor: resolution.floor,
                wall: resolution.wall,
                ceiling: resolution.ceiling,
                teleport_distance: placement.teleport_distance,
            },
            probes: resolution.probes,
            launched,
        }
    }
}
