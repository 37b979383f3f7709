//! # `kinematic_slope_controller`
//!
//! A kinematic 2D platformer controller that walks actors over slopes using
//! raycast probes instead of a rigid-body solver.
//!
//! This crate provides a deterministic, fixed-step controller that:
//! - Integrates ground-speed with separate grounded and airborne curves
//! - Tracks a ground frame, so movement follows the slope under the actor
//! - Climbs and descends slopes within configurable angle limits
//! - Stops at walls and steep slopes, and leaves ledges into a fall
//! - Rotates the actor about its contact point as the ground angle changes
//! - Abstracts geometry queries for easy swapping (tile level and Rapier2D included)
//!
//! ## Architecture
//!
//! Each fixed step runs a single pipeline per actor:
//! 1. The integrator advances ground-speed from [`ControlInput`](intent::ControlInput)
//! 2. Gravity and jump launches are applied in the current ground frame
//! 3. The resolver casts wall, floor and ledge probes and corrects the motion
//! 4. The compositor rotates about the contact point and clamps snapping
//!
//! The pipeline is available as a plain function,
//! [`KinematicController::step`](controller::KinematicController::step), and
//! as Bevy systems through [`KinematicControllerPlugin`].
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use kinematic_slope_controller::prelude::*;
//!
//! let level = LevelGeometry::from_tiles(1.0, &["        ", "########"]);
//! let controller = KinematicController::builder()
//!     .shape(ActorShape::new(0.5))
//!     .gravity(GravityConfig::default())
//!     .config(ControllerConfig::player())
//!     .build()
//!     .unwrap();
//!
//! let mut state = controller.spawn_state(Vec2::new(2.0, 1.5));
//! for _ in 0..30 {
//!     state = controller
//!         .step(&state, &ControlInput::moving(1.0), &level, 1.0 / 60.0)
//!         .state;
//! }
//! assert!(state.grounded);
//! assert!(state.position.x > 2.0);
//! ```

use bevy::prelude::*;

pub mod backend;
pub mod collision;
pub mod compositor;
pub mod config;
pub mod controller;
pub mod debug;
pub mod error;
pub mod frame;
pub mod gravity;
pub mod integrator;
pub mod intent;
pub mod level;
pub mod resolver;
pub mod state;
pub mod systems;

#[cfg(feature = "rapier2d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::backend::{GeometryProbe, ProbeBackend};
    pub use crate::collision::{ProbeHit, SurfaceFilter};
    pub use crate::config::{
        ActorShape, AirDrag, ControllerConfig, FanSelection, JumpCondition, JumpPolicy,
    };
    pub use crate::controller::{KinematicController, StepOutcome};
    pub use crate::debug::{ProbeGizmosPlugin, ProbeTraces};
    pub use crate::error::ControllerError;
    pub use crate::frame::GroundFrame;
    pub use crate::gravity::{GravityConfig, GravityFrame};
    pub use crate::intent::ControlInput;
    pub use crate::level::{LevelBackend, LevelGeometry};
    pub use crate::state::{
        ActorContacts, ActorState, Airborne, Grounded, SurfaceContact, TouchingWall, WallContact,
    };
    pub use crate::{KinematicActorBundle, KinematicControllerPlugin, KinematicControllerSet};

    #[cfg(feature = "rapier2d")]
    pub use crate::rapier::{Rapier2dActorBundle, Rapier2dBackend};
}

/// System sets of the controller, run in order in `FixedUpdate`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KinematicControllerSet {
    /// Bookkeeping before stepping.
    Preparation,
    /// The backend steps every actor.
    Resolve,
    /// Results are written to transforms and markers.
    Commit,
}

/// Main plugin for the kinematic controller.
///
/// This plugin is generic over a backend `B` which provides the geometry
/// queries the resolver runs against.
///
/// # Type Parameters
/// - `B`: The backend implementation (e.g., [`LevelBackend`](level::LevelBackend))
///
/// # Examples
///
/// With the built-in tile level:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use kinematic_slope_controller::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(KinematicControllerPlugin::<LevelBackend>::default())
///     .insert_resource(LevelGeometry::from_tiles(1.0, &["  ", "##"]))
///     .run();
/// ```
pub struct KinematicControllerPlugin<B: backend::ProbeBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::ProbeBackend> Default for KinematicControllerPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::ProbeBackend> Plugin for KinematicControllerPlugin<B> {
    fn build(&self, app: &mut App) {
        // Register core types
        app.register_type::<controller::KinematicController>();
        app.register_type::<config::ControllerConfig>();
        app.register_type::<config::ActorShape>();
        app.register_type::<gravity::GravityConfig>();
        app.register_type::<intent::ControlInput>();
        app.register_type::<state::ActorState>();
        app.register_type::<state::ActorContacts>();
        app.register_type::<state::Grounded>();
        app.register_type::<state::Airborne>();
        app.register_type::<state::TouchingWall>();
        app.register_type::<debug::ProbeTraces>();

        // Add the backend plugin
        app.add_plugins(B::plugin());

        app.configure_sets(
            FixedUpdate,
            (
                KinematicControllerSet::Preparation,
                KinematicControllerSet::Resolve,
                KinematicControllerSet::Commit,
            )
                .chain(),
        );

        app.add_systems(
            FixedUpdate,
            systems::report_incomplete_actors.in_set(KinematicControllerSet::Preparation),
        );
        app.add_systems(
            FixedUpdate,
            (systems::commit_transforms, systems::sync_state_markers)
                .in_set(KinematicControllerSet::Commit),
        );
    }
}

/// Components needed to simulate an actor.
#[derive(Bundle, Default)]
pub struct KinematicActorBundle {
    /// Tuning and collaborators.
    pub controller: controller::KinematicController,
    /// Runtime state.
    pub state: state::ActorState,
    /// Input snapshot.
    pub input: intent::ControlInput,
    /// Last step's contacts.
    pub contacts: state::ActorContacts,
    /// Pose output.
    pub transform: Transform,
}

impl KinematicActorBundle {
    /// Bundle for an actor spawned at `position`.
    pub fn new(controller: controller::KinematicController, position: Vec2) -> Self {
        Self {
            state: controller.spawn_state(position),
            transform: Transform::from_translation(position.extend(0.0)),
            controller,
            ..default()
        }
    }

    /// Builder: record probe traces for debugging.
    pub fn with_traces(self) -> (Self, debug::ProbeTraces) {
        (self, debug::ProbeTraces::default())
    }
}
