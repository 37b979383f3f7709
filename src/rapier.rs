//! Rapier2D backend implementation.
//!
//! This module runs the controller against colliders registered with Bevy
//! Rapier2D. Rapier only answers ray queries here: actors carry a
//! kinematic position-based body and are moved by the controller, never by
//! Rapier's solver. Enable with the `rapier2d` feature.

use bevy::prelude::*;
use bevy_rapier2d::geometry::Group;
use bevy_rapier2d::prelude::*;

use crate::backend::{ProbeBackend, ProbeFn};
use crate::collision::{ProbeHit, SurfaceFilter};
use crate::config::ActorShape;
use crate::systems::{self, ActorData};
use crate::KinematicControllerSet;

/// Rapier2D backend for the kinematic controller.
///
/// Probes are ray casts through `RapierContext`. Each actor's own rigid
/// body and every sensor are excluded, and [`SurfaceFilter`] is applied as
/// Rapier collision groups.
pub struct Rapier2dBackend;

impl ProbeBackend for Rapier2dBackend {
    fn plugin() -> impl Plugin {
        Rapier2dBackendPlugin
    }
}

/// Plugin that sets up the Rapier2D resolve system.
pub struct Rapier2dBackendPlugin;

impl Plugin for Rapier2dBackendPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            rapier_advance_actors.in_set(KinematicControllerSet::Resolve),
        );
    }
}

/// Convert a [`SurfaceFilter`] into Rapier collision groups.
pub fn collision_groups(filter: SurfaceFilter) -> CollisionGroups {
    CollisionGroups::new(
        Group::from_bits_truncate(filter.memberships),
        Group::from_bits_truncate(filter.filters),
    )
}

/// Perform a raycast using RapierContext.
///
/// Rays starting inside a collider report a zero normal, which
/// [`ProbeHit::new`] rejects, so they count as no hit.
fn rapier_raycast(
    context: &RapierContext,
    origin: Vec2,
    direction: Dir2,
    max_distance: f32,
    exclude_entity: Entity,
    filter: SurfaceFilter,
) -> Option<ProbeHit> {
    let query_filter = QueryFilter::default()
        .exclude_rigid_body(exclude_entity)
        .exclude_sensors()
        .groups(collision_groups(filter));

    context
        .cast_ray_and_get_normal(
            origin,
            direction.as_vec2(),
            max_distance,
            true,
            query_filter,
        )
        .and_then(|(hit_entity, hit)| {
            ProbeHit::new(hit.time_of_impact, hit.normal, hit.point, Some(hit_entity))
        })
}

fn rapier_advance_actors(
    time: Res<Time<Fixed>>,
    rapier_context: ReadRapierContext,
    mut actors: Query<ActorData>,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };
    let context = &context;

    systems::advance_actors(systems::fixed_dt(&time), &mut actors, |entity| {
        ProbeFn(
            move |origin: Vec2, direction: Dir2, max_distance: f32, filter: SurfaceFilter| {
                rapier_raycast(context, origin, direction, max_distance, entity, filter)
            },
        )
    });
}

/// Bundle for creating an actor with Rapier2D physics.
///
/// The body is kinematic and position-based, so Rapier follows the
/// transform the controller writes. The collider lets other bodies collide
/// with the actor; the actor's own probes ignore it.
///
/// # Example
///
/// ```ignore
/// use bevy::prelude::*;
/// use kinematic_slope_controller::prelude::*;
///
/// fn spawn_player(mut commands: Commands) {
///     let controller = KinematicController::default();
///     commands.spawn((
///         KinematicActorBundle::new(controller, Vec2::new(0.0, 3.0)),
///         Rapier2dActorBundle::new(&controller.shape),
///     ));
/// }
/// ```
#[derive(Bundle)]
pub struct Rapier2dActorBundle {
    /// The rigid body type. Should stay [`RigidBody::KinematicPositionBased`].
    pub rigid_body: RigidBody,
    /// Collision shape seen by other bodies.
    pub collider: Collider,
    /// Axis locks. Rotation is driven by the ground angle, not by Rapier.
    pub locked_axes: LockedAxes,
}

impl Default for Rapier2dActorBundle {
    fn default() -> Self {
        Self::new(&ActorShape::default())
    }
}

impl Rapier2dActorBundle {
    /// Bundle with a ball collider matching the actor's half-width.
    pub fn new(shape: &ActorShape) -> Self {
        Self {
            rigid_body: RigidBody::KinematicPositionBased,
            collider: Collider::ball(shape.half_width),
            locked_axes: LockedAxes::ROTATION_LOCKED,
        }
    }

    /// Replace the collider.
    pub fn with_collider(mut self, collider: Collider) -> Self {
        self.collider = collider;
        self
    }
}
