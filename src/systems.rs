//! Core controller systems.
//!
//! The per-actor work is backend-agnostic: a backend's resolve system only
//! builds a [`GeometryProbe`] and calls [`advance_actors`]. The remaining
//! systems mirror the resulting [`ActorState`] onto transforms and marker
//! components.

use bevy::log::error;
use bevy::prelude::*;

use crate::backend::GeometryProbe;
use crate::controller::KinematicController;
use crate::debug::ProbeTraces;
use crate::intent::ControlInput;
use crate::state::{ActorContacts, ActorState, Airborne, Grounded, TouchingWall};

/// Step length used when the fixed clock reports zero, e.g. when the
/// schedule is run by hand before the clock has ticked.
pub const FALLBACK_STEP: f32 = 1.0 / 60.0;

/// Query data read and written by [`advance_actors`].
pub type ActorData = (
    Entity,
    &'static KinematicController,
    &'static mut ActorState,
    Option<&'static ControlInput>,
    Option<&'static mut ActorContacts>,
    Option<&'static mut ProbeTraces>,
);

/// The fixed step length in seconds.
pub fn fixed_dt(time: &Time<Fixed>) -> f32 {
    let dt = time.delta_secs();
    if dt > 0.0 {
        dt
    } else {
        FALLBACK_STEP
    }
}

/// Advance every actor by one step.
///
/// `probe_for` builds the geometry probe used for a given actor, which lets
/// backends exclude the actor's own collider.
pub fn advance_actors<P: GeometryProbe>(
    dt: f32,
    actors: &mut Query<ActorData>,
    mut probe_for: impl FnMut(Entity) -> P,
) {
    for (entity, controller, mut state, input, contacts, traces) in actors.iter_mut() {
        let input = input.copied().unwrap_or_default();
        let outcome = controller.step(&state, &input, probe_for(entity), dt);

        *state = outcome.state;
        if let Some(mut contacts) = contacts {
            *contacts = outcome.contacts;
        }
        if let Some(mut traces) = traces {
            traces.segments = outcome.probes;
        }
    }
}

/// Copy actor poses onto their transforms.
pub fn commit_transforms(mut q_actors: Query<(&ActorState, &mut Transform), Changed<ActorState>>) {
    for (state, mut transform) in &mut q_actors {
        transform.translation.x = state.position.x;
        transform.translation.y = state.position.y;
        transform.rotation = Quat::from_rotation_z(state.angle);
    }
}

/// Sync the [`Grounded`], [`Airborne`] and [`TouchingWall`] markers.
pub fn sync_state_markers(
    mut commands: Commands,
    q_actors: Query<
        (
            Entity,
            &ActorState,
            Option<&ActorContacts>,
            Has<Grounded>,
            Has<Airborne>,
            Option<&TouchingWall>,
        ),
        With<KinematicController>,
    >,
) {
    for (entity, state, contacts, has_grounded, has_airborne, wall) in &q_actors {
        if state.grounded && !has_grounded {
            commands.entity(entity).insert(Grounded).remove::<Airborne>();
        } else if !state.grounded && !has_airborne {
            commands.entity(entity).insert(Airborne).remove::<Grounded>();
        }

        let contact = contacts.and_then(|contacts| contacts.wall);
        match (contact, wall) {
            (Some(contact), _) => {
                let touching = TouchingWall::from(contact);
                if wall.is_none_or(|wall| wall.direction() != touching.direction()) {
                    commands.entity(entity).insert(touching);
                }
            }
            (None, Some(_)) => {
                commands.entity(entity).remove::<TouchingWall>();
            }
            (None, None) => {}
        }
    }
}

/// Log actors that carry [`ActorState`] but cannot be stepped.
pub fn report_incomplete_actors(
    q_added: Query<(Entity, Option<&Name>), (Added<ActorState>, Without<KinematicController>)>,
) {
    for (entity, name) in &q_added {
        match name {
            Some(name) => error!("actor {name} ({entity}) has ActorState but no KinematicController"),
            None => error!("actor {entity} has ActorState but no KinematicController"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_dt_falls_back_before_first_tick() {
        let time = Time::<Fixed>::from_hz(30.0);
        assert_eq!(fixed_dt(&time), FALLBACK_STEP);
    }
}
