//! Integration tests for the Rapier2D backend.
//!
//! Colliders are registered with Rapier by its own systems, so these tests
//! tick the whole app with a manual clock instead of running the fixed
//! schedule by hand.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_rapier2d::prelude::*;
use kinematic_slope_controller::prelude::*;

/// Create a minimal test app with physics and the kinematic controller.
fn create_test_app() -> App {
    let mut app = App::new();

    app.add_plugins(MinimalPlugins);
    app.add_plugins(TransformPlugin);
    app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default());
    app.add_plugins(KinematicControllerPlugin::<Rapier2dBackend>::default());
    app.insert_resource(Time::<Fixed>::from_hz(60.0));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
        1.0 / 60.0,
    )));

    app.finish();
    app.cleanup();
    app
}

/// Spawn a static box collider.
fn spawn_box(app: &mut App, center: Vec2, half_size: Vec2) -> Entity {
    app.world_mut()
        .spawn((
            Transform::from_translation(center.extend(0.0)),
            RigidBody::Fixed,
            Collider::cuboid(half_size.x, half_size.y),
        ))
        .id()
}

/// Spawn an actor with a Rapier body.
fn spawn_actor(app: &mut App, controller: KinematicController, position: Vec2) -> Entity {
    app.world_mut()
        .spawn((
            KinematicActorBundle::new(controller, position),
            Rapier2dActorBundle::new(&controller.shape),
        ))
        .id()
}

fn state(app: &App, entity: Entity) -> ActorState {
    *app.world().get::<ActorState>(entity).unwrap()
}

fn run_frames(app: &mut App, count: usize) {
    for _ in 0..count {
        app.update();
    }
}

#[test]
fn actor_lands_on_rapier_ground() {
    let mut app = create_test_app();
    spawn_box(&mut app, Vec2::new(0.0, -0.5), Vec2::new(20.0, 0.5));
    let controller = KinematicController {
        config: ControllerConfig::default().starting_airborne(),
        ..default()
    };
    let actor = spawn_actor(&mut app, controller, Vec2::new(0.0, 2.0));

    run_frames(&mut app, 180);

    let state = state(&app, actor);
    assert!(state.grounded);
    assert!((state.position.y - 0.5).abs() < 2e-2);
    assert!(app.world().get::<Grounded>(actor).is_some());
}

#[test]
fn own_collider_does_not_block_probes() {
    let mut app = create_test_app();
    spawn_box(&mut app, Vec2::new(0.0, -0.5), Vec2::new(20.0, 0.5));
    let actor = spawn_actor(&mut app, KinematicController::default(), Vec2::new(0.0, 0.5));

    run_frames(&mut app, 30);

    let state = state(&app, actor);
    assert!(state.grounded);
    assert!(state.position.is_finite());
    assert!((state.position - Vec2::new(0.0, 0.5)).length() < 2e-2);
}

#[test]
fn rapier_wall_stops_actor() {
    let mut app = create_test_app();
    spawn_box(&mut app, Vec2::new(0.0, -0.5), Vec2::new(20.0, 0.5));
    spawn_box(&mut app, Vec2::new(4.0, 2.0), Vec2::new(0.5, 2.0));
    let actor = spawn_actor(&mut app, KinematicController::default(), Vec2::new(0.0, 0.5));
    app.world_mut()
        .get_mut::<ControlInput>(actor)
        .unwrap()
        .set_horizontal(1.0);

    run_frames(&mut app, 240);

    let state = state(&app, actor);
    assert!((state.position.x - 3.0).abs() < 2e-2);
    assert!(app.world().get::<TouchingWall>(actor).is_some_and(TouchingWall::is_right));
}

#[test]
fn sensors_are_ignored() {
    let mut app = create_test_app();
    spawn_box(&mut app, Vec2::new(0.0, -0.5), Vec2::new(20.0, 0.5));
    app.world_mut().spawn((
        Transform::from_xyz(2.0, 1.0, 0.0),
        Collider::cuboid(0.5, 1.0),
        Sensor,
    ));
    let actor = spawn_actor(&mut app, KinematicController::default(), Vec2::new(0.0, 0.5));
    app.world_mut()
        .get_mut::<ControlInput>(actor)
        .unwrap()
        .set_horizontal(1.0);

    run_frames(&mut app, 120);

    assert!(state(&app, actor).position.x > 3.0);
}
