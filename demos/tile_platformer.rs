//! Tile platformer demo.
//!
//! A single actor walks over a tile level with ramps, platforms and walls.
//! Probe rays are drawn each step: red for walls, green for floors, blue for
//! ledges, yellow for ceilings and grey for misses.
//!
//! Controls:
//! - A/D or Left/Right: Move
//! - W/Up/Space: Jump
//! - R: Respawn

use bevy::prelude::*;
use kinematic_slope_controller::prelude::*;

// ==================== Constants ====================

/// World units per tile.
const TILE_SIZE: f32 = 1.0;

/// Pixels per world unit.
const PIXELS_PER_UNIT: f32 = 40.0;

/// Fraction of the remaining distance the camera covers each frame.
const CAMERA_EASING: f32 = 0.1;

/// Where the player appears on start and respawn.
const SPAWN_POINT: Vec2 = Vec2::new(3.0, 6.0);

const LEVEL: &[&str] = &[
    "#                                      #",
    "#                                      #",
    "#                        ####          #",
    "#                                      #",
    "#               ###              /#####",
    "#                               /######",
    "#          /##\\        ###     /#######",
    "#         /####\\              /########",
    "#        /######\\            /#########",
    "########################################",
];

// ==================== Main ====================

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Kinematic Slope Controller - Tile Platformer".into(),
                resolution: (1280.0, 720.0).into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(KinematicControllerPlugin::<LevelBackend>::default())
        .add_plugins(ProbeGizmosPlugin)
        .insert_resource(LevelGeometry::from_tiles(TILE_SIZE, LEVEL))
        .add_systems(Startup, setup)
        .add_systems(Update, (handle_input, respawn, camera_follow, draw_level))
        .run();
}

/// Marker for the keyboard-controlled actor.
#[derive(Component)]
struct Player;

fn setup(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        Projection::from(OrthographicProjection {
            scale: 1.0 / PIXELS_PER_UNIT,
            ..OrthographicProjection::default_2d()
        }),
        Transform::from_translation(SPAWN_POINT.extend(0.0)),
    ));

    let controller = KinematicController {
        config: ControllerConfig::player()
            .with_slope_limits_degrees(50.0, 50.0)
            .starting_airborne(),
        ..default()
    };
    let size = Vec2::splat(controller.shape.half_width * 2.0);

    let (bundle, traces) = KinematicActorBundle::new(controller, SPAWN_POINT).with_traces();
    commands.spawn((
        Player,
        Name::new("Player"),
        bundle,
        traces,
        Sprite::from_color(Color::srgb(0.9, 0.7, 0.2), size),
    ));
}

// ==================== Input ====================

/// Writes keyboard state into the player's [`ControlInput`].
///
/// Jump forwards the held state; the controller launches once per press.
fn handle_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut query: Query<&mut ControlInput, With<Player>>,
) {
    for mut input in &mut query {
        let mut horizontal = 0.0;
        if keyboard.pressed(KeyCode::KeyA) || keyboard.pressed(KeyCode::ArrowLeft) {
            horizontal -= 1.0;
        }
        if keyboard.pressed(KeyCode::KeyD) || keyboard.pressed(KeyCode::ArrowRight) {
            horizontal += 1.0;
        }
        input.set_horizontal(horizontal);

        let jump = keyboard.any_pressed([KeyCode::KeyW, KeyCode::ArrowUp, KeyCode::Space]);
        input.set_jump_held(jump);
    }
}

fn respawn(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut query: Query<(&KinematicController, &mut ActorState), With<Player>>,
) {
    if !keyboard.just_pressed(KeyCode::KeyR) {
        return;
    }
    for (controller, mut state) in &mut query {
        *state = controller.spawn_state(SPAWN_POINT);
    }
}

// ==================== Rendering ====================

/// Eases the camera toward the player.
fn camera_follow(
    player: Query<&Transform, (With<Player>, Without<Camera2d>)>,
    mut camera: Query<&mut Transform, With<Camera2d>>,
) {
    let (Ok(player), Ok(mut camera)) = (player.single(), camera.single_mut()) else {
        return;
    };
    let eased = camera.translation.xy().lerp(player.translation.xy(), CAMERA_EASING);
    camera.translation = eased.extend(camera.translation.z);
}

fn draw_level(mut gizmos: Gizmos, level: Res<LevelGeometry>) {
    for segment in level.segments() {
        gizmos.line_2d(segment.start, segment.end, Color::srgb(0.8, 0.8, 0.85));
    }
}
