//! Built-in tile level geometry.
//!
//! [`LevelGeometry`] is a set of line segments with collision layers. It can
//! be built from ASCII tile rows or from explicit segments and ramps, and it
//! answers probe casts exactly. [`LevelBackend`] runs the controller against
//! the level stored as a resource, with no physics engine involved.

use bevy::prelude::*;

use crate::backend::{GeometryProbe, ProbeBackend};
use crate::collision::{ProbeHit, SurfaceFilter};
use crate::systems::{self, ActorData};
use crate::KinematicControllerSet;

/// Layer bit of surfaces built from tiles and by the `add_*` helpers.
pub const TILE_LAYER: u32 = 1;

/// One collidable line segment.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct LevelSegment {
    /// First endpoint.
    pub start: Vec2,
    /// Second endpoint.
    pub end: Vec2,
    /// Layer bits tested against [`SurfaceFilter`].
    pub layers: u32,
}

impl LevelSegment {
    /// Nearest intersection of a ray with this segment.
    ///
    /// Segments are two-sided: the returned normal always faces the ray.
    /// Rays parallel to the segment never hit.
    pub fn raycast(&self, origin: Vec2, direction: Dir2, max_distance: f32) -> Option<ProbeHit> {
        const EDGE_TOLERANCE: f32 = 1e-5;

        let direction = direction.as_vec2();
        let edge = self.end - self.start;
        let denom = direction.perp_dot(edge);
        if denom.abs() < 1e-9 {
            return None;
        }

        let to_start = self.start - origin;
        let distance = to_start.perp_dot(edge) / denom;
        let along = to_start.perp_dot(direction) / denom;
        if !(0.0..=max_distance).contains(&distance)
            || !(-EDGE_TOLERANCE..=1.0 + EDGE_TOLERANCE).contains(&along)
        {
            return None;
        }

        let mut normal = edge.perp();
        if normal.dot(direction) > 0.0 {
            normal = -normal;
        }
        ProbeHit::new(distance, normal, origin + direction * distance, None)
    }
}

/// Collidable level made of line segments.
///
/// # Example
///
/// ```rust
/// use kinematic_slope_controller::prelude::*;
///
/// // Top row first. `/` and `\` are 45 degree ramps.
/// let level = LevelGeometry::from_tiles(1.0, &[
///     "        ",
///     "   /##\\ ",
///     "########",
/// ]);
/// assert!(!level.segments().is_empty());
/// ```
#[derive(Resource, Reflect, Debug, Clone, Default)]
#[reflect(Resource)]
pub struct LevelGeometry {
    segments: Vec<LevelSegment>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Tile {
    Empty,
    Solid,
    /// Rises to the right: solid below the diagonal, against the right edge.
    RampUp,
    /// Falls to the right: solid below the diagonal, against the left edge.
    RampDown,
}

#[derive(Clone, Copy)]
enum Face {
    Top,
    Bottom,
    Left,
    Right,
}

impl Tile {
    fn parse(c: char) -> Self {
        match c {
            '#' => Tile::Solid,
            '/' => Tile::RampUp,
            '\\' => Tile::RampDown,
            _ => Tile::Empty,
        }
    }

    fn full_face(self, face: Face) -> bool {
        match (self, face) {
            (Tile::Solid, _) => true,
            (Tile::RampUp, Face::Bottom | Face::Right) => true,
            (Tile::RampDown, Face::Bottom | Face::Left) => true,
            _ => false,
        }
    }
}

impl LevelGeometry {
    /// Create an empty level.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a level from ASCII rows, top row first.
    ///
    /// `#` is a solid tile, `/` a ramp rising to the right and `\` a ramp
    /// falling to the right. Anything else is empty. The bottom-left corner
    /// of the last row sits at the origin. Faces shared by two solid tiles
    /// are skipped, so probes only ever see the outline.
    pub fn from_tiles(tile_size: f32, rows: &[&str]) -> Self {
        let grid: Vec<Vec<Tile>> = rows
            .iter()
            .map(|row| row.chars().map(Tile::parse).collect())
            .collect();
        let height = grid.len();
        let tile_at = |column: isize, row: isize| -> Tile {
            if column < 0 || row < 0 {
                return Tile::Empty;
            }
            grid.get(row as usize)
                .and_then(|cells| cells.get(column as usize))
                .copied()
                .unwrap_or(Tile::Empty)
        };

        let mut level = Self::new();
        for (row, cells) in grid.iter().enumerate() {
            for (column, &tile) in cells.iter().enumerate() {
                if tile == Tile::Empty {
                    continue;
                }
                let (c, r) = (column as isize, row as isize);
                let min = Vec2::new(column as f32, (height - 1 - row) as f32) * tile_size;
                let max = min + Vec2::splat(tile_size);
                let corners = [
                    (Face::Top, tile_at(c, r - 1), Face::Bottom, Vec2::new(min.x, max.y), max),
                    (Face::Bottom, tile_at(c, r + 1), Face::Top, min, Vec2::new(max.x, min.y)),
                    (Face::Left, tile_at(c - 1, r), Face::Right, min, Vec2::new(min.x, max.y)),
                    (Face::Right, tile_at(c + 1, r), Face::Left, Vec2::new(max.x, min.y), max),
                ];
                for (face, neighbour, opposite, start, end) in corners {
                    if tile.full_face(face) && !neighbour.full_face(opposite) {
                        level.add_segment(start, end);
                    }
                }
                match tile {
                    Tile::RampUp => {
                        level.add_segment(min, max);
                    }
                    Tile::RampDown => {
                        level.add_segment(Vec2::new(min.x, max.y), Vec2::new(max.x, min.y));
                    }
                    Tile::Solid | Tile::Empty => {}
                }
            }
        }
        level
    }

    /// Add a segment on [`TILE_LAYER`].
    pub fn add_segment(&mut self, start: Vec2, end: Vec2) -> &mut Self {
        self.add_segment_on_layers(start, end, TILE_LAYER)
    }

    /// Add a segment on the given layers.
    pub fn add_segment_on_layers(&mut self, start: Vec2, end: Vec2, layers: u32) -> &mut Self {
        if start.is_finite() && end.is_finite() && start != end {
            self.segments.push(LevelSegment { start, end, layers });
        }
        self
    }

    /// Add a straight ramp from `start` at `angle` radians for `length` units.
    pub fn add_ramp(&mut self, start: Vec2, angle: f32, length: f32) -> &mut Self {
        let end = start + Vec2::from_angle(angle) * length;
        self.add_segment(start, end)
    }

    /// All segments.
    pub fn segments(&self) -> &[LevelSegment] {
        &self.segments
    }

    /// Remove every segment.
    pub fn clear(&mut self) {
        self.segments.clear();
    }
}

impl GeometryProbe for LevelGeometry {
    fn cast(
        &self,
        origin: Vec2,
        direction: Dir2,
        max_distance: f32,
        filter: SurfaceFilter,
    ) -> Option<ProbeHit> {
        self.segments
            .iter()
            .filter(|segment| filter.accepts(segment.layers))
            .filter_map(|segment| segment.raycast(origin, direction, max_distance))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

/// Backend running actors against the [`LevelGeometry`] resource.
///
/// # Example
///
/// ```rust,no_run
/// use bevy::prelude::*;
/// use kinematic_slope_controller::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(KinematicControllerPlugin::<LevelBackend>::default())
///     .insert_resource(LevelGeometry::from_tiles(1.0, &["#####"]))
///     .run();
/// ```
pub struct LevelBackend;

impl ProbeBackend for LevelBackend {
    fn plugin() -> impl Plugin {
        LevelBackendPlugin
    }
}

struct LevelBackendPlugin;

impl Plugin for LevelBackendPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<LevelGeometry>();
        app.init_resource::<LevelGeometry>();
        app.add_systems(
            FixedUpdate,
            advance_level_actors.in_set(KinematicControllerSet::Resolve),
        );
    }
}

fn advance_level_actors(
    time: Res<Time<Fixed>>,
    level: Res<LevelGeometry>,
    mut actors: Query<ActorData>,
) {
    let level = level.as_ref();
    systems::advance_actors(systems::fixed_dt(&time), &mut actors, |_| level);
}
