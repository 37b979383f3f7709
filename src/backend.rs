//! Geometry probe abstraction.
//!
//! The controller never talks to a physics engine directly. Ray queries
//! against level geometry go through [`GeometryProbe`], and engine
//! integration goes through [`ProbeBackend`]. This allows easy swapping
//! between physics engines (Rapier2D, the built-in tile level, custom).

use bevy::prelude::*;

use crate::collision::{ProbeHit, SurfaceFilter};

/// The geometry probe service consumed by the collision resolver.
///
/// Implementations must return the *nearest* surface along the ray that
/// passes `filter`, with `distance` measured from `origin`. Returning a
/// hit farther than `max_distance` is a contract violation.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use kinematic_slope_controller::prelude::*;
///
/// let mut level = LevelGeometry::new();
/// level.add_segment(Vec2::new(-10.0, 0.0), Vec2::new(10.0, 0.0));
///
/// let hit = level
///     .cast(Vec2::new(0.0, 1.0), Dir2::NEG_Y, 5.0, SurfaceFilter::ALL)
///     .unwrap();
/// assert!((hit.distance - 1.0).abs() < 1e-5);
/// ```
pub trait GeometryProbe {
    /// Cast a ray and return the nearest qualifying hit.
    fn cast(
        &self,
        origin: Vec2,
        direction: Dir2,
        max_distance: f32,
        filter: SurfaceFilter,
    ) -> Option<ProbeHit>;
}

impl<P: GeometryProbe + ?Sized> GeometryProbe for &P {
    fn cast(
        &self,
        origin: Vec2,
        direction: Dir2,
        max_distance: f32,
        filter: SurfaceFilter,
    ) -> Option<ProbeHit> {
        (**self).cast(origin, direction, max_distance, filter)
    }
}

/// Adapter that turns a closure into a [`GeometryProbe`].
///
/// Backends whose query context only lives inside a system use this to
/// capture it by reference.
pub struct ProbeFn<F>(pub F);

impl<F> GeometryProbe for ProbeFn<F>
where
    F: Fn(Vec2, Dir2, f32, SurfaceFilter) -> Option<ProbeHit>,
{
    fn cast(
        &self,
        origin: Vec2,
        direction: Dir2,
        max_distance: f32,
        filter: SurfaceFilter,
    ) -> Option<ProbeHit> {
        (self.0)(origin, direction, max_distance, filter)
    }
}

/// Trait for engine backends.
///
/// A backend contributes a plugin that adds a system to
/// [`KinematicControllerSet::Resolve`](crate::KinematicControllerSet::Resolve).
/// That system builds a [`GeometryProbe`] over the backend's own query
/// context and hands it to [`advance_actors`](crate::systems::advance_actors).
///
/// For example implementations, see [`LevelBackend`](crate::level::LevelBackend)
/// and the `rapier` module's `Rapier2dBackend`.
pub trait ProbeBackend: 'static + Send + Sync {
    /// Returns the plugin that sets up this backend.
    fn plugin() -> impl Plugin;
}

/// Helper struct describing a single probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeRequest {
    /// Origin point of the ray.
    pub origin: Vec2,
    /// Direction of the ray.
    pub direction: Dir2,
    /// Maximum distance to cast.
    pub max_distance: f32,
}

impl ProbeRequest {
    /// Create a new probe request.
    ///
    /// Returns `None` when `direction` cannot be normalized or the distance
    /// is not a finite non-negative number, so degenerate probes are skipped
    /// instead of being cast.
    pub fn new(origin: Vec2, direction: Vec2, max_distance: f32) -> Option<Self> {
        if !origin.is_finite() || !max_distance.is_finite() || max_distance < 0.0 {
            return None;
        }
        let direction = Dir2::new(direction).ok()?;
        Some(Self {
            origin,
            direction,
            max_distance,
        })
    }

    /// End point of the full ray.
    pub fn end(&self) -> Vec2 {
        self.origin + self.direction * self.max_distance
    }

    /// Run this request against a probe service.
    pub fn cast(&self, probe: &impl GeometryProbe, filter: SurfaceFilter) -> Option<ProbeHit> {
        probe
            .cast(self.origin, self.direction, self.max_distance, filter)
            .filter(|hit| hit.distance <= self.max_distance + f32::EPSILON)
    }
}
