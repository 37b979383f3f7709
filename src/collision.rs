//! Probe result structures.
//!
//! These structures hold the results of geometry probes (raycasts) used
//! for wall, floor and ledge detection.

use bevy::prelude::*;

/// A surface hit returned by a geometry probe.
///
/// A `ProbeHit` can only be built through [`ProbeHit::new`], which rejects
/// degenerate results: negative or non-finite distances, non-finite points
/// and zero or NaN normals. "No hit" is always `Option::None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeHit {
    /// Distance from the probe origin to the hit point.
    pub distance: f32,
    /// Outward surface normal at the hit point.
    pub normal: Dir2,
    /// World position of the hit point.
    pub point: Vec2,
    /// Entity that was hit (if any).
    pub entity: Option<Entity>,
}

impl ProbeHit {
    /// Create a validated hit.
    ///
    /// The normal is normalized. Returns `None` when the result would carry
    /// NaN or a zero-length normal into the resolver.
    pub fn new(distance: f32, normal: Vec2, point: Vec2, entity: Option<Entity>) -> Option<Self> {
        if !distance.is_finite() || distance < 0.0 || !point.is_finite() {
            return None;
        }
        let normal = Dir2::new(normal).ok()?;
        Some(Self {
            distance,
            normal,
            point,
            entity,
        })
    }

    /// The normal as a plain vector.
    #[inline]
    pub fn normal_vec(&self) -> Vec2 {
        self.normal.as_vec2()
    }
}

/// Collision-group filter applied to every probe.
///
/// A surface is collidable when its layer bits intersect `filters`.
/// `memberships` describes the actor itself and is forwarded to backends
/// that support two-way group checks.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceFilter {
    /// Groups the probing actor belongs to.
    pub memberships: u32,
    /// Groups the probes are allowed to hit.
    pub filters: u32,
}

impl Default for SurfaceFilter {
    fn default() -> Self {
        Self::ALL
    }
}

impl SurfaceFilter {
    /// Hit everything.
    pub const ALL: Self = Self {
        memberships: u32::MAX,
        filters: u32::MAX,
    };

    /// Create a filter from explicit group bits.
    pub const fn new(memberships: u32, filters: u32) -> Self {
        Self {
            memberships,
            filters,
        }
    }

    /// Only hit surfaces on the given layers.
    pub const fn only(layers: u32) -> Self {
        Self {
            memberships: u32::MAX,
            filters: layers,
        }
    }

    /// Whether a surface on `layers` passes this filter.
    #[inline]
    pub fn accepts(&self, layers: u32) -> bool {
        self.filters & layers != 0
    }
}
