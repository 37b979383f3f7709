//! Probe diagnostics.
//!
//! Actors carrying [`ProbeTraces`] record every probe cast during their last
//! step. [`ProbeGizmosPlugin`] draws them; it is not part of
//! [`KinematicControllerPlugin`](crate::KinematicControllerPlugin) and must be
//! added explicitly.

use bevy::prelude::*;

use crate::backend::ProbeRequest;
use crate::KinematicControllerSet;

/// Which check cast a probe.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    /// Side probe of the wall fan.
    Wall,
    /// Probe along the velocity (floors, uphill slopes, landings).
    Floor,
    /// Downward probe ahead of the actor (downhill slopes, ledges).
    Ledge,
    /// Upward probe of the ceiling fan, cast only while rising.
    Ceiling,
}

/// A single recorded probe.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct ProbeSegment {
    /// Check that cast this probe.
    pub kind: ProbeKind,
    /// Ray origin.
    pub origin: Vec2,
    /// Unit direction.
    pub direction: Vec2,
    /// Cast length.
    pub length: f32,
    /// Distance to the hit, if any.
    pub hit: Option<f32>,
}

impl ProbeSegment {
    /// Record a request and its result.
    pub fn new(kind: ProbeKind, request: &ProbeRequest, hit: Option<f32>) -> Self {
        Self {
            kind,
            origin: request.origin,
            direction: request.direction.as_vec2(),
            length: request.max_distance,
            hit,
        }
    }

    /// End of the drawn segment: the hit point, or the end of the ray.
    pub fn end(&self) -> Vec2 {
        self.origin + self.direction * self.hit.unwrap_or(self.length)
    }
}

/// Probes cast during the actor's last step.
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
pub struct ProbeTraces {
    /// Probes in cast order.
    pub segments: Vec<ProbeSegment>,
}

impl ProbeTraces {
    /// Number of recorded probes that hit something.
    pub fn hit_count(&self) -> usize {
        self.segments.iter().filter(|s| s.hit.is_some()).count()
    }
}

/// Draws [`ProbeTraces`] with gizmos.
pub struct ProbeGizmosPlugin;

impl Plugin for ProbeGizmosPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            draw_probe_traces.after(KinematicControllerSet::Commit),
        );
    }
}

fn draw_probe_traces(mut gizmos: Gizmos, actors: Query<&ProbeTraces>) {
    for traces in &actors {
        for segment in &traces.segments {
            let color = match (segment.kind, segment.hit.is_some()) {
                (_, false) => Color::srgba(0.6, 0.6, 0.6, 0.5),
                (ProbeKind::Wall, true) => Color::srgb(1.0, 0.3, 0.2),
                (ProbeKind::Floor, true) => Color::srgb(0.2, 0.9, 0.3),
                (ProbeKind::Ledge, true) => Color::srgb(0.3, 0.5, 1.0),
                (ProbeKind::Ceiling, true) => Color::srgb(1.0, 0.8, 0.2),
            };
            gizmos.line_2d(segment.origin, segment.end(), color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_ends_at_hit() {
        let request = ProbeRequest::new(Vec2::ZERO, Vec2::X, 2.0).unwrap();
        let missed = ProbeSegment::new(ProbeKind::Wall, &request, None);
        assert_eq!(missed.end(), Vec2::new(2.0, 0.0));

        let hit = ProbeSegment::new(ProbeKind::Wall, &request, Some(0.5));
        assert_eq!(hit.end(), Vec2::new(0.5, 0.0));
    }

    #[test]
    fn counts_hits() {
        let request = ProbeRequest::new(Vec2::ZERO, Vec2::NEG_Y, 1.0).unwrap();
        let traces = ProbeTraces {
            segments: vec![
                ProbeSegment::new(ProbeKind::Floor, &request, Some(0.1)),
                ProbeSegment::new(ProbeKind::Ledge, &request, None),
            ],
        };
        assert_eq!(traces.hit_count(), 1);
    }
}
