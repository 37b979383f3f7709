//! Collision resolution.
//!
//! The resolver casts four groups of probes from the actor, in a fixed
//! order, and folds each result into the motion before the next group runs:
//!
//! 1. **Walls**: a fan of side probes along local right and local left.
//! 2. **Ceiling**: a fan of probes along local up, only while rising.
//! 3. **Concave**: one probe along the full step velocity from just above
//!    the actor's bottom. This catches floors, uphill slopes and landings.
//! 4. **Convex**: one probe downward from where the actor will be after this
//!    step's travel. This keeps a grounded actor glued to terrain curving
//!    away underneath it and detects walking off ledges.
//!
//! Every hit is classified against the current ground angle with
//! [`classify`]. Degenerate probes and hits are skipped, never propagated.

use std::f32::consts::FRAC_PI_2;

use bevy::log::{debug, trace};
use bevy::prelude::*;

use crate::backend::{GeometryProbe, ProbeRequest};
use crate::collision::ProbeHit;
use crate::config::{within_limit, ActorShape, ControllerConfig, FanSelection};
use crate::debug::{ProbeKind, ProbeSegment};
use crate::frame::{wrap_angle, GroundFrame};
use crate::state::{SurfaceContact, WallContact};

/// Terrain class of a probe hit relative to the actor's ground frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terrain {
    /// Too steep to walk onto: blocks motion.
    Wall,
    /// Level or curving upward (concave) within the climb limit.
    Floor,
    /// Curving downward (convex) within the descend limit.
    Ledge,
    /// Nothing to stand on: no hit, or terrain falling away too steeply.
    None,
}

impl Terrain {
    /// Whether the actor can stand on this terrain.
    pub fn is_walkable(self) -> bool {
        matches!(self, Terrain::Floor | Terrain::Ledge)
    }
}

/// Classify a surface by its signed angle relative to the ground frame.
///
/// `heading` is the sign of motion along local right (zero counts as
/// rightward). A positive `delta` while heading right is an upward turn.
pub fn classify(delta: f32, heading: f32, config: &ControllerConfig) -> Terrain {
    let delta = wrap_angle(delta);
    if delta.abs() >= FRAC_PI_2 {
        return Terrain::Wall;
    }
    let relative = if heading < 0.0 { -delta } else { delta };
    if relative >= 0.0 {
        if within_limit(delta, config.max_climb_angle) {
            Terrain::Floor
        } else {
            Terrain::Wall
        }
    } else if within_limit(delta, config.max_descend_angle) {
        Terrain::Ledge
    } else {
        Terrain::None
    }
}

/// Classify an optional hit. Missing or degenerate hits are [`Terrain::None`].
pub fn classify_hit(
    hit: Option<&ProbeHit>,
    frame: &GroundFrame,
    heading: f32,
    config: &ControllerConfig,
) -> Terrain {
    hit.and_then(|hit| frame.angle_to_surface(hit.normal_vec()))
        .map_or(Terrain::None, |delta| classify(delta, heading, config))
}

/// Kinematic quantities the resolver reads and corrects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    /// Actor center.
    pub position: Vec2,
    /// World-space velocity for this step.
    pub velocity: Vec2,
    /// Ground angle (radians).
    pub angle: f32,
    /// Grounded flag.
    pub grounded: bool,
}

/// Output of [`CollisionResolver::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Corrected motion. `position` includes `correction`.
    pub motion: Motion,
    /// Sum of all position corrections applied by the checks.
    pub correction: Vec2,
    /// Ground the actor ended on.
    pub floor: Option<SurfaceContact>,
    /// Wall that stopped the actor.
    pub wall: Option<WallContact>,
    /// Overhead surface that stopped the actor rising.
    pub ceiling: Option<WallContact>,
    /// Every probe cast, in order.
    pub probes: Vec<ProbeSegment>,
}

impl Resolution {
    fn new(motion: Motion) -> Self {
        Self {
            motion,
            correction: Vec2::ZERO,
            floor: None,
            wall: None,
            ceiling: None,
            probes: Vec::new(),
        }
    }

    fn shift(&mut self, offset: Vec2) {
        self.motion.position += offset;
        self.correction += offset;
    }
}

/// Raycast collision resolver for one step.
pub struct CollisionResolver<'a, P: GeometryProbe> {
    config: &'a ControllerConfig,
    shape: &'a ActorShape,
    probe: P,
    dt: f32,
}

impl<'a, P: GeometryProbe> CollisionResolver<'a, P> {
    /// Create a resolver for a step of `dt` seconds.
    pub fn new(config: &'a ControllerConfig, shape: &'a ActorShape, probe: P, dt: f32) -> Self {
        Self {
            config,
            shape,
            probe,
            dt,
        }
    }

    /// Run wall, ceiling, concave and convex checks in order.
    pub fn resolve(&self, motion: Motion) -> Resolution {
        let mut resolution = Resolution::new(motion);

        self.check_walls(&mut resolution);
        self.check_ceiling(&mut resolution);
        let landed = self.check_concave(&mut resolution);
        if !landed && resolution.motion.grounded {
            self.check_convex(&mut resolution);
        }

        if !resolution.motion.grounded {
            resolution.motion.angle = 0.0;
            resolution.floor = None;
        }
        resolution
    }

    /// Offsets of the probe fan across the actor, bottom (or left) first.
    ///
    /// Wall fans spread these along local up, the ceiling fan along local
    /// right.
    pub fn fan_offsets(&self) -> impl Iterator<Item = f32> {
        let count = self.config.ray_count.max(1);
        let extent = (self.shape.half_width - self.shape.skin_width).max(0.0);
        (0..count).map(move |index| {
            if count == 1 {
                0.0
            } else {
                -extent + 2.0 * extent * index as f32 / (count - 1) as f32
            }
        })
    }

    /// Fold a qualifying fan hit into `chosen`. Returns true once the choice
    /// is final.
    fn choose(&self, chosen: &mut Option<ProbeHit>, hit: ProbeHit) -> bool {
        match self.config.fan_selection {
            FanSelection::FirstHit => {
                *chosen = Some(hit);
                true
            }
            FanSelection::Nearest => {
                if chosen.as_ref().is_none_or(|best| hit.distance < best.distance) {
                    *chosen = Some(hit);
                }
                false
            }
        }
    }

    fn cast(
        &self,
        resolution: &mut Resolution,
        kind: ProbeKind,
        origin: Vec2,
        direction: Vec2,
        length: f32,
    ) -> Option<ProbeHit> {
        let request = ProbeRequest::new(origin, direction, length)?;
        let hit = request.cast(&self.probe, self.config.surface_filter);
        trace!(
            "{kind:?} probe from {origin} along {direction} ({length}): {:?}",
            hit.map(|h| h.distance)
        );
        resolution
            .probes
            .push(ProbeSegment::new(kind, &request, hit.map(|h| h.distance)));
        hit
    }

    // ==================== Walls ====================

    fn check_walls(&self, resolution: &mut Resolution) {
        let frame = GroundFrame::new(resolution.motion.angle);
        for side in [frame.right(), frame.left()] {
            let toward = resolution.motion.velocity.dot(side);
            if toward < 0.0 {
                continue;
            }
            let heading = side.dot(frame.right());
            let reach = self.shape.margin + toward * self.dt;
            let base = resolution.motion.position + side * (self.shape.half_width - self.shape.margin);

            let mut chosen: Option<ProbeHit> = None;
            for offset in self.fan_offsets() {
                let origin = base + frame.up() * offset;
                let hit = self.cast(resolution, ProbeKind::Wall, origin, side, reach);
                if classify_hit(hit.as_ref(), &frame, heading, self.config) != Terrain::Wall {
                    continue;
                }
                let Some(hit) = hit else { continue };
                if self.choose(&mut chosen, hit) {
                    break;
                }
            }

            if let Some(hit) = chosen {
                let normal = hit.normal_vec();
                resolution.motion.velocity = slide_off(resolution.motion.velocity, side, normal);
                resolution.shift(side * (hit.distance - self.shape.margin));
                resolution.wall = Some(WallContact {
                    direction: side,
                    normal,
                    distance: hit.distance,
                });
                debug!("wall contact toward {side} at {}", hit.distance);
            }
        }
    }

    // ==================== Ceiling ====================

    fn check_ceiling(&self, resolution: &mut Resolution) {
        let frame = GroundFrame::new(resolution.motion.angle);
        let up = frame.up();
        let rising = resolution.motion.velocity.dot(up);
        if rising <= 0.0 {
            return;
        }
        let heading = heading(resolution.motion.velocity, &frame);
        let reach = self.shape.margin + rising * self.dt;
        let base = resolution.motion.position + up * (self.shape.half_width - self.shape.margin);

        let mut chosen: Option<ProbeHit> = None;
        for offset in self.fan_offsets() {
            let origin = base + frame.right() * offset;
            let hit = self.cast(resolution, ProbeKind::Ceiling, origin, up, reach);
            if classify_hit(hit.as_ref(), &frame, heading, self.config) != Terrain::Wall {
                continue;
            }
            let Some(hit) = hit else { continue };
            if self.choose(&mut chosen, hit) {
                break;
            }
        }

        if let Some(hit) = chosen {
            resolution.motion.velocity -= up * rising;
            resolution.shift(up * (hit.distance - self.shape.margin));
            resolution.ceiling = Some(WallContact {
                direction: up,
                normal: hit.normal_vec(),
                distance: hit.distance,
            });
            debug!("ceiling contact at {}", hit.distance);
        }
    }

    // ==================== Concave ====================

    /// Returns true when the actor ends grounded on the hit surface.
    fn check_concave(&self, resolution: &mut Resolution) -> bool {
        let frame = GroundFrame::new(resolution.motion.angle);
        let velocity = resolution.motion.velocity;
        let bottom = resolution.motion.position + frame.down() * self.shape.half_width;
        let origin = bottom + frame.up() * self.shape.skin_width;
        let reach = velocity.length() * self.dt + self.shape.skin_width;

        let Some(hit) = self.cast(resolution, ProbeKind::Floor, origin, velocity, reach) else {
            return false;
        };
        let heading = heading(velocity, &frame);
        match classify_hit(Some(&hit), &frame, heading, self.config) {
            Terrain::Floor | Terrain::Ledge => {
                let normal = hit.normal_vec();
                resolution.motion.velocity = velocity - normal * velocity.dot(normal);
                self.settle(resolution, &hit, bottom);
                true
            }
            Terrain::Wall | Terrain::None => {
                // Angle reverts, no correction.
                resolution.motion.velocity = reject(velocity, &frame, hit.normal_vec());
                trace!("concave probe rejected surface {}", hit.normal_vec());
                false
            }
        }
    }

    // ==================== Convex ====================

    fn check_convex(&self, resolution: &mut Resolution) {
        let frame = GroundFrame::new(resolution.motion.angle);
        let velocity = resolution.motion.velocity;
        let along = velocity.dot(frame.right());
        let travel = frame.right() * along * self.dt;

        let bottom = resolution.motion.position + frame.down() * self.shape.half_width;
        let origin = bottom + travel + frame.up() * self.shape.skin_width;
        let drop = along.abs() * self.dt * self.config.max_descend_angle.tan();
        let reach = 2.0 * self.shape.skin_width + drop;

        let hit = self
            .cast(resolution, ProbeKind::Ledge, origin, frame.down(), reach)
            .filter(|hit| hit.distance > 0.0);
        let terrain = classify_hit(hit.as_ref(), &frame, heading(velocity, &frame), self.config);

        match hit {
            Some(hit) if terrain.is_walkable() => {
                let Some(surface) = GroundFrame::from_normal(hit.normal_vec()) else {
                    return;
                };
                // Follow the surface without losing ground-speed.
                resolution.motion.velocity = surface.right() * along;
                self.settle(resolution, &hit, bottom);
            }
            _ => {
                resolution.motion.grounded = false;
                debug!("left ground ({terrain:?} below)");
            }
        }
    }

    /// Snap the contact point onto `hit` and adopt its angle.
    fn settle(&self, resolution: &mut Resolution, hit: &ProbeHit, bottom: Vec2) {
        let normal = hit.normal_vec();
        let Some(frame) = GroundFrame::from_normal(normal) else {
            return;
        };
        resolution.shift(hit.point - bottom);
        resolution.motion.angle = frame.angle();
        if !resolution.motion.grounded {
            debug!("landed at angle {}", frame.angle());
        }
        resolution.motion.grounded = true;
        resolution.floor = Some(SurfaceContact {
            point: hit.point,
            normal,
            angle: frame.angle(),
        });
    }
}

/// Sign of motion along local right, with zero counting as rightward.
fn heading(velocity: Vec2, frame: &GroundFrame) -> f32 {
    if velocity.dot(frame.right()) < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Stop motion along `direction` and slide along the blocking surface.
///
/// The result never has a negative component along `direction`: sliding
/// along a sloped blocker cannot push the actor back.
pub fn slide_off(velocity: Vec2, direction: Vec2, normal: Vec2) -> Vec2 {
    let mut velocity = velocity - direction * velocity.dot(direction);
    let into = velocity.dot(normal);
    if into < 0.0 {
        velocity -= normal * into;
    }
    let back = velocity.dot(direction);
    if back < 0.0 {
        velocity -= direction * back;
    }
    velocity
}

/// Wall-like response to a surface the concave probe cannot climb.
fn reject(velocity: Vec2, frame: &GroundFrame, normal: Vec2) -> Vec2 {
    let along = velocity.dot(frame.right());
    let side = if along > 0.0 {
        frame.right()
    } else {
        frame.left()
    };
    if along != 0.0 && normal.dot(side) < 0.0 {
        slide_off(velocity, side, normal)
    } else {
        let into = velocity.dot(normal);
        if into < 0.0 {
            velocity - normal * into
        } else {
            velocity
        }
    }
}
