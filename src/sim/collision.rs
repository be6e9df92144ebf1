//! Swept-sphere vs moving-box collision query
//!
//! The hard part of the engine: a fast ball must never pass through a thin
//! platform inside one fixed step. The sphere's full displacement over the
//! step is cast against the platform's AABB expanded by the sphere radius
//! (a Minkowski sum, reducing the problem to a ray/box test). A sphere
//! already overlapping from a previous frame's large step is reported as an
//! immediate penetrating contact rather than lost.

use glam::Vec3;

use super::platform::{Aabb, Platform, PlatformKind};
use crate::consts::MAX_PENETRATION;

const EPSILON: f32 = 1e-6;

/// Type-specific payload carried by a contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    Boost(f32),
    Bounce(f32),
    Checkpoint(u32),
}

/// A detected collision, produced fresh per query and never stored
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    pub platform_id: u32,
    pub kind: PlatformKind,
    /// Unit vector pointing out of the struck face
    pub normal: Vec3,
    /// Overlap depth, clamped to `MAX_PENETRATION`
    pub penetration: f32,
    /// Time-of-impact fraction of the step, in [0, 1]
    pub toi: f32,
    pub point: Vec3,
    /// Platform's observed velocity at query time (for carry)
    pub platform_vel: Vec3,
    pub effect: Option<Effect>,
}

/// Query one platform against a moving sphere over one fixed step.
///
/// `pos` is the sphere center at the start of the step and `vel` the velocity
/// carrying it through the step, so the swept ray covers exactly the
/// displacement taken. Velocity is relative to the platform: a moving
/// platform sweeping into a stationary ball is detected the same way as the
/// reverse.
pub fn query(
    platform: &Platform,
    pos: Vec3,
    radius: f32,
    vel: Vec3,
    dt: f32,
) -> Option<Contact> {
    let rel_vel = vel - platform.vel;
    let expanded = platform.aabb().expanded(radius);

    let displacement = rel_vel * dt;
    if displacement.length_squared() < EPSILON * EPSILON {
        // Near-stationary: point-in-expanded-box is sufficient
        if expanded.contains(pos) {
            return Some(penetrating_contact(platform, &expanded, pos, radius));
        }
        return None;
    }

    if let Some(toi) = ray_aabb(pos, displacement, &expanded)
        && (0.0..=1.0).contains(&toi)
    {
        let point = pos + displacement * toi;
        let normal = face_normal(&expanded, point);
        let penetration = penetration_depth(platform, point, radius, normal);
        return Some(Contact {
            platform_id: platform.id,
            kind: platform.kind,
            normal,
            penetration,
            toi,
            point,
            platform_vel: platform.vel,
            effect: effect_payload(platform),
        });
    }

    // Ray missed or entry is outside the step: the sphere may still end the
    // step overlapping from an earlier large step (tunneling fallback)
    let end = pos + displacement;
    if expanded.contains(end) {
        return Some(penetrating_contact(platform, &expanded, end, radius));
    }

    None
}

/// Immediate penetrating contact, reported at the sphere center where the
/// overlap was found
fn penetrating_contact(platform: &Platform, expanded: &Aabb, point: Vec3, radius: f32) -> Contact {
    let normal = face_normal(expanded, point);
    Contact {
        platform_id: platform.id,
        kind: platform.kind,
        normal,
        penetration: penetration_depth(platform, point, radius, normal),
        toi: 0.0,
        point,
        platform_vel: platform.vel,
        effect: effect_payload(platform),
    }
}

/// Slab test: entry parameter of `origin + t * dir` against the box, where
/// `dir` is the full step displacement (so t is the time-of-impact fraction).
/// Returns None on a clean miss; a negative entry means the origin is inside.
fn ray_aabb(origin: Vec3, dir: Vec3, aabb: &Aabb) -> Option<f32> {
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;

    for axis in 0..3 {
        let o = origin[axis];
        let d = dir[axis];
        if d.abs() < EPSILON {
            // Parallel to this slab: must already be within it
            if o < aabb.min[axis] || o > aabb.max[axis] {
                return None;
            }
            continue;
        }
        let mut t1 = (aabb.min[axis] - o) / d;
        let mut t2 = (aabb.max[axis] - o) / d;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        t_enter = t_enter.max(t1);
        t_exit = t_exit.min(t2);
        if t_enter > t_exit {
            return None;
        }
    }

    if t_exit < 0.0 {
        return None;
    }
    Some(t_enter)
}

/// Signed unit axis of the box face nearest to `point`
fn face_normal(aabb: &Aabb, point: Vec3) -> Vec3 {
    let candidates = [
        (point.x - aabb.min.x, -Vec3::X),
        (aabb.max.x - point.x, Vec3::X),
        (point.y - aabb.min.y, -Vec3::Y),
        (aabb.max.y - point.y, Vec3::Y),
        (point.z - aabb.min.z, -Vec3::Z),
        (aabb.max.z - point.z, Vec3::Z),
    ];

    let mut best = candidates[0];
    for &(dist, normal) in &candidates[1..] {
        if dist.abs() < best.0.abs() {
            best = (dist, normal);
        }
    }
    best.1
}

/// Overlap of the sphere with the unexpanded box along the contact normal.
/// Clamped so a single frame never applies a correction larger than
/// `MAX_PENETRATION`; deep overlaps resolve gradually across frames.
fn penetration_depth(platform: &Platform, point: Vec3, radius: f32, normal: Vec3) -> f32 {
    let aabb = platform.aabb();
    let proj = (point - aabb.center()).dot(normal).abs();
    let half = aabb.half_extents().dot(normal.abs());
    (radius - (proj - half)).clamp(0.0, MAX_PENETRATION)
}

fn effect_payload(platform: &Platform) -> Option<Effect> {
    if !platform.is_active {
        return None;
    }
    match platform.kind {
        PlatformKind::Boost => Some(Effect::Boost(platform.boost_force)),
        PlatformKind::Bounce => Some(Effect::Bounce(platform.bounce_force)),
        PlatformKind::Checkpoint => Some(Effect::Checkpoint(platform.checkpoint_index)),
        _ => None,
    }
}
