//! Semi-implicit Euler integration with floor and world-bound handling
//!
//! Velocity is updated before position, which keeps the scheme stable under
//! stiff contact corrections. Position updates are sub-stepped in proportion
//! to speed (capped) so a fast body cannot skip the floor or a world bound
//! inside one fixed step.

use super::body::DynamicBody;
use crate::consts::{MAX_SUBSTEPS, MAX_VELOCITY, MIN_BOUNCE_VELOCITY, WORLD_BOUND};

/// Advance one body by one fixed step
pub fn integrate(body: &mut DynamicBody, dt: f32) {
    body.prev_pos = body.pos;
    body.prev_vel = body.vel;

    body.vel += body.acceleration * dt;

    let speed = body.vel.length();
    if speed > MAX_VELOCITY {
        body.vel *= MAX_VELOCITY / speed;
    }

    let substeps = ((speed * dt).ceil() as u32).clamp(1, MAX_SUBSTEPS);
    let sub_dt = dt / substeps as f32;
    for _ in 0..substeps {
        body.pos += body.vel * sub_dt;
        resolve_floor(body);
        resolve_world_bounds(body);
    }
}

/// Snap to the floor plane at y=0. Fast impacts reflect with restitution and
/// lose horizontal speed to friction; slow ones become resting contact.
fn resolve_floor(body: &mut DynamicBody) {
    if body.pos.y - body.radius >= 0.0 {
        return;
    }
    body.pos.y = body.radius;
    if body.vel.y.abs() > MIN_BOUNCE_VELOCITY {
        body.vel.y = body.vel.y.abs() * body.restitution;
        body.vel.x *= 1.0 - body.friction;
        body.vel.z *= 1.0 - body.friction;
    } else {
        body.vel.y = 0.0;
    }
}

/// Reflect off the x/z world bounds, scaled by restitution
fn resolve_world_bounds(body: &mut DynamicBody) {
    let limit = WORLD_BOUND - body.radius;

    if body.pos.x > limit {
        body.pos.x = limit;
        body.vel.x = -body.vel.x.abs() * body.restitution;
    } else if body.pos.x < -limit {
        body.pos.x = -limit;
        body.vel.x = body.vel.x.abs() * body.restitution;
    }

    if body.pos.z > limit {
        body.pos.z = limit;
        body.vel.z = -body.vel.z.abs() * body.restitution;
    } else if body.pos.z < -limit {
        body.pos.z = -limit;
        body.vel.z = body.vel.z.abs() * body.restitution;
    }
}
