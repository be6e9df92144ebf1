//! Collision response and effect dispatch
//!
//! Contacts are swept over the displacement the body just took (previous to
//! current position), so a step that carried the center clean through a thin
//! platform still reports the crossing. Contacts from all platforms are
//! collected first, then resolved deepest penetration first (platform id
//! breaks ties) so that simultaneous overlaps produce the same outcome
//! regardless of platform insertion order.

use std::cmp::Ordering;

use super::body::DynamicBody;
use super::collision::{Contact, Effect, query};
use super::platform::Platform;
use crate::consts::{
    BOOST_MULTIPLIER, BOUNCE_MULTIPLIER, CARRY_FACTOR, GRAVITY, GROUND_FRICTION,
    GROUNDED_NORMAL_Y, MIN_BOUNCE_VELOCITY,
};

const EPSILON: f32 = 1e-6;

/// Resolve one body against every platform for one fixed step.
///
/// The sweep runs from the body's previous position along the displacement
/// the integrator actually produced, not along the nominal velocity, so
/// sub-stepped or clipped motion is covered exactly.
///
/// Returns the resolved contacts so the caller can dispatch checkpoint and
/// finish notifications to the track collaborator.
pub fn resolve_collisions(
    body: &mut DynamicBody,
    platforms: &[Platform],
    dt: f32,
) -> Vec<Contact> {
    let sweep_vel = (body.pos - body.prev_pos) / dt;
    let mut contacts: Vec<Contact> = platforms
        .iter()
        .filter_map(|p| query(p, body.prev_pos, body.radius, sweep_vel, dt))
        .collect();

    contacts.sort_by(|a, b| {
        b.penetration
            .partial_cmp(&a.penetration)
            .unwrap_or(Ordering::Equal)
            .then(a.platform_id.cmp(&b.platform_id))
    });

    body.grounded = false;
    for contact in &contacts {
        apply_contact(body, contact, dt);
    }
    contacts
}

fn apply_contact(body: &mut DynamicBody, contact: &Contact, dt: f32) {
    if contact.normal.y > GROUNDED_NORMAL_Y {
        body.grounded = true;
    }

    // Effects below use the velocity the body arrived with, not the
    // reflected one
    let pre_vel = body.vel;
    let approach = pre_vel.dot(contact.normal);

    if approach < 0.0 {
        // One step of gravity re-enters the surface every frame while
        // resting; impacts no faster than that are contact, not a bounce
        let resting = contact.normal.y > GROUNDED_NORMAL_Y
            && -approach < MIN_BOUNCE_VELOCITY + GRAVITY * dt;

        if resting {
            body.vel -= contact.normal * approach;
        } else {
            body.vel -= contact.normal * (2.0 * approach);
            body.vel *= body.restitution;
        }

        // Reposition at the contact, pushed out by the (capped) overlap.
        // Absolute, not additive: stacked contacts cannot compound the
        // correction past the cap.
        body.pos = contact.point + contact.normal * contact.penetration;

        // Moving-platform carry
        if contact.platform_vel.length_squared() > EPSILON {
            body.vel += contact.platform_vel * CARRY_FACTOR;
        }

        if body.grounded {
            body.vel.x *= GROUND_FRICTION;
            body.vel.z *= GROUND_FRICTION;
        }
    }

    // Applied once per colliding platform regardless of approach direction;
    // checkpoint payloads are dispatched by the engine from the returned
    // contacts
    match contact.effect {
        Some(Effect::Boost(force)) => {
            let dir = pre_vel.normalize_or_zero();
            body.vel += dir * force * BOOST_MULTIPLIER;
        }
        Some(Effect::Bounce(force)) => {
            body.vel.y = pre_vel.y.abs() * force * BOUNCE_MULTIPLIER;
        }
        Some(Effect::Checkpoint(_)) | None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::body::BodyId;
    use crate::sim::integrator::integrate;
    use crate::sim::platform::{Motion, PlatformKind};
    use approx::assert_relative_eq;
    use glam::Vec3;

    fn platform(id: u32, kind: PlatformKind, pos: Vec3) -> Platform {
        Platform::new(id, kind, 4.0, 1.0, 4.0, pos, 0.0).unwrap()
    }

    fn falling_ball(y: f32, vy: f32) -> DynamicBody {
        let mut body = DynamicBody::player(BodyId(0), Vec3::new(0.0, y, 0.0));
        body.vel = Vec3::new(0.0, vy, 0.0);
        body
    }

    #[test]
    fn test_restitution_law() {
        // Touching the top face of a platform centered at origin, impact
        // speed 10: post-impact vertical speed must be restitution * 10
        let platforms = vec![platform(1, PlatformKind::Normal, Vec3::ZERO)];
        let mut body = falling_ball(1.0, -10.0);
        for r in [0.2, 0.5, 0.7, 1.0] {
            body.vel = Vec3::new(0.0, -10.0, 0.0);
            body.pos = Vec3::new(0.0, 1.0, 0.0);
            body.restitution = r;
            let contacts = resolve_collisions(&mut body, &platforms, SIM_DT);
            assert_eq!(contacts.len(), 1);
            assert_relative_eq!(body.vel.y, 10.0 * r, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_standing_contact_sets_grounded() {
        let platforms = vec![platform(1, PlatformKind::Normal, Vec3::ZERO)];
        let mut body = falling_ball(1.0, -5.0);
        resolve_collisions(&mut body, &platforms, SIM_DT);
        assert!(body.grounded);

        // A side hit does not ground
        let mut body = DynamicBody::player(BodyId(0), Vec3::new(-3.0, 0.0, 0.0));
        body.vel = Vec3::new(25.0, 0.0, 0.0);
        resolve_collisions(&mut body, &platforms, SIM_DT);
        assert!(!body.grounded);
    }

    #[test]
    fn test_near_resting_contact_zeroes_vertical_velocity() {
        let platforms = vec![platform(1, PlatformKind::Normal, Vec3::ZERO)];
        // Approach slower than one step of gravity: no reflection
        let mut body = falling_ball(0.99, -(GRAVITY * SIM_DT));
        resolve_collisions(&mut body, &platforms, SIM_DT);
        assert_eq!(body.vel.y, 0.0);
    }

    #[test]
    fn test_penetration_correction_is_bounded() {
        use crate::consts::MAX_PENETRATION;
        // Embedded in two overlapping platforms at once; each contact's raw
        // overlap exceeds the cap, yet the combined frame correction may not
        let platforms = vec![
            platform(1, PlatformKind::Normal, Vec3::ZERO),
            platform(2, PlatformKind::Normal, Vec3::new(0.0, -0.1, 0.0)),
        ];
        let mut body = falling_ball(0.3, -1.0);
        let before = body.pos;
        let contacts = resolve_collisions(&mut body, &platforms, SIM_DT);
        assert_eq!(contacts.len(), 2);
        assert!((body.pos - before).length() <= MAX_PENETRATION + 1e-5);
    }

    #[test]
    fn test_integrated_step_cannot_tunnel_thin_platform() {
        let thin = Platform::new(
            1,
            PlatformKind::Normal,
            4.0,
            0.05,
            4.0,
            Vec3::new(0.0, 5.0, 0.0),
            0.0,
        )
        .unwrap();
        // Small body whose single step is far longer than the platform is
        // thick, driven through the real integrate-then-resolve pipeline
        let mut body =
            DynamicBody::new(BodyId(0), Vec3::new(0.0, 5.3, 0.0), 0.05, 1.0, 0.7, 0.1).unwrap();
        body.vel = Vec3::new(0.0, -30.0, 0.0);

        integrate(&mut body, SIM_DT);
        assert!(body.pos.y < 5.0, "the raw step crosses the platform");

        let contacts = resolve_collisions(&mut body, std::slice::from_ref(&thin), SIM_DT);
        assert_eq!(contacts.len(), 1);
        assert!(body.pos.y >= thin.top_y() + body.radius - 1e-4);
        assert!(body.vel.y > 0.0);
    }

    #[test]
    fn test_boost_adds_along_pre_collision_direction() {
        let platforms = vec![
            platform(1, PlatformKind::Boost, Vec3::ZERO).with_boost(1.5),
        ];
        // Inside the expanded box, moving up and out: no reflection, effect
        // still applies
        let mut body = DynamicBody::player(BodyId(0), Vec3::new(0.0, 0.9, 0.0));
        body.vel = Vec3::new(0.0, 5.0, 0.0);
        resolve_collisions(&mut body, &platforms, SIM_DT);
        // Increment of 1.5 * 10 = 15 along +y
        assert_relative_eq!(body.vel.y, 20.0, epsilon = 1e-4);
    }

    #[test]
    fn test_bounce_scales_pre_collision_vertical_speed() {
        let platforms = vec![
            platform(1, PlatformKind::Bounce, Vec3::ZERO).with_bounce(1.5),
        ];
        let mut body = falling_ball(1.0, -4.0);
        resolve_collisions(&mut body, &platforms, SIM_DT);
        // |v.y| * bounce_force * 2
        assert_relative_eq!(body.vel.y, 4.0 * 1.5 * 2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_moving_platform_carries_body() {
        let mut moving = platform(1, PlatformKind::Normal, Vec3::ZERO)
            .with_motion(Motion::Oscillate {
                axis: crate::sim::platform::Axis::X,
                amplitude: 2.0,
                speed: 1.0,
            });
        // Prime an observed velocity
        moving.advance(SIM_DT);
        let platform_vx = moving.vel.x;
        assert!(platform_vx.abs() > 1e-4);

        let mut body = falling_ball(moving.top_y() + 0.5, -5.0);
        resolve_collisions(&mut body, std::slice::from_ref(&moving), SIM_DT);
        // Reflected vertically, then carry plus ground friction on x
        let expected_x = platform_vx * CARRY_FACTOR * GROUND_FRICTION;
        assert_relative_eq!(body.vel.x, expected_x, epsilon = 1e-4);
    }

    #[test]
    fn test_deepest_penetration_resolved_first() {
        // Two overlapping platforms; the deeper contact must win the first
        // reflection regardless of insertion order
        let shallow = platform(1, PlatformKind::Normal, Vec3::new(0.0, -0.45, 0.0));
        let deep = platform(2, PlatformKind::Normal, Vec3::new(0.0, -0.2, 0.0));

        let mut a = falling_ball(0.5, -3.0);
        let contacts_ab =
            resolve_collisions(&mut a, &[shallow.clone(), deep.clone()], SIM_DT);
        let mut b = falling_ball(0.5, -3.0);
        let contacts_ba = resolve_collisions(&mut b, &[deep, shallow], SIM_DT);

        assert_eq!(contacts_ab.len(), 2);
        assert_eq!(contacts_ab[0].platform_id, contacts_ba[0].platform_id);
        assert_eq!(a.pos, b.pos);
        assert_eq!(a.vel, b.vel);
    }

    #[test]
    fn test_receding_contact_keeps_velocity_but_reports_contact() {
        let platforms = vec![platform(1, PlatformKind::Normal, Vec3::ZERO)];
        let mut body = DynamicBody::player(BodyId(0), Vec3::new(0.0, 0.9, 0.0));
        body.vel = Vec3::new(0.0, 3.0, 0.0);
        let contacts = resolve_collisions(&mut body, &platforms, SIM_DT);
        assert_eq!(contacts.len(), 1);
        assert_eq!(body.vel, Vec3::new(0.0, 3.0, 0.0));
    }
}
