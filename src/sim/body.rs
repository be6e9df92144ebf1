//! Dynamic bodies
//!
//! Bodies are owned exclusively by the `BodyStore` and mutated only during a
//! simulation step or by explicit impulse calls. Iteration order is stable
//! (ascending id) for determinism.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::{BALL_FRICTION, BALL_MASS, BALL_RADIUS, BALL_RESTITUTION, GRAVITY};
use crate::error::SimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// A dynamic sphere advanced by the integrator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicBody {
    pub id: BodyId,
    pub pos: Vec3,
    pub vel: Vec3,
    /// Currently gravity only
    pub acceleration: Vec3,
    pub mass: f32,
    pub restitution: f32,
    pub friction: f32,
    pub radius: f32,
    /// Previous-frame state for delta computation
    pub prev_pos: Vec3,
    pub prev_vel: Vec3,
    /// Standing on a surface as of the last collision resolve
    pub grounded: bool,
    /// Last finite state, restored if the body goes non-finite
    last_good: (Vec3, Vec3),
}

impl DynamicBody {
    pub fn new(
        id: BodyId,
        pos: Vec3,
        radius: f32,
        mass: f32,
        restitution: f32,
        friction: f32,
    ) -> Result<Self, SimError> {
        if mass <= 0.0 {
            return Err(SimError::InvalidMass(mass));
        }
        if !(0.0..=1.0).contains(&restitution) {
            return Err(SimError::InvalidRestitution(restitution));
        }
        if !(0.0..=1.0).contains(&friction) {
            return Err(SimError::InvalidFriction(friction));
        }
        Ok(Self {
            id,
            pos,
            vel: Vec3::ZERO,
            acceleration: Vec3::new(0.0, -GRAVITY, 0.0),
            mass,
            restitution,
            friction,
            radius,
            prev_pos: pos,
            prev_vel: Vec3::ZERO,
            grounded: false,
            last_good: (pos, Vec3::ZERO),
        })
    }

    /// Player ball with default tuning
    pub fn player(id: BodyId, pos: Vec3) -> Self {
        Self::new(id, pos, BALL_RADIUS, BALL_MASS, BALL_RESTITUTION, BALL_FRICTION)
            .expect("default ball parameters are valid")
    }

    pub fn apply_impulse(&mut self, impulse: Vec3) {
        self.vel += impulse / self.mass;
    }

    /// Validate numerical state after a step. A non-finite position or
    /// velocity is fatal for this body: restore the last known good state
    /// (or the fallback position if that is also poisoned) rather than let
    /// NaNs spread through downstream collision math.
    ///
    /// Returns false if a reset was necessary.
    pub fn sanitize(&mut self, fallback_pos: Vec3) -> bool {
        if self.pos.is_finite() && self.vel.is_finite() {
            self.last_good = (self.pos, self.vel);
            return true;
        }

        let (pos, vel) = self.last_good;
        if pos.is_finite() && vel.is_finite() {
            self.pos = pos;
            self.vel = vel;
        } else {
            self.pos = fallback_pos;
            self.vel = Vec3::ZERO;
        }
        self.grounded = false;
        false
    }
}

/// Owns all dynamic bodies, keyed by `BodyId`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BodyStore {
    bodies: Vec<DynamicBody>,
    next_id: u32,
}

impl BodyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(
        &mut self,
        pos: Vec3,
        radius: f32,
        mass: f32,
        restitution: f32,
        friction: f32,
    ) -> Result<BodyId, SimError> {
        let id = BodyId(self.next_id);
        let body = DynamicBody::new(id, pos, radius, mass, restitution, friction)?;
        self.next_id += 1;
        self.bodies.push(body);
        Ok(id)
    }

    pub fn spawn_player(&mut self, pos: Vec3) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        self.bodies.push(DynamicBody::player(id, pos));
        id
    }

    pub fn get(&self, id: BodyId) -> Option<&DynamicBody> {
        self.bodies.iter().find(|b| b.id == id)
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut DynamicBody> {
        self.bodies.iter_mut().find(|b| b.id == id)
    }

    /// Impulse addressed to an unknown id mutates nothing
    pub fn apply_impulse(&mut self, id: BodyId, impulse: Vec3) -> Result<(), SimError> {
        match self.get_mut(id) {
            Some(body) => {
                body.apply_impulse(impulse);
                Ok(())
            }
            None => Err(SimError::UnknownBody(id.0)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &DynamicBody> {
        self.bodies.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut DynamicBody> {
        self.bodies.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_configuration() {
        assert!(matches!(
            DynamicBody::new(BodyId(0), Vec3::ZERO, 0.5, 0.0, 0.5, 0.1),
            Err(SimError::InvalidMass(_))
        ));
        assert!(matches!(
            DynamicBody::new(BodyId(0), Vec3::ZERO, 0.5, 1.0, 1.5, 0.1),
            Err(SimError::InvalidRestitution(_))
        ));
        assert!(matches!(
            DynamicBody::new(BodyId(0), Vec3::ZERO, 0.5, 1.0, 0.5, -0.1),
            Err(SimError::InvalidFriction(_))
        ));
    }

    #[test]
    fn test_impulse_scales_by_mass() {
        let mut body = DynamicBody::new(BodyId(0), Vec3::ZERO, 0.5, 2.0, 0.5, 0.1).unwrap();
        body.apply_impulse(Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(body.vel, Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_unknown_body_impulse_is_rejected_without_mutation() {
        let mut store = BodyStore::new();
        let id = store.spawn_player(Vec3::ZERO);
        let err = store.apply_impulse(BodyId(99), Vec3::X);
        assert!(matches!(err, Err(SimError::UnknownBody(99))));
        assert_eq!(store.get(id).unwrap().vel, Vec3::ZERO);
    }

    #[test]
    fn test_sanitize_restores_last_good_state() {
        let mut body = DynamicBody::player(BodyId(0), Vec3::new(1.0, 2.0, 3.0));
        body.vel = Vec3::new(0.5, 0.0, 0.0);
        assert!(body.sanitize(Vec3::ZERO));

        body.pos = Vec3::new(f32::NAN, 0.0, 0.0);
        assert!(!body.sanitize(Vec3::ZERO));
        assert_eq!(body.pos, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(body.vel, Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn test_sanitize_falls_back_to_spawn_when_never_good() {
        let mut body = DynamicBody::player(BodyId(0), Vec3::new(f32::INFINITY, 0.0, 0.0));
        body.last_good = (Vec3::splat(f32::NAN), Vec3::ZERO);
        let spawn = Vec3::new(0.0, 3.0, 0.0);
        assert!(!body.sanitize(spawn));
        assert_eq!(body.pos, spawn);
        assert_eq!(body.vel, Vec3::ZERO);
    }
}
