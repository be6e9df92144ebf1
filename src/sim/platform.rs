//! Platform geometry and kinematics
//!
//! A platform is a box-shaped obstacle, either static or animated along one
//! axis. Kinematic platforms never integrate velocity: the target position is
//! a pure function of elapsed time, and the velocity used for collision
//! response is always observed from the position delta. That keeps platform
//! motion reproducible and drift-free.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::PLATFORM_LERP;
use crate::error::SimError;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Expand symmetrically on all axes (Minkowski sum with a sphere radius)
    pub fn expanded(&self, radius: f32) -> Self {
        Self {
            min: self.min - Vec3::splat(radius),
            max: self.max + Vec3::splat(radius),
        }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }
}

/// Platform gameplay types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlatformKind {
    #[default]
    Normal,
    Start,
    Finish,
    Checkpoint,
    Boost,
    Obstacle,
    Bounce,
}

/// World axis for kinematic motion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    #[inline]
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }
}

/// Platform motion descriptor
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Motion {
    #[default]
    Static,
    /// Cosine oscillation around the initial position along one axis
    Oscillate { axis: Axis, amplitude: f32, speed: f32 },
}

/// A box-shaped obstacle, static or kinematically animated.
///
/// Deliberately not deserializable: instances only come from `new`, which
/// enforces the shape invariants. The persisted form is `PlatformRecord`.
#[derive(Debug, Clone, Serialize)]
pub struct Platform {
    pub id: u32,
    pub kind: PlatformKind,
    /// Shape descriptor (immutable after construction)
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub initial_pos: Vec3,
    /// Rotation about the vertical axis (radians)
    pub rotation: f32,
    pub motion: Motion,

    /// Type parameters
    pub boost_force: f32,
    pub bounce_force: f32,
    pub checkpoint_index: u32,
    pub is_active: bool,

    /// Current world position (center)
    pub pos: Vec3,
    prev_pos: Vec3,
    /// Observed velocity: position delta / dt, never commanded
    pub vel: Vec3,
    elapsed: f32,
    aabb: Aabb,
}

impl Platform {
    /// Construct a platform. Non-positive dimensions are a configuration
    /// error, not something to clamp.
    pub fn new(
        id: u32,
        kind: PlatformKind,
        width: f32,
        height: f32,
        depth: f32,
        pos: Vec3,
        rotation: f32,
    ) -> Result<Self, SimError> {
        if width <= 0.0 || height <= 0.0 || depth <= 0.0 {
            return Err(SimError::InvalidPlatform {
                id,
                width,
                height,
                depth,
            });
        }
        let mut platform = Self {
            id,
            kind,
            width,
            height,
            depth,
            initial_pos: pos,
            rotation,
            motion: Motion::Static,
            boost_force: 0.0,
            bounce_force: 0.0,
            checkpoint_index: 0,
            is_active: true,
            pos,
            prev_pos: pos,
            vel: Vec3::ZERO,
            elapsed: 0.0,
            aabb: Aabb::from_center(pos, Vec3::ZERO),
        };
        platform.update_aabb();
        Ok(platform)
    }

    pub fn with_motion(mut self, motion: Motion) -> Self {
        self.motion = motion;
        self
    }

    pub fn with_boost(mut self, force: f32) -> Self {
        self.boost_force = force;
        self
    }

    pub fn with_bounce(mut self, force: f32) -> Self {
        self.bounce_force = force;
        self
    }

    pub fn with_checkpoint(mut self, index: u32) -> Self {
        self.checkpoint_index = index;
        self
    }

    /// Half extents of the world-space AABB. Yaw rotation widens the x/z
    /// footprint to the rotated bound so the box always contains the shape.
    pub fn half_extents(&self) -> Vec3 {
        let (hw, hd) = (self.width / 2.0, self.depth / 2.0);
        let (sin, cos) = (self.rotation.sin().abs(), self.rotation.cos().abs());
        Vec3::new(
            hw * cos + hd * sin,
            self.height / 2.0,
            hw * sin + hd * cos,
        )
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        self.aabb
    }

    /// World-space y of the platform's top face
    #[inline]
    pub fn top_y(&self) -> f32 {
        self.pos.y + self.height / 2.0
    }

    #[inline]
    pub fn is_kinematic(&self) -> bool {
        self.motion != Motion::Static
    }

    fn update_aabb(&mut self) {
        self.aabb = Aabb::from_center(self.pos, self.half_extents());
    }

    /// Advance kinematic motion by one fixed step. No-op for static
    /// platforms. The position eases toward the time-parameterized target
    /// instead of snapping, so observed velocity has no discontinuous spikes.
    pub fn advance(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let Motion::Oscillate { axis, amplitude, speed } = self.motion else {
            return;
        };

        self.elapsed += dt;
        let target =
            self.initial_pos + axis.unit() * ((self.elapsed * speed).cos() * amplitude);

        self.prev_pos = self.pos;
        self.pos = self.pos.lerp(target, PLATFORM_LERP);
        self.vel = (self.pos - self.prev_pos) / dt;
        self.update_aabb();
    }
}
