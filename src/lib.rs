//! Rollway - marble-track physics core
//!
//! Core modules:
//! - `sim`: Deterministic fixed-timestep simulation (bodies, platforms,
//!   swept-sphere collision, response/effect pipeline)
//! - `track`: Persisted track records, validation, checkpoint progress
//! - `error`: Recoverable configuration/referential errors
//!
//! Rendering, editor UI, input wiring and storage are collaborators outside
//! this crate; they read positions after a step completes and never write
//! back into simulation state.

pub mod error;
pub mod sim;
pub mod track;

pub use error::SimError;
pub use sim::{Contact, DynamicBody, Engine, EngineMode, Platform, SimEvent, TickInput};
pub use track::{PlatformRecord, TrackProgress};

/// Physics configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Frame delta cap to prevent spiral of death after a stall
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Gravity acceleration (units/s², downward)
    pub const GRAVITY: f32 = 9.81;
    /// Velocity magnitude clamp (units/s)
    pub const MAX_VELOCITY: f32 = 30.0;
    /// Integrator sub-step cap per fixed step
    pub const MAX_SUBSTEPS: u32 = 3;
    /// Below this vertical speed a contact is resting, not a bounce
    pub const MIN_BOUNCE_VELOCITY: f32 = 0.1;
    /// Single-frame positional correction cap
    pub const MAX_PENETRATION: f32 = 0.1;

    /// Half-extent of the playable world on the x and z axes
    pub const WORLD_BOUND: f32 = 50.0;

    /// Fraction of a moving platform's velocity transferred on contact
    pub const CARRY_FACTOR: f32 = 0.8;
    /// Horizontal damping applied while grounded
    pub const GROUND_FRICTION: f32 = 0.8;
    /// Contact normals steeper than this vertical component ground the body
    pub const GROUNDED_NORMAL_Y: f32 = 0.5;

    /// Boost effect velocity gain per unit of boost force
    pub const BOOST_MULTIPLIER: f32 = 10.0;
    /// Bounce effect vertical gain per unit of bounce force
    pub const BOUNCE_MULTIPLIER: f32 = 2.0;

    /// Player movement acceleration (units/s²)
    pub const MOVE_FORCE: f32 = 20.0;
    /// Jump launch speed (units/s)
    pub const JUMP_FORCE: f32 = 7.5;
    /// Movement force multiplier while airborne
    pub const AIR_CONTROL: f32 = 0.3;

    /// Kinematic platform smoothing factor per update
    pub const PLATFORM_LERP: f32 = 0.1;

    /// Player ball defaults
    pub const BALL_RADIUS: f32 = 0.5;
    pub const BALL_MASS: f32 = 1.0;
    pub const BALL_RESTITUTION: f32 = 0.7;
    pub const BALL_FRICTION: f32 = 0.1;
}
