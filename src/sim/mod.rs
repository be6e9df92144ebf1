//! Deterministic simulation module
//!
//! All physics lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable iteration order (by entity ID)
//! - Platform motion is a function of elapsed time, never integrated state
//! - No rendering or storage dependencies

pub mod body;
pub mod collision;
pub mod integrator;
pub mod platform;
pub mod response;
pub mod tick;

pub use body::{BodyId, BodyStore, DynamicBody};
pub use collision::{Contact, Effect, query};
pub use integrator::integrate;
pub use platform::{Aabb, Axis, Motion, Platform, PlatformKind};
pub use response::resolve_collisions;
pub use tick::{Engine, EngineMode, SimEvent, TickInput};
