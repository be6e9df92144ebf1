//! Recoverable simulation errors
//!
//! Configuration errors are rejected at construction time rather than
//! clamped. Referential errors (unknown ids) leave all state untouched.
//! Neither aborts the simulation step for unrelated bodies or platforms.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("platform {id} has non-positive dimensions {width}x{height}x{depth}")]
    InvalidPlatform {
        id: u32,
        width: f32,
        height: f32,
        depth: f32,
    },

    #[error("body mass must be positive, got {0}")]
    InvalidMass(f32),

    #[error("restitution must be in [0, 1], got {0}")]
    InvalidRestitution(f32),

    #[error("friction must be in [0, 1], got {0}")]
    InvalidFriction(f32),

    #[error("unknown body id {0}")]
    UnknownBody(u32),

    #[error("invalid track: {0}")]
    InvalidTrack(String),

    #[error("track parse error: {0}")]
    TrackParse(#[from] serde_json::Error),
}
