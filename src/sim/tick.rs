//! Fixed-timestep simulation engine
//!
//! `step` accumulates real frame time and drains it in fixed increments, so
//! the integrator and collision pipeline always see a constant dt and the
//! restitution/friction constants behave identically at any render rate.

use glam::Vec3;

use super::body::{BodyId, BodyStore};
use super::collision::Effect;
use super::integrator::integrate;
use super::platform::{Platform, PlatformKind};
use super::response::resolve_collisions;
use crate::consts::{AIR_CONTROL, BALL_RADIUS, JUMP_FORCE, MAX_FRAME_DT, MOVE_FORCE, SIM_DT};
use crate::error::SimError;
use crate::track::{TrackProgress, validate_track};

/// Input intent snapshot for one fixed step
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub jump: bool,
}

/// Engine behavior mode. Editor mode animates platforms but freezes body
/// dynamics; it is a parameter of one engine, not a separate engine type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineMode {
    Play,
    Editor,
}

/// Notifications for outside collaborators (track UI, renderer)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    CheckpointPassed { index: u32 },
    FinishCrossed,
    BodyReset { id: BodyId },
}

/// Owns all simulation state for one level session
pub struct Engine {
    pub mode: EngineMode,
    /// Cooperative cancellation, checked once per `step`
    pub running: bool,
    accumulator: f32,
    pub bodies: BodyStore,
    pub platforms: Vec<Platform>,
    pub track: TrackProgress,
    player: BodyId,
    spawn_pos: Vec3,
    pub time_ticks: u64,
}

impl Engine {
    /// Build an engine for a platform set. Play mode requires a valid track;
    /// editor mode accepts incomplete ones.
    pub fn new(platforms: Vec<Platform>, mode: EngineMode) -> Result<Self, SimError> {
        if mode == EngineMode::Play {
            validate_track(&platforms)?;
        }

        let spawn_pos = platforms
            .iter()
            .find(|p| p.kind == PlatformKind::Start)
            .map(|p| Vec3::new(p.pos.x, p.top_y() + BALL_RADIUS, p.pos.z))
            .unwrap_or(Vec3::new(0.0, 3.0, 0.0));

        let track = TrackProgress::from_platforms(&platforms);
        let mut bodies = BodyStore::new();
        let player = bodies.spawn_player(spawn_pos);

        log::info!(
            "engine up: {} platforms, spawn at {spawn_pos}, mode {mode:?}",
            platforms.len()
        );

        Ok(Self {
            mode,
            running: true,
            accumulator: 0.0,
            bodies,
            platforms,
            track,
            player,
            spawn_pos,
            time_ticks: 0,
        })
    }

    pub fn player_id(&self) -> BodyId {
        self.player
    }

    pub fn spawn_pos(&self) -> Vec3 {
        self.spawn_pos
    }

    /// Advance by one render frame's worth of time, running zero or more
    /// fixed updates. The frame delta is capped so a stall cannot snowball
    /// into an ever-growing accumulator.
    pub fn step(&mut self, frame_dt: f32, input: &TickInput) -> Vec<SimEvent> {
        let mut events = Vec::new();
        if !self.running {
            return events;
        }

        self.accumulator += frame_dt.min(MAX_FRAME_DT);
        while self.accumulator >= SIM_DT {
            self.fixed_update(input, SIM_DT, &mut events);
            self.accumulator -= SIM_DT;
        }
        events
    }

    fn fixed_update(&mut self, input: &TickInput, dt: f32, events: &mut Vec<SimEvent>) {
        self.time_ticks += 1;

        for platform in &mut self.platforms {
            platform.advance(dt);
        }

        if self.mode == EngineMode::Editor {
            return;
        }

        self.apply_input(input, dt);

        let mut passed_checkpoints: Vec<u32> = Vec::new();

        // Bodies update sequentially within the step; order is stable
        for body in self.bodies.iter_mut() {
            integrate(body, dt);
            let contacts = resolve_collisions(body, &self.platforms, dt);

            for contact in &contacts {
                if let Some(Effect::Checkpoint(index)) = contact.effect
                    && self.track.pass(index)
                {
                    passed_checkpoints.push(index);
                    events.push(SimEvent::CheckpointPassed { index });
                }
                if contact.kind == PlatformKind::Finish && self.track.try_finish() {
                    events.push(SimEvent::FinishCrossed);
                }
            }

            if !body.sanitize(self.spawn_pos) {
                log::warn!("body {} went non-finite, reset", body.id.0);
                events.push(SimEvent::BodyReset { id: body.id });
            }
        }

        // Passed checkpoints stop attaching payloads
        for index in passed_checkpoints {
            for platform in &mut self.platforms {
                if platform.kind == PlatformKind::Checkpoint
                    && platform.checkpoint_index == index
                {
                    platform.is_active = false;
                }
            }
        }
    }

    fn apply_input(&mut self, input: &TickInput, dt: f32) {
        let Some(body) = self.bodies.get_mut(self.player) else {
            return;
        };

        let mut dir = Vec3::ZERO;
        if input.left {
            dir.x -= 1.0;
        }
        if input.right {
            dir.x += 1.0;
        }
        if input.up {
            dir.z -= 1.0;
        }
        if input.down {
            dir.z += 1.0;
        }

        if dir != Vec3::ZERO {
            let control = if body.grounded { 1.0 } else { AIR_CONTROL };
            body.vel += dir.normalize() * MOVE_FORCE * control * dt;
        }

        if input.jump && body.grounded {
            body.vel.y = JUMP_FORCE;
            body.grounded = false;
        }
    }
}
