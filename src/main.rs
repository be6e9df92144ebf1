//! Headless demo runner
//!
//! Loads a small built-in track, then drives the engine at a fixed 60 Hz for
//! a few simulated seconds while steering the ball down the course. Useful
//! for eyeballing the physics pipeline without a renderer attached.

use rollway::consts::SIM_DT;
use rollway::sim::{Engine, EngineMode, SimEvent, TickInput};
use rollway::track::{build_platforms, parse_track, validate_track};

const DEMO_TRACK: &str = r#"[
    {"version": 1, "id": 0, "kind": "Start",
     "width": 6.0, "height": 1.0, "depth": 6.0, "position": [0.0, 0.0, 0.0]},
    {"version": 1, "id": 1, "kind": "Boost", "boost_force": 1.5,
     "width": 4.0, "height": 1.0, "depth": 4.0, "position": [0.0, 0.0, -8.0]},
    {"version": 1, "id": 2, "kind": "Checkpoint", "checkpoint_index": 0,
     "width": 4.0, "height": 1.0, "depth": 4.0, "position": [0.0, 0.0, -16.0]},
    {"version": 1, "id": 3, "kind": "Normal",
     "width": 4.0, "height": 1.0, "depth": 4.0, "position": [0.0, 0.0, -24.0],
     "motion": {"Oscillate": {"axis": "X", "amplitude": 3.0, "speed": 1.5}}},
    {"version": 1, "id": 4, "kind": "Bounce", "bounce_force": 1.5,
     "width": 4.0, "height": 1.0, "depth": 4.0, "position": [0.0, 0.0, -32.0]},
    {"version": 1, "id": 5, "kind": "Finish",
     "width": 6.0, "height": 1.0, "depth": 6.0, "position": [0.0, 0.0, -40.0]}
]"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let records = parse_track(DEMO_TRACK)?;
    let platforms = build_platforms(&records)?;
    validate_track(&platforms)?;

    let mut engine = Engine::new(platforms, EngineMode::Play)?;
    let input = TickInput {
        up: true,
        ..Default::default()
    };

    let seconds = 30;
    for tick in 0..seconds * 60 {
        for event in engine.step(SIM_DT, &input) {
            match event {
                SimEvent::CheckpointPassed { index } => {
                    log::info!("checkpoint {index} passed at t={:.2}s", tick as f32 * SIM_DT);
                }
                SimEvent::FinishCrossed => {
                    log::info!("finish crossed at t={:.2}s", tick as f32 * SIM_DT);
                }
                SimEvent::BodyReset { id } => {
                    log::warn!("body {} reset to spawn", id.0);
                }
            }
        }

        if tick % 60 == 0 {
            let body = engine.bodies.get(engine.player_id()).expect("player exists");
            log::info!(
                "t={:>4.1}s pos=({:6.2} {:6.2} {:6.2}) speed={:5.2} grounded={}",
                tick as f32 * SIM_DT,
                body.pos.x,
                body.pos.y,
                body.pos.z,
                body.vel.length(),
                body.grounded,
            );
        }

        if engine.track.is_finished() {
            break;
        }
    }

    if engine.track.is_finished() {
        log::info!("run complete in {} ticks", engine.time_ticks);
    } else {
        log::info!("time limit reached after {} ticks", engine.time_ticks);
    }
    Ok(())
}
