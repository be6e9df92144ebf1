//! Track records, validation, and checkpoint progress
//!
//! The persisted track format is owned by the editor/storage collaborator;
//! this module only consumes its shape. Records carry a `version` tag for
//! forward compatibility that the core does not otherwise interpret.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::sim::platform::{Motion, Platform, PlatformKind};

fn default_version() -> u32 {
    1
}

/// One platform as persisted by the editor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformRecord {
    #[serde(default = "default_version")]
    pub version: u32,
    pub id: u32,
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub position: [f32; 3],
    #[serde(default)]
    pub rotation: f32,
    #[serde(default)]
    pub kind: PlatformKind,
    #[serde(default)]
    pub motion: Motion,
    #[serde(default)]
    pub boost_force: f32,
    #[serde(default)]
    pub bounce_force: f32,
    #[serde(default)]
    pub checkpoint_index: u32,
}

/// Parse a JSON track (an array of platform records)
pub fn parse_track(json: &str) -> Result<Vec<PlatformRecord>, SimError> {
    Ok(serde_json::from_str(json)?)
}

/// Construct live platforms from persisted records. Fails on the first
/// record with an invalid shape.
pub fn build_platforms(records: &[PlatformRecord]) -> Result<Vec<Platform>, SimError> {
    records
        .iter()
        .map(|r| {
            let platform = Platform::new(
                r.id,
                r.kind,
                r.width,
                r.height,
                r.depth,
                Vec3::from_array(r.position),
                r.rotation,
            )?
            .with_motion(r.motion)
            .with_boost(r.boost_force)
            .with_bounce(r.bounce_force)
            .with_checkpoint(r.checkpoint_index);
            Ok(platform)
        })
        .collect()
}

/// Pure predicate over the platform set: a playable track has exactly one
/// start, at least one finish, and at least one checkpoint. Invoked before a
/// track is committed to use, independent of live collision state.
pub fn validate_track(platforms: &[Platform]) -> Result<(), SimError> {
    let count = |kind: PlatformKind| platforms.iter().filter(|p| p.kind == kind).count();

    let starts = count(PlatformKind::Start);
    if starts != 1 {
        return Err(SimError::InvalidTrack(format!(
            "expected exactly one start platform, found {starts}"
        )));
    }
    if count(PlatformKind::Finish) == 0 {
        return Err(SimError::InvalidTrack("no finish platform".into()));
    }
    if count(PlatformKind::Checkpoint) == 0 {
        return Err(SimError::InvalidTrack("no checkpoint platform".into()));
    }
    Ok(())
}

/// Per-checkpoint progress state
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CheckpointState {
    pub index: u32,
    pub passed: bool,
}

/// Ordered checkpoint sequence for one race.
///
/// Transitions are one-directional: `Pending -> Passed`, never back, for the
/// lifetime of the race. Touches out of sequence are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackProgress {
    checkpoints: Vec<CheckpointState>,
    next: usize,
    finished: bool,
}

impl TrackProgress {
    pub fn from_platforms(platforms: &[Platform]) -> Self {
        let mut indices: Vec<u32> = platforms
            .iter()
            .filter(|p| p.kind == PlatformKind::Checkpoint)
            .map(|p| p.checkpoint_index)
            .collect();
        indices.sort_unstable();
        indices.dedup();

        Self {
            checkpoints: indices
                .into_iter()
                .map(|index| CheckpointState { index, passed: false })
                .collect(),
            next: 0,
            finished: false,
        }
    }

    /// Attempt to pass a checkpoint. Only the next expected index advances
    /// the sequence; anything else leaves all state untouched.
    pub fn pass(&mut self, index: u32) -> bool {
        let Some(expected) = self.checkpoints.get_mut(self.next) else {
            return false;
        };
        if expected.index != index {
            return false;
        }
        expected.passed = true;
        self.next += 1;
        true
    }

    pub fn is_passed(&self, index: u32) -> bool {
        self.checkpoints
            .iter()
            .any(|c| c.index == index && c.passed)
    }

    pub fn all_passed(&self) -> bool {
        self.next == self.checkpoints.len()
    }

    /// Crossing the finish counts once, and only with every checkpoint passed
    pub fn try_finish(&mut self) -> bool {
        if self.finished || !self.all_passed() {
            return false;
        }
        self.finished = true;
        true
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn checkpoints(&self) -> &[CheckpointState] {
        &self.checkpoints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u32, kind: PlatformKind) -> PlatformRecord {
        PlatformRecord {
            version: 1,
            id,
            width: 4.0,
            height: 1.0,
            depth: 4.0,
            position: [0.0, 0.0, id as f32 * 6.0],
            rotation: 0.0,
            kind,
            motion: Motion::Static,
            boost_force: 0.0,
            bounce_force: 0.0,
            checkpoint_index: id,
        }
    }

    fn platforms(kinds: &[PlatformKind]) -> Vec<Platform> {
        let records: Vec<_> = kinds
            .iter()
            .enumerate()
            .map(|(i, &k)| record(i as u32, k))
            .collect();
        build_platforms(&records).unwrap()
    }

    #[test]
    fn test_track_without_finish_fails_validation() {
        use PlatformKind::*;
        let track = platforms(&[Start, Checkpoint, Normal]);
        assert!(validate_track(&track).is_err());
    }

    #[test]
    fn test_minimal_valid_track_passes() {
        use PlatformKind::*;
        let track = platforms(&[Start, Checkpoint, Finish]);
        assert!(validate_track(&track).is_ok());
    }

    #[test]
    fn test_duplicate_start_fails_validation() {
        use PlatformKind::*;
        let track = platforms(&[Start, Start, Checkpoint, Finish]);
        assert!(validate_track(&track).is_err());
    }

    #[test]
    fn test_checkpoints_pass_in_sequence_only() {
        use PlatformKind::*;
        let track = platforms(&[Checkpoint, Checkpoint, Checkpoint]);
        let mut progress = TrackProgress::from_platforms(&track);

        // Out of order: ignored
        assert!(!progress.pass(2));
        assert!(!progress.is_passed(2));

        assert!(progress.pass(0));
        assert!(progress.pass(1));
        assert!(!progress.all_passed());
        assert!(progress.pass(2));
        assert!(progress.all_passed());
    }

    #[test]
    fn test_passed_checkpoints_never_revert() {
        use PlatformKind::*;
        let track = platforms(&[Checkpoint, Checkpoint]);
        let mut progress = TrackProgress::from_platforms(&track);

        assert!(progress.pass(0));
        // Re-touching a passed checkpoint changes nothing
        assert!(!progress.pass(0));
        assert!(progress.is_passed(0));
        assert!(!progress.is_passed(1));
    }

    #[test]
    fn test_finish_requires_all_checkpoints() {
        use PlatformKind::*;
        let track = platforms(&[Checkpoint, Checkpoint]);
        let mut progress = TrackProgress::from_platforms(&track);

        assert!(!progress.try_finish());
        progress.pass(0);
        progress.pass(1);
        assert!(progress.try_finish());
        // Counts once
        assert!(!progress.try_finish());
        assert!(progress.is_finished());
    }

    #[test]
    fn test_record_defaults_tolerate_sparse_json() {
        let json = r#"[
            {"id": 0, "width": 4.0, "height": 1.0, "depth": 4.0,
             "position": [0.0, 0.0, 0.0], "kind": "Start"},
            {"id": 1, "width": 4.0, "height": 1.0, "depth": 4.0,
             "position": [0.0, 0.0, 6.0]}
        ]"#;
        let records = parse_track(json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].version, 1);
        assert_eq!(records[0].kind, PlatformKind::Start);
        assert_eq!(records[1].kind, PlatformKind::Normal);
        assert_eq!(records[1].motion, Motion::Static);
    }

    #[test]
    fn test_build_rejects_degenerate_record() {
        let mut bad = record(0, PlatformKind::Normal);
        bad.height = 0.0;
        assert!(build_platforms(&[bad]).is_err());
    }
}
