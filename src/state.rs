use crate::chord::Mode;
use crate::lifecycle::ActiveNoteSet;
use crate::ring::RotationRing;
use crate::wheel::{KeyPosition, ModePosition};

/// Read-only copy of the engine state for renderers and diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSnapshot {
    pub key: KeyPosition,
    pub mode_position: ModePosition,
    pub mode: Mode,
    pub tonic: u8,
    pub ring: RotationRing,
    pub active: ActiveNoteSet,
    pub latch_engaged: bool,
    pub captured: ActiveNoteSet,
    pub tick_count: u64,
}

impl EngineSnapshot {
    pub fn sounding_count(&self) -> usize {
        self.active.values().map(|set| set.len()).sum()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} {} (ring {:?}), {} note(s) sounding, latch {}",
            self.key,
            self.mode,
            self.ring,
            self.sounding_count(),
            if self.latch_engaged { "on" } else { "off" }
        )
    }
}
