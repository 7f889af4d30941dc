//! Note on/off bookkeeping per trigger, with latch (sustain)
//!
//! Every (trigger, pitch) pair alternates strictly between note-on and
//! note-off: starting an already sounding pitch or stopping a silent one
//! emits nothing.

use crate::chord::TriggerId;
use crate::midi::MidiMessage;
use log::debug;
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_VELOCITY: u8 = 100;

pub type ActiveNoteSet = BTreeMap<TriggerId, BTreeSet<u8>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatchState {
    engaged: bool,
    captured: ActiveNoteSet,
    // Triggers whose stop was swallowed while engaged.
    released: BTreeSet<TriggerId>,
}

impl LatchState {
    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    pub fn captured(&self) -> &ActiveNoteSet {
        &self.captured
    }

    pub fn was_released(&self, id: TriggerId) -> bool {
        self.released.contains(&id)
    }
}

#[derive(Debug, Clone)]
pub struct NoteLifecycle {
    channel: u8,
    velocity: u8,
    active: ActiveNoteSet,
    latch: LatchState,
}

impl Default for NoteLifecycle {
    fn default() -> Self {
        Self::new(0, DEFAULT_VELOCITY)
    }
}

impl NoteLifecycle {
    pub fn new(channel: u8, velocity: u8) -> Self {
        NoteLifecycle {
            channel: channel & 0x0F,
            velocity: velocity.clamp(1, 127),
            active: ActiveNoteSet::new(),
            latch: LatchState::default(),
        }
    }

    pub fn active(&self) -> &ActiveNoteSet {
        &self.active
    }

    pub fn active_for(&self, id: TriggerId) -> Vec<u8> {
        self.active
            .get(&id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn latch(&self) -> &LatchState {
        &self.latch
    }

    fn note_on(&self, note: u8) -> MidiMessage {
        MidiMessage::NoteOn {
            channel: self.channel,
            note,
            velocity: self.velocity,
        }
    }

    fn note_off(&self, note: u8) -> MidiMessage {
        MidiMessage::NoteOff {
            channel: self.channel,
            note,
            velocity: 0,
        }
    }

    pub fn on_trigger_start(&mut self, id: TriggerId, pitches: &[u8]) -> Vec<MidiMessage> {
        let entry = self.active.entry(id).or_default();
        let fresh: Vec<u8> = pitches.iter().copied().filter(|p| entry.insert(*p)).collect();
        if entry.is_empty() {
            self.active.remove(&id);
        }

        if self.latch.engaged {
            self.latch
                .captured
                .entry(id)
                .or_default()
                .extend(pitches.iter().copied());
        }

        debug!("Trigger {} start: pitches {:?}, new {:?}", id, pitches, fresh);
        fresh.into_iter().map(|p| self.note_on(p)).collect()
    }

    pub fn on_trigger_stop(&mut self, id: TriggerId) -> Vec<MidiMessage> {
        if self.latch.engaged {
            if let Some(sounding) = self.active.get(&id) {
                self.latch
                    .captured
                    .entry(id)
                    .or_default()
                    .extend(sounding.iter().copied());
                self.latch.released.insert(id);
                debug!("Trigger {} stop held by latch: {:?}", id, sounding);
            }
            return Vec::new();
        }

        let Some(sounding) = self.active.remove(&id) else {
            return Vec::new();
        };
        debug!("Trigger {} stop: releasing {:?}", id, sounding);
        sounding.into_iter().map(|p| self.note_off(p)).collect()
    }

    pub fn on_latch_engage(&mut self) {
        if !self.latch.engaged {
            debug!("Latch engaged");
        }
        self.latch.engaged = true;
    }

    /// Ends the latch. Captured notes of triggers released while latched stop now;
    /// triggers still held since their capture keep sounding until their own release.
    pub fn on_latch_disengage(&mut self) -> Vec<MidiMessage> {
        self.latch.engaged = false;
        let captured = std::mem::take(&mut self.latch.captured);
        let released = std::mem::take(&mut self.latch.released);

        let mut stopped = Vec::new();
        for (id, pitches) in captured {
            if !released.contains(&id) {
                debug!("Latch released while {} is still held", id);
                continue;
            }
            let Some(sounding) = self.active.get_mut(&id) else {
                continue;
            };
            stopped.extend(pitches.into_iter().filter(|p| sounding.remove(p)));
            if sounding.is_empty() {
                self.active.remove(&id);
            }
        }

        debug!("Latch disengaged, releasing {:?}", stopped);
        stopped.into_iter().map(|p| self.note_off(p)).collect()
    }
}
