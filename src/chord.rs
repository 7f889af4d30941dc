//! Scale-degree chords resolved against the wheel
//!
//! The key wheel gives the tonic, the signed distance from the key wheel to the
//! mode wheel picks one of the seven diatonic modes. A chord is a set of scale
//! degrees (1-based, degrees past 7 land in the next octave).

use crate::wheel::Wheel;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub const DEFAULT_BASE_PITCH: u8 = 60;

/// Diatonic modes ordered by their place on the circle of fifths relative to the tonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Lydian,
    Ionian,
    Mixolydian,
    Dorian,
    Aeolian,
    Phrygian,
    Locrian,
}

impl Mode {
    /// Maps a signed key-to-mode wheel offset onto a mode. Offsets outside the
    /// diatonic band [-5, 1] clamp to its nearest edge.
    pub fn from_offset(offset: i32) -> Self {
        match offset.clamp(-5, 1) {
            1 => Mode::Lydian,
            0 => Mode::Ionian,
            -1 => Mode::Mixolydian,
            -2 => Mode::Dorian,
            -3 => Mode::Aeolian,
            -4 => Mode::Phrygian,
            _ => Mode::Locrian,
        }
    }

    pub fn brightness(self) -> i32 {
        match self {
            Mode::Lydian => 1,
            Mode::Ionian => 0,
            Mode::Mixolydian => -1,
            Mode::Dorian => -2,
            Mode::Aeolian => -3,
            Mode::Phrygian => -4,
            Mode::Locrian => -5,
        }
    }

    /// Semitone offsets of degrees 1..=7 above the tonic.
    pub fn intervals(self) -> [u8; 7] {
        let b = self.brightness();
        let mut intervals = [0u8; 7];
        for (slot, fifths) in intervals.iter_mut().zip(b - 1..=b + 5) {
            *slot = (fifths * 7).rem_euclid(12) as u8;
        }
        intervals.sort_unstable();
        intervals
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Ordered, deduplicated set of scale degrees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordDegree(Vec<u8>);

impl ChordDegree {
    /// Returns `None` for an empty set or one containing degree 0.
    pub fn new(degrees: &[u8]) -> Option<Self> {
        if degrees.is_empty() || degrees.contains(&0) {
            return None;
        }
        let set: BTreeSet<u8> = degrees.iter().copied().collect();
        Some(ChordDegree(set.into_iter().collect()))
    }

    pub fn degrees(&self) -> &[u8] {
        &self.0
    }
}

/// Logical identity of one performance control, e.g. the `a` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TriggerId(pub char);

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.0)
    }
}

/// Which chord each trigger plays.
#[derive(Debug, Clone)]
pub struct ChordBank {
    bindings: BTreeMap<TriggerId, ChordDegree>,
}

impl ChordBank {
    pub fn empty() -> Self {
        ChordBank {
            bindings: BTreeMap::new(),
        }
    }

    pub fn bind(&mut self, trigger: TriggerId, chord: ChordDegree) -> Option<ChordDegree> {
        self.bindings.insert(trigger, chord)
    }

    pub fn get(&self, trigger: TriggerId) -> Option<&ChordDegree> {
        self.bindings.get(&trigger)
    }

    pub fn contains(&self, trigger: TriggerId) -> bool {
        self.bindings.contains_key(&trigger)
    }

    pub fn triggers(&self) -> impl Iterator<Item = TriggerId> + '_ {
        self.bindings.keys().copied()
    }
}

impl Default for ChordBank {
    fn default() -> Self {
        let layout: [(char, &[u8]); 7] = [
            ('a', &[1]),
            ('s', &[1, 5]),
            ('d', &[1, 3, 5]),
            ('f', &[2]),
            ('g', &[4]),
            ('h', &[6]),
            ('j', &[7]),
        ];
        let mut bank = ChordBank::empty();
        for (key, degrees) in layout {
            if let Some(chord) = ChordDegree::new(degrees) {
                bank.bind(TriggerId(key), chord);
            }
        }
        bank
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ChordResolver {
    base_pitch: u8,
}

impl Default for ChordResolver {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_PITCH)
    }
}

impl ChordResolver {
    pub fn new(base_pitch: u8) -> Self {
        ChordResolver {
            base_pitch: base_pitch.min(127),
        }
    }

    pub fn mode(&self, wheel: &Wheel) -> Mode {
        Mode::from_offset(wheel.mode_offset())
    }

    /// MIDI pitch of the current tonic, within the octave starting at `base_pitch`.
    pub fn tonic(&self, wheel: &Wheel) -> u8 {
        self.base_pitch
            .saturating_add(wheel.key().pitch_class())
            .min(127)
    }

    /// Ascending, deduplicated pitches for `chord` under the current key and mode.
    /// Pitches that would exceed 127 are left out.
    pub fn resolve(&self, chord: &ChordDegree, wheel: &Wheel) -> Vec<u8> {
        let tonic = self.tonic(wheel) as u32;
        let intervals = self.mode(wheel).intervals();

        let pitches: BTreeSet<u8> = chord
            .degrees()
            .iter()
            .filter_map(|&degree| {
                let step = (degree - 1) as usize;
                let pitch = tonic + intervals[step % 7] as u32 + 12 * (step / 7) as u32;
                u8::try_from(pitch).ok().filter(|p| *p <= 127)
            })
            .collect();

        pitches.into_iter().collect()
    }
}
