//! Circle-of-fifths key/mode wheels
//!
//! Both wheels are positions on the circle of fifths (0 = C, 1 = G, 2 = D, ...).
//! A clockwise step moves up a fifth, counter-clockwise down a fifth.

use log::debug;
use std::fmt;

pub const CIRCLE_SIZE: u8 = 12;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    pub fn step(self) -> i32 {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }
}

/// Index into the circle of fifths, always kept in [0, 11].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FifthsPosition(u8);

impl FifthsPosition {
    pub fn new(index: i32) -> Self {
        FifthsPosition(index.rem_euclid(CIRCLE_SIZE as i32) as u8)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn rotated(self, steps: i32) -> Self {
        Self::new(self.0 as i32 + steps)
    }

    /// Pitch class (semitones above C) of this position.
    pub fn pitch_class(self) -> u8 {
        (self.0 * 7) % 12
    }

    pub fn name(self) -> &'static str {
        NOTE_NAMES[self.pitch_class() as usize]
    }
}

impl fmt::Display for FifthsPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

pub type KeyPosition = FifthsPosition;
pub type ModePosition = FifthsPosition;

/// Which wheel a single rotation lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelTarget {
    Key,
    Mode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Wheel {
    key: KeyPosition,
    mode: ModePosition,
}

impl Wheel {
    pub fn new(key: KeyPosition, mode: ModePosition) -> Self {
        Wheel { key, mode }
    }

    pub fn key(&self) -> KeyPosition {
        self.key
    }

    pub fn mode(&self) -> ModePosition {
        self.mode
    }

    pub fn rotate(&mut self, target: WheelTarget, direction: Direction) {
        match target {
            WheelTarget::Key => self.key = self.key.rotated(direction.step()),
            WheelTarget::Mode => self.mode = self.mode.rotated(direction.step()),
        }
        debug!(
            "Rotated {:?} wheel {:?}: key={} mode={}",
            target,
            direction,
            self.key.index(),
            self.mode.index()
        );
    }

    /// Signed distance from the key wheel to the mode wheel, folded into [-6, 5].
    pub fn mode_offset(&self) -> i32 {
        let raw = (self.mode.index() as i32 - self.key.index() as i32).rem_euclid(12);
        if raw >= 6 {
            raw - 12
        } else {
            raw
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_wrap_both_ways() {
        assert_eq!(FifthsPosition::new(12).index(), 0);
        assert_eq!(FifthsPosition::new(-1).index(), 11);
        assert_eq!(FifthsPosition::new(11).rotated(1).index(), 0);
    }

    #[test]
    fn test_pitch_class_follows_fifths() {
        let names: Vec<&str> = (0..12).map(|i| FifthsPosition::new(i).name()).collect();
        assert_eq!(
            names,
            vec!["C", "G", "D", "A", "E", "B", "F#", "C#", "Ab", "Eb", "Bb", "F"]
        );
    }

    #[test]
    fn test_mode_offset_is_signed() {
        let wheel = Wheel::new(FifthsPosition::new(0), FifthsPosition::new(11));
        assert_eq!(wheel.mode_offset(), -1);
        let wheel = Wheel::new(FifthsPosition::new(3), FifthsPosition::new(4));
        assert_eq!(wheel.mode_offset(), 1);
        let wheel = Wheel::new(FifthsPosition::new(0), FifthsPosition::new(6));
        assert_eq!(wheel.mode_offset(), -6);
    }
}
