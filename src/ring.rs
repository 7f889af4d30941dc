//! Rotation ring selection
//!
//! Held modifiers pick which wheel(s) rotate events land on. The selector is
//! level-triggered: the most recent modifier press wins and releasing either
//! modifier drops back to the mode wheel.

use crate::wheel::{Direction, Wheel, WheelTarget};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationRing {
    Key,
    #[default]
    Mode,
    All,
}

impl RotationRing {
    pub fn targets(self) -> &'static [WheelTarget] {
        match self {
            RotationRing::Key => &[WheelTarget::Key],
            RotationRing::Mode => &[WheelTarget::Mode],
            RotationRing::All => &[WheelTarget::Key, WheelTarget::Mode],
        }
    }
}

/// The two modifiers that move the ring off its resting state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingModifier {
    Key,
    All,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RingSelector {
    ring: RotationRing,
}

impl RingSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ring(&self) -> RotationRing {
        self.ring
    }

    pub fn modifier_down(&mut self, modifier: RingModifier) {
        self.ring = match modifier {
            RingModifier::Key => RotationRing::Key,
            RingModifier::All => RotationRing::All,
        };
        debug!("Rotation ring -> {:?}", self.ring);
    }

    pub fn modifier_up(&mut self) {
        self.ring = RotationRing::Mode;
        debug!("Rotation ring -> {:?}", self.ring);
    }

    /// Applies one rotation to whichever wheels the ring currently selects.
    pub fn route(&self, wheel: &mut Wheel, direction: Direction) {
        for target in self.ring.targets() {
            wheel.rotate(*target, direction);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_ring_is_mode() {
        assert_eq!(RingSelector::new().ring(), RotationRing::Mode);
    }

    #[test]
    fn test_last_modifier_down_wins() {
        let mut selector = RingSelector::new();
        selector.modifier_down(RingModifier::Key);
        selector.modifier_down(RingModifier::All);
        assert_eq!(selector.ring(), RotationRing::All);
        selector.modifier_down(RingModifier::Key);
        assert_eq!(selector.ring(), RotationRing::Key);
    }

    #[test]
    fn test_all_ring_keeps_relative_offset() {
        let mut selector = RingSelector::new();
        let mut wheel = Wheel::default();
        selector.route(&mut wheel, Direction::CounterClockwise);
        let offset = wheel.mode_offset();

        selector.modifier_down(RingModifier::All);
        for _ in 0..5 {
            selector.route(&mut wheel, Direction::Clockwise);
        }
        assert_eq!(wheel.key().index(), 5);
        assert_eq!(wheel.mode_offset(), offset);
    }
}
