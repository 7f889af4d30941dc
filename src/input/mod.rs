//! Input normalization
//!
//! Hardware sources report raw key transitions and dial movement as
//! [`RawSignal`]s; the [`Normalizer`] turns one tick's worth of them into the
//! [`ControlEvent`]s the engine understands. Unmapped input produces nothing.

mod dial;
mod keyboard;

pub use dial::{parse_event, DialInput, POWERMATE_PATH};
pub use keyboard::{map_key_event, KeyboardInput};

use crate::chord::{ChordBank, TriggerId};
use crate::ring::RingModifier;
use crate::wheel::Direction;
use std::collections::VecDeque;
use std::error::Error;
use std::fmt;

/// Keys the normalizer knows about, independent of the terminal backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawKey {
    Char(char),
    Escape,
    Shift,
    Alt,
    Control,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawSignal {
    KeyDown(RawKey),
    KeyUp(RawKey),
    DialDelta(i32),
    DialButton { pressed: bool },
    Quit,
}

/// Everything one source reported since the previous tick, in arrival order.
pub type RawFrame = Vec<RawSignal>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    Quit,
    RingModifierDown(RingModifier),
    RingModifierUp,
    LatchModifierDown,
    LatchModifierUp,
    Rotate(Direction),
    TriggerStart(TriggerId),
    TriggerStop(TriggerId),
}

#[derive(Debug)]
pub enum InputError {
    Io(std::io::Error),
    Unsupported(String),
    Disconnected(String),
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::Io(e) => write!(f, "input I/O error: {}", e),
            InputError::Unsupported(reason) => write!(f, "input not usable: {}", reason),
            InputError::Disconnected(name) => write!(f, "input device disconnected: {}", name),
        }
    }
}

impl Error for InputError {}

impl From<std::io::Error> for InputError {
    fn from(e: std::io::Error) -> Self {
        InputError::Io(e)
    }
}

/// A hardware source polled once per tick. Implementations must return
/// immediately when nothing is pending.
pub trait InputSource {
    fn poll(&mut self) -> RawFrame;
}

impl<I: InputSource + ?Sized> InputSource for Box<I> {
    fn poll(&mut self) -> RawFrame {
        (**self).poll()
    }
}

/// Polls several sources in order and concatenates what they report.
#[derive(Default)]
pub struct CompositeInput {
    sources: Vec<Box<dyn InputSource>>,
}

impl CompositeInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, source: Box<dyn InputSource>) {
        self.sources.push(source);
    }
}

impl InputSource for CompositeInput {
    fn poll(&mut self) -> RawFrame {
        self.sources.iter_mut().flat_map(|s| s.poll()).collect()
    }
}

/// Replays prepared frames, one per poll, then reports nothing.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    frames: VecDeque<RawFrame>,
}

impl ScriptedInput {
    pub fn new<I>(frames: I) -> Self
    where
        I: IntoIterator<Item = RawFrame>,
    {
        ScriptedInput {
            frames: frames.into_iter().collect(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> RawFrame {
        self.frames.pop_front().unwrap_or_default()
    }
}

/// Borrows the live chord bank, so a trigger bound at runtime maps on the
/// very next tick.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'a> {
    bank: &'a ChordBank,
}

impl<'a> Normalizer<'a> {
    pub fn new(bank: &'a ChordBank) -> Self {
        Normalizer { bank }
    }

    pub fn normalize(&self, frame: &[RawSignal]) -> Vec<ControlEvent> {
        frame.iter().filter_map(|s| self.map_signal(*s)).collect()
    }

    pub fn map_signal(&self, signal: RawSignal) -> Option<ControlEvent> {
        match signal {
            RawSignal::Quit => Some(ControlEvent::Quit),
            RawSignal::DialDelta(delta) if delta > 0 => {
                Some(ControlEvent::Rotate(Direction::Clockwise))
            }
            RawSignal::DialDelta(delta) if delta < 0 => {
                Some(ControlEvent::Rotate(Direction::CounterClockwise))
            }
            RawSignal::DialDelta(_) => None,
            RawSignal::DialButton { pressed: true } => Some(ControlEvent::LatchModifierDown),
            RawSignal::DialButton { pressed: false } => Some(ControlEvent::LatchModifierUp),
            RawSignal::KeyDown(key) => self.key_down(key),
            RawSignal::KeyUp(key) => self.key_up(key),
        }
    }

    fn key_down(&self, key: RawKey) -> Option<ControlEvent> {
        match key {
            RawKey::Escape => Some(ControlEvent::Quit),
            RawKey::Shift => Some(ControlEvent::RingModifierDown(RingModifier::Key)),
            RawKey::Alt => Some(ControlEvent::RingModifierDown(RingModifier::All)),
            RawKey::Control => None,
            RawKey::Char(' ') => Some(ControlEvent::LatchModifierDown),
            // Shift is the key-ring modifier, so accept the shifted glyphs too.
            RawKey::Char(',' | '<') => Some(ControlEvent::Rotate(Direction::Clockwise)),
            RawKey::Char('.' | '>') => Some(ControlEvent::Rotate(Direction::CounterClockwise)),
            RawKey::Char(c) => self.trigger(c).map(ControlEvent::TriggerStart),
        }
    }

    fn key_up(&self, key: RawKey) -> Option<ControlEvent> {
        match key {
            RawKey::Shift | RawKey::Alt => Some(ControlEvent::RingModifierUp),
            RawKey::Char(' ') => Some(ControlEvent::LatchModifierUp),
            RawKey::Char(c) => self.trigger(c).map(ControlEvent::TriggerStop),
            RawKey::Escape | RawKey::Control => None,
        }
    }

    fn trigger(&self, c: char) -> Option<TriggerId> {
        let id = TriggerId(c.to_ascii_lowercase());
        self.bank.contains(id).then_some(id)
    }
}
