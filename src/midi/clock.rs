//! External MIDI clock relay
//!
//! Timing and transport bytes read from a secondary input port are written
//! unmodified to the shared output sink, after the tick's note traffic.

use crate::midi::{ClockInput, MidiError, MidiMessage, MidiSink};
use log::{debug, info, trace, warn};

/// Represents the MIDI real-time messages the forwarder relays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockMessage {
    Tick,
    Start,
    Stop,
    Continue,
}

impl ClockMessage {
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        match data.first()? {
            0xF8 => Some(ClockMessage::Tick),
            0xFA => Some(ClockMessage::Start),
            0xFB => Some(ClockMessage::Continue),
            0xFC => Some(ClockMessage::Stop),
            _ => None,
        }
    }
}

/// Clock messages relayed per tick unless configured otherwise. At 24 pulses
/// per quarter note and 60 ticks per second this keeps up with 600 BPM.
pub const DEFAULT_CLOCK_READS_PER_TICK: usize = 4;

pub struct ClockForwarder {
    source: Option<Box<dyn ClockInput>>,
    reads_per_tick: usize,
    forwarded: u64,
    dropped: u64,
}

impl ClockForwarder {
    /// A forwarder that never reads and never writes.
    pub fn disabled() -> Self {
        ClockForwarder {
            source: None,
            reads_per_tick: 0,
            forwarded: 0,
            dropped: 0,
        }
    }

    pub fn new(source: Box<dyn ClockInput>, reads_per_tick: usize) -> Self {
        info!(
            "MIDI clock forwarding enabled ({} read(s) per tick)",
            reads_per_tick.max(1)
        );
        ClockForwarder {
            source: Some(source),
            reads_per_tick: reads_per_tick.max(1),
            forwarded: 0,
            dropped: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.source.is_some()
    }

    pub fn forwarded(&self) -> u64 {
        self.forwarded
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Performs this tick's zero-timeout reads and relays what arrived.
    /// Non-clock messages are discarded without counting against the budget.
    ///
    /// Returns how many messages reached the sink.
    pub fn poll(&mut self, sink: &mut dyn MidiSink) -> usize {
        let mut written = 0;
        let mut relayed = 0;

        while relayed < self.reads_per_tick {
            let Some(source) = self.source.as_mut() else {
                break;
            };

            let bytes = match source.try_recv() {
                Ok(Some(bytes)) => bytes,
                Ok(None) => break,
                Err(MidiError::Disconnected(name)) => {
                    warn!(
                        "Clock input '{}' disconnected, forwarding disabled for this session",
                        name
                    );
                    self.source = None;
                    break;
                }
                Err(e) => {
                    warn!("Clock read failed, retrying next tick: {}", e);
                    break;
                }
            };

            let Some(kind) = ClockMessage::from_bytes(&bytes) else {
                debug!("Ignoring non-clock message on clock input: {:02X?}", bytes);
                continue;
            };

            relayed += 1;
            trace!("Forwarding clock message {:?}", kind);
            match sink.send(MidiMessage::Raw(bytes)) {
                Ok(()) => {
                    self.forwarded += 1;
                    written += 1;
                }
                Err(e) => {
                    self.dropped += 1;
                    warn!("Dropped clock message {:?}: {}", kind, e);
                }
            }
        }

        written
    }
}
