//! MIDI functionality for helmrs
//!
//! This module provides the MIDI side of the controller:
//! - Core message types, the output sink and clock input traits, and error handling
//! - The clock forwarder that relays an external MIDI clock to the output
//! - Real device communication via midir
//! - Recording/scripted implementations for testing
//!
mod clock;
mod engine;
pub mod midir_engine;
pub mod mock_engine;

pub use engine::{all_notes_off, ClockInput, LogSink, MidiError, MidiMessage, MidiSink, Result};

pub use midir_engine::{MidirClockInput, MidirSink};
pub use mock_engine::{RecordingSink, ScriptedClockInput};

pub use clock::{ClockForwarder, ClockMessage, DEFAULT_CLOCK_READS_PER_TICK};
