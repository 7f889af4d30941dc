use std::error::Error;
use std::fmt;

/// Custom error type for MIDI operations
#[derive(Debug, Clone, PartialEq)]
pub enum MidiError {
    /// Error when sending a MIDI message
    SendError(String),
    /// Error when receiving a MIDI message
    RecvError(String),
    /// Error when connecting to a MIDI device
    ConnectionError(String),
    /// The device went away; the feature using it should stop trying
    Disconnected(String),
}

impl fmt::Display for MidiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MidiError::SendError(msg) => write!(f, "MIDI send error: {}", msg),
            MidiError::RecvError(msg) => write!(f, "MIDI receive error: {}", msg),
            MidiError::ConnectionError(msg) => write!(f, "MIDI connection error: {}", msg),
            MidiError::Disconnected(msg) => write!(f, "MIDI device disconnected: {}", msg),
        }
    }
}

impl Error for MidiError {}

impl From<midir::InitError> for MidiError {
    fn from(e: midir::InitError) -> Self {
        MidiError::ConnectionError(e.to_string())
    }
}

impl From<midir::PortInfoError> for MidiError {
    fn from(e: midir::PortInfoError) -> Self {
        MidiError::ConnectionError(e.to_string())
    }
}

impl<T> From<midir::ConnectError<T>> for MidiError {
    fn from(e: midir::ConnectError<T>) -> Self {
        MidiError::ConnectionError(e.to_string())
    }
}

impl From<midir::SendError> for MidiError {
    fn from(e: midir::SendError) -> Self {
        MidiError::SendError(e.to_string())
    }
}

/// Represents a MIDI message written to the output sink
#[derive(Debug, Clone, PartialEq)]
pub enum MidiMessage {
    /// Note On message with note number and velocity
    NoteOn { channel: u8, note: u8, velocity: u8 },
    /// Note Off message with note number and release velocity
    NoteOff { channel: u8, note: u8, velocity: u8 },
    /// Channel mode message 123
    AllNotesOff { channel: u8 },
    /// Bytes passed through untouched (forwarded clock traffic)
    Raw(Vec<u8>),
}

impl MidiMessage {
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            MidiMessage::NoteOn {
                channel,
                note,
                velocity,
            } => vec![0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F],
            MidiMessage::NoteOff {
                channel,
                note,
                velocity,
            } => vec![0x80 | (channel & 0x0F), note & 0x7F, velocity & 0x7F],
            MidiMessage::AllNotesOff { channel } => vec![0xB0 | (channel & 0x0F), 123, 0],
            MidiMessage::Raw(bytes) => bytes.clone(),
        }
    }

    pub fn is_note_on(&self) -> bool {
        matches!(self, MidiMessage::NoteOn { .. })
    }

    pub fn is_note_off(&self) -> bool {
        matches!(self, MidiMessage::NoteOff { .. })
    }

    /// Pitch carried by a note message, if any.
    pub fn note(&self) -> Option<u8> {
        match self {
            MidiMessage::NoteOn { note, .. } | MidiMessage::NoteOff { note, .. } => Some(*note),
            _ => None,
        }
    }
}

/// Builds the message the host sends on shutdown to release anything still sounding.
pub fn all_notes_off(channel: u8) -> MidiMessage {
    MidiMessage::AllNotesOff { channel }
}

/// Result type for MIDI operations
pub type Result<T> = std::result::Result<T, MidiError>;

/// Destination for every message the engine produces, notes and forwarded clock alike
pub trait MidiSink {
    /// Writes one message; must not block at controller message rates
    fn send(&mut self, msg: MidiMessage) -> Result<()>;
}

impl<S: MidiSink + ?Sized> MidiSink for Box<S> {
    fn send(&mut self, msg: MidiMessage) -> Result<()> {
        (**self).send(msg)
    }
}

/// Secondary input carrying an external MIDI clock
pub trait ClockInput {
    /// Returns the next pending message, or `None` immediately when nothing is queued
    fn try_recv(&mut self) -> Result<Option<Vec<u8>>>;
}

impl<C: ClockInput + ?Sized> ClockInput for Box<C> {
    fn try_recv(&mut self) -> Result<Option<Vec<u8>>> {
        (**self).try_recv()
    }
}

/// Sink used when MIDI output is switched off: messages are only logged.
#[derive(Debug, Default)]
pub struct LogSink;

impl MidiSink for LogSink {
    fn send(&mut self, msg: MidiMessage) -> Result<()> {
        log::debug!("MIDI disabled, dropping {:?}", msg);
        Ok(())
    }
}
