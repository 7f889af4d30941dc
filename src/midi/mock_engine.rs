use crate::midi::{ClockInput, MidiError, MidiMessage, MidiSink, Result};
use std::collections::VecDeque;

/// Sink that keeps everything written to it, for tests and dry runs.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub sent: Vec<MidiMessage>,
    failing: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every write fails with `SendError`.
    pub fn failing() -> Self {
        RecordingSink {
            sent: Vec::new(),
            failing: true,
        }
    }

    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    pub fn take(&mut self) -> Vec<MidiMessage> {
        std::mem::take(&mut self.sent)
    }

    pub fn note_ons(&self) -> Vec<u8> {
        self.sent
            .iter()
            .filter(|m| m.is_note_on())
            .filter_map(MidiMessage::note)
            .collect()
    }

    pub fn note_offs(&self) -> Vec<u8> {
        self.sent
            .iter()
            .filter(|m| m.is_note_off())
            .filter_map(MidiMessage::note)
            .collect()
    }

    pub fn raw(&self) -> Vec<Vec<u8>> {
        self.sent
            .iter()
            .filter_map(|m| match m {
                MidiMessage::Raw(bytes) => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }
}

impl MidiSink for RecordingSink {
    fn send(&mut self, msg: MidiMessage) -> Result<()> {
        if self.failing {
            return Err(MidiError::SendError("mock sink failure".to_string()));
        }
        self.sent.push(msg);
        Ok(())
    }
}

/// Clock input that replays a fixed script of read outcomes, then reports nothing.
#[derive(Debug, Default)]
pub struct ScriptedClockInput {
    script: VecDeque<Result<Option<Vec<u8>>>>,
    pub reads: usize,
}

impl ScriptedClockInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_messages<I>(messages: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        ScriptedClockInput {
            script: messages.into_iter().map(|m| Ok(Some(m))).collect(),
            reads: 0,
        }
    }

    pub fn push(&mut self, outcome: Result<Option<Vec<u8>>>) {
        self.script.push_back(outcome);
    }
}

impl ClockInput for ScriptedClockInput {
    fn try_recv(&mut self) -> Result<Option<Vec<u8>>> {
        self.reads += 1;
        self.script.pop_front().unwrap_or(Ok(None))
    }
}
