//! Griffin PowerMate dial over Linux evdev
//!
//! A reader thread blocks on the device node and hands decoded reports to the
//! tick thread through a channel. Each poll drains the channel: button
//! changes pass through in order and turns collapse into one summed delta.

use super::{InputError, InputSource, RawFrame, RawSignal};
use crossbeam::channel::{unbounded, Receiver, Sender, TryRecvError};
use log::{debug, info, warn};
use std::fs::File;
use std::io::Read;
use std::thread;

pub const POWERMATE_PATH: &str =
    "/dev/input/by-id/usb-Griffin_Technology__Inc._Griffin_PowerMate-event-if00";

// struct input_event { struct timeval time; __u16 type; __u16 code; __s32 value; }
#[cfg(target_pointer_width = "64")]
const TIMEVAL_SIZE: usize = 16;
#[cfg(not(target_pointer_width = "64"))]
const TIMEVAL_SIZE: usize = 8;
pub const EVENT_SIZE: usize = TIMEVAL_SIZE + 8;

const EV_KEY: u16 = 0x01;
const EV_REL: u16 = 0x02;
const REL_DIAL: u16 = 0x07;
const BTN_0: u16 = 0x100;

/// Decodes one `input_event` record; anything but dial turns and button
/// press/release is ignored.
pub fn parse_event(buf: &[u8]) -> Option<RawSignal> {
    if buf.len() < EVENT_SIZE {
        return None;
    }
    let kind = u16::from_ne_bytes([buf[TIMEVAL_SIZE], buf[TIMEVAL_SIZE + 1]]);
    let code = u16::from_ne_bytes([buf[TIMEVAL_SIZE + 2], buf[TIMEVAL_SIZE + 3]]);
    let value = i32::from_ne_bytes([
        buf[TIMEVAL_SIZE + 4],
        buf[TIMEVAL_SIZE + 5],
        buf[TIMEVAL_SIZE + 6],
        buf[TIMEVAL_SIZE + 7],
    ]);

    match (kind, code, value) {
        (EV_REL, REL_DIAL, delta) if delta != 0 => Some(RawSignal::DialDelta(delta)),
        (EV_KEY, BTN_0, 1) => Some(RawSignal::DialButton { pressed: true }),
        (EV_KEY, BTN_0, 0) => Some(RawSignal::DialButton { pressed: false }),
        _ => None,
    }
}

fn read_events<R: Read>(mut reader: R, tx: Sender<RawSignal>) {
    let mut buf = [0u8; EVENT_SIZE];
    loop {
        if let Err(e) = reader.read_exact(&mut buf) {
            warn!("Dial read failed, stopping reader: {}", e);
            break;
        }
        if let Some(signal) = parse_event(&buf) {
            if tx.send(signal).is_err() {
                debug!("Dial receiver dropped, stopping reader");
                break;
            }
        }
    }
}

pub struct DialInput {
    rx: Option<Receiver<RawSignal>>,
    path: String,
}

impl DialInput {
    pub fn open(path: &str) -> Result<Self, InputError> {
        let file = File::open(path)?;
        Self::from_reader(file, path)
    }

    /// Starts the reader thread over any byte stream of `input_event` records.
    pub fn from_reader<R: Read + Send + 'static>(reader: R, name: &str) -> Result<Self, InputError> {
        let (tx, rx) = unbounded();
        thread::Builder::new()
            .name("helmrs-dial".to_string())
            .spawn(move || read_events(reader, tx))?;
        info!("Dial reader started on {}", name);

        Ok(Self::from_receiver(rx, name))
    }

    fn from_receiver(rx: Receiver<RawSignal>, name: &str) -> Self {
        DialInput {
            rx: Some(rx),
            path: name.to_string(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.rx.is_some()
    }
}

impl InputSource for DialInput {
    fn poll(&mut self) -> RawFrame {
        let Some(rx) = &self.rx else {
            return RawFrame::new();
        };

        let mut frame = RawFrame::new();
        let mut turn: Option<(usize, i32)> = None;
        let mut disconnected = false;
        loop {
            match rx.try_recv() {
                Ok(RawSignal::DialDelta(delta)) => match turn.as_mut() {
                    Some((_, total)) => *total = total.saturating_add(delta),
                    None => {
                        turn = Some((frame.len(), delta));
                        frame.push(RawSignal::DialDelta(delta));
                    }
                },
                Ok(signal) => frame.push(signal),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }

        if let Some((slot, total)) = turn {
            if total == 0 {
                frame.remove(slot);
            } else {
                frame[slot] = RawSignal::DialDelta(total);
            }
        }

        if disconnected {
            warn!(
                "{}",
                InputError::Disconnected(format!("dial at {}, disabled for this session", self.path))
            );
            self.rx = None;
        }
        frame
    }
}
