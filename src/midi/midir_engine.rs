use crate::midi::{ClockInput, ClockMessage, MidiError, MidiMessage, MidiSink, Result};
use crossbeam::channel::{unbounded, Receiver, TryRecvError};
use log::{debug, info};
use midir::{Ignore, MidiIO, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};

// Picks the first port whose name contains `device_name`, or the first port at all.
fn find_port<T: MidiIO>(io: &T, device_name: Option<&str>) -> Result<(T::Port, String)> {
    let ports = io.ports();
    let available: Vec<String> = ports.iter().filter_map(|p| io.port_name(p).ok()).collect();
    debug!("Available MIDI ports: {:?}", available);

    let port = match device_name {
        Some(name) => ports
            .iter()
            .find(|p| io.port_name(p).unwrap_or_default().contains(name))
            .ok_or_else(|| {
                MidiError::ConnectionError(format!(
                    "device '{}' not found in {:?}",
                    name, available
                ))
            })?,
        None => ports
            .first()
            .ok_or_else(|| MidiError::ConnectionError("no MIDI ports available".into()))?,
    };

    let port_name = io.port_name(port)?;
    Ok((port.clone(), port_name))
}

/// Output sink backed by a midir connection
pub struct MidirSink {
    connection: MidiOutputConnection,
    port_name: String,
}

impl MidirSink {
    pub fn connect(device_name: Option<&str>) -> Result<Self> {
        let midi_out = MidiOutput::new("helmrs-output")?;
        let (port, port_name) = find_port(&midi_out, device_name)?;

        info!("Connecting to MIDI output port: {}", port_name);
        let connection = midi_out.connect(&port, "helmrs-output-conn")?;
        Ok(MidirSink {
            connection,
            port_name,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl MidiSink for MidirSink {
    fn send(&mut self, msg: MidiMessage) -> Result<()> {
        let bytes = msg.to_bytes();
        debug!("Sending MIDI {:?} as {:02X?}", msg, bytes);
        self.connection.send(&bytes)?;
        Ok(())
    }
}

/// Clock input backed by a midir connection.
///
/// midir delivers messages on its own callback thread; they are queued on a
/// channel so the tick thread can drain them with a zero-timeout read.
pub struct MidirClockInput {
    _connection: MidiInputConnection<()>,
    rx: Receiver<Vec<u8>>,
    port_name: String,
}

impl MidirClockInput {
    pub fn connect(device_name: Option<&str>) -> Result<Self> {
        let mut midi_in = MidiInput::new("helmrs-clock-in")?;
        // Timing messages must come through; SysEx and active sensing are noise here.
        midi_in.ignore(Ignore::SysexAndActiveSense);

        let (port, port_name) = find_port(&midi_in, device_name)?;
        info!("Connecting to MIDI clock input port: {}", port_name);

        let (tx, rx) = unbounded();
        let connection = midi_in.connect(
            &port,
            "helmrs-clock-in-conn",
            move |_stamp, message, _| {
                // Only timing and transport bytes are queued for the tick.
                if ClockMessage::from_bytes(message).is_some() {
                    let _ = tx.send(message.to_vec());
                }
            },
            (),
        )?;

        Ok(MidirClockInput {
            _connection: connection,
            rx,
            port_name,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl ClockInput for MidirClockInput {
    fn try_recv(&mut self) -> Result<Option<Vec<u8>>> {
        match self.rx.try_recv() {
            Ok(bytes) => Ok(Some(bytes)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                Err(MidiError::Disconnected(self.port_name.clone()))
            }
        }
    }
}
