pub mod chord;
pub mod cli;
pub mod config;
pub mod event_loop;
pub mod input;
pub mod lifecycle;
pub mod logging;
pub mod midi;
pub mod ring;
pub mod scheduler;
pub mod state;
pub mod wheel;

pub use chord::{ChordBank, ChordDegree, ChordResolver, Mode, TriggerId};
pub use config::Settings;
pub use event_loop::{Engine, EventLoop, TickReport};
pub use input::{ControlEvent, RawFrame, RawKey, RawSignal};
pub use lifecycle::NoteLifecycle;
pub use ring::{RingModifier, RotationRing};
pub use state::EngineSnapshot;
pub use wheel::{Direction, FifthsPosition, Wheel};

use input::{CompositeInput, DialInput, KeyboardInput};
use log::{debug, info, warn};
use midi::{ClockForwarder, ClockInput, LogSink, MidiSink, MidirClockInput, MidirSink};

/// Opens the output sink. Failure here is the one condition the host treats as fatal.
pub fn open_output(settings: &Settings) -> midi::Result<Box<dyn MidiSink>> {
    if !settings.midi_enabled {
        info!("MIDI output disabled, messages will only be logged");
        return Ok(Box::new(LogSink));
    }
    let sink = MidirSink::connect(settings.midi_output_device.as_deref())?;
    info!("MIDI output connected: {}", sink.port_name());
    Ok(Box::new(sink))
}

/// Builds the clock forwarder; an unavailable clock port leaves it disabled.
pub fn open_clock_forwarder(settings: &Settings) -> ClockForwarder {
    clock_forwarder_with(settings, || {
        let input = MidirClockInput::connect(settings.midi_clock_input_device.as_deref())?;
        info!("MIDI clock input connected: {}", input.port_name());
        Ok(Box::new(input))
    })
}

/// Connects the clock source only when forwarding is configured on.
pub fn clock_forwarder_with<F>(settings: &Settings, connect: F) -> ClockForwarder
where
    F: FnOnce() -> midi::Result<Box<dyn ClockInput>>,
{
    if !settings.midi_clock_forwarding_enabled {
        debug!("MIDI clock forwarding not configured");
        return ClockForwarder::disabled();
    }
    match connect() {
        Ok(input) => ClockForwarder::new(input, settings.clock_messages_per_tick),
        Err(e) => {
            warn!("MIDI clock input unavailable, forwarding disabled: {}", e);
            ClockForwarder::disabled()
        }
    }
}

/// Keyboard first, then the dial when enabled and present.
pub fn open_inputs(settings: &Settings) -> Result<CompositeInput, input::InputError> {
    let mut inputs = CompositeInput::new();
    inputs.push(Box::new(KeyboardInput::enable()?));

    if settings.dial_device_enabled {
        match DialInput::open(&settings.dial_device_path) {
            Ok(dial) => inputs.push(Box::new(dial)),
            Err(e) => warn!(
                "Dial at {} unavailable, continuing without it: {}",
                settings.dial_device_path, e
            ),
        }
    }
    Ok(inputs)
}
