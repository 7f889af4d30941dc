// event_loop.rs

use crate::chord::{ChordBank, ChordDegree, ChordResolver, TriggerId};
use crate::config::Settings;
use crate::input::{ControlEvent, InputSource, Normalizer};
use crate::lifecycle::NoteLifecycle;
use crate::midi::{ClockForwarder, MidiMessage, MidiSink};
use crate::ring::RingSelector;
use crate::scheduler::TickScheduler;
use crate::state::EngineSnapshot;
use crate::wheel::Wheel;
use log::{debug, info, trace, warn};

/// What one tick did, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub events: usize,
    pub notes_sent: usize,
    pub notes_dropped: usize,
    pub clock_forwarded: usize,
}

/// Owns all controller state and applies one tick of events at a time.
pub struct Engine {
    wheel: Wheel,
    ring: RingSelector,
    bank: ChordBank,
    resolver: ChordResolver,
    notes: NoteLifecycle,
    clock: ClockForwarder,
    running: bool,
    tick_count: u64,
}

impl Engine {
    pub fn new(settings: &Settings, clock: ClockForwarder) -> Self {
        Engine {
            wheel: Wheel::default(),
            ring: RingSelector::new(),
            bank: ChordBank::default(),
            resolver: ChordResolver::new(settings.base_pitch),
            notes: NoteLifecycle::new(settings.midi_channel, settings.velocity),
            clock,
            running: true,
            tick_count: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn ring(&self) -> &RingSelector {
        &self.ring
    }

    pub fn notes(&self) -> &NoteLifecycle {
        &self.notes
    }

    pub fn bank(&self) -> &ChordBank {
        &self.bank
    }

    /// Rebinds `id` to `chord`; returns the previous binding. Notes already
    /// sounding for `id` are released as they were started.
    pub fn bind(&mut self, id: TriggerId, chord: ChordDegree) -> Option<ChordDegree> {
        info!("Binding trigger {:?} to degrees {:?}", id, chord.degrees());
        self.bank.bind(id, chord)
    }

    /// Pitches `id` would sound right now; empty for an unbound trigger.
    pub fn resolve(&self, id: TriggerId) -> Vec<u8> {
        self.bank
            .get(id)
            .map(|chord| self.resolver.resolve(chord, &self.wheel))
            .unwrap_or_default()
    }

    /// Runs one tick: wheel and ring changes first, then note transitions in
    /// event order, then the clock relay. Everything lands on `sink` in that order.
    pub fn tick(&mut self, events: &[ControlEvent], sink: &mut dyn MidiSink) -> TickReport {
        self.tick_count += 1;
        trace!("Tick {} with {} event(s)", self.tick_count, events.len());

        for event in events {
            match *event {
                ControlEvent::Quit => {
                    info!("Quit requested, stopping after this tick");
                    self.running = false;
                }
                ControlEvent::RingModifierDown(modifier) => self.ring.modifier_down(modifier),
                ControlEvent::RingModifierUp => self.ring.modifier_up(),
                ControlEvent::Rotate(direction) => self.ring.route(&mut self.wheel, direction),
                _ => {}
            }
        }

        let mut outgoing: Vec<MidiMessage> = Vec::new();
        for event in events {
            match *event {
                ControlEvent::LatchModifierDown => self.notes.on_latch_engage(),
                ControlEvent::LatchModifierUp => outgoing.extend(self.notes.on_latch_disengage()),
                ControlEvent::TriggerStart(id) => {
                    let pitches = self.resolve(id);
                    outgoing.extend(self.notes.on_trigger_start(id, &pitches));
                }
                ControlEvent::TriggerStop(id) => outgoing.extend(self.notes.on_trigger_stop(id)),
                _ => {}
            }
        }

        let mut report = TickReport {
            events: events.len(),
            ..TickReport::default()
        };
        for msg in outgoing {
            match sink.send(msg.clone()) {
                Ok(()) => report.notes_sent += 1,
                Err(e) => {
                    report.notes_dropped += 1;
                    warn!("Dropped {:?}: {}", msg, e);
                }
            }
        }

        report.clock_forwarded = self.clock.poll(sink);
        if report.events > 0 {
            debug!("Tick {}: {:?}", self.tick_count, report);
        }
        report
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            key: self.wheel.key(),
            mode_position: self.wheel.mode(),
            mode: self.resolver.mode(&self.wheel),
            tonic: self.resolver.tonic(&self.wheel),
            ring: self.ring.ring(),
            active: self.notes.active().clone(),
            latch_engaged: self.notes.latch().is_engaged(),
            captured: self.notes.latch().captured().clone(),
            tick_count: self.tick_count,
        }
    }
}

/// Drives the engine at a fixed cadence until a quit event arrives.
pub struct EventLoop<I: InputSource, S: MidiSink, T: TickScheduler> {
    engine: Engine,
    input: I,
    sink: S,
    scheduler: T,
}

impl<I: InputSource, S: MidiSink, T: TickScheduler> EventLoop<I, S, T> {
    pub fn new(engine: Engine, input: I, sink: S, scheduler: T) -> Self {
        EventLoop {
            engine,
            input,
            sink,
            scheduler,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn bind(&mut self, id: TriggerId, chord: ChordDegree) -> Option<ChordDegree> {
        self.engine.bind(id, chord)
    }

    /// One poll-normalize-apply pass without waiting.
    pub fn step(&mut self) -> TickReport {
        let frame = self.input.poll();
        let events = Normalizer::new(self.engine.bank()).normalize(&frame);
        self.engine.tick(&events, &mut self.sink)
    }

    /// Returns the number of ticks run.
    pub fn run(&mut self) -> u64 {
        info!("Event loop running");
        let mut ticks = 0;
        while self.engine.is_running() {
            self.step();
            ticks += 1;
            self.scheduler.wait_for_next_tick();
        }
        info!("Event loop stopped after {} ticks", ticks);
        ticks
    }

    pub fn into_parts(self) -> (Engine, S) {
        (self.engine, self.sink)
    }
}
