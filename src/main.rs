use clap::Parser;
use helmrs::{
    cli::Args,
    config::Settings,
    event_loop::{Engine, EventLoop},
    logging,
    midi::{all_notes_off, MidiSink},
    open_clock_forwarder, open_inputs, open_output,
    scheduler::FixedRateScheduler,
};
use log::LevelFilter;
use std::fmt::Display;

fn main() {
    initialize_logging();
    let args = Args::parse();
    let settings = load_settings(&args);
    log::set_max_level(settings.log_level);

    let sink = open_output(&settings)
        .unwrap_or_else(|e| exit_with_error("Error opening MIDI output", e));
    let engine = Engine::new(&settings, open_clock_forwarder(&settings));

    print_controls();
    let inputs = open_inputs(&settings)
        .unwrap_or_else(|e| exit_with_error("Error opening keyboard input", e));

    let scheduler = FixedRateScheduler::new(settings.tick_rate_hz);
    let mut event_loop = EventLoop::new(engine, inputs, sink, scheduler);
    event_loop.run();

    let (engine, mut sink) = event_loop.into_parts();
    log::info!("Final state: {}", engine.snapshot().summary());
    release_notes(&mut sink, settings.midi_channel);
}

fn initialize_logging() {
    match logging::init_logger(LevelFilter::Info) {
        Ok(()) => log::info!("Application starting"),
        Err(e) => eprintln!("Logging unavailable: {}", e),
    }
}

fn load_settings(args: &Args) -> Settings {
    Settings::load(args).unwrap_or_else(|e| exit_with_error("Error reading configuration", e))
}

fn print_controls() {
    println!("helmrs");
    println!("  a s d f g h j   play chords");
    println!("  , .             rotate (or turn the dial)");
    println!("  Shift / Alt     hold to rotate the key wheel / both wheels");
    println!("  Space           hold to latch");
    println!("  Esc             quit");
}

// Latched notes are not released by the engine on quit.
fn release_notes(sink: &mut dyn MidiSink, channel: u8) {
    if let Err(e) = sink.send(all_notes_off(channel)) {
        log::warn!("Failed to send all-notes-off: {}", e);
    }
    log::info!("Application stopped");
}

fn exit_with_error<E: Display>(context: &str, error: E) -> ! {
    let error_msg = format!("{}: {}", context, error);
    log::error!("{}", error_msg);
    eprintln!("{}", error_msg);
    std::process::exit(1);
}
