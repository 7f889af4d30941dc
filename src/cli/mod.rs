use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Circle-of-fifths MIDI performance controller", long_about = None)]
pub struct Args {
    /// Configuration file (format picked from its extension)
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Read the rotary dial
    #[arg(long)]
    pub dial: bool,

    /// Device node of the rotary dial
    #[arg(long, value_name = "PATH")]
    pub dial_path: Option<String>,

    /// Do not open a MIDI output; log messages instead
    #[arg(long)]
    pub no_midi: bool,

    /// MIDI output port (substring of its name)
    #[arg(long, value_name = "NAME")]
    pub midi_output: Option<String>,

    /// Relay MIDI clock from a second input port to the output
    #[arg(long)]
    pub clock_forward: bool,

    /// MIDI clock input port (substring of its name)
    #[arg(long, value_name = "NAME")]
    pub clock_input: Option<String>,

    /// MIDI channel for notes, 0-15
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u8).range(0..16))]
    pub channel: Option<u8>,

    /// Accepted for compatibility with the display front end
    #[arg(long)]
    pub fullscreen: bool,

    /// off, error, warn, info, debug or trace
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}
