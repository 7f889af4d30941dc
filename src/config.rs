// config.rs

use crate::chord::DEFAULT_BASE_PITCH;
use crate::cli::Args;
use crate::input::POWERMATE_PATH;
use crate::lifecycle::DEFAULT_VELOCITY;
use crate::midi::DEFAULT_CLOCK_READS_PER_TICK;
use crate::scheduler::DEFAULT_TICK_RATE_HZ;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use log::{debug, info, warn, LevelFilter};
use std::str::FromStr;

pub const DEFAULT_CONFIG_NAME: &str = "helmrs";
pub const ENV_PREFIX: &str = "HELMRS";

/// Startup flags and tuning, read once.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub dial_device_enabled: bool,
    pub dial_device_path: String,
    pub midi_enabled: bool,
    pub midi_output_device: Option<String>,
    pub midi_clock_forwarding_enabled: bool,
    pub midi_clock_input_device: Option<String>,
    pub midi_channel: u8,
    pub velocity: u8,
    pub base_pitch: u8,
    pub tick_rate_hz: u32,
    pub clock_messages_per_tick: usize,
    pub fullscreen: bool, // only meaningful to a renderer
    pub log_level: LevelFilter,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            dial_device_enabled: false,
            dial_device_path: POWERMATE_PATH.to_string(),
            midi_enabled: true,
            midi_output_device: None,
            midi_clock_forwarding_enabled: false,
            midi_clock_input_device: None,
            midi_channel: 0,
            velocity: DEFAULT_VELOCITY,
            base_pitch: DEFAULT_BASE_PITCH,
            tick_rate_hz: DEFAULT_TICK_RATE_HZ,
            clock_messages_per_tick: DEFAULT_CLOCK_READS_PER_TICK,
            fullscreen: false,
            log_level: LevelFilter::Info,
        }
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let d = Settings::default();
    Config::builder()
        .set_default("dial_device_enabled", d.dial_device_enabled)?
        .set_default("dial_device_path", d.dial_device_path)?
        .set_default("midi_enabled", d.midi_enabled)?
        .set_default("midi_clock_forwarding_enabled", d.midi_clock_forwarding_enabled)?
        .set_default("midi_channel", d.midi_channel as i64)?
        .set_default("velocity", d.velocity as i64)?
        .set_default("base_pitch", d.base_pitch as i64)?
        .set_default("tick_rate_hz", d.tick_rate_hz as i64)?
        .set_default("clock_messages_per_tick", d.clock_messages_per_tick as i64)?
        .set_default("fullscreen", d.fullscreen)?
        .set_default("log_level", d.log_level.to_string())
}

// Clamps into [min, max], warning when the configured value was outside it.
fn ranged(cfg: &Config, key: &str, min: i64, max: i64) -> Result<i64, ConfigError> {
    let value = cfg.get_int(key)?;
    let clamped = value.clamp(min, max);
    if clamped != value {
        warn!(
            "Setting {} = {} out of range [{}, {}], using {}",
            key, value, min, max, clamped
        );
    }
    Ok(clamped)
}

fn optional_string(cfg: &Config, key: &str) -> Result<Option<String>, ConfigError> {
    match cfg.get_string(key) {
        Ok(s) if s.trim().is_empty() => Ok(None),
        Ok(s) => Ok(Some(s)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

impl Settings {
    /// Defaults, then the config file, then `HELMRS_*` variables, then the command line.
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => {
                info!("Loading configuration from {}", path);
                File::with_name(path).required(true)
            }
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let cfg = defaults()?
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .set_override_option("dial_device_enabled", args.dial.then_some(true))?
            .set_override_option("dial_device_path", args.dial_path.clone())?
            .set_override_option("midi_enabled", args.no_midi.then_some(false))?
            .set_override_option("midi_output_device", args.midi_output.clone())?
            .set_override_option(
                "midi_clock_forwarding_enabled",
                args.clock_forward.then_some(true),
            )?
            .set_override_option("midi_clock_input_device", args.clock_input.clone())?
            .set_override_option("midi_channel", args.channel.map(i64::from))?
            .set_override_option("fullscreen", args.fullscreen.then_some(true))?
            .set_override_option("log_level", args.log_level.clone())?
            .build()?;

        Self::from_config(&cfg)
    }

    pub fn from_config(cfg: &Config) -> Result<Self, ConfigError> {
        let log_level = cfg.get_string("log_level")?;
        let log_level = LevelFilter::from_str(&log_level).unwrap_or_else(|_| {
            warn!("Unknown log level '{}', using info", log_level);
            LevelFilter::Info
        });

        let settings = Settings {
            dial_device_enabled: cfg.get_bool("dial_device_enabled")?,
            dial_device_path: cfg.get_string("dial_device_path")?,
            midi_enabled: cfg.get_bool("midi_enabled")?,
            midi_output_device: optional_string(cfg, "midi_output_device")?,
            midi_clock_forwarding_enabled: cfg.get_bool("midi_clock_forwarding_enabled")?,
            midi_clock_input_device: optional_string(cfg, "midi_clock_input_device")?,
            midi_channel: ranged(cfg, "midi_channel", 0, 15)? as u8,
            velocity: ranged(cfg, "velocity", 1, 127)? as u8,
            base_pitch: ranged(cfg, "base_pitch", 0, 115)? as u8,
            tick_rate_hz: ranged(cfg, "tick_rate_hz", 1, 1000)? as u32,
            clock_messages_per_tick: ranged(cfg, "clock_messages_per_tick", 1, 64)? as usize,
            fullscreen: cfg.get_bool("fullscreen")?,
            log_level,
        };

        debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }
}
