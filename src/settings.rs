use config::{Config, ConfigError, Environment, File, FileFormat};
use rangewarn_devices::devices::ultrasonic::{
    DEFAULT_MAX_RANGE_CM, DEFAULT_MIN_RANGE_CM, DEFAULT_SOUND_SPEED_CM_PER_US,
};
use rangewarn_zones::WarningSettings;
use serde::Deserialize;
use tracing::{error, info};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const CONFIG_PATH_ENV: &str = "RANGEWARN_CONFIG";
const ENV_PREFIX: &str = "RANGEWARN";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub warning: WarningSettings,
    pub sensor: SensorSettings,
    pub simulation: SimulationSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SensorSettings {
    pub min_range_cm: u16,
    pub max_range_cm: u16,
    pub sound_speed_cm_per_us: f32,
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            min_range_cm: DEFAULT_MIN_RANGE_CM,
            max_range_cm: DEFAULT_MAX_RANGE_CM,
            sound_speed_cm_per_us: DEFAULT_SOUND_SPEED_CM_PER_US,
        }
    }
}

/// One leg of the scripted scene: an object held at `distance_cm` for `hold_ms`.
/// No distance means nothing in the beam.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Segment {
    pub hold_ms: u32,
    #[serde(default)]
    pub distance_cm: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub tick_us: u64,
    pub clock_offset_ms: u32,
    pub noise_cm: f32,
    pub dropout_probability: f64,
    pub seed: u64,
    /// Zero runs until Ctrl-C.
    pub run_for_ms: u64,
    pub report_period_ms: u64,
    pub scenario: Vec<Segment>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            tick_us: 1_000,
            clock_offset_ms: 0,
            noise_cm: 0.0,
            dropout_probability: 0.0,
            seed: 0,
            run_for_ms: 0,
            report_period_ms: 1_000,
            scenario: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Pull out-of-range simulation knobs back into something runnable.
    fn sanitized(mut self) -> Self {
        let sim = &mut self.simulation;
        sim.tick_us = sim.tick_us.max(100);
        sim.report_period_ms = sim.report_period_ms.max(100);
        sim.noise_cm = sim.noise_cm.abs();
        sim.dropout_probability = if sim.dropout_probability.is_nan() {
            0.0
        } else {
            sim.dropout_probability.clamp(0.0, 1.0)
        };
        self
    }
}

/// Path of the config file: `$RANGEWARN_CONFIG` if set, else the default.
pub fn config_path() -> String {
    std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

/// Load `path` and apply `RANGEWARN__SECTION__KEY` environment overrides.
pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    info!("Attempting to load configuration from {}", path);

    let settings = Config::builder()
        .add_source(File::new(path, FileFormat::Toml).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .and_then(|c| c.try_deserialize::<AppConfig>());

    match settings {
        Ok(config) => {
            let config = config.sanitized();
            info!("Successfully loaded configuration: {:?}", config);
            Ok(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
pub(crate) fn from_toml_str(toml: &str) -> Result<AppConfig, ConfigError> {
    Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()?
        .try_deserialize::<AppConfig>()
        .map(AppConfig::sanitized)
}
