use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::models::{AnnealingSchedule, GroupingConfig, InitialStrategy, SearchStrategy, SolverChoice};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub grouping: GroupingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Service-wide grouping defaults; requests override them per field
#[derive(Debug, Clone, Deserialize)]
pub struct GroupingSettings {
    #[serde(default = "default_group_size")]
    pub group_size: usize,
    #[serde(default)]
    pub pairing: bool,
    #[serde(default = "default_balance_genders")]
    pub balance_genders: bool,
    #[serde(default = "default_mutual_bonus")]
    pub mutual_bonus: f64,
    #[serde(default = "default_priority_weights")]
    pub priority_weights: Vec<f64>,
    #[serde(default = "default_genders")]
    pub genders: Vec<String>,
    #[serde(default)]
    pub solver: SolverChoice,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_time_limit_secs")]
    pub time_limit_secs: u64,
    #[serde(default = "default_auto_exact_time_limit_secs")]
    pub auto_exact_time_limit_secs: u64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u64,
    #[serde(default = "default_restarts")]
    pub restarts: usize,
    #[serde(default)]
    pub initial_strategy: InitialStrategy,
    #[serde(default)]
    pub search: SearchStrategy,
    #[serde(default = "default_start_temperature")]
    pub start_temperature: f64,
    #[serde(default = "default_end_temperature")]
    pub end_temperature: f64,
    #[serde(default = "default_cooling_rate")]
    pub cooling_rate: f64,
}

impl Default for GroupingSettings {
    fn default() -> Self {
        Self {
            group_size: default_group_size(),
            pairing: false,
            balance_genders: default_balance_genders(),
            mutual_bonus: default_mutual_bonus(),
            priority_weights: default_priority_weights(),
            genders: default_genders(),
            solver: SolverChoice::Auto,
            seed: default_seed(),
            time_limit_secs: default_time_limit_secs(),
            auto_exact_time_limit_secs: default_auto_exact_time_limit_secs(),
            max_iterations: default_max_iterations(),
            restarts: default_restarts(),
            initial_strategy: InitialStrategy::Random,
            search: SearchStrategy::Annealing,
            start_temperature: default_start_temperature(),
            end_temperature: default_end_temperature(),
            cooling_rate: default_cooling_rate(),
        }
    }
}

fn default_group_size() -> usize { 4 }
fn default_balance_genders() -> bool { true }
fn default_mutual_bonus() -> f64 { 2.0 }
fn default_priority_weights() -> Vec<f64> { vec![2.0, 1.0] }
fn default_genders() -> Vec<String> { vec!["male".to_string(), "female".to_string()] }
fn default_seed() -> u64 { 42 }
fn default_time_limit_secs() -> u64 { 300 }
fn default_auto_exact_time_limit_secs() -> u64 { 10 }
fn default_max_iterations() -> u64 { 10_000 }
fn default_restarts() -> usize { 1 }
fn default_start_temperature() -> f64 { AnnealingSchedule::default().start_temperature }
fn default_end_temperature() -> f64 { AnnealingSchedule::default().end_temperature }
fn default_cooling_rate() -> f64 { AnnealingSchedule::default().cooling_rate }

impl GroupingSettings {
    /// Engine-facing configuration, validated
    pub fn to_config(&self) -> Result<GroupingConfig, ConfigError> {
        let config = GroupingConfig {
            group_size: self.group_size,
            pairing: self.pairing,
            balance_genders: self.balance_genders,
            mutual_bonus: self.mutual_bonus,
            priority_weights: self.priority_weights.clone(),
            genders: self.genders.clone(),
            solver: self.solver,
            seed: self.seed,
            time_limit: Duration::from_secs(self.time_limit_secs),
            auto_exact_time_limit: Duration::from_secs(self.auto_exact_time_limit_secs),
            max_iterations: self.max_iterations,
            restarts: self.restarts,
            initial_strategy: self.initial_strategy,
            search: self.search,
            annealing: AnnealingSchedule {
                start_temperature: self.start_temperature,
                end_temperature: self.end_temperature,
                cooling_rate: self.cooling_rate,
            },
        };
        config
            .validate()
            .map_err(|e| ConfigError::Message(format!("grouping: {}", e)))?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with MIXER__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., MIXER__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("MIXER")
        .prefix_separator("__")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("grouping.priority_weights")
        .with_list_parse_key("grouping.genders")
        .try_parsing(true)
}
