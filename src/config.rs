use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub weighting: WeightingConfig,
    #[serde(default)]
    pub backtest: BacktestConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,
    /// Maximum connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Maximum games/props processed concurrently in one generation run
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Page size for repository scans
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Wall-clock budget for a batch run in seconds (0 = unbounded)
    #[serde(default)]
    pub run_budget_secs: u64,
}

fn default_concurrency() -> usize {
    8
}

fn default_page_size() -> usize {
    100
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            page_size: default_page_size(),
            run_budget_secs: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightingConfig {
    /// Trailing window of verified predictions considered, in days
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,
    /// Minimum verified samples before a model's weight departs from neutral
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
    /// Lower bound on the confidence scaling multiplier
    #[serde(default = "default_scaling_floor")]
    pub scaling_floor: f64,
    /// Upper bound on the confidence scaling multiplier
    #[serde(default = "default_scaling_ceiling")]
    pub scaling_ceiling: f64,
}

fn default_lookback_days() -> i64 {
    30
}

fn default_min_samples() -> usize {
    10
}

fn default_scaling_floor() -> f64 {
    0.5
}

fn default_scaling_ceiling() -> f64 {
    1.5
}

impl Default for WeightingConfig {
    fn default() -> Self {
        Self {
            lookback_days: default_lookback_days(),
            min_samples: default_min_samples(),
            scaling_floor: default_scaling_floor(),
            scaling_ceiling: default_scaling_ceiling(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BacktestConfig {
    /// Flat stake per simulated bet in USD
    #[serde(default = "default_stake_usd")]
    pub stake_usd: Decimal,
    /// How many graded predictions to keep on the stored result as samples
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    /// Wall-clock budget for one backtest in seconds (0 = unbounded)
    #[serde(default)]
    pub budget_secs: u64,
}

fn default_stake_usd() -> Decimal {
    Decimal::from(100)
}

fn default_sample_size() -> usize {
    20
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            stake_usd: default_stake_usd(),
            sample_size: default_sample_size(),
            budget_secs: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("database.max_connections", 5)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("ODDSMITH_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (ODDSMITH_DATABASE__URL, etc.)
            .add_source(
                Environment::with_prefix("ODDSMITH")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.engine.concurrency == 0 {
            errors.push("engine.concurrency must be at least 1".to_string());
        }

        if self.engine.page_size == 0 {
            errors.push("engine.page_size must be at least 1".to_string());
        }

        if self.weighting.lookback_days <= 0 {
            errors.push("weighting.lookback_days must be positive".to_string());
        }

        if self.weighting.scaling_floor <= 0.0 {
            errors.push("weighting.scaling_floor must be positive".to_string());
        }

        if self.weighting.scaling_ceiling < self.weighting.scaling_floor {
            errors.push("weighting.scaling_ceiling must be >= scaling_floor".to_string());
        }

        if self.backtest.stake_usd <= Decimal::ZERO {
            errors.push("backtest.stake_usd must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
