use cuprum_domain::services::gbt::BoosterParams;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_SOURCE_URL: &str =
    "https://www.westmetall.com/en/markdaten.php?action=table&field=LME_Cu_cash";

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub source: SourceConfig,
    pub model: ModelConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub url: String,
    pub user_agent: String,
    /// Unset means the request may block indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            user_agent: format!("cuprum/{}", env!("CARGO_PKG_VERSION")),
            timeout_ms: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub subsample: f64,
    pub colsample_bytree: f64,
    pub test_size: f64,
    pub split_seed: u64,
    pub model_seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let booster = BoosterParams::default();
        Self {
            n_estimators: booster.n_estimators,
            learning_rate: booster.learning_rate,
            max_depth: booster.max_depth,
            subsample: booster.subsample,
            colsample_bytree: booster.colsample_bytree,
            test_size: 0.2,
            split_seed: 42,
            model_seed: booster.seed,
        }
    }
}

impl ModelConfig {
    pub fn booster_params(&self) -> BoosterParams {
        BoosterParams {
            n_estimators: self.n_estimators,
            learning_rate: self.learning_rate,
            max_depth: self.max_depth,
            subsample: self.subsample,
            colsample_bytree: self.colsample_bytree,
            seed: self.model_seed,
            ..BoosterParams::default()
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub title: String,
    pub header: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: "Copper Price Forecast".to_string(),
            header: "Data Overview".to_string(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), String> {
        if self.source.url.trim().is_empty() {
            return Err("source.url must not be empty".to_string());
        }
        if self.source.timeout_ms == Some(0) {
            return Err("source.timeout_ms must be > 0 when set".to_string());
        }
        let test_size = self.model.test_size;
        if !test_size.is_finite() || test_size <= 0.0 || test_size >= 1.0 {
            return Err(format!("model.test_size must be in (0, 1), got {test_size}"));
        }
        self.model
            .booster_params()
            .validate()
            .map_err(|err| format!("model.{err}"))
    }
}

pub fn load_config(path: &Path) -> Result<Config, String> {
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("failed to read config {}: {}", path.display(), err))?;
    let config: Config = toml::from_str(&contents)
        .map_err(|err| format!("failed to parse TOML {}: {}", path.display(), err))?;
    config
        .validate()
        .map_err(|err| format!("invalid config {}: {err}", path.display()))?;
    Ok(config)
}

/// Config from `path`, or the built-in defaults when no path is given.
pub fn resolve_config(path: Option<&Path>) -> Result<Config, String> {
    match path {
        Some(path) => load_config(path),
        None => Ok(Config::default()),
    }
}
