use serde::Deserialize;
use std::{fs, path::PathBuf};
use thiserror::Error;

pub const DEFAULT_DASHBOARD_URL: &str =
    "https://public.tableau.com/app/profile/noof.as/viz/AutoInsightsDashboard/Dashboard2";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value for {var}: '{value}'")]
    Env { var: &'static str, value: String },
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub fuel_type_model: PathBuf,
    pub engine_hp_model: PathBuf,
    /// Directory served under `/assets/`.
    pub assets_dir: PathBuf,
    pub dashboard_url: String,
    /// Load both artifacts at startup instead of on first page visit.
    pub preload_models: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            fuel_type_model: PathBuf::from("models/vehicle_fuel_type_model.json"),
            engine_hp_model: PathBuf::from("models/random_forest_pipeline.json"),
            assets_dir: PathBuf::from("assets"),
            dashboard_url: DEFAULT_DASHBOARD_URL.to_string(),
            preload_models: true,
        }
    }
}

impl AppConfig {
    /// Defaults, then the JSON file named by `APP_CONFIG`, then env overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(|k| std::env::var(k).ok())
    }

    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Same as `from_env` with an injectable variable lookup.
    pub fn resolve<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = match var("APP_CONFIG") {
            Some(path) => Self::load(&path)?,
            None => Self::default(),
        };

        if let Some(addr) = var("BIND_ADDR") {
            cfg.bind_addr = addr;
        } else if let Some(port) = var("PORT") {
            let port: u16 = port
                .parse()
                .map_err(|_| ConfigError::Env { var: "PORT", value: port.clone() })?;
            let host = cfg.bind_addr.rsplit_once(':').map_or("0.0.0.0", |(h, _)| h);
            cfg.bind_addr = format!("{}:{}", host, port);
        }
        if let Some(p) = var("FUEL_MODEL_PATH") {
            cfg.fuel_type_model = PathBuf::from(p);
        }
        if let Some(p) = var("HP_MODEL_PATH") {
            cfg.engine_hp_model = PathBuf::from(p);
        }
        if let Some(p) = var("ASSETS_DIR") {
            cfg.assets_dir = PathBuf::from(p);
        }
        if let Some(url) = var("DASHBOARD_URL") {
            cfg.dashboard_url = url;
        }
        if let Some(v) = var("PRELOAD_MODELS") {
            cfg.preload_models = match v.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => return Err(ConfigError::Env { var: "PRELOAD_MODELS", value: v }),
            };
        }
        Ok(cfg)
    }
}
