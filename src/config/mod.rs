use std::collections::BTreeMap;
use std::env;
use std::fmt;

use crate::workflows::mediation::status::StagePolicy;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the back-office services.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub matching: MatchingDefaults,
    pub stage_policy: StagePolicy,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let default_radius_km = env::var("APP_MATCH_RADIUS_KM")
            .unwrap_or_else(|_| "25".to_string())
            .parse::<f64>()
            .ok()
            .filter(|radius| radius.is_finite() && *radius > 0.0)
            .ok_or(ConfigError::InvalidRadius)?;

        let stage_policy = match env::var("APP_STAGE_POLICY") {
            Ok(raw) => {
                let labels: BTreeMap<String, String> = serde_json::from_str(&raw)
                    .map_err(|source| ConfigError::InvalidStagePolicy {
                        detail: source.to_string(),
                    })?;
                StagePolicy::from_labels(&labels)
                    .map_err(|detail| ConfigError::InvalidStagePolicy { detail })?
            }
            Err(_) => StagePolicy::standard(),
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            matching: MatchingDefaults { default_radius_km },
            stage_policy,
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Defaults applied when a candidate search does not override them.
#[derive(Debug, Clone, Copy)]
pub struct MatchingDefaults {
    pub default_radius_km: f64,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidRadius,
    InvalidStagePolicy { detail: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidRadius => {
                write!(f, "APP_MATCH_RADIUS_KM must be a positive number")
            }
            ConfigError::InvalidStagePolicy { detail } => {
                write!(f, "APP_STAGE_POLICY is not a valid stage-policy map: {detail}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
