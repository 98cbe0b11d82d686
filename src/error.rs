use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::contracts::service::ContractError;
use crate::workflows::mediation::service::MediationError;
use std::fmt;

/// Top-level error for callers embedding the whole back office.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Mediation(MediationError),
    Contract(ContractError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Mediation(err) => write!(f, "mediation error: {}", err),
            AppError::Contract(err) => write!(f, "contract error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Mediation(err) => Some(err),
            AppError::Contract(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<MediationError> for AppError {
    fn from(value: MediationError) -> Self {
        Self::Mediation(value)
    }
}

impl From<ContractError> for AppError {
    fn from(value: ContractError) -> Self {
        Self::Contract(value)
    }
}
