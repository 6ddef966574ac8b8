//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Detector error: {0}")]
    Detector(#[from] sniper_detector::DetectorError),

    #[error("Alert error: {0}")]
    Alert(#[from] sniper_alert::AlertError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] sniper_telemetry::TelemetryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
