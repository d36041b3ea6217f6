//! Application-level errors.

use std::path::PathBuf;

use chasm_world::TuningError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("cannot load config {}: {reason}", path.display())]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("config [{section}] {key}: {reason}")]
    ConfigValue { section: &'static str, key: &'static str, reason: String },

    #[error("invalid tuning: {0}")]
    Tuning(#[from] TuningError),

    #[error("window: {0}")]
    Window(#[from] minifb::Error),

    #[error("{0}")]
    Usage(String),
}
