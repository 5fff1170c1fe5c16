use boleto_config::ConfigError;
use boleto_core::CoreError;
use thiserror::Error;

/// Failures surfaced to the command-line user.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Input(String),
}

impl AppError {
    /// Process exit code: 2 for bad input, 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Input(_) => 2,
            AppError::Core(err) if err.is_user_error() => 2,
            _ => 1,
        }
    }
}
