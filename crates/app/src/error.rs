use engine::EngineError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid trip file: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error("invalid custom share '{0}', expected <member>=<amount>")]
    CustomShare(String),
    #[error("expense #{index}: {source}")]
    Expense {
        index: usize,
        #[source]
        source: EngineError,
    },
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl AppError {
    /// The engine error behind this failure, if any.
    pub fn engine_error(&self) -> Option<&EngineError> {
        match self {
            Self::Expense { source, .. } => Some(source),
            Self::Engine(err) => Some(err),
            _ => None,
        }
    }
}
