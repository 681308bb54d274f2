use molsieve::engine::error::ProcessingError;
use molsieve::workflows::screen::ScreenError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Processing(#[from] ProcessingError),

    #[error("Failed to read input table: {0}")]
    Table(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ScreenError<csv::Error>> for CliError {
    fn from(e: ScreenError<csv::Error>) -> Self {
        match e {
            ScreenError::Processing(e) => Self::Processing(e),
            ScreenError::Source { source, .. } => Self::Table(source),
        }
    }
}
