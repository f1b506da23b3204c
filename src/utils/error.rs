use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Parse error in {source_name} at line {line}: {message}")]
    Parse {
        source_name: String,
        line: usize,
        message: String,
    },

    #[error("No {kind} file found for {key}")]
    NotFound { kind: &'static str, key: String },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not allocate an unused output name after {0} attempts")]
    TokenExhausted(usize),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(source_name: &str, line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            source_name: source_name.to_string(),
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
