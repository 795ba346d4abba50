use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("no packages found")]
    NoPackages,

    #[error("malformed go.mod at {path}: {message}")]
    InvalidModule { path: PathBuf, message: String },
}

impl LoadError {
    pub fn invalid_module(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidModule {
            path: path.into(),
            message: message.into(),
        }
    }
}
