//! Error types for voicebank metadata.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] ustkit_core::Error),

    #[error("malformed oto entry: {0}")]
    OtoFormat(String),

    #[error("malformed prefix.map line: {0}")]
    PrefixMapFormat(String),

    #[error("unknown note name {0:?}")]
    UnknownNoteName(String),
}

pub type Result<T> = std::result::Result<T, Error>;
