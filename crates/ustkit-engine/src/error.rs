//! Error types for engine parameter handling.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] ustkit_core::Error),

    #[error("bad engine argument: {0}")]
    Argument(String),
}

pub type Result<T> = std::result::Result<T, Error>;
