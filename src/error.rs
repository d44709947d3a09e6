//! Centralized error type for the ustkit umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate
//! boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] ustkit_core::Error),

    #[cfg(feature = "project")]
    #[error("project: {0}")]
    Project(#[from] ustkit_project::Error),

    #[cfg(feature = "voicebank")]
    #[error("voicebank: {0}")]
    Voicebank(#[from] ustkit_voicebank::Error),

    #[cfg(feature = "engine")]
    #[error("engine: {0}")]
    Engine(#[from] ustkit_engine::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
