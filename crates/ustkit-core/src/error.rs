//! Error types for the core codecs and models.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("character {found:?} at position {position} is not a pitchbend symbol")]
    PitchbendSymbol { found: char, position: usize },

    #[error("malformed pitchbend repeat count at position {position}")]
    PitchbendRepeat { position: usize },

    #[error("pitchbend value {value} at index {index} is outside [-2048, 2047]")]
    PitchbendRange { value: i32, index: usize },

    #[error("flag string is malformed at position {position}")]
    MalformedFlag { position: usize },

    #[error("flag {0:?} not found")]
    FlagNotFound(String),

    #[error("flag registration rejected: {0}")]
    FlagRegistration(String),

    #[error("curve registration rejected: {0}")]
    CurveRegistration(String),

    #[error("unknown curve type {0:?}")]
    UnknownCurveType(String),

    #[error("malformed portamento: {0}")]
    PortamentoFormat(String),

    #[error("portamento state: {0}")]
    PortamentoState(String),

    #[error("malformed envelope: {0}")]
    EnvelopeFormat(String),

    #[error("malformed vibrato: {0}")]
    VibratoFormat(String),

    #[error("vibrato out of range: {0}")]
    VibratoRange(String),
}

pub type Result<T> = std::result::Result<T, Error>;
