//! # ustkit - a toolkit for UTAU text formats
//!
//! Parsers, models, and writers for the file formats a UTAU-style editor
//! and its engines exchange, built from modular subsystems:
//!
//! - **ustkit-core** - the codecs: flag strings, pitchbend encoding,
//!   portamento, envelope, vibrato, pitch/tick conversions
//! - **ustkit-project** - UST project files (notes, tracks, settings)
//! - **ustkit-voicebank** - voicebank metadata (oto.ini, prefix.map)
//! - **ustkit-engine** - resampler/wavtool argument arrays
//!
//! ## Quick Start
//!
//! ```ignore
//! use ustkit::{FlagSet, UstProject};
//!
//! let project = UstProject::parse(&text)?;
//! for note in project.notes() {
//!     let flags = note.flags()?;
//!     if flags.has("g") {
//!         println!("{}: g = {:?}", note.lyric, flags.first_value("g")?);
//!     }
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `default` / `full` - everything
//! - `project` - UST project container
//! - `voicebank` - voicebank metadata
//! - `engine` - engine argument models
//!
//! The crate works on decoded text throughout. Legacy projects are usually
//! Shift-JIS on disk; pick a decoder and hand the result in.

mod error;
pub use error::{Error, Result};

/// Re-export of ustkit-core for direct access
pub use ustkit_core as core;

// Core types
pub use ustkit_core::{
    pitch, pitchbend, CurveFn, CurveRegistry, Envelope, Flag, FlagRegistry, FlagSet, Portamento,
    PortamentoSegment, Vibrato,
};

// Project subsystem
#[cfg(feature = "project")]
pub use ustkit_project as project;

#[cfg(feature = "project")]
pub use ustkit_project::{Note, UstProject};

// Voicebank subsystem
#[cfg(feature = "voicebank")]
pub use ustkit_voicebank as voicebank;

#[cfg(feature = "voicebank")]
pub use ustkit_voicebank::{Oto, OtoEntry, PrefixMap};

// Engine subsystem
#[cfg(feature = "engine")]
pub use ustkit_engine as engine;

#[cfg(feature = "engine")]
pub use ustkit_engine::{ResamplerArgs, WavtoolArgs};
