//! Core codecs and models for UTAU note data.
//!
//! The project format stores everything that shapes a note's sound as small,
//! under-specified text encodings. This crate parses them into workable
//! models and writes them back out:
//!
//! - **Flag strings** ([`FlagSet`]) - engine options concatenated with no
//!   separators, segmented against a [`FlagRegistry`] of known names.
//! - **Pitchbend strings** ([`pitchbend`]) - the run-length two-symbol
//!   encoding handed to resamplers.
//! - **Portamento** ([`Portamento`]) - per-segment glide data reconstructed
//!   from four parallel, default-eliding fields, sampled through a
//!   [`CurveRegistry`] of interpolation curves.
//! - **Envelope** ([`Envelope`]) and **vibrato** ([`Vibrato`]) - the note's
//!   volume and pitch-wobble tuples.
//! - [`pitch`] - note names, tick timing, and velocity conversions shared by
//!   the project and engine layers.
//!
//! Everything here is a pure transformation over in-memory strings; file
//! I/O and text-encoding detection belong to the caller.
//!
//! # Example
//!
//! ```ignore
//! use ustkit_core::{pitchbend, FlagSet, Portamento};
//!
//! let flags = FlagSet::parse("g-5H50Mt100B3")?;
//! assert_eq!(flags.first_value("Mt")?, Some(100.0));
//!
//! let bends = pitchbend::decode("AAAB#12#AA")?;
//! let glide = Portamento::parse("80,100", "-40;-20", "15", "")?;
//! let cents10 = glide.sample_at_time(60.0)?;
//! ```

pub mod envelope;
pub mod error;
pub mod flags;
pub mod pitch;
pub mod pitchbend;
pub mod portamento;
pub mod vibrato;

pub use envelope::Envelope;
pub use error::{Error, Result};
pub use flags::{Flag, FlagRegistry, FlagSet};
pub use portamento::curve::{CurveFn, CurveRegistry};
pub use portamento::{Portamento, PortamentoSegment};
pub use vibrato::Vibrato;
