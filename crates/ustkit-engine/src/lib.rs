//! Engine parameter models for the ustkit toolkit.
//!
//! UTAU renders by shelling out to a resampler (pitch/timbre) and a wavtool
//! (concatenation), passing everything positionally. These types model the
//! two argument arrays with typed accessors wired to the core codecs, so a
//! host can read, edit, and rebuild calls without string surgery. Actually
//! spawning the tools is left to the host.

pub mod error;
pub mod resampler;
pub mod wavtool;

pub use error::{Error, Result};
pub use resampler::{ResamplerArgs, RESAMPLER_ARGC};
pub use wavtool::{WavtoolArgs, WAVTOOL_MIN_ARGC};
