//! Voicebank metadata for the ustkit toolkit.
//!
//! Models the per-voicebank tables an editor consults when rendering:
//! [`Oto`] (alias timing) and [`PrefixMap`] (per-pitch alias decoration).
//! Directory walking and text-encoding detection stay with the caller;
//! these types take decoded lines.

pub mod error;
pub mod oto;
pub mod prefix_map;

pub use error::{Error, Result};
pub use oto::{Oto, OtoEntry};
pub use prefix_map::PrefixMap;
