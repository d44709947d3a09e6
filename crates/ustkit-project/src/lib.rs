//! UST project container for the ustkit toolkit.
//!
//! Builds on `ustkit-core`'s codecs to model whole project files: typed
//! [`Note`] records, track splitting, and round-trip serialization.
//!
//! # Example
//!
//! ```ignore
//! use ustkit_project::UstProject;
//!
//! let project = UstProject::parse(&text)?;
//! for note in project.notes() {
//!     if let Some(glide) = &note.portamento {
//!         let offset = glide.sample_at_time(10.0)?;
//!     }
//! }
//! let rewritten = project.to_string();
//! ```

pub mod error;
pub mod note;
pub mod project;

pub use error::{Error, Result};
pub use note::Note;
pub use project::UstProject;
