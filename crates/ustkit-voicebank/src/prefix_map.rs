//! prefix.map: per-pitch alias decoration.
//!
//! Each line maps a note name to the text appended to a lyric before the
//! alias lookup (the file says "prefix", the editor applies it as a suffix).
//! The file carries one line per note name, highest pitch first, with the
//! mapping possibly empty.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use ustkit_core::pitch::{note_rank, NOTE_NAMES};

use crate::error::{Error, Result};

/// The note-name → decoration table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrefixMap {
    map: HashMap<String, String>,
}

impl PrefixMap {
    /// Parse `NoteName\t\tmapping` lines. Blank lines are skipped; note
    /// names outside C1..B7 are rejected.
    pub fn parse<'a, I>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut map = HashMap::new();
        for line in lines {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let (name, mapping) = line
                .split_once("\t\t")
                .ok_or_else(|| Error::PrefixMapFormat(format!("line {line:?} has no '\\t\\t'")))?;
            if note_rank(name).is_none() {
                return Err(Error::UnknownNoteName(name.to_string()));
            }
            map.insert(name.to_string(), mapping.to_string());
        }
        Ok(Self { map })
    }

    /// The decoration for a note name; unmapped names decorate with nothing.
    pub fn get(&self, note_name: &str) -> &str {
        self.map.get(note_name).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, note_name: &str, mapping: impl Into<String>) -> Result<()> {
        if note_rank(note_name).is_none() {
            return Err(Error::UnknownNoteName(note_name.to_string()));
        }
        self.map.insert(note_name.to_string(), mapping.into());
        Ok(())
    }

    /// Map every note from `from` to `to` (inclusive, either order) to the
    /// same decoration.
    pub fn set_range(&mut self, from: &str, to: &str, mapping: &str) -> Result<()> {
        let a = note_rank(from).ok_or_else(|| Error::UnknownNoteName(from.to_string()))?;
        let b = note_rank(to).ok_or_else(|| Error::UnknownNoteName(to.to_string()))?;
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        for name in &NOTE_NAMES[lo..=hi] {
            self.map.insert(name.to_string(), mapping.to_string());
        }
        Ok(())
    }

    /// One line per note name, highest pitch first, as the editor writes it.
    pub fn to_string_list(&self) -> Vec<String> {
        NOTE_NAMES
            .iter()
            .rev()
            .map(|name| format!("{name}\t\t{}", self.get(name)))
            .collect()
    }
}

impl fmt::Display for PrefixMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.to_string_list() {
            write!(f, "{line}\r\n")?;
        }
        Ok(())
    }
}
