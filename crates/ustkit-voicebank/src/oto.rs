//! oto.ini alias timing tables.
//!
//! Each line maps a sample file to one alias with five timing numbers:
//! `file.wav=alias,offset,consonant,cutoff,preutterance,overlap`. Voicebanks
//! routinely define the same alias more than once; the first definition is
//! the one an editor picks, so it gets the index and later ones are kept in
//! an overflow list.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use crate::error::{Error, Result};

/// One oto.ini line: a sample file, an alias, and its timing numbers.
///
/// All timings are in milliseconds measured from the start of the sample,
/// except `cutoff`, which counts from the end (negative values flip it back
/// to start-relative, the editor's convention).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtoEntry {
    pub file_name: String,
    pub alias: String,
    pub offset: f64,
    pub consonant: f64,
    pub cutoff: f64,
    pub preutterance: f64,
    pub overlap: f64,
}

impl OtoEntry {
    /// Parse one `file=alias,offset,consonant,cutoff,preutterance,overlap`
    /// line. Blank numeric fields mean zero.
    pub fn parse(line: &str) -> Result<Self> {
        let (file_name, rest) = line
            .split_once('=')
            .ok_or_else(|| Error::OtoFormat(format!("line {line:?} has no '='")))?;
        let parts: Vec<&str> = rest.split(',').collect();
        if parts.len() < 6 {
            return Err(Error::OtoFormat(format!(
                "entry for {file_name:?} has {} fields, needs 6",
                parts.len()
            )));
        }
        let number = |raw: &str| -> Result<f64> {
            let raw = raw.trim();
            if raw.is_empty() {
                return Ok(0.0);
            }
            raw.parse()
                .map_err(|_| Error::OtoFormat(format!("timing value {raw:?} is not a number")))
        };
        Ok(Self {
            file_name: file_name.to_string(),
            alias: parts[0].to_string(),
            offset: number(parts[1])?,
            consonant: number(parts[2])?,
            cutoff: number(parts[3])?,
            preutterance: number(parts[4])?,
            overlap: number(parts[5])?,
        })
    }
}

impl fmt::Display for OtoEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={},{},{},{},{},{}",
            self.file_name,
            self.alias,
            self.offset,
            self.consonant,
            self.cutoff,
            self.preutterance,
            self.overlap
        )
    }
}

/// A whole oto.ini: entries in file order plus alias lookup tables.
///
/// Serde sees only the entry list; the lookup tables are rebuilt on the way
/// back in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<OtoEntry>", into = "Vec<OtoEntry>")]
pub struct Oto {
    entries: Vec<OtoEntry>,
    index: HashMap<String, usize>,
    overflow: HashMap<String, Vec<usize>>,
}

impl From<Vec<OtoEntry>> for Oto {
    fn from(entries: Vec<OtoEntry>) -> Self {
        let mut oto = Self {
            entries,
            index: HashMap::new(),
            overflow: HashMap::new(),
        };
        oto.rebuild_index();
        oto
    }
}

impl From<Oto> for Vec<OtoEntry> {
    fn from(oto: Oto) -> Self {
        oto.entries
    }
}

impl Oto {
    /// Parse the lines of an oto.ini. Blank lines are skipped.
    pub fn parse<'a, I>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut entries = Vec::new();
        for line in lines {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            entries.push(OtoEntry::parse(line)?);
        }
        let mut oto = Self {
            entries,
            index: HashMap::new(),
            overflow: HashMap::new(),
        };
        oto.rebuild_index();
        debug!(
            "parsed oto.ini: {} lines, {} distinct aliases",
            oto.line_count(),
            oto.alias_count()
        );
        Ok(oto)
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        self.overflow.clear();
        for (i, entry) in self.entries.iter().enumerate() {
            if self.index.contains_key(&entry.alias) {
                self.overflow
                    .entry(entry.alias.clone())
                    .or_default()
                    .push(i);
            } else {
                self.index.insert(entry.alias.clone(), i);
            }
        }
    }

    /// Entries in file order.
    pub fn entries(&self) -> &[OtoEntry] {
        &self.entries
    }

    /// The entry an editor would pick for `alias` (its first definition).
    pub fn alias(&self, alias: &str) -> Option<&OtoEntry> {
        self.index.get(alias).map(|&i| &self.entries[i])
    }

    /// Every definition of `alias`, first one first.
    pub fn aliases(&self, alias: &str) -> Vec<&OtoEntry> {
        let mut found = Vec::new();
        if let Some(&i) = self.index.get(alias) {
            found.push(&self.entries[i]);
        }
        if let Some(extra) = self.overflow.get(alias) {
            found.extend(extra.iter().map(|&i| &self.entries[i]));
        }
        found
    }

    pub fn line_count(&self) -> usize {
        self.entries.len()
    }

    pub fn alias_count(&self) -> usize {
        self.index.len()
    }

    pub fn duplicate_count(&self) -> usize {
        self.line_count() - self.alias_count()
    }

    /// Apply an edit to the entry list and rebuild the lookup tables.
    pub fn edit_entries(&mut self, edit: impl FnOnce(&mut Vec<OtoEntry>)) {
        edit(&mut self.entries);
        self.rebuild_index();
    }

    /// The longest suffix shared by every distinct alias. Voicebanks append
    /// pitch markers ("_C4" and the like) to every alias; this finds them.
    pub fn common_postfix(&self) -> String {
        let mut aliases = self.index.keys();
        let Some(first) = aliases.next() else {
            return String::new();
        };
        let mut postfix = first.as_str();
        for alias in aliases {
            while !alias.ends_with(postfix) {
                let mut chars = postfix.chars();
                chars.next();
                postfix = chars.as_str();
            }
        }
        postfix.to_string()
    }

    /// Replace the shared alias postfix with `new_postfix` on every entry.
    pub fn change_common_postfix(&mut self, new_postfix: &str) {
        let old = self.common_postfix();
        if old.is_empty() && new_postfix.is_empty() {
            return;
        }
        for entry in &mut self.entries {
            if let Some(stem) = entry.alias.strip_suffix(&old) {
                entry.alias = format!("{stem}{new_postfix}");
            }
        }
        self.rebuild_index();
    }

    pub fn to_string_list(&self) -> Vec<String> {
        self.entries.iter().map(OtoEntry::to_string).collect()
    }
}

impl fmt::Display for Oto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            write!(f, "{entry}\r\n")?;
        }
        Ok(())
    }
}
