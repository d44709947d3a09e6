//! Flag string tokenizer and the immutable [`FlagSet`].
//!
//! A flag string is a run of tokens with no separators, each either a bare
//! name (`G`) or a name followed by a number (`g-5`, `Mt100`). Nothing in the
//! grammar marks where one name ends and the next begins, so segmentation
//! leans on the [`FlagRegistry`]: known no-parameter names match greedily by
//! longest prefix, known parameter names claim the longest suffix of the
//! letters in front of a number. Unknown residue is kept as a single flag
//! rather than dropped; resamplers define their own flags and we must not
//! eat ones we have never heard of.

mod registry;

pub use registry::{FlagRegistry, MORESAMPLER_FLAGS, UTAUGROWL_FLAGS, VANILLA_FLAGS};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{Error, Result};

/// One parsed flag: a name and, for parameter flags, its value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flag {
    pub name: String,
    pub value: Option<f64>,
}

impl Flag {
    pub fn new(name: impl Into<String>, value: Option<f64>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// An immutable, ordered set of flags plus the verbatim text it came from.
///
/// The source text is authoritative for display and round-tripping; the
/// parsed list drives lookups. Every mutation returns a new `FlagSet` whose
/// text is rebuilt from the updated list (values rounded to two decimals).
///
/// # Example
/// ```ignore
/// let flags = FlagSet::parse("g-5H50Mt100B3")?;
/// assert!(flags.has("Mt"));
/// let softer = flags.with_value("Mt", -50.0);
/// assert_eq!(flags.first_value("Mt")?, Some(100.0)); // original untouched
/// assert_eq!(softer.first_value("Mt")?, Some(-50.0));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlagSet {
    text: String,
    flags: Vec<Flag>,
}

impl FlagSet {
    /// Tokenize against the process-wide default registry.
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with(text, FlagRegistry::global())
    }

    /// Tokenize against an explicit registry.
    pub fn parse_with(text: &str, registry: &FlagRegistry) -> Result<Self> {
        let flags = tokenize(text, registry)?;
        Ok(Self {
            text: text.to_string(),
            flags,
        })
    }

    /// Build a set from an already-segmented flag list.
    ///
    /// The text is synthesized from the list, so it will not match any
    /// particular source spelling.
    pub fn from_flags(flags: Vec<Flag>) -> Self {
        let mut text = String::new();
        for flag in &flags {
            text.push_str(&flag.name);
            if let Some(value) = flag.value {
                let rounded = (value * 100.0).round() / 100.0;
                text.push_str(&rounded.to_string());
            }
        }
        Self { text, flags }
    }

    /// The verbatim source text (or the synthesized equivalent after edits).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The parsed flags, in source order.
    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn has(&self, name: &str) -> bool {
        self.flags.iter().any(|f| f.name == name)
    }

    /// Value of the first occurrence of `name`, which is the one the engine
    /// honors.
    ///
    /// `Ok(None)` means the flag is present without a parameter. An absent
    /// flag is an error; check [`has`](Self::has) first.
    pub fn first_value(&self, name: &str) -> Result<Option<f64>> {
        self.flags
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value)
            .ok_or_else(|| Error::FlagNotFound(name.to_string()))
    }

    /// New set with the first occurrence of `name` set to `value`, appending
    /// the flag if it was absent.
    pub fn with_value(&self, name: &str, value: f64) -> FlagSet {
        let mut flags = self.flags.clone();
        match flags.iter_mut().find(|f| f.name == name) {
            Some(flag) => flag.value = Some(value),
            None => flags.push(Flag::new(name, Some(value))),
        }
        Self::from_flags(flags)
    }

    /// New set with the no-parameter flag `name` present.
    pub fn with(&self, name: &str) -> FlagSet {
        if self.has(name) {
            self.clone()
        } else {
            let mut flags = self.flags.clone();
            flags.push(Flag::new(name, None));
            Self::from_flags(flags)
        }
    }

    /// New set with every occurrence of `name` removed.
    pub fn without(&self, name: &str) -> FlagSet {
        Self::from_flags(
            self.flags
                .iter()
                .filter(|f| f.name != name)
                .cloned()
                .collect(),
        )
    }

    /// New set keeping only the first occurrence of each name.
    pub fn dedup(&self) -> FlagSet {
        let mut seen = HashSet::new();
        Self::from_flags(
            self.flags
                .iter()
                .filter(|f| seen.insert(f.name.clone()))
                .cloned()
                .collect(),
        )
    }
}

impl fmt::Display for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Tokenize a flag string against a registry.
///
/// The scanner walks the remaining suffix: a maximal run of ASCII letters,
/// then an optional anchored number (`-?digits[.digits]`). Without a number
/// the run is segmented into no-parameter flags and scanning stops. With a
/// number, the longest registered parameter name ending the run claims the
/// value; if none matches, the run is segmented anyway and the final piece
/// absorbs the value; that is how unknown parameterized flags survive.
pub fn tokenize(text: &str, registry: &FlagRegistry) -> Result<Vec<Flag>> {
    let table = registry.table.read();
    let src = text.trim();
    let mut flags = Vec::new();
    let mut rest = src;

    while !rest.is_empty() {
        let letters_end = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        if letters_end == 0 {
            // a token can only begin with a letter; anything else here means
            // the string broke the grammar
            return Err(Error::MalformedFlag {
                position: src.len() - rest.len(),
            });
        }
        let run = &rest[..letters_end];
        rest = &rest[letters_end..];

        let Some((value, number_len)) = scan_number(rest) else {
            // the run is the last token: all names, no parameter
            for name in segment_no_param(run, &table.no_param) {
                flags.push(Flag::new(name, None));
            }
            break;
        };
        rest = &rest[number_len..];

        let known_suffix = table
            .with_param
            .iter()
            .filter(|name| run.ends_with(name.as_str()))
            .max_by_key(|name| name.len());

        match known_suffix {
            Some(name) => {
                let prefix = &run[..run.len() - name.len()];
                if !prefix.is_empty() {
                    for piece in segment_no_param(prefix, &table.no_param) {
                        flags.push(Flag::new(piece, None));
                    }
                }
                flags.push(Flag::new(name.clone(), Some(value)));
            }
            None => {
                let mut pieces = segment_no_param(run, &table.no_param);
                let last = pieces
                    .pop()
                    .expect("segmenting a non-empty run yields at least one piece");
                for piece in pieces {
                    flags.push(Flag::new(piece, None));
                }
                flags.push(Flag::new(last, Some(value)));
            }
        }
    }

    Ok(flags)
}

/// Split a run of letters into consecutive no-parameter flags, longest known
/// prefix first. An unmatched tail is kept whole as one unknown name.
fn segment_no_param(run: &str, no_param: &HashSet<String>) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut rest = run;
    while !rest.is_empty() {
        let best = no_param
            .iter()
            .filter(|name| rest.starts_with(name.as_str()))
            .max_by_key(|name| name.len());
        match best {
            Some(name) => {
                pieces.push(name.clone());
                rest = &rest[name.len()..];
            }
            None => {
                pieces.push(rest.to_string());
                break;
            }
        }
    }
    pieces
}

/// Anchored `-?digits[.digits]` scan. Returns the value and consumed length.
fn scan_number(s: &str) -> Option<(f64, usize)> {
    let bytes = s.as_bytes();
    let mut i = 0;
    if i < bytes.len() && bytes[i] == b'-' {
        i += 1;
    }
    let digits_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == digits_start {
        return None;
    }
    let mut end = i;
    if i < bytes.len() && bytes[i] == b'.' {
        let mut j = i + 1;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        // the dot only belongs to the number when digits follow it
        if j > i + 1 {
            end = j;
        }
    }
    let value: f64 = s[..end].parse().ok()?;
    Some((value, end))
}
