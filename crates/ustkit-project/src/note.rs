//! One note of a UST project.
//!
//! A note section is a list of `key=value` lines. The well-known keys become
//! typed fields here; the envelope, portamento, and vibrato values are
//! parsed into their models up front so later edits work on data instead of
//! text. Keys we have never heard of ride along verbatim and come back out
//! on serialization; editors and plugins stash private data in notes and it
//! must survive a round trip.

use serde::{Deserialize, Serialize};
use std::fmt;

use ustkit_core::pitch::{effective_velocity_factor, ticks_to_ms};
use ustkit_core::{Envelope, FlagRegistry, FlagSet, Portamento, Vibrato};

use crate::error::{Error, Result};

pub const KEY_LENGTH: &str = "Length";
pub const KEY_LYRIC: &str = "Lyric";
pub const KEY_NOTE_NUM: &str = "NoteNum";
pub const KEY_LABEL: &str = "Label";

pub const KEY_PRE_UTTERANCE: &str = "PreUtterance";
pub const KEY_VOICE_OVERLAP: &str = "VoiceOverlap";
pub const KEY_START_POINT: &str = "StartPoint";
pub const KEY_VELOCITY: &str = "Velocity";
pub const KEY_INTENSITY: &str = "Intensity";
pub const KEY_MODULATION: &str = "Modulation";
pub const KEY_TEMPO: &str = "Tempo";

pub const KEY_ENVELOPE: &str = "Envelope";
pub const KEY_FLAGS: &str = "Flags";

pub const KEY_PBS: &str = "PBS";
pub const KEY_PBW: &str = "PBW";
pub const KEY_PBY: &str = "PBY";
pub const KEY_PBM: &str = "PBM";
pub const KEY_VBR: &str = "VBR";

/// A note, with the well-known attributes parsed into typed fields.
///
/// `length` is in ticks, `note_num` addresses pitch (C1 is 24). Optional
/// numeric attributes distinguish *absent* (use the voicebank or editor
/// default) from present-and-zero, hence the `Option`s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub length: i32,
    pub lyric: String,
    pub note_num: i32,
    pub label: Option<String>,

    pub pre_utterance: Option<f64>,
    pub voice_overlap: Option<f64>,
    pub start_point: Option<f64>,
    pub velocity: Option<f64>,
    pub intensity: Option<f64>,
    pub modulation: Option<f64>,
    pub tempo: Option<f64>,

    /// Verbatim flag text. Parse on demand via [`flags`](Self::flags).
    pub flag_text: Option<String>,

    pub envelope: Envelope,
    pub portamento: Option<Portamento>,
    pub vibrato: Option<Vibrato>,

    /// Unknown attributes, in source order, for round-tripping.
    extras: Vec<(String, String)>,
}

fn split_line(line: &str) -> Result<(&str, &str)> {
    line.split_once('=')
        .ok_or_else(|| Error::MalformedLine(line.to_string()))
}

fn take(pairs: &mut Vec<(String, String)>, key: &str) -> Option<String> {
    let index = pairs.iter().position(|(k, _)| k == key)?;
    Some(pairs.remove(index).1)
}

fn parse_attr<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| Error::InvalidAttribute {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Empty attribute values mean "unset", not zero.
fn optional_number(pairs: &mut Vec<(String, String)>, key: &str) -> Result<Option<f64>> {
    match take(pairs, key) {
        Some(value) if !value.trim().is_empty() => Ok(Some(parse_attr(key, &value)?)),
        _ => Ok(None),
    }
}

impl Note {
    /// Minimal note: length in ticks, lyric, pitch. Stock envelope, no glide.
    pub fn new(length: i32, lyric: impl Into<String>, note_num: i32) -> Self {
        Self {
            length,
            lyric: lyric.into(),
            note_num,
            label: None,
            pre_utterance: None,
            voice_overlap: None,
            start_point: None,
            velocity: None,
            intensity: None,
            modulation: None,
            tempo: None,
            flag_text: None,
            envelope: Envelope::default(),
            portamento: None,
            vibrato: None,
            extras: Vec::new(),
        }
    }

    /// A rest of the given length.
    pub fn rest(length: i32) -> Self {
        Self::new(length, "R", 48)
    }

    /// Parse a note from the `key=value` lines of its section.
    pub fn from_lines<'a, I>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut pairs: Vec<(String, String)> = Vec::new();
        for line in lines {
            let (key, value) = split_line(line)?;
            pairs.push((key.to_string(), value.to_string()));
        }

        let length = take(&mut pairs, KEY_LENGTH)
            .ok_or(Error::MissingAttribute(KEY_LENGTH))
            .and_then(|v| parse_attr(KEY_LENGTH, &v))?;
        let lyric = take(&mut pairs, KEY_LYRIC).ok_or(Error::MissingAttribute(KEY_LYRIC))?;
        let note_num = take(&mut pairs, KEY_NOTE_NUM)
            .ok_or(Error::MissingAttribute(KEY_NOTE_NUM))
            .and_then(|v| parse_attr(KEY_NOTE_NUM, &v))?;

        let envelope = match take(&mut pairs, KEY_ENVELOPE) {
            Some(text) => Envelope::parse(&text)?,
            None => Envelope::default(),
        };

        // only PBW makes a portamento; the other three default sensibly
        let portamento = match take(&mut pairs, KEY_PBW) {
            Some(pbw) => {
                let pbs = take(&mut pairs, KEY_PBS).unwrap_or_default();
                let pby = take(&mut pairs, KEY_PBY).unwrap_or_default();
                let pbm = take(&mut pairs, KEY_PBM).unwrap_or_default();
                Some(Portamento::parse(&pbw, &pbs, &pby, &pbm)?)
            }
            None => None,
        };

        let vibrato = match take(&mut pairs, KEY_VBR) {
            Some(text) => Some(Vibrato::parse(&text)?),
            None => None,
        };

        Ok(Self {
            length,
            lyric,
            note_num,
            label: take(&mut pairs, KEY_LABEL),
            pre_utterance: optional_number(&mut pairs, KEY_PRE_UTTERANCE)?,
            voice_overlap: optional_number(&mut pairs, KEY_VOICE_OVERLAP)?,
            start_point: optional_number(&mut pairs, KEY_START_POINT)?,
            velocity: optional_number(&mut pairs, KEY_VELOCITY)?,
            intensity: optional_number(&mut pairs, KEY_INTENSITY)?,
            modulation: optional_number(&mut pairs, KEY_MODULATION)?,
            tempo: optional_number(&mut pairs, KEY_TEMPO)?,
            flag_text: take(&mut pairs, KEY_FLAGS),
            envelope,
            portamento,
            vibrato,
            extras: pairs,
        })
    }

    pub fn is_rest(&self) -> bool {
        self.lyric == "R"
    }

    /// Parse the flag text against the process-wide registry.
    pub fn flags(&self) -> ustkit_core::Result<FlagSet> {
        FlagSet::parse(self.flag_text.as_deref().unwrap_or(""))
    }

    /// Parse the flag text against an explicit registry.
    pub fn flags_with(&self, registry: &FlagRegistry) -> ustkit_core::Result<FlagSet> {
        FlagSet::parse_with(self.flag_text.as_deref().unwrap_or(""), registry)
    }

    /// Store a flag set back as text.
    pub fn set_flags(&mut self, flags: &FlagSet) {
        self.flag_text = Some(flags.text().to_string());
    }

    /// Consonant-velocity length multiplier; velocity 100 when unset.
    pub fn velocity_factor(&self) -> f64 {
        effective_velocity_factor(self.velocity.unwrap_or(100.0))
    }

    /// Duration in milliseconds at `bpm`, unless the note pins its own tempo.
    pub fn duration_ms(&self, bpm: f64) -> f64 {
        ticks_to_ms(self.length as f64, self.tempo.unwrap_or(bpm))
    }

    /// Unknown attributes kept for round-tripping.
    pub fn extras(&self) -> &[(String, String)] {
        &self.extras
    }

    pub fn set_extra(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.extras.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => self.extras.push((key, value)),
        }
    }

    /// The note body as `key=value` lines, section header not included.
    ///
    /// Typed attributes come out in a fixed order; unknown attributes keep
    /// their source order. Data is equivalent to the input, not byte-equal.
    pub fn to_string_list(&self) -> Vec<String> {
        let mut lines = vec![
            format!("{KEY_LENGTH}={}", self.length),
            format!("{KEY_LYRIC}={}", self.lyric),
            format!("{KEY_NOTE_NUM}={}", self.note_num),
        ];
        let mut number = |key: &str, value: Option<f64>| {
            if let Some(v) = value {
                lines.push(format!("{key}={v}"));
            }
        };
        number(KEY_PRE_UTTERANCE, self.pre_utterance);
        number(KEY_VOICE_OVERLAP, self.voice_overlap);
        number(KEY_START_POINT, self.start_point);
        number(KEY_VELOCITY, self.velocity);
        number(KEY_INTENSITY, self.intensity);
        number(KEY_MODULATION, self.modulation);
        number(KEY_TEMPO, self.tempo);
        if let Some(label) = &self.label {
            lines.push(format!("{KEY_LABEL}={label}"));
        }
        if let Some(flags) = &self.flag_text {
            lines.push(format!("{KEY_FLAGS}={flags}"));
        }
        for (key, value) in &self.extras {
            lines.push(format!("{key}={value}"));
        }
        if let Some(vibrato) = &self.vibrato {
            lines.push(format!("{KEY_VBR}={vibrato}"));
        }
        if let Some(portamento) = &self.portamento {
            lines.extend(portamento.to_string_list());
        }
        lines.push(format!("{KEY_ENVELOPE}={}", self.envelope));
        lines
    }
}

impl Default for Note {
    /// A quarter note of "あ" at C3.
    fn default() -> Self {
        Self::new(240, "あ", 48)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.to_string_list() {
            write!(f, "{line}\r\n")?;
        }
        Ok(())
    }
}
