//! The UST project container.
//!
//! A project file is a run of sections, each headed by a `[#...]` line:
//! `[#VERSION]`, `[#SETTING]`, then one numbered section per note, with
//! `[#TRACKEND]` closing a track. Section numbering is positional noise;
//! notes are re-numbered on write.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::error::{Error, Result};
use crate::note::Note;

pub const KEY_PROJECT_NAME: &str = "ProjectName";
pub const KEY_TEMPO: &str = "Tempo";
pub const KEY_VOICE_DIR: &str = "VoiceDir";
pub const KEY_OUT_FILE: &str = "OutFile";
pub const KEY_CACHE_DIR: &str = "CacheDir";
/// The wavtool path ("append" tool).
pub const KEY_TOOL1: &str = "Tool1";
/// The resampler path ("resample" tool).
pub const KEY_TOOL2: &str = "Tool2";
pub const KEY_MODE2: &str = "Mode2";

const VERSION_HEADER: &str = "[#VERSION]";
const SETTING_HEADER: &str = "[#SETTING]";
const TRACKEND_HEADER: &str = "[#TRACKEND]";

/// A parsed project: version line, settings, and tracks of notes.
///
/// Callers hand in decoded text; sniffing the on-disk encoding (these files
/// are traditionally Shift-JIS) is the reader's problem, not ours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UstProject {
    pub version: String,
    settings: Vec<(String, String)>,
    pub tracks: Vec<Vec<Note>>,
}

impl UstProject {
    /// Parse a whole project from decoded text.
    ///
    /// After the notes are in, a sliding window resolves each portamento's
    /// missing start magnitude from the previous note's pitch; a note
    /// cannot know its neighbors, so the fix-up lives here.
    pub fn parse(text: &str) -> Result<Self> {
        let lines = text
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .filter(|l| !l.trim().is_empty());

        let mut version = None;
        let mut settings = Vec::new();
        let mut tracks: Vec<Vec<Note>> = Vec::new();
        let mut track: Vec<Note> = Vec::new();

        enum Section {
            None,
            Version,
            Setting,
            Note(Vec<String>),
        }
        let mut current = Section::None;

        let finish = |section: &mut Section, track: &mut Vec<Note>| -> Result<()> {
            if let Section::Note(lines) = section {
                track.push(Note::from_lines(lines.iter().map(String::as_str))?);
            }
            *section = Section::None;
            Ok(())
        };

        for line in lines {
            if line.starts_with("[#") && line.ends_with(']') {
                finish(&mut current, &mut track)?;
                match line {
                    VERSION_HEADER => current = Section::Version,
                    SETTING_HEADER => current = Section::Setting,
                    TRACKEND_HEADER => {
                        tracks.push(std::mem::take(&mut track));
                    }
                    _ => current = Section::Note(Vec::new()),
                }
                continue;
            }
            match &mut current {
                Section::None => {
                    // tolerate a bare version line before any header
                    if version.is_none() && line.starts_with("UST Version") {
                        version = Some(line.to_string());
                    }
                }
                Section::Version => {
                    if version.is_none() {
                        version = Some(line.to_string());
                    }
                }
                Section::Setting => {
                    let (key, value) = line
                        .split_once('=')
                        .ok_or_else(|| Error::MalformedLine(line.to_string()))?;
                    settings.push((key.to_string(), value.to_string()));
                }
                Section::Note(lines) => lines.push(line.to_string()),
            }
        }
        finish(&mut current, &mut track)?;
        if !track.is_empty() {
            tracks.push(track);
        }
        if tracks.is_empty() {
            tracks.push(Vec::new());
        }

        let version = version.ok_or(Error::MissingSection("VERSION"))?;
        let mut project = Self {
            version,
            settings,
            tracks,
        };
        project.resolve_start_magnitudes();

        debug!(
            "parsed UST project: {} tracks, {} notes",
            project.tracks.len(),
            project.tracks.iter().map(Vec::len).sum::<usize>()
        );
        Ok(project)
    }

    /// Fill in every unresolved portamento start from the preceding note.
    ///
    /// The start magnitude is the previous pitch relative to this note, in
    /// 10-cent units; `NoteNum` steps are semitones, which is the same
    /// scale. A first note with a glide has no neighbor and stays
    /// unresolved.
    pub fn resolve_start_magnitudes(&mut self) {
        for track in &mut self.tracks {
            for i in 1..track.len() {
                let prev_num = track[i - 1].note_num;
                let note = &mut track[i];
                if let Some(portamento) = &mut note.portamento {
                    if !portamento.has_start_magnitude() {
                        portamento.set_start_magnitude((prev_num - note.note_num) as f64);
                    }
                }
            }
        }
    }

    /// Notes of the first track; most projects have exactly one.
    pub fn notes(&self) -> &[Note] {
        &self.tracks[0]
    }

    pub fn notes_mut(&mut self) -> &mut Vec<Note> {
        &mut self.tracks[0]
    }

    pub fn setting(&self, key: &str) -> Option<&str> {
        self.settings
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_setting(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.settings.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => self.settings.push((key, value)),
        }
    }

    pub fn settings(&self) -> &[(String, String)] {
        &self.settings
    }

    /// Project tempo in BPM, if the setting is present and numeric.
    pub fn tempo(&self) -> Option<f64> {
        self.setting(KEY_TEMPO).and_then(|v| v.trim().parse().ok())
    }

    pub fn project_name(&self) -> Option<&str> {
        self.setting(KEY_PROJECT_NAME)
    }

    pub fn voice_dir(&self) -> Option<&str> {
        self.setting(KEY_VOICE_DIR)
    }

    pub fn out_file(&self) -> Option<&str> {
        self.setting(KEY_OUT_FILE)
    }

    pub fn cache_dir(&self) -> Option<&str> {
        self.setting(KEY_CACHE_DIR)
    }

    pub fn wavtool(&self) -> Option<&str> {
        self.setting(KEY_TOOL1)
    }

    pub fn resampler(&self) -> Option<&str> {
        self.setting(KEY_TOOL2)
    }

    pub fn is_mode2(&self) -> bool {
        self.setting(KEY_MODE2)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    /// The whole project as lines, notes re-numbered from `[#0000]`.
    pub fn to_string_list(&self) -> Vec<String> {
        let mut lines = vec![VERSION_HEADER.to_string(), self.version.clone()];
        lines.push(SETTING_HEADER.to_string());
        for (key, value) in &self.settings {
            lines.push(format!("{key}={value}"));
        }
        for track in &self.tracks {
            for (i, note) in track.iter().enumerate() {
                lines.push(format!("[#{i:04}]"));
                lines.extend(note.to_string_list());
            }
            lines.push(TRACKEND_HEADER.to_string());
        }
        lines
    }
}

impl fmt::Display for UstProject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.to_string_list() {
            write!(f, "{line}\r\n")?;
        }
        Ok(())
    }
}
