//! Note vibrato (`VBR` attribute).
//!
//! Eight comma-separated numbers: length (% of the note), cycle (ms), depth
//! (cents), fade-in (%), fade-out (%), phase (% of a cycle), pitch (% of
//! depth, a baseline shift), and an eighth slot of unknown purpose that is
//! carried untouched. Blank elements mean zero; short inputs are padded.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::fmt;

use crate::error::{Error, Result};

/// A note's vibrato settings.
///
/// The vibrato occupies the *tail* of the note: length 65 means the last 65%
/// of the note wobbles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vibrato {
    params: [f64; 8],
}

impl Vibrato {
    /// Parse the `VBR` value. Blank elements mean zero; missing trailing
    /// elements are padded with zero; extra elements are an error.
    pub fn parse(text: &str) -> Result<Self> {
        let mut params = [0.0; 8];
        for (i, part) in text.split(',').enumerate() {
            if i >= params.len() {
                return Err(Error::VibratoFormat(format!(
                    "vibrato has more than {} fields",
                    params.len()
                )));
            }
            let part = part.trim();
            if !part.is_empty() {
                params[i] = part.parse().map_err(|_| {
                    Error::VibratoFormat(format!("vibrato field {part:?} is not a number"))
                })?;
            }
        }
        Ok(Self { params })
    }

    /// A full-length vibrato with the given cycle and depth and no fades.
    pub fn full_length(cycle_ms: f64, depth_cents: f64) -> Self {
        let mut params = [0.0; 8];
        params[0] = 100.0;
        params[1] = cycle_ms;
        params[2] = depth_cents;
        Self { params }
    }

    pub fn params(&self) -> &[f64; 8] {
        &self.params
    }

    /// Length as a percentage of the note. Default 65.
    pub fn length(&self) -> f64 {
        self.params[0]
    }

    pub fn set_length(&mut self, percent: f64) {
        self.params[0] = percent;
    }

    /// Cycle (inverse frequency) in milliseconds. Default 180.
    pub fn cycle(&self) -> f64 {
        self.params[1]
    }

    pub fn set_cycle(&mut self, ms: f64) {
        self.params[1] = ms;
    }

    /// Depth in cents. Default 35.
    pub fn depth(&self) -> f64 {
        self.params[2]
    }

    pub fn set_depth(&mut self, cents: f64) {
        self.params[2] = cents;
    }

    /// Linear fade-in portion in percent.
    pub fn fade_in(&self) -> f64 {
        self.params[3]
    }

    /// Fade-in plus fade-out cannot exceed the whole vibrato.
    pub fn set_fade_in(&mut self, percent: f64) -> Result<()> {
        if percent + self.fade_out() > 100.0 {
            return Err(Error::VibratoRange(format!(
                "fade-in {percent}% plus fade-out {}% exceeds 100%",
                self.fade_out()
            )));
        }
        self.params[3] = percent;
        Ok(())
    }

    /// Linear fade-out portion in percent.
    pub fn fade_out(&self) -> f64 {
        self.params[4]
    }

    pub fn set_fade_out(&mut self, percent: f64) -> Result<()> {
        if percent + self.fade_in() > 100.0 {
            return Err(Error::VibratoRange(format!(
                "fade-out {percent}% plus fade-in {}% exceeds 100%",
                self.fade_in()
            )));
        }
        self.params[4] = percent;
        Ok(())
    }

    /// Phase offset as a percentage of one cycle.
    pub fn phase(&self) -> f64 {
        self.params[5]
    }

    pub fn set_phase(&mut self, percent: f64) {
        self.params[5] = percent;
    }

    /// Baseline shift as a percentage of depth.
    pub fn pitch(&self) -> f64 {
        self.params[6]
    }

    pub fn set_pitch(&mut self, percent: f64) {
        self.params[6] = percent;
    }

    /// The baseline shift in cents instead of percent-of-depth.
    pub fn pitch_as_cents(&self) -> f64 {
        self.pitch() * 0.01 * self.depth()
    }

    pub fn set_pitch_as_cents(&mut self, cents: f64) {
        self.params[6] = cents / self.depth() * 100.0;
    }

    /// Pitch offset in cents at `at_ms` into a note `note_len_ms` long.
    ///
    /// Zero outside the vibrato window. The sine's phase advances once per
    /// cycle; fades scale the whole offset linearly at both ends.
    pub fn sample(&self, at_ms: f64, note_len_ms: f64) -> f64 {
        let len = note_len_ms * self.length() / 100.0;
        let blank = note_len_ms - len;
        if at_ms < blank || at_ms > note_len_ms || len <= 0.0 || self.cycle() <= 0.0 {
            return 0.0;
        }

        let rel = at_ms - blank;
        let turns = rel / self.cycle() + self.phase() / 100.0;
        let unfaded = self.depth() * (TAU * turns).sin() + self.pitch_as_cents();

        let progress = rel / len;
        let fade_in = self.fade_in() / 100.0;
        let fade_out = self.fade_out() / 100.0;
        let fade = if progress < fade_in {
            progress / fade_in
        } else if progress > 1.0 - fade_out {
            (1.0 - progress) / fade_out
        } else {
            1.0
        };

        unfaded * fade
    }
}

impl Default for Vibrato {
    /// The editor's stock vibrato, `65,180,35,20,20,0,0,0`.
    fn default() -> Self {
        Self {
            params: [65.0, 180.0, 35.0, 20.0, 20.0, 0.0, 0.0, 0.0],
        }
    }
}

impl fmt::Display for Vibrato {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
        f.write_str(&rendered.join(","))
    }
}
