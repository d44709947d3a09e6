//! The resampler's 13-argument call.
//!
//! Resamplers are invoked per note with a fixed positional argument list:
//!
//! | # | meaning |
//! |---|---------|
//! | 0 | input sample path |
//! | 1 | output sample path |
//! | 2 | note name ("C4", "F#3", ...) |
//! | 3 | consonant velocity |
//! | 4 | flag string |
//! | 5 | offset into the sample, ms |
//! | 6 | required output length, ms |
//! | 7 | consonant length, ms |
//! | 8 | cutoff, ms |
//! | 9 | intensity, % |
//! | 10 | modulation, % |
//! | 11 | tempo, prefixed with `!` |
//! | 12 | pitchbend string |
//!
//! This type models that array with typed accessors; spawning the process is
//! the caller's business.

use serde::{Deserialize, Serialize};

use ustkit_core::pitch::{effective_velocity_factor, note_name, note_num, velocity_from_factor};
use ustkit_core::{pitchbend, FlagRegistry, FlagSet};

use crate::error::{Error, Result};

/// Number of resampler arguments.
pub const RESAMPLER_ARGC: usize = 13;

const ARG_INPUT: usize = 0;
const ARG_OUTPUT: usize = 1;
const ARG_NOTE_NAME: usize = 2;
const ARG_VELOCITY: usize = 3;
const ARG_FLAGS: usize = 4;
const ARG_OFFSET: usize = 5;
const ARG_LENGTH: usize = 6;
const ARG_CONSONANT: usize = 7;
const ARG_CUTOFF: usize = 8;
const ARG_INTENSITY: usize = 9;
const ARG_MODULATION: usize = 10;
const ARG_TEMPO: usize = 11;
const ARG_PITCHBEND: usize = 12;

/// A resampler argument array with typed views over the positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResamplerArgs {
    args: Vec<String>,
}

impl Default for ResamplerArgs {
    fn default() -> Self {
        Self::new()
    }
}

impl ResamplerArgs {
    /// An all-empty argument array of the right arity.
    pub fn new() -> Self {
        Self {
            args: vec![String::new(); RESAMPLER_ARGC],
        }
    }

    /// Wrap an existing argument array; the arity must match.
    pub fn from_args(args: Vec<String>) -> Result<Self> {
        if args.len() != RESAMPLER_ARGC {
            return Err(Error::Argument(format!(
                "resampler takes {RESAMPLER_ARGC} arguments, got {}",
                args.len()
            )));
        }
        Ok(Self { args })
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Raw mutable view for callers speaking to engines with private
    /// argument extensions. The typed setters are safer.
    pub fn args_mut(&mut self) -> &mut [String] {
        &mut self.args
    }

    pub fn into_args(self) -> Vec<String> {
        self.args
    }

    fn number(&self, index: usize, what: &str) -> Result<f64> {
        self.args[index]
            .trim()
            .parse()
            .map_err(|_| Error::Argument(format!("{what} {:?} is not a number", self.args[index])))
    }

    pub fn input_file(&self) -> &str {
        &self.args[ARG_INPUT]
    }

    pub fn set_input_file(&mut self, path: impl Into<String>) {
        self.args[ARG_INPUT] = path.into();
    }

    pub fn output_file(&self) -> &str {
        &self.args[ARG_OUTPUT]
    }

    pub fn set_output_file(&mut self, path: impl Into<String>) {
        self.args[ARG_OUTPUT] = path.into();
    }

    pub fn note_name(&self) -> &str {
        &self.args[ARG_NOTE_NAME]
    }

    pub fn set_note_name(&mut self, name: impl Into<String>) {
        self.args[ARG_NOTE_NAME] = name.into();
    }

    /// The note as a `NoteNum`; errors when the name argument is unknown.
    pub fn note_num(&self) -> Result<i32> {
        note_num(self.note_name())
            .ok_or_else(|| Error::Argument(format!("unknown note name {:?}", self.note_name())))
    }

    pub fn set_note_num(&mut self, num: i32) -> Result<()> {
        let name = note_name(num)
            .ok_or_else(|| Error::Argument(format!("note number {num} is outside C1..B7")))?;
        self.set_note_name(name);
        Ok(())
    }

    pub fn velocity(&self) -> Result<f64> {
        self.number(ARG_VELOCITY, "velocity")
    }

    pub fn set_velocity(&mut self, velocity: f64) {
        self.args[ARG_VELOCITY] = velocity.to_string();
    }

    /// Velocity expressed as its length multiplier.
    pub fn velocity_factor(&self) -> Result<f64> {
        Ok(effective_velocity_factor(self.velocity()?))
    }

    pub fn set_velocity_factor(&mut self, factor: f64) {
        self.set_velocity(velocity_from_factor(factor));
    }

    pub fn flag_text(&self) -> &str {
        &self.args[ARG_FLAGS]
    }

    pub fn set_flag_text(&mut self, flags: impl Into<String>) {
        self.args[ARG_FLAGS] = flags.into();
    }

    /// Parse the flag argument against the process-wide registry.
    pub fn flags(&self) -> Result<FlagSet> {
        Ok(FlagSet::parse(self.flag_text())?)
    }

    /// Parse the flag argument against an explicit registry.
    pub fn flags_with(&self, registry: &FlagRegistry) -> Result<FlagSet> {
        Ok(FlagSet::parse_with(self.flag_text(), registry)?)
    }

    pub fn set_flags(&mut self, flags: &FlagSet) {
        self.set_flag_text(flags.text());
    }

    pub fn offset(&self) -> Result<f64> {
        self.number(ARG_OFFSET, "offset")
    }

    pub fn set_offset(&mut self, ms: f64) {
        self.args[ARG_OFFSET] = ms.to_string();
    }

    /// Length of .wav output the wavtool expects, in milliseconds.
    pub fn required_length(&self) -> Result<f64> {
        self.number(ARG_LENGTH, "required length")
    }

    pub fn set_required_length(&mut self, ms: f64) {
        self.args[ARG_LENGTH] = ms.to_string();
    }

    pub fn consonant(&self) -> Result<f64> {
        self.number(ARG_CONSONANT, "consonant length")
    }

    pub fn set_consonant(&mut self, ms: f64) {
        self.args[ARG_CONSONANT] = ms.to_string();
    }

    pub fn cutoff(&self) -> Result<f64> {
        self.number(ARG_CUTOFF, "cutoff")
    }

    pub fn set_cutoff(&mut self, ms: f64) {
        self.args[ARG_CUTOFF] = ms.to_string();
    }

    pub fn intensity(&self) -> Result<f64> {
        self.number(ARG_INTENSITY, "intensity")
    }

    pub fn set_intensity(&mut self, percent: f64) {
        self.args[ARG_INTENSITY] = percent.to_string();
    }

    pub fn modulation(&self) -> Result<f64> {
        self.number(ARG_MODULATION, "modulation")
    }

    pub fn set_modulation(&mut self, percent: f64) {
        self.args[ARG_MODULATION] = percent.to_string();
    }

    /// Tempo in BPM. The argument carries a leading `!`; every engine in
    /// circulation writes and expects it, origin unknown.
    pub fn tempo(&self) -> Result<f64> {
        let raw = &self.args[ARG_TEMPO];
        let stripped = raw
            .strip_prefix('!')
            .ok_or_else(|| Error::Argument(format!("tempo {raw:?} is missing its '!' prefix")))?;
        stripped
            .trim()
            .parse()
            .map_err(|_| Error::Argument(format!("tempo {raw:?} is not a number")))
    }

    pub fn set_tempo(&mut self, bpm: f64) {
        self.args[ARG_TEMPO] = format!("!{bpm}");
    }

    pub fn pitchbend_text(&self) -> &str {
        &self.args[ARG_PITCHBEND]
    }

    pub fn set_pitchbend_text(&mut self, text: impl Into<String>) {
        self.args[ARG_PITCHBEND] = text.into();
    }

    /// Decode the pitchbend argument into per-frame values.
    pub fn pitchbend(&self) -> Result<Vec<i32>> {
        Ok(pitchbend::decode(self.pitchbend_text())?)
    }

    /// Replace the whole pitchbend curve.
    pub fn set_pitchbend(&mut self, values: &[i32]) -> Result<()> {
        self.args[ARG_PITCHBEND] = pitchbend::encode(values)?;
        Ok(())
    }

    /// Change a single pitchbend frame. For bulk edits decode once, edit,
    /// and [`set_pitchbend`](Self::set_pitchbend) once.
    pub fn set_pitchbend_at(&mut self, index: usize, value: i32) -> Result<()> {
        let mut values = self.pitchbend()?;
        if index >= values.len() {
            return Err(Error::Argument(format!(
                "pitchbend index {index} out of range ({} frames)",
                values.len()
            )));
        }
        values[index] = value;
        self.set_pitchbend(&values)
    }

    /// Overwrite the frames starting at `start` with `values`.
    pub fn patch_pitchbend(&mut self, start: usize, values: &[i32]) -> Result<()> {
        let mut frames = self.pitchbend()?;
        let end = start + values.len();
        if end > frames.len() {
            return Err(Error::Argument(format!(
                "pitchbend patch {start}..{end} out of range ({} frames)",
                frames.len()
            )));
        }
        frames[start..end].copy_from_slice(values);
        self.set_pitchbend(&frames)
    }

    /// Re-encode the pitchbend argument into its canonical (shortest) form.
    /// The decoded values are unchanged.
    pub fn recode_pitchbend(&mut self) -> Result<()> {
        let values = self.pitchbend()?;
        self.set_pitchbend(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample() -> ResamplerArgs {
        let mut args = ResamplerArgs::new();
        args.set_input_file("a.wav");
        args.set_output_file("out/a_C4.wav");
        args.set_note_name("C4");
        args.set_velocity(100.0);
        args.set_flag_text("g-5H50");
        args.set_offset(100.0);
        args.set_required_length(500.0);
        args.set_consonant(150.0);
        args.set_cutoff(-500.0);
        args.set_intensity(90.0);
        args.set_modulation(0.0);
        args.set_tempo(120.0);
        args.set_pitchbend(&[0, 0, 5, 5, 5]).unwrap();
        args
    }

    #[test]
    fn test_positional_layout() {
        let args = sample();
        assert_eq!(
            args.args(),
            &[
                "a.wav",
                "out/a_C4.wav",
                "C4",
                "100",
                "g-5H50",
                "100",
                "500",
                "150",
                "-500",
                "90",
                "0",
                "!120",
                "AAAAAF#3#",
            ]
        );
    }

    #[test]
    fn test_arity_check() {
        assert!(ResamplerArgs::from_args(vec![String::new(); 12]).is_err());
        assert!(ResamplerArgs::from_args(vec![String::new(); RESAMPLER_ARGC]).is_ok());
    }

    #[test]
    fn test_note_name_num_pair() {
        let mut args = sample();
        assert_eq!(args.note_num().unwrap(), 60);
        args.set_note_num(66).unwrap();
        assert_eq!(args.note_name(), "F#4");
        assert!(args.set_note_num(200).is_err());
        args.set_note_name("X1");
        assert!(args.note_num().is_err());
    }

    #[test]
    fn test_tempo_prefix() {
        let mut args = sample();
        assert_relative_eq!(args.tempo().unwrap(), 120.0);
        args.args_mut()[11] = "120".to_string();
        assert!(args.tempo().is_err());
    }

    #[test]
    fn test_flags_view() {
        let args = sample();
        let flags = args.flags().unwrap();
        assert_eq!(flags.first_value("H").unwrap(), Some(50.0));
    }

    #[test]
    fn test_pitchbend_edits() {
        let mut args = sample();
        assert_eq!(args.pitchbend().unwrap(), vec![0, 0, 5, 5, 5]);
        args.set_pitchbend_at(1, 7).unwrap();
        assert_eq!(args.pitchbend().unwrap(), vec![0, 7, 5, 5, 5]);
        assert!(args.set_pitchbend_at(99, 0).is_err());
        args.patch_pitchbend(2, &[1, 2]).unwrap();
        assert_eq!(args.pitchbend().unwrap(), vec![0, 7, 1, 2, 5]);
        assert!(args.patch_pitchbend(4, &[1, 2]).is_err());
    }

    #[test]
    fn test_recode_shortens_but_preserves() {
        let mut args = sample();
        // a long-winded but valid spelling of [0, 0, 0]
        args.set_pitchbend_text("AAAAAA");
        args.recode_pitchbend().unwrap();
        assert_eq!(args.pitchbend_text(), "AA#3#");
        assert_eq!(args.pitchbend().unwrap(), vec![0, 0, 0]);
    }

    #[test]
    fn test_velocity_factor_view() {
        let mut args = sample();
        assert_relative_eq!(args.velocity_factor().unwrap(), 1.0);
        args.set_velocity_factor(2.0);
        assert_relative_eq!(args.velocity().unwrap(), 0.0);
    }
}
