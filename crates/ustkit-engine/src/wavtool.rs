//! The wavtool's argument list.
//!
//! The wavtool appends one rendered note to the output take, positioned and
//! shaped by an envelope flattened into positional arguments:
//!
//! | # | meaning |
//! |---|---------|
//! | 0 | output (take) file |
//! | 1 | input sample |
//! | 2 | start point (STP), velocity-adjusted, ms |
//! | 3 | `length@tempo+preutterance` duration spec |
//! | 4..10 | envelope p1 p2 p3 v1 v2 v3 v4 |
//! | 11 | overlap, velocity-adjusted, ms |
//! | 12..14 | envelope p4 p5 v5, only as deep as present |
//!
//! "Velocity-adjusted" means multiplied by the consonant-velocity length
//! factor before the tool sees it.

use serde::{Deserialize, Serialize};

use ustkit_core::envelope::{DEFAULT_P4, DEFAULT_P5, DEFAULT_V5};
use ustkit_core::pitch::effective_velocity_factor;
use ustkit_core::Envelope;

use crate::error::{Error, Result};

/// Fewest arguments a wavtool call can carry (no optional envelope tail).
pub const WAVTOOL_MIN_ARGC: usize = 12;

/// A wavtool argument array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WavtoolArgs {
    args: Vec<String>,
}

impl Default for WavtoolArgs {
    fn default() -> Self {
        Self {
            args: vec![String::new(); WAVTOOL_MIN_ARGC],
        }
    }
}

impl WavtoolArgs {
    /// Build a call from already-adjusted timings.
    ///
    /// `length_ticks` and `tempo` form the duration spec together with the
    /// adjusted pre-utterance. The envelope's optional points are emitted
    /// only as deep as the deepest present one, with engine defaults filling
    /// elided slots in between.
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        output_file: &str,
        input_file: &str,
        stp_adjusted: f64,
        length_ticks: f64,
        tempo: f64,
        pre_utterance_adjusted: f64,
        overlap_adjusted: f64,
        envelope: &Envelope,
    ) -> Self {
        let mut args = vec![
            output_file.to_string(),
            input_file.to_string(),
            stp_adjusted.to_string(),
            format!("{length_ticks}@{tempo}+{pre_utterance_adjusted}"),
        ];
        for value in [
            envelope.p1,
            envelope.p2,
            envelope.p3,
            envelope.v1,
            envelope.v2,
            envelope.v3,
            envelope.v4,
        ] {
            args.push(value.to_string());
        }
        args.push(overlap_adjusted.to_string());
        if envelope.has_v5() {
            args.push(envelope.p4().unwrap_or(DEFAULT_P4).to_string());
            args.push(envelope.p5().unwrap_or(DEFAULT_P5).to_string());
            args.push(envelope.v5().unwrap_or(DEFAULT_V5).to_string());
        } else if let Some(p5) = envelope.p5() {
            args.push(envelope.p4().unwrap_or(DEFAULT_P4).to_string());
            args.push(p5.to_string());
        } else if let Some(p4) = envelope.p4() {
            args.push(p4.to_string());
        }
        Self { args }
    }

    /// Build a call from raw timings plus a velocity, applying the
    /// consonant-velocity factor to STP, pre-utterance, and overlap.
    #[allow(clippy::too_many_arguments)]
    pub fn with_velocity(
        output_file: &str,
        input_file: &str,
        stp: f64,
        length_ticks: f64,
        tempo: f64,
        pre_utterance: f64,
        overlap: f64,
        envelope: &Envelope,
        velocity: f64,
    ) -> Self {
        let factor = effective_velocity_factor(velocity);
        Self::build(
            output_file,
            input_file,
            stp * factor,
            length_ticks,
            tempo,
            pre_utterance * factor,
            overlap * factor,
            envelope,
        )
    }

    /// Wrap an existing argument array; the arity must be plausible.
    pub fn from_args(args: Vec<String>) -> Result<Self> {
        if !(WAVTOOL_MIN_ARGC..=WAVTOOL_MIN_ARGC + 3).contains(&args.len()) {
            return Err(Error::Argument(format!(
                "wavtool takes {WAVTOOL_MIN_ARGC} to {} arguments, got {}",
                WAVTOOL_MIN_ARGC + 3,
                args.len()
            )));
        }
        Ok(Self { args })
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn into_args(self) -> Vec<String> {
        self.args
    }

    pub fn output_file(&self) -> &str {
        &self.args[0]
    }

    pub fn input_file(&self) -> &str {
        &self.args[1]
    }

    pub fn stp(&self) -> Result<f64> {
        self.args[2]
            .trim()
            .parse()
            .map_err(|_| Error::Argument(format!("STP {:?} is not a number", self.args[2])))
    }

    /// The raw `length@tempo+preutterance` spec.
    pub fn duration_spec(&self) -> &str {
        &self.args[3]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_build_layout_without_optionals() {
        let envelope = Envelope::parse("0,5,35,0,100,100,0,%").unwrap();
        let call = WavtoolArgs::build(
            "take.wav", "a.wav", 10.0, 480.0, 120.0, 50.0, 30.0, &envelope,
        );
        assert_eq!(
            call.args(),
            &["take.wav", "a.wav", "10", "480@120+50", "0", "5", "35", "0", "100", "100", "0", "30"]
        );
        assert_eq!(call.duration_spec(), "480@120+50");
    }

    #[test]
    fn test_build_envelope_tail_depth() {
        // p4 alone
        let envelope = Envelope::parse("0,5,35,0,100,100,0,%,12").unwrap();
        let call = WavtoolArgs::build("o", "i", 0.0, 480.0, 120.0, 0.0, 0.0, &envelope);
        assert_eq!(call.args().len(), 13);
        assert_eq!(call.args()[12], "12");

        // v5 present with p4/p5 elided: defaults fill the gap
        let mut envelope = Envelope::parse("0,5,35,0,100,100,0,%").unwrap();
        envelope.set_v5(80.0);
        let call = WavtoolArgs::build("o", "i", 0.0, 480.0, 120.0, 0.0, 0.0, &envelope);
        assert_eq!(&call.args()[12..], &["0", "10", "80"]);
    }

    #[test]
    fn test_velocity_adjusts_timings() {
        let envelope = Envelope::default();
        // velocity 0 doubles every adjusted timing
        let call = WavtoolArgs::with_velocity(
            "o", "i", 10.0, 480.0, 120.0, 50.0, 30.0, &envelope, 0.0,
        );
        assert_relative_eq!(call.stp().unwrap(), 20.0);
        assert_eq!(call.duration_spec(), "480@120+100");
        assert_eq!(call.args()[11], "60");
    }

    #[test]
    fn test_from_args_arity() {
        assert!(WavtoolArgs::from_args(vec![String::new(); 11]).is_err());
        assert!(WavtoolArgs::from_args(vec![String::new(); 12]).is_ok());
        assert!(WavtoolArgs::from_args(vec![String::new(); 15]).is_ok());
        assert!(WavtoolArgs::from_args(vec![String::new(); 16]).is_err());
    }
}
