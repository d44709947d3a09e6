//! Portamento model: the pitch glide into and through a note.
//!
//! A note's glide is stored as four parallel text fields. `PBW` holds segment
//! widths in milliseconds; `PBS` holds the start offset and (optionally) the
//! starting pitch; `PBY` holds the pitch at each interior segment boundary in
//! 10-cent units; `PBM` names each segment's curve. The arrays elide their
//! defaults aggressively: empty elements mean zero, `PBY` is one short
//! because the glide must end on pitch, and `PBM` may be short or missing
//! entirely. Parsing reconstructs the full per-segment records.

pub mod curve;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use curve::{CurveRegistry, CURVE_S};

/// One reconstructed glide segment.
///
/// `magnitude` is the pitch at the segment's *end*, in 10-cent units
/// relative to this note. The final segment's magnitude is always 0: the
/// glide lands on the note's own pitch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortamentoSegment {
    pub width_ms: f64,
    pub magnitude: f64,
    pub curve: String,
}

impl PortamentoSegment {
    pub fn new(width_ms: f64, magnitude: f64, curve: impl Into<String>) -> Self {
        Self {
            width_ms,
            magnitude,
            curve: curve.into(),
        }
    }
}

impl Default for PortamentoSegment {
    fn default() -> Self {
        Self::new(0.0, 0.0, CURVE_S)
    }
}

/// A note's portamento: an offset, a starting pitch, and ordered segments.
///
/// The starting pitch (`PBS`'s second number) is the previous note's pitch
/// relative to this one, in 10-cent units. Editors usually omit it; the
/// project-level parser resolves it from the previous note's `NoteNum` and
/// calls [`set_start_magnitude`](Self::set_start_magnitude). Until then the
/// first segment cannot be sampled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portamento {
    offset_ms: f64,
    start_magnitude: Option<f64>,
    segments: Vec<PortamentoSegment>,
}

fn parse_number(field: &str, text: &str) -> Result<f64> {
    text.trim()
        .parse()
        .map_err(|_| Error::PortamentoFormat(format!("{field} value {text:?} is not a number")))
}

/// Comma-split with empty-element-means-zero. Note this differs from `PBS`,
/// where an empty second number means *absent*.
fn split_numbers(field: &str, text: &str) -> Result<Vec<f64>> {
    text.split(',')
        .map(|part| {
            if part.trim().is_empty() {
                Ok(0.0)
            } else {
                parse_number(field, part)
            }
        })
        .collect()
}

fn parse_start_pair(pbs: &str) -> Result<(f64, Option<f64>)> {
    let pbs = pbs.trim();
    if pbs.is_empty() {
        return Ok((0.0, None));
    }
    let (offset, magnitude) = if let Some((a, b)) = pbs.split_once(';') {
        (a, Some(b))
    } else if let Some((a, b)) = pbs.split_once(',') {
        (a, Some(b))
    } else {
        (pbs, None)
    };
    let offset = if offset.trim().is_empty() {
        0.0
    } else {
        parse_number("PBS", offset)?
    };
    let magnitude = match magnitude {
        Some(m) if !m.trim().is_empty() => Some(parse_number("PBS", m)?),
        _ => None,
    };
    Ok((offset, magnitude))
}

impl Portamento {
    /// Reconstruct a portamento from the four raw fields.
    ///
    /// Only `PBW` is structurally required; the other three may be empty.
    /// `PBY` is padded with zeros to one-less-than the segment count and the
    /// final segment's magnitude is pinned to 0 no matter what the input
    /// said; `PBM` is padded with the default curve id.
    pub fn parse(pbw: &str, pbs: &str, pby: &str, pbm: &str) -> Result<Self> {
        let (offset_ms, start_magnitude) = parse_start_pair(pbs)?;
        let widths = split_numbers("PBW", pbw)?;
        let mut magnitudes = split_numbers("PBY", pby)?;
        let n = widths.len();

        while magnitudes.len() + 1 < n {
            magnitudes.push(0.0);
        }
        let mut curves: Vec<String> = pbm.split(',').map(str::to_string).collect();
        while curves.len() < n {
            curves.push(CURVE_S.to_string());
        }

        let mut segments = Vec::with_capacity(n);
        for i in 0..n - 1 {
            segments.push(PortamentoSegment::new(
                widths[i],
                magnitudes[i],
                curves[i].clone(),
            ));
        }
        segments.push(PortamentoSegment::new(
            widths[n - 1],
            0.0,
            curves[n - 1].clone(),
        ));

        Ok(Self {
            offset_ms,
            start_magnitude,
            segments,
        })
    }

    /// Milliseconds between the note start and the glide start.
    pub fn offset_ms(&self) -> f64 {
        self.offset_ms
    }

    pub fn set_offset_ms(&mut self, offset_ms: f64) {
        self.offset_ms = offset_ms;
    }

    /// The previous note's pitch relative to this one, if resolved.
    pub fn start_magnitude(&self) -> Option<f64> {
        self.start_magnitude
    }

    pub fn has_start_magnitude(&self) -> bool {
        self.start_magnitude.is_some()
    }

    pub fn set_start_magnitude(&mut self, magnitude: f64) {
        self.start_magnitude = Some(magnitude);
    }

    pub fn segments(&self) -> &[PortamentoSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn width(&self, index: usize) -> f64 {
        self.segments[index].width_ms
    }

    pub fn set_width(&mut self, index: usize, width_ms: f64) {
        self.segments[index].width_ms = width_ms;
    }

    pub fn magnitude(&self, index: usize) -> f64 {
        self.segments[index].magnitude
    }

    pub fn set_magnitude(&mut self, index: usize, magnitude: f64) {
        self.segments[index].magnitude = magnitude;
    }

    pub fn curve(&self, index: usize) -> &str {
        &self.segments[index].curve
    }

    pub fn set_curve(&mut self, index: usize, curve: impl Into<String>) {
        self.segments[index].curve = curve.into();
    }

    /// Pitch change across segment `index`: end pitch minus start pitch.
    fn magnitude_delta(&self, index: usize) -> Result<f64> {
        let last = self.segments.len() - 1;
        if index == 0 {
            let start = self.start_magnitude.ok_or_else(|| {
                Error::PortamentoState(
                    "start magnitude unresolved; set it from PBS or the previous note".to_string(),
                )
            })?;
            return Ok(self.segments[0].magnitude - start);
        }
        if index < last {
            return Ok(self.segments[index].magnitude - self.segments[index - 1].magnitude);
        }
        // the glide ends on pitch, so the last delta runs down to zero
        Ok(0.0 - self.segments[last - 1].magnitude)
    }

    /// Pitch offset in 10-cent units at `time_ms` past the glide start.
    ///
    /// Returns 0 before the glide and past its end. Sampling inside the
    /// first segment needs the start magnitude resolved.
    pub fn sample_at(&self, time_ms: f64, curves: &CurveRegistry) -> Result<f64> {
        if time_ms < 0.0 || self.segments.is_empty() {
            return Ok(0.0);
        }
        let mut index = 0;
        let mut rel = time_ms;
        while rel > self.segments[index].width_ms {
            rel -= self.segments[index].width_ms;
            index += 1;
            if index >= self.segments.len() {
                return Ok(0.0);
            }
        }
        let delta = self.magnitude_delta(index)?;
        curves.sample(&self.segments[index].curve, rel, self.segments[index].width_ms, delta)
    }

    /// [`sample_at`](Self::sample_at) against the process-wide curve registry.
    pub fn sample_at_time(&self, time_ms: f64) -> Result<f64> {
        self.sample_at(time_ms, CurveRegistry::global())
    }

    pub fn pbs_text(&self) -> String {
        match self.start_magnitude {
            Some(m) => format!("{};{}", self.offset_ms, m),
            None => format!("{};", self.offset_ms),
        }
    }

    pub fn pbw_text(&self) -> String {
        join_eliding_zeros(self.segments.iter().map(|s| s.width_ms))
    }

    /// Interior magnitudes only; the pinned final zero is never written.
    pub fn pby_text(&self) -> String {
        let interior = self.segments.len().saturating_sub(1);
        join_eliding_zeros(self.segments[..interior].iter().map(|s| s.magnitude))
    }

    pub fn pbm_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.curve.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// The four fields as `KEY=value` lines, ready to embed in a note body.
    ///
    /// Output is normalized, not verbatim: zeros collapse back to empty
    /// elements and `PBS` always carries its separator.
    pub fn to_string_list(&self) -> Vec<String> {
        vec![
            format!("PBS={}", self.pbs_text()),
            format!("PBW={}", self.pbw_text()),
            format!("PBY={}", self.pby_text()),
            format!("PBM={}", self.pbm_text()),
        ]
    }
}

fn join_eliding_zeros(values: impl Iterator<Item = f64>) -> String {
    values
        .map(|v| if v == 0.0 { String::new() } else { v.to_string() })
        .collect::<Vec<_>>()
        .join(",")
}

impl fmt::Display for Portamento {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.to_string_list() {
            write!(f, "{line}\r\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_fills_defaults() {
        let p = Portamento::parse("80,100,120", "-40;-20", "15,", "").unwrap();
        assert_eq!(p.len(), 3);
        assert_relative_eq!(p.offset_ms(), -40.0);
        assert_eq!(p.start_magnitude(), Some(-20.0));
        assert_relative_eq!(p.width(0), 80.0);
        assert_relative_eq!(p.magnitude(0), 15.0);
        // empty PBY element means zero
        assert_relative_eq!(p.magnitude(1), 0.0);
        // PBM was missing entirely: every segment gets the default curve
        assert_eq!(p.curve(0), CURVE_S);
        assert_eq!(p.curve(2), CURVE_S);
    }

    #[test]
    fn test_parse_start_pair_variants() {
        let (off, mag) = parse_start_pair("").unwrap();
        assert_relative_eq!(off, 0.0);
        assert_eq!(mag, None);

        let (off, mag) = parse_start_pair("-25").unwrap();
        assert_relative_eq!(off, -25.0);
        assert_eq!(mag, None);

        let (off, mag) = parse_start_pair("-25;3").unwrap();
        assert_relative_eq!(off, -25.0);
        assert_eq!(mag, Some(3.0));

        let (off, mag) = parse_start_pair("-25,3").unwrap();
        assert_relative_eq!(off, -25.0);
        assert_eq!(mag, Some(3.0));

        // separator present, second number elided: the magnitude is absent,
        // not zero
        let (off, mag) = parse_start_pair("0;").unwrap();
        assert_relative_eq!(off, 0.0);
        assert_eq!(mag, None);
    }

    #[test]
    fn test_parse_rejects_junk() {
        assert!(Portamento::parse("80,x", "0;", "", "").is_err());
        assert!(Portamento::parse("80", "zz;0", "", "").is_err());
        assert!(Portamento::parse("80,90", "0;", "abc", "").is_err());
    }

    #[test]
    fn test_last_magnitude_is_always_zero() {
        // PBY longer than it should be, last value nonzero: still pinned
        let p = Portamento::parse("80,100", "0;0", "15,99,42", "").unwrap();
        assert_relative_eq!(p.magnitude(p.len() - 1), 0.0);

        let p = Portamento::parse("80", "0;0", "7", "").unwrap();
        assert_relative_eq!(p.magnitude(0), 0.0);
    }

    #[test]
    fn test_sample_walks_segments() {
        // one 100ms linear segment from start pitch -30 up to 0
        let p = Portamento::parse("100", "0;-30", "", "s").unwrap();
        assert_relative_eq!(p.sample_at_time(-5.0).unwrap(), 0.0);
        assert_relative_eq!(p.sample_at_time(0.0).unwrap(), 0.0);
        assert_relative_eq!(p.sample_at_time(50.0).unwrap(), 15.0);
        assert_relative_eq!(p.sample_at_time(100.0).unwrap(), 30.0);
        // past the end of the glide
        assert_relative_eq!(p.sample_at_time(100.1).unwrap(), 0.0);
    }

    #[test]
    fn test_sample_middle_and_last_segments() {
        // -20 -> 15 -> 0 across two linear segments
        let p = Portamento::parse("100,50", "0;-20", "15", "s,s").unwrap();
        // first segment delta is 15 - (-20) = 35
        assert_relative_eq!(p.sample_at_time(100.0).unwrap(), 35.0);
        // second segment runs 15 down to 0, sampled halfway: delta -15
        assert_relative_eq!(p.sample_at_time(125.0).unwrap(), -7.5);
    }

    #[test]
    fn test_sample_needs_start_magnitude() {
        let mut p = Portamento::parse("100", "0;", "", "s").unwrap();
        assert!(matches!(
            p.sample_at_time(10.0),
            Err(Error::PortamentoState(_))
        ));
        p.set_start_magnitude(-20.0);
        assert_relative_eq!(p.sample_at_time(50.0).unwrap(), 10.0);
    }

    #[test]
    fn test_sample_unknown_curve() {
        let p = Portamento::parse("100", "0;0", "", "wobble").unwrap();
        assert!(matches!(
            p.sample_at_time(10.0),
            Err(Error::UnknownCurveType(_))
        ));
    }

    #[test]
    fn test_sample_with_custom_registry() {
        let reg = CurveRegistry::default();
        reg.register("half", |_, _, magnitude| magnitude / 2.0).unwrap();
        let p = Portamento::parse("100", "0;-20", "", "half").unwrap();
        assert_relative_eq!(p.sample_at(10.0, &reg).unwrap(), 10.0);
    }

    #[test]
    fn test_magnitude_setter_writes_magnitude() {
        let mut p = Portamento::parse("80,100,120", "0;0", "15,8", "").unwrap();
        p.set_magnitude(1, -4.0);
        assert_relative_eq!(p.magnitude(1), -4.0);
        // widths are untouched by magnitude edits
        assert_relative_eq!(p.width(1), 100.0);
    }

    #[test]
    fn test_serialization_elides_zeros() {
        let p = Portamento::parse("80,,120", "0;", "15,", ",s,").unwrap();
        let lines = p.to_string_list();
        assert_eq!(lines[0], "PBS=0;");
        assert_eq!(lines[1], "PBW=80,,120");
        assert_eq!(lines[2], "PBY=15,");
        assert_eq!(lines[3], "PBM=,s,");
    }

    #[test]
    fn test_serialization_roundtrips() {
        let p = Portamento::parse("80,100,120", "-40;-20", "15,-3", ",r,j").unwrap();
        let q = Portamento::parse(
            &p.pbw_text(),
            &p.pbs_text(),
            &p.pby_text(),
            &p.pbm_text(),
        )
        .unwrap();
        assert_eq!(p, q);
    }
}
