//! Note volume envelope.
//!
//! An envelope is a comma-separated tuple in the order
//! `p1,p2,p3,v1,v2,v3,v4[,%][,p4[,p5[,v5]]]`: seven required numbers, a
//! cosmetic percent marker, and up to three trailing optionals that may each
//! be independently blank. Blank trailing fields mean *absent*, which is
//! distinct from present-and-zero; absent fields fall back to engine
//! defaults at serialization time.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Two volume values closer than this are considered equal.
pub const ENVELOPE_EPSILON: f64 = 0.1;

/// Engine default for an elided `p4`.
pub const DEFAULT_P4: f64 = 0.0;
/// Engine default for an elided `p5`.
pub const DEFAULT_P5: f64 = 10.0;
/// Engine default for an elided `v5`.
pub const DEFAULT_V5: f64 = 100.0;

/// A note's volume envelope.
///
/// Times (`p*`) are in milliseconds, volumes (`v*`) in percent. The percent
/// marker has no computed effect; it is carried so files round-trip.
///
/// # Example
/// ```ignore
/// let e = Envelope::parse("0,5,35,0,100,100,0,%,0,10,100")?;
/// assert!(e.has_v5());
/// assert_eq!(e.p5(), Some(10.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub p1: f64,
    pub p2: f64,
    pub p3: f64,
    pub v1: f64,
    pub v2: f64,
    pub v3: f64,
    pub v4: f64,
    percent_mark: bool,
    p4: Option<f64>,
    p5: Option<f64>,
    v5: Option<f64>,
}

impl Envelope {
    /// Parse the envelope tuple. Fewer than seven fields is an error; every
    /// optional is read only if enough fields are present, and a blank
    /// optional stays absent.
    pub fn parse(text: &str) -> Result<Self> {
        let parts: Vec<&str> = text.split(',').map(str::trim).collect();
        if parts.len() < 7 {
            return Err(Error::EnvelopeFormat(format!(
                "envelope has {} fields, requires 7 or more",
                parts.len()
            )));
        }
        let number = |raw: &str| -> Result<f64> {
            raw.parse()
                .map_err(|_| Error::EnvelopeFormat(format!("envelope field {raw:?} is not a number")))
        };

        let mut envelope = Self {
            p1: number(parts[0])?,
            p2: number(parts[1])?,
            p3: number(parts[2])?,
            v1: number(parts[3])?,
            v2: number(parts[4])?,
            v3: number(parts[5])?,
            v4: number(parts[6])?,
            percent_mark: false,
            p4: None,
            p5: None,
            v5: None,
        };

        if parts.len() >= 8 {
            envelope.percent_mark = parts[7] == "%";
        }
        if parts.len() >= 9 && !parts[8].is_empty() {
            envelope.p4 = Some(number(parts[8])?);
        }
        if parts.len() >= 10 && !parts[9].is_empty() {
            envelope.p5 = Some(number(parts[9])?);
        }
        if parts.len() >= 11 && !parts[10].is_empty() {
            envelope.v5 = Some(number(parts[10])?);
        }

        Ok(envelope)
    }

    pub fn has_percent_mark(&self) -> bool {
        self.percent_mark
    }

    pub fn set_percent_mark(&mut self, present: bool) {
        self.percent_mark = present;
    }

    pub fn p4(&self) -> Option<f64> {
        self.p4
    }

    pub fn has_p4(&self) -> bool {
        self.p4.is_some()
    }

    pub fn set_p4(&mut self, p4: f64) {
        self.p4 = Some(p4);
    }

    pub fn p5(&self) -> Option<f64> {
        self.p5
    }

    pub fn has_p5(&self) -> bool {
        self.p5.is_some()
    }

    pub fn set_p5(&mut self, p5: f64) {
        self.p5 = Some(p5);
    }

    pub fn v5(&self) -> Option<f64> {
        self.v5
    }

    pub fn has_v5(&self) -> bool {
        self.v5.is_some()
    }

    pub fn set_v5(&mut self, v5: f64) {
        self.v5 = Some(v5);
    }

    /// Drop the fifth point entirely. `v5` cannot outlive `p5`, so both go.
    pub fn remove_p5(&mut self) {
        self.p5 = None;
        self.v5 = None;
    }

    /// Zero out `p` values whose surrounding volumes already match, which
    /// untangles envelopes that overrun short notes.
    pub fn zero_p_values(&mut self) {
        if self.p5.is_some() {
            if self.v5.is_none() {
                self.remove_p5();
            }
            if let Some(v5) = self.v5 {
                if (v5 - self.v2).abs() < ENVELOPE_EPSILON {
                    self.p5 = Some(0.0);
                }
            }
        }
        if (self.v2 - self.v1).abs() < ENVELOPE_EPSILON {
            self.p2 = 0.0;
        }
        if (self.v3 - self.v4).abs() < ENVELOPE_EPSILON {
            self.p3 = 0.0;
        }
    }

    /// Whether the envelope's fixed spans fit inside a note of `length_ms`.
    pub fn is_valid_for(&self, length_ms: f64) -> bool {
        length_ms > self.p1 + self.p2 + self.p3 + self.p4.unwrap_or(0.0) + self.p5.unwrap_or(0.0)
    }
}

impl Default for Envelope {
    /// The editor's stock envelope, `0,5,35,0,100,100,0,%`.
    fn default() -> Self {
        Self {
            p1: 0.0,
            p2: 5.0,
            p3: 35.0,
            v1: 0.0,
            v2: 100.0,
            v3: 100.0,
            v4: 0.0,
            percent_mark: true,
            p4: None,
            p5: None,
            v5: None,
        }
    }
}

impl fmt::Display for Envelope {
    /// Re-emit the tuple. The marker slot is always written (empty when the
    /// marker was absent), and trailing optionals are written down to the
    /// deepest present one, substituting engine defaults for elided fields
    /// in between. Functionally equivalent to the input, not byte-equal.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{},{},{}",
            self.p1,
            self.p2,
            self.p3,
            self.v1,
            self.v2,
            self.v3,
            self.v4,
            if self.percent_mark { "%" } else { "" }
        )?;
        if self.v5.is_some() {
            write!(
                f,
                ",{},{},{}",
                self.p4.unwrap_or(DEFAULT_P4),
                self.p5.unwrap_or(DEFAULT_P5),
                self.v5.unwrap_or(DEFAULT_V5)
            )?;
        } else if let Some(p5) = self.p5 {
            write!(f, ",{},{}", self.p4.unwrap_or(DEFAULT_P4), p5)?;
        } else if let Some(p4) = self.p4 {
            write!(f, ",{p4}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_full() {
        let e = Envelope::parse("0,5,35,0,100,100,0,%,0,10,100").unwrap();
        assert_relative_eq!(e.p1, 0.0);
        assert_relative_eq!(e.p2, 5.0);
        assert_relative_eq!(e.p3, 35.0);
        assert_relative_eq!(e.v1, 0.0);
        assert_relative_eq!(e.v2, 100.0);
        assert_relative_eq!(e.v3, 100.0);
        assert_relative_eq!(e.v4, 0.0);
        assert!(e.has_percent_mark());
        assert_eq!(e.p4(), Some(0.0));
        assert_eq!(e.p5(), Some(10.0));
        assert_eq!(e.v5(), Some(100.0));
    }

    #[test]
    fn test_parse_optionals_cascade() {
        let e = Envelope::parse("0,5,35,0,100,100,0").unwrap();
        assert!(!e.has_percent_mark());
        assert!(!e.has_p4() && !e.has_p5() && !e.has_v5());

        // trailing comma: marker slot present but empty
        let e = Envelope::parse("0,5,35,0,100,100,0,").unwrap();
        assert!(!e.has_percent_mark());
        assert!(!e.has_p5() && !e.has_v5());

        // blank marker slot, p4 and p5 present, no v5
        let e = Envelope::parse("0,5,35,0,100,100,0,,0,10").unwrap();
        assert!(!e.has_percent_mark());
        assert!(e.has_p4());
        assert!(e.has_p5());
        assert!(!e.has_v5());

        // p4 present alone
        let e = Envelope::parse("0,5,35,0,100,100,0,%,0").unwrap();
        assert!(e.has_p4());
        assert!(!e.has_p5() && !e.has_v5());

        // blank p4 with later fields present: p4 stays absent
        let e = Envelope::parse("0,5,35,0,100,100,0,%,,10,100").unwrap();
        assert!(!e.has_p4());
        assert_eq!(e.p5(), Some(10.0));
        assert_eq!(e.v5(), Some(100.0));
    }

    #[test]
    fn test_parse_rejects_short_or_junk() {
        assert!(matches!(
            Envelope::parse("0,5,35,0,100,100"),
            Err(Error::EnvelopeFormat(_))
        ));
        assert!(Envelope::parse("").is_err());
        assert!(Envelope::parse("0,5,35,x,100,100,0").is_err());
    }

    #[test]
    fn test_remove_p5_clears_v5() {
        let mut e = Envelope::parse("0,5,35,0,100,100,0,%,0,10,100").unwrap();
        e.remove_p5();
        assert!(!e.has_p5());
        assert!(!e.has_v5());
        assert!(e.has_p4());
    }

    #[test]
    fn test_display_depth() {
        let e = Envelope::parse("0,5,35,0,100,100,0,%,0,10,100").unwrap();
        assert_eq!(e.to_string(), "0,5,35,0,100,100,0,%,0,10,100");

        // no optionals, no marker: the marker slot is still emitted
        let e = Envelope::parse("0,5,35,0,100,100,0").unwrap();
        assert_eq!(e.to_string(), "0,5,35,0,100,100,0,");

        // v5 present forces p4/p5 out with engine defaults
        let mut e = Envelope::parse("0,5,35,0,100,100,0,%").unwrap();
        e.set_v5(80.0);
        assert_eq!(e.to_string(), "0,5,35,0,100,100,0,%,0,10,80");

        // p5 present without v5
        let e = Envelope::parse("0,5,35,0,100,100,0,,0,10").unwrap();
        assert_eq!(e.to_string(), "0,5,35,0,100,100,0,,0,10");
    }

    #[test]
    fn test_display_reparses_equal() {
        for text in [
            "0,5,35,0,100,100,0,%,0,10,100",
            "1.5,5,35,0,100,100,0,",
            "0,5,35,0,100,100,0,%,12",
        ] {
            let e = Envelope::parse(text).unwrap();
            let again = Envelope::parse(&e.to_string()).unwrap();
            assert_eq!(e, again);
        }
    }

    #[test]
    fn test_zero_p_values() {
        // v5 ~ v2: p5 collapses to zero
        let mut e = Envelope::parse("0,5,35,0,100,100,0,%,0,10,100").unwrap();
        e.zero_p_values();
        assert_eq!(e.p5(), Some(0.0));

        // p5 without v5 is dropped outright
        let mut e = Envelope::parse("0,5,35,0,100,100,0,,0,10").unwrap();
        e.zero_p_values();
        assert!(!e.has_p5());

        // v1 ~ v2 zeroes p2, v3 ~ v4 zeroes p3
        let mut e = Envelope::parse("0,5,35,100,100,0.05,0,%").unwrap();
        e.zero_p_values();
        assert_relative_eq!(e.p2, 0.0);
        assert_relative_eq!(e.p3, 0.0);
    }

    #[test]
    fn test_is_valid_for() {
        let e = Envelope::parse("10,20,30,0,100,100,0,%,5,5").unwrap();
        assert!(e.is_valid_for(71.0));
        assert!(!e.is_valid_for(70.0));
        assert!(!e.is_valid_for(10.0));
    }

    #[test]
    fn test_default_is_stock() {
        let e = Envelope::default();
        assert_eq!(e.to_string(), "0,5,35,0,100,100,0,%");
        assert_eq!(e, Envelope::parse("0,5,35,0,100,100,0,%").unwrap());
    }
}
