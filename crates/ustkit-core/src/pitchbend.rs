//! Run-length pitchbend string codec.
//!
//! Resamplers receive per-frame pitch offsets (in 10-cent units) as a compact
//! string: each value is two symbols from a 64-character alphabet, and a value
//! repeated more than twice is collapsed to one group plus `#<count>#`.

use crate::error::{Error, Result};

/// The 64-symbol alphabet used for the two-digit groups.
///
/// A symbol's value is its position in this string.
pub const PITCHBEND_ALPHABET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Smallest encodable value.
pub const PITCHBEND_MIN: i32 = -2048;
/// Largest encodable value.
pub const PITCHBEND_MAX: i32 = 2047;

fn symbol_value(c: char) -> Option<i32> {
    PITCHBEND_ALPHABET.find(c).map(|i| i as i32)
}

/// Decode a pitchbend string into per-frame values.
///
/// Groups are read two characters at a time; a group followed by `#<count>#`
/// contributes its value `count` times total. Values of 2048 and above wrap
/// to the negative range (the encoding is 12-bit two's complement).
///
/// A single trailing character after the last complete group is dropped
/// without error. Editors in the wild emit such strings and the reference
/// engines accept them, so we keep the behavior; see the regression test.
///
/// # Example
/// ```ignore
/// let bends = pitchbend::decode("AAAB#3#")?;
/// assert_eq!(bends, vec![0, 1, 1, 1]);
/// ```
pub fn decode(text: &str) -> Result<Vec<i32>> {
    let chars: Vec<char> = text.chars().collect();
    let mut values = Vec::new();
    let mut i = 0;

    while chars.len() - i >= 2 {
        let hi = symbol_value(chars[i]).ok_or(Error::PitchbendSymbol {
            found: chars[i],
            position: i,
        })?;
        let lo = symbol_value(chars[i + 1]).ok_or(Error::PitchbendSymbol {
            found: chars[i + 1],
            position: i + 1,
        })?;
        let mut value = hi * 64 + lo;
        if value >= 2048 {
            value -= 4096;
        }
        i += 2;

        if i < chars.len() && chars[i] == '#' {
            // consume `#<digits>#`, the count is the total occurrences
            let digits_start = i + 1;
            let mut j = digits_start;
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            if j == digits_start || j >= chars.len() || chars[j] != '#' {
                return Err(Error::PitchbendRepeat { position: i });
            }
            let count: usize = chars[digits_start..j]
                .iter()
                .collect::<String>()
                .parse()
                .map_err(|_| Error::PitchbendRepeat { position: i })?;
            values.extend(std::iter::repeat(value).take(count));
            i = j + 1;
        } else {
            values.push(value);
        }
    }

    Ok(values)
}

/// Encode per-frame values into a pitchbend string.
///
/// Consecutive equal values are coalesced. A run of exactly two emits the
/// group twice rather than `#2#`, which is one character shorter. The output
/// is canonical: `encode(&decode(s)?)` is a fixed point even when `s` itself
/// used a different mix of literal and counted runs.
pub fn encode(values: &[i32]) -> Result<String> {
    let alphabet = PITCHBEND_ALPHABET.as_bytes();
    let mut out = String::new();
    let mut i = 0;

    while i < values.len() {
        let value = values[i];
        if !(PITCHBEND_MIN..=PITCHBEND_MAX).contains(&value) {
            return Err(Error::PitchbendRange { value, index: i });
        }
        let mut run = 1;
        while i + run < values.len() && values[i + run] == value {
            run += 1;
        }

        let raw = if value < 0 { value + 4096 } else { value } as usize;
        let hi = alphabet[raw / 64] as char;
        let lo = alphabet[raw % 64] as char;
        out.push(hi);
        out.push(lo);
        match run {
            1 => {}
            2 => {
                out.push(hi);
                out.push(lo);
            }
            n => {
                out.push('#');
                out.push_str(&n.to_string());
                out.push('#');
            }
        }

        i += run;
    }

    Ok(out)
}
