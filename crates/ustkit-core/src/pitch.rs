//! Note names, tick timing, and velocity conversions.
//!
//! UST files address pitch by `NoteNum`, where C1 is 24 and B7 is 107.
//! Engines are handed the note *name* instead, so both directions are needed.

/// Sequencer resolution of the project format.
pub const TICKS_PER_BEAT: f64 = 480.0;

const MS_PER_BEAT_AT_1_BPM: f64 = 60_000.0;

/// `NoteNum` of the lowest addressable note, C1.
pub const NOTE_NUM_MIN: i32 = 24;
/// `NoteNum` of the highest addressable note, B7.
pub const NOTE_NUM_MAX: i32 = 107;

/// All addressable note names, C1 through B7, in `NoteNum` order.
pub const NOTE_NAMES: [&str; 84] = [
    "C1", "C#1", "D1", "D#1", "E1", "F1", "F#1", "G1", "G#1", "A1", "A#1", "B1",
    "C2", "C#2", "D2", "D#2", "E2", "F2", "F#2", "G2", "G#2", "A2", "A#2", "B2",
    "C3", "C#3", "D3", "D#3", "E3", "F3", "F#3", "G3", "G#3", "A3", "A#3", "B3",
    "C4", "C#4", "D4", "D#4", "E4", "F4", "F#4", "G4", "G#4", "A4", "A#4", "B4",
    "C5", "C#5", "D5", "D#5", "E5", "F5", "F#5", "G5", "G#5", "A5", "A#5", "B5",
    "C6", "C#6", "D6", "D#6", "E6", "F6", "F#6", "G6", "G#6", "A6", "A#6", "B6",
    "C7", "C#7", "D7", "D#7", "E7", "F7", "F#7", "G7", "G#7", "A7", "A#7", "B7",
];

/// Name of a `NoteNum`, or `None` outside C1..=B7.
pub fn note_name(note_num: i32) -> Option<&'static str> {
    if !(NOTE_NUM_MIN..=NOTE_NUM_MAX).contains(&note_num) {
        return None;
    }
    Some(NOTE_NAMES[(note_num - NOTE_NUM_MIN) as usize])
}

/// `NoteNum` of a note name, or `None` if the name is unknown.
pub fn note_num(name: &str) -> Option<i32> {
    NOTE_NAMES
        .iter()
        .position(|&n| n == name)
        .map(|i| i as i32 + NOTE_NUM_MIN)
}

/// Position of a note name in [`NOTE_NAMES`], for range arithmetic.
pub fn note_rank(name: &str) -> Option<usize> {
    NOTE_NAMES.iter().position(|&n| n == name)
}

#[inline]
pub fn ticks_to_ms(ticks: f64, bpm: f64) -> f64 {
    ticks * (MS_PER_BEAT_AT_1_BPM / TICKS_PER_BEAT) / bpm
}

#[inline]
pub fn ms_to_ticks(ms: f64, bpm: f64) -> f64 {
    ms * bpm / (MS_PER_BEAT_AT_1_BPM / TICKS_PER_BEAT)
}

/// Length multiplier produced by a consonant velocity value.
///
/// Velocity 100 is neutral; 0 doubles the consonant, 200 halves it.
#[inline]
pub fn effective_velocity_factor(velocity: f64) -> f64 {
    2.0 * 0.5_f64.powf(velocity / 100.0)
}

/// Velocity value that produces the given length multiplier.
#[inline]
pub fn velocity_from_factor(factor: f64) -> f64 {
    (factor / 2.0).log(0.5) * 100.0
}
