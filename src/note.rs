//! Conversion between frequencies and equal-tempered note names.
//!
//! Everything is anchored at A4 = 440 Hz = MIDI note 69, with twelve semitones per
//! octave and C starting each octave (MIDI note 60 is C4).

use std::fmt::{self, Display};
use std::str::FromStr;

use crate::error::PitchError;

pub const A4_FREQUENCY: f64 = 440.0;
pub const A4_MIDI_NOTE: i32 = 69;
pub const SEMITONES: usize = 12;
pub const CENTS_PER_SEMITONE: i32 = 100;

/// The twelve pitch classes, in table order starting at C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NoteName {
    C,
    Cs,
    D,
    Ds,
    E,
    F,
    Fs,
    G,
    Gs,
    A,
    As,
    B,
}

pub const NOTE_NAMES: [NoteName; SEMITONES] = [
    NoteName::C,
    NoteName::Cs,
    NoteName::D,
    NoteName::Ds,
    NoteName::E,
    NoteName::F,
    NoteName::Fs,
    NoteName::G,
    NoteName::Gs,
    NoteName::A,
    NoteName::As,
    NoteName::B,
];

impl NoteName {
    /// Position in [NOTE_NAMES].
    pub fn index(self) -> usize {
        self as usize
    }

    /// The pitch class of any MIDI note number, including negative ones.
    pub fn from_midi(midi_note: i32) -> Self {
        NOTE_NAMES[midi_note.rem_euclid(SEMITONES as i32) as usize]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NoteName::C => "C",
            NoteName::Cs => "C#",
            NoteName::D => "D",
            NoteName::Ds => "D#",
            NoteName::E => "E",
            NoteName::F => "F",
            NoteName::Fs => "F#",
            NoteName::G => "G",
            NoteName::Gs => "G#",
            NoteName::A => "A",
            NoteName::As => "A#",
            NoteName::B => "B",
        }
    }
}

impl Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteName {
    type Err = PitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NOTE_NAMES
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| PitchError::InvalidNote(s.to_string()))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for NoteName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A frequency described as the nearest equal-tempered note.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct NoteInfo {
    pub frequency: f64,
    pub note: NoteName,
    pub octave: i32,
    /// Note name followed by octave, e.g. `C#4`.
    pub full_note: String,
    /// Deviation from `note` in cents, in `(-50, 50]`. A deviation that rounds to
    /// exactly half a semitone stays with the lower note as `+50`.
    pub cents: i32,
    pub midi_note: i32,
}

impl NoteInfo {
    fn new(frequency: f64, midi_note: i32, cents: i32) -> Self {
        let note = NoteName::from_midi(midi_note);
        let octave = midi_note.div_euclid(SEMITONES as i32) - 1;
        NoteInfo {
            frequency,
            note,
            octave,
            full_note: format!("{note}{octave}"),
            cents,
            midi_note,
        }
    }
}

/// Fractional MIDI note number of `frequency`.
pub fn frequency_to_midi(frequency: f64) -> f64 {
    SEMITONES as f64 * (frequency / A4_FREQUENCY).log2() + A4_MIDI_NOTE as f64
}

pub fn midi_to_frequency(midi_note: i32) -> f64 {
    A4_FREQUENCY * 2f64.powf((midi_note - A4_MIDI_NOTE) as f64 / SEMITONES as f64)
}

/// Describe `frequency` as its nearest note.
///
/// The distance from C-1 is rounded to whole cents once, then split into a note and
/// a deviation in `(-50, 50]`, so no frequency is ever reported against two notes.
pub fn frequency_to_note(frequency: f64) -> Result<NoteInfo, PitchError> {
    if !(frequency.is_finite() && frequency > 0.0) {
        return Err(PitchError::InvalidFrequency(frequency));
    }
    let total_cents = (frequency_to_midi(frequency) * CENTS_PER_SEMITONE as f64).round() as i32;
    let midi_note = (total_cents + CENTS_PER_SEMITONE / 2 - 1).div_euclid(CENTS_PER_SEMITONE);
    let cents = total_cents - midi_note * CENTS_PER_SEMITONE;
    Ok(NoteInfo::new(frequency, midi_note, cents))
}

/// Frequency of `note_name` (one of `C`, `C#`, ..., `B`) in `octave`.
pub fn note_to_frequency(note_name: &str, octave: i32) -> Result<f64, PitchError> {
    let note: NoteName = note_name.parse()?;
    let midi_note = (octave + 1) * SEMITONES as i32 + note.index() as i32;
    Ok(midi_to_frequency(midi_note))
}

/// Convert every present frequency to a note, skipping the missing ones.
pub fn analyze_frequencies(frequencies: &[Option<f64>]) -> Result<Vec<NoteInfo>, PitchError> {
    frequencies
        .iter()
        .flatten()
        .map(|&frequency| frequency_to_note(frequency))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concert_a() {
        let note = frequency_to_note(440.0).unwrap();
        assert_eq!(note.note, NoteName::A);
        assert_eq!(note.octave, 4);
        assert_eq!(note.full_note, "A4");
        assert_eq!(note.cents, 0);
        assert_eq!(note.midi_note, 69);
        assert_eq!(note_to_frequency("A", 4).unwrap(), 440.0);
    }

    #[test]
    fn middle_c() {
        let note = frequency_to_note(261.63).unwrap();
        assert_eq!(note.full_note, "C4");
        assert_eq!(note.midi_note, 60);
        assert_eq!(note.cents, 0);
    }

    #[test]
    fn cents_round_to_the_nearest_integer() {
        let sharp = frequency_to_note(440.0 * 2f64.powf(0.49 / 12.0)).unwrap();
        assert_eq!((sharp.full_note.as_str(), sharp.cents), ("A4", 49));

        let flat_of_next = frequency_to_note(440.0 * 2f64.powf(0.51 / 12.0)).unwrap();
        assert_eq!((flat_of_next.full_note.as_str(), flat_of_next.cents), ("A#4", -49));

        let slightly_flat = frequency_to_note(440.0 * 2f64.powf(-0.127 / 12.0)).unwrap();
        assert_eq!(slightly_flat.cents, -13);
    }

    #[test]
    fn half_a_semitone_stays_with_the_lower_note() {
        let rounds_to_half = frequency_to_note(440.0 * 2f64.powf(0.503 / 12.0)).unwrap();
        assert_eq!((rounds_to_half.full_note.as_str(), rounds_to_half.cents), ("A4", 50));

        let just_above = frequency_to_note(440.0 * 2f64.powf(0.506 / 12.0)).unwrap();
        assert_eq!((just_above.full_note.as_str(), just_above.cents), ("A#4", -49));

        let below_c = frequency_to_note(midi_to_frequency(-12) * 2f64.powf(-0.5 / 12.0)).unwrap();
        assert_eq!((below_c.full_note.as_str(), below_c.cents), ("B-3", 50));
    }

    #[test]
    fn cents_never_reach_minus_fifty() {
        for step in 0..=2400 {
            let note_number = 57.0 + step as f64 / 100.0 + 0.004;
            let note = frequency_to_note(midi_to_frequency(0) * 2f64.powf(note_number / 12.0))
                .unwrap();
            assert!(note.cents > -50 && note.cents <= 50, "{:?}", note);
        }
    }

    #[test]
    fn negative_midi_notes_use_floored_division() {
        let note = frequency_to_note(4.0).unwrap();
        assert_eq!(note.midi_note, -12);
        assert_eq!(note.full_note, "C-2");
        assert_eq!(note.cents, -38);

        assert_eq!(NoteName::from_midi(-1), NoteName::B);
        assert_eq!(NoteName::from_midi(-13), NoteName::B);
        let b = frequency_to_note(midi_to_frequency(-13)).unwrap();
        assert_eq!(b.full_note, "B-3");
    }

    #[test]
    fn invalid_frequencies() {
        for f in [0.0, -440.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                frequency_to_note(f),
                Err(PitchError::InvalidFrequency(_))
            ));
        }
    }

    #[test]
    fn unknown_note_name() {
        assert_eq!(
            note_to_frequency("H", 4),
            Err(PitchError::InvalidNote("H".to_string()))
        );
        assert!(note_to_frequency("Db", 4).is_err());
        assert!(note_to_frequency("c", 4).is_err());
    }

    #[test]
    fn names_parse_and_display() {
        for name in NOTE_NAMES {
            assert_eq!(name.to_string().parse::<NoteName>().unwrap(), name);
        }
        assert_eq!(NoteName::Fs.to_string(), "F#");
        assert_eq!(NoteName::Fs.index(), 6);
    }

    #[test]
    fn octave_doubles_the_frequency() {
        for name in NOTE_NAMES {
            for octave in -1..8 {
                let low = note_to_frequency(name.as_str(), octave).unwrap();
                let high = note_to_frequency(name.as_str(), octave + 1).unwrap();
                assert!((high - 2.0 * low).abs() < 1e-9 * high);
            }
        }
    }

    #[test]
    fn round_trip_through_frequency() {
        for name in NOTE_NAMES {
            for octave in -1..9 {
                let frequency = note_to_frequency(name.as_str(), octave).unwrap();
                let note = frequency_to_note(frequency).unwrap();
                assert_eq!(note.full_note, format!("{name}{octave}"));
                assert_eq!(note.cents, 0);
            }
        }
    }

    #[test]
    fn missing_frequencies_are_skipped() {
        let notes = analyze_frequencies(&[Some(440.0), None, Some(261.63)]).unwrap();
        let names: Vec<_> = notes.iter().map(|n| n.full_note.as_str()).collect();
        assert_eq!(names, vec!["A4", "C4"]);
        assert!(analyze_frequencies(&[Some(-1.0)]).is_err());
        assert!(analyze_frequencies(&[]).unwrap().is_empty());
    }
}
