// Pitch fundamentals: pitch classes, octave-qualified pitches, and
// pitch-class sets.
//
// Everything downstream of MIDI decoding works in one of two views of pitch:
// - Pitch: a concrete note (pitch class + octave), convertible to/from MIDI
//   note numbers (C4 = 60).
// - PitchClass: pitch with the octave discarded, for harmonic analysis.
//   All pitch-class arithmetic is modulo 12.
//
// PitchClassSet is a 12-bit membership set over the pitch classes. Measure
// analysis and chord-fit scoring are purely presence-based, so a bitmask is
// the whole story: no counts, no ordering beyond ascending iteration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the 12 octave-independent pitch classes. Spelled with sharps;
/// flat input names map to the enharmonic sharp class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PitchClass {
    C = 0,
    Cs = 1,
    D = 2,
    Ds = 3,
    E = 4,
    F = 5,
    Fs = 6,
    G = 7,
    Gs = 8,
    A = 9,
    As = 10,
    B = 11,
}

impl PitchClass {
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::Cs,
        PitchClass::D,
        PitchClass::Ds,
        PitchClass::E,
        PitchClass::F,
        PitchClass::Fs,
        PitchClass::G,
        PitchClass::Gs,
        PitchClass::A,
        PitchClass::As,
        PitchClass::B,
    ];

    /// Semitone offset from C (0-11).
    pub fn semitone(self) -> u8 {
        self as u8
    }

    /// Pitch class for an arbitrary semitone count (wraps modulo 12).
    pub fn from_semitone(semitone: u8) -> Self {
        Self::ALL[(semitone % 12) as usize]
    }

    /// Transpose upward by an interval in semitones, wrapping modulo 12.
    pub fn transpose(self, semitones: u8) -> Self {
        Self::from_semitone(self.semitone().wrapping_add(semitones % 12))
    }

    /// Display name, sharp-spelled.
    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::Cs => "C#",
            PitchClass::D => "D",
            PitchClass::Ds => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::Fs => "F#",
            PitchClass::G => "G",
            PitchClass::Gs => "G#",
            PitchClass::A => "A",
            PitchClass::As => "A#",
            PitchClass::B => "B",
        }
    }

    /// Parse a note name: a letter A-G plus optional `#`/`s` (sharp) or
    /// `b` (flat). Case-insensitive. Flats resolve to the enharmonic sharp
    /// class (`Bb` parses as A#).
    pub fn parse(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        let letter = chars.next()?.to_ascii_uppercase();
        let natural: u8 = match letter {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return None,
        };
        let accidental: i8 = match chars.next() {
            None => 0,
            Some('#') | Some('s') | Some('S') => 1,
            Some('b') => -1,
            Some(_) => return None,
        };
        if chars.next().is_some() {
            return None;
        }
        Some(Self::from_semitone(
            (natural as i8 + accidental).rem_euclid(12) as u8,
        ))
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A concrete pitch: pitch class plus octave, where C4 is middle C (MIDI 60).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pitch {
    pub class: PitchClass,
    pub octave: i8,
}

impl Pitch {
    pub fn new(class: PitchClass, octave: i8) -> Self {
        Pitch { class, octave }
    }

    /// Decode a MIDI note number (0-127). MIDI 60 = C4.
    pub fn from_midi(note: u8) -> Self {
        Pitch {
            class: PitchClass::from_semitone(note % 12),
            octave: (note / 12) as i8 - 1,
        }
    }

    /// MIDI note number, clamped into 0-127.
    pub fn to_midi(self) -> u8 {
        let n = (self.octave as i16 + 1) * 12 + self.class.semitone() as i16;
        n.clamp(0, 127) as u8
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.class, self.octave)
    }
}

/// A set of pitch classes as a 12-bit mask. Iteration is always in
/// ascending semitone order, so anything derived from a set is
/// deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PitchClassSet(u16);

impl PitchClassSet {
    pub const EMPTY: PitchClassSet = PitchClassSet(0);

    pub fn insert(&mut self, pc: PitchClass) {
        self.0 |= 1 << pc.semitone();
    }

    pub fn contains(self, pc: PitchClass) -> bool {
        self.0 & (1 << pc.semitone()) != 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Members in ascending semitone order.
    pub fn iter(self) -> impl Iterator<Item = PitchClass> {
        PitchClass::ALL.into_iter().filter(move |pc| self.contains(*pc))
    }
}

impl FromIterator<PitchClass> for PitchClassSet {
    fn from_iter<T: IntoIterator<Item = PitchClass>>(iter: T) -> Self {
        let mut set = PitchClassSet::EMPTY;
        for pc in iter {
            set.insert(pc);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transpose_wraps() {
        assert_eq!(PitchClass::A.transpose(3), PitchClass::C);
        assert_eq!(PitchClass::B.transpose(1), PitchClass::C);
        assert_eq!(PitchClass::C.transpose(12), PitchClass::C);
        assert_eq!(PitchClass::G.transpose(7), PitchClass::D);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(PitchClass::parse("C"), Some(PitchClass::C));
        assert_eq!(PitchClass::parse("f#"), Some(PitchClass::Fs));
        assert_eq!(PitchClass::parse("Bb"), Some(PitchClass::As));
        assert_eq!(PitchClass::parse("Cb"), Some(PitchClass::B));
        assert_eq!(PitchClass::parse("H"), None);
        assert_eq!(PitchClass::parse("C##"), None);
        assert_eq!(PitchClass::parse(""), None);
    }

    #[test]
    fn test_midi_round_trip() {
        // Middle C
        let c4 = Pitch::from_midi(60);
        assert_eq!(c4, Pitch::new(PitchClass::C, 4));
        assert_eq!(c4.to_midi(), 60);

        // A4 = 440 Hz = MIDI 69
        let a4 = Pitch::from_midi(69);
        assert_eq!(a4, Pitch::new(PitchClass::A, 4));
        assert_eq!(a4.to_midi(), 69);

        for note in 0u8..=127 {
            assert_eq!(Pitch::from_midi(note).to_midi(), note);
        }
    }

    #[test]
    fn test_pitch_class_set() {
        let set: PitchClassSet = [PitchClass::G, PitchClass::C, PitchClass::E]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 3);
        assert!(set.contains(PitchClass::C));
        assert!(!set.contains(PitchClass::D));

        // Ascending iteration regardless of insertion order
        let members: Vec<PitchClass> = set.iter().collect();
        assert_eq!(members, vec![PitchClass::C, PitchClass::E, PitchClass::G]);

        assert!(PitchClassSet::EMPTY.is_empty());
        assert_eq!(PitchClassSet::EMPTY.len(), 0);
    }
}
