// Key model: a tonic pitch class plus a major/minor mode.
//
// A Key answers one question for the rest of the system: which seven pitch
// classes are diatonic, in scale-degree order (degree 1 = tonic). Chord
// candidates (chord.rs) stack thirds over this scale; the Krumhansl
// estimator (analysis.rs) picks the Key for a melody.
//
// Keys are plain immutable values. Construction from the enums cannot fail;
// parsing a user-supplied name can, with Error::InvalidKey.

use crate::error::Error;
use crate::pitch::PitchClass;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scale mode. Minor is the natural minor (aeolian) scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyMode {
    Major,
    Minor,
}

impl KeyMode {
    pub const ALL: [KeyMode; 2] = [KeyMode::Major, KeyMode::Minor];

    /// Semitone intervals from the tonic to each of the 7 scale degrees.
    pub fn intervals(self) -> [u8; 7] {
        match self {
            KeyMode::Major => [0, 2, 4, 5, 7, 9, 11],
            KeyMode::Minor => [0, 2, 3, 5, 7, 8, 10],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            KeyMode::Major => "major",
            KeyMode::Minor => "minor",
        }
    }
}

/// A key: tonic pitch class + mode. Computed once per run and threaded
/// explicitly through every harmonization call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    pub tonic: PitchClass,
    pub mode: KeyMode,
}

impl Key {
    pub fn new(tonic: PitchClass, mode: KeyMode) -> Self {
        Key { tonic, mode }
    }

    /// The fallback key used when estimation fails.
    pub fn c_major() -> Self {
        Key::new(PitchClass::C, KeyMode::Major)
    }

    /// The 7 diatonic pitch classes in ascending degree order
    /// (index 0 = degree 1 = tonic).
    pub fn scale(self) -> [PitchClass; 7] {
        self.mode.intervals().map(|iv| self.tonic.transpose(iv))
    }

    /// Whether a pitch class is diatonic to this key.
    pub fn contains(self, pc: PitchClass) -> bool {
        self.scale().contains(&pc)
    }

    /// Parse a key name like `"C major"`, `"f# minor"`, or `"Bb"` (bare
    /// tonic defaults to major). Rejects unknown tonics and modes.
    pub fn parse(name: &str) -> Result<Self, Error> {
        let mut words = name.split_whitespace();
        let invalid = || Error::InvalidKey(name.to_string());

        let tonic_word = words.next().ok_or_else(invalid)?;
        let tonic = PitchClass::parse(tonic_word).ok_or_else(invalid)?;

        let mode = match words.next() {
            None => KeyMode::Major,
            Some(word) => match word.to_ascii_lowercase().as_str() {
                "major" | "maj" => KeyMode::Major,
                "minor" | "min" => KeyMode::Minor,
                _ => return Err(invalid()),
            },
        };
        if words.next().is_some() {
            return Err(invalid());
        }
        Ok(Key::new(tonic, mode))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tonic, self.mode.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PitchClass::*;

    #[test]
    fn test_c_major_scale() {
        let key = Key::c_major();
        assert_eq!(key.scale(), [C, D, E, F, G, A, B]);
    }

    #[test]
    fn test_a_minor_scale() {
        let key = Key::new(A, KeyMode::Minor);
        assert_eq!(key.scale(), [A, B, C, D, E, F, G]);
    }

    #[test]
    fn test_f_sharp_major_scale_wraps() {
        let key = Key::new(Fs, KeyMode::Major);
        // F# G# A# B C# D# F (E# spelled enharmonically)
        assert_eq!(key.scale(), [Fs, Gs, As, B, Cs, Ds, F]);
    }

    #[test]
    fn test_contains() {
        let key = Key::c_major();
        assert!(key.contains(G));
        assert!(!key.contains(Fs));
    }

    #[test]
    fn test_parse() {
        assert_eq!(Key::parse("C major").unwrap(), Key::c_major());
        assert_eq!(
            Key::parse("f# minor").unwrap(),
            Key::new(Fs, KeyMode::Minor)
        );
        assert_eq!(Key::parse("Bb").unwrap(), Key::new(As, KeyMode::Major));
        assert_eq!(Key::parse("a min").unwrap(), Key::new(A, KeyMode::Minor));

        assert!(matches!(Key::parse(""), Err(Error::InvalidKey(_))));
        assert!(matches!(Key::parse("H major"), Err(Error::InvalidKey(_))));
        assert!(matches!(Key::parse("C dorian"), Err(Error::InvalidKey(_))));
        assert!(matches!(Key::parse("C major 7"), Err(Error::InvalidKey(_))));
    }

    #[test]
    fn test_display() {
        assert_eq!(Key::c_major().to_string(), "C major");
        assert_eq!(Key::new(Fs, KeyMode::Minor).to_string(), "F# minor");
    }
}
