// Diatonic chord candidates.
//
// For a given key there are exactly 14 candidates: the triad and the
// seventh chord on each of the 7 scale degrees, stacked in thirds within
// the 7-degree cycle (so degree wrap-around stays diatonic — no mod-12
// arithmetic here). The generator emits them in a fixed order:
//
//   degree 1 triad, degree 1 seventh, degree 2 triad, ... degree 7 seventh
//
// This order is load-bearing: the chord-fit selector (harmonize.rs) breaks
// score ties by taking the first candidate to reach the maximum, so
// generator order *is* tie-break precedence. Every candidate is well-formed
// by construction; there is no failure path in candidate generation.

use crate::key::Key;
use crate::pitch::{PitchClass, PitchClassSet};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Chord quality: three stacked thirds or four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChordQuality {
    Triad,
    Seventh,
}

impl ChordQuality {
    /// Number of chord members.
    fn member_count(self) -> usize {
        match self {
            ChordQuality::Triad => 3,
            ChordQuality::Seventh => 4,
        }
    }
}

/// One diatonic chord possibility: a scale degree, a quality, and the
/// resulting member pitch classes in stacking order (root first).
/// Members are deduplicated; chord-fit scoring is presence-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordCandidate {
    /// Scale degree of the root, 1-7.
    pub degree: u8,
    pub quality: ChordQuality,
    pub pitch_classes: Vec<PitchClass>,
}

impl ChordCandidate {
    fn build(key: Key, degree: u8, quality: ChordQuality) -> Self {
        let scale = key.scale();
        let root_index = (degree - 1) as usize;
        let mut pitch_classes = Vec::with_capacity(quality.member_count());
        for third in 0..quality.member_count() {
            let pc = scale[(root_index + 2 * third) % 7];
            if !pitch_classes.contains(&pc) {
                pitch_classes.push(pc);
            }
        }
        ChordCandidate {
            degree,
            quality,
            pitch_classes,
        }
    }

    /// Members as a set, for intersection scoring.
    pub fn pitch_class_set(&self) -> PitchClassSet {
        self.pitch_classes.iter().copied().collect()
    }

    /// Interval in semitones from the root to the n-th member.
    fn interval_from_root(&self, n: usize) -> u8 {
        let root = self.pitch_classes[0].semitone();
        (self.pitch_classes[n].semitone() + 12 - root) % 12
    }
}

impl fmt::Display for ChordCandidate {
    /// Roman-numeral style name: case follows the third (IV vs iv), a
    /// diminished fifth gets the ° mark, sevenths get a 7 suffix.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NUMERALS: [&str; 7] = ["I", "II", "III", "IV", "V", "VI", "VII"];
        let numeral = NUMERALS[(self.degree - 1) as usize];
        let minor_third = self.pitch_classes.len() > 1 && self.interval_from_root(1) == 3;
        if minor_third {
            write!(f, "{}", numeral.to_lowercase())?;
        } else {
            write!(f, "{}", numeral)?;
        }
        if self.pitch_classes.len() > 2 && self.interval_from_root(2) == 6 {
            write!(f, "\u{00B0}")?;
        }
        if self.quality == ChordQuality::Seventh {
            write!(f, "7")?;
        }
        Ok(())
    }
}

/// All 14 diatonic candidates for a key, in tie-break precedence order.
pub fn diatonic_candidates(key: Key) -> Vec<ChordCandidate> {
    let mut candidates = Vec::with_capacity(14);
    for degree in 1..=7 {
        candidates.push(ChordCandidate::build(key, degree, ChordQuality::Triad));
        candidates.push(ChordCandidate::build(key, degree, ChordQuality::Seventh));
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyMode;
    use PitchClass::*;

    #[test]
    fn test_candidate_count_and_order() {
        let candidates = diatonic_candidates(Key::c_major());
        assert_eq!(candidates.len(), 14);
        for (i, candidate) in candidates.iter().enumerate() {
            assert_eq!(candidate.degree as usize, i / 2 + 1);
            let expected = if i % 2 == 0 {
                ChordQuality::Triad
            } else {
                ChordQuality::Seventh
            };
            assert_eq!(candidate.quality, expected);
        }
    }

    #[test]
    fn test_c_major_triads() {
        let candidates = diatonic_candidates(Key::c_major());
        // Degree 1 triad: C E G
        assert_eq!(candidates[0].pitch_classes, vec![C, E, G]);
        // Degree 5 triad: G B D (wraps past the top of the scale)
        assert_eq!(candidates[8].pitch_classes, vec![G, B, D]);
        // Degree 7 triad: B D F
        assert_eq!(candidates[12].pitch_classes, vec![B, D, F]);
    }

    #[test]
    fn test_c_major_sevenths() {
        let candidates = diatonic_candidates(Key::c_major());
        // Degree 1 seventh: C E G B
        assert_eq!(candidates[1].pitch_classes, vec![C, E, G, B]);
        // Degree 5 seventh (dominant): G B D F
        assert_eq!(candidates[9].pitch_classes, vec![G, B, D, F]);
    }

    #[test]
    fn test_a_minor_tonic_triad() {
        let candidates = diatonic_candidates(Key::new(A, KeyMode::Minor));
        assert_eq!(candidates[0].pitch_classes, vec![A, C, E]);
    }

    #[test]
    fn test_roman_numeral_display() {
        let candidates = diatonic_candidates(Key::c_major());
        assert_eq!(candidates[0].to_string(), "I");
        assert_eq!(candidates[2].to_string(), "ii");
        assert_eq!(candidates[9].to_string(), "V7");
        assert_eq!(candidates[12].to_string(), "vii\u{00B0}");
    }

    #[test]
    fn test_members_are_deterministic() {
        let a = diatonic_candidates(Key::c_major());
        let b = diatonic_candidates(Key::c_major());
        assert_eq!(a, b);
    }
}
