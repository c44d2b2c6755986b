// Chord-fit selection and accompaniment assembly.
//
// The selector is the heart of the system. For each measure it scans the 14
// diatonic candidates in generator order and scores each one by counting how
// many of its member pitch classes sound in the measure (0-4). The best
// candidate is updated only on strict improvement, so the first candidate to
// reach the maximum wins all ties. If no candidate scores above 0 the
// measure gets a rest — both for genuinely silent measures and for measures
// whose notes are entirely outside every diatonic chord. That fail-closed
// policy is inherited behavior and is kept as-is; "rest" does not imply
// "empty measure".
//
// Assembly turns the per-measure choices into the accompaniment track: one
// event per measure, always exactly measure_length long, chords voiced
// compactly upward from a fixed reference octave. A truncated final melody
// measure still gets a full-length event, so the accompaniment may outlast
// the melody; also inherited, also kept.
//
// Scores are small integers and the scan order is fixed, so for a given key
// and measure content the result is always identical.

use crate::analysis::estimate_key;
use crate::chord::{ChordCandidate, diatonic_candidates};
use crate::error::{Error, Result};
use crate::key::Key;
use crate::melody::{
    DEFAULT_MEASURE_BEATS, Measure, Melody, OutputScore, TimedEvent, segment_measures,
};
use crate::pitch::{Pitch, PitchClassSet};
use serde::{Deserialize, Serialize};

/// Octave at which chord roots are materialized (C3 = MIDI 48), keeping the
/// accompaniment below typical melody range.
pub const REFERENCE_OCTAVE: i8 = 3;

/// The selection for one measure: the winning candidate and its score, or
/// no chord at all (rest) when every candidate scored 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureChoice {
    pub chord: Option<ChordCandidate>,
    pub score: u32,
}

impl MeasureChoice {
    pub fn is_rest(&self) -> bool {
        self.chord.is_none()
    }
}

/// Where the harmonization's key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeySource {
    /// Supplied by the caller (CLI `--key`).
    Supplied,
    /// Estimated from the melody.
    Estimated,
    /// Estimation failed; fell back to C major.
    Fallback,
}

/// A complete harmonization pass over one melody.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Harmonization {
    pub key: Key,
    pub key_source: KeySource,
    /// Measure length in quarter-note beats.
    pub measure_length: f64,
    /// One choice per measure, in measure order.
    pub choices: Vec<MeasureChoice>,
}

/// Score one candidate against a measure's pitch-class set: the number of
/// chord members present in the measure.
fn fit_score(candidate: &ChordCandidate, notes: PitchClassSet) -> u32 {
    candidate
        .pitch_classes
        .iter()
        .filter(|pc| notes.contains(**pc))
        .count() as u32
}

/// Pick the best-fitting candidate for a measure's note-name set.
///
/// Candidates are scanned in slice order with a strict-improvement update,
/// so the earliest candidate reaching the maximum score wins. When every
/// candidate scores 0 the result is a rest.
pub fn select_chord(notes: PitchClassSet, candidates: &[ChordCandidate]) -> MeasureChoice {
    let mut best: Option<&ChordCandidate> = None;
    let mut best_score = 0u32;
    for candidate in candidates {
        let score = fit_score(candidate, notes);
        if score > best_score {
            best_score = score;
            best = Some(candidate);
        }
    }
    MeasureChoice {
        chord: best.cloned(),
        score: best_score,
    }
}

/// Harmonize a melody: resolve the key, segment into measures, and select a
/// chord (or rest) for each.
///
/// `key_override` skips estimation; otherwise the key is estimated from the
/// melody, falling back to C major when estimation yields nothing — that
/// fallback never surfaces as an error. `measure_override` takes precedence
/// over the input's time signature, which takes precedence over common time.
pub fn harmonize(
    melody: &Melody,
    key_override: Option<Key>,
    measure_override: Option<f64>,
) -> Result<Harmonization> {
    if melody.note_count() == 0 {
        return Err(Error::NoNotesFound);
    }

    let (key, key_source) = match key_override {
        Some(key) => (key, KeySource::Supplied),
        None => match estimate_key(melody) {
            Some(key) => (key, KeySource::Estimated),
            None => (Key::c_major(), KeySource::Fallback),
        },
    };

    let measure_length = measure_override
        .or_else(|| melody.timing.measure_beats())
        .unwrap_or(DEFAULT_MEASURE_BEATS);

    let candidates = diatonic_candidates(key);
    let choices = segment_measures(melody, measure_length)
        .iter()
        .map(|measure: &Measure| select_chord(measure.pitch_classes, &candidates))
        .collect();

    Ok(Harmonization {
        key,
        key_source,
        measure_length,
        choices,
    })
}

/// Voice a candidate compactly upward from the reference octave: root at
/// REFERENCE_OCTAVE, each later member at the nearest pitch strictly above
/// the previous one.
fn voice_at_reference(chord: &ChordCandidate) -> Vec<Pitch> {
    let root = Pitch::new(chord.pitch_classes[0], REFERENCE_OCTAVE);
    let mut midi = root.to_midi();
    let mut pitches = vec![root];
    for &pc in &chord.pitch_classes[1..] {
        let step = (pc.semitone() + 12 - midi % 12) % 12;
        midi += if step == 0 { 12 } else { step };
        pitches.push(Pitch::from_midi(midi));
    }
    pitches
}

/// Build the accompaniment track: one contiguous event per measure, each
/// exactly `measure_length` beats long regardless of the measure's actual
/// melodic content.
pub fn assemble_accompaniment(
    choices: &[MeasureChoice],
    measure_length: f64,
) -> Vec<TimedEvent> {
    choices
        .iter()
        .enumerate()
        .map(|(index, choice)| {
            let start = index as f64 * measure_length;
            match &choice.chord {
                Some(chord) => TimedEvent {
                    start,
                    duration: measure_length,
                    pitches: voice_at_reference(chord),
                },
                None => TimedEvent::rest(start, measure_length),
            }
        })
        .collect()
}

/// Combine the untouched melody with the assembled accompaniment.
pub fn build_score(melody: &Melody, harmonization: &Harmonization) -> OutputScore {
    OutputScore {
        melody: melody.clone(),
        accompaniment: assemble_accompaniment(
            &harmonization.choices,
            harmonization.measure_length,
        ),
    }
}
