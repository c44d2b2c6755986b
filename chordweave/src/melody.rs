// Melody model and measure segmentation.
//
// A Melody is the decoded input: an ordered list of timed events (offsets
// and durations in fractional quarter-note beats) plus the timing metadata
// captured from the source file, so output can share its time base.
//
// Measures are analysis windows only. Segmentation tiles the melody's
// timeline with fixed-length half-open windows and records which pitch
// classes sound in each window; it never reorders or modifies the melody
// events. A melody whose duration is not an exact multiple of the measure
// length gets a truncated final window, which is still treated as a full
// measure downstream (the accompaniment emits a full-length event for it —
// see harmonize.rs).

use crate::pitch::{Pitch, PitchClassSet};
use serde::{Deserialize, Serialize};

/// Default measure length in quarter-note beats: common time.
pub const DEFAULT_MEASURE_BEATS: f64 = 4.0;

/// Default MIDI tempo: 500 000 µs per quarter (120 BPM).
pub const DEFAULT_TEMPO: u32 = 500_000;

/// One timed event: zero pitches is a rest, one is a note, more is a chord.
/// `start` and `duration` are in fractional quarter-note beats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub start: f64,
    pub duration: f64,
    pub pitches: Vec<Pitch>,
}

impl TimedEvent {
    pub fn note(start: f64, duration: f64, pitch: Pitch) -> Self {
        TimedEvent {
            start,
            duration,
            pitches: vec![pitch],
        }
    }

    pub fn rest(start: f64, duration: f64) -> Self {
        TimedEvent {
            start,
            duration,
            pitches: Vec::new(),
        }
    }

    pub fn is_rest(&self) -> bool {
        self.pitches.is_empty()
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Time base captured from the input file and reused for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timing {
    pub ticks_per_quarter: u16,
    /// Microseconds per quarter note.
    pub tempo: u32,
    /// Time signature as (numerator, denominator), when the file has one.
    pub time_signature: Option<(u8, u8)>,
}

impl Timing {
    /// Measure length in quarter-note beats implied by the time signature,
    /// if the file declared one (6/8 -> 3.0, 3/4 -> 3.0, 4/4 -> 4.0).
    pub fn measure_beats(&self) -> Option<f64> {
        self.time_signature
            .map(|(num, den)| num as f64 * 4.0 / den as f64)
    }
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            ticks_per_quarter: 480,
            tempo: DEFAULT_TEMPO,
            time_signature: None,
        }
    }
}

/// The decoded input melody. Events are ordered by start offset and are
/// never mutated after decoding; the output score carries them unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Melody {
    pub events: Vec<TimedEvent>,
    pub timing: Timing,
}

impl Melody {
    pub fn new(events: Vec<TimedEvent>, timing: Timing) -> Self {
        Melody { events, timing }
    }

    /// End of the last event, in beats. 0.0 for an empty melody.
    pub fn total_duration(&self) -> f64 {
        self.events.iter().map(TimedEvent::end).fold(0.0, f64::max)
    }

    /// Number of sounding (non-rest) events.
    pub fn note_count(&self) -> usize {
        self.events.iter().filter(|e| !e.is_rest()).count()
    }
}

/// One analysis window: a half-open interval [start, start + length) plus
/// the set of pitch classes sounding anywhere inside it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub start: f64,
    pub length: f64,
    pub pitch_classes: PitchClassSet,
}

/// Tile [0, total_duration) with windows of `measure_length` beats.
///
/// The final window is truncated when the melody duration is not an exact
/// multiple, but still counts as a measure. An event contributes its pitch
/// classes to every window it overlaps, octaves discarded. Returns an empty
/// vector for an empty melody.
pub fn segment_measures(melody: &Melody, measure_length: f64) -> Vec<Measure> {
    let total = melody.total_duration();
    if total <= 0.0 || measure_length <= 0.0 {
        return Vec::new();
    }

    let count = (total / measure_length).ceil() as usize;
    let mut measures = Vec::with_capacity(count);
    for index in 0..count {
        let start = index as f64 * measure_length;
        let end = start + measure_length;
        let mut pitch_classes = PitchClassSet::EMPTY;
        for event in &melody.events {
            if event.start < end && event.end() > start {
                for pitch in &event.pitches {
                    pitch_classes.insert(pitch.class);
                }
            }
        }
        measures.push(Measure {
            start,
            length: measure_length,
            pitch_classes,
        });
    }
    measures
}

/// The assembled result: the untouched input melody alongside the generated
/// accompaniment, sharing one timeline origin and time base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputScore {
    pub melody: Melody,
    pub accompaniment: Vec<TimedEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::PitchClass::*;

    fn note(start: f64, duration: f64, class: crate::pitch::PitchClass, octave: i8) -> TimedEvent {
        TimedEvent::note(start, duration, Pitch::new(class, octave))
    }

    fn melody(events: Vec<TimedEvent>) -> Melody {
        Melody::new(events, Timing::default())
    }

    #[test]
    fn test_segment_exact_multiple() {
        let m = melody(vec![note(0.0, 4.0, C, 4), note(4.0, 4.0, G, 4)]);
        let measures = segment_measures(&m, 4.0);
        assert_eq!(measures.len(), 2);
        assert_eq!(measures[0].start, 0.0);
        assert_eq!(measures[1].start, 4.0);
        assert!(measures[0].pitch_classes.contains(C));
        assert!(!measures[0].pitch_classes.contains(G));
        assert!(measures[1].pitch_classes.contains(G));
    }

    #[test]
    fn test_segment_partial_final_measure() {
        // 5 beats of melody tiles into two 4-beat measures.
        let m = melody(vec![note(0.0, 4.0, C, 4), note(4.0, 1.0, D, 4)]);
        let measures = segment_measures(&m, 4.0);
        assert_eq!(measures.len(), 2);
        // The truncated window still reports full length for emission.
        assert_eq!(measures[1].length, 4.0);
        assert!(measures[1].pitch_classes.contains(D));
    }

    #[test]
    fn test_segment_empty_measure_has_empty_set() {
        // Notes in measures 0 and 2, silence in measure 1.
        let m = melody(vec![note(0.0, 1.0, C, 4), note(8.0, 1.0, E, 4)]);
        let measures = segment_measures(&m, 4.0);
        assert_eq!(measures.len(), 3);
        assert!(measures[1].pitch_classes.is_empty());
    }

    #[test]
    fn test_note_spanning_barline_sounds_in_both() {
        let m = melody(vec![note(3.0, 2.0, A, 4)]);
        let measures = segment_measures(&m, 4.0);
        assert_eq!(measures.len(), 2);
        assert!(measures[0].pitch_classes.contains(A));
        assert!(measures[1].pitch_classes.contains(A));
    }

    #[test]
    fn test_segment_does_not_touch_melody() {
        let m = melody(vec![note(0.0, 4.0, C, 4), note(4.0, 2.0, E, 4)]);
        let before = m.clone();
        let _ = segment_measures(&m, 4.0);
        assert_eq!(m, before);
    }

    #[test]
    fn test_empty_melody_has_no_measures() {
        let m = melody(Vec::new());
        assert!(segment_measures(&m, 4.0).is_empty());
        assert_eq!(m.total_duration(), 0.0);
        assert_eq!(m.note_count(), 0);
    }

    #[test]
    fn test_timing_measure_beats() {
        let mut timing = Timing::default();
        assert_eq!(timing.measure_beats(), None);
        timing.time_signature = Some((3, 4));
        assert_eq!(timing.measure_beats(), Some(3.0));
        timing.time_signature = Some((6, 8));
        assert_eq!(timing.measure_beats(), Some(3.0));
    }
}
