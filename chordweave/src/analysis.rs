// Key estimation via the Krumhansl-Schmuckler profile method.
//
// Build a duration-weighted pitch-class histogram over the whole melody,
// then correlate it against the Krumhansl-Kessler major and minor key
// profiles rotated to each of the 12 possible tonics. The key with the
// highest Pearson correlation wins. 24 candidates are scanned in a fixed
// order (major then minor, tonics ascending from C) with strict-improvement
// updates, so correlation ties resolve deterministically to the earlier
// candidate.
//
// Returns None instead of erroring when the melody is silent or the
// histogram is flat; the caller substitutes C major (harmonize.rs). Key
// estimation is global to the piece — there is no per-measure re-analysis.

use crate::key::{Key, KeyMode};
use crate::melody::Melody;
use crate::pitch::PitchClass;

/// Krumhansl-Kessler major key profile, indexed by semitone above the tonic.
const MAJOR_PROFILE: [f64; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];

/// Krumhansl-Kessler minor key profile.
const MINOR_PROFILE: [f64; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

/// Estimate the key of a melody. None when there is nothing to analyze
/// (no sounding notes, or a degenerate flat histogram).
pub fn estimate_key(melody: &Melody) -> Option<Key> {
    let histogram = pitch_class_histogram(melody);
    if histogram.iter().all(|&w| w == 0.0) {
        return None;
    }

    let mut best: Option<(Key, f64)> = None;
    for mode in KeyMode::ALL {
        let profile = match mode {
            KeyMode::Major => &MAJOR_PROFILE,
            KeyMode::Minor => &MINOR_PROFILE,
        };
        for tonic in 0u8..12 {
            let mut rotated = [0.0; 12];
            for (pc, slot) in rotated.iter_mut().enumerate() {
                *slot = profile[(pc as u8 + 12 - tonic) as usize % 12];
            }
            let r = correlation(&histogram, &rotated)?;
            let improved = match best {
                None => true,
                Some((_, best_r)) => r > best_r,
            };
            if improved {
                best = Some((Key::new(PitchClass::from_semitone(tonic), mode), r));
            }
        }
    }
    best.map(|(key, _)| key)
}

/// Duration-weighted pitch-class histogram over all sounding events.
fn pitch_class_histogram(melody: &Melody) -> [f64; 12] {
    let mut histogram = [0.0; 12];
    for event in &melody.events {
        if event.duration <= 0.0 {
            continue;
        }
        for pitch in &event.pitches {
            histogram[pitch.class.semitone() as usize] += event.duration;
        }
    }
    histogram
}

/// Pearson correlation coefficient. None when either side has zero
/// variance (correlation undefined).
fn correlation(x: &[f64; 12], y: &[f64; 12]) -> Option<f64> {
    let mean = |v: &[f64; 12]| v.iter().sum::<f64>() / 12.0;
    let mx = mean(x);
    let my = mean(y);
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (xi, yi) in x.iter().zip(y.iter()) {
        let dx = xi - mx;
        let dy = yi - my;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x * var_y).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::melody::{TimedEvent, Timing};
    use crate::pitch::{Pitch, PitchClass::*};

    fn melody_of(notes: &[(crate::pitch::PitchClass, f64)]) -> Melody {
        let mut events = Vec::new();
        let mut at = 0.0;
        for &(class, duration) in notes {
            events.push(TimedEvent::note(at, duration, Pitch::new(class, 4)));
            at += duration;
        }
        Melody::new(events, Timing::default())
    }

    #[test]
    fn test_empty_melody_yields_none() {
        let m = Melody::new(Vec::new(), Timing::default());
        assert_eq!(estimate_key(&m), None);
    }

    #[test]
    fn test_c_major_melody() {
        // Tonic-heavy C major material with the major third prominent.
        let m = melody_of(&[
            (C, 4.0),
            (E, 2.0),
            (G, 2.0),
            (C, 2.0),
            (D, 1.0),
            (F, 1.0),
            (A, 1.0),
            (B, 1.0),
        ]);
        assert_eq!(estimate_key(&m), Some(Key::c_major()));
    }

    #[test]
    fn test_a_minor_melody() {
        let m = melody_of(&[(A, 3.0), (C, 2.0), (E, 2.0), (A, 2.0), (B, 0.5), (D, 0.5)]);
        assert_eq!(estimate_key(&m), Some(Key::new(A, KeyMode::Minor)));
    }

    #[test]
    fn test_estimation_is_deterministic() {
        let m = melody_of(&[(G, 2.0), (B, 1.0), (D, 1.0), (G, 2.0), (C, 1.0)]);
        assert_eq!(estimate_key(&m), estimate_key(&m));
    }

    #[test]
    fn test_duration_weighting_matters() {
        // Same pitch classes, but weight shifts the tonic.
        let c_heavy = melody_of(&[(C, 8.0), (E, 1.0), (G, 1.0)]);
        assert_eq!(estimate_key(&c_heavy), Some(Key::c_major()));
    }
}
