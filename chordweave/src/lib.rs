// Chordweave: diatonic chord accompaniment for MIDI melodies.
//
// Given a melody in a Standard MIDI File, chordweave estimates its key,
// splits the timeline into fixed-length measures, picks the best-fitting
// diatonic chord (or a rest) for each measure, and writes a two-track MIDI
// file: the untouched melody plus the generated accompaniment.
//
// Architecture:
// - pitch.rs: pitch classes, octave-qualified pitches, pitch-class sets
// - key.rs: key model (tonic + major/minor), diatonic scale derivation
// - chord.rs: the 14 diatonic chord candidates per key, in tie-break order
// - melody.rs: timed-event melody model and measure segmentation
// - analysis.rs: Krumhansl-Schmuckler key estimation (C major fallback)
// - harmonize.rs: chord-fit scoring/selection and accompaniment assembly
// - midi.rs: SMF decode/encode via midly
// - error.rs: boundary error taxonomy
//
// The whole pipeline is a synchronous batch transformation with no shared
// mutable state: key and measure length are resolved once per run and
// passed explicitly into every per-measure call. For a fixed input, key,
// and measure length the output is fully deterministic.

pub mod analysis;
pub mod chord;
pub mod error;
pub mod harmonize;
pub mod key;
pub mod melody;
pub mod midi;
pub mod pitch;
