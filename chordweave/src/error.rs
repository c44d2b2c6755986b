// Error types for chordweave.
//
// Only boundary failures become errors: a missing or malformed input file,
// an empty melody, an unparseable key name, or a failed output write. Key
// estimation failure is deliberately absent — the pipeline recovers it with
// a C major fallback and never surfaces it.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("input file {path:?} not found or unreadable: {source}")]
    InputNotFound { path: PathBuf, source: io::Error },

    #[error("no notes found in input")]
    NoNotesFound,

    #[error("invalid key '{0}' (expected a tonic and mode, e.g. \"C major\" or \"f# minor\")")]
    InvalidKey(String),

    #[error("malformed MIDI file: {0}")]
    MidiParse(#[from] midly::Error),

    #[error("SMPTE-timed MIDI input is not supported (no quarter-note time base)")]
    UnsupportedTiming,

    #[error("failed to write output {path:?}: {source}")]
    SerializationFailed { path: PathBuf, source: io::Error },
}

pub type Result<T> = std::result::Result<T, Error>;
