// MIDI codec: Standard MIDI File decode into a Melody and encode of the
// harmonized two-track score.
//
// Uses the `midly` crate in both directions. Decoding merges note events
// from every track into one flattened, time-ordered melody (the analysis is
// monophonic-by-pitch-class, so voice separation is not needed) and captures
// the file's time base: ticks per quarter, first tempo, first time
// signature. Encoding writes SMF Format 1 with a tempo track plus two named
// piano tracks — the untouched melody and the generated accompaniment — on
// the captured time base.
//
// Encoding assembles the whole file in memory and writes it with a single
// fs::write, so a failed write never leaves a partial output file behind.

use crate::error::{Error, Result};
use crate::melody::{DEFAULT_TEMPO, Melody, OutputScore, TimedEvent, Timing};
use crate::pitch::Pitch;
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing as SmfTiming, Track, TrackEvent,
    TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::path::Path;

/// General MIDI program 0: acoustic grand piano, for both output tracks.
const PIANO_PROGRAM: u8 = 0;

/// Note-on velocity for generated output.
const VELOCITY: u8 = 80;

/// Read and decode a melody from a MIDI file. A missing or unreadable path
/// is InputNotFound; malformed file contents are MidiParse.
pub fn read_melody(path: &Path) -> Result<Melody> {
    let bytes = std::fs::read(path).map_err(|source| Error::InputNotFound {
        path: path.to_path_buf(),
        source,
    })?;
    decode(&bytes)
}

/// Decode SMF bytes into a Melody. Notes from all tracks are merged and
/// sorted by onset. Requires metrical (ticks-per-quarter) timing.
pub fn decode(bytes: &[u8]) -> Result<Melody> {
    let smf = Smf::parse(bytes)?;
    let ticks_per_quarter = match smf.header.timing {
        SmfTiming::Metrical(t) => t.as_int(),
        SmfTiming::Timecode(..) => return Err(Error::UnsupportedTiming),
    };
    let tpq = ticks_per_quarter as f64;

    let mut tempo: Option<u32> = None;
    let mut time_signature: Option<(u8, u8)> = None;
    let mut events: Vec<TimedEvent> = Vec::new();

    for track in &smf.tracks {
        let mut tick: u64 = 0;
        // On-tick of each currently sounding note, indexed by MIDI number.
        let mut active: [Option<u64>; 128] = [None; 128];

        for event in track {
            tick += u64::from(event.delta.as_int());
            match event.kind {
                TrackEventKind::Meta(MetaMessage::Tempo(t)) => {
                    if tempo.is_none() {
                        tempo = Some(t.as_int());
                    }
                }
                TrackEventKind::Meta(MetaMessage::TimeSignature(num, den_pow, _, _)) => {
                    if time_signature.is_none() {
                        time_signature = Some((num, 1u8 << den_pow.min(6)));
                    }
                }
                TrackEventKind::Midi { message, .. } => match message {
                    MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                        active[key.as_int() as usize] = Some(tick);
                    }
                    // NoteOn with velocity 0 is a note-off by convention.
                    MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                        let note = key.as_int();
                        if let Some(start) = active[note as usize].take() {
                            events.push(TimedEvent::note(
                                start as f64 / tpq,
                                (tick - start) as f64 / tpq,
                                Pitch::from_midi(note),
                            ));
                        }
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        // Close notes left sounding at the end of the track.
        for (note, slot) in active.iter().enumerate() {
            if let Some(start) = slot {
                events.push(TimedEvent::note(
                    *start as f64 / tpq,
                    (tick - start) as f64 / tpq,
                    Pitch::from_midi(note as u8),
                ));
            }
        }
    }

    events.sort_by(|a, b| {
        a.start
            .total_cmp(&b.start)
            .then_with(|| a.pitches.cmp(&b.pitches))
    });

    Ok(Melody::new(
        events,
        Timing {
            ticks_per_quarter,
            tempo: tempo.unwrap_or(DEFAULT_TEMPO),
            time_signature,
        },
    ))
}

/// Encode the score and write it to `path` in one shot. Any failure along
/// the way is SerializationFailed; no partial file is left behind because
/// the buffer is fully assembled before the write.
pub fn write_score(score: &OutputScore, path: &Path) -> Result<()> {
    let smf = score_to_smf(score);
    let mut buf = Vec::new();
    let failed = |source| Error::SerializationFailed {
        path: path.to_path_buf(),
        source,
    };
    smf.write_std(&mut buf).map_err(failed)?;
    std::fs::write(path, &buf).map_err(failed)?;
    Ok(())
}

/// Build the two-track output SMF: tempo track, melody track, accompaniment
/// track, all sharing the input's time base.
pub fn score_to_smf(score: &OutputScore) -> Smf<'static> {
    let timing = score.melody.timing;
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        SmfTiming::Metrical(u15::new(timing.ticks_per_quarter)),
    ));

    // Track 0: tempo and time signature
    let mut meta_track: Track<'static> = Vec::new();
    meta_track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(timing.tempo))),
    });
    if let Some((num, den)) = timing.time_signature {
        meta_track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::TimeSignature(
                num,
                den.trailing_zeros() as u8,
                24,
                8,
            )),
        });
    }
    meta_track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    smf.tracks.push(meta_track);

    let tpq = timing.ticks_per_quarter as f64;
    smf.tracks
        .push(events_to_track(&score.melody.events, b"Melody", 0, tpq));
    smf.tracks
        .push(events_to_track(&score.accompaniment, b"Accompaniment", 1, tpq));

    smf
}

/// Convert timed events to one MIDI track on the given channel, tagged with
/// a name and the piano program.
fn events_to_track(
    events: &[TimedEvent],
    name: &'static [u8],
    channel: u8,
    tpq: f64,
) -> Track<'static> {
    let channel = u4::new(channel);
    let mut track: Track<'static> = Vec::new();

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::TrackName(name)),
    });
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Midi {
            channel,
            message: MidiMessage::ProgramChange {
                program: u7::new(PIANO_PROGRAM),
            },
        },
    });

    // Absolute-tick note boundaries: (tick, is_note_on, key).
    let mut boundaries: Vec<(u32, bool, u8)> = Vec::new();
    for event in events {
        let on_tick = (event.start * tpq).round() as u32;
        // At least one tick long, or players drop the note.
        let off_tick = ((event.end() * tpq).round() as u32).max(on_tick + 1);
        for pitch in &event.pitches {
            boundaries.push((on_tick, true, pitch.to_midi()));
            boundaries.push((off_tick, false, pitch.to_midi()));
        }
    }
    // Note-offs sort before note-ons at the same tick so back-to-back
    // events do not overlap.
    boundaries.sort_by_key(|&(tick, on, key)| (tick, on, key));

    let mut last_tick: u32 = 0;
    for (tick, on, key) in boundaries {
        let message = if on {
            MidiMessage::NoteOn {
                key: u7::new(key),
                vel: u7::new(VELOCITY),
            }
        } else {
            MidiMessage::NoteOff {
                key: u7::new(key),
                vel: u7::new(0),
            }
        };
        track.push(TrackEvent {
            delta: u28::new(tick - last_tick),
            kind: TrackEventKind::Midi { channel, message },
        });
        last_tick = tick;
    }

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    track
}
