// Chordweave CLI entry point.
//
// Reads a melody from a MIDI file, harmonizes it measure by measure, and
// writes a two-track MIDI file (melody + piano accompaniment).
//
// Usage:
//   harmonize <input.mid> [output.mid] [--key NAME] [--measure-len BEATS]
//     [--report PATH]
//
// With no output path the result lands next to the input as
// <stem>_harmonized.mid. --key takes a quoted name like "c minor" and
// skips estimation. --report writes a JSON summary of the detected key and
// per-measure chord choices.

use chordweave::error::{Error, Result};
use chordweave::harmonize::{Harmonization, KeySource, build_score, harmonize};
use chordweave::key::Key;
use chordweave::midi::{read_melody, write_score};
use serde::Serialize;
use std::path::{Path, PathBuf};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let input = args.get(1).filter(|s| !s.starts_with("--"));
    let input = match input {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!(
                "Usage: harmonize <input.mid> [output.mid] [--key NAME] \
                 [--measure-len BEATS] [--report PATH]"
            );
            eprintln!("Example: harmonize erika.mid erika_harmonized.mid --key \"c minor\"");
            std::process::exit(1);
        }
    };

    let output = args
        .get(2)
        .filter(|s| !s.starts_with("--"))
        .map(PathBuf::from)
        .unwrap_or_else(|| default_output_path(&input));
    let key_name: Option<String> = parse_flag(&args, "--key");
    let measure_len: Option<f64> = parse_flag(&args, "--measure-len");
    let report: Option<String> = parse_flag(&args, "--report");

    if let Err(e) = run(&input, &output, key_name.as_deref(), measure_len, report.as_deref()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(
    input: &Path,
    output: &Path,
    key_name: Option<&str>,
    measure_len: Option<f64>,
    report: Option<&str>,
) -> Result<()> {
    let key_override = key_name.map(Key::parse).transpose()?;

    println!("[1/4] Reading {}...", input.display());
    let melody = read_melody(input)?;
    println!(
        "  {} notes, {:.1} beats.",
        melody.note_count(),
        melody.total_duration()
    );

    println!("[2/4] Harmonizing...");
    let harmonization = harmonize(&melody, key_override, measure_len)?;
    match harmonization.key_source {
        KeySource::Supplied => println!("  Key: {} (supplied).", harmonization.key),
        KeySource::Estimated => println!("  Key: {} (estimated).", harmonization.key),
        KeySource::Fallback => {
            println!("  Key estimation failed; defaulting to {}.", harmonization.key)
        }
    }
    println!(
        "  {} measures of {} beats: {}",
        harmonization.choices.len(),
        harmonization.measure_length,
        progression_summary(&harmonization)
    );

    println!("[3/4] Assembling accompaniment...");
    let score = build_score(&melody, &harmonization);

    println!("[4/4] Writing {}...", output.display());
    write_score(&score, output)?;

    if let Some(report_path) = report {
        write_report(&harmonization, Path::new(report_path))?;
        println!("  Report written to {}.", report_path);
    }

    println!("Done.");
    Ok(())
}

/// One-line roman-numeral progression, rests shown as dashes.
fn progression_summary(harmonization: &Harmonization) -> String {
    harmonization
        .choices
        .iter()
        .map(|choice| match &choice.chord {
            Some(chord) => chord.to_string(),
            None => "-".to_string(),
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// <dir>/<stem>_harmonized.mid next to the input.
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}_harmonized.mid", stem))
}

#[derive(Serialize)]
struct Report {
    key: String,
    key_source: KeySource,
    measure_length: f64,
    measures: Vec<MeasureReport>,
}

#[derive(Serialize)]
struct MeasureReport {
    index: usize,
    chord: Option<String>,
    pitch_classes: Vec<String>,
    score: u32,
}

fn write_report(harmonization: &Harmonization, path: &Path) -> Result<()> {
    let report = Report {
        key: harmonization.key.to_string(),
        key_source: harmonization.key_source,
        measure_length: harmonization.measure_length,
        measures: harmonization
            .choices
            .iter()
            .enumerate()
            .map(|(index, choice)| MeasureReport {
                index,
                chord: choice.chord.as_ref().map(|c| c.to_string()),
                pitch_classes: choice
                    .chord
                    .as_ref()
                    .map(|c| c.pitch_classes.iter().map(|pc| pc.to_string()).collect())
                    .unwrap_or_default(),
                score: choice.score,
            })
            .collect(),
    };

    let failed = |source: std::io::Error| Error::SerializationFailed {
        path: path.to_path_buf(),
        source,
    };
    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| failed(std::io::Error::other(e)))?;
    std::fs::write(path, json).map_err(failed)?;
    Ok(())
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}
