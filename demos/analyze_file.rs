//! Example: Estimate the key of a single audio file
//!
//! Usage:
//!   cargo run --release --example analyze_file -- <file> [start_seconds] [end_seconds]
//!
//! Set `RUST_LOG=debug` to see the pipeline steps.

use keyfinder_dsp::preprocessing::window::AnalysisWindow;
use keyfinder_dsp::{analyze_file, diatonic_chords, AnalysisConfig};
use std::env;
use std::time::Instant;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(path) = args.first() else {
        eprintln!("Usage: analyze_file <file> [start_seconds] [end_seconds]");
        std::process::exit(2);
    };

    let mut config = AnalysisConfig::default();
    if args.len() > 1 {
        let start = args.get(1).map(|s| s.parse::<f64>()).transpose()?;
        let end = args.get(2).map(|s| s.parse::<f64>()).transpose()?;
        config.analysis_window = AnalysisWindow::new(start, end);
    }

    let t0 = Instant::now();
    let estimate = analyze_file(path, &config)?;
    let elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0;

    println!("Analysis Results for {}:", path);
    println!("{}", estimate.summary());
    println!();
    println!("Pitch class prominence:");
    println!("{}", estimate.chroma.prominence_table());
    println!();
    println!("Key correlations:");
    println!("{}", estimate.correlation_table());
    println!();
    print!("Diatonic chords:");
    for (degree, chord) in diatonic_chords(estimate.key) {
        print!(" {}={}", degree, chord);
    }
    println!();
    println!("Processing time: {:.2} ms", elapsed_ms);

    Ok(())
}
