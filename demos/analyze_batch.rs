//! Example: Estimate keys of multiple audio files in parallel
//!
//! Usage:
//!   cargo run --release --example analyze_batch -- [--jobs N] [--json] <file1> <file2> ...
//!
//! Notes:
//! - Parallelism is across files (batch-level). Each file analysis is still single-threaded.
//! - Default workers: (available CPU threads - 1), keeping one core free for the system.

use keyfinder_dsp::{analyze_file, AnalysisConfig, KeyEstimate};
use rayon::prelude::*;
use serde::Serialize;
use std::env;
use std::time::Instant;

fn default_jobs() -> usize {
    let n = std::thread::available_parallelism().map(|v| v.get()).unwrap_or(1);
    std::cmp::max(1, n.saturating_sub(1))
}

/// One line of batch output
#[derive(Serialize)]
struct ItemOut {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    alternate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    alternate_correlation: Option<f64>,
    processing_time_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ItemOut {
    fn new(file: String, result: Result<KeyEstimate, String>, processing_time_ms: f64) -> Self {
        match result {
            Ok(estimate) => Self {
                file,
                key: Some(estimate.key.name()),
                correlation: Some(estimate.correlation),
                alternate: estimate.alternate.map(|c| c.key.name()),
                alternate_correlation: estimate.alternate.map(|c| c.correlation),
                processing_time_ms,
                error: None,
            },
            Err(error) => Self {
                file,
                key: None,
                correlation: None,
                alternate: None,
                alternate_correlation: None,
                processing_time_ms,
                error: Some(error),
            },
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    let mut json = false;
    let mut jobs: Option<usize> = None;
    let mut paths: Vec<String> = Vec::new();

    while let Some(a) = args.first().cloned() {
        args.remove(0);
        match a.as_str() {
            "--json" => json = true,
            "--jobs" => {
                let v = args
                    .first()
                    .ok_or("--jobs requires a value")?
                    .parse::<usize>()?;
                args.remove(0);
                jobs = Some(std::cmp::max(1, v));
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage: analyze_batch [--jobs N] [--json] <file1> <file2> ...\n\
                     \n\
                     --jobs N   Parallel workers (default: CPU-1)\n\
                     --json     Emit one JSON object per line (JSONL)\n"
                );
                return Ok(());
            }
            _ => paths.push(a),
        }
    }

    if paths.is_empty() {
        eprintln!("ERROR: Provide at least one audio file path. Use --help for usage.");
        std::process::exit(2);
    }

    let jobs = jobs.unwrap_or_else(default_jobs);
    eprintln!("Batch: {} files, jobs={}", paths.len(), jobs);

    let config = AnalysisConfig::default();
    let t0 = Instant::now();
    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;

    let outs: Vec<ItemOut> = pool.install(|| {
        paths
            .par_iter()
            .map(|path| {
                let started = Instant::now();
                let result = analyze_file(path, &config).map_err(|e| e.to_string());
                ItemOut::new(path.clone(), result, started.elapsed().as_secs_f64() * 1000.0)
            })
            .collect()
    });

    if json {
        for o in &outs {
            println!("{}", serde_json::to_string(o)?);
        }
    } else {
        for (idx, o) in outs.iter().enumerate() {
            match (&o.key, o.correlation) {
                (Some(key), Some(corr)) => {
                    let alt = match (&o.alternate, o.alternate_correlation) {
                        (Some(alt), Some(c)) => format!(" alt={} ({:.3})", alt, c),
                        _ => String::new(),
                    };
                    println!(
                        "[{}/{}] {}: Key={} ({:.3}){} time={:.2}ms",
                        idx + 1,
                        outs.len(),
                        o.file,
                        key,
                        corr,
                        alt,
                        o.processing_time_ms
                    );
                }
                _ => println!(
                    "[{}/{}] {}: ERROR {}",
                    idx + 1,
                    outs.len(),
                    o.file,
                    o.error.as_deref().unwrap_or("unknown error")
                ),
            }
        }
    }

    let ok = outs.iter().filter(|o| o.error.is_none()).count();
    eprintln!(
        "Done: {}/{} succeeded in {:.2}s",
        ok,
        outs.len(),
        t0.elapsed().as_secs_f64()
    );

    Ok(())
}
