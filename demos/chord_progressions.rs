//! Example: Diatonic chords and progressions
//!
//! Usage:
//!   cargo run --example chord_progressions -- [major|minor] ["<note> <mode>"] [--seed N]
//!
//! Without a key, a random tonic in the requested mode is chosen.

use keyfinder_dsp::{get_chords, random_progression, Mode};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    let mut seed: Option<u64> = None;
    if let Some(pos) = args.iter().position(|a| a == "--seed") {
        args.remove(pos);
        if pos >= args.len() {
            return Err("--seed requires a value".into());
        }
        seed = Some(args.remove(pos).parse()?);
    }

    let mode: Mode = args.first().map(|m| m.parse()).transpose()?.unwrap_or(Mode::Major);
    let key_name = args.get(1).map(String::as_str);

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let (key, progressions) = random_progression(mode, key_name, &mut rng)?;
    println!("Key of progression: [{}]", key);
    println!("{}", get_chords(&key.name())?);
    println!("{}", progressions);

    Ok(())
}
