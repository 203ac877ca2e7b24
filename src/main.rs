//! Orange Tree entry point
//!
//! Native builds run a replay script against the headless scene and print
//! the resulting scene events as JSON lines.
//!
//! Usage: `orange-tree [script.json] [--tuning tuning.json] [--seed N]`

use std::path::PathBuf;

use clap::Parser;
use glam::Vec2;

use orange_tree::headless::HeadlessScene;
use orange_tree::replay::Script;
use orange_tree::sim::level::seed_from_entropy;
use orange_tree::{Tuning, TurnShotController};

/// Demo playfield size
const SCENE_SIZE: Vec2 = Vec2::new(1024.0, 768.0);

#[derive(Debug, Parser)]
#[command(name = "orange-tree")]
#[command(about = "Replay touch scripts against the headless Orange Tree scene", long_about = None)]
struct Args {
    /// Replay script (JSON); the built-in demo plays when omitted
    script: Option<PathBuf>,
    /// Tuning overrides (JSON)
    #[arg(long)]
    tuning: Option<PathBuf>,
    /// Level RNG seed; random when omitted
    #[arg(long)]
    seed: Option<u64>,
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Orange Tree (headless) starting...");

    let args = Args::parse();
    let tuning = match &args.tuning {
        Some(path) => Tuning::load_or_default(path),
        None => Tuning::default(),
    };
    let script = match &args.script {
        Some(path) => match Script::load(path) {
            Ok(script) => script,
            Err(err) => {
                log::error!("Cannot play {}: {err}", path.display());
                std::process::exit(1);
            }
        },
        None => {
            log::info!("No script given, playing the built-in demo");
            Script::demo()
        }
    };

    let seed = args.seed.unwrap_or_else(seed_from_entropy);
    log::info!("Seed {seed}");

    let mut controller = TurnShotController::new(HeadlessScene::demo(SCENE_SIZE), tuning, seed);
    match script.run(&mut controller) {
        Ok(events) => {
            for event in &events {
                match serde_json::to_string(event) {
                    Ok(line) => println!("{line}"),
                    Err(err) => log::warn!("Unprintable event {event:?}: {err}"),
                }
            }
            log::info!("Finished on turn {} ({} events)", controller.turn(), events.len());
        }
        Err(err) => {
            log::error!("Replay failed: {err}");
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No wasm entry point; the library is embedded by the host engine
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse_all_flags() {
        let args = Args::try_parse_from(["orange-tree", "demo.json", "--tuning", "t.json", "--seed", "42"]).unwrap();
        assert_eq!(args.script, Some(PathBuf::from("demo.json")));
        assert_eq!(args.tuning, Some(PathBuf::from("t.json")));
        assert_eq!(args.seed, Some(42));
    }

    #[test]
    fn test_bad_seed_is_rejected() {
        assert!(Args::try_parse_from(["orange-tree", "--seed", "abc", "demo.json"]).is_err());
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(Args::try_parse_from(["orange-tree", "--tunning", "t.json"]).is_err());
    }

    #[test]
    fn test_no_args_plays_demo() {
        let args = Args::try_parse_from(["orange-tree"]).unwrap();
        assert!(args.script.is_none() && args.tuning.is_none() && args.seed.is_none());
    }
}
