// ═══════════════════════════════════════════════════════════════════════
// Runner — CLI entry point for inspecting maps and replaying games
//
// stdout carries JSON only (maps, or one event per line during a replay).
// Logs go to stderr, filtered by RUST_LOG.
// ═══════════════════════════════════════════════════════════════════════

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use conquest_engine::{Action, Event, Rules, SeededRandom};
use conquest_host::Registry;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const REPLAY_GAME: &str = "replay";

#[derive(Parser)]
#[command(name = "conquest-runner", about = "Conquest rules engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in maps
    Maps,
    /// Print a built-in map as JSON
    Map {
        name: String,
    },
    /// Replay a JSON-lines file of actions and print the resulting events
    Replay {
        /// Built-in map name, or path to a map JSON file
        #[arg(short, long, default_value = "alpha")]
        map: String,
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        /// One JSON action per line; blank lines and '#' comments are skipped
        #[arg(short, long)]
        actions: String,
        /// JSON file of rule overrides
        #[arg(short, long)]
        rules: Option<String>,
        /// Redact events as this player sees them
        #[arg(short, long, default_value = "spectator")]
        viewer: String,
        /// Stop at the first rejected action
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Maps => cmd_maps(),
        Commands::Map { name } => cmd_map(&name),
        Commands::Replay { map, seed, actions, rules, viewer, strict } => {
            cmd_replay(&map, seed, &actions, rules.as_deref(), &viewer, strict)
        }
    }
}

fn cmd_maps() -> Result<()> {
    let registry = Registry::new();
    for name in registry.map_names() {
        let map = registry.map(&name)?;
        println!("{:12} {:3} territories, {} regions", name, map.len(), map.regions.len());
    }
    Ok(())
}

fn cmd_map(name: &str) -> Result<()> {
    let map = Registry::new().map(name)?;
    println!("{}", serde_json::to_string_pretty(map.as_ref())?);
    Ok(())
}

fn cmd_replay(
    map: &str,
    seed: u64,
    actions_path: &str,
    rules_path: Option<&str>,
    viewer: &str,
    strict: bool,
) -> Result<()> {
    let registry = Registry::new();
    let map_name = resolve_map(&registry, map)?;
    let rules = match rules_path {
        Some(path) => {
            let json = fs::read_to_string(path).with_context(|| format!("reading rules {path}"))?;
            serde_json::from_str::<Rules>(&json).with_context(|| format!("parsing rules {path}"))?
        }
        None => Rules::default(),
    };
    let script = fs::read_to_string(actions_path).with_context(|| format!("reading actions {actions_path}"))?;

    let game = registry.create_game(REPLAY_GAME, &map_name, rules, Box::new(SeededRandom::new(seed)))?;
    let (tx, rx) = mpsc::channel::<Event>();
    game.subscribe(viewer, Box::new(tx));

    info!(map = %map_name, seed, viewer, "replay started");
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let (mut applied, mut rejected) = (0usize, 0usize);

    for (idx, line) in script.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let lineno = idx + 1;
        let action: Action =
            serde_json::from_str(line).with_context(|| format!("{actions_path}:{lineno}: malformed action"))?;

        match game.submit(&action) {
            Ok(_) => applied += 1,
            Err(err) if strict => bail!("{actions_path}:{lineno}: {} rejected: {err}", action.kind()),
            Err(err) => {
                rejected += 1;
                warn!(line = lineno, player = action.player(), action = action.kind(), %err, "action rejected");
            }
        }
        for event in rx.try_iter() {
            writeln!(out, "{}", serde_json::to_string(&event)?)?;
        }
    }
    out.flush()?;

    let winner = game.with_game(|g| g.state().winner().map(str::to_string));
    info!(applied, rejected, winner = winner.as_deref().unwrap_or("-"), "replay finished");
    Ok(())
}

/// A built-in map name, or a path to a map file to load.
fn resolve_map(registry: &Registry, map: &str) -> Result<String> {
    if registry.map(map).is_ok() {
        return Ok(map.to_string());
    }
    if !Path::new(map).is_file() {
        bail!("'{map}' is neither a built-in map nor a map file");
    }
    let json = fs::read_to_string(map).with_context(|| format!("reading map {map}"))?;
    let loaded = registry.load_map_json(&json).with_context(|| format!("loading map {map}"))?;
    Ok(loaded.name.clone())
}
