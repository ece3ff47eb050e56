//! # Enchant Simulator
//!
//! Rolls one item many times against a synthetic room and prints how often
//! each enchantment lands.
//!
//! Usage:
//!
//! ```text
//! enchant_sim [CONFIG.toml] [--item MATERIAL] [--shelves N] [--runes a,b,c]
//!             [--hold MATERIAL] [--rolls N] [--seed S]
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::process::ExitCode;
use std::sync::Arc;

use runeforge::enchanting::{EnchantingConfig, EnchantingTable, MaterialClassifier, MaterialStack};
use runeforge::Simulation;
use tracing::error;

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<(Option<String>, Simulation), String> {
    let mut config_path = None;
    let mut sim = Simulation::default();

    while let Some(arg) = args.next() {
        let mut value = |flag: &str| args.next().ok_or_else(|| format!("{flag} needs a value"));
        match arg.as_str() {
            "--item" => sim.material = value("--item")?,
            "--shelves" => sim.bookshelves = parse_number(&value("--shelves")?)?,
            "--rolls" => sim.rolls = parse_number(&value("--rolls")?)?,
            "--seed" => sim.seed = parse_number(&value("--seed")?)?,
            "--runes" => {
                sim.lectern_runes = value("--runes")?
                    .split(',')
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            "--hold" => sim.held.push(MaterialStack::new(value("--hold")?, 1)),
            flag if flag.starts_with("--") => return Err(format!("unknown flag {flag}")),
            path => config_path = Some(path.to_string()),
        }
    }
    Ok((config_path, sim))
}

fn parse_number<T: std::str::FromStr>(raw: &str) -> Result<T, String> {
    raw.parse().map_err(|_| format!("not a number: {raw}"))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let (config_path, sim) = match parse_args(std::env::args().skip(1)) {
        Ok(parsed) => parsed,
        Err(message) => {
            error!("{message}");
            return ExitCode::FAILURE;
        }
    };

    let config = match config_path {
        Some(path) => match EnchantingConfig::from_path(&path) {
            Ok(config) => config,
            Err(e) => {
                error!(path = %path, "failed to load config: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => EnchantingConfig::default(),
    };

    let table = EnchantingTable::from_config(&config, Arc::new(MaterialClassifier::with_defaults()));
    let report = sim.run(&config, &table);

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║           ENCHANT SIMULATION                                     ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();
    println!("Item:          {}", sim.material);
    println!("Power:         {}", report.power);
    println!("Rolls:         {}", report.rolls);
    println!("Empty rolls:   {}", report.empty_rolls);
    println!("Mean cost:     {:.2}", report.mean_cost);
    println!();
    println!("┌─ FREQUENCIES ──────────────────────────────────────────────────┐");

    let mut ranked: Vec<_> = report.frequencies.iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (id, count) in ranked {
        let rejected = report.rejections.get(id).copied().unwrap_or(0);
        println!(
            "│ {id:<24} {count:>7} ({:>5.1}%)  rejected {rejected}",
            report.rate(id) * 100.0
        );
    }
    println!("└──────────────────────────────────────────────────────────────────┘");

    if report.dropped_events > 0 {
        println!("WARNING: {} events dropped", report.dropped_events);
    }
    ExitCode::SUCCESS
}
