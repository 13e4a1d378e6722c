//! Headless battle simulator.
//!
//! Reads a JSON list of participants, runs one battle with every human turn
//! answered by a random bot, and prints the narration and outcome.

use anyhow::{Context, Result};
use battle_core::{run_battle, Battle, BattleConfig, RandomActionSource};
use clap::Parser;
use combat_core::CombatantSnapshot;
use serde::Deserialize;
use spell_core::SpellCatalog;
use std::path::PathBuf;

/// Simulate a turn-based battle
#[derive(Parser)]
#[command(name = "battle_sim")]
#[command(about = "Run a turn-based battle with random players", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON file with the participants
    #[arg(long)]
    roster: PathBuf,

    /// Directory of spell/item catalog TOML files
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Battle configuration TOML
    #[arg(long)]
    config: Option<PathBuf>,

    /// Combat constants TOML
    #[arg(long)]
    constants: Option<PathBuf>,

    /// Seed for initiative, status rolls and the random players
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Print the outcome as JSON instead of the narration
    #[arg(long)]
    json: bool,
}

/// One participant in the roster file
#[derive(Deserialize)]
struct Entrant {
    #[serde(flatten)]
    snapshot: CombatantSnapshot,
    /// Current experience, for the pool contribution
    #[serde(default)]
    experience: f64,
    /// Spell names looked up in the catalog
    #[serde(default)]
    spells: Vec<String>,
    /// Item names looked up in the catalog
    #[serde(default)]
    items: Vec<String>,
}

impl Entrant {
    fn into_snapshot(self, catalog: &SpellCatalog) -> Result<(CombatantSnapshot, f64)> {
        let mut snapshot = self.snapshot;
        for name in &self.spells {
            let spell = catalog
                .spell(name)
                .with_context(|| format!("{}: unknown spell '{}'", snapshot.name, name))?;
            snapshot.known_spells.push(spell.clone());
        }
        for name in &self.items {
            let item = catalog
                .item(name)
                .with_context(|| format!("{}: unknown item '{}'", snapshot.name, name))?;
            snapshot.inventory_charges.push(item.clone());
        }
        Ok((snapshot, self.experience))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.constants {
        Some(path) => combat_core::init_constants(path)
            .with_context(|| format!("loading constants from {}", path.display()))?,
        None => combat_core::config::ensure_constants_initialized(),
    }

    let config = match &cli.config {
        Some(path) => BattleConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => BattleConfig::default(),
    };

    let catalog = match &cli.catalog {
        Some(dir) => SpellCatalog::load(dir).with_context(|| format!("loading catalog {}", dir.display()))?,
        None => SpellCatalog::new(),
    };
    tracing::info!(
        spells = catalog.spell_count(),
        items = catalog.item_count(),
        "catalog loaded"
    );

    let content = std::fs::read_to_string(&cli.roster)
        .with_context(|| format!("reading {}", cli.roster.display()))?;
    let entrants: Vec<Entrant> = serde_json::from_str(&content).context("parsing roster")?;

    let initiator = entrants.first().map_or(0, |e| e.snapshot.user_id);
    let mut battle = Battle::with_seed(initiator, config, cli.seed);
    for entrant in entrants {
        let (snapshot, experience) = entrant.into_snapshot(&catalog)?;
        battle.join(snapshot, experience)?;
    }
    battle.start()?;

    let source = RandomActionSource::new(cli.seed.wrapping_add(1));
    let outcome = run_battle(&mut battle, &source).await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        for line in &outcome.narration {
            println!("{}", line);
        }
    }
    Ok(())
}
