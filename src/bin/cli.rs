//! Parlay CLI - price legs, build parlays and pick same-game combos from a slate snapshot

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input, MultiSelect, Select};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use parlay::core::odds::format_american;
use parlay::core::{
    best_sgp_for_slate, picks_feed, select_best_sgp, value_leg, Combo, ProbabilityEstimates,
    SelectorConfig, SgpSelection,
};
use parlay::data::{load_slate, normalize_matchup};
use parlay::{ComboPricing, Leg, Slate};

const DEFAULT_SNAPSHOT: &str = "demos/sample_slate.json";
const DEFAULT_STAKE: f64 = 10.0;

#[derive(Parser)]
#[command(name = "parlay")]
#[command(author, version, about = "Odds and parlay valuation CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Run in interactive mode
    #[arg(short, long)]
    interactive: bool,

    /// Path to the slate snapshot (JSON)
    #[arg(long, global = true, default_value = DEFAULT_SNAPSHOT)]
    snapshot: PathBuf,

    /// Log selector decisions
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the normalized legs of a matchup with their valuation
    Legs {
        /// Matchup id
        #[arg(short, long)]
        matchup: String,

        /// Stake used for EV
        #[arg(long, default_value_t = DEFAULT_STAKE)]
        stake: f64,
    },

    /// Price a parlay built from chosen legs
    Parlay {
        /// Matchup id
        #[arg(short, long)]
        matchup: String,

        /// Leg id (repeatable)
        #[arg(short, long = "leg", required = true)]
        legs: Vec<String>,

        /// Stake used for EV
        #[arg(long, default_value_t = DEFAULT_STAKE)]
        stake: f64,
    },

    /// Best same-game parlay for one matchup
    Sgp {
        /// Matchup id
        #[arg(short, long)]
        matchup: String,

        /// JSON file mapping leg id to an independent hit probability
        #[arg(long)]
        estimates: Option<PathBuf>,

        #[command(flatten)]
        selector: SelectorArgs,
    },

    /// Best same-game parlay for every matchup in the snapshot
    Slate {
        #[command(flatten)]
        selector: SelectorArgs,
    },

    /// Headline moneyline, spread and total picks for a matchup
    Picks {
        /// Matchup id
        #[arg(short, long)]
        matchup: String,
    },
}

#[derive(Args)]
struct SelectorArgs {
    /// JSON file with selector overrides
    #[arg(long)]
    selector_config: Option<PathBuf>,

    /// Shortest favorite price eligible for selection
    #[arg(long, allow_hyphen_values = true)]
    min_odds: Option<i32>,

    /// Longest underdog price eligible for selection
    #[arg(long, allow_hyphen_values = true)]
    max_odds: Option<i32>,

    /// Value score (0-100) a third leg needs
    #[arg(long)]
    third_leg_threshold: Option<u8>,
}

impl SelectorArgs {
    fn resolve(&self) -> Result<SelectorConfig> {
        let mut config = match &self.selector_config {
            Some(path) => SelectorConfig::from_json_file(path)
                .with_context(|| format!("Failed to load selector config {:?}", path))?,
            None => SelectorConfig::default(),
        };
        if let Some(min) = self.min_odds {
            config.min_odds = min;
        }
        if let Some(max) = self.max_odds {
            config.max_odds = max;
        }
        if let Some(threshold) = self.third_leg_threshold {
            config.third_leg_threshold = threshold;
        }
        if config.min_odds > config.max_odds {
            bail!(
                "Empty odds window: {} > {}",
                format_american(config.min_odds),
                format_american(config.max_odds)
            );
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    println!("{}", "Parlay CLI v0.1.0".cyan().bold());
    println!();

    if cli.interactive {
        let slate = read_slate(&cli.snapshot)?;
        run_interactive(&slate)?;
    } else if let Some(command) = cli.command {
        let slate = read_slate(&cli.snapshot)?;
        match command {
            Commands::Legs { matchup, stake } => show_legs(&slate, &matchup, stake)?,
            Commands::Parlay {
                matchup,
                legs,
                stake,
            } => price_parlay(&slate, &matchup, &legs, stake)?,
            Commands::Sgp {
                matchup,
                estimates,
                selector,
            } => {
                let config = selector.resolve()?;
                let estimates = estimates.as_deref().map(read_estimates).transpose()?;
                show_sgp(&slate, &matchup, estimates.as_ref(), &config)?;
            }
            Commands::Slate { selector } => {
                let config = selector.resolve()?;
                show_slate(&slate, &config);
            }
            Commands::Picks { matchup } => show_picks(&slate, &matchup)?,
        }
    } else {
        println!("Use --help for usage information or --interactive for interactive mode.");
    }

    Ok(())
}

fn read_slate(path: &Path) -> Result<Slate> {
    load_slate(path).with_context(|| format!("Failed to load snapshot from {:?}", path))
}

fn read_estimates(path: &Path) -> Result<ProbabilityEstimates> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid estimates in {:?}", path))
}

fn matchup_legs(slate: &Slate, matchup_id: &str) -> Result<(String, Vec<Leg>)> {
    let matchup = slate.matchup(matchup_id)?;
    Ok((matchup.title(), normalize_matchup(matchup)))
}

fn show_legs(slate: &Slate, matchup_id: &str, stake: f64) -> Result<()> {
    let (title, legs) = matchup_legs(slate, matchup_id)?;
    println!("{}: {}", "Matchup".green(), title);
    println!();

    if legs.is_empty() {
        println!("{}", "No priced legs for this matchup.".red());
        return Ok(());
    }

    println!(
        "{:<36} {:>7} {:>8} {:>8} {:>6} {:>9} {:>9}",
        "Leg", "Odds", "Implied", "Fair", "Score", "EV", "Fair EV"
    );
    println!("{}", "-".repeat(89));

    for leg in &legs {
        let valuation = value_leg(leg, stake, None)?;
        let fair = valuation
            .fair_probability
            .map(|p| format!("{:.1}%", p * 100.0))
            .unwrap_or_else(|| "-".to_string());
        let fair_ev = valuation
            .fair_ev
            .map(|ev| format!("{:+.2}", ev))
            .unwrap_or_else(|| "-".to_string());
        let score = format!("{:>6}", valuation.value_score);
        let score = if valuation.value_score >= 65 {
            score.green()
        } else {
            score.normal()
        };
        println!(
            "{:<36} {:>7} {:>7.1}% {:>8} {} {:>9.2} {:>9}",
            truncate_label(&leg.label, 36),
            format_american(leg.odds),
            valuation.implied_probability * 100.0,
            fair,
            score,
            valuation.ev,
            fair_ev
        );
    }
    println!();
    println!("{}", format!("Ids: {}", ids(&legs)).dimmed());

    Ok(())
}

fn price_parlay(slate: &Slate, matchup_id: &str, leg_ids: &[String], stake: f64) -> Result<()> {
    let (title, legs) = matchup_legs(slate, matchup_id)?;
    println!("{}: {}", "Matchup".green(), title);
    println!();

    let mut combo = Combo::new();
    for id in leg_ids {
        let leg = legs
            .iter()
            .find(|l| &l.id == id)
            .with_context(|| format!("No leg {:?} in matchup {}", id, matchup_id))?;
        combo.insert(leg.clone());
    }

    print_combo(&combo, stake)
}

fn print_combo(combo: &Combo, stake: f64) -> Result<()> {
    let Some(pricing) = combo.pricing()? else {
        println!("{}", "No legs selected.".dimmed());
        return Ok(());
    };

    println!("{}", "Parlay:".yellow().bold());
    for leg in combo.legs() {
        println!("  {:<36} {:>7}", leg.label, format_american(leg.odds));
    }
    println!("{}", "-".repeat(46));
    print_pricing(&pricing);

    if let Some(ev) = combo.ev(stake)? {
        println!("  {:<20} {}", "EV", format_ev(ev, stake));
    }
    Ok(())
}

fn print_pricing(pricing: &ComboPricing) {
    println!("  {:<20} {}", "Legs", pricing.legs);
    println!(
        "  {:<20} {}",
        "Price",
        format_american(pricing.combined_american).bold()
    );
    println!("  {:<20} {:.3}", "Decimal", pricing.combined_decimal);
    println!(
        "  {:<20} {:.1}%",
        "Hit probability",
        pricing.combined_hit_prob * 100.0
    );
}

fn show_sgp(
    slate: &Slate,
    matchup_id: &str,
    estimates: Option<&ProbabilityEstimates>,
    config: &SelectorConfig,
) -> Result<()> {
    let (title, legs) = matchup_legs(slate, matchup_id)?;
    println!("{}: {}", "Best SGP".green(), title);
    println!();
    print_selection(&select_best_sgp(&legs, estimates, config));
    Ok(())
}

fn print_selection(selection: &SgpSelection) {
    if selection.is_empty() {
        println!("{}", "No eligible legs.".dimmed());
        return;
    }

    println!(
        "{:<36} {:>7} {:>6} {:>8} {:>9}",
        "Leg", "Odds", "Score", "Implied", "Composite"
    );
    println!("{}", "-".repeat(70));
    for ranked in &selection.legs {
        println!(
            "{:<36} {:>7} {:>6} {:>7.1}% {:>9.1}",
            truncate_label(&ranked.leg.label, 36),
            format_american(ranked.leg.odds),
            ranked.value_score,
            ranked.implied_probability * 100.0,
            ranked.composite
        );
    }
    if selection.legs.len() < 2 {
        println!("{}", "(fewer than two eligible legs)".dimmed());
    }
    println!();

    if let Some(pricing) = &selection.pricing {
        print_pricing(pricing);
    }
    if let Some(confidence) = selection.confidence {
        println!("  {:<20} {}", "Confidence", confidence);
    }
}

fn show_slate(slate: &Slate, config: &SelectorConfig) {
    if slate.is_empty() {
        println!("{}", "Snapshot has no matchups.".red());
        return;
    }

    println!("{}", "Best SGP per matchup:".yellow().bold());
    println!(
        "{:<14} {:<36} {:>5} {:>8} {:>5}",
        "Id", "Matchup", "Legs", "Price", "Conf"
    );
    println!("{}", "-".repeat(72));

    for result in best_sgp_for_slate(&slate.events, config) {
        let selection = &result.selection;
        let (price, confidence) = match (&selection.pricing, selection.confidence) {
            (Some(p), Some(c)) => (format_american(p.combined_american), c.to_string()),
            _ => ("-".to_string(), "-".to_string()),
        };
        println!(
            "{:<14} {:<36} {:>5} {:>8} {:>5}",
            truncate_label(&result.matchup_id, 14),
            truncate_label(&result.title, 36),
            selection.legs.len(),
            price,
            confidence
        );
        if !selection.is_empty() {
            println!("{}", format!("  {}", selection.leg_ids().join(" + ")).dimmed());
        }
    }
}

fn show_picks(slate: &Slate, matchup_id: &str) -> Result<()> {
    let (title, legs) = matchup_legs(slate, matchup_id)?;
    println!("{}: {}", "Picks".green(), title);
    println!();

    let picks = picks_feed(&legs);
    if picks.is_empty() {
        println!("{}", "No two-sided markets to pick from.".dimmed());
        return Ok(());
    }

    for pick in &picks {
        println!(
            "  {:<10} {:<36} {:>7}  conf {}",
            format!("{:?}", pick.kind),
            truncate_label(&pick.leg.label, 36),
            format_american(pick.leg.odds),
            pick.confidence
        );
    }
    Ok(())
}

/// Interactive parlay builder
fn run_interactive(slate: &Slate) -> Result<()> {
    println!("{}", "Interactive mode".green().bold());
    println!();

    if slate.is_empty() {
        println!("{}", "Snapshot has no matchups.".red());
        return Ok(());
    }

    let theme = ColorfulTheme::default();
    let titles: Vec<String> = slate
        .events
        .iter()
        .map(|m| format!("{} ({})", m.title(), m.id))
        .collect();

    loop {
        let mut options: Vec<String> = titles.clone();
        options.push("Quit".to_string());

        let choice = Select::with_theme(&theme)
            .with_prompt("Choose a matchup")
            .items(&options)
            .default(0)
            .interact()?;
        if choice == titles.len() {
            println!("Goodbye!");
            break;
        }

        let matchup = &slate.events[choice];
        let legs = normalize_matchup(matchup);
        if legs.is_empty() {
            println!("{}", "No priced legs for this matchup.".red());
            continue;
        }

        let items: Vec<String> = legs
            .iter()
            .map(|l| format!("{:<36} {:>7}", l.label, format_american(l.odds)))
            .collect();
        let mut combo = Combo::new();

        loop {
            let defaults: Vec<bool> = legs.iter().map(|l| combo.contains(&l.id)).collect();
            let chosen = MultiSelect::with_theme(&theme)
                .with_prompt("Toggle legs (space), confirm (enter)")
                .items(&items)
                .defaults(&defaults)
                .interact()?;

            combo.clear();
            for i in chosen {
                combo.insert(legs[i].clone());
            }

            let stake: f64 = Input::with_theme(&theme)
                .with_prompt("Stake")
                .default(DEFAULT_STAKE)
                .interact_text()?;

            println!();
            if let Err(e) = print_combo(&combo, stake) {
                println!("{}: {}", "Error".red(), e);
            }
            println!();

            let next = Select::with_theme(&theme)
                .with_prompt("Next")
                .items(&["Edit legs", "Another matchup"])
                .default(0)
                .interact()?;
            if next == 1 {
                break;
            }
        }
    }

    Ok(())
}

fn format_ev(ev: f64, stake: f64) -> String {
    let text = format!("{:+.2} on {:.2}", ev, stake);
    if ev > 0.0 {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}

fn ids(legs: &[Leg]) -> String {
    legs.iter()
        .map(|l| l.id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Truncate label to fit display width
fn truncate_label(label: &str, max_len: usize) -> String {
    let chars: Vec<char> = label.chars().collect();
    if chars.len() <= max_len {
        label.to_string()
    } else {
        chars[..max_len - 1].iter().collect::<String>() + "…"
    }
}
