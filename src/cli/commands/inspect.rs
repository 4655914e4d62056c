//! Inspect command - Table sizes and per-state action values

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;

use crate::{
    app::App,
    cli::output::{format_number, print_kv, print_section, print_subsection},
    identifiers::StateId,
    ports::{IdentityStore, ValueStore},
    value::{RecommendationFloor, recommend},
};

#[derive(Parser, Debug)]
#[command(about = "Inspect a trained value store")]
pub struct InspectArgs {
    /// SQLite database holding identities and values
    #[arg(long)]
    pub db: PathBuf,

    /// Show the encoding and action values of this state
    #[arg(long)]
    pub state: Option<u64>,

    /// Recommend the best recorded action even when its value is negative
    #[arg(long)]
    pub allow_negative: bool,
}

pub fn execute(args: InspectArgs) -> Result<()> {
    let app = App::open(&args.db)
        .with_context(|| format!("Failed to open store {}", args.db.display()))?;
    let store = app.store();

    print_section("Value store");
    print_kv("Store", &args.db.display().to_string());
    print_kv("States", &format_number(store.state_count()));
    print_kv("Actions", &format_number(store.action_count()));
    print_kv("Valued states", &format_number(store.recorded_state_count()));
    print_kv("Value entries", &format_number(store.value_count()));

    let Some(raw) = args.state else {
        return Ok(());
    };

    let state = StateId::new(raw);
    let codec = app.identity_codec();
    let encoding = codec
        .state_encoding(state)?
        .ok_or_else(|| anyhow!("State {state} is not in the store"))?;

    print_subsection(&format!("State {state}"));
    println!("  {encoding}");

    let values = store.action_values(state);
    if values.is_empty() {
        println!("\n  No action values recorded.");
        return Ok(());
    }

    let floor = if args.allow_negative {
        RecommendationFloor::NegativeInfinity
    } else {
        RecommendationFloor::Zero
    };
    let recommendation = recommend(&values, floor);

    print_subsection("Action values (first seen first)");
    for (action_id, value) in &values {
        let label = match codec.action(*action_id)? {
            Some(action) => action.to_string(),
            None => "<unknown>".to_string(),
        };
        let marker = if recommendation.action == Some(*action_id) {
            "*"
        } else {
            " "
        };
        println!(
            "  {marker} {:>6}  {label:24} {value:>12.4}",
            action_id.value()
        );
    }

    match recommendation.action {
        Some(action_id) => print_kv(
            "Recommended",
            &format!("{action_id} ({:.4})", recommendation.value),
        ),
        None => print_kv("Recommended", "none"),
    }

    Ok(())
}
