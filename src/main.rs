use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use biosim::{engine::EngineBuilder, scenario::ScenarioLoader};

#[derive(Debug, Parser)]
#[command(author, version, about = "Island herbivore/carnivore population simulator")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/small_island.yaml")]
    scenario: PathBuf,

    /// Override the number of simulated years
    #[arg(long)]
    years: Option<u64>,

    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,

    /// Print the yearly summaries as JSON instead of text lines
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let scenario = loader.load(&cli.scenario)?;
    if let Some(description) = &scenario.description {
        info!(scenario = %scenario.name, %description, "loaded scenario");
    }
    let mut world = scenario.build_world()?;
    let years = scenario.years(cli.years);

    let mut engine = EngineBuilder::new(scenario.engine_settings(cli.seed)?)
        .with_annual_cycle()
        .build();
    engine.populate(&mut world, &scenario.population)?;
    let census = world.census();
    info!(
        herbivores = census.herbivores,
        carnivores = census.carnivores,
        "island populated"
    );

    let mut summaries = Vec::new();
    engine.run_with_hook(&mut world, years, |summary| {
        if !cli.json {
            println!(
                "Year {:>4}: herbivores {:>6}, carnivores {:>6} (births {}, deaths {}, kills {})",
                summary.year,
                summary.herbivores,
                summary.carnivores,
                summary.births,
                summary.deaths,
                summary.kills
            );
        }
        summaries.push(*summary);
    })?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        println!(
            "Scenario '{}' completed after {} years. Final population: {}",
            scenario.name,
            world.year(),
            world.census().total()
        );
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
