use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ecsim::scenario::ScenarioLoader;

#[derive(Debug, Parser)]
#[command(author, version, about = "Entity-component simulation runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/drop_test.yaml")]
    scenario: PathBuf,

    /// Override tick count (uses scenario default when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Log filter, e.g. `debug` or `ecsim::ecs=trace`; wins over RUST_LOG
    #[arg(long)]
    log_level: Option<String>,

    /// Print the run report as JSON
    #[arg(long)]
    report: bool,
}

fn init_logging(cli_level: Option<&str>, scenario_level: &str) {
    let filter = match cli_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(scenario_level)),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let scenario = loader.load(&cli.scenario)?;
    init_logging(cli.log_level.as_deref(), &scenario.logging.level);
    info!(
        scenario = %scenario.name,
        description = scenario.description.as_deref().unwrap_or(""),
        bodies = scenario.bodies.len(),
        launchers = scenario.launchers.len(),
        "scenario loaded"
    );

    let mut registry = scenario.build_registry()?;
    let ticks = scenario.ticks(cli.ticks);
    let mut engine = scenario.engine_builder().build();

    let report = engine.run(&mut registry, ticks)?;
    if cli.report {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Scenario '{}' completed for {} ticks. Live entities: {} (avg tick {:.3} ms)",
            report.scenario, report.ticks, report.final_entity_count, report.average_tick_ms
        );
    }
    Ok(())
}
