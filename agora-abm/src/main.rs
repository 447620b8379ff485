use agora_abm::{SimulationConfig, SimulationDriver};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn print_help() {
    eprintln!(
        r#"agora-abm - agent-based market microstructure simulator

USAGE:
    agora-abm

All parameters are compile-time constants; per-run analysis CSVs are
written to the output/ directory (wiped at start).

ENVIRONMENT VARIABLES:
    RUST_LOG    Log level filter (default: agora_abm=info)
"#
    );
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agora_abm=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if std::env::args().skip(1).any(|a| a == "--help" || a == "-h") {
        print_help();
        return;
    }

    let config = SimulationConfig::default();
    info!(
        runs = config.runs,
        timesteps = config.timesteps,
        agents = config.population.total(),
        "starting simulation"
    );

    if let Err(e) = SimulationDriver::new(config).run() {
        error!(error = %e, "simulation aborted");
        std::process::exit(1);
    }
}
