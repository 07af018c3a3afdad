use std::{process::ExitCode, sync::Arc};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use legbalancer::{
    config::{CliArgs, Config},
    reconciler,
    replay::{self, ReplayError},
    search::AccountSearch,
    store::DraftStore,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliArgs::parse();
    let config = Config::load(&cli);
    init_tracing(&config);

    match run(&cli, &config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            tracing::error!(error = %e, "Replay failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    if config.logging.json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Replays the script and prints the review. `Ok(false)` means the draft
/// could not enter review.
async fn run(cli: &CliArgs, config: &Config) -> Result<bool, ReplayError> {
    let directory = Arc::new(config.build_directory()?);
    let search = AccountSearch::new(directory.clone(), config.search_settings());
    let mut store = DraftStore::new(directory);

    let actions = replay::parse_script(&std::fs::read_to_string(&cli.script)?)?;
    tracing::info!(script = %cli.script, actions = actions.len(), "Replaying draft actions");
    let picked = replay::replay(&mut store, &search, actions).await?;

    let balance = store.balance();
    println!("{}", balance);
    for warning in reconciler::leg_warnings(store.draft(), &picked) {
        tracing::warn!(?warning, "Leg warning");
    }

    match store.finalize() {
        Ok(payload) => {
            print!("{}", payload);
            if cli.json_payload {
                println!("{}", serde_json::to_string_pretty(&payload)?);
            }
            Ok(true)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Draft cannot enter review");
            Ok(false)
        }
    }
}
