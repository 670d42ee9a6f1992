//! fooddb CLI entry point.

use clap::Parser;

use fooddb::cli::{handle_error, Cli, Commands};
use fooddb::domain::models::Config;
use fooddb::infrastructure::config::ConfigLoader;
use fooddb::infrastructure::logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    logging::init(&config.logging);

    let result = match cli.command {
        Commands::Init => fooddb::cli::commands::init::execute(&config, cli.json).await,
        Commands::Embed(args) => fooddb::cli::commands::embed::execute(args, config, cli.json).await,
        Commands::Search(args) => {
            fooddb::cli::commands::search::execute(args, config, cli.json).await
        }
        Commands::Stats => fooddb::cli::commands::stats::execute(&config, cli.json).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    if let Some(db) = &cli.db {
        config.database.path = db.clone();
        ConfigLoader::validate(&config)?;
    }

    Ok(config)
}
