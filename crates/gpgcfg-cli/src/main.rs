mod cli;
mod config_gen;
mod dispatch;
mod table;

use clap::Parser;

use gpgcfg_core::config;

use cli::{Cli, Commands};
use config_gen::run_config_generate;
use dispatch::dispatch_command;

fn main() {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // `config` writes the settings file, so it must not need one
    if let Commands::Config { dest } = &cli.command {
        if let Err(e) = run_config_generate(dest.as_deref()) {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        return;
    }

    let settings = match config::load_resolved(cli.config.as_deref()) {
        Ok((settings, source)) => {
            match source {
                Some(source) => tracing::info!("Using settings: {source}"),
                None => tracing::debug!("no settings file found, using defaults"),
            }
            settings
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    tracing::debug!("running command '{}'", cli.command.name());
    if let Err(e) = dispatch_command(&cli.command, &settings) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
