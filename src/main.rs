// src/main.rs

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use pkgapp::Config;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{CategoryCommands, Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Completions need no apps directory
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "pkgapp", &mut std::io::stdout());
        return Ok(());
    }

    let config = Config::resolve(cli.dir, cli.config.as_deref())?;

    match cli.command {
        Commands::Refresh { app, package, json } => {
            commands::cmd_refresh(&config, app.as_deref(), package.as_deref(), json)
        }
        Commands::Status { app } => commands::cmd_status(&config, &app),
        Commands::SetStatus { app, status } => commands::cmd_set_status(&config, &app, status),
        Commands::List { filter } => commands::cmd_list(&config, filter),
        Commands::Category(cmd) => match cmd {
            CategoryCommands::Get { app } => commands::cmd_category_get(&config, &app),
            CategoryCommands::Set { app, category } => {
                commands::cmd_category_set(&config, &app, &category)
            }
            CategoryCommands::Apps { category } => commands::cmd_category_apps(&config, &category),
        },
        Commands::RequiredPackages { app } => commands::cmd_required_packages(&config, &app),
        Commands::Query { packages } => commands::cmd_query(&config, &packages),
        Commands::Ping { app, trigger } => commands::cmd_ping(&config, &app, trigger),
        Commands::Completions { .. } => Ok(()),
    }
}
