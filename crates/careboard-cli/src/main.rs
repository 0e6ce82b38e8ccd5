mod cli;
mod commands;
mod config;
mod output;
mod wiring;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use output::print_error;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let profile = &cli.profile;
    let format = cli.format.unwrap_or_default();

    match &cli.command {
        Commands::Config(args) => match &args.command {
            cli::ConfigCommands::Show => {
                let cfg = config::load_profile(profile)?;
                println!("{}: {}", "Profile".cyan(), profile);
                println!(
                    "{}: {}",
                    "Base URL".cyan(),
                    cfg.base_url.as_deref().unwrap_or("(not set)")
                );
                println!(
                    "{}: {}",
                    "Format".cyan(),
                    cfg.format.as_deref().unwrap_or("json")
                );
            }
            cli::ConfigCommands::Set(set_args) => {
                let mut cfg = config::load_profile(profile)?;
                match set_args.key.as_str() {
                    "base_url" => cfg.base_url = Some(set_args.value.clone()),
                    "format" => cfg.format = Some(set_args.value.clone()),
                    other => {
                        anyhow::bail!("Unknown config key: {other}. Valid keys: base_url, format")
                    }
                }
                config::save_profile(profile, &cfg)?;
                output::print_success(&format!("Set {} = {}", set_args.key, set_args.value));
            }
        },
        Commands::Pages => {
            let stack = make_stack(&cli).await?;
            commands::pages(&stack.models).await?;
        }
        Commands::Load(args) => {
            let stack = make_stack(&cli).await?;
            commands::load(&stack.models, args, format).await?;
        }
        Commands::Invalidate(args) => {
            let stack = make_stack(&cli).await?;
            commands::invalidate(&stack.models, args.page.as_deref()).await?;
        }
        Commands::Create(args) => {
            let stack = make_stack(&cli).await?;
            commands::create(&stack, args, format).await?;
        }
    }

    Ok(())
}

async fn make_stack(cli: &Cli) -> Result<wiring::Stack> {
    let base_url = config::resolve_base_url(&cli.base_url, &cli.profile)?;
    wiring::build_stack(base_url, cli.mock).await
}
