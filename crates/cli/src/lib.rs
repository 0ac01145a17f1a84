pub mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use platewise_core::config::{AppConfig, LoadOptions};

#[derive(Debug, Parser)]
#[command(
    name = "platewise",
    about = "Platewise operator CLI",
    long_about = "Operate the Platewise recommendation engine: migrations, demo fixtures, \
                  and recommendation queries against the configured database.",
    after_help = "Examples:\n  platewise migrate\n  platewise seed\n  platewise recommend --limit 5\n  platewise fbt --item <uuid>"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic demo menu and order fixtures")]
    Seed,
    #[command(about = "Rank menu items for the given cart using the balanced strategy")]
    Recommend(commands::recommend::RecommendArgs),
    #[command(about = "List items frequently bought together with one menu item")]
    Fbt(commands::fbt::FbtArgs),
    #[command(about = "Rank margin-weighted additions for the given cart")]
    Upsell(commands::recommend::CartArgs),
    #[command(
        name = "cross-sell",
        about = "Rank additions from menu sections not yet represented in the cart"
    )]
    CrossSell(commands::recommend::CartArgs),
    #[command(about = "Print the effective configuration as JSON")]
    Config,
}

fn init_logging(config: &AppConfig) {
    use platewise_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    if let Ok(config) = AppConfig::load(LoadOptions::default()) {
        init_logging(&config);
    }

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Recommend(args) => commands::recommend::run(args),
        Command::Fbt(args) => commands::fbt::run(args),
        Command::Upsell(args) => commands::recommend::run_upsell(args),
        Command::CrossSell(args) => commands::recommend::run_cross_sell(args),
        Command::Config => commands::config::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
