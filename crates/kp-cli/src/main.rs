//! CLI frontend for the Kingpin economy.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use kp_economy::ActionKind;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "kingpin",
    about = "Kingpin: hustle, deal, and buy your way to the top",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(flatten)]
    session: SessionArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Who is playing, and where the game state lives.
#[derive(Args)]
struct SessionArgs {
    /// Group (server) id
    #[arg(short, long, global = true, default_value = "1")]
    group: u64,

    /// Player id
    #[arg(short, long, global = true, default_value = "1")]
    player: u64,

    /// Directory holding the saved game state
    #[arg(short, long, global = true, default_value = "kingpin-data")]
    data_dir: PathBuf,

    /// Economy config file (default: built-in)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Beg on the street for spare change
    Beg,

    /// Work a shift for steady pay
    Work,

    /// Do a risky favor for someone dangerous
    Favor,

    /// Cook up a batch of a substance
    Produce {
        /// Substance name (e.g. weed)
        substance: String,
    },

    /// Sell your entire stash
    Sell,

    /// Show your stash and rank progress
    Stash,

    /// Buy a property by catalog number
    Buy {
        /// Catalog number, as shown by `catalog`
        index: usize,
    },

    /// Collect income from your properties
    Collect,

    /// List the properties you own
    Properties,

    /// Show every property for sale
    Catalog,

    /// Show your balance
    Balance,

    /// Show the richest players in the group
    Top {
        /// How many players to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = commands::Session::open(
        &cli.session.data_dir,
        cli.session.config.as_deref(),
        cli.session.group,
        cli.session.player,
    )
    .and_then(|session| match cli.command {
        Commands::Beg => commands::action::run(&session, ActionKind::Beg),
        Commands::Work => commands::action::run(&session, ActionKind::Work),
        Commands::Favor => commands::action::run(&session, ActionKind::Favor),
        Commands::Produce { substance } => commands::stash::produce(&session, &substance),
        Commands::Sell => commands::stash::sell(&session),
        Commands::Stash => commands::stash::show(&session),
        Commands::Buy { index } => commands::property::buy(&session, index),
        Commands::Collect => commands::property::collect(&session),
        Commands::Properties => commands::property::owned(&session),
        Commands::Catalog => commands::property::catalog(&session),
        Commands::Balance => commands::balance::show(&session),
        Commands::Top { limit } => commands::balance::top(&session, limit),
    });

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
