//! pocket-cli - PocketLibrary from the terminal

use anyhow::Context;
use clap::{Parser, Subcommand};
use pocket_kernel::settings::Settings;
use pocket_library::modules::catalog::{self, models::Coordinate};
use pocket_library::modules::fines::ledger::FineLedger;
use serde::Serialize;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "pocket-cli")]
#[command(version, about = "Search the catalog, find branches and manage fines")]
struct Cli {
    /// Serve catalog results from the bundled sample data only
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search books by title, author, genre or ISBN
    Search {
        /// Search text; empty lists the whole sample catalog
        #[arg(default_value = "")]
        query: String,
    },
    /// Browse a genre
    Genre { genre: String },
    /// Branches within a radius, nearest first
    Branches {
        #[arg(long, allow_negative_numbers = true)]
        lat: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        lon: Option<f64>,
        #[arg(long)]
        radius_km: Option<f64>,
    },
    /// Reviews of a book, newest first
    Reviews { book_id: Uuid },
    /// Fine history
    Fines {
        #[command(subcommand)]
        command: FineCommands,
    },
}

#[derive(Subcommand)]
enum FineCommands {
    /// Outstanding fines and their total
    List,
    /// Record a fine
    Add {
        title: String,
        #[arg(allow_negative_numbers = true)]
        amount: f64,
    },
    /// Pay every outstanding fine
    Pay,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load PocketLibrary settings")?;
    pocket_telemetry::init(&settings.telemetry)?;
    settings.catalog.offline |= cli.offline;
    tracing::debug!(
        env = ?settings.environment,
        offline = settings.catalog.offline,
        "pocket-cli starting"
    );

    match cli.command {
        Commands::Search { query } => {
            let facade = catalog::build_facade(&settings.catalog)?;
            print_json(&facade.search_books(&query).await)
        }
        Commands::Genre { genre } => {
            let facade = catalog::build_facade(&settings.catalog)?;
            print_json(&facade.browse_genre(&genre).await)
        }
        Commands::Branches {
            lat,
            lon,
            radius_km,
        } => branches(&settings, lat, lon, radius_km),
        Commands::Reviews { book_id } => {
            let facade = catalog::build_facade(&settings.catalog)?;
            print_json(&facade.fetch_reviews(book_id).await)
        }
        Commands::Fines { command } => run_fines(&settings, command).await,
    }
}

fn branches(
    settings: &Settings,
    lat: Option<f64>,
    lon: Option<f64>,
    radius_km: Option<f64>,
) -> anyhow::Result<()> {
    let origin = Coordinate::new(
        lat.unwrap_or(settings.catalog.default_latitude),
        lon.unwrap_or(settings.catalog.default_longitude),
    );
    anyhow::ensure!(origin.is_valid(), "coordinate is out of range");
    let radius_km = radius_km.unwrap_or(settings.catalog.default_radius_km);
    anyhow::ensure!(
        radius_km.is_finite() && radius_km >= 0.0,
        "radius must be a non-negative number"
    );

    let facade = catalog::build_facade(&settings.catalog)?;
    print_json(&facade.nearby_branches(origin, radius_km))
}

async fn run_fines(settings: &Settings, command: FineCommands) -> anyhow::Result<()> {
    let ledger = FineLedger::from_settings(&settings.fines);
    ledger.load().await;

    match command {
        FineCommands::List => print_json(&ledger.summary().await),
        FineCommands::Add { title, amount } => {
            let fine = ledger
                .add_fine(&title, amount)
                .await
                .with_context(|| format!("failed to record fine for '{}'", title))?;
            print_json(&fine)
        }
        FineCommands::Pay => {
            let paid = ledger.pay_all().await.context("failed to pay fines")?;
            print_json(&serde_json::json!({ "paid": paid }))
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{}", rendered);
    Ok(())
}
