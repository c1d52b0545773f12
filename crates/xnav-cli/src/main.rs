mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use xnav_cli::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about = "X-Plane navigation data utilities")]
struct Cli {
    /// X-Plane installation directory. Defaults to XNAV_XPLANE_ROOT, then the
    /// installation recorded by the X-Plane installer.
    #[arg(long, global = true)]
    xplane_root: Option<PathBuf>,

    /// Extra apt.dat file loaded after the installation's airports (repeatable).
    #[arg(long = "apt", global = true)]
    apt: Vec<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Count the loaded regions, airports, fixes, airways and procedures.
    Summary,
    /// Show runways, frequencies and procedures of an airport.
    Airport {
        /// Airport identifier, e.g. KSEA.
        id: String,
    },
    /// List fixes and navaids with an identifier.
    Fix {
        /// Fix identifier.
        id: String,
        /// Only show the fix in this ICAO region.
        #[arg(long)]
        region: Option<String>,
    },
    /// Show the segments of an airway on every level it exists.
    Airway {
        /// Airway name, e.g. V12.
        name: String,
    },
    /// Search airports by identifier, ICAO code or name.
    Search {
        query: String,
        /// Maximum number of results.
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// List the airports closest to a position.
    Nearest {
        /// Latitude in decimal degrees.
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// Longitude in decimal degrees.
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// Number of airports to list.
        #[arg(long, default_value_t = 5)]
        count: usize,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let world = commands::load_world_for(cli.xplane_root.as_deref(), &cli.apt)?;
    let format = cli.format;

    match cli.command {
        Command::Summary => commands::summary::handle_summary(&world, format),
        Command::Airport { id } => commands::airport::handle_airport(&world, &id, format),
        Command::Fix { id, region } => {
            commands::navigation::handle_fix(&world, &id, region.as_deref(), format)
        }
        Command::Airway { name } => commands::navigation::handle_airway(&world, &name, format),
        Command::Search { query, limit } => {
            commands::airport::handle_search(&world, &query, limit, format)
        }
        Command::Nearest { lat, lon, count } => {
            commands::airport::handle_nearest(&world, lat, lon, count, format)
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
