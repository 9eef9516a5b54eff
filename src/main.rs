use clap::{Parser, Subcommand};
use geoser::cli_commands;
use std::process::ExitCode;

/// Convert WKT geometries to their token stream, normalised WKT or GeoJSON
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the WKT tokens of a geometry, one per line
    Tokens {
        /// Geometry in WKT or EWKT (SRID=4326;POINT (1 2))
        wkt: String,
    },
    /// Print the geometry back as normalised WKT
    Wkt { wkt: String },
    /// Print the geometry as GeoJSON
    Geojson {
        wkt: String,

        /// Leave out the "crs" member
        #[arg(long)]
        suppress_crs: bool,

        /// Indent the output
        #[arg(long)]
        pretty: bool,

        /// Reference system to report, as AUTHORITY:CODE
        #[arg(long)]
        crs: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Tokens { wkt } => cli_commands::show_tokens(wkt),
        Command::Wkt { wkt } => cli_commands::normalize_wkt(wkt),
        Command::Geojson {
            wkt,
            suppress_crs,
            pretty,
            crs,
        } => cli_commands::print_geojson(wkt, suppress_crs, pretty, crs),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{msg}");
            ExitCode::FAILURE
        }
    }
}
