use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use transit_route::formats::TransitDbFile;
use transit_route::ingest::load_network;
use transit_route::{RouteItem, TransitRouter};

#[derive(Parser)]
#[command(name = "transit-route")]
#[command(about = "Fastest-route queries over a stop/bus-line transit network", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the routable network from a JSON description and persist it
    Build {
        /// Network description (stops, distances, bus lines, settings)
        #[arg(long)]
        network: PathBuf,
        /// Output transit.db file
        #[arg(long)]
        out: PathBuf,
    },
    /// Answer a fastest-route query against a persisted network
    Route {
        /// Persisted transit.db file
        #[arg(long)]
        db: PathBuf,
        /// Departure stop name
        #[arg(long)]
        from: String,
        /// Destination stop name
        #[arg(long)]
        to: String,
    },
    /// Verify the checksums of a persisted network file
    Verify {
        /// Persisted transit.db file
        #[arg(long)]
        db: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build { network, out } => {
            println!("Building routable network from {}", network.display());
            let (catalogue, settings) = load_network(&network)?;
            println!(
                "  {} stops, {} bus lines",
                catalogue.stops().len(),
                catalogue.buses().len()
            );

            let router = TransitRouter::build(&catalogue, settings);
            println!(
                "  graph: {} vertices, {} edges",
                router.graph().vertex_count(),
                router.graph().edge_count()
            );

            TransitDbFile::write(&out, &catalogue, &router)?;
            println!("Wrote {}", out.display());
        }
        Commands::Route { db, from, to } => {
            let (catalogue, router) = TransitDbFile::read(&db)?;
            match router.query(&catalogue, &from, &to)? {
                Some(route) => {
                    println!("Total time: {:.2} min", route.total_time);
                    for item in &route.items {
                        match item {
                            RouteItem::Wait { stop_name, time } => {
                                println!("  wait at {stop_name}: {time:.2} min");
                            }
                            RouteItem::Ride {
                                bus_name,
                                span_count,
                                time,
                            } => {
                                println!("  ride bus {bus_name} ({span_count} stops): {time:.2} min");
                            }
                        }
                    }
                }
                None => {
                    println!("No route from {from} to {to}");
                }
            }
        }
        Commands::Verify { db } => {
            TransitDbFile::verify(&db)?;
            println!("{}: CRC-64 verified", db.display());
        }
    }

    Ok(())
}
