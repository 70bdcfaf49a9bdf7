use clap::Parser;
use log::info;
use server::config::{parse_probability, GameConfig, ImageSet};
use server::game::GameEngine;
use server::network::{Server, ServerError};
use shared::{CoinCatalog, HAZARD_CHANCE, ROUND_DURATION_SECS, STARTING_LIVES};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Length of a game session in seconds
    #[arg(short, long, default_value_t = ROUND_DURATION_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    round_duration: u64,

    /// Lives at the start of each game
    #[arg(short, long, default_value_t = STARTING_LIVES, value_parser = clap::value_parser!(i64).range(1..))]
    lives: i64,

    /// Probability that a round offers the hazard coin
    #[arg(long, default_value_t = HAZARD_CHANCE, value_parser = parse_probability)]
    hazard_chance: f64,

    /// Seconds between request statistics log lines
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u64).range(1..))]
    stats_interval: u64,
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let config = GameConfig {
        round_duration: Duration::from_secs(args.round_duration),
        starting_lives: args.lives,
        hazard_chance: args.hazard_chance,
        images: ImageSet::default(),
    };
    let engine = GameEngine::new(config, CoinCatalog::standard());
    info!(
        "Loaded {} coins, hazard is {}",
        engine.catalog().coins().len(),
        engine.catalog().hazard().name
    );

    let address = format!("{}:{}", args.host, args.port);
    let mut server = Server::new(&address, engine, Duration::from_secs(args.stats_interval)).await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
