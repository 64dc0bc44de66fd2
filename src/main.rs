use clap::Parser;
use log::info;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use seabattle::{init_logging, Router, Server, DEFAULT_BIND};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = DEFAULT_BIND)]
    bind: String,
    /// Fix the RNG seed for reproducible turn draws and random attacks.
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Args::parse();

    let router = match args.seed {
        Some(seed) => Router::with_rng(SmallRng::seed_from_u64(seed)),
        None => Router::new(),
    };
    let server = Server::new(router);

    tokio::select! {
        result = server.run(&args.bind) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
            Ok(())
        }
    }
}
