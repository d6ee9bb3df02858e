use clap::Parser;
use roster_server::{logging, AppState, Server};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "roster-server")]
#[command(about = "Name roster with recency-aware random drawing")]
struct Cli {
    #[arg(long, help = "Address and port to listen on", default_value_t = String::from("127.0.0.1:7070"))]
    addr: String,
    #[arg(long, help = "Directory for persisted state (default: ~/.roster)")]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_stdout_logger();
    let cli = Cli::parse();

    let data_dir = cli.data_dir.unwrap_or_else(roster_core::data_dir);
    let state = AppState::open(&data_dir)?;
    let server = Server::bind(cli.addr.as_str(), state.shared()).await?;
    log::info!("listening on {}", server.local_addr());
    server.run().await?;
    Ok(())
}
