// Ledger node - P2P server plus interactive console

use clap::Parser;
use powledger::{Cli, Console, Ledger, Node, NodeError, SharedLedger};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), NodeError> {
    let config = cli.into_config()?;
    log::info!("Starting node {} (difficulty {})", config.name, config.difficulty);

    let ledger = SharedLedger::new(Ledger::new(config.difficulty));
    let node = Node::new(&config, ledger);

    let listener = Node::bind(config.listen_addr).await?;
    let server = node.clone();
    tokio::spawn(async move {
        if let Err(e) = server.serve(listener).await {
            log::error!("Server stopped: {}", e);
        }
    });

    if config.peer.is_some() {
        if let Err(e) = node.request_chain().await {
            log::warn!("Initial chain request failed: {}", e);
        }
    }

    Console::new(node).run().await
}
