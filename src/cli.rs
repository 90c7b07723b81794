// CLI arguments and interactive console commands

use clap::Parser;
use crate::config::NodeConfig;
use crate::core::Transaction;
use crate::error::{NodeError, Result};
use crate::network::{Message, Node};
use std::net::{SocketAddr, ToSocketAddrs};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[derive(Parser)]
#[command(name = "powledger")]
#[command(about = "Educational proof-of-work ledger node", long_about = None)]
pub struct Cli {
    /// Name this node uses when talking to its peer
    #[arg(long, default_value = "Node")]
    pub name: String,

    /// Port to listen on for peer connections
    #[arg(long, default_value_t = 3000)]
    pub port: u16,

    /// Address (host:port) of the peer node to connect to
    #[arg(long)]
    pub connect: Option<String>,

    /// Leading zero hex characters required of mined blocks
    #[arg(long, default_value_t = 2)]
    pub difficulty: usize,
}

impl Cli {
    /// Resolve and validate the arguments into a node configuration
    pub fn into_config(self) -> Result<NodeConfig> {
        let peer = match self.connect.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(addr) => Some(resolve(addr)?),
        };

        let config = NodeConfig {
            name: self.name,
            listen_addr: SocketAddr::from(([0, 0, 0, 0], self.port)),
            peer,
            difficulty: self.difficulty,
        };
        config.validate()?;
        Ok(config)
    }
}

fn resolve(addr: &str) -> Result<SocketAddr> {
    addr.to_socket_addrs()
        .map_err(|e| NodeError::Config(format!("Invalid peer address {}: {}", addr, e)))?
        .next()
        .ok_or_else(|| NodeError::Config(format!("Peer address {} did not resolve", addr)))
}

const SEND_USAGE: &str = "Invalid command format. Use: send from,to,amount (e.g. send mel,kike,10)";

/// Console command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Mine a block for a transfer and broadcast it
    Send { from: String, to: String, amount: f64 },
    /// Ask the peer for its chain
    RequestChain,
    /// Print the local chain
    PrintChain,
    /// Check the local chain
    Validate,
    /// Leave the console
    Quit,
    /// Anything else is sent to the peer as chat
    Chat(String),
}

impl Command {
    /// Parse one console line; blank lines yield `None`
    pub fn parse(line: &str) -> std::result::Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let command = match word {
            "send" => Self::parse_send(rest.trim())?,
            "request_chain" => Command::RequestChain,
            "chain" => Command::PrintChain,
            "validate" => Command::Validate,
            "quit" | "exit" => Command::Quit,
            _ => Command::Chat(line.to_string()),
        };
        Ok(Some(command))
    }

    fn parse_send(details: &str) -> std::result::Result<Self, String> {
        let parts: Vec<&str> = details.split(',').map(str::trim).collect();
        let [from, to, amount] = parts.as_slice() else {
            return Err(SEND_USAGE.to_string());
        };
        if from.is_empty() || to.is_empty() {
            return Err(SEND_USAGE.to_string());
        }

        let amount: f64 = amount
            .parse()
            .map_err(|_| format!("Invalid amount: {}", amount))?;
        if !amount.is_finite() {
            return Err(format!("Invalid amount: {}", amount));
        }

        Ok(Command::Send {
            from: from.to_string(),
            to: to.to_string(),
            amount,
        })
    }
}

/// Interactive console driving a node from stdin
pub struct Console {
    node: Node,
}

impl Console {
    pub fn new(node: Node) -> Self {
        Self { node }
    }

    /// Read and execute commands until `quit` or end of input
    pub async fn run(&self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        loop {
            stdout.write_all(b"> ").await?;
            stdout.flush().await?;

            let Some(line) = lines.next_line().await? else {
                return Ok(());
            };

            let command = match Command::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(usage) => {
                    println!("{}", usage);
                    continue;
                }
            };

            match self.execute(command).await {
                Ok(true) => {}
                Ok(false) => return Ok(()),
                Err(e) => println!("Error: {}", e),
            }
        }
    }

    /// Execute one command; returns false when the console should stop
    pub async fn execute(&self, command: Command) -> Result<bool> {
        match command {
            Command::Send { from, to, amount } => {
                let block = self.node.ledger.add_block(Transaction::new(from, to, amount)).await?;
                println!("New block added to the blockchain");
                self.node.print_chain().await;
                self.node.broadcast_block(&block).await?;
            }
            Command::RequestChain => {
                if self.node.peer.is_none() {
                    println!("No remote node address specified. Unable to request the blockchain.");
                } else {
                    println!("Requesting latest blockchain from network...");
                    self.node.request_chain().await?;
                }
            }
            Command::PrintChain => self.node.print_chain().await,
            Command::Validate => {
                if self.node.ledger.is_valid().await {
                    println!("Blockchain is valid ({} blocks)", self.node.ledger.len().await);
                } else {
                    println!("Blockchain is INVALID");
                }
            }
            Command::Quit => return Ok(false),
            Command::Chat(text) => {
                if self.node.peer.is_none() {
                    println!("No remote node address specified. Unable to send the message.");
                } else {
                    self.node.send_to_peer(Message::Chat(text)).await?;
                }
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Ledger, SharedLedger};

    #[test]
    fn test_parse_send() {
        assert_eq!(
            Command::parse("send mel, kike ,10").unwrap(),
            Some(Command::Send {
                from: "mel".to_string(),
                to: "kike".to_string(),
                amount: 10.0,
            })
        );
        assert_eq!(
            Command::parse("send a,b,-2.5").unwrap(),
            Some(Command::Send { from: "a".to_string(), to: "b".to_string(), amount: -2.5 })
        );
    }

    #[test]
    fn test_parse_send_errors() {
        assert_eq!(Command::parse("send a,b").unwrap_err(), SEND_USAGE);
        assert_eq!(Command::parse("send").unwrap_err(), SEND_USAGE);
        assert_eq!(Command::parse("send ,b,1").unwrap_err(), SEND_USAGE);
        assert_eq!(Command::parse("send a,b,ten").unwrap_err(), "Invalid amount: ten");
        assert!(Command::parse("send a,b,inf").is_err());
        assert!(Command::parse("send a,b,NaN").is_err());
    }

    #[test]
    fn test_parse_other_commands() {
        assert_eq!(Command::parse("request_chain").unwrap(), Some(Command::RequestChain));
        assert_eq!(Command::parse("  chain ").unwrap(), Some(Command::PrintChain));
        assert_eq!(Command::parse("validate").unwrap(), Some(Command::Validate));
        assert_eq!(Command::parse("exit").unwrap(), Some(Command::Quit));
        assert_eq!(Command::parse("").unwrap(), None);
        assert_eq!(
            Command::parse("sender says hi").unwrap(),
            Some(Command::Chat("sender says hi".to_string()))
        );
    }

    #[test]
    fn test_cli_into_config() {
        let cli = Cli::parse_from([
            "powledger", "--name", "alpha", "--port", "4000",
            "--connect", "127.0.0.1:4001", "--difficulty", "3",
        ]);
        let config = cli.into_config().unwrap();

        assert_eq!(config.name, "alpha");
        assert_eq!(config.listen_addr.port(), 4000);
        assert_eq!(config.peer, Some("127.0.0.1:4001".parse().unwrap()));
        assert_eq!(config.difficulty, 3);
    }

    #[test]
    fn test_cli_defaults_and_errors() {
        let config = Cli::parse_from(["powledger"]).into_config().unwrap();
        assert_eq!(config, NodeConfig::default());

        let bad_peer = Cli::parse_from(["powledger", "--connect", "not an address"]);
        assert!(matches!(bad_peer.into_config(), Err(NodeError::Config(_))));

        let bad_name = Cli::parse_from(["powledger", "--name", "a:b"]);
        assert!(bad_name.into_config().is_err());
    }

    #[tokio::test]
    async fn test_execute_send_and_quit() {
        let node = Node::new(&NodeConfig::default(), SharedLedger::new(Ledger::new(1)));
        let console = Console::new(node.clone());

        let keep_going = console
            .execute(Command::Send { from: "A".to_string(), to: "B".to_string(), amount: 5.0 })
            .await
            .unwrap();
        assert!(keep_going);
        assert_eq!(node.ledger.len().await, 2);
        assert!(node.ledger.is_valid().await);

        // No peer configured: chat and chain requests are reported, not errors
        assert!(console.execute(Command::Chat("hi".to_string())).await.unwrap());
        assert!(console.execute(Command::RequestChain).await.unwrap());
        assert!(!console.execute(Command::Quit).await.unwrap());
    }
}
