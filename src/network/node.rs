// Network node - serves peer connections and talks to the configured peer

use crate::config::NodeConfig;
use crate::core::Block;
use crate::error::{NodeError, Result};
use crate::ledger::SharedLedger;
use crate::network::{Envelope, Message, Peer};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;

/// How long to wait for a peer to answer a chain request
pub const REPLY_TIMEOUT: Duration = Duration::from_secs(30);

/// Network node
#[derive(Clone)]
pub struct Node {
    /// Name attached to outgoing messages
    pub name: String,
    /// Peer to broadcast to and request chains from
    pub peer: Option<SocketAddr>,
    /// Shared ledger
    pub ledger: SharedLedger,
}

impl Node {
    /// Create a new node
    pub fn new(config: &NodeConfig, ledger: SharedLedger) -> Self {
        Self {
            name: config.name.clone(),
            peer: config.peer,
            ledger,
        }
    }

    /// Bind the listening socket
    pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
        let listener = TcpListener::bind(addr).await?;
        log::info!("Listening for peer connections on {}", listener.local_addr()?);
        Ok(listener)
    }

    /// Accept connections forever, one task per peer
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        loop {
            let (stream, addr) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    log::error!("Failed to accept connection: {}", e);
                    continue;
                }
            };

            log::debug!("New connection from {}", addr);

            let node = self.clone();
            tokio::spawn(async move {
                if let Err(e) = node.handle_peer(Peer::new(stream, addr)).await {
                    log::error!("Peer {} error: {}", addr, e);
                }
            });
        }
    }

    /// Handle a peer connection until it closes
    async fn handle_peer(&self, mut peer: Peer) -> Result<()> {
        loop {
            let envelope = match peer.receive().await {
                Ok(Some(envelope)) => envelope,
                Ok(None) => return Ok(()),
                Err(NodeError::Io(e)) => return Err(NodeError::Io(e)),
                Err(e) => {
                    log::warn!("Ignoring bad message from {}: {}", peer.addr(), e);
                    continue;
                }
            };

            if let Some(reply) = self.handle_message(envelope).await {
                peer.send(&Envelope::new(self.name.clone(), reply)).await?;
            }
        }
    }

    /// Apply one incoming message, returning the reply to send back, if any
    pub async fn handle_message(&self, envelope: Envelope) -> Option<Message> {
        let Envelope { sender, message } = envelope;
        log::debug!("Received {} from {}", message.message_type().as_str(), sender);

        match message {
            Message::Chat(text) => {
                println!("{}: {}", sender, text);
                None
            }
            Message::RequestChain(_) => {
                log::info!("{} requested our chain", sender);
                Some(Message::Chain(self.ledger.blocks().await))
            }
            Message::Chain(chain) => {
                match self.ledger.replace_chain(chain).await {
                    Ok(()) => {
                        log::info!("Chain replaced with the chain received from {}", sender);
                        self.print_chain().await;
                    }
                    Err(e) => log::warn!("Chain from {} not adopted: {}", sender, e),
                }
                None
            }
            Message::Block(block) => {
                let data = block.data.clone();
                match self.ledger.receive_block(block).await {
                    Ok(()) => {
                        log::info!("New block from {} added: {}", sender, data);
                        self.print_chain().await;
                    }
                    Err(e) => log::warn!("Block from {} rejected: {}", sender, e),
                }
                None
            }
        }
    }

    /// Dial the configured peer and send a single message
    pub async fn send_to_peer(&self, message: Message) -> Result<()> {
        let mut peer = self.connect_peer().await?;
        peer.send(&Envelope::new(self.name.clone(), message)).await?;
        peer.shutdown().await
    }

    /// Broadcast a newly mined block to the configured peer
    pub async fn broadcast_block(&self, block: &Block) -> Result<()> {
        if self.peer.is_none() {
            log::debug!("No peer configured, block not broadcast");
            return Ok(());
        }
        log::info!("Broadcasting new block to the network");
        self.send_to_peer(Message::Block(block.clone())).await
    }

    /// Ask the configured peer for its chain and apply the fork-choice rule to the answer
    pub async fn request_chain(&self) -> Result<()> {
        let mut peer = self.connect_peer().await?;
        let greeting = format!("Hello from node {}!", self.name);
        peer.send(&Envelope::new(self.name.clone(), Message::RequestChain(greeting)))
            .await?;

        let reply = tokio::time::timeout(REPLY_TIMEOUT, self.await_chain(&mut peer))
            .await
            .map_err(|_| NodeError::Protocol("timed out waiting for chain".to_string()))??;

        self.handle_message(reply).await;
        peer.shutdown().await
    }

    /// Print the current chain to the console
    pub async fn print_chain(&self) {
        println!("Current blockchain:");
        for entry in self.ledger.snapshot().await {
            println!("  {}", entry);
        }
    }

    /// Read from the peer until its chain arrives, applying anything else on the way
    async fn await_chain(&self, peer: &mut Peer) -> Result<Envelope> {
        loop {
            match peer.receive().await? {
                Some(envelope) if matches!(envelope.message, Message::Chain(_)) => {
                    return Ok(envelope);
                }
                Some(other) => {
                    self.handle_message(other).await;
                }
                None => {
                    return Err(NodeError::Protocol(
                        "peer closed the connection before sending its chain".to_string(),
                    ));
                }
            }
        }
    }

    async fn connect_peer(&self) -> Result<Peer> {
        let addr = self
            .peer
            .ok_or_else(|| NodeError::Config("no peer address configured".to_string()))?;
        Peer::connect(addr).await
    }
}
