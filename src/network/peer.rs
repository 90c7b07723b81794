// Peer connection management

use crate::error::{NodeError, Result};
use crate::network::Envelope;
use std::net::SocketAddr;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

/// Longest protocol line accepted from a peer (a full chain travels on one line)
pub const MAX_LINE_LEN: usize = 16 * 1024 * 1024;

/// Peer connection
pub struct Peer {
    addr: SocketAddr,
    stream: BufReader<TcpStream>,
}

impl Peer {
    /// Create a new peer from a TCP stream
    pub fn new(stream: TcpStream, addr: SocketAddr) -> Self {
        Self {
            addr,
            stream: BufReader::new(stream),
        }
    }

    /// Connect to a peer
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream, addr))
    }

    /// Send one message line
    pub async fn send(&mut self, envelope: &Envelope) -> Result<()> {
        let mut line = envelope.to_line()?;
        line.push('\n');

        self.stream.write_all(line.as_bytes()).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Receive the next message line, or `None` once the peer closes the connection
    pub async fn receive(&mut self) -> Result<Option<Envelope>> {
        let mut line = String::new();
        let read = (&mut self.stream)
            .take(MAX_LINE_LEN as u64 + 1)
            .read_line(&mut line)
            .await?;

        if read == 0 {
            return Ok(None);
        }
        if !line.ends_with('\n') && line.len() > MAX_LINE_LEN {
            // The tail of the overlong line must not be read as the next message
            self.discard_line().await?;
            return Err(NodeError::Protocol(format!(
                "Line from {} exceeds {} bytes",
                self.addr, MAX_LINE_LEN
            )));
        }

        Envelope::parse_line(&line).map(Some)
    }

    /// Skip buffered input up to and including the next newline (or end of stream)
    async fn discard_line(&mut self) -> Result<()> {
        loop {
            let buf = self.stream.fill_buf().await?;
            if buf.is_empty() {
                return Ok(());
            }

            match buf.iter().position(|&b| b == b'\n') {
                Some(end) => {
                    self.stream.consume(end + 1);
                    return Ok(());
                }
                None => {
                    let len = buf.len();
                    self.stream.consume(len);
                }
            }
        }
    }

    /// Close the write half so the other side sees end of stream
    pub async fn shutdown(&mut self) -> Result<()> {
        self.stream.get_mut().shutdown().await?;
        Ok(())
    }

    /// Get peer address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}
