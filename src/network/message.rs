// Network protocol messages
//
// One message per line: `<sender>:<TYPE>:<payload>`. A line with a single
// separator, `<sender>:<text>`, is a chat message.

use crate::core::Block;
use crate::error::{NodeError, Result};

/// Network message types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Chat,
    RequestChain,
    ReceiveChain,
    ReceiveBlock,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Chat => "MESSAGE",
            MessageType::RequestChain => "REQUEST_CHAIN",
            MessageType::ReceiveChain => "RECEIVE_CHAIN",
            MessageType::ReceiveBlock => "RECEIVE_BLOCK",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "MESSAGE" => Some(MessageType::Chat),
            "REQUEST_CHAIN" => Some(MessageType::RequestChain),
            "RECEIVE_CHAIN" => Some(MessageType::ReceiveChain),
            "RECEIVE_BLOCK" => Some(MessageType::ReceiveBlock),
            _ => None,
        }
    }
}

/// Network message
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Free-form text for the console
    Chat(String),
    /// Ask the receiver for its full chain (payload is a greeting)
    RequestChain(String),
    /// A full chain, genesis first
    Chain(Vec<Block>),
    /// A single newly mined block
    Block(Block),
}

impl Message {
    /// Get message type
    pub fn message_type(&self) -> MessageType {
        match self {
            Message::Chat(_) => MessageType::Chat,
            Message::RequestChain(_) => MessageType::RequestChain,
            Message::Chain(_) => MessageType::ReceiveChain,
            Message::Block(_) => MessageType::ReceiveBlock,
        }
    }

    fn payload(&self) -> Result<String> {
        Ok(match self {
            Message::Chat(text) | Message::RequestChain(text) => text.clone(),
            Message::Chain(chain) => serde_json::to_string(chain)?,
            Message::Block(block) => serde_json::to_string(block)?,
        })
    }

    fn from_payload(message_type: MessageType, payload: &str) -> Result<Self> {
        Ok(match message_type {
            MessageType::Chat => Message::Chat(payload.to_string()),
            MessageType::RequestChain => Message::RequestChain(payload.to_string()),
            MessageType::ReceiveChain => Message::Chain(serde_json::from_str(payload)?),
            MessageType::ReceiveBlock => Message::Block(serde_json::from_str(payload)?),
        })
    }
}

/// A message tagged with the name of the node that sent it
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub sender: String,
    pub message: Message,
}

impl Envelope {
    pub fn new(sender: impl Into<String>, message: Message) -> Self {
        Self {
            sender: sender.into(),
            message,
        }
    }

    /// Encode as a single protocol line (without the trailing newline)
    pub fn to_line(&self) -> Result<String> {
        let payload = self.message.payload()?;
        if payload.contains('\n') {
            return Err(NodeError::Protocol("payload contains a newline".to_string()));
        }
        Ok(format!("{}:{}:{}", self.sender, self.message.message_type().as_str(), payload))
    }

    /// Decode a protocol line
    pub fn parse_line(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let mut parts = line.splitn(3, ':');

        let sender = parts.next().unwrap_or_default();
        let second = parts
            .next()
            .ok_or_else(|| NodeError::Protocol(format!("Invalid message format: {}", line)))?;

        let message = match parts.next() {
            Some(payload) => {
                let message_type = MessageType::from_string(second)
                    .ok_or_else(|| NodeError::Protocol(format!("Unknown message type: {}", second)))?;
                Message::from_payload(message_type, payload)?
            }
            None => Message::Chat(second.to_string()),
        };

        Ok(Self::new(sender, message))
    }
}
