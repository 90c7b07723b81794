// P2P networking

mod message;
mod peer;
mod node;

pub use message::{Envelope, Message, MessageType};
pub use peer::{Peer, MAX_LINE_LEN};
pub use node::{Node, REPLY_TIMEOUT};
