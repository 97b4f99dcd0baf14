//! Command messages
//!
//! A [`CommandMessage`] is the structured form of one command frame before it
//! is laid out in registers. Messages are created per call and consumed
//! immediately by the codec.

/// Routing part of a command frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageHeader {
    /// Logical address of the sender (the controller)
    pub sender: u16,
    /// Logical address of the receiving station
    pub receiver: u16,
    /// Message priority, higher is more urgent
    pub priority: u16,
}

impl MessageHeader {
    /// Create a header with default priority
    pub fn new(sender: u16, receiver: u16) -> Self {
        Self {
            sender,
            receiver,
            priority: 0,
        }
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: u16) -> Self {
        self.priority = priority;
        self
    }
}

/// One command addressed to a station
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMessage {
    /// Sender, receiver and priority
    pub header: MessageHeader,
    /// Command opcode
    pub opcode: u16,
    /// Ordered payload words
    pub payload: Vec<u16>,
}

impl CommandMessage {
    /// Create a new command message
    pub fn new(header: MessageHeader, opcode: u16, payload: Vec<u16>) -> Self {
        Self {
            header,
            opcode,
            payload,
        }
    }
}
