//! Register layouts
//!
//! # Command region (holding registers)
//! ```text
//! [OPCODE] [SENDER] [RECEIVER] [PRIORITY] [P0] .. [Pn-1]
//! ```
//!
//! # Status region (input registers)
//! ```text
//! [OPCODE] [P0] .. [Pm-1]
//! ```
//!
//! `n` and `m` are fixed per station kind. Payload words a command or status
//! does not use are written as zero.

use crate::error::ProtocolError;
use crate::message::{CommandMessage, MessageHeader};

/// Number of words before the command payload
pub const COMMAND_HEADER_WORDS: usize = 4;

/// Fixed register layout of one station kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterLayout {
    /// First holding register of the command region
    pub command_start: u16,
    /// Payload words in a command frame
    pub command_payload: usize,
    /// First input register of the status region
    pub status_start: u16,
    /// Payload words in a status frame
    pub status_payload: usize,
}

impl RegisterLayout {
    /// Total words in the command region
    pub fn command_len(&self) -> usize {
        COMMAND_HEADER_WORDS + self.command_payload
    }

    /// Total words in the status region
    pub fn status_len(&self) -> usize {
        1 + self.status_payload
    }

    /// Lay out a command message; missing payload words are zero filled
    ///
    /// Typed commands never carry more payload than their layout allows, so
    /// extra words can only come from hand-built messages and are dropped.
    pub fn frame_command(&self, message: &CommandMessage) -> Vec<u16> {
        let mut words = Vec::with_capacity(self.command_len());
        words.push(message.opcode);
        words.push(message.header.sender);
        words.push(message.header.receiver);
        words.push(message.header.priority);
        words.extend(
            message
                .payload
                .iter()
                .copied()
                .chain(std::iter::repeat(0))
                .take(self.command_payload),
        );
        words
    }

    /// Split the command region back into a message
    pub fn split_command(&self, words: &[u16]) -> Result<CommandMessage, ProtocolError> {
        if words.len() != self.command_len() {
            return Err(ProtocolError::MalformedPayload(format!(
                "command frame has {} words, expected {}",
                words.len(),
                self.command_len()
            )));
        }
        let header = MessageHeader {
            sender: words[1],
            receiver: words[2],
            priority: words[3],
        };
        Ok(CommandMessage::new(
            header,
            words[0],
            words[COMMAND_HEADER_WORDS..].to_vec(),
        ))
    }

    /// Lay out a status frame; missing payload words are zero filled
    pub fn frame_status(&self, opcode: u16, payload: &[u16]) -> Vec<u16> {
        let mut words = Vec::with_capacity(self.status_len());
        words.push(opcode);
        words.extend(
            payload
                .iter()
                .copied()
                .chain(std::iter::repeat(0))
                .take(self.status_payload),
        );
        words
    }

    /// Split the status region into opcode and payload
    pub fn split_status<'a>(&self, words: &'a [u16]) -> Result<(u16, &'a [u16]), ProtocolError> {
        if words.len() != self.status_len() {
            return Err(ProtocolError::MalformedPayload(format!(
                "status frame has {} words, expected {}",
                words.len(),
                self.status_len()
            )));
        }
        Ok((words[0], &words[1..]))
    }
}
