use crate::command::Command;
use thiserror::Error;

/// Failures surfaced by generated decode procedures at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unexpected end of payload at offset {offset}: {needed} more byte(s) required")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
    },

    #[error("no string terminator found after offset {offset}")]
    UnterminatedString {
        offset: usize,
    },

    #[error("frame of {len} byte(s) is too short for a command header")]
    ShortHeader {
        len: usize,
    },

    #[error("no decoder registered for command {0}")]
    UnknownCommand(Command),
}
