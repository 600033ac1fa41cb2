use crate::{bb::ByteBuffer, error::DecodeError, value::Value};
use serde::Serialize;
use std::fmt;

pub type ProjectDef = u8;
pub type ClassDef = u8;
pub type CmdDef = u16;

/// Size of the `(project, class, cmd)` header that prefixes every frame.
pub const HEADER_LEN: usize = 4;

/// The `(project, class, command)` triple that identifies one command on the
/// wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Command {
    pub project: ProjectDef,
    pub class:   ClassDef,
    pub cmd:     CmdDef,
}

impl Command {
    pub const fn new(project: ProjectDef, class: ClassDef, cmd: CmdDef) -> Command {
        Command { project, class, cmd }
    }

    /// Splits a frame into its command header and the argument payload that
    /// follows it. The header is one byte of project, one byte of class and
    /// a little-endian 16-bit command id.
    pub fn split_frame(frame: &[u8]) -> Result<(Command, &[u8]), DecodeError> {
        if frame.len() < HEADER_LEN {
            return Err(DecodeError::ShortHeader { len: frame.len() });
        }
        let mut bb = ByteBuffer::new(&frame[..HEADER_LEN]);
        let command = Command {
            project: bb.read_u8()?,
            class:   bb.read_u8()?,
            cmd:     bb.read_u16()?,
        };
        Ok((command, &frame[HEADER_LEN..]))
    }

    /// The header bytes `split_frame` expects in front of a payload.
    pub fn header(&self) -> [u8; HEADER_LEN] {
        let cmd = self.cmd.to_le_bytes();
        [self.project, self.class, cmd[0], cmd[1]]
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}-{}", self.project, self.class, self.cmd)
    }
}

/// Converts a decoded arguments record into a dynamic [Value].
pub trait ToValue {
    fn to_value(&self) -> Value;
}

/// The capability every generated command singleton exposes: it knows its
/// own triple and can decode a payload for it.
pub trait Decoder: Sync {
    fn command(&self) -> Command;

    /// The generated type name, e.g. `Ardrone3PilotingPCMD`.
    fn name(&self) -> &'static str;

    fn decode_value(&self, payload: &[u8]) -> Result<Value, DecodeError>;
}

/// Finds the decoder registered for `command`. Tables are small and ordered
/// by schema position, so a linear scan keeps the first registration.
pub fn find_decoder<'a>(table: &[&'a dyn Decoder], command: Command) -> Option<&'a dyn Decoder> {
    table.iter().copied().find(|d| d.command() == command)
}

/// Splits `frame`, looks up its command in `table` and decodes the payload.
pub fn decode_frame(table: &[&dyn Decoder], frame: &[u8]) -> Result<Value, DecodeError> {
    let (command, payload) = Command::split_frame(frame)?;
    let decoder = find_decoder(table, command).ok_or(DecodeError::UnknownCommand(command))?;
    decoder.decode_value(payload)
}
