use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}, column {column}: {msg}")]
    ParseError {
        msg:    String,
        line:   usize,
        column: usize,
    },

    #[error("Unbalanced structure at line {line}, column {column}: {msg}")]
    StructuralBalance {
        msg:    String,
        line:   usize,
        column: usize,
    },

    #[error("Lookahead of {needed} tokens exceeds the window capacity of {capacity}")]
    LookaheadExceeded {
        needed:   usize,
        capacity: usize,
    },

    #[error("Invalid id {value} on {element} at line {line}, column {column}")]
    InvalidId {
        element: String,
        value:   String,
        line:    usize,
        column:  usize,
    },

    #[error("Missing attribute \"{attribute}\" on {element} at line {line}, column {column}")]
    MissingAttribute {
        element:   String,
        attribute: String,
        line:      usize,
        column:    usize,
    },

    #[error("Unknown type {type_name} for argument {argument} of command {command}")]
    UnknownType {
        command:   String,
        argument:  String,
        type_name: String,
    },

    #[error("Command {command} at line {line}, column {column} is not nested in a project and class")]
    Orphan {
        command: String,
        line:    usize,
        column:  usize,
    },

    #[error("Token stream closed before the end-of-stream marker")]
    UnexpectedEndOfStream,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CompileError {
    /// Errors confined to a single command. The walker skips that command and
    /// keeps going; everything else aborts the pass.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CompileError::UnknownType { .. }
                | CompileError::InvalidId { .. }
                | CompileError::MissingAttribute { .. }
                | CompileError::Orphan { .. }
        )
    }
}
