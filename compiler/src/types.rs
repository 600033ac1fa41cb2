use crate::arguments::WireType;
use arcmd_schema::{ByteBuffer, ClassDef, CmdDef, Command, DecodeError, ProjectDef, Value};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    StructureOpen,
    StructureClose,
    AttributeName,
    AttributeValue,
    DescriptionText,
    FreeText,
    EndOfStream,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind:   TokenKind,
    pub text:   String,
    pub line:   usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Token {
        Token {
            kind,
            text: text.into(),
            line,
            column,
        }
    }

    /// Structural tokens delimit the runs the partial-window extractor carves
    /// out. The end of the stream closes any run still open.
    pub fn is_boundary(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::StructureOpen | TokenKind::StructureClose | TokenKind::EndOfStream
        )
    }

    pub fn is_open(&self, tag: &str) -> bool {
        self.kind == TokenKind::StructureOpen && self.text == tag
    }
}

/// Byte width of an argument on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Width {
    Fixed(usize),
    Variable,
}

impl Width {
    pub fn is_variable(&self) -> bool {
        matches!(self, Width::Variable)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArgumentDescriptor {
    /// Normalized schema name (separators stripped, `type` suffixed).
    pub name:         String,
    /// Rust field identifier in the generated arguments record.
    pub field_name:   String,
    pub source_type:  String,
    pub wire:         WireType,
    pub emitted_type: &'static str,
    pub width:        Width,
    pub doc:          Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectRecord {
    pub name:       String,
    pub id:         ProjectDef,
    pub const_name: String,
    pub comment:    Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassRecord {
    pub raw_name:      String,
    pub name:          String,
    pub id:            ClassDef,
    pub const_name:    String,
    pub disambiguated: bool,
    pub comment:       Vec<String>,
}

/// Everything needed to emit one command: its place in the hierarchy, its
/// generated identifiers and its arguments in wire order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandRecord {
    pub project_name:    String,
    pub project_id:      ProjectDef,
    pub project_const:   String,
    pub class_name:      String,
    pub class_id:        ClassDef,
    pub class_const:     String,
    pub raw_name:        String,
    pub command_name:    String,
    pub numeric_id:      CmdDef,
    pub disambiguated:   bool,
    /// Path entries below the project, concatenated.
    pub qualified_name:  String,
    pub const_name:      String,
    pub type_name:       String,
    pub instance_name:   String,
    pub arguments:       Vec<ArgumentDescriptor>,
    pub leading_comment: Vec<String>,
}

impl CommandRecord {
    pub fn command(&self) -> Command {
        Command::new(self.project_id, self.class_id, self.numeric_id)
    }

    pub fn arguments_type_name(&self) -> String {
        format!("{}Arguments", self.type_name)
    }

    /// Decodes `payload` the way the generated decode procedure does: one
    /// argument after the other from offset 0, scalars little-endian and
    /// strings up to and past their terminator.
    pub fn decode(&self, payload: &[u8]) -> Result<Value, DecodeError> {
        let mut bb = ByteBuffer::new(payload);
        let mut fields = Vec::with_capacity(self.arguments.len());
        for arg in &self.arguments {
            fields.push((arg.field_name.clone(), arg.wire.read(&mut bb)?));
        }
        Ok(Value::Object(self.type_name.clone(), fields))
    }
}

/// A command left out of the generated artifact, with the reason why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedCommand {
    pub path:   String,
    pub line:   usize,
    pub column: usize,
    pub reason: String,
}

/// Result of one compilation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Compilation {
    pub source:   String,
    pub projects: Vec<ProjectRecord>,
    pub classes:  Vec<ClassRecord>,
    pub commands: Vec<CommandRecord>,
    pub skipped:  Vec<SkippedCommand>,
    /// The emitted Rust module.
    #[serde(skip)]
    pub generated: String,
}

impl Compilation {
    /// First command registered for `command`, in schema order.
    pub fn find(&self, command: Command) -> Option<&CommandRecord> {
        self.commands.iter().find(|c| c.command() == command)
    }

    /// Splits a frame and decodes its payload against the compiled records.
    pub fn decode_frame(&self, frame: &[u8]) -> Result<Value, DecodeError> {
        let (command, payload) = Command::split_frame(frame)?;
        self.find(command)
            .ok_or(DecodeError::UnknownCommand(command))?
            .decode(payload)
    }
}
