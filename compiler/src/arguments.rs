use crate::error::CompileError;
use crate::extract::attribute_pairs;
use crate::gen_rust::field_name;
use crate::registry::suffixed;
use crate::types::{ArgumentDescriptor, Token, TokenKind, Width};
use crate::window::LookaheadWindow;
use arcmd_schema::{ByteBuffer, DecodeError, Value};
use serde::Serialize;
use std::collections::HashSet;
use tracing::warn;

/// Tag of an argument-holder element inside a command.
pub const ARG_TAG: &str = "arg";

/// Appended to an argument literally named `type`.
pub const TYPE_SUFFIX: &str = "X";

/// Closed vocabulary of argument types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WireType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    Enum,
    U64,
    I64,
    Float,
    Double,
    String,
}

impl WireType {
    pub fn from_tag(tag: &str) -> Option<WireType> {
        let wire = match tag {
            "u8" => WireType::U8,
            "i8" => WireType::I8,
            "u16" => WireType::U16,
            "i16" => WireType::I16,
            "u32" => WireType::U32,
            "i32" => WireType::I32,
            "enum" => WireType::Enum,
            "u64" => WireType::U64,
            "i64" => WireType::I64,
            "float" => WireType::Float,
            "double" => WireType::Double,
            "string" => WireType::String,
            _ => return None,
        };
        Some(wire)
    }

    /// Rust type of the generated field.
    pub fn rust_type(&self) -> &'static str {
        match self {
            WireType::U8 => "u8",
            WireType::I8 => "i8",
            WireType::U16 => "u16",
            WireType::I16 => "i16",
            WireType::U32 | WireType::Enum => "u32",
            WireType::I32 => "i32",
            WireType::U64 => "u64",
            WireType::I64 => "i64",
            WireType::Float => "f32",
            WireType::Double => "f64",
            WireType::String => "String",
        }
    }

    pub fn width(&self) -> Width {
        match self {
            WireType::U8 | WireType::I8 => Width::Fixed(1),
            WireType::U16 | WireType::I16 => Width::Fixed(2),
            WireType::U32 | WireType::I32 | WireType::Enum | WireType::Float => Width::Fixed(4),
            WireType::U64 | WireType::I64 | WireType::Double => Width::Fixed(8),
            WireType::String => Width::Variable,
        }
    }

    /// `ByteBuffer` method the generated decode procedure calls.
    pub fn read_method(&self) -> &'static str {
        match self {
            WireType::U8 => "read_u8",
            WireType::I8 => "read_i8",
            WireType::U16 => "read_u16",
            WireType::I16 => "read_i16",
            WireType::U32 | WireType::Enum => "read_u32",
            WireType::I32 => "read_i32",
            WireType::U64 => "read_u64",
            WireType::I64 => "read_i64",
            WireType::Float => "read_f32",
            WireType::Double => "read_f64",
            WireType::String => "read_string",
        }
    }

    /// `Value` variant the generated `to_value` wraps the field in.
    pub fn value_variant(&self) -> &'static str {
        match self {
            WireType::U8 => "U8",
            WireType::I8 => "I8",
            WireType::U16 => "U16",
            WireType::I16 => "I16",
            WireType::U32 | WireType::Enum => "U32",
            WireType::I32 => "I32",
            WireType::U64 => "U64",
            WireType::I64 => "I64",
            WireType::Float => "Float",
            WireType::Double => "Double",
            WireType::String => "String",
        }
    }

    /// Reads one value of this type at the buffer's current offset.
    pub fn read(&self, bb: &mut ByteBuffer) -> Result<Value, DecodeError> {
        Ok(match self {
            WireType::U8 => Value::U8(bb.read_u8()?),
            WireType::I8 => Value::I8(bb.read_i8()?),
            WireType::U16 => Value::U16(bb.read_u16()?),
            WireType::I16 => Value::I16(bb.read_i16()?),
            WireType::U32 | WireType::Enum => Value::U32(bb.read_u32()?),
            WireType::I32 => Value::I32(bb.read_i32()?),
            WireType::U64 => Value::U64(bb.read_u64()?),
            WireType::I64 => Value::I64(bb.read_i64()?),
            WireType::Float => Value::Float(bb.read_f32()?),
            WireType::Double => Value::Double(bb.read_f64()?),
            WireType::String => Value::String(bb.read_string()?),
        })
    }
}

/// Strips word separators and suffixes the reserved word `type`.
pub fn normalize_argument_name(raw: &str) -> String {
    let joined: String = raw
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .collect();
    if joined == "type" {
        format!("{}{}", joined, TYPE_SUFFIX)
    } else {
        joined
    }
}

fn descriptor(command: &str, name: Option<&str>, type_tag: Option<&str>, doc: Vec<String>, at: &Token) -> Result<ArgumentDescriptor, CompileError> {
    let raw = name.ok_or_else(|| CompileError::MissingAttribute {
        element:   format!("arg of {}", command),
        attribute: "name".to_string(),
        line:      at.line,
        column:    at.column,
    })?;
    let source_type = type_tag.unwrap_or_default();
    let wire = WireType::from_tag(source_type).ok_or_else(|| CompileError::UnknownType {
        command:   command.to_string(),
        argument:  raw.to_string(),
        type_name: source_type.to_string(),
    })?;
    let name = normalize_argument_name(raw);

    Ok(ArgumentDescriptor {
        field_name:   field_name(&name),
        name,
        source_type:  source_type.to_string(),
        wire,
        emitted_type: wire.rust_type(),
        width:        wire.width(),
        doc,
    })
}

/// Suffixes the argument until its field name is unused within the command.
fn unique_field(command: &str, mut argument: ArgumentDescriptor, fields: &mut HashSet<String>) -> ArgumentDescriptor {
    let base = argument.name.clone();
    let mut occurrence = 1;
    while fields.contains(&argument.field_name) {
        occurrence += 1;
        argument.name = suffixed(&base, occurrence);
        argument.field_name = field_name(&argument.name);
    }
    if occurrence > 1 {
        warn!(command, argument = %base, emitted = %argument.name, "duplicate argument name");
    }
    fields.insert(argument.field_name.clone());
    argument
}

/// Collects the arguments of the command whose open tag sits under the
/// window's cursor, in document order, scanning ahead no further than the
/// command's own close tag. Only direct `arg` children count; anything nested
/// inside an argument (enum values and the like) is skipped over.
pub fn collect_arguments(window: &LookaheadWindow, command: &str) -> Result<Vec<ArgumentDescriptor>, CompileError> {
    let open = match window.get(0)? {
        Some(token) => token.clone(),
        None => return Ok(Vec::new()),
    };
    let mut arguments = Vec::new();
    let mut fields = HashSet::new();
    let mut depth = 1usize;
    let mut index = 1;

    loop {
        let token = match window.get(index)? {
            Some(token) => token,
            None => break,
        };
        match token.kind {
            TokenKind::StructureOpen => {
                depth += 1;
                if depth == 2 && token.text == ARG_TAG {
                    let (own, end) = own_run(window, index)?;
                    let pairs = attribute_pairs(&own);
                    let lookup = |key: &str| pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| *v);
                    let doc = own
                        .iter()
                        .filter(|t| t.kind == TokenKind::DescriptionText)
                        .map(|t| t.text.clone())
                        .collect();
                    let argument = descriptor(command, lookup("name"), lookup("type"), doc, token)?;
                    arguments.push(unique_field(command, argument, &mut fields));
                    index = end;
                    continue;
                }
            }
            TokenKind::StructureClose => {
                depth -= 1;
                if depth == 0 {
                    return Ok(arguments);
                }
            }
            TokenKind::EndOfStream => break,
            _ => {}
        }
        index += 1;
    }

    Err(CompileError::StructuralBalance {
        msg:    format!("command {} is never closed", command),
        line:   open.line,
        column: open.column,
    })
}

/// Tokens of the element opened at `start` up to its first boundary, and the
/// index of that boundary.
fn own_run(window: &LookaheadWindow, start: usize) -> Result<(Vec<Token>, usize), CompileError> {
    let mut tokens = Vec::new();
    let mut index = start + 1;
    while let Some(token) = window.get(index)? {
        if token.is_boundary() {
            break;
        }
        tokens.push(token.clone());
        index += 1;
    }
    Ok((tokens, index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::spawn_token_stream;
    use rstest::rstest;

    async fn window(text: &str, capacity: usize) -> LookaheadWindow {
        LookaheadWindow::start(spawn_token_stream(text.to_string(), 4), capacity)
            .await
            .unwrap()
    }

    #[rstest]
    #[case("u8", "u8", Width::Fixed(1))]
    #[case("i8", "i8", Width::Fixed(1))]
    #[case("u16", "u16", Width::Fixed(2))]
    #[case("i16", "i16", Width::Fixed(2))]
    #[case("u32", "u32", Width::Fixed(4))]
    #[case("i32", "i32", Width::Fixed(4))]
    #[case("enum", "u32", Width::Fixed(4))]
    #[case("u64", "u64", Width::Fixed(8))]
    #[case("i64", "i64", Width::Fixed(8))]
    #[case("float", "f32", Width::Fixed(4))]
    #[case("double", "f64", Width::Fixed(8))]
    #[case("string", "String", Width::Variable)]
    fn type_table(#[case] tag: &str, #[case] rust: &str, #[case] width: Width) {
        let wire = WireType::from_tag(tag).unwrap();
        assert_eq!(wire.rust_type(), rust);
        assert_eq!(wire.width(), width);
    }

    #[rstest]
    #[case("bool")]
    #[case("U8")]
    #[case("")]
    fn unknown_type_tags(#[case] tag: &str) {
        assert_eq!(WireType::from_tag(tag), None);
    }

    #[rstest]
    #[case("flag", "flag")]
    #[case("type", "typeX")]
    #[case("latitude_accuracy", "latitudeaccuracy")]
    #[case("no_gps_too_dark", "nogpstoodark")]
    #[case("_type_", "typeX")]
    #[case("dXAsked", "dXAsked")]
    fn argument_names(#[case] raw: &str, #[case] normalized: &str) {
        assert_eq!(normalize_argument_name(raw), normalized);
    }

    #[tokio::test]
    async fn collects_direct_arguments_in_order() {
        let text = r#"<cmd name="PCMD" id="2">
            <comment title="Move the drone"/>
            <arg name="flag" type="u8">Boolean flag</arg>
            <arg name="state" type="enum">
                <enum name="landed">Landed state</enum>
                <enum name="flying">Flying state</enum>
            </arg>
            <arg name="type" type="string"/>
        </cmd>
        <cmd name="Next" id="3"><arg name="ignored" type="u8"/></cmd>"#;
        let w = window(text, 128).await;
        let args = collect_arguments(&w, "PCMD").unwrap();

        let names: Vec<&str> = args.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["flag", "state", "typeX"]);
        assert_eq!(args[0].doc, vec!["Boolean flag".to_string()]);
        assert_eq!(args[1].wire, WireType::Enum);
        assert_eq!(args[2].field_name, "type_x");
        assert_eq!(args[2].width, Width::Variable);
    }

    #[tokio::test]
    async fn colliding_field_names_are_suffixed() {
        let text = r#"<cmd name="Move" id="1">
            <arg name="a_b" type="u8"/>
            <arg name="ab" type="u8"/>
            <arg name="a-b" type="u16"/>
        </cmd>"#;
        let w = window(text, 64).await;
        let args = collect_arguments(&w, "Move").unwrap();

        let fields: Vec<&str> = args.iter().map(|a| a.field_name.as_str()).collect();
        assert_eq!(fields, vec!["ab", "ab_duplicate", "ab_duplicate2"]);
        assert_eq!(args[1].name, "abDuplicate");
        assert_eq!(args[2].wire, WireType::U16);
    }

    #[tokio::test]
    async fn zero_arguments() {
        let w = window(r#"<cmd name="TakeOff" id="1"><comment title="Take off"/></cmd>"#, 32).await;
        assert!(collect_arguments(&w, "TakeOff").unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_type_is_reported() {
        let w = window(r#"<cmd name="Bad" id="1"><arg name="x" type="quaternion"/></cmd>"#, 32).await;
        let err = collect_arguments(&w, "Bad").unwrap_err();
        assert!(err.is_recoverable());
        assert!(matches!(err, CompileError::UnknownType { ref type_name, .. } if type_name == "quaternion"));
    }

    #[tokio::test]
    async fn unclosed_command_is_structural() {
        let w = window(r#"<cmd name="Open" id="1"><arg name="x" type="u8"/>"#, 32).await;
        let err = collect_arguments(&w, "Open").unwrap_err();
        assert!(matches!(err, CompileError::StructuralBalance { .. }));
        assert!(!err.is_recoverable());
    }

    #[tokio::test]
    async fn command_longer_than_window_exceeds_lookahead() {
        let text = r#"<cmd name="Long" id="1"><arg name="a" type="u8"/><arg name="b" type="u8"/></cmd>"#;
        let w = window(text, 10).await;
        assert!(matches!(
            collect_arguments(&w, "Long"),
            Err(CompileError::LookaheadExceeded { capacity: 10, .. })
        ));
    }
}
