//! arcmd
//!
//! This crate provides runtime support for decoding ARSDK command frames.
//!
//! - The runtime items generated modules link against (`ByteBuffer`,
//!   `Command`, `Decoder`, `ToValue`, `Value`, ...), re-exported from
//!   `arcmd-schema`
//! - The schema compiler, re-exported from `arcmd-compiler`
//! - JSON helpers for decoded values and compiled schemas

pub use arcmd_compiler::{compile_schema, compile_schema_to_rust, Compilation, CompileError, CompileOptions};
pub use arcmd_schema::{
    decode_frame, find_decoder, ByteBuffer, ByteBufferMut, ClassDef, CmdDef, Command, DecodeError, Decoder,
    ProjectDef, ToValue, Value, HEADER_LEN,
};

/// Decodes `frame` against a generated dispatch table into a pretty-printed
/// JSON string.
pub fn decode_to_json(table: &[&dyn Decoder], frame: &[u8]) -> Result<String, DecodeError> {
    let value = decode_frame(table, frame)?;
    Ok(value_to_json(&value))
}

/// Pretty-prints a decoded value. Objects become maps keyed by field name.
pub fn value_to_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| format!("{:?}", value))
}

/// Pretty-prints the command records of a compilation, for inspection.
pub fn compilation_to_json(compilation: &Compilation) -> Result<String, CompileError> {
    Ok(serde_json::to_string_pretty(compilation)?)
}

pub mod error {
    pub use arcmd_compiler::error::CompileError;
    pub use arcmd_schema::DecodeError;
}

pub mod schema {
    pub use arcmd_schema::*;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ping;

    impl Decoder for Ping {
        fn command(&self) -> Command {
            Command::new(0, 2, 1)
        }

        fn name(&self) -> &'static str {
            "CommonCommonPing"
        }

        fn decode_value(&self, payload: &[u8]) -> Result<Value, DecodeError> {
            let mut bb = ByteBuffer::new(payload);
            Ok(Value::Object(
                self.name().to_owned(),
                vec![
                    ("seq".to_owned(), Value::U16(bb.read_u16()?)),
                    ("tag".to_owned(), Value::String(bb.read_string()?)),
                ],
            ))
        }
    }

    static PING: Ping = Ping;

    #[test]
    fn test_decode_to_json() {
        let table: &[&dyn Decoder] = &[&PING];
        let json = decode_to_json(table, &[0, 2, 1, 0, 7, 0, b'h', b'i', 0]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, serde_json::json!({"seq": 7, "tag": "hi"}));

        assert_eq!(
            decode_to_json(table, &[0, 2, 9, 0]),
            Err(DecodeError::UnknownCommand(Command::new(0, 2, 9)))
        );
    }

    #[tokio::test]
    async fn test_compilation_to_json() {
        let text = r#"<project name="common" id="0"><class name="Common" id="2">
            <cmd name="Ping" id="1"><arg name="seq" type="u16"/></cmd>
        </class></project>"#;
        let compilation = compile_schema("common.xml", text, &CompileOptions::default()).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&compilation_to_json(&compilation).unwrap()).unwrap();

        assert_eq!(json["commands"][0]["type_name"], "CommonCommonPing");
        assert_eq!(json["commands"][0]["arguments"][0]["wire"], "u16");
        assert!(json.get("generated").is_none());
    }
}
