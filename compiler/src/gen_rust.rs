use crate::types::{ArgumentDescriptor, ClassRecord, CommandRecord, ProjectRecord};

/// Converts a string to PascalCase.
/// - Splits on underscores, dashes and spaces and capitalizes the first
///   letter of every segment.
/// - The rest of each segment keeps its casing, so acronyms such as `PCMD`
///   survive unchanged.
pub fn to_pascal_case(s: &str) -> String {
    s.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().to_string() + chars.as_str(),
            }
        })
        .collect()
}

/// Converts a string to snake_case.
/// Consecutive uppercase letters are kept together so that acronyms remain
/// intact (e.g. "PilotingPCMD" becomes "piloting_pcmd").
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut snake = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                let prev = chars[i - 1];
                if !prev.is_uppercase() || (i + 1 < chars.len() && chars[i + 1].is_lowercase()) {
                    snake.push('_');
                }
            }
            snake.extend(c.to_lowercase());
        } else {
            snake.push(c);
        }
    }
    snake
}

/// Converts a string to SCREAMING_SNAKE_CASE, collapsing repeated or
/// dangling underscores.
pub fn to_screaming_snake_case(s: &str) -> String {
    to_snake_case(s)
        .split('_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
        .to_uppercase()
}

/// Escapes Rust reserved keywords by suffixing with an underscore.
pub fn escape_rust_keyword(s: &str) -> String {
    let keywords = [
        "as", "async", "await", "break", "const", "continue", "crate",
        "dyn", "else", "enum", "extern", "false", "fn", "for", "if",
        "impl", "in", "let", "loop", "match", "mod", "move", "mut",
        "pub", "ref", "return", "self", "Self", "static", "struct",
        "super", "trait", "true", "type", "unsafe", "use", "where",
        "while",
        // reserved
        "abstract", "become", "box", "do", "final", "macro", "override",
        "priv", "try", "typeof", "unsized", "virtual", "yield",
    ];
    if keywords.contains(&s) {
        format!("{}_", s)
    } else {
        s.to_string()
    }
}

pub fn field_name(argument: &str) -> String {
    escape_rust_keyword(&to_snake_case(argument))
}

pub fn project_const(project: &str) -> String {
    format!("PROJECT_{}", to_screaming_snake_case(project))
}

pub fn class_const(class: &str) -> String {
    format!("CLASS_{}", to_screaming_snake_case(class))
}

pub fn command_const(command: &str) -> String {
    format!("CMD_{}", to_screaming_snake_case(command))
}

/// Record type of a command: the project followed by the qualified path.
pub fn type_name(project: &str, class: &str, command: &str) -> String {
    format!("{}{}{}", to_pascal_case(project), to_pascal_case(class), to_pascal_case(command))
}

/// Singleton instance of a command, named after its qualified path.
pub fn instance_name(qualified: &str) -> String {
    to_screaming_snake_case(qualified)
}

/// Items every generated module imports or defines outside any record.
pub const RESERVED_IDENTIFIERS: &[&str] = &[
    "ByteBuffer",
    "ClassDef",
    "CmdDef",
    "Command",
    "DecodeError",
    "Decoder",
    "ProjectDef",
    "ToValue",
    "Value",
    "COMMAND_MAP",
    "decode_frame",
];

/// Every identifier a command defines in the generated module: its constant,
/// its singleton and, when it sits inside a project and class, its record and
/// argument types. `prefix` is the qualified name of the enclosing class.
pub fn command_identifiers(project: Option<&str>, class: Option<&str>, prefix: &str, command: &str) -> Vec<String> {
    let mut identifiers = vec![command_const(command), instance_name(&format!("{}{}", prefix, command))];
    if let (Some(project), Some(class)) = (project, class) {
        let ty = type_name(project, class, command);
        identifiers.push(format!("{}Arguments", ty));
        identifiers.push(ty);
    }
    identifiers
}

fn push_doc(lines: &mut Vec<String>, indent: &str, doc: &[String]) {
    for block in doc {
        for line in block.lines() {
            let line = line.trim();
            if line.is_empty() {
                lines.push(format!("{}///", indent));
            } else {
                lines.push(format!("{}/// {}", indent, line));
            }
        }
    }
}

/// Writes the generated Rust module one declaration at a time, in the order
/// the walker hands records over. The dispatch table is written last, by
/// [finish](Self::finish).
#[derive(Debug)]
pub struct RustEmitter {
    lines:    Vec<String>,
    dispatch: Vec<String>,
}

impl RustEmitter {
    pub fn new(source: &str) -> RustEmitter {
        let lines = vec![
            format!("// Code generated by arcmd from {}. DO NOT EDIT.", source),
            "".to_string(),
            "use arcmd::{ByteBuffer, ClassDef, CmdDef, Command, DecodeError, Decoder, ProjectDef, ToValue, Value};".to_string(),
            "".to_string(),
        ];
        RustEmitter {
            lines,
            dispatch: Vec::new(),
        }
    }

    pub fn project(&mut self, project: &ProjectRecord) {
        push_doc(&mut self.lines, "", &project.comment);
        self.lines.push(format!("pub const {}: ProjectDef = {};", project.const_name, project.id));
        self.lines.push("".to_string());
    }

    pub fn class(&mut self, class: &ClassRecord) {
        push_doc(&mut self.lines, "", &class.comment);
        self.lines.push(format!("pub const {}: ClassDef = {};", class.const_name, class.id));
        self.lines.push("".to_string());
    }

    pub fn command(&mut self, command: &CommandRecord) {
        let ty = &command.type_name;
        let args_ty = command.arguments_type_name();

        push_doc(&mut self.lines, "", &command.leading_comment);
        self.lines.push(format!("pub const {}: CmdDef = {};", command.const_name, command.numeric_id));
        self.lines.push("".to_string());

        self.lines.push("#[derive(Debug, Clone, Copy, PartialEq, Eq)]".to_string());
        self.lines.push(format!("pub struct {}(pub Command);", ty));
        self.lines.push("".to_string());

        self.lines.push("#[derive(Debug, Clone, Default, PartialEq)]".to_string());
        if command.arguments.is_empty() {
            self.lines.push(format!("pub struct {} {{}}", args_ty));
        } else {
            self.lines.push(format!("pub struct {} {{", args_ty));
            for arg in &command.arguments {
                push_doc(&mut self.lines, "    ", &arg.doc);
                self.lines.push(format!("    pub {}: {},", arg.field_name, arg.emitted_type));
            }
            self.lines.push("}".to_string());
        }
        self.lines.push("".to_string());

        self.decode_impl(ty, &args_ty, &command.arguments);
        self.to_value_impl(ty, &args_ty, &command.arguments);
        self.decoder_impl(ty);

        self.lines.push(format!("pub static {}: {} = {}(Command {{", command.instance_name, ty, ty));
        self.lines.push(format!("    project: {},", command.project_const));
        self.lines.push(format!("    class:   {},", command.class_const));
        self.lines.push(format!("    cmd:     {},", command.const_name));
        self.lines.push("});".to_string());
        self.lines.push("".to_string());

        self.dispatch.push(command.instance_name.clone());
    }

    fn decode_impl(&mut self, ty: &str, args_ty: &str, arguments: &[ArgumentDescriptor]) {
        self.lines.push(format!("impl {} {{", ty));
        if arguments.is_empty() {
            self.lines.push(format!("    pub fn decode(&self, _b: &[u8]) -> Result<{}, DecodeError> {{", args_ty));
            self.lines.push(format!("        Ok({} {{}})", args_ty));
        } else {
            self.lines.push(format!("    pub fn decode(&self, b: &[u8]) -> Result<{}, DecodeError> {{", args_ty));
            self.lines.push("        let mut bb = ByteBuffer::new(b);".to_string());
            self.lines.push(format!("        Ok({} {{", args_ty));
            for arg in arguments {
                self.lines.push(format!("            {}: bb.{}()?,", arg.field_name, arg.wire.read_method()));
            }
            self.lines.push("        })".to_string());
        }
        self.lines.push("    }".to_string());
        self.lines.push("}".to_string());
        self.lines.push("".to_string());
    }

    fn to_value_impl(&mut self, ty: &str, args_ty: &str, arguments: &[ArgumentDescriptor]) {
        self.lines.push(format!("impl ToValue for {} {{", args_ty));
        self.lines.push("    fn to_value(&self) -> Value {".to_string());
        if arguments.is_empty() {
            self.lines.push(format!("        Value::Object(\"{}\".to_owned(), vec![])", ty));
        } else {
            self.lines.push("        Value::Object(".to_string());
            self.lines.push(format!("            \"{}\".to_owned(),", ty));
            self.lines.push("            vec![".to_string());
            for arg in arguments {
                let field = if arg.width.is_variable() {
                    format!("self.{}.clone()", arg.field_name)
                } else {
                    format!("self.{}", arg.field_name)
                };
                self.lines.push(format!(
                    "                (\"{}\".to_owned(), Value::{}({})),",
                    arg.field_name,
                    arg.wire.value_variant(),
                    field
                ));
            }
            self.lines.push("            ],".to_string());
            self.lines.push("        )".to_string());
        }
        self.lines.push("    }".to_string());
        self.lines.push("}".to_string());
        self.lines.push("".to_string());
    }

    fn decoder_impl(&mut self, ty: &str) {
        self.lines.push(format!("impl Decoder for {} {{", ty));
        self.lines.push("    fn command(&self) -> Command {".to_string());
        self.lines.push("        self.0".to_string());
        self.lines.push("    }".to_string());
        self.lines.push("".to_string());
        self.lines.push("    fn name(&self) -> &'static str {".to_string());
        self.lines.push(format!("        \"{}\"", ty));
        self.lines.push("    }".to_string());
        self.lines.push("".to_string());
        self.lines.push("    fn decode_value(&self, payload: &[u8]) -> Result<Value, DecodeError> {".to_string());
        self.lines.push("        Ok(self.decode(payload)?.to_value())".to_string());
        self.lines.push("    }".to_string());
        self.lines.push("}".to_string());
        self.lines.push("".to_string());
    }

    /// Appends the dispatch table and returns the whole module.
    pub fn finish(mut self) -> String {
        self.lines.push("/// Every command above, in schema order.".to_string());
        if self.dispatch.is_empty() {
            self.lines.push("pub static COMMAND_MAP: &[&dyn Decoder] = &[];".to_string());
        } else {
            self.lines.push("pub static COMMAND_MAP: &[&dyn Decoder] = &[".to_string());
            for instance in &self.dispatch {
                self.lines.push(format!("    &{},", instance));
            }
            self.lines.push("];".to_string());
        }
        self.lines.push("".to_string());
        self.lines.push("pub fn decode_frame(frame: &[u8]) -> Result<Value, DecodeError> {".to_string());
        self.lines.push("    arcmd::decode_frame(COMMAND_MAP, frame)".to_string());
        self.lines.push("}".to_string());
        self.lines.push("".to_string());
        self.lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arguments::WireType;
    use rstest::rstest;

    #[rstest]
    #[case("ardrone3", "Ardrone3")]
    #[case("take_off", "TakeOff")]
    #[case("PCMD", "PCMD")]
    #[case("PilotingSettings", "PilotingSettings")]
    fn pascal_case(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(to_pascal_case(input), expected);
    }

    #[rstest]
    #[case("PilotingPCMD", "piloting_pcmd")]
    #[case("sessionID", "session_id")]
    #[case("typeX", "type_x")]
    #[case("latitudeaccuracy", "latitudeaccuracy")]
    fn snake_case(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(to_snake_case(input), expected);
    }

    #[rstest]
    #[case("PilotingTakeOff", "PILOTING_TAKE_OFF")]
    #[case("Piloting_Settings", "PILOTING_SETTINGS")]
    #[case("PilotingDuplicate", "PILOTING_DUPLICATE")]
    #[case("ardrone3", "ARDRONE3")]
    fn screaming_snake_case(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(to_screaming_snake_case(input), expected);
    }

    #[test]
    fn command_identifiers_cover_every_item() {
        assert_eq!(
            command_identifiers(Some("ardrone3"), Some("Piloting"), "Piloting", "TakeOff"),
            vec![
                "CMD_TAKE_OFF".to_string(),
                "PILOTING_TAKE_OFF".to_string(),
                "Ardrone3PilotingTakeOffArguments".to_string(),
                "Ardrone3PilotingTakeOff".to_string(),
            ]
        );
        assert_eq!(command_identifiers(None, None, "", "Go").len(), 2);
    }

    #[test]
    fn keywords_are_escaped() {
        assert_eq!(field_name("type"), "type_");
        assert_eq!(field_name("loop"), "loop_");
        assert_eq!(field_name("try"), "try_");
        assert_eq!(field_name("yield"), "yield_");
        assert_eq!(field_name("box"), "box_");
        assert_eq!(field_name("flag"), "flag");
    }

    fn argument(name: &str, wire: WireType) -> ArgumentDescriptor {
        ArgumentDescriptor {
            name:         name.to_string(),
            field_name:   field_name(name),
            source_type:  "test".to_string(),
            wire,
            emitted_type: wire.rust_type(),
            width:        wire.width(),
            doc:          vec![],
        }
    }

    fn record(command: &str, id: u16, arguments: Vec<ArgumentDescriptor>) -> CommandRecord {
        CommandRecord {
            project_name:    "ardrone3".to_string(),
            project_id:      1,
            project_const:   project_const("ardrone3"),
            class_name:      "Piloting".to_string(),
            class_id:        0,
            class_const:     class_const("Piloting"),
            raw_name:        command.to_string(),
            command_name:    command.to_string(),
            numeric_id:      id,
            disambiguated:   false,
            qualified_name:  format!("Piloting{}", command),
            const_name:      command_const(command),
            type_name:       type_name("ardrone3", "Piloting", command),
            instance_name:   instance_name(&format!("Piloting{}", command)),
            arguments,
            leading_comment: vec!["title : Take off".to_string()],
        }
    }

    #[test]
    fn emits_zero_argument_command() {
        let mut emitter = RustEmitter::new("test.xml");
        emitter.command(&record("TakeOff", 1, vec![]));
        let code = emitter.finish();

        assert!(code.contains("/// title : Take off\npub const CMD_TAKE_OFF: CmdDef = 1;"));
        assert!(code.contains("pub struct Ardrone3PilotingTakeOff(pub Command);"));
        assert!(code.contains("pub struct Ardrone3PilotingTakeOffArguments {}"));
        assert!(code.contains("pub fn decode(&self, _b: &[u8]) -> Result<Ardrone3PilotingTakeOffArguments, DecodeError> {\n        Ok(Ardrone3PilotingTakeOffArguments {})"));
        assert!(code.contains("pub static PILOTING_TAKE_OFF: Ardrone3PilotingTakeOff = Ardrone3PilotingTakeOff(Command {"));
        assert!(code.contains("pub static COMMAND_MAP: &[&dyn Decoder] = &[\n    &PILOTING_TAKE_OFF,\n];"));
    }

    #[test]
    fn emits_reads_in_argument_order() {
        let mut emitter = RustEmitter::new("test.xml");
        emitter.command(&record(
            "PCMD",
            2,
            vec![
                argument("flag", WireType::U8),
                argument("mode", WireType::Enum),
                argument("label", WireType::String),
                argument("roll", WireType::I16),
            ],
        ));
        let code = emitter.finish();

        let reads: Vec<&str> = code
            .lines()
            .filter(|l| l.contains(": bb.read_"))
            .map(str::trim)
            .collect();
        assert_eq!(
            reads,
            vec![
                "flag: bb.read_u8()?,",
                "mode: bb.read_u32()?,",
                "label: bb.read_string()?,",
                "roll: bb.read_i16()?,",
            ]
        );
        assert!(code.contains("    pub mode: u32,"));
        assert!(code.contains("(\"label\".to_owned(), Value::String(self.label.clone())),"));
        assert!(code.contains("(\"mode\".to_owned(), Value::U32(self.mode)),"));
    }

    #[test]
    fn empty_dispatch_table() {
        let code = RustEmitter::new("empty.xml").finish();
        assert!(code.starts_with("// Code generated by arcmd from empty.xml. DO NOT EDIT."));
        assert!(code.contains("pub static COMMAND_MAP: &[&dyn Decoder] = &[];"));
    }
}
