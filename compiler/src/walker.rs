use crate::arguments::collect_arguments;
use crate::error::CompileError;
use crate::extract::PartialWindow;
use crate::gen_rust::{self, RustEmitter};
use crate::path::PathStack;
use crate::registry::{NameKind, NameRegistry, ResolvedName};
use crate::types::{ClassRecord, CommandRecord, Compilation, ProjectRecord, SkippedCommand, Token, TokenKind};
use crate::window::LookaheadWindow;
use arcmd_schema::{ClassDef, CmdDef, ProjectDef};
use std::str::FromStr;
use tracing::{debug, warn};

const PROJECT_DEPTH: usize = 0;
const CLASS_DEPTH: usize = 1;
const COMMAND_DEPTH: usize = 2;

fn missing(element: &str, attribute: &str, at: &Token) -> CompileError {
    CompileError::MissingAttribute {
        element:   element.to_string(),
        attribute: attribute.to_string(),
        line:      at.line,
        column:    at.column,
    }
}

fn parse_id<T: FromStr>(block: &PartialWindow, element: &str, at: &Token) -> Result<T, CompileError> {
    let value = block.attribute("id").ok_or_else(|| missing(element, "id", at))?;
    value.trim().parse().map_err(|_| CompileError::InvalidId {
        element: element.to_string(),
        value:   value.to_string(),
        line:    at.line,
        column:  at.column,
    })
}

/// Drives one compilation pass: consumes the window's forward cursor one
/// token at a time, classifies every structural open by depth and `id`, and
/// hands finished records to the emitter.
///
/// All state lives here and is dropped with the walker, so passes never
/// share registries.
pub struct SchemaWalker {
    source:   String,
    path:     PathStack,
    registry: NameRegistry,
    emitter:  RustEmitter,
    project:  Option<ProjectRecord>,
    class:    Option<ClassRecord>,
    projects: Vec<ProjectRecord>,
    classes:  Vec<ClassRecord>,
    commands: Vec<CommandRecord>,
    skipped:  Vec<SkippedCommand>,
}

impl SchemaWalker {
    pub fn new(source: &str) -> SchemaWalker {
        let mut registry = NameRegistry::new();
        for identifier in gen_rust::RESERVED_IDENTIFIERS {
            registry.reserve(identifier);
        }
        SchemaWalker {
            source:   source.to_string(),
            path:     PathStack::new(),
            registry,
            emitter:  RustEmitter::new(source),
            project:  None,
            class:    None,
            projects: Vec::new(),
            classes:  Vec::new(),
            commands: Vec::new(),
            skipped:  Vec::new(),
        }
    }

    pub async fn run(mut self, mut window: LookaheadWindow) -> Result<Compilation, CompileError> {
        let end = loop {
            let token = match window.current() {
                Some(token) => token.clone(),
                None => return Err(CompileError::UnexpectedEndOfStream),
            };
            match token.kind {
                TokenKind::StructureOpen => self.open(&window, &token)?,
                TokenKind::StructureClose => self.close(&token)?,
                TokenKind::EndOfStream => break token,
                _ => {}
            }
            window.advance().await?;
        };

        if let Some(entry) = self.path.innermost() {
            return Err(CompileError::StructuralBalance {
                msg:    format!("<{}> is never closed", entry.tag),
                line:   end.line,
                column: end.column,
            });
        }

        Ok(Compilation {
            source:    self.source,
            projects:  self.projects,
            classes:   self.classes,
            commands:  self.commands,
            skipped:   self.skipped,
            generated: self.emitter.finish(),
        })
    }

    fn open(&mut self, window: &LookaheadWindow, token: &Token) -> Result<(), CompileError> {
        let depth = self.path.depth();
        let block = PartialWindow::extract(window)?;

        if block.attribute("id").is_none() {
            let name = block.attribute("name").unwrap_or(token.text.as_str());
            self.path.push(&token.text, name);
            return Ok(());
        }

        match depth {
            PROJECT_DEPTH => self.open_project(token, &block),
            CLASS_DEPTH => self.open_class(token, &block),
            COMMAND_DEPTH => self.open_command(window, token, &block),
            _ => {
                let name = block.attribute("name").unwrap_or(token.text.as_str());
                self.path.push(&token.text, name);
                Ok(())
            }
        }
    }

    fn open_project(&mut self, token: &Token, block: &PartialWindow) -> Result<(), CompileError> {
        let name = block.attribute("name").ok_or_else(|| missing(&token.text, "name", token))?;
        let id: ProjectDef = parse_id(block, &token.text, token)?;
        let record = ProjectRecord {
            name:       name.to_string(),
            id,
            const_name: gen_rust::project_const(name),
            comment:    block.leading_comment(),
        };
        debug!(project = %record.name, id, "project");
        if !self.registry.reserve(&record.const_name) {
            warn!(project = %record.name, "{} is already defined", record.const_name);
        }

        self.emitter.project(&record);
        self.path.push(&token.text, &record.name);
        self.projects.push(record.clone());
        self.project = Some(record);
        Ok(())
    }

    fn open_class(&mut self, token: &Token, block: &PartialWindow) -> Result<(), CompileError> {
        let raw = block.attribute("name").ok_or_else(|| missing(&token.text, "name", token))?;
        let id: ClassDef = parse_id(block, &token.text, token)?;
        let resolved = self
            .registry
            .resolve(NameKind::Class, raw, |name| vec![gen_rust::class_const(name)]);
        if resolved.disambiguated {
            warn!(class = raw, emitted = %resolved.name, "duplicate class name");
        }
        let record = ClassRecord {
            raw_name:      raw.to_string(),
            const_name:    gen_rust::class_const(&resolved.name),
            name:          resolved.name,
            id,
            disambiguated: resolved.disambiguated,
            comment:       block.leading_comment(),
        };
        debug!(class = %record.name, id, "class");

        self.emitter.class(&record);
        self.path.push(&token.text, &record.name);
        self.classes.push(record.clone());
        self.class = Some(record);
        Ok(())
    }

    fn open_command(&mut self, window: &LookaheadWindow, token: &Token, block: &PartialWindow) -> Result<(), CompileError> {
        // The name is registered before anything else can fail, so a skipped
        // command still counts towards later duplicates.
        let prefix = self.path.qualified_name();
        let project = self.project.as_ref().map(|p| p.name.as_str());
        let class = self.class.as_ref().map(|c| c.name.as_str());
        let identifiers = |name: &str| gen_rust::command_identifiers(project, class, &prefix, name);
        let resolved = block
            .attribute("name")
            .map(|raw| (raw.to_string(), self.registry.resolve(NameKind::Command, raw, identifiers)));
        let emitted = resolved.as_ref().map_or(token.text.as_str(), |(_, r)| r.name.as_str());
        self.path.push(&token.text, emitted);

        match self.command_record(window, token, block, resolved) {
            Ok(record) => {
                debug!(
                    command = %record.qualified_name,
                    id = record.numeric_id,
                    arguments = record.arguments.len(),
                    "command"
                );
                self.emitter.command(&record);
                self.commands.push(record);
                Ok(())
            }
            Err(err) if err.is_recoverable() => {
                let path = self.path.display();
                warn!(command = %path, "skipping command: {}", err);
                self.skipped.push(SkippedCommand {
                    path,
                    line:   token.line,
                    column: token.column,
                    reason: err.to_string(),
                });
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn command_record(
        &self,
        window: &LookaheadWindow,
        token: &Token,
        block: &PartialWindow,
        resolved: Option<(String, ResolvedName)>,
    ) -> Result<CommandRecord, CompileError> {
        let (raw, resolved) = resolved.ok_or_else(|| missing(&token.text, "name", token))?;
        let (project, class) = match (&self.project, &self.class) {
            (Some(project), Some(class)) => (project, class),
            _ => {
                return Err(CompileError::Orphan {
                    command: raw,
                    line:    token.line,
                    column:  token.column,
                })
            }
        };
        let numeric_id: CmdDef = parse_id(block, &raw, token)?;
        let arguments = collect_arguments(window, &raw)?;
        let qualified_name = self.path.qualified_name();

        Ok(CommandRecord {
            project_name: project.name.clone(),
            project_id: project.id,
            project_const: project.const_name.clone(),
            class_name: class.name.clone(),
            class_id: class.id,
            class_const: class.const_name.clone(),
            const_name: gen_rust::command_const(&resolved.name),
            type_name: gen_rust::type_name(&project.name, &class.name, &resolved.name),
            instance_name: gen_rust::instance_name(&qualified_name),
            raw_name: raw,
            command_name: resolved.name,
            numeric_id,
            disambiguated: resolved.disambiguated,
            qualified_name,
            arguments,
            leading_comment: block.leading_comment(),
        })
    }

    fn close(&mut self, token: &Token) -> Result<(), CompileError> {
        let entry = self.path.pop().ok_or_else(|| CompileError::StructuralBalance {
            msg:    format!("</{}> has no matching open tag", token.text),
            line:   token.line,
            column: token.column,
        })?;
        if !token.text.is_empty() && token.text != entry.tag {
            return Err(CompileError::StructuralBalance {
                msg:    format!("</{}> closes <{}>", token.text, entry.tag),
                line:   token.line,
                column: token.column,
            });
        }

        match self.path.depth() {
            CLASS_DEPTH => self.class = None,
            PROJECT_DEPTH => {
                self.class = None;
                self.project = None;
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::spawn_token_stream;

    async fn walk(text: &str) -> Result<Compilation, CompileError> {
        let window = LookaheadWindow::start(spawn_token_stream(text.to_string(), 8), 64).await?;
        SchemaWalker::new("test.xml").run(window).await
    }

    #[tokio::test]
    async fn classifies_by_depth_and_id() {
        let compilation = walk(
            r#"<project name="common" id="0">Common commands
                <class name="Network" id="1">Network related commands
                    <cmd name="Disconnect" id="0">
                        <comment title="Disconnect"/>
                    </cmd>
                </class>
            </project>"#,
        )
        .await
        .unwrap();

        assert_eq!(compilation.projects[0].comment, vec!["Common commands".to_string()]);
        assert_eq!(compilation.classes[0].const_name, "CLASS_NETWORK");
        let cmd = &compilation.commands[0];
        assert_eq!(cmd.qualified_name, "NetworkDisconnect");
        assert_eq!(cmd.type_name, "CommonNetworkDisconnect");
        assert_eq!(cmd.instance_name, "NETWORK_DISCONNECT");
        assert_eq!(cmd.leading_comment, vec!["title : Disconnect".to_string()]);
        assert!(compilation.skipped.is_empty());
    }

    #[tokio::test]
    async fn duplicate_command_registers_even_when_skipped() {
        let compilation = walk(
            r#"<project name="p" id="1"><class name="c" id="0">
                <cmd name="Go" id="1"><arg name="x" type="bogus"/></cmd>
                <cmd name="Go" id="2"/>
            </class></project>"#,
        )
        .await
        .unwrap();

        assert_eq!(compilation.skipped.len(), 1);
        assert_eq!(compilation.skipped[0].path, "p/c/Go");
        assert_eq!(compilation.commands.len(), 1);
        assert_eq!(compilation.commands[0].command_name, "GoDuplicate");
        assert!(compilation.commands[0].disambiguated);
    }

    #[tokio::test]
    async fn project_and_class_take_adjacent_comment_blocks() {
        let compilation = walk(
            r#"<project name="common" id="0">
                <comment desc="project doc"/>
                <class name="Network" id="1">Network related commands
                    <comment desc="class doc"/>
                    <cmd name="Disconnect" id="0"/>
                </class>
            </project>"#,
        )
        .await
        .unwrap();

        assert_eq!(compilation.projects[0].comment, vec!["desc : project doc".to_string()]);
        assert_eq!(
            compilation.classes[0].comment,
            vec!["Network related commands".to_string(), "desc : class doc".to_string()]
        );
        assert!(compilation
            .generated
            .contains("/// desc : class doc\npub const CLASS_NETWORK: ClassDef = 1;"));
    }

    #[tokio::test]
    async fn command_may_not_shadow_the_dispatch_table() {
        let compilation = walk(
            r#"<project name="p" id="1"><class name="Command" id="0">
                <cmd name="Map" id="1"/>
            </class></project>"#,
        )
        .await
        .unwrap();

        assert_eq!(compilation.commands[0].command_name, "MapDuplicate");
        assert_eq!(compilation.commands[0].instance_name, "COMMAND_MAP_DUPLICATE");
        assert_eq!(compilation.generated.matches("pub static COMMAND_MAP:").count(), 1);
    }

    #[tokio::test]
    async fn oversized_command_id_is_skipped() {
        let compilation = walk(
            r#"<project name="p" id="1"><class name="c" id="0">
                <cmd name="Big" id="70000"/>
                <cmd name="Ok" id="1"/>
            </class></project>"#,
        )
        .await
        .unwrap();
        assert_eq!(compilation.commands.len(), 1);
        assert!(compilation.skipped[0].reason.contains("70000"));
    }

    #[tokio::test]
    async fn oversized_class_id_is_fatal() {
        let err = walk(r#"<project name="p" id="1"><class name="c" id="300"></class></project>"#)
            .await
            .unwrap_err();
        assert!(matches!(err, CompileError::InvalidId { ref value, .. } if value == "300"));
    }

    #[tokio::test]
    async fn command_outside_a_class_is_skipped() {
        let compilation = walk(r#"<root><wrapper><cmd name="Lost" id="1"/></wrapper></root>"#)
            .await
            .unwrap();
        assert!(compilation.commands.is_empty());
        assert_eq!(compilation.skipped.len(), 1);
        assert!(compilation.skipped[0].reason.contains("Lost"));
    }

    #[tokio::test]
    async fn mismatched_close_is_structural() {
        let err = walk(r#"<project name="p" id="1"><class name="c" id="0"></project></class>"#)
            .await
            .unwrap_err();
        assert!(matches!(err, CompileError::StructuralBalance { .. }));
    }

    #[tokio::test]
    async fn stray_close_is_structural() {
        let err = walk(r#"<project name="p" id="1"></project></class>"#).await.unwrap_err();
        assert!(matches!(err, CompileError::StructuralBalance { line: 1, .. }));
    }

    #[tokio::test]
    async fn unclosed_project_is_structural() {
        let err = walk(r#"<project name="p" id="1"><class name="c" id="0"></class>"#)
            .await
            .unwrap_err();
        assert!(matches!(err, CompileError::StructuralBalance { ref msg, .. } if msg.contains("project")));
    }
}
