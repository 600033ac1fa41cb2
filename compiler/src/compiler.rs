use crate::{
    error::CompileError,
    tokenizer::spawn_token_stream,
    types::Compilation,
    walker::SchemaWalker,
    window::LookaheadWindow,
};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const DEFAULT_WINDOW_CAPACITY: usize = 1024;
pub const DEFAULT_CHANNEL_BOUND: usize = 64;

/// Tuning knobs for one compilation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Tokens the lookahead window retains. Must cover the longest command
    /// body in the schema.
    pub window_capacity: usize,
    /// Tokens the lexer task may run ahead of the walker.
    pub channel_bound:   usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            channel_bound:   DEFAULT_CHANNEL_BOUND,
        }
    }
}

impl CompileOptions {
    pub fn validate(&self) -> Result<(), CompileError> {
        if self.window_capacity == 0 {
            return Err(CompileError::Config("window capacity must be at least 1".to_string()));
        }
        if self.channel_bound == 0 {
            return Err(CompileError::Config("channel bound must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Compiles schema text in one streaming pass. `source` names the input in
/// the generated header and in diagnostics.
///
/// Must run inside a tokio runtime: the lexer is spawned as a task.
pub async fn compile_schema(source: &str, text: &str, options: &CompileOptions) -> Result<Compilation, CompileError> {
    options.validate()?;
    let tokens = spawn_token_stream(text.to_string(), options.channel_bound);
    let window = LookaheadWindow::start(tokens, options.window_capacity).await?;
    let compilation = SchemaWalker::new(source).run(window).await?;

    info!(
        source,
        projects = compilation.projects.len(),
        classes = compilation.classes.len(),
        commands = compilation.commands.len(),
        skipped = compilation.skipped.len(),
        "schema compiled"
    );
    Ok(compilation)
}

/// Compiles schema text straight to the generated Rust module.
pub async fn compile_schema_to_rust(source: &str, text: &str, options: &CompileOptions) -> Result<String, CompileError> {
    Ok(compile_schema(source, text, options).await?.generated)
}
