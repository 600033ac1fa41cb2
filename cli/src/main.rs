use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use tracing::{info, warn};

use arcmd::{compilation_to_json, value_to_json, Compilation, CompileError, CompileOptions, DecodeError};
use arcmd_compiler::compiler::{DEFAULT_CHANNEL_BOUND, DEFAULT_WINDOW_CAPACITY};
use arcmd_compiler::tokenizer::Tokenizer;

#[derive(Parser)]
#[command(name = "arcmd")]
#[command(about = "Generate Rust decoders from ARSDK command schemas and decode command frames", long_about = None)]
struct Cli {
    /// Log compiler progress (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PassArgs {
    /// Tokens the lookahead window retains
    #[arg(long, default_value_t = DEFAULT_WINDOW_CAPACITY)]
    window: usize,

    /// Tokens the lexer may run ahead of the walker
    #[arg(long, default_value_t = DEFAULT_CHANNEL_BOUND)]
    channel_bound: usize,
}

impl From<&PassArgs> for CompileOptions {
    fn from(args: &PassArgs) -> Self {
        CompileOptions {
            window_capacity: args.window,
            channel_bound:   args.channel_bound,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum WriteMode {
    /// Print the generated module
    Stdout,
    /// Write `<input stem>.rs` next to the working directory
    File,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a Rust decoder module from an XML schema
    GenRust {
        /// Input `.xml` schema file
        #[arg(short, long)]
        input: PathBuf,

        /// Output `.rs` file (takes precedence over --write-mode)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = WriteMode::Stdout)]
        write_mode: WriteMode,

        #[command(flatten)]
        pass: PassArgs,
    },

    /// Print the compiled command records as JSON
    Inspect {
        /// Input `.xml` schema file
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        pass: PassArgs,
    },

    /// Print the token stream of a schema, one JSON token per line
    Tokens {
        /// Input `.xml` schema file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Decode one command frame (4-byte header + payload) against a schema
    Decode {
        /// Input `.xml` schema file
        #[arg(short, long)]
        input: PathBuf,

        /// Frame bytes as hex, e.g. `01000200` + payload
        #[arg(short, long)]
        frame: String,

        #[command(flatten)]
        pass: PassArgs,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("Decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("Invalid hex frame: {0}")]
    Frame(#[from] hex::FromHexError),

    #[error("Cannot read {}: {source}", .path.display())]
    Read {
        path:   PathBuf,
        source: std::io::Error,
    },
}

fn read_schema(input: &Path) -> Result<String, CliError> {
    fs::read_to_string(input).map_err(|source| CliError::Read {
        path: input.to_path_buf(),
        source,
    })
}

async fn compile(input: &Path, pass: &PassArgs) -> Result<Compilation, CliError> {
    let text = read_schema(input)?;
    let source = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());
    let compilation = arcmd::compile_schema(&source, &text, &CompileOptions::from(pass)).await?;
    for skipped in &compilation.skipped {
        warn!("skipped {} ({}:{}): {}", skipped.path, skipped.line, skipped.column, skipped.reason);
    }
    Ok(compilation)
}

/// `<input stem>.rs` in the working directory.
fn default_output(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or(input.as_os_str());
    PathBuf::from(stem).with_extension("rs")
}

async fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::GenRust { input, output, write_mode, pass } => {
            let compilation = compile(&input, &pass).await?;
            let target = match (output, write_mode) {
                (Some(path), _) => Some(path),
                (None, WriteMode::File) => Some(default_output(&input)),
                (None, WriteMode::Stdout) => None,
            };
            match target {
                Some(path) => {
                    fs::write(&path, &compilation.generated).map_err(CompileError::Io)?;
                    info!("generated Rust code written to {}", path.display());
                }
                None => println!("{}", compilation.generated),
            }
            Ok(())
        }

        Commands::Inspect { input, pass } => {
            let compilation = compile(&input, &pass).await?;
            println!("{}", compilation_to_json(&compilation)?);
            Ok(())
        }

        Commands::Tokens { input } => {
            let text = read_schema(&input)?;
            for token in Tokenizer::new(&text) {
                let token = token?;
                let line = serde_json::to_string(&token).map_err(CompileError::from)?;
                println!("{}", line);
            }
            Ok(())
        }

        Commands::Decode { input, frame, pass } => {
            let bytes = hex::decode(frame.trim())?;
            let compilation = compile(&input, &pass).await?;
            let value = compilation.decode_frame(&bytes)?;
            println!("{}", value_to_json(&value));
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // stdout carries generated code, so logs go to stderr.
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_uses_the_input_stem() {
        assert_eq!(default_output(Path::new("xml/ardrone3.xml")), PathBuf::from("ardrone3.rs"));
        assert_eq!(default_output(Path::new("common")), PathBuf::from("common.rs"));
    }

    #[test]
    fn cli_parses_pass_options() {
        let cli = Cli::parse_from([
            "arcmd", "gen-rust", "--input", "a.xml", "--write-mode", "file", "--window", "256",
        ]);
        match cli.command {
            Commands::GenRust { write_mode, pass, output, .. } => {
                assert!(write_mode == WriteMode::File);
                assert!(output.is_none());
                let options = CompileOptions::from(&pass);
                assert_eq!(options.window_capacity, 256);
                assert_eq!(options.channel_bound, DEFAULT_CHANNEL_BOUND);
            }
            _ => panic!("expected gen-rust"),
        }
    }

    #[tokio::test]
    async fn decode_reports_bad_hex() {
        let err = run(Commands::Decode {
            input: PathBuf::from("missing.xml"),
            frame: "0g".to_string(),
            pass:  PassArgs { window: 16, channel_bound: 4 },
        })
        .await
        .unwrap_err();
        assert!(matches!(err, CliError::Frame(_)));
    }
}
