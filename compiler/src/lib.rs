//! arcmd-compiler
//!
//! This crate implements:
//!  1) A tokenizer for ARSDK-style XML command schemas, run as a producer task,
//!  2) A bounded lookahead window over the token stream,
//!  3) The schema walker (path tracking, partial-window extraction, duplicate
//!     name resolution, argument collection),
//!  4) Code generation (`compile_schema_to_rust` → `String`),
//!  5) Error types (`CompileError`).

pub mod error;
pub mod types;
pub mod utils;
pub mod tokenizer;
pub mod window;
pub mod path;
pub mod extract;
pub mod registry;
pub mod arguments;
pub mod walker;
pub mod compiler;
pub mod gen_rust;

pub use compiler::compile_schema;
pub use compiler::compile_schema_to_rust;
pub use compiler::CompileOptions;
pub use error::CompileError;
pub use types::Compilation;
