//! Generates and runs the codegen integration test matrix.
//!
//! Every service template under the input tree is crossed with every serialization format and every topic layout.
//! Each resulting triple becomes one standalone test project, produced by a chain of external generators: the template
//! expander turns the template into a DTDL model, the schema generator derives schemas, a per-format type generator
//! builds the library types, and the envoy, case and test code generators finish the project.  None of those tools
//! are reimplemented here.  This crate only decides what to run, in which order, with which arguments, and where the
//! output goes.
//!
//! The pieces:
//!
//! - [parameters] holds the table describing the matrix and the location of every tool.
//! - [matrix] enumerates the triples, using [identity] for the names and paths of each.  Both drivers get their
//!   entries from here, so generation and execution cannot disagree about where a test lives.
//! - [toolchain] is the boundary with the external tools, one operation per tool.
//! - [generation] and [execution] are the two drivers.
//! - [reporter] formats what happened.
//!
//! Each generated test lives at `<gen_root>/<test_name>/` with `model/`, `schemas/<namespace>/`,
//! `dotnet/library/<namespace>/`, `dotnet/standalone/` and `cases/` beneath it.  Regenerating a test deletes that
//! directory first; nothing is ever merged.
pub mod errors;
pub mod execution;
pub mod filtering;
pub mod format;
pub mod generation;
pub mod identity;
pub mod matrix;
pub mod parameters;
pub mod reporter;
pub mod summary;
pub mod toolchain;
pub mod workspace;

pub use errors::*;
pub use format::{SerFormat, TypeStrategy};
pub use matrix::MatrixEntry;
pub use parameters::{Parameters, RawParameters, ToolPaths, TopicVariant};
