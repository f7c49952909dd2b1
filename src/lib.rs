//! # Introduction
//!
//! cpprecon parses a C++ translation unit into an in-memory program unit
//! and writes it back out as equivalent source text.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Parser → ProgramUnit → Writer → Source
//! ```
//!
//! 1. [`parser`] tokenises the source (keeping comments) and builds the
//!    program unit. Declaration/expression ambiguities are settled by
//!    speculative parsing against the type names declared so far.
//! 2. [`writer`] walks the unit depth-first and emits source text with
//!    normalised indentation and brace placement, recomputing parentheses
//!    from operator precedence.
//! 3. [`error`] separates unreadable input from unparsable input.
//!
//! Re-parsing the writer's output yields a structurally equal unit
//! (formatting metadata such as locations is ignored by `==`).
//!
//! ## Supported C++ subset
//!
//! Namespaces, classes with access sections and inheritance, enums, templates
//! (including specializations and explicit instantiations), functions with
//! member initializers, lambdas, the usual statements including `switch`,
//! `try`/`catch` and range-based `for`, and expressions from literals through
//! `new`/`delete`, named casts and fold expressions. Bit-fields may be
//! unnamed, and `alignas` is accepted on classes and declarations.
//! Preprocessor lines are carried through verbatim.
//!
//! Assignment operators are not accepted as fold operators. Nesting deeper
//! than [`parser::MAX_NESTING_DEPTH`] levels is rejected with a parse error.

pub mod error;
pub mod parser;
pub mod writer;

pub use error::Error;
pub use parser::{parse_file, parse_str, ParseError};
pub use writer::{BraceStyle, Writer, WriterOptions};
