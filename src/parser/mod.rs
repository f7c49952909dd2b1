//! C++ source code parser
//!
//! This module transforms C++ source text into a program unit:
//! - [`lexer`]: Tokenization (source text → tokens, with comments attached)
//! - [`parse`]: Parser state, speculation and the public entry points
//! - [`ast`]: Program unit node definitions
//!
//! The grammar itself is split by area: declarations, types and
//! declarators, statements and expressions.
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with precedence climbing for binary
//! operators. Ambiguous constructs are resolved by speculative parsing: the
//! parser saves its position, tries one reading and rewinds on failure.
//! Names declared as types are tracked while parsing so that later
//! statements can tell declarations from expressions.

pub mod ast;
mod declarations;
mod expressions;
pub mod lexer;
mod names;
pub mod parse;
mod statements;
mod types;

pub use names::{collect_type_names, BUILTIN_TYPEDEFS};
pub use parse::{parse_file, parse_str, ParseError, Parser, MAX_NESTING_DEPTH};
pub(crate) use statements::reads_as_declaration;
pub(crate) use types::reads_as_parameter_list;
