//! A compiler from Plasma, a small statically typed language with
//! indentation-delimited blocks, into Python source.

/// The lexer takes the source input, mapping it into a sequence of tokens.
pub mod lexer;

/// The parser takes a sequence of tokens, mapping it into an AST.
pub mod parser;

/// The type checker takes an untyped AST, checks the soundness of its types,
/// and maps it into a typed AST.
pub mod type_checker;

/// The code generator takes a typed AST, mapping it into Python source.
pub mod code_gen;

pub mod ast;
pub mod diagnostic;
pub mod token;
pub mod types;
pub mod util;

mod pipeline;

pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use pipeline::{compile, print_tree, tokenize, Options};
