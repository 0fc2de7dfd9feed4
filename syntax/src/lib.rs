//! Parsers for the small value grammars accepted on the command line
//! and in environment variables.

#[macro_use]
mod macros;
mod parse;
pub use parse::{assignment, blob_path, list, options, pairs, span, Error, Options, Span, SpanUnit};
