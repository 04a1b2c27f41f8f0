/*!
# Rust Language Module

This Rust module turns kernel source text into definitions ready for
the dictionary compiler: one definition per line, whitespace separated,
with local labels and byte-mode spans.

*/

#[macro_use]
mod error;
mod label;
mod lex;
mod parse;
mod token;

pub use error::Error;
pub use error::ErrorCode;
pub use error::LineNumber;
pub use label::resolve_labels;
pub use lex::lex;
pub use parse::{parse, Definition};
pub use token::{Token, BYTE_MODE_TOKEN, RAW_DIRECTIVE, USER_DIRECTIVE};

#[cfg(test)]
mod tests;
