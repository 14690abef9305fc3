//! # HushTeX Log Tokenizer
//!
//! Streaming tokenizer for the terminal output of TeX engines (pdfTeX, XeTeX,
//! LuaTeX, etc.), with page and open-file state tracking.
//!
//! ## Overview
//!
//! TeX engine output has no line-based framing: messages span or share
//! physical lines, `(file.tex` / `)` markers nest and interleave with free
//! text, and `[1` / `]` page brackets can contain other tokens. This crate
//! turns that stream into a flat sequence of typed [`Token`](tokens::Token)s:
//!
//! - **File I/O markers**: `(path`, `)`, `{auxfile}`, `<image>`
//! - **Page markers**: `[<n>` and the matching `]`
//! - **Errors and warnings**: `!` lines, `Overfull`/`Underfull`, `Warning`
//! - **Everything else**: free text, preserved verbatim
//!
//! Tokenization is total and lossless: it never fails, and concatenating the
//! `text` of every token produced for a line reconstructs the line exactly.
//!
//! The [`status`] module consumes tokens to maintain the current page number
//! and the stack of open files, which is what a status bar displays.
//!
//! ## One-shot tokenization
//!
//! ```
//! use hushtex_log::{TokenKind, tokenize};
//!
//! let tokens = tokenize("(./main.tex [1]");
//! assert_eq!(tokens[0].kind, TokenKind::OpenFile);
//! assert_eq!(tokens[0].value.as_deref(), Some("./main.tex"));
//! ```
//!
//! ## Streaming
//!
//! ```
//! use hushtex_log::LogParser;
//!
//! let mut parser = LogParser::new();
//! let tokens = parser.update("(./main.tex\n! Undefined c");
//! // The complete first line produced tokens; the partial second line is
//! // buffered until more input (or `finish`) arrives.
//! assert_eq!(tokens.len(), 2);
//! let rest = parser.finish();
//! assert!(!rest.is_empty());
//! ```

/// Streaming tokenizer implementation.
pub mod parser;
/// Page and open-file state tracking.
pub mod status;
/// Typed token model.
pub mod tokens;

#[cfg(test)]
mod tests;

pub use parser::{LogParser, tokenize, tokenize_partial};
pub use status::AppState;
pub use tokens::{Token, TokenKind};
