//! Mapping from token kinds to display styles.

use hushtex_log::{Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Hide file I/O messages entirely.
    Quiet,
    /// Dim file I/O messages instead of hiding them.
    Verbose,
}

/// Display styles for output fragments. `Status`, `Prompt` and `Message` are
/// for lines the frontend generates itself rather than for compiler tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Plain,
    Dim,
    Error,
    Warning,
    Status,
    Prompt,
    Message,
}

/// A run of text plus the style it should be displayed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
    pub style: Style,
}

impl Fragment {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// The style a token kind is displayed with, or `None` to suppress it.
///
/// Page markers are suppressed in both modes: their information reaches the
/// user through the status bar instead.
pub fn style_for(kind: TokenKind, mode: OutputMode) -> Option<Style> {
    match kind {
        TokenKind::Error => Some(Style::Error),
        TokenKind::Warning => Some(Style::Warning),
        TokenKind::Other | TokenKind::Newline => Some(Style::Plain),
        TokenKind::OpenFile
        | TokenKind::CloseFile
        | TokenKind::ReadAux
        | TokenKind::ReadImage => match mode {
            OutputMode::Verbose => Some(Style::Dim),
            OutputMode::Quiet => None,
        },
        TokenKind::StartPage | TokenKind::EndPage => None,
    }
}

/// Maps tokens to styled fragments, dropping suppressed kinds.
pub fn render(tokens: &[Token], mode: OutputMode) -> Vec<Fragment> {
    tokens
        .iter()
        .filter_map(|token| {
            style_for(token.kind, mode).map(|style| Fragment::new(token.text.clone(), style))
        })
        .collect()
}

pub fn contains_error(tokens: &[Token]) -> bool {
    tokens.iter().any(|t| t.kind == TokenKind::Error)
}
