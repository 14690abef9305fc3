use serde::{Deserialize, Serialize};

/// The closed set of things the tokenizer can recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// `(path`: the engine started reading a file.
    OpenFile,
    /// A bare `)`: the engine finished reading a file.
    CloseFile,
    /// `{path}`: an inline font-map or auxiliary file read.
    ReadAux,
    /// `<path>` or `<path (note)>`: an inline image or font load.
    ReadImage,
    /// `[<n>`: the engine started shipping out page `n`.
    StartPage,
    /// A bare `]` ending a page marker.
    EndPage,
    /// A segment beginning with `!`.
    Error,
    /// An `Overfull`/`Underfull` box report or a line mentioning "warning".
    Warning,
    /// Free text not matched by anything above.
    Other,
    /// A line boundary, emitted by the streaming parser.
    Newline,
}

/// One recognised run of input.
///
/// `text` is the exact substring consumed, including any leading delimiter or
/// whitespace; concatenating the `text` of every token produced for a line
/// reconstructs the line byte for byte. `value` carries the captured file
/// path for [`TokenKind::OpenFile`] and the captured digits for
/// [`TokenKind::StartPage`], and is absent otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>, value: Option<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            value,
        }
    }

    pub fn open_file(text: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(TokenKind::OpenFile, text, Some(path.into()))
    }

    pub fn close_file() -> Self {
        Self::new(TokenKind::CloseFile, ")", None)
    }

    pub fn read_aux(text: impl Into<String>) -> Self {
        Self::new(TokenKind::ReadAux, text, None)
    }

    pub fn read_image(text: impl Into<String>) -> Self {
        Self::new(TokenKind::ReadImage, text, None)
    }

    pub fn start_page(text: impl Into<String>, digits: impl Into<String>) -> Self {
        Self::new(TokenKind::StartPage, text, Some(digits.into()))
    }

    pub fn end_page() -> Self {
        Self::new(TokenKind::EndPage, "]", None)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(TokenKind::Error, text, None)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(TokenKind::Warning, text, None)
    }

    pub fn other(text: impl Into<String>) -> Self {
        Self::new(TokenKind::Other, text, None)
    }

    pub fn newline() -> Self {
        Self::new(TokenKind::Newline, "\n", None)
    }

    /// The page number carried by a [`TokenKind::StartPage`] token.
    pub fn page_number(&self) -> Option<u32> {
        match self.kind {
            TokenKind::StartPage => self.value.as_deref().and_then(|v| v.parse().ok()),
            _ => None,
        }
    }
}
