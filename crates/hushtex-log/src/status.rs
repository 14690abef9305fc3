use crate::tokens::{Token, TokenKind};

/// The page number and open-file stack implied by the tokens seen so far.
///
/// The stack grows on [`OpenFile`](TokenKind::OpenFile) and shrinks on
/// [`CloseFile`](TokenKind::CloseFile); the markers are not guaranteed to
/// balance across lines, so popping an empty stack is silently ignored.
/// Updates are pure: [`apply`](AppState::apply) returns a new value, which
/// makes "has the status changed" a plain equality check.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub current_page: Option<u32>,
    pub file_stack: Vec<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The file currently being read, i.e. the top of the stack.
    pub fn current_file(&self) -> Option<&str> {
        self.file_stack.last().map(String::as_str)
    }

    /// Returns a copy of the state advanced over `tokens`.
    pub fn apply(&self, tokens: &[Token]) -> AppState {
        let mut next = self.clone();
        for token in tokens {
            match token.kind {
                TokenKind::OpenFile => {
                    if let Some(path) = &token.value {
                        next.file_stack.push(path.clone());
                    }
                }
                TokenKind::CloseFile => {
                    next.file_stack.pop();
                }
                TokenKind::StartPage => {
                    if let Some(page) = token.page_number() {
                        next.current_page = Some(page);
                    }
                }
                _ => {}
            }
        }
        next
    }

    /// The status-bar text: `[<page>] (<file>)`, with either part omitted
    /// when absent, or an empty string when both are.
    pub fn format_status(&self) -> String {
        match (self.current_page, self.current_file()) {
            (Some(page), Some(file)) => format!("[{page}] ({file})"),
            (Some(page), None) => format!("[{page}]"),
            (None, Some(file)) => format!("({file})"),
            (None, None) => String::new(),
        }
    }
}
