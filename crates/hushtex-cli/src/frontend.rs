//! Terminal output driver: styled line printing plus the status bar.
//!
//! The status bar is a single line pinned to the bottom of the output: each
//! printed line first clears the previous status (and any unfinished line
//! repaint), writes the new content, then repaints the status without a
//! trailing newline. When the tracked page/file changes on a finished line,
//! the old status line is left behind in the scrollback instead of being
//! erased, so the history of status changes stays visible.

use std::io::{self, IsTerminal, Stdout, Write};

use crossterm::{
    cursor, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{self, ClearType},
};

use hushtex_log::{AppState, tokenize};

use crate::format::{Fragment, OutputMode, Style, contains_error, render};

pub struct TerminalFrontend<W: Write = Stdout> {
    out: W,
    mode: OutputMode,
    bell_on_error: bool,
    /// Cursor movement and colour are only used on a real terminal; when
    /// piped, only finished lines are written, with no status bar.
    tty: bool,
    state: AppState,
    keep_last_status: bool,
    last_status_len: usize,
    last_line_len: Option<usize>,
}

impl TerminalFrontend<Stdout> {
    pub fn new(mode: OutputMode, bell_on_error: bool) -> Self {
        let tty = io::stdout().is_terminal();
        Self::with_writer(io::stdout(), mode, bell_on_error, tty)
    }
}

impl<W: Write> TerminalFrontend<W> {
    pub fn with_writer(out: W, mode: OutputMode, bell_on_error: bool, tty: bool) -> Self {
        Self {
            out,
            mode,
            bell_on_error,
            tty,
            state: AppState::new(),
            keep_last_status: false,
            last_status_len: 0,
            last_line_len: None,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    fn terminal_width() -> usize {
        terminal::size().map(|(w, _)| w as usize).unwrap_or(80).max(1)
    }

    fn write_fragment(&mut self, fragment: &Fragment) -> io::Result<()> {
        if !self.tty {
            return queue!(self.out, Print(&fragment.text));
        }
        match fragment.style {
            Style::Plain => queue!(self.out, Print(&fragment.text)),
            Style::Dim | Style::Message => queue!(
                self.out,
                SetAttribute(Attribute::Dim),
                Print(&fragment.text),
                SetAttribute(Attribute::Reset),
            ),
            Style::Error => queue!(
                self.out,
                SetForegroundColor(Color::Red),
                SetAttribute(Attribute::Bold),
                Print(&fragment.text),
                SetAttribute(Attribute::Reset),
                ResetColor,
            ),
            Style::Warning => queue!(
                self.out,
                SetForegroundColor(Color::Yellow),
                Print(&fragment.text),
                ResetColor,
            ),
            Style::Status => queue!(
                self.out,
                SetForegroundColor(Color::Blue),
                Print(&fragment.text),
                ResetColor,
            ),
            Style::Prompt => queue!(
                self.out,
                SetForegroundColor(Color::Red),
                Print(&fragment.text),
                ResetColor,
            ),
        }
    }

    /// Clears the displayed status bar (and any unfinished line repaint), or
    /// finalises it with a newline when it was marked to be kept.
    fn clear_status(&mut self) -> io::Result<()> {
        if self.keep_last_status {
            queue!(self.out, Print("\n"))?;
            self.keep_last_status = false;
            return Ok(());
        }
        let width = Self::terminal_width();
        queue!(
            self.out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
        )?;
        for _ in 0..self.last_status_len / width {
            queue!(
                self.out,
                cursor::MoveUp(1),
                terminal::Clear(ClearType::CurrentLine),
            )?;
        }
        if let Some(len) = self.last_line_len.take() {
            for _ in 0..len / width + 1 {
                queue!(
                    self.out,
                    cursor::MoveUp(1),
                    terminal::Clear(ClearType::CurrentLine),
                )?;
            }
        }
        Ok(())
    }

    fn print_status(&mut self, status: String) -> io::Result<()> {
        self.last_status_len = status.chars().count();
        if !status.is_empty() {
            self.write_fragment(&Fragment::new(status, Style::Status))?;
        }
        Ok(())
    }

    /// Tokenizes, styles, and prints one line of compiler output.
    ///
    /// `finished` is false while the line is still growing (no newline seen
    /// yet); unfinished lines are repainted in place as more text arrives,
    /// and state changes are only committed once the line is finished.
    pub fn print_line(&mut self, line: &str, finished: bool) -> io::Result<()> {
        let tokens = tokenize(line);
        let fragments = render(&tokens, self.mode);
        let new_state = self.state.apply(&tokens);

        if !self.tty {
            if !finished {
                return Ok(());
            }
            for fragment in &fragments {
                self.write_fragment(fragment)?;
            }
            if !fragments.is_empty() || tokens.is_empty() {
                if self.bell_on_error && contains_error(&tokens) {
                    queue!(self.out, Print("\x07"))?;
                }
                queue!(self.out, Print("\n"))?;
            }
            self.state = new_state;
            return self.out.flush();
        }

        self.clear_status()?;
        let printed: usize = fragments.iter().map(|f| f.text.chars().count()).sum();
        for fragment in &fragments {
            self.write_fragment(fragment)?;
        }
        // A fully suppressed line prints nothing, not a lone newline; a line
        // that was blank to begin with still prints one.
        let wrote_line = !fragments.is_empty() || tokens.is_empty();
        if wrote_line {
            if self.bell_on_error && contains_error(&tokens) {
                queue!(self.out, Print("\x07"))?;
            }
            queue!(self.out, Print("\n"))?;
        }
        self.print_status(new_state.format_status())?;
        self.last_line_len = if finished || !wrote_line {
            None
        } else {
            Some(printed)
        };
        if finished && new_state != self.state {
            self.state = new_state;
            self.keep_last_status = true;
        }
        self.out.flush()
    }

    /// Prints an informational message from hushtex itself. Suppressed in
    /// quiet mode.
    pub fn log_message(&mut self, message: &str) -> io::Result<()> {
        if self.mode == OutputMode::Quiet {
            return Ok(());
        }
        if self.tty {
            self.clear_status()?;
        }
        self.write_fragment(&Fragment::new(message, Style::Message))?;
        queue!(self.out, Print("\n"))?;
        if self.tty {
            let status = self.state.format_status();
            self.print_status(status)?;
        }
        self.out.flush()
    }

    /// Clears the status bar and displays the compiler's interactive prompt.
    /// The status is not repainted until the next line of output.
    pub fn prompt(&mut self, text: &str) -> io::Result<()> {
        if self.tty {
            self.clear_status()?;
        }
        if !text.is_empty() {
            self.write_fragment(&Fragment::new(text, Style::Prompt))?;
        }
        self.out.flush()
    }

    /// Writes unstyled text immediately, for echoing prompt input.
    pub fn write_raw(&mut self, text: &str) -> io::Result<()> {
        queue!(self.out, Print(text))?;
        self.out.flush()
    }

    /// Terminates the status line when the compiler run ends.
    pub fn finish(&mut self) -> io::Result<()> {
        if self.tty {
            queue!(self.out, Print("\n"))?;
        }
        self.out.flush()
    }
}
