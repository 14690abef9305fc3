//! Drives the compiler subprocess and relays its interactive prompt.
//!
//! One control loop alternates between a bounded-timeout read of compiler
//! output and, on timeout, a check for the engine's `? ` input prompt. A
//! read that times out while the pending buffer is exactly the prompt marker
//! means the engine is blocked waiting for input rather than still thinking.

use std::io::{self, IsTerminal, Read, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError, unbounded};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use log::debug;

use crate::frontend::TerminalFrontend;

const POLL_INTERVAL: Duration = Duration::from_millis(200);
const PROMPT: &str = "? ";
const CTRL_C: &[u8] = b"\x03";
const CTRL_D: &[u8] = b"\x04";

/// Runs the compiler command, filtering its output through `frontend`.
///
/// Returns the child's exit status; the caller is responsible for
/// propagating a non-zero status as its own exit code.
pub fn run_command<W: Write>(
    cmd: &[String],
    frontend: &mut TerminalFrontend<W>,
) -> Result<ExitStatus> {
    let (program, args) = cmd.split_first().context("empty command")?;
    debug!("spawning {program} {args:?}");
    let mut child = Command::new(program)
        .args(args)
        // Keep the engine from hard-wrapping its output at 79 columns.
        .env("max_print_line", "1000000000")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .with_context(|| format!("failed to run {program}"))?;

    let stdout = child.stdout.take().context("child stdout not captured")?;
    let mut child_stdin = child.stdin.take().context("child stdin not captured")?;
    let chunks = spawn_reader(stdout);
    pump_output(&chunks, frontend, &mut child_stdin, read_response)?;

    frontend.finish()?;
    drop(child_stdin);
    let status = child.wait().context("failed to wait for compiler")?;
    debug!("compiler exited with {status}");
    Ok(status)
}

/// The control loop: alternates a bounded-timeout read of compiler output
/// with, on timeout, the check for the engine's input prompt. `respond` is
/// how a detected prompt gets answered; the real runner reads the user's
/// terminal.
fn pump_output<W: Write>(
    chunks: &Receiver<String>,
    frontend: &mut TerminalFrontend<W>,
    child_stdin: &mut impl Write,
    mut respond: impl FnMut(&mut TerminalFrontend<W>) -> Result<PromptResponse>,
) -> Result<()> {
    let mut pending = String::new();
    loop {
        match chunks.recv_timeout(POLL_INTERVAL) {
            Ok(chunk) => {
                pending.push_str(&chunk);
                while let Some(nl) = pending.find('\n') {
                    let line: String = pending.drain(..=nl).collect();
                    frontend.print_line(line.trim_end_matches(['\r', '\n']), true)?;
                }
                if !pending.is_empty() {
                    frontend.print_line(pending.trim_end_matches('\r'), false)?;
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if pending == PROMPT {
                    handle_prompt(frontend, child_stdin, &mut pending, &mut respond)?;
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                if !pending.is_empty() {
                    let line = std::mem::take(&mut pending);
                    frontend.print_line(line.trim_end_matches('\r'), true)?;
                }
                break;
            }
        }
    }
    Ok(())
}

/// Forwards child stdout to a channel so the control loop can read with a
/// timeout. A multibyte character can straddle two reads, so an incomplete
/// trailing sequence is held back and prepended to the next read instead of
/// being decoded lossily.
fn spawn_reader(mut stdout: impl Read + Send + 'static) -> Receiver<String> {
    let (tx, rx) = unbounded();
    thread::spawn(move || {
        let mut buf = [0u8; 4096];
        let mut carry = Vec::new();
        loop {
            match stdout.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    carry.extend_from_slice(&buf[..n]);
                    let chunk = take_complete_utf8(&mut carry);
                    if !chunk.is_empty() && tx.send(chunk).is_err() {
                        return;
                    }
                }
            }
        }
        if !carry.is_empty() {
            // The stream ended mid-character; nothing more is coming.
            let _ = tx.send(String::from_utf8_lossy(&carry).into_owned());
        }
    });
    rx
}

/// Drains the longest prefix of `bytes` that does not end mid-character.
/// Truly invalid bytes decode to replacement characters; only a sequence the
/// next read could still complete is held back.
fn take_complete_utf8(bytes: &mut Vec<u8>) -> String {
    let split = match std::str::from_utf8(bytes) {
        Ok(_) => bytes.len(),
        Err(e) if e.error_len().is_none() => e.valid_up_to(),
        Err(_) => bytes.len(),
    };
    let chunk = String::from_utf8_lossy(&bytes[..split]).into_owned();
    bytes.drain(..split);
    chunk
}

enum PromptResponse {
    Line(String),
    Interrupt,
    EndOfInput,
}

/// Relays the engine's `? ` prompt to the user and their response back.
fn handle_prompt<W: Write>(
    frontend: &mut TerminalFrontend<W>,
    child_stdin: &mut impl Write,
    pending: &mut String,
    respond: &mut impl FnMut(&mut TerminalFrontend<W>) -> Result<PromptResponse>,
) -> Result<()> {
    // The prompt marker is consumed from the output stream: it is displayed
    // as a prompt, not as compiler output.
    let mut prompt = std::mem::take(pending);
    loop {
        frontend.prompt(&prompt)?;
        match respond(frontend)? {
            PromptResponse::Line(text) => {
                debug!("forwarding prompt response ({} bytes)", text.len());
                child_stdin.write_all(text.as_bytes())?;
                child_stdin.write_all(b"\n")?;
                child_stdin.flush()?;
                return Ok(());
            }
            PromptResponse::Interrupt => {
                // The engine acts on an interrupt at the end of the line and
                // then prompts again, so keep prompting for a real response.
                child_stdin.write_all(CTRL_C)?;
                child_stdin.flush()?;
                prompt.clear();
            }
            PromptResponse::EndOfInput => {
                child_stdin.write_all(CTRL_D)?;
                child_stdin.flush()?;
                return Ok(());
            }
        }
    }
}

fn read_response<W: Write>(frontend: &mut TerminalFrontend<W>) -> Result<PromptResponse> {
    if !io::stdin().is_terminal() {
        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            return Ok(PromptResponse::EndOfInput);
        }
        return Ok(PromptResponse::Line(
            line.trim_end_matches(['\r', '\n']).to_string(),
        ));
    }

    terminal::enable_raw_mode()?;
    let response = read_response_raw(frontend);
    terminal::disable_raw_mode()?;
    response
}

/// Reads one line of input key by key, echoing as it goes. Ctrl-C and
/// Ctrl-D map to the interrupt and end-of-input responses; this wait is
/// deliberately unbounded.
fn read_response_raw<W: Write>(frontend: &mut TerminalFrontend<W>) -> Result<PromptResponse> {
    let mut line = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                frontend.write_raw("^C\r\n")?;
                return Ok(PromptResponse::Interrupt);
            }
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                frontend.write_raw("^D\r\n")?;
                return Ok(PromptResponse::EndOfInput);
            }
            KeyCode::Enter => {
                frontend.write_raw("\r\n")?;
                return Ok(PromptResponse::Line(line));
            }
            KeyCode::Backspace => {
                if line.pop().is_some() {
                    frontend.write_raw("\x08 \x08")?;
                }
            }
            KeyCode::Char(c) => {
                line.push(c);
                let mut echo = [0u8; 4];
                frontend.write_raw(c.encode_utf8(&mut echo))?;
            }
            _ => {}
        }
    }
}
