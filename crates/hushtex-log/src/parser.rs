use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::tokens::Token;

// The path heuristic is shared by the open-file, read-aux and read-image
// rules: no whitespace and none of the four bracketing characters. Filenames
// that contain balanced brackets are known false negatives, but the engine's
// own output format is not unambiguous either, so the heuristic stays.
static OPEN_FILE_AT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ ?\((\.?/[^\s(){}]+)").unwrap());
static CLOSE_FILE_AT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\)").unwrap());
static READ_AUX_AT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\{[^\s(){}]+\}").unwrap());
static READ_IMAGE_AT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ ?<[^\s(){}]+(?: \(.*\))?>").unwrap());
static START_PAGE_AT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ ?\[(\d+) ?").unwrap());
static END_PAGE_AT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\]").unwrap());

// Unanchored variants used to scan ahead from inside a run of free text.
// Only an open-file or a page marker can follow other messages on a line.
static OPEN_FILE_AHEAD: Lazy<Regex> = Lazy::new(|| Regex::new(r" ?\(\.?/[^\s(){}]+").unwrap());
// No leading space here: when a page bracket ends an error or warning line,
// the space before it belongs to the message.
static PAGE_AHEAD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\d+").unwrap());

type Build = fn(&Captures) -> Token;

struct Rule {
    pattern: &'static Lazy<Regex>,
    build: Build,
}

/// Ordered rule table tried at the cursor; the first match wins. The order
/// encodes the format's ambiguity-resolution rules.
static RULES: &[Rule] = &[
    Rule {
        pattern: &OPEN_FILE_AT,
        build: |c| Token::open_file(&c[0], &c[1]),
    },
    Rule {
        pattern: &CLOSE_FILE_AT,
        build: |_| Token::close_file(),
    },
    Rule {
        pattern: &READ_AUX_AT,
        build: |c| Token::read_aux(&c[0]),
    },
    Rule {
        pattern: &READ_IMAGE_AT,
        build: |c| Token::read_image(&c[0]),
    },
    Rule {
        pattern: &START_PAGE_AT,
        build: |c| Token::start_page(&c[0], &c[1]),
    },
    Rule {
        pattern: &END_PAGE_AT,
        build: |_| Token::end_page(),
    },
];

fn is_warning(line: &str) -> bool {
    if line.starts_with("Overfull") || line.starts_with("Underfull") {
        return true;
    }
    line.to_ascii_lowercase().contains("warning")
}

/// Position of the next open-file or page marker in `text`, if any.
fn next_token_start(text: &str) -> Option<usize> {
    let open = OPEN_FILE_AHEAD.find(text).map(|m| m.start());
    let page = PAGE_AHEAD.find(text).map(|m| m.start());
    match (open, page) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn count(text: &str, needle: u8) -> usize {
    text.bytes().filter(|&b| b == needle).count()
}

/// Strips unmatched trailing `)` off a run of free text.
///
/// Package-loading noise conventionally sits between an open marker and a
/// close marker, so when a skipped span ends with more `)` than `(` the
/// excess closes are real file-close markers, not message text. Parentheses
/// inside the span are assumed balanced.
fn peel_trailing_closes(text: &str) -> (&str, usize) {
    let mut rest = text;
    let mut closes = 0;
    while rest.ends_with(')') && count(rest, b'(') < count(rest, b')') {
        rest = &rest[..rest.len() - 1];
        closes += 1;
    }
    (rest, closes)
}

/// Splits as much of `text` as possible into tokens.
///
/// Returns the tokens and the unconsumed remainder. The remainder is text
/// the tokenizer could not classify yet; incremental callers can re-submit
/// it once more input arrives, and line-at-a-time callers fold it into a
/// trailing [`Other`](crate::TokenKind::Other) token (see [`tokenize`]).
pub fn tokenize_partial(text: &str) -> (Vec<Token>, &str) {
    let mut tokens = Vec::new();
    let mut text = text;

    'scan: while !text.is_empty() {
        for rule in RULES {
            if let Some(caps) = rule.pattern.captures(text) {
                let consumed = caps.get(0).unwrap().end();
                tokens.push((rule.build)(&caps));
                text = &text[consumed..];
                continue 'scan;
            }
        }

        // Nothing recognisable at the cursor: free text until the next
        // open-file or page marker, with trailing close markers peeled off.
        if let Some(start) = next_token_start(text) {
            let (msg, closes) = peel_trailing_closes(&text[..start]);
            if !msg.is_empty() {
                tokens.push(Token::other(msg));
            }
            tokens.extend(std::iter::repeat_with(Token::close_file).take(closes));
            text = &text[start..];
            continue;
        }

        if text.ends_with(')') {
            let (msg, closes) = peel_trailing_closes(text);
            if !msg.is_empty() {
                tokens.push(Token::other(msg));
            }
            tokens.extend(std::iter::repeat_with(Token::close_file).take(closes));
            text = "";
            continue;
        }

        break;
    }

    (tokens, text)
}

/// Extracts tokens from one line of output.
///
/// `line` must not contain a newline; the trailing newline should already be
/// stripped. Never fails: anything unrecognisable becomes an
/// [`Other`](crate::TokenKind::Other) token, and the concatenated `text` of
/// the returned tokens equals `line` exactly.
pub fn tokenize(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();

    // A page bracket can share a physical line with an error or warning, so
    // only the prefix before it is tested against those rules; the bracket
    // onward is tokenized as a fresh segment.
    let head_end = PAGE_AHEAD.find(line).map_or(line.len(), |m| m.start());
    let head = &line[..head_end];

    let mut rest = line;
    if head.starts_with('!') {
        tokens.push(Token::error(head));
        rest = &line[head_end..];
    } else if is_warning(head) {
        tokens.push(Token::warning(head));
        rest = &line[head_end..];
    }

    let (parsed, remainder) = tokenize_partial(rest);
    tokens.extend(parsed);
    if !remainder.is_empty() {
        tokens.push(Token::other(remainder));
    }
    tokens
}

/// A chunk-buffering tokenizer for live compiler output.
///
/// Chunks arrive with no framing guarantees; `LogParser` buffers them,
/// tokenizes each completed line, and emits a
/// [`Newline`](crate::TokenKind::Newline) token at each line boundary.
/// Partial trailing lines stay buffered until more input or [`finish`]
/// arrives.
///
/// [`finish`]: LogParser::finish
#[derive(Debug, Default)]
pub struct LogParser {
    buffer: String,
}

impl LogParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends input to the internal buffer and tokenizes completed lines.
    pub fn update(&mut self, input: &str) -> Vec<Token> {
        self.buffer.push_str(input);
        let mut tokens = Vec::new();
        while let Some(nl) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=nl).collect();
            let line = line.strip_suffix('\n').unwrap_or(&line);
            let line = line.strip_suffix('\r').unwrap_or(line);
            tokens.extend(tokenize(line));
            tokens.push(Token::newline());
        }
        tokens
    }

    /// Consumes the parser, tokenizing whatever is left in the buffer as a
    /// final (unterminated) line.
    pub fn finish(mut self) -> Vec<Token> {
        if self.buffer.is_empty() {
            return Vec::new();
        }
        let line = std::mem::take(&mut self.buffer);
        let line = line.strip_suffix('\r').unwrap_or(&line);
        tokenize(line)
    }
}
