use crate::status::AppState;
use crate::tokens::{Token, TokenKind};
use crate::{LogParser, tokenize};

fn reconstruct(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

#[test]
fn test_tokenize_plain_text() {
    for msg in [
        "This is pdfTeX, Version 3.14159265-2.6-1.40.20 (TeX Live 2019) (preloaded format=pdflatex)",
        r" restricted \write18 enabled.",
        "LaTeX2e <2018-12-01>",
        "Document Class: article 2018/09/03 v1.4i Standard LaTeX document class",
        "Output written on test.pdf (1 page, 12659 bytes).",
        "Transcript written on test.log.",
    ] {
        assert_eq!(tokenize(msg), vec![Token::other(msg)], "input: {msg:?}");
    }
}

#[test]
fn test_tokenize_empty_line() {
    assert!(tokenize("").is_empty());
}

#[test]
fn test_tokenize_open_file_simple() {
    for file in [
        "./test.tex",
        "/usr/local/texlive/2019/texmf-dist/tex/latex/base/article.cls",
    ] {
        let line = format!("({file}");
        assert_eq!(tokenize(&line), vec![Token::open_file(line.as_str(), file)]);
    }
}

#[test]
fn test_tokenize_close_file_simple() {
    assert_eq!(tokenize(")"), vec![Token::close_file()]);
}

#[test]
fn test_tokenize_open_then_close() {
    assert_eq!(
        tokenize("(./test.tex)"),
        vec![
            Token::open_file("(./test.tex", "./test.tex"),
            Token::close_file(),
        ]
    );
}

#[test]
fn test_tokenize_nested_opens_and_closes() {
    assert_eq!(
        tokenize("(/a(/b(/c)))"),
        vec![
            Token::open_file("(/a", "/a"),
            Token::open_file("(/b", "/b"),
            Token::open_file("(/c", "/c"),
            Token::close_file(),
            Token::close_file(),
            Token::close_file(),
        ]
    );
}

#[test]
fn test_tokenize_many_files_one_line() {
    let line = ")) (/usr/a) (/usr/b (/usr/c (/usr/d)) (/usr/e) (/usr/f)) (/usr/g (/usr/h))";
    assert_eq!(
        tokenize(line),
        vec![
            Token::close_file(),
            Token::close_file(),
            Token::open_file(" (/usr/a", "/usr/a"),
            Token::close_file(),
            Token::open_file(" (/usr/b", "/usr/b"),
            Token::open_file(" (/usr/c", "/usr/c"),
            Token::open_file(" (/usr/d", "/usr/d"),
            Token::close_file(),
            Token::close_file(),
            Token::open_file(" (/usr/e", "/usr/e"),
            Token::close_file(),
            Token::open_file(" (/usr/f", "/usr/f"),
            Token::close_file(),
            Token::close_file(),
            Token::open_file(" (/usr/g", "/usr/g"),
            Token::open_file(" (/usr/h", "/usr/h"),
            Token::close_file(),
            Token::close_file(),
        ]
    );
    assert_eq!(reconstruct(&tokenize(line)), line);
}

#[test]
fn test_tokenize_package_text_between_markers() {
    // Package banners print between the open marker and the close marker.
    let parts = [
        "(/usr/local/texlive/2019/texmf-dist/tex/latex/fp/fp.sty",
        " `Fixed Point Package', Version 0.8, April 2, 1995 (C) Michael Mehlich",
        " (/usr/local/texlive/2019/texmf-dist/tex/latex/fp/defpattern.sty)",
    ];
    let line = parts.concat();
    assert_eq!(
        tokenize(&line),
        vec![
            Token::open_file(parts[0], parts[0].trim_start_matches('(')),
            Token::other(parts[1]),
            Token::open_file(
                &parts[2][..parts[2].len() - 1],
                parts[2].trim_matches([' ', '(', ')']),
            ),
            Token::close_file(),
        ]
    );
}

#[test]
fn test_tokenize_package_text_followed_by_close() {
    let parts = [
        "(/usr/local/texlive/2019/texmf-dist/tex/latex/fp/fp.sty",
        " `Fixed Point Package', Version 0.8, April 2, 1995 (C) Michael Mehlich)",
        " (/usr/local/texlive/2019/texmf-dist/tex/latex/fp/defpattern.sty)",
    ];
    let line = parts.concat();
    assert_eq!(
        tokenize(&line),
        vec![
            Token::open_file(parts[0], parts[0].trim_start_matches('(')),
            Token::other(&parts[1][..parts[1].len() - 1]),
            Token::close_file(),
            Token::open_file(
                &parts[2][..parts[2].len() - 1],
                parts[2].trim_matches([' ', '(', ')']),
            ),
            Token::close_file(),
        ]
    );
}

#[test]
fn test_tokenize_trailing_close_peel() {
    assert_eq!(
        tokenize("(/a some text))"),
        vec![
            Token::open_file("(/a", "/a"),
            Token::other(" some text"),
            Token::close_file(),
            Token::close_file(),
        ]
    );
}

#[test]
fn test_tokenize_balanced_parens_in_text_not_peeled() {
    // "(1 page, ...)" is message text, not a close marker.
    let line = "Output written on test.pdf (1 page, 12659 bytes)";
    assert_eq!(tokenize(line), vec![Token::other(line)]);
}

#[test]
fn test_tokenize_error_simple() {
    let line = "! Undefined control sequence.";
    assert_eq!(tokenize(line), vec![Token::error(line)]);
}

#[test]
fn test_tokenize_error_scoped_before_page() {
    // The error's literal keeps its trailing space; the page bracket is
    // tokenized as a fresh segment.
    assert_eq!(
        tokenize("! Undefined control sequence. [1]"),
        vec![
            Token::error("! Undefined control sequence. "),
            Token::start_page("[1", "1"),
            Token::end_page(),
        ]
    );
}

#[test]
fn test_tokenize_warning_simple() {
    let line = "LaTeX Warning: Reference `fig:x' on page 1 undefined on input line 10.";
    assert_eq!(tokenize(line), vec![Token::warning(line)]);
}

#[test]
fn test_tokenize_warning_case_insensitive() {
    let line = "Package hyperref warning: something odd.";
    assert_eq!(tokenize(line), vec![Token::warning(line)]);
}

#[test]
fn test_tokenize_underfull_with_page_and_image() {
    let line = "Underfull \\vbox (badness 10000) has occurred while \\output is active [2 <./img.png>]";
    let tokens = tokenize(line);
    assert_eq!(
        tokens,
        vec![
            Token::warning("Underfull \\vbox (badness 10000) has occurred while \\output is active "),
            Token::start_page("[2 ", "2"),
            Token::read_image("<./img.png>"),
            Token::end_page(),
        ]
    );
    assert_eq!(reconstruct(&tokens), line);
}

#[test]
fn test_tokenize_page_with_aux_read() {
    let line = "[1{/usr/local/texlive/2019/texmf-var/fonts/map/pdftex/updmap/pdftex.map}]";
    assert_eq!(
        tokenize(line),
        vec![
            Token::start_page("[1", "1"),
            Token::read_aux("{/usr/local/texlive/2019/texmf-var/fonts/map/pdftex/updmap/pdftex.map}"),
            Token::end_page(),
        ]
    );
}

#[test]
fn test_tokenize_image_with_note() {
    let line = " <./diagram.pdf (PNG copy)>";
    assert_eq!(tokenize(line), vec![Token::read_image(line)]);
}

#[test]
fn test_state_open_close_tracking() {
    let state = AppState::new();
    let state = state.apply(&tokenize("(/a(/b"));
    assert_eq!(state.current_file(), Some("/b"));
    let state = state.apply(&tokenize(")"));
    assert_eq!(state.current_file(), Some("/a"));
}

#[test]
fn test_state_unbalanced_close_recovery() {
    let state = AppState::new();
    let next = state.apply(&tokenize("))"));
    assert_eq!(next, state);
    assert!(next.file_stack.is_empty());
}

#[test]
fn test_state_page_tracking() {
    let mut state = AppState::new();
    for line in ["[1", "(./a.tex", "[2"] {
        state = state.apply(&tokenize(line));
    }
    assert_eq!(state.current_page, Some(2));
    assert_eq!(state.current_file(), Some("./a.tex"));
}

#[test]
fn test_status_formatting() {
    let mut state = AppState::new();
    assert_eq!(state.format_status(), "");
    state.current_page = Some(1);
    assert_eq!(state.format_status(), "[1]");
    state.file_stack.push("./test.tex".into());
    assert_eq!(state.format_status(), "[1] (./test.tex)");
    state.current_page = None;
    assert_eq!(state.format_status(), "(./test.tex)");
}

#[test]
fn test_streaming_newline_tokens() {
    let mut parser = LogParser::new();
    let tokens = parser.update("(./a.tex\n)\n");
    assert_eq!(
        tokens,
        vec![
            Token::open_file("(./a.tex", "./a.tex"),
            Token::newline(),
            Token::close_file(),
            Token::newline(),
        ]
    );
}

#[test]
fn test_streaming_partial_line_buffered() {
    let mut parser = LogParser::new();
    assert!(parser.update("! Undefined c").is_empty());
    let tokens = parser.update("ontrol sequence.\n");
    assert_eq!(
        tokens,
        vec![Token::error("! Undefined control sequence."), Token::newline()]
    );
}

#[test]
fn test_streaming_finish_flushes_buffer() {
    let mut parser = LogParser::new();
    assert!(parser.update("(./main.tex").is_empty());
    assert_eq!(
        parser.finish(),
        vec![Token::open_file("(./main.tex", "./main.tex")]
    );
}

#[test]
fn test_streaming_strips_carriage_returns() {
    let mut parser = LogParser::new();
    let tokens = parser.update("(./a.tex\r\n");
    assert_eq!(
        tokens,
        vec![Token::open_file("(./a.tex", "./a.tex"), Token::newline()]
    );
}

#[test]
fn test_token_json_shape() {
    let token = Token::open_file("(./a.tex", "./a.tex");
    let json = serde_json::to_value(&token).unwrap();
    assert_eq!(json["kind"], "OpenFile");
    assert_eq!(json["text"], "(./a.tex");
    assert_eq!(json["value"], "./a.tex");
    // Absent values are omitted, not null.
    let json = serde_json::to_value(Token::close_file()).unwrap();
    assert!(json.get("value").is_none());
}
