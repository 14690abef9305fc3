use hushtex_log::{LogParser, Token, tokenize};

/// Feeding the stream in tiny chunks must produce the same tokens as feeding
/// it whole: chunk boundaries carry no meaning.
#[test]
fn tiny_chunks_match_whole_input() {
    let input = include_str!("fixtures/simple.log");

    let mut whole = LogParser::new();
    let mut expected = whole.update(input);
    expected.extend(whole.finish());

    let mut chunked = LogParser::new();
    let mut actual = Vec::new();
    for chunk in input.as_bytes().chunks(3) {
        let s = std::str::from_utf8(chunk).unwrap();
        actual.extend(chunked.update(s));
    }
    actual.extend(chunked.finish());

    assert_eq!(expected, actual);
}

#[test]
fn stream_matches_per_line_tokenization() {
    let input = include_str!("fixtures/simple.log");

    let mut parser = LogParser::new();
    let mut streamed = parser.update(input);
    streamed.extend(parser.finish());

    let mut expected = Vec::new();
    for line in input.lines() {
        expected.extend(tokenize(line));
        expected.push(Token::newline());
    }

    assert_eq!(streamed, expected);
}

#[test]
fn open_file_split_across_chunks() {
    let mut parser = LogParser::new();
    assert!(parser.update("(./m").is_empty());
    let tokens = parser.update("ain.tex\n");
    assert_eq!(tokens[0], Token::open_file("(./main.tex", "./main.tex"));
}

#[test]
fn finish_on_empty_stream_is_empty() {
    let parser = LogParser::new();
    assert!(parser.finish().is_empty());
}
