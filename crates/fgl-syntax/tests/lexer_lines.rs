use fgl_syntax::grammar::TokenCategory;
use fgl_syntax::{scan, scan_line, LineState, Token};

fn bulk(source: &str) -> Vec<(String, TokenCategory)> {
    scan(source)
        .into_iter()
        .map(|token| (token.text.to_string(), token.category))
        .collect()
}

fn by_lines(source: &str) -> (Vec<(String, TokenCategory)>, LineState) {
    let mut state = LineState::NEUTRAL;
    let mut tokens: Vec<Token> = Vec::new();
    for line in source.lines() {
        let scanned = scan_line(line, state);
        tokens.extend(scanned.tokens);
        state = scanned.state;
    }
    let tokens = tokens
        .into_iter()
        .map(|token| (token.text.to_string(), token.category))
        .collect();
    (tokens, state)
}

#[test]
fn line_scan_matches_bulk_scan() {
    let source = "\
DATABASE stores
# customer listing
MAIN
  DEFINE r RECORD id INTEGER, cname CHAR(20) END RECORD
  LET r.id = 10 + 2.5e3 # trailing
  DISPLAY \"a \\\"quoted\\\" word\", r.cname, 'single'
  CALL f(r.id, [1])
END MAIN
";
    let (lines, state) = by_lines(source);
    assert_eq!(lines, bulk(source));
    assert!(state.is_neutral());
}

#[test]
fn multi_line_string_is_split_per_line() {
    let source = "LET s = 'first\nsecond\nthird'\nDISPLAY s\n";
    let bulk = scan(source);
    let string = bulk
        .iter()
        .find(|token| token.text.starts_with('\''))
        .unwrap();
    assert_eq!(string.text, "'first\nsecond\nthird'");

    let mut state = LineState::NEUTRAL;
    let mut states = Vec::new();
    let mut pieces = Vec::new();
    for line in source.lines() {
        let scanned = scan_line(line, state);
        state = scanned.state;
        states.push(state);
        pieces.extend(
            scanned
                .tokens
                .into_iter()
                .filter(|token| token.terminal == string.terminal)
                .map(|token| token.text.to_string()),
        );
    }
    assert_eq!(
        states,
        [
            LineState::IN_QUOTED_STRING,
            LineState::IN_QUOTED_STRING,
            LineState::NEUTRAL,
            LineState::NEUTRAL,
        ]
    );
    assert_eq!(pieces, ["'first", "second", "third'"]);
    assert_eq!(pieces.join("\n"), string.text);
}

#[test]
fn state_is_the_only_carried_context() {
    let tail = "still inside' LET x = 1";
    let inside = scan_line(tail, LineState::IN_QUOTED_STRING);
    let outside = scan_line(tail, LineState::NEUTRAL);
    assert_eq!(inside.tokens[0].text, "still inside'");
    assert_eq!(inside.state, LineState::NEUTRAL);
    assert_ne!(inside.tokens.len(), outside.tokens.len());
    assert_eq!(scan_line(tail, LineState::IN_QUOTED_STRING), inside);
}

#[test]
fn tokens_cover_the_source_in_order() {
    let source = "MAIN\n\tLET x=\"é\" # ünïcode\r\nEND MAIN";
    let tokens = scan(source);
    let mut last = 0;
    for token in &tokens {
        let start = usize::from(token.range.start());
        let end = usize::from(token.range.end());
        assert!(start >= last);
        assert_eq!(&source[start..end], token.text.as_str());
        assert!(source[last..start].chars().all(char::is_whitespace));
        last = end;
    }
    assert_eq!(source[last..].trim(), "");
}
