//! Scanner for Informix 4GL source text.
//!
//! The scanner matches the raw lexical classes in [`raw`] and maps them onto a
//! grammar's terminals. It has two entry points:
//!
//! - [`Scanner::scan`] tokenizes a whole document for the parser.
//! - [`Scanner::scan_line`] tokenizes one line given the [`LineState`] left by
//!   the previous line, so an editor can re-scan only the lines it shows.
//!
//! Whitespace is skipped. Comments are emitted as tokens. Input that matches
//! no terminal becomes an error token; scanning never stops early.

mod raw;
pub mod terminals;

pub use raw::{RawKind, Termination};
pub use terminals::{LiteralError, TokenValue};

use logos::Logos;
use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use crate::grammar::{Grammar, Highlight, TerminalId, TerminalKind, TokenCategory};

/// A scanned token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Matched terminal.
    pub terminal: TerminalId,
    /// Category of the terminal; `Error` for unmatched input.
    pub category: TokenCategory,
    /// Highlight class of the terminal.
    pub highlight: Highlight,
    /// Byte range in the scanned text.
    pub range: TextRange,
    /// 1-based line of the token start.
    pub line: u32,
    /// 1-based column of the token start, in characters.
    pub column: u32,
    /// Raw text.
    pub text: SmolStr,
    /// Decoded value.
    pub value: TokenValue,
    /// The construct continues past the end of this token: an unterminated
    /// string or a multi-line string cut at the end of a line.
    pub incomplete: bool,
    /// Description of a lexical error.
    pub error: Option<&'static str>,
}

impl Token {
    /// Returns `true` for tokens the parser skips.
    #[must_use]
    pub fn is_non_grammar(&self) -> bool {
        self.category == TokenCategory::Comment
    }

    /// Returns `true` for lexical error tokens.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.category == TokenCategory::Error
    }

    /// Returns the length of the token in bytes.
    #[must_use]
    pub fn len(&self) -> TextSize {
        self.range.len()
    }

    /// Returns true if the token has zero length.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Scanner state carried from one line to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LineState(pub u32);

impl LineState {
    /// Outside any multi-line construct.
    pub const NEUTRAL: LineState = LineState(0);
    /// Inside an `@"` string.
    pub const IN_VERBATIM_STRING: LineState = LineState(1);
    /// Inside a `'` string.
    pub const IN_QUOTED_STRING: LineState = LineState(2);

    /// Returns `true` outside any multi-line construct.
    #[must_use]
    pub fn is_neutral(self) -> bool {
        self == LineState::NEUTRAL
    }
}

/// Result of scanning one line.
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedLine {
    /// Tokens of the line; ranges are relative to the line start.
    pub tokens: Vec<Token>,
    /// State to pass to the next line.
    pub state: LineState,
}

/// Maps raw lexical classes onto the terminals of one grammar.
#[derive(Debug, Clone, Copy)]
pub struct Scanner<'g> {
    grammar: &'g Grammar,
    identifier: Option<TerminalId>,
    number: Option<TerminalId>,
    string: Option<TerminalId>,
    comment: Option<TerminalId>,
}

struct Position {
    offset: usize,
    line: u32,
    column: u32,
}

impl<'g> Scanner<'g> {
    /// Creates a scanner for `grammar`.
    #[must_use]
    pub fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            identifier: grammar.terminal_of_kind(TerminalKind::Identifier),
            number: grammar.terminal_of_kind(TerminalKind::Number),
            string: grammar.terminal_of_kind(TerminalKind::StringLiteral),
            comment: grammar.terminal_of_kind(TerminalKind::Comment),
        }
    }

    /// Returns the grammar this scanner serves.
    #[must_use]
    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    /// Tokenizes a whole document.
    ///
    /// Unterminated strings become error tokens flagged `incomplete`.
    #[must_use]
    pub fn scan(&self, source: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        self.scan_from(source, 0, &mut tokens, false);
        tokens
    }

    /// Tokenizes one line (without its line break), resuming in `state`.
    ///
    /// A multi-line string left open at the end of the line is emitted as an
    /// `incomplete` string token and reported in the returned state. Token
    /// lines are always 1; callers know which line they passed.
    #[must_use]
    pub fn scan_line(&self, line: &str, state: LineState) -> ScannedLine {
        let mut tokens = Vec::new();
        let quote = match state {
            LineState::IN_VERBATIM_STRING => Some(b'"'),
            LineState::IN_QUOTED_STRING => Some(b'\''),
            _ => None,
        };
        let mut start = 0;
        if let Some(quote) = quote {
            let (len, termination) = raw::scan_doubled(line, quote);
            let text = &line[..len];
            let open = termination == Termination::Open;
            if len > 0 {
                let mut token = self.token(
                    self.string.unwrap_or(TerminalId::ERROR),
                    text,
                    &Position {
                        offset: 0,
                        line: 1,
                        column: 1,
                    },
                );
                token.value = TokenValue::Text(terminals::doubled_body(text, quote));
                token.incomplete = open;
                tokens.push(token);
            }
            if open {
                return ScannedLine { tokens, state };
            }
            start = len;
        }
        let state = self.scan_from(line, start, &mut tokens, true);
        ScannedLine { tokens, state }
    }

    fn scan_from(
        &self,
        source: &str,
        start: usize,
        tokens: &mut Vec<Token>,
        line_mode: bool,
    ) -> LineState {
        let mut lexer = RawKind::lexer(&source[start..]);
        let mut position = Position {
            offset: 0,
            line: 1,
            column: 1,
        };
        advance(&mut position, &source[..start]);
        let mut out_state = LineState::NEUTRAL;

        while let Some(kind) = lexer.next() {
            let span = lexer.span();
            let (begin, end) = (start + span.start, start + span.end);
            let from = position.offset;
            advance(&mut position, &source[from..begin]);
            let text = &source[begin..end];

            let token = match kind {
                Ok(RawKind::Whitespace) => None,
                Ok(kind) => Some(self.classify(kind, text, &position, line_mode, &mut out_state)),
                Err(()) => Some(self.error(text, &position, UNEXPECTED_CHARACTER)),
            };
            if let Some(token) = token {
                push_merging_errors(tokens, token);
            }
            advance(&mut position, text);
        }
        out_state
    }

    fn classify(
        &self,
        kind: RawKind,
        text: &str,
        position: &Position,
        line_mode: bool,
        out_state: &mut LineState,
    ) -> Token {
        match kind {
            RawKind::Identifier => {
                if let Some(keyword) = self.grammar.keyword(text) {
                    return self.token(keyword, text, position);
                }
                let Some(identifier) = self.identifier else {
                    return self.error(text, position, "identifiers are not part of this grammar");
                };
                match terminals::identifier_value(text) {
                    Ok(value) => {
                        let mut token = self.token(identifier, text, position);
                        token.value = TokenValue::Text(value);
                        token
                    }
                    Err(error) => self.error(text, position, error.message()),
                }
            }
            RawKind::Number => {
                let Some(number) = self.number else {
                    return self.error(text, position, "numbers are not part of this grammar");
                };
                match terminals::number_value(text) {
                    Ok(value) => {
                        let mut token = self.token(number, text, position);
                        token.value = value;
                        token
                    }
                    Err(error) => self.error(text, position, error.message()),
                }
            }
            RawKind::Comment => match self.comment {
                Some(comment) => self.token(comment, text, position),
                None => self.error(text, position, "comments are not part of this grammar"),
            },
            RawKind::String(termination)
            | RawKind::VerbatimString(termination)
            | RawKind::QuotedString(termination) => {
                let multi_line = !matches!(kind, RawKind::String(_));
                if termination == Termination::Open && !(line_mode && multi_line) {
                    let mut token = self.error(text, position, "unterminated string");
                    token.incomplete = true;
                    return token;
                }
                let Some(string) = self.string else {
                    return self.error(text, position, "strings are not part of this grammar");
                };
                match terminals::string_value(text) {
                    Ok(value) => {
                        let mut token = self.token(string, text, position);
                        token.value = TokenValue::Text(value);
                        if termination == Termination::Open {
                            token.incomplete = true;
                            *out_state = if matches!(kind, RawKind::VerbatimString(_)) {
                                LineState::IN_VERBATIM_STRING
                            } else {
                                LineState::IN_QUOTED_STRING
                            };
                        }
                        token
                    }
                    Err(error) => self.error(text, position, error.message()),
                }
            }
            _ => match self.grammar.symbol(text) {
                Some(symbol) => self.token(symbol, text, position),
                None => self.error(text, position, "operator is not part of this grammar"),
            },
        }
    }

    fn token(&self, terminal: TerminalId, text: &str, position: &Position) -> Token {
        let definition = self.grammar.terminal(terminal);
        Token {
            terminal,
            category: definition.category(),
            highlight: definition.highlight(),
            range: range(position.offset, text.len()),
            line: position.line,
            column: position.column,
            text: SmolStr::new(text),
            value: TokenValue::None,
            incomplete: false,
            error: None,
        }
    }

    fn error(&self, text: &str, position: &Position, message: &'static str) -> Token {
        let mut token = self.token(TerminalId::ERROR, text, position);
        token.error = Some(message);
        token
    }
}

const UNEXPECTED_CHARACTER: &str = "unexpected character";

/// Adjacent unexpected characters form one error token.
fn push_merging_errors(tokens: &mut Vec<Token>, token: Token) {
    if token.error == Some(UNEXPECTED_CHARACTER) {
        if let Some(last) = tokens.last_mut() {
            if last.error == Some(UNEXPECTED_CHARACTER) && last.range.end() == token.range.start()
            {
                last.range = last.range.cover(token.range);
                let mut text = last.text.to_string();
                text.push_str(&token.text);
                last.text = SmolStr::new(text);
                return;
            }
        }
    }
    tokens.push(token);
}

fn range(offset: usize, len: usize) -> TextRange {
    TextRange::at(TextSize::from(offset as u32), TextSize::from(len as u32))
}

/// Moves `position` over `text`, counting `\r\n`, `\r`, `\n` and the Unicode
/// line separators as line breaks.
fn advance(position: &mut Position, text: &str) {
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                    position.offset += 1;
                }
                position.line += 1;
                position.column = 1;
            }
            '\n' | '\u{85}' | '\u{2028}' | '\u{2029}' => {
                position.line += 1;
                position.column = 1;
            }
            _ => position.column += 1,
        }
        position.offset += c.len_utf8();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Language;

    fn scanner() -> Scanner<'static> {
        Language::informix().scanner()
    }

    fn names(tokens: &[Token]) -> Vec<&'static str> {
        let grammar = Language::informix().grammar();
        tokens
            .iter()
            .map(|token| grammar.terminal(token.terminal).name())
            .collect()
    }

    fn dump(tokens: &[Token]) -> String {
        let grammar = Language::informix().grammar();
        tokens
            .iter()
            .map(|token| {
                format!(
                    "{} {:?} {:?}\n",
                    grammar.terminal(token.terminal).name(),
                    token.range,
                    token.text.as_str()
                )
            })
            .collect()
    }

    #[test]
    fn keywords_are_reserved_in_any_case() {
        let tokens = scanner().scan("define End x");
        assert_eq!(names(&tokens), ["DEFINE", "END", "Identifier"]);
        assert_eq!(tokens[1].highlight, Highlight::Keyword);
        assert_eq!(tokens[2].value, TokenValue::Text("x".into()));
    }

    #[test]
    fn token_dump() {
        let tokens = scanner().scan("LET a = 1.5 # note");
        insta::assert_snapshot!(dump(&tokens));
        assert!(tokens[4].is_non_grammar());
        assert_eq!(tokens[3].value, TokenValue::Float(1.5));
    }

    #[test]
    fn lines_and_columns() {
        let tokens = scanner().scan("MAIN\r\n  x # c\n\u{2028}é y");
        let positions: Vec<_> = tokens.iter().map(|t| (t.line, t.column)).collect();
        assert_eq!(positions, [(1, 1), (2, 3), (2, 5), (4, 1), (4, 3)]);
        assert_eq!(tokens[1].range, TextRange::new(8.into(), 9.into()));
        assert_eq!(tokens[2].category, TokenCategory::Comment);
    }

    #[test]
    fn unexpected_characters_merge() {
        let tokens = scanner().scan("x $$ y");
        assert_eq!(tokens.len(), 3);
        assert!(tokens[1].is_error());
        assert_eq!(tokens[1].text, "$$");
        assert_eq!(tokens[1].error, Some(UNEXPECTED_CHARACTER));
    }

    #[test]
    fn signed_hex_escape_is_a_lexical_error() {
        let tokens = scanner().scan(r#"LET s = "\u+123""#);
        let last = tokens.last().unwrap();
        assert!(last.is_error());
        assert_eq!(last.text, r#""\u+123""#);
        assert_eq!(last.error, Some("invalid escape sequence"));
    }

    #[test]
    fn unterminated_string_in_a_document() {
        let tokens = scanner().scan("LET s = 'abc");
        let last = tokens.last().unwrap();
        assert!(last.is_error());
        assert!(last.incomplete);
        assert_eq!(last.text, "'abc");

        let tokens = scanner().scan("LET s = \"abc\nEND");
        assert!(tokens[3].is_error());
        assert_eq!(tokens[3].text, "\"abc");
        assert_eq!(names(&tokens[4..]), ["END"]);
    }

    #[test]
    fn multi_line_string_in_a_document() {
        let tokens = scanner().scan("'one\ntwo' x");
        assert_eq!(names(&tokens), ["StringLiteral", "Identifier"]);
        assert_eq!(tokens[0].value, TokenValue::Text("one\ntwo".into()));
        assert_eq!((tokens[1].line, tokens[1].column), (2, 6));
    }

    #[test]
    fn line_mode_carries_open_strings() {
        let first = scanner().scan_line("LET s = 'abc", LineState::NEUTRAL);
        assert_eq!(first.state, LineState::IN_QUOTED_STRING);
        let open = first.tokens.last().unwrap();
        assert!(open.incomplete);
        assert_eq!(open.value, TokenValue::Text("abc".into()));

        let middle = scanner().scan_line("still open", first.state);
        assert_eq!(middle.state, LineState::IN_QUOTED_STRING);
        assert_eq!(middle.tokens.len(), 1);
        assert!(middle.tokens[0].incomplete);

        let last = scanner().scan_line("def' || x", middle.state);
        assert!(last.state.is_neutral());
        assert_eq!(names(&last.tokens), ["StringLiteral", "||", "Identifier"]);
        assert!(!last.tokens[0].incomplete);
        assert_eq!(last.tokens[0].value, TokenValue::Text("def".into()));

        let verbatim = scanner().scan_line("x = @\"a\"\"b", LineState::NEUTRAL);
        assert_eq!(verbatim.state, LineState::IN_VERBATIM_STRING);
        assert_eq!(
            verbatim.tokens.last().unwrap().value,
            TokenValue::Text("a\"b".into())
        );
    }

    #[test]
    fn empty_continuation_line() {
        let line = scanner().scan_line("", LineState::IN_VERBATIM_STRING);
        assert!(line.tokens.is_empty());
        assert_eq!(line.state, LineState::IN_VERBATIM_STRING);
    }
}
