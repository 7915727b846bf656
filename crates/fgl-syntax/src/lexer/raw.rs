//! Raw lexical classes matched by `logos`.
//!
//! Keywords are not distinguished here: every word lexes as
//! [`RawKind::Identifier`] and is checked against the grammar's reserved words
//! afterwards, so one scanner serves any grammar declared with the builder.

use logos::Logos;

/// Whether a quoted form found its closing delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    /// The closing delimiter was consumed.
    Closed,
    /// Input or line ended first.
    Open,
}

fn is_line_break(c: char) -> bool {
    matches!(c, '\r' | '\n' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

fn double_quoted(lex: &mut logos::Lexer<RawKind>) -> Termination {
    let (len, termination) = scan_escaped(lex.remainder());
    lex.bump(len);
    termination
}

fn verbatim(lex: &mut logos::Lexer<RawKind>) -> Termination {
    let (len, termination) = scan_doubled(lex.remainder(), b'"');
    lex.bump(len);
    termination
}

fn single_quoted(lex: &mut logos::Lexer<RawKind>) -> Termination {
    let (len, termination) = scan_doubled(lex.remainder(), b'\'');
    lex.bump(len);
    termination
}

/// Scans the body of a `"` string: backslash escapes, no raw line breaks.
/// Returns the consumed length and whether the closing quote was found.
pub(crate) fn scan_escaped(body: &str) -> (usize, Termination) {
    let mut chars = body.char_indices().peekable();
    while let Some((index, c)) = chars.next() {
        match c {
            '"' => return (index + 1, Termination::Closed),
            '\\' => {
                if chars.peek().is_some_and(|&(_, next)| !is_line_break(next)) {
                    chars.next();
                }
            }
            c if is_line_break(c) => return (index, Termination::Open),
            _ => {}
        }
    }
    (body.len(), Termination::Open)
}

/// Scans the body of a string whose only escape is a doubled quote. Line
/// breaks are part of the string.
pub(crate) fn scan_doubled(body: &str, quote: u8) -> (usize, Termination) {
    let bytes = body.as_bytes();
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index] == quote {
            if bytes.get(index + 1) == Some(&quote) {
                index += 2;
                continue;
            }
            return (index + 1, Termination::Closed);
        }
        index += 1;
    }
    (bytes.len(), Termination::Open)
}

/// Raw token classes.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawKind {
    /// Whitespace, including the Unicode line separators and a byte order mark.
    #[regex(r"[ \t\r\n\x0B\x0C\u{85}\u{A0}\u{2028}\u{2029}\u{FEFF}]+")]
    Whitespace,

    /// `#` comment up to, not including, the line break.
    #[regex(r"#[^\r\n\u{85}\u{2028}\u{2029}]*")]
    Comment,

    /// Unicode identifier or reserved word. `\uXXXX` and `\UXXXXXXXX`
    /// escapes may appear anywhere, including the first position.
    #[regex(r"(?:[\p{Lu}\p{Ll}\p{Lt}\p{Lm}\p{Lo}\p{Nl}_]|\\u[0-9a-fA-F]{4}|\\U[0-9a-fA-F]{8})(?:[\p{Lu}\p{Ll}\p{Lt}\p{Lm}\p{Lo}\p{Nl}\p{Nd}\p{Pc}\p{Mc}\p{Mn}\p{Cf}]|\\u[0-9a-fA-F]{4}|\\U[0-9a-fA-F]{8})*")]
    Identifier,

    /// Decimal, fractional, exponent or hex number.
    #[regex(r"[0-9]+")]
    #[regex(r"[0-9]+\.[0-9]*(?:[eE][+-]?[0-9]+)?")]
    #[regex(r"\.[0-9]+(?:[eE][+-]?[0-9]+)?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+")]
    #[regex(r"0[xX][0-9a-fA-F]+")]
    Number,

    /// `"..."` with backslash escapes.
    #[token("\"", double_quoted)]
    String(Termination),

    /// `@"..."`: no escapes, `""` is a quote, may span lines.
    #[token("@\"", verbatim)]
    VerbatimString(Termination),

    /// `'...'`: `''` is a quote, may span lines.
    #[token("'", single_quoted)]
    QuotedString(Termination),

    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `,`
    #[token(",")]
    Comma,
    /// `;`
    #[token(";")]
    Semicolon,
    /// `:`
    #[token(":")]
    Colon,
    /// `.`
    #[token(".")]
    Dot,
    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `*`
    #[token("*")]
    Star,
    /// `/`
    #[token("/")]
    Slash,
    /// `=`
    #[token("=")]
    Eq,
    /// `==`
    #[token("==")]
    EqEq,
    /// `!=`
    #[token("!=")]
    NotEq,
    /// `<>`
    #[token("<>")]
    LtGt,
    /// `<`
    #[token("<")]
    Lt,
    /// `<=`
    #[token("<=")]
    LtEq,
    /// `>`
    #[token(">")]
    Gt,
    /// `>=`
    #[token(">=")]
    GtEq,
    /// `||`
    #[token("||")]
    Concat,
    /// `@`
    #[token("@")]
    At,
    /// `&`
    #[token("&")]
    Amp,
}

impl RawKind {
    /// Returns `true` for operator and punctuation kinds.
    #[must_use]
    pub fn is_operator(self) -> bool {
        !matches!(
            self,
            RawKind::Whitespace
                | RawKind::Comment
                | RawKind::Identifier
                | RawKind::Number
                | RawKind::String(_)
                | RawKind::VerbatimString(_)
                | RawKind::QuotedString(_)
        )
    }

    /// Returns the operator kind that lexes exactly `text`.
    #[must_use]
    pub fn operator(text: &str) -> Option<RawKind> {
        let mut lexer = RawKind::lexer(text);
        let kind = lexer.next()?.ok()?;
        let whole = lexer.span() == (0..text.len());
        (whole && kind.is_operator() && lexer.next().is_none()).then_some(kind)
    }
}
