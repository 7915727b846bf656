//! Value decoding for identifier, string and number tokens.

use smol_str::SmolStr;

use super::raw::{scan_doubled, scan_escaped, Termination};

/// Ranges of the Unicode `Cf` (format) category.
const FORMAT_CHARACTERS: &[(char, char)] = &[
    ('\u{AD}', '\u{AD}'),
    ('\u{600}', '\u{605}'),
    ('\u{61C}', '\u{61C}'),
    ('\u{6DD}', '\u{6DD}'),
    ('\u{70F}', '\u{70F}'),
    ('\u{890}', '\u{891}'),
    ('\u{8E2}', '\u{8E2}'),
    ('\u{180E}', '\u{180E}'),
    ('\u{200B}', '\u{200F}'),
    ('\u{202A}', '\u{202E}'),
    ('\u{2060}', '\u{2064}'),
    ('\u{2066}', '\u{206F}'),
    ('\u{FEFF}', '\u{FEFF}'),
    ('\u{FFF9}', '\u{FFFB}'),
    ('\u{110BD}', '\u{110BD}'),
    ('\u{110CD}', '\u{110CD}'),
    ('\u{13430}', '\u{1343F}'),
    ('\u{1BCA0}', '\u{1BCA3}'),
    ('\u{1D173}', '\u{1D17A}'),
    ('\u{E0001}', '\u{E0001}'),
    ('\u{E0020}', '\u{E007F}'),
];

/// Parsed value of a token.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TokenValue {
    /// No value: keywords, operators, comments, errors.
    #[default]
    None,
    /// Identifier with escapes decoded and format characters removed, or an
    /// unescaped string body.
    Text(SmolStr),
    /// Integer literal.
    Integer(i64),
    /// Fractional or exponent literal, or an integer too large for `i64`.
    Float(f64),
}

impl TokenValue {
    /// Returns the text value, if any.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TokenValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Why a literal could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralError {
    /// Unknown or truncated escape sequence.
    InvalidEscape,
    /// Escape naming a value that is not a Unicode scalar.
    InvalidCodePoint,
    /// Number out of range or malformed.
    InvalidNumber,
}

impl LiteralError {
    /// Human-readable description.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            LiteralError::InvalidEscape => "invalid escape sequence",
            LiteralError::InvalidCodePoint => "escape is not a valid character",
            LiteralError::InvalidNumber => "malformed number",
        }
    }
}

fn hex_char(digits: &str) -> Result<char, LiteralError> {
    // `from_str_radix` also accepts a sign.
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(LiteralError::InvalidEscape);
    }
    let value = u32::from_str_radix(digits, 16).map_err(|_| LiteralError::InvalidEscape)?;
    char::from_u32(value).ok_or(LiteralError::InvalidCodePoint)
}

/// Decodes an identifier: resolves `\u`/`\U` escapes and strips format
/// characters such as zero-width joiners.
///
/// # Errors
///
/// Fails if an escape does not name a Unicode scalar value.
pub fn identifier_value(text: &str) -> Result<SmolStr, LiteralError> {
    if !text.contains('\\') && text.is_ascii() {
        return Ok(SmolStr::new(text));
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        if c == '\\' {
            let width = match rest.as_bytes().get(1) {
                Some(b'u') => 4,
                Some(b'U') => 8,
                _ => return Err(LiteralError::InvalidEscape),
            };
            let digits = rest.get(2..2 + width).ok_or(LiteralError::InvalidEscape)?;
            let decoded = hex_char(digits)?;
            if !is_format(decoded) {
                out.push(decoded);
            }
            rest = &rest[2 + width..];
        } else {
            if !is_format(c) {
                out.push(c);
            }
            rest = &rest[c.len_utf8()..];
        }
    }
    Ok(SmolStr::new(out))
}

fn is_format(c: char) -> bool {
    FORMAT_CHARACTERS
        .binary_search_by(|&(low, high)| {
            if high < c {
                std::cmp::Ordering::Less
            } else if low > c {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Equal
            }
        })
        .is_ok()
}

/// Decodes any of the three string forms, including the delimiters.
/// Unterminated bodies are decoded up to the end of `text`.
///
/// # Errors
///
/// Fails on a malformed escape in a `"` string.
pub fn string_value(text: &str) -> Result<SmolStr, LiteralError> {
    if let Some(body) = text.strip_prefix("@\"") {
        Ok(doubled_body(body, b'"'))
    } else if let Some(body) = text.strip_prefix('\'') {
        Ok(doubled_body(body, b'\''))
    } else if let Some(body) = text.strip_prefix('"') {
        let (len, termination) = scan_escaped(body);
        match termination {
            Termination::Closed => unescape(&body[..len - 1]),
            Termination::Open => unescape(&body[..len]),
        }
    } else {
        Ok(SmolStr::new(text))
    }
}

/// Decodes the body of a doubled-quote string, starting after the opening
/// delimiter. A closing delimiter, if present, is dropped.
pub(crate) fn doubled_body(body: &str, quote: u8) -> SmolStr {
    let (len, termination) = scan_doubled(body, quote);
    let inner = match termination {
        Termination::Closed => &body[..len - 1],
        Termination::Open => &body[..len],
    };
    let quote = char::from(quote);
    SmolStr::new(inner.replace(&format!("{quote}{quote}"), &quote.to_string()))
}

fn unescape(body: &str) -> Result<SmolStr, LiteralError> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.char_indices();
    while let Some((index, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some((_, escape)) = chars.next() else {
            return Err(LiteralError::InvalidEscape);
        };
        let decoded = match escape {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'a' => '\u{07}',
            'b' => '\u{08}',
            'f' => '\u{0C}',
            'v' => '\u{0B}',
            '0' => '\0',
            '\\' | '"' | '\'' => escape,
            'u' | 'U' | 'x' => {
                let start = index + 2;
                let width = match escape {
                    'u' => 4,
                    'U' => 8,
                    _ => body[start..]
                        .chars()
                        .take(4)
                        .take_while(char::is_ascii_hexdigit)
                        .count(),
                };
                let digits = body
                    .get(start..start + width)
                    .filter(|d| !d.is_empty())
                    .ok_or(LiteralError::InvalidEscape)?;
                for _ in 0..width {
                    chars.next();
                }
                hex_char(digits)?
            }
            _ => return Err(LiteralError::InvalidEscape),
        };
        out.push(decoded);
    }
    Ok(SmolStr::new(out))
}

/// Decodes a number literal.
///
/// # Errors
///
/// Fails on a hex literal wider than 64 bits or text that is not a number.
pub fn number_value(text: &str) -> Result<TokenValue, LiteralError> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16)
            .map(|value| TokenValue::Integer(value as i64))
            .map_err(|_| LiteralError::InvalidNumber);
    }
    if text.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(value) = text.parse::<i64>() {
            return Ok(TokenValue::Integer(value));
        }
    }
    text.parse::<f64>()
        .map(TokenValue::Float)
        .map_err(|_| LiteralError::InvalidNumber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_escapes_and_format_characters() {
        assert_eq!(identifier_value("abc").unwrap(), "abc");
        assert_eq!(identifier_value("\\u0041bc").unwrap(), "Abc");
        assert_eq!(identifier_value("x\\U0001F600").unwrap(), "x\u{1F600}");
        assert_eq!(identifier_value("a\u{200D}b").unwrap(), "ab");
        assert_eq!(identifier_value("a\\u200Db").unwrap(), "ab");
        assert_eq!(identifier_value("\\u+041"), Err(LiteralError::InvalidEscape));
        assert_eq!(
            identifier_value("\\uD800"),
            Err(LiteralError::InvalidCodePoint)
        );
    }

    #[test]
    fn double_quoted_escapes() {
        assert_eq!(string_value(r#""a\tb\n""#).unwrap(), "a\tb\n");
        assert_eq!(string_value(r#""say \"hi\"""#).unwrap(), "say \"hi\"");
        assert_eq!(string_value(r#""\u00e9\x41""#).unwrap(), "éA");
        assert_eq!(string_value(r#""back\\""#).unwrap(), "back\\");
        assert_eq!(string_value(r#""\q""#), Err(LiteralError::InvalidEscape));
        assert_eq!(string_value(r#""\u12""#), Err(LiteralError::InvalidEscape));
        assert_eq!(string_value(r#""\u+123""#), Err(LiteralError::InvalidEscape));
        assert_eq!(string_value(r#""\U-0000041""#), Err(LiteralError::InvalidEscape));
    }

    #[test]
    fn doubled_quote_forms() {
        assert_eq!(string_value("'it''s'").unwrap(), "it's");
        assert_eq!(string_value("@\"c:\\dir \"\"x\"\"\"").unwrap(), "c:\\dir \"x\"");
        assert_eq!(string_value("'line one\nline two'").unwrap(), "line one\nline two");
        assert_eq!(string_value("'open").unwrap(), "open");
    }

    #[test]
    fn numbers() {
        assert_eq!(number_value("42").unwrap(), TokenValue::Integer(42));
        assert_eq!(number_value("0x1F").unwrap(), TokenValue::Integer(31));
        assert_eq!(number_value("2.5").unwrap(), TokenValue::Float(2.5));
        assert_eq!(number_value(".5").unwrap(), TokenValue::Float(0.5));
        assert_eq!(number_value("7.").unwrap(), TokenValue::Float(7.0));
        assert_eq!(number_value("1e3").unwrap(), TokenValue::Float(1000.0));
        assert_eq!(
            number_value("99999999999999999999").unwrap(),
            TokenValue::Float(1e20)
        );
        assert_eq!(
            number_value("0x1FFFFFFFFFFFFFFFFF"),
            Err(LiteralError::InvalidNumber)
        );
    }
}
