//! Tokenizer for the state notation.

use crate::error::{Result, VariableError};
use crate::literal::is_decimal_literal;

/// Structural characters of the notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punct {
    OpenBracket,
    CloseBracket,
    OpenBrace,
    CloseBrace,
    Comma,
    Colon,
}

impl Punct {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '[' => Some(Punct::OpenBracket),
            ']' => Some(Punct::CloseBracket),
            '{' => Some(Punct::OpenBrace),
            '}' => Some(Punct::CloseBrace),
            ',' => Some(Punct::Comma),
            ':' => Some(Punct::Colon),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Punct::OpenBracket => '[',
            Punct::CloseBracket => ']',
            Punct::OpenBrace => '{',
            Punct::CloseBrace => '}',
            Punct::Comma => ',',
            Punct::Colon => ':',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A quoted string, already unescaped.
    Str(String),
    /// A numeric literal; `text` keeps the spelling for use as a map key.
    Number { value: f64, text: String },
    Bool(bool),
    /// An unquoted word that is neither a number nor a boolean.
    Bare(String),
    Punct(Punct),
}

/// A token and the byte offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub offset: usize,
}

fn is_bare_char(c: char) -> bool {
    !c.is_whitespace() && c != '"' && Punct::from_char(c).is_none()
}

/// Reverse the entity escaping applied to string contents.
pub(crate) fn unescape_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let (replacement, len) = if rest.starts_with("&amp;") {
            ('&', 5)
        } else if rest.starts_with("&lt;") {
            ('<', 4)
        } else if rest.starts_with("&gt;") {
            ('>', 4)
        } else {
            ('&', 1)
        };
        out.push(replacement);
        rest = &rest[len..];
    }
    out.push_str(rest);
    out
}

/// Split notation text into tokens.
pub fn tokenize(input: &str) -> Result<Vec<Spanned>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if let Some(punct) = Punct::from_char(c) {
            chars.next();
            tokens.push(Spanned {
                token: Token::Punct(punct),
                offset,
            });
            continue;
        }

        if c == '"' {
            chars.next();
            let mut raw = String::new();
            let mut closed = false;
            while let Some((_, c)) = chars.next() {
                match c {
                    '"' => {
                        closed = true;
                        break;
                    }
                    '\\' => match chars.next() {
                        Some((_, escaped @ ('"' | '\\'))) => raw.push(escaped),
                        Some((_, other)) => {
                            raw.push('\\');
                            raw.push(other);
                        }
                        None => break,
                    },
                    other => raw.push(other),
                }
            }
            if !closed {
                return Err(VariableError::MalformedState {
                    position: offset,
                    reason: "unterminated string".into(),
                });
            }
            tokens.push(Spanned {
                token: Token::Str(unescape_entities(&raw)),
                offset,
            });
            continue;
        }

        let mut word = String::new();
        while let Some(&(_, c)) = chars.peek() {
            if !is_bare_char(c) {
                break;
            }
            word.push(c);
            chars.next();
        }

        let token = match word.as_str() {
            "true" => Token::Bool(true),
            "false" => Token::Bool(false),
            w if is_decimal_literal(w) => match w.parse::<f64>() {
                Ok(value) if !value.is_finite() => {
                    return Err(VariableError::MalformedState {
                        position: offset,
                        reason: format!("number out of range: {w}"),
                    });
                }
                Ok(value) => Token::Number {
                    value,
                    text: word.clone(),
                },
                Err(_) => Token::Bare(word.clone()),
            },
            _ => Token::Bare(word.clone()),
        };
        tokens.push(Spanned { token, offset });
    }

    Ok(tokens)
}
