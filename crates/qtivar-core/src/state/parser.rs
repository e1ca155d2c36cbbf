//! Recursive-descent parser over the state notation tokens.

use super::lexer::{tokenize, Punct, Spanned, Token};
use super::{StateMap, StateValue};
use crate::error::{Result, VariableError};

/// Deepest list/map nesting accepted before parsing gives up.
pub const MAX_NESTING: usize = 128;

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    end: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Spanned>, end: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            end,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |s| s.offset)
    }

    fn error(&self, reason: impl Into<String>) -> VariableError {
        VariableError::MalformedState {
            position: self.offset(),
            reason: reason.into(),
        }
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|s| s.token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Commas and colons carry no meaning between tokens.
    fn skip_separators(&mut self) {
        while matches!(
            self.peek(),
            Some(Token::Punct(Punct::Comma | Punct::Colon))
        ) {
            self.pos += 1;
        }
    }

    fn parse_value(&mut self) -> Result<StateValue> {
        let offset = self.offset();
        let Some(token) = self.advance() else {
            return Err(self.error("unexpected end of input"));
        };
        match token {
            Token::Str(s) => Ok(StateValue::String(s)),
            Token::Number { value, .. } => Ok(StateValue::Number(value)),
            Token::Bool(b) => Ok(StateValue::Bool(b)),
            Token::Punct(open @ (Punct::OpenBracket | Punct::OpenBrace)) => {
                if self.depth == MAX_NESTING {
                    return Err(VariableError::MalformedState {
                        position: offset,
                        reason: format!("nesting deeper than {MAX_NESTING} levels"),
                    });
                }
                self.depth += 1;
                let value = if open == Punct::OpenBracket {
                    self.parse_list()
                } else {
                    self.parse_map()
                };
                self.depth -= 1;
                value
            }
            Token::Punct(p) => Err(VariableError::MalformedState {
                position: offset,
                reason: format!("unexpected '{}'", p.as_char()),
            }),
            Token::Bare(word) => Err(VariableError::MalformedState {
                position: offset,
                reason: format!("unexpected bare word {word:?}"),
            }),
        }
    }

    fn parse_list(&mut self) -> Result<StateValue> {
        let mut items = Vec::new();
        loop {
            self.skip_separators();
            match self.peek() {
                None => return Err(self.error("unterminated list")),
                Some(Token::Punct(Punct::CloseBracket)) => {
                    self.pos += 1;
                    return Ok(StateValue::List(items));
                }
                Some(_) => items.push(self.parse_value()?),
            }
        }
    }

    fn parse_key(&mut self) -> Result<String> {
        let offset = self.offset();
        match self.advance() {
            Some(Token::Bare(key)) | Some(Token::Str(key)) => Ok(key),
            Some(Token::Number { text, .. }) => Ok(text),
            Some(Token::Bool(b)) => Ok(b.to_string()),
            Some(Token::Punct(p)) => Err(VariableError::MalformedState {
                position: offset,
                reason: format!("expected map key, found '{}'", p.as_char()),
            }),
            None => Err(self.error("unterminated map")),
        }
    }

    fn parse_map(&mut self) -> Result<StateValue> {
        let mut map = StateMap::new();
        loop {
            self.skip_separators();
            match self.peek() {
                None => return Err(self.error("unterminated map")),
                Some(Token::Punct(Punct::CloseBrace)) => {
                    self.pos += 1;
                    return Ok(StateValue::Map(map));
                }
                Some(_) => {
                    let key = self.parse_key()?;
                    self.skip_separators();
                    if matches!(self.peek(), Some(Token::Punct(Punct::CloseBrace)) | None) {
                        return Err(self.error(format!("missing value for key {key:?}")));
                    }
                    let value = self.parse_value()?;
                    map.insert(key, value);
                }
            }
        }
    }
}

/// Parse state notation text back into a value.
pub fn deserialize_state(input: &str) -> Result<StateValue> {
    let tokens = tokenize(input)?;
    let mut parser = Parser::new(tokens, input.len());

    parser.skip_separators();
    let value = parser.parse_value()?;
    parser.skip_separators();

    if parser.peek().is_some() {
        return Err(parser.error("trailing input after value"));
    }
    Ok(value)
}
