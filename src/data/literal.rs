//! Parser for the mapping literals stored in structured CSV cells, e.g.
//! `{'2023': {'year': 2023, 'total': 5123}}`.

use thiserror::Error;

use super::model::{Mapping, NestedValue};

/// Why a literal failed to parse. Only surfaced by [`parse_literal`];
/// [`parse_mapping`] swallows it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LiteralError {
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("unexpected character '{found}' at byte {at}")]
    Unexpected { found: char, at: usize },
    #[error("invalid number '{text}'")]
    InvalidNumber { text: String },
    #[error("invalid escape sequence at byte {at}")]
    InvalidEscape { at: usize },
    #[error("unhashable mapping key at byte {at}")]
    UnhashableKey { at: usize },
    #[error("nesting deeper than 64 levels")]
    TooDeep,
}

const MAX_DEPTH: usize = 64;

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Parse a structured cell into a mapping. Total: anything that is not a
/// well-formed mapping literal gives an empty mapping.
pub fn parse_mapping(cell: &str) -> Mapping {
    let trimmed = cell.trim();
    if !trimmed.starts_with('{') {
        return Mapping::new();
    }
    match parse_literal(trimmed) {
        Ok(NestedValue::Mapping(m)) => m,
        Ok(other) => {
            log::trace!("structured cell is not a mapping: {other}");
            Mapping::new()
        }
        Err(e) => {
            log::trace!("structured cell failed to parse: {e}");
            Mapping::new()
        }
    }
}

/// Parse one complete literal. Trailing non-whitespace is an error.
pub fn parse_literal(text: &str) -> Result<NestedValue, LiteralError> {
    let mut parser = Parser { src: text, pos: 0 };
    let value = parser.value(0)?;
    parser.skip_ws();
    match parser.peek() {
        None => Ok(value),
        Some(c) => Err(LiteralError::Unexpected {
            found: c,
            at: parser.pos,
        }),
    }
}

// ---------------------------------------------------------------------------
// Recursive-descent parser
// ---------------------------------------------------------------------------

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek().filter(|c| c.is_whitespace()) {
            self.pos += c.len_utf8();
        }
    }

    fn expect(&mut self, want: char) -> Result<(), LiteralError> {
        self.skip_ws();
        match self.bump() {
            Some(c) if c == want => Ok(()),
            Some(c) => Err(LiteralError::Unexpected {
                found: c,
                at: self.pos - c.len_utf8(),
            }),
            None => Err(LiteralError::UnexpectedEnd),
        }
    }

    fn value(&mut self, depth: usize) -> Result<NestedValue, LiteralError> {
        if depth > MAX_DEPTH {
            return Err(LiteralError::TooDeep);
        }
        self.skip_ws();
        match self.peek() {
            None => Err(LiteralError::UnexpectedEnd),
            Some('{') => self.mapping(depth),
            Some('[') => self.sequence('[', ']', depth),
            Some('(') => self.sequence('(', ')', depth),
            Some('\'') | Some('"') => self.string().map(NestedValue::String),
            Some(c) if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => self.number(),
            Some(c) if c.is_ascii_alphabetic() => self.keyword(),
            Some(c) => Err(LiteralError::Unexpected { found: c, at: self.pos }),
        }
    }

    fn mapping(&mut self, depth: usize) -> Result<NestedValue, LiteralError> {
        self.expect('{')?;
        let mut map = Mapping::new();
        loop {
            self.skip_ws();
            if self.peek() == Some('}') {
                self.pos += 1;
                return Ok(NestedValue::Mapping(map));
            }
            let key_at = self.pos;
            let key = match self.value(depth + 1)? {
                NestedValue::Mapping(_) | NestedValue::List(_) => {
                    return Err(LiteralError::UnhashableKey { at: key_at })
                }
                scalar => scalar.to_string(),
            };
            self.expect(':')?;
            let value = self.value(depth + 1)?;
            map.insert(key, value);

            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some('}') => return Ok(NestedValue::Mapping(map)),
                Some(c) => {
                    return Err(LiteralError::Unexpected {
                        found: c,
                        at: self.pos - c.len_utf8(),
                    })
                }
                None => return Err(LiteralError::UnexpectedEnd),
            }
        }
    }

    fn sequence(&mut self, open: char, close: char, depth: usize) -> Result<NestedValue, LiteralError> {
        self.expect(open)?;
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok(NestedValue::List(items));
            }
            items.push(self.value(depth + 1)?);
            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some(c) if c == close => return Ok(NestedValue::List(items)),
                Some(c) => {
                    return Err(LiteralError::Unexpected {
                        found: c,
                        at: self.pos - c.len_utf8(),
                    })
                }
                None => return Err(LiteralError::UnexpectedEnd),
            }
        }
    }

    fn string(&mut self) -> Result<String, LiteralError> {
        let quote = self.bump().ok_or(LiteralError::UnexpectedEnd)?;
        let mut out = String::new();
        loop {
            let c = self.bump().ok_or(LiteralError::UnexpectedEnd)?;
            if c == quote {
                return Ok(out);
            }
            if c != '\\' {
                out.push(c);
                continue;
            }
            let at = self.pos - 1;
            match self.bump().ok_or(LiteralError::UnexpectedEnd)? {
                '\\' => out.push('\\'),
                '\'' => out.push('\''),
                '"' => out.push('"'),
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                't' => out.push('\t'),
                '0' => out.push('\0'),
                'x' => out.push(self.hex_escape(2, at)?),
                'u' => out.push(self.hex_escape(4, at)?),
                'U' => out.push(self.hex_escape(8, at)?),
                _ => return Err(LiteralError::InvalidEscape { at }),
            }
        }
    }

    fn hex_escape(&mut self, digits: usize, at: usize) -> Result<char, LiteralError> {
        let end = self.pos + digits;
        let hex = self
            .src
            .get(self.pos..end)
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or(LiteralError::InvalidEscape { at })?;
        let code = u32::from_str_radix(hex, 16).map_err(|_| LiteralError::InvalidEscape { at })?;
        self.pos = end;
        char::from_u32(code).ok_or(LiteralError::InvalidEscape { at })
    }

    fn number(&mut self) -> Result<NestedValue, LiteralError> {
        let start = self.pos;
        if matches!(self.peek(), Some('-') | Some('+')) {
            self.pos += 1;
        }
        while let Some(c) = self.peek() {
            let exponent_sign = (c == '-' || c == '+')
                && matches!(self.src[..self.pos].chars().last(), Some('e') | Some('E'));
            if c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E' || exponent_sign {
                self.pos += 1;
            } else {
                break;
            }
        }
        let text = &self.src[start..self.pos];
        let is_float = text.contains(['.', 'e', 'E']);
        let parsed = if is_float {
            text.parse::<f64>().ok().map(NestedValue::Float)
        } else {
            text.parse::<i64>().ok().map(NestedValue::Integer)
        };
        parsed.ok_or_else(|| LiteralError::InvalidNumber {
            text: text.to_string(),
        })
    }

    fn keyword(&mut self) -> Result<NestedValue, LiteralError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        match &self.src[start..self.pos] {
            "True" | "true" => Ok(NestedValue::Bool(true)),
            "False" | "false" => Ok(NestedValue::Bool(false)),
            "None" | "null" => Ok(NestedValue::Null),
            _ => Err(LiteralError::Unexpected {
                found: self.src[start..].chars().next().unwrap_or(' '),
                at: start,
            }),
        }
    }
}
