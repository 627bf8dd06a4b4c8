// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Recursive-descent reader for the MDL constant grammar.
//!
//! Accepts everything the writer in [`super::mdl`] produces plus the wider
//! surface of the grammar: back-tick strings without escapes, `b"…"` raw
//! and `d"…"` decimal-dotted byte literals, hex numbers, and the `EMPTY`
//! keyword. Syntax errors carry a clamped window of the offending input.

use super::{mdl, Variant};
use crate::error::{MError, MResult};

/// Parse an MDL constant into a variant.
pub fn from_mdl_constant(text: &str) -> MResult<Variant> {
    let mut p = Parser {
        input: text.as_bytes(),
        pos: 0,
    };
    let value = p.read_value()?;
    p.skip_space();
    if p.pos != p.input.len() {
        return Err(p.syntax_error());
    }
    Ok(value)
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

#[derive(Debug, PartialEq)]
enum Token {
    CollectionBegin,
    CollectionEnd,
    StrCollectionBegin,
    StrCollectionEnd,
    Separator,
    MapAssociate,
    Value(Variant),
    End,
}

impl<'a> Parser<'a> {
    fn skip_space(&mut self) {
        while self.pos < self.input.len() {
            match self.input[self.pos] {
                b' ' | b'\t' | b'\r' | b'\n' => self.pos += 1,
                _ => break,
            }
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn next_char(&mut self) -> Option<u8> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn syntax_error(&self) -> MError {
        // Clamped context window around the failure point
        const HALF: usize = 25;
        let from = self.pos.saturating_sub(HALF);
        let to = (self.pos + HALF).min(self.input.len());
        let window: String = self.input[from..to].iter().map(|&b| b as char).collect();
        MError::syntax_error(&window)
    }

    fn read_value(&mut self) -> MResult<Variant> {
        match self.fetch_token()? {
            Token::StrCollectionBegin => self.read_string_collection(),
            Token::CollectionBegin => self.read_collection(),
            Token::Value(v) => Ok(v),
            _ => Err(self.syntax_error()),
        }
    }

    fn fetch_token(&mut self) -> MResult<Token> {
        self.skip_space();
        let c = match self.next_char() {
            None => return Ok(Token::End),
            Some(c) => c,
        };
        match c {
            b'{' => Ok(Token::CollectionBegin),
            b'}' => Ok(Token::CollectionEnd),
            b'[' => Ok(Token::StrCollectionBegin),
            b']' => Ok(Token::StrCollectionEnd),
            b',' => Ok(Token::Separator),
            b':' => Ok(Token::MapAssociate),
            b'\'' | b'"' | b'`' => self.fetch_string(c, StringForm::Text),
            b'X' | b'x' | b'B' | b'b' | b'D' | b'd' => {
                let quote = self.next_char().ok_or_else(|| self.syntax_error())?;
                if quote != b'\'' && quote != b'"' && quote != b'`' {
                    return Err(self.syntax_error());
                }
                let form = match c.to_ascii_uppercase() {
                    b'X' => StringForm::Hex,
                    b'B' => StringForm::Bytes,
                    _ => StringForm::Decimal,
                };
                self.fetch_string(quote, form)
            }
            b'0'..=b'9' | b'-' => self.fetch_number(),
            b'F' => {
                self.expect_keyword("ALSE")?;
                Ok(Token::Value(Variant::Bool(false)))
            }
            b'T' => {
                self.expect_keyword("RUE")?;
                Ok(Token::Value(Variant::Bool(true)))
            }
            b'E' => {
                self.expect_keyword("MPTY")?;
                Ok(Token::Value(Variant::Empty))
            }
            _ => Err(self.syntax_error()),
        }
    }

    fn expect_keyword(&mut self, remainder: &str) -> MResult<()> {
        for expected in remainder.bytes() {
            if self.next_char() != Some(expected) {
                return Err(self.syntax_error());
            }
        }
        Ok(())
    }

    fn fetch_number(&mut self) -> MResult<Token> {
        let start = self.pos - 1;
        let mut is_double = false;
        let mut is_unsigned = false;
        let mut is_hex = false;
        while let Some(c) = self.peek() {
            match c {
                b'.' => is_double = true,
                b'e' | b'E' => {
                    if is_hex {
                        // hex digit, not an exponent
                    } else {
                        is_double = true;
                    }
                }
                b'u' | b'U' => is_unsigned = true,
                b'x' | b'X' => {
                    is_unsigned = true;
                    is_hex = true;
                }
                c if c.is_ascii_hexdigit() || c == b'-' => {}
                _ => break,
            }
            self.pos += 1;
        }
        let text: String = self.input[start..self.pos].iter().map(|&b| b as char).collect();
        let value = if is_double {
            Variant::Double(super::parse_double(&text)?)
        } else if is_unsigned {
            Variant::UInt(super::parse_uint(&text)?)
        } else {
            Variant::Int(super::parse_int(&text)?)
        };
        Ok(Token::Value(value))
    }

    fn fetch_string(&mut self, quote: u8, form: StringForm) -> MResult<Token> {
        let start = self.pos;
        let mut has_escapes = false;
        loop {
            let c = self.next_char().ok_or_else(|| self.syntax_error())?;
            if c == quote {
                break;
            }
            if c == b'\\' && quote != b'`' {
                self.next_char().ok_or_else(|| self.syntax_error())?;
                has_escapes = true;
            }
        }
        let raw: String = self.input[start..self.pos - 1].iter().map(|&b| b as char).collect();
        let text = if has_escapes { mdl::unescape(&raw)? } else { raw };
        let value = match form {
            StringForm::Text => {
                if quote == b'\'' {
                    // Apostrophes hold exactly one character
                    let mut chars = text.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => Variant::Char(c),
                        _ => return Err(self.syntax_error()),
                    }
                } else {
                    Variant::from(text)
                }
            }
            StringForm::Hex => {
                let bytes = crate::codec::hex_to_bytes(&text).map_err(|_| self.syntax_error())?;
                self.bytes_value(quote, bytes)?
            }
            StringForm::Bytes => {
                let bytes: Vec<u8> = text.chars().map(|c| c as u8).collect();
                self.bytes_value(quote, bytes)?
            }
            StringForm::Decimal => {
                let bytes =
                    crate::codec::numeric_string_to_bytes(&text).map_err(|_| self.syntax_error())?;
                self.bytes_value(quote, bytes)?
            }
        };
        Ok(Token::Value(value))
    }

    /// A single-quoted byte literal is a Byte; the other quotes give a
    /// byte string.
    fn bytes_value(&self, quote: u8, bytes: Vec<u8>) -> MResult<Variant> {
        if quote == b'\'' {
            if bytes.len() != 1 {
                return Err(self.syntax_error());
            }
            Ok(Variant::Byte(bytes[0]))
        } else {
            Ok(Variant::byte_string(bytes))
        }
    }

    fn read_string_collection(&mut self) -> MResult<Variant> {
        let mut result = Variant::string_collection();
        self.skip_space();
        if self.peek() == Some(b']') {
            self.pos += 1;
            return Ok(result);
        }
        loop {
            let value = self.read_value()?;
            if !matches!(value, Variant::String(_)) {
                return Err(self.syntax_error());
            }
            result.add_to_collection(value)?;
            match self.fetch_token()? {
                Token::StrCollectionEnd => break,
                Token::Separator => {}
                _ => return Err(self.syntax_error()),
            }
        }
        Ok(result)
    }

    fn read_collection(&mut self) -> MResult<Variant> {
        self.skip_space();
        match self.peek() {
            Some(b'}') => {
                // Empty collection
                self.pos += 1;
                return Ok(Variant::collection());
            }
            Some(b':') => {
                // '{:}' is the empty map
                self.pos += 1;
                if self.fetch_token()? != Token::CollectionEnd {
                    return Err(self.syntax_error());
                }
                return Ok(Variant::map());
            }
            _ => {}
        }
        let mut result = Variant::collection();
        loop {
            let value = self.read_value()?;
            match self.fetch_token()? {
                Token::CollectionEnd => {
                    if matches!(result, Variant::Map(_)) {
                        return Err(self.syntax_error());
                    }
                    result.add_to_collection(value)?;
                    break;
                }
                Token::MapAssociate => {
                    if matches!(result, Variant::Collection(_)) {
                        // A nonempty array cannot turn into a map
                        if result.count()? != 0 {
                            return Err(self.syntax_error());
                        }
                        result = Variant::map();
                    }
                    let value2 = self.read_value()?;
                    result.set_item(&value, &value2)?;
                    match self.fetch_token()? {
                        Token::CollectionEnd => break,
                        Token::Separator => {}
                        _ => return Err(self.syntax_error()),
                    }
                }
                Token::Separator => {
                    if matches!(result, Variant::Map(_)) {
                        return Err(self.syntax_error());
                    }
                    result.add_to_collection(value)?;
                }
                _ => return Err(self.syntax_error()),
            }
        }
        Ok(result)
    }
}

#[derive(Clone, Copy)]
enum StringForm {
    Text,
    Hex,
    Bytes,
    Decimal,
}
