/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use crate::ast::Value;
use crate::errors::AssemblyError;

// The "C name" rule: non-empty segments of alphanumerics joined by
// underscores, first character not a digit.
pub fn is_c_name(to_test: &str) -> bool {
    let Some(first) = to_test.chars().next() else {
        return false;
    };

    !first.is_numeric()
        && to_test
            .split('_')
            .filter(|segment| !segment.is_empty())
            .all(|segment| segment.chars().all(char::is_alphanumeric))
}

/// Parse one value token. An empty token means no value; a token that
/// matches no literal form at all is kept verbatim as a raw value.
pub fn parse_value(to_parse: &str, line: usize) -> Result<Option<Value>, AssemblyError> {
    let to_parse = to_parse.trim();

    if to_parse.is_empty() {
        return Ok(None);
    }

    // The placeholder value, "don't care".
    if to_parse == "?" {
        return Ok(Some(Value::Integer(0)));
    }

    if let Some(name) = to_parse.strip_prefix('@') {
        if !is_c_name(name) {
            return Err(AssemblyError::InvalidReferenceName {
                name: name.to_string(),
                line,
            });
        }
        return Ok(Some(Value::Reference(name.to_string())));
    }

    if let Some(digits) = to_parse.strip_prefix("0x") {
        return parse_integer(digits, 16, to_parse, line);
    }

    if let Some(digits) = to_parse.strip_prefix("0b") {
        return parse_integer(digits, 2, to_parse, line);
    }

    if to_parse.chars().all(|c| c.is_ascii_digit()) {
        return parse_integer(to_parse, 10, to_parse, line);
    }

    if let Some(literal) = to_parse.strip_prefix('s') {
        if literal.starts_with('"') {
            let (first, second) = string_literal(literal, "small string", line)?;
            return Ok(Some(Value::ShortString(first, second)));
        }
        if literal.starts_with('\'') {
            let character = character_literal(literal, "short character", line)?;
            return Ok(Some(Value::ShortCharacter(character)));
        }
    }

    if let Some(literal) = to_parse.strip_prefix('a') {
        if literal.starts_with('"') {
            let (first, second) = string_literal(literal, "ascii string", line)?;
            return Ok(Some(Value::AsciiString(first, second)));
        }
        if literal.starts_with('\'') {
            let character = character_literal(literal, "ascii character", line)?;
            return Ok(Some(Value::AsciiCharacter(character)));
        }
    }

    Ok(Some(Value::Raw(to_parse.to_string())))
}

fn parse_integer(
    digits: &str,
    radix: u32,
    text: &str,
    line: usize,
) -> Result<Option<Value>, AssemblyError> {
    match u16::from_str_radix(digits, radix) {
        Ok(value) => Ok(Some(Value::Integer(value))),
        Err(_) => Err(AssemblyError::InvalidInteger {
            text: text.to_string(),
            line,
        }),
    }
}

// A two-character string literal, quotes included in `literal`.
fn string_literal(
    literal: &str,
    kind: &'static str,
    line: usize,
) -> Result<(char, char), AssemblyError> {
    let text = unescape(literal, kind, line)?;
    let mut characters = text.chars();
    match (characters.next(), characters.next(), characters.next()) {
        (Some(first), Some(second), None) => Ok((first, second)),
        _ => Err(AssemblyError::LiteralLength {
            kind,
            text: literal.to_string(),
            line,
        }),
    }
}

// A one-character character literal, quotes included in `literal`.
fn character_literal(
    literal: &str,
    kind: &'static str,
    line: usize,
) -> Result<char, AssemblyError> {
    let text = unescape(literal, kind, line)?;
    let mut characters = text.chars();
    match (characters.next(), characters.next()) {
        (Some(character), None) => Ok(character),
        _ => Err(AssemblyError::LiteralLength {
            kind,
            text: literal.to_string(),
            line,
        }),
    }
}

// Decode the interior of a quoted literal. `quoted` starts with the quote
// character, which must also close it with nothing trailing. Escapes are
// decoded explicitly: \n \t \\ \" \' and \xHH.
fn unescape(quoted: &str, kind: &'static str, line: usize) -> Result<String, AssemblyError> {
    let malformed = || AssemblyError::MalformedLiteral {
        kind,
        text: quoted.to_string(),
        line,
    };

    let mut characters = quoted.chars();
    let quote = characters.next().ok_or_else(malformed)?;
    let mut decoded = String::new();

    loop {
        match characters.next() {
            // Closing quote: valid only at the very end of the token.
            Some(c) if c == quote => {
                return match characters.next() {
                    None => Ok(decoded),
                    Some(_) => Err(malformed()),
                };
            }
            Some('\\') => match characters.next() {
                Some('n') => decoded.push('\n'),
                Some('t') => decoded.push('\t'),
                Some('\\') => decoded.push('\\'),
                Some('"') => decoded.push('"'),
                Some('\'') => decoded.push('\''),
                Some('x') => {
                    let high = characters.next().ok_or_else(malformed)?;
                    let low = characters.next().ok_or_else(malformed)?;
                    let code = high.to_digit(16).ok_or_else(malformed)? * 16
                        + low.to_digit(16).ok_or_else(malformed)?;
                    decoded.push(code as u8 as char);
                }
                _ => return Err(malformed()),
            },
            Some(c) => decoded.push(c),
            // Ran off the end without a closing quote.
            None => return Err(malformed()),
        }
    }
}
