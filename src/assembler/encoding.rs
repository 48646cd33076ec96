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

// A value flattened to what fits in a cell: either a finished integer or a
// symbol left for the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlatValue {
    Integer(u16),
    Reference(String),
}

/// Encode a character in the 64-symbol small alphabet:
/// `A-Z` = 0-25, `a-z` = 26-51, `0-9` = 52-61, space = 62, underscore = 63.
pub fn small_encoding(character: char) -> Result<u16, AssemblyError> {
    match character {
        'A'..='Z' => Ok(character as u16 - 'A' as u16),
        'a'..='z' => Ok(character as u16 - 'a' as u16 + 26),
        '0'..='9' => Ok(character as u16 - '0' as u16 + 52),
        ' ' => Ok(62),
        '_' => Ok(63),
        _ => Err(AssemblyError::SmallEncoding { character }),
    }
}

/// Flatten an abstract value to a raw integer, preserving references for the
/// resolver. No value at all is the same as zero.
pub fn serialize_value(value: Option<&Value>, line: usize) -> Result<FlatValue, AssemblyError> {
    let Some(value) = value else {
        return Ok(FlatValue::Integer(0));
    };

    match value {
        Value::Integer(n) => Ok(FlatValue::Integer(*n)),

        Value::Reference(name) => Ok(FlatValue::Reference(name.clone())),

        Value::ShortString(first, second) => Ok(FlatValue::Integer(
            (small_encoding(*first)? << 6) | small_encoding(*second)?,
        )),

        // Low byte is the first character.
        Value::AsciiString(first, second) => Ok(FlatValue::Integer(
            ((((*second as u32) << 8) & 0xFF00) | (*first as u32 & 0x00FF)) as u16,
        )),

        // Padded with the underscore index in the high six bits.
        Value::ShortCharacter(character) => Ok(FlatValue::Integer(
            (small_encoding('_')? << 6) | small_encoding(*character)?,
        )),

        Value::AsciiCharacter(character) => {
            Ok(FlatValue::Integer((*character as u32 & 0x00FF) as u16))
        }

        Value::Raw(text) => Err(AssemblyError::RawValueInCell {
            text: text.clone(),
            line,
        }),
    }
}
