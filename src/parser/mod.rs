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

mod value;

use crate::ast::{ParsedItem, Statement};
use crate::errors::AssemblyError;
use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;

// Derive the parser from our grammar file.
#[derive(Parser)]
#[grammar = "./grammar.pest"]
pub struct Sma16Parser;

// Main parsing function that takes the entire source code string.
pub fn parse_source(source: &str) -> Result<Vec<ParsedItem>, AssemblyError> {
    let pairs = Sma16Parser::parse(Rule::program, source)?;
    let mut items = Vec::new();

    for line_pair in pairs
        .flatten()
        .filter(|p| p.as_rule() == Rule::line_content)
    {
        let line_number = line_pair.as_span().start_pos().line_col().0;

        for part in line_pair.into_inner() {
            match part.as_rule() {
                Rule::label => {
                    let name = part.into_inner().next().unwrap().as_str().to_string();
                    items.push(ParsedItem::Label(name));
                }
                Rule::directive => {
                    items.push(ParsedItem::Directive(build_statement(part, line_number)?));
                }
                Rule::instruction => {
                    items.push(ParsedItem::Instruction(build_statement(part, line_number)?));
                }
                _ => {}
            }
        }
    }

    Ok(items)
}

// Build a directive or instruction statement from its name and value span.
fn build_statement(pair: Pair<Rule>, line_number: usize) -> Result<Statement, AssemblyError> {
    let mut inner = pair.into_inner();
    let name = inner.next().unwrap().as_str().to_string();
    let value = match inner.next() {
        Some(span) => value::parse_value(span.as_str(), line_number)?,
        None => None,
    };

    Ok(Statement::new(name, value, line_number))
}

// ------------- unit tests -------------
