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

mod encoding;
mod references;
mod regions;

pub use references::ReferenceTable;
pub use regions::{Region, RegionKind, RegionTable, assign_sections, section_sizes};

use std::collections::BTreeSet;
use std::mem;

use crate::ast::{
    AddressValue, Item, ParsedItem, Statement, UnresolvedAddressConstant, UnresolvedAddressValue,
    Value,
};
use crate::errors::AssemblyError;
use crate::machine::{Opcode, vector_address};
use encoding::{FlatValue, serialize_value};
use regions::get_address;

/// Pass 1: attach pending labels and the current section to each statement.
/// `.sec` switches the section and is consumed here; labels pending at a
/// `.sec` carry over to the next real item.
pub fn glue_labels_and_sections(items: Vec<ParsedItem>) -> Result<Vec<Item>, AssemblyError> {
    let mut labels: BTreeSet<String> = BTreeSet::new();
    let mut section = String::from("any");
    let mut glued = Vec::new();

    for item in items {
        match item {
            ParsedItem::Label(name) => {
                labels.insert(name);
            }
            ParsedItem::Directive(statement) if statement.name == ".sec" => match statement.value {
                Some(Value::Raw(name)) => section = name,
                _ => {
                    return Err(AssemblyError::InvalidSectionName {
                        line: statement.line,
                    });
                }
            },
            ParsedItem::Directive(mut statement) => {
                statement.labels = mem::take(&mut labels);
                statement.section = section.clone();
                glued.push(Item::Directive(statement));
            }
            ParsedItem::Instruction(mut statement) => {
                statement.labels = mem::take(&mut labels);
                statement.section = section.clone();
                glued.push(Item::Instruction(statement));
            }
        }
    }

    Ok(glued)
}

/// Pass 2: turn each `.vec<name>` directive into a jump cell pinned at the
/// vector's fixed address. Everything else passes through unchanged.
pub fn install_vectors(items: Vec<Item>) -> Result<Vec<Item>, AssemblyError> {
    items
        .into_iter()
        .map(|item| match item {
            Item::Directive(statement) if statement.name.starts_with(".vec") => {
                let vector = &statement.name[4..];
                let Some(address) = vector_address(vector) else {
                    return Err(AssemblyError::UnknownVector {
                        name: vector.to_string(),
                        line: statement.line,
                    });
                };
                match statement.value {
                    Some(Value::Reference(target)) => {
                        Ok(Item::UnresolvedValue(UnresolvedAddressValue {
                            address,
                            opcode: Opcode::Jump,
                            data: target,
                        }))
                    }
                    _ => Err(AssemblyError::VectorWithoutReference {
                        name: statement.name.clone(),
                        line: statement.line,
                    }),
                }
            }
            other => Ok(other),
        })
        .collect()
}

/// Pass 3: allocate a cell for every `.const`, bind its labels, and
/// serialize its value. Reference values stay symbolic for the resolver.
pub fn assign_constants(
    references: &mut ReferenceTable,
    regions: &mut RegionTable,
    items: Vec<Item>,
) -> Result<Vec<Item>, AssemblyError> {
    let mut placed = Vec::new();

    for item in items {
        match item {
            Item::Directive(statement) if statement.name == ".const" => {
                let address = get_address(regions, &statement)?;

                for label in &statement.labels {
                    references.bind(label, address);
                }

                match serialize_value(statement.value.as_ref(), statement.line)? {
                    FlatValue::Reference(symbol) => {
                        placed.push(Item::UnresolvedConstant(UnresolvedAddressConstant {
                            address,
                            value: symbol,
                        }));
                    }
                    FlatValue::Integer(value) => {
                        placed.push(Item::Value(AddressValue { address, value }));
                    }
                }
            }
            other => placed.push(other),
        }
    }

    Ok(placed)
}

/// Pass 4: allocate a cell for every instruction, bind its labels, and pack
/// opcode and data. Any directive still present here is unknown.
pub fn assign_instructions(
    references: &mut ReferenceTable,
    regions: &mut RegionTable,
    items: Vec<Item>,
) -> Result<Vec<Item>, AssemblyError> {
    let mut placed = Vec::new();

    for item in items {
        match item {
            Item::Instruction(statement) => {
                let address = get_address(regions, &statement)?;

                for label in &statement.labels {
                    references.bind(label, address);
                }

                let data = serialize_value(statement.value.as_ref(), statement.line)?;

                let opcode = Opcode::from_mnemonic(&statement.name).ok_or_else(|| {
                    AssemblyError::UnknownInstruction {
                        name: statement.name.clone(),
                        line: statement.line,
                    }
                })?;

                match data {
                    FlatValue::Reference(symbol) => {
                        placed.push(Item::UnresolvedValue(UnresolvedAddressValue {
                            address,
                            opcode,
                            data: symbol,
                        }));
                    }
                    FlatValue::Integer(value) => {
                        placed.push(Item::Value(AddressValue {
                            address,
                            value: opcode.pack(value),
                        }));
                    }
                }
            }
            Item::Directive(statement) => {
                return Err(AssemblyError::UnknownDirective {
                    name: statement.name.clone(),
                    line: statement.line,
                });
            }
            other => placed.push(other),
        }
    }

    Ok(placed)
}

/// Pass 5: replace every remaining symbolic reference with its final cell
/// value. Resolved cells pass through.
pub fn resolve_references(
    references: &ReferenceTable,
    items: Vec<Item>,
) -> Result<Vec<AddressValue>, AssemblyError> {
    items
        .into_iter()
        .map(|item| match item {
            Item::Value(value) => Ok(value),
            Item::UnresolvedValue(unresolved) => unresolved.resolve(references),
            Item::UnresolvedConstant(unresolved) => unresolved.resolve(references),
            Item::Directive(statement) | Item::Instruction(statement) => {
                Err(AssemblyError::UnassignedItem {
                    line: statement.line,
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directive(name: &str, value: Option<Value>, line: usize) -> ParsedItem {
        ParsedItem::Directive(Statement::new(name.to_string(), value, line))
    }

    fn instruction(name: &str, value: Option<Value>, line: usize) -> ParsedItem {
        ParsedItem::Instruction(Statement::new(name.to_string(), value, line))
    }

    #[test]
    fn test_glue_attaches_labels_and_section() {
        let items = vec![
            directive(".sec", Some(Value::Raw("code".to_string())), 1),
            ParsedItem::Label("start".to_string()),
            instruction("HALT", None, 3),
        ];
        let glued = glue_labels_and_sections(items).unwrap();
        assert_eq!(glued.len(), 1);
        match &glued[0] {
            Item::Instruction(statement) => {
                assert_eq!(statement.section, "code");
                assert!(statement.labels.contains("start"));
            }
            other => panic!("expected an instruction, got {:?}", other),
        }
    }

    #[test]
    fn test_labels_pending_at_a_sec_carry_over() {
        let items = vec![
            ParsedItem::Label("entry".to_string()),
            directive(".sec", Some(Value::Raw("code".to_string())), 2),
            instruction("NOOP", None, 3),
        ];
        let glued = glue_labels_and_sections(items).unwrap();
        assert_eq!(glued.len(), 1);
        match &glued[0] {
            Item::Instruction(statement) => {
                assert!(statement.labels.contains("entry"));
                assert_eq!(statement.section, "code");
            }
            other => panic!("expected an instruction, got {:?}", other),
        }
    }

    #[test]
    fn test_sec_requires_a_raw_value() {
        let items = vec![directive(".sec", Some(Value::Integer(3)), 1)];
        assert_eq!(
            glue_labels_and_sections(items),
            Err(AssemblyError::InvalidSectionName { line: 1 })
        );

        let items = vec![directive(".sec", None, 2)];
        assert_eq!(
            glue_labels_and_sections(items),
            Err(AssemblyError::InvalidSectionName { line: 2 })
        );
    }

    #[test]
    fn test_install_vectors() {
        let items = vec![directive(
            ".vecreset",
            Some(Value::Reference("start".to_string())),
            1,
        )];
        let glued = glue_labels_and_sections(items).unwrap();
        let installed = install_vectors(glued).unwrap();
        assert_eq!(
            installed,
            vec![Item::UnresolvedValue(UnresolvedAddressValue {
                address: 0x000,
                opcode: Opcode::Jump,
                data: "start".to_string(),
            })]
        );
    }

    #[test]
    fn test_unknown_vector_is_rejected() {
        let items = glue_labels_and_sections(vec![directive(
            ".vecnmi",
            Some(Value::Reference("start".to_string())),
            4,
        )])
        .unwrap();
        assert_eq!(
            install_vectors(items),
            Err(AssemblyError::UnknownVector {
                name: "nmi".to_string(),
                line: 4,
            })
        );
    }

    #[test]
    fn test_vector_without_reference_is_rejected() {
        let items =
            glue_labels_and_sections(vec![directive(".vecreset", Some(Value::Integer(5)), 2)])
                .unwrap();
        assert_eq!(
            install_vectors(items),
            Err(AssemblyError::VectorWithoutReference {
                name: ".vecreset".to_string(),
                line: 2,
            })
        );
    }

    #[test]
    fn test_assign_constants_binds_labels() {
        let parsed = vec![
            directive(".sec", Some(Value::Raw("data".to_string())), 1),
            ParsedItem::Label("answer".to_string()),
            directive(".const", Some(Value::Integer(42)), 2),
        ];
        let items = glue_labels_and_sections(parsed).unwrap();

        let mut references = ReferenceTable::with_built_ins();
        let mut regions = RegionTable::with_reserved();
        assign_sections(&mut regions, &section_sizes(&items)).unwrap();

        let placed = assign_constants(&mut references, &mut regions, items).unwrap();
        assert_eq!(
            placed,
            vec![Item::Value(AddressValue {
                address: 0x010,
                value: 42,
            })]
        );
        assert_eq!(references.lookup("answer"), Some(0x010));
    }

    #[test]
    fn test_assign_instructions_packs_opcode_and_data() {
        let parsed = vec![
            directive(".sec", Some(Value::Raw("code".to_string())), 1),
            instruction("LOAD", Some(Value::Integer(0x0AB)), 2),
        ];
        let items = glue_labels_and_sections(parsed).unwrap();

        let mut references = ReferenceTable::with_built_ins();
        let mut regions = RegionTable::with_reserved();
        assign_sections(&mut regions, &section_sizes(&items)).unwrap();

        let placed = assign_instructions(&mut references, &mut regions, items).unwrap();
        assert_eq!(
            placed,
            vec![Item::Value(AddressValue {
                address: 0x010,
                value: 0x40AB,
            })]
        );
    }

    #[test]
    fn test_unknown_instruction_reports_name_and_line() {
        let parsed = vec![instruction("FOOBAR", Some(Value::Integer(1)), 3)];
        let items = glue_labels_and_sections(parsed).unwrap();

        let mut references = ReferenceTable::with_built_ins();
        let mut regions = RegionTable::with_reserved();
        assign_sections(&mut regions, &section_sizes(&items)).unwrap();

        let error = assign_instructions(&mut references, &mut regions, items).unwrap_err();
        assert_eq!(error.to_string(), "unknown instruction FOOBAR on line 3");
    }

    #[test]
    fn test_leftover_directive_is_unknown() {
        let parsed = vec![directive(".nonsense", None, 5)];
        let items = glue_labels_and_sections(parsed).unwrap();

        let mut references = ReferenceTable::with_built_ins();
        let mut regions = RegionTable::with_reserved();
        assign_sections(&mut regions, &section_sizes(&items)).unwrap();

        let items = assign_constants(&mut references, &mut regions, items).unwrap();
        let error = assign_instructions(&mut references, &mut regions, items).unwrap_err();
        assert_eq!(error.to_string(), "unknown directive .nonsense on line 5");
    }

    #[test]
    fn test_duplicate_label_last_binding_wins() {
        let parsed = vec![
            ParsedItem::Label("twice".to_string()),
            instruction("NOOP", None, 1),
            ParsedItem::Label("twice".to_string()),
            instruction("HALT", None, 3),
        ];
        let items = glue_labels_and_sections(parsed).unwrap();

        let mut references = ReferenceTable::with_built_ins();
        let mut regions = RegionTable::with_reserved();
        assign_sections(&mut regions, &section_sizes(&items)).unwrap();

        assign_instructions(&mut references, &mut regions, items).unwrap();
        assert_eq!(references.lookup("twice"), Some(0x011));
    }
}
