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

use std::collections::HashMap;

use crate::ast::{AddressValue, UnresolvedAddressConstant, UnresolvedAddressValue};
use crate::errors::AssemblyError;
use crate::machine::BUILT_IN_REFERENCES;

// Minimum similarity before a name is worth suggesting.
const SUGGESTION_CUTOFF: f64 = 0.75;

// Maps symbolic names to 12-bit addresses.
#[derive(Debug, Default)]
pub struct ReferenceTable {
    entries: HashMap<String, u16>,
}

impl ReferenceTable {
    /// A table pre-populated with the vector and register constants.
    pub fn with_built_ins() -> Self {
        let mut table = Self::default();
        for (name, address) in BUILT_IN_REFERENCES {
            table.bind(name, address);
        }
        table
    }

    // Binding an already-bound name overwrites it: the last label wins.
    pub fn bind(&mut self, name: &str, address: u16) {
        self.entries.insert(name.to_string(), address);
    }

    pub fn lookup(&self, name: &str) -> Option<u16> {
        self.entries.get(name).copied()
    }

    // ", did you mean X?" for the closest known name, or nothing.
    fn did_you_mean(&self, name: &str) -> String {
        let mut candidates: Vec<(&str, f64)> = self
            .entries
            .keys()
            .map(|known| (known.as_str(), strsim::jaro_winkler(name, known)))
            .filter(|(_, score)| *score >= SUGGESTION_CUTOFF)
            .collect();

        candidates.sort_by(|left, right| {
            right
                .1
                .partial_cmp(&left.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(left.0.cmp(right.0))
        });

        match candidates.first() {
            Some((best, _)) => format!(", did you mean {}?", best),
            None => String::new(),
        }
    }

    fn undefined(&self, name: &str) -> AssemblyError {
        AssemblyError::UndefinedReference {
            name: name.to_string(),
            suggestion: self.did_you_mean(name),
        }
    }
}

impl UnresolvedAddressValue {
    /// Resolve the data field through the reference table.
    pub fn resolve(&self, references: &ReferenceTable) -> Result<AddressValue, AssemblyError> {
        match references.lookup(&self.data) {
            Some(target) => Ok(AddressValue {
                address: self.address,
                value: self.opcode.pack(target),
            }),
            None => Err(references.undefined(&self.data)),
        }
    }
}

impl UnresolvedAddressConstant {
    /// Resolve the whole cell through the reference table. The cell takes
    /// the full 16-bit value, so constants can hold addresses.
    pub fn resolve(&self, references: &ReferenceTable) -> Result<AddressValue, AssemblyError> {
        match references.lookup(&self.value) {
            Some(value) => Ok(AddressValue {
                address: self.address,
                value,
            }),
            None => Err(references.undefined(&self.value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::Opcode;

    #[test]
    fn test_built_ins_are_present() {
        let table = ReferenceTable::with_built_ins();
        assert_eq!(table.lookup("RESET_VECTOR"), Some(0x000));
        assert_eq!(table.lookup("ASCII_OUT"), Some(0x00A));
        assert_eq!(table.lookup("RESERVED2"), Some(0x00F));
    }

    #[test]
    fn test_last_binding_wins() {
        let mut table = ReferenceTable::default();
        table.bind("twice", 0x010);
        table.bind("twice", 0x020);
        assert_eq!(table.lookup("twice"), Some(0x020));
    }

    #[test]
    fn test_resolve_instruction_packs_through_opcode() {
        let mut table = ReferenceTable::default();
        table.bind("start", 0x010);

        let unresolved = UnresolvedAddressValue {
            address: 0x000,
            opcode: Opcode::Jump,
            data: "start".to_string(),
        };
        assert_eq!(
            unresolved.resolve(&table).unwrap(),
            AddressValue {
                address: 0x000,
                value: 0x2010,
            }
        );
    }

    #[test]
    fn test_resolve_constant_takes_the_whole_value() {
        let mut table = ReferenceTable::default();
        table.bind("main", 0x011);

        let unresolved = UnresolvedAddressConstant {
            address: 0x010,
            value: "main".to_string(),
        };
        assert_eq!(
            unresolved.resolve(&table).unwrap(),
            AddressValue {
                address: 0x010,
                value: 0x011,
            }
        );
    }

    #[test]
    fn test_undefined_reference_suggests_a_close_name() {
        let mut table = ReferenceTable::default();
        table.bind("foe", 0x010);

        let unresolved = UnresolvedAddressConstant {
            address: 0x000,
            value: "foo".to_string(),
        };
        let error = unresolved.resolve(&table).unwrap_err();
        assert_eq!(
            error.to_string(),
            "reference to undefined location foo, did you mean foe?"
        );
    }

    #[test]
    fn test_undefined_reference_without_a_close_name() {
        let table = ReferenceTable::default();
        let unresolved = UnresolvedAddressConstant {
            address: 0x000,
            value: "zzz".to_string(),
        };
        let error = unresolved.resolve(&table).unwrap_err();
        // No suggestion means no trailing punctuation.
        assert_eq!(error.to_string(), "reference to undefined location zzz");
    }
}
