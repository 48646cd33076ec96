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

use crate::ast::{Item, Statement};
use crate::errors::AssemblyError;
use crate::machine::{ADDRESS_SPACE, RESERVED_CELLS};

const TOP_ADDRESS: usize = ADDRESS_SPACE - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Reserved,
    User,
}

/// An inclusive address range with a running count of allocated cells.
/// Invariant after every allocation: `start + count - 1 <= end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub kind: RegionKind,
    pub start: u16,
    pub end: u16,
    pub count: u16,
}

// Maps section names to regions. Vec-backed so iteration follows insertion
// order; the packer depends on that for determinism.
#[derive(Debug, Default)]
pub struct RegionTable {
    entries: Vec<(String, Region)>,
}

impl RegionTable {
    /// A table holding only the hardware-reserved regions.
    pub fn with_reserved() -> Self {
        let mut table = Self::default();
        table.insert(
            "configuration",
            Region {
                kind: RegionKind::Reserved,
                start: 0x008,
                end: 0x00F,
                count: 8,
            },
        );
        table.insert(
            "vectors",
            Region {
                kind: RegionKind::Reserved,
                start: 0x000,
                end: 0x007,
                count: 8,
            },
        );
        table
    }

    // Re-inserting a name replaces its region but keeps its position.
    pub fn insert(&mut self, name: &str, region: Region) {
        if let Some(position) = self
            .entries
            .iter()
            .position(|(entry_name, _)| entry_name == name)
        {
            self.entries[position].1 = region;
        } else {
            self.entries.push((name.to_string(), region));
        }
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Region> {
        self.entries
            .iter_mut()
            .find(|(entry_name, _)| entry_name == name)
            .map(|(_, region)| region)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Region)> {
        self.entries
            .iter()
            .map(|(name, region)| (name.as_str(), region))
    }
}

/// Count how many cells each section needs, in first-appearance order.
/// Pre-addressed vector cells belong to no section and are skipped.
pub fn section_sizes(items: &[Item]) -> Vec<(String, usize)> {
    let mut sections: Vec<(String, usize)> = Vec::new();

    for item in items {
        let statement = match item {
            Item::Directive(statement) | Item::Instruction(statement) => statement,
            _ => continue,
        };
        match sections
            .iter_mut()
            .find(|(name, _)| *name == statement.section)
        {
            Some((_, size)) => *size += 1,
            None => sections.push((statement.section.clone(), 1)),
        }
    }

    sections
}

/// Pack the user sections into free address ranges around the registered
/// regions. Greedy first-fit, no backtracking: inputs that would only fit
/// after a reshuffle are rejected.
pub fn assign_sections(
    table: &mut RegionTable,
    sections: &[(String, usize)],
) -> Result<(), AssemblyError> {
    let total: usize = sections.iter().map(|(_, size)| size).sum();
    if total >= ADDRESS_SPACE - RESERVED_CELLS {
        return Err(AssemblyError::MemoryFull);
    }

    let mut used_space: Vec<(u16, u16)> = Vec::new();
    for (name, region) in table.iter() {
        if in_used_space(&used_space, region.start as usize, region.end as usize) {
            return Err(AssemblyError::RegionOverlap {
                name: name.to_string(),
            });
        }
        used_space.push((region.start, region.end));
    }

    for (name, size) in sections {
        let (start, end) = find_free_space(&used_space, *size)?;
        used_space.push((start, end));
        table.insert(
            name,
            Region {
                kind: RegionKind::User,
                start,
                end,
                count: 0,
            },
        );
    }

    Ok(())
}

fn in_used_space(used_space: &[(u16, u16)], start: usize, end: usize) -> bool {
    start > TOP_ADDRESS
        || end > TOP_ADDRESS
        || used_space
            .iter()
            .any(|&(used_start, used_end)| start <= used_end as usize && end >= used_start as usize)
}

// Try the slot directly after each used range, in insertion order.
fn find_free_space(used_space: &[(u16, u16)], size: usize) -> Result<(u16, u16), AssemblyError> {
    for &(_, used_end) in used_space {
        let start_to_try = used_end as usize + 1;
        let end_to_try = used_end as usize + size;
        if !in_used_space(used_space, start_to_try, end_to_try) {
            return Ok((start_to_try as u16, end_to_try as u16));
        }
    }
    Err(AssemblyError::OutOfSpace)
}

/// Allocate the next cell of the item's section, growing its count.
pub fn get_address(table: &mut RegionTable, statement: &Statement) -> Result<u16, AssemblyError> {
    let region =
        table
            .get_mut(&statement.section)
            .ok_or_else(|| AssemblyError::SectionMissing {
                section: statement.section.clone(),
                line: statement.line,
            })?;

    // Next empty slot in the section.
    let address = region.start + region.count;
    region.count += 1;

    // The planner sized the section; running past its end is a bug.
    if region.start + region.count - 1 > region.end {
        return Err(AssemblyError::SectionOverflow {
            section: statement.section.clone(),
            line: statement.line,
        });
    }

    Ok(address)
}
