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

use crate::assembler::RegionTable;
use crate::ast::AddressValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Bin,
    Hex,
}

/// The annotated listing: a region map comment, then one `MEM` line per
/// resolved cell between `START_PROGRAM` and `END_PROGRAM`.
pub fn to_text(regions: &RegionTable, cells: &[AddressValue]) -> Vec<u8> {
    let mut lines: Vec<String> = Vec::new();

    lines.push("/* GENERATED from sma16asm".to_string());
    lines.push(" *".to_string());
    lines.push(" * Regions:".to_string());

    let mut region_entries: Vec<_> = regions.iter().collect();
    region_entries.sort_by_key(|(_, region)| region.start);
    for (name, region) in region_entries {
        lines.push(format!(
            " *   - {} from 0x{:03x} to 0x{:03x}",
            name, region.start, region.end
        ));
    }

    lines.push(" */".to_string());
    lines.push("START_PROGRAM".to_string());
    for cell in cells {
        lines.push(format!(
            "MEM(0x{:03x}, 0x{:x}, 0x{:03x})",
            cell.address,
            (cell.value >> 12) & 0xF,
            cell.value & 0xFFF
        ));
    }
    lines.push("END_PROGRAM".to_string());

    lines.join("\n").into_bytes()
}

/// The raw image: every cell from zero to the highest written address as two
/// big-endian bytes, no header.
pub fn to_bin(cells: &[AddressValue]) -> Vec<u8> {
    dense_memory(cells)
        .iter()
        .flat_map(|value| value.to_be_bytes())
        .collect()
}

/// The hex image: every cell as four lowercase hex digits, a line break
/// after every eighth cell, no header.
pub fn to_hex(cells: &[AddressValue]) -> Vec<u8> {
    let mut out = String::new();

    for (address, value) in dense_memory(cells).iter().enumerate() {
        out.push_str(&format!("{:04x}", value));
        if address % 8 == 7 {
            out.push('\n');
        }
    }

    out.into_bytes()
}

// A zero-filled memory array covering every address up to the highest one
// written. No cells means an empty image.
fn dense_memory(cells: &[AddressValue]) -> Vec<u16> {
    let Some(top) = cells.iter().map(|cell| cell.address).max() else {
        return Vec::new();
    };

    let mut memory = vec![0u16; top as usize + 1];
    for cell in cells {
        memory[cell.address as usize] = cell.value;
    }
    memory
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::assign_sections;

    fn cell(address: u16, value: u16) -> AddressValue {
        AddressValue { address, value }
    }

    #[test]
    fn test_text_listing_layout() {
        let mut regions = RegionTable::with_reserved();
        assign_sections(&mut regions, &[("code".to_string(), 1)]).unwrap();

        let listing = to_text(&regions, &[cell(0x000, 0x2010), cell(0x010, 0x0000)]);
        let listing = String::from_utf8(listing).unwrap();

        let expected = [
            "/* GENERATED from sma16asm",
            " *",
            " * Regions:",
            " *   - vectors from 0x000 to 0x007",
            " *   - configuration from 0x008 to 0x00f",
            " *   - code from 0x010 to 0x010",
            " */",
            "START_PROGRAM",
            "MEM(0x000, 0x2, 0x010)",
            "MEM(0x010, 0x0, 0x000)",
            "END_PROGRAM",
        ];
        assert_eq!(listing, expected.join("\n"));
    }

    #[test]
    fn test_text_listing_with_no_cells() {
        let regions = RegionTable::with_reserved();
        let listing = String::from_utf8(to_text(&regions, &[])).unwrap();
        assert!(listing.contains("START_PROGRAM\nEND_PROGRAM"));
        assert!(!listing.contains("MEM("));
    }

    #[test]
    fn test_bin_is_dense_and_big_endian() {
        let image = to_bin(&[cell(0x002, 0xBEEF)]);
        assert_eq!(image, vec![0x00, 0x00, 0x00, 0x00, 0xBE, 0xEF]);
    }

    #[test]
    fn test_bin_with_no_cells_is_empty() {
        assert!(to_bin(&[]).is_empty());
        assert!(to_hex(&[]).is_empty());
    }

    #[test]
    fn test_hex_wraps_every_eight_cells() {
        let image = to_hex(&[cell(0x008, 0x1234)]);
        let text = String::from_utf8(image).unwrap();
        assert_eq!(
            text,
            "0000000000000000000000000000000000000000000000000000000000000000\n1234"
        );
    }
}
