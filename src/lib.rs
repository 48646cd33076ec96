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

pub mod assembler;
pub mod ast;
pub mod errors;
pub mod machine;
pub mod output;
pub mod parser;

use assembler::{ReferenceTable, RegionTable};
use errors::AssemblyError;
use output::OutputFormat;

extern crate pest;
extern crate pest_derive;

/// Assemble SMA16 source text into a memory image in the requested format.
///
/// The pipeline runs strictly forward: parse, glue labels and sections,
/// install vectors, plan sections, assign constant and instruction cells,
/// resolve references, serialize. The first offending item aborts the whole
/// assembly, so a caller never sees a partial image.
pub fn assemble(source: &str, format: OutputFormat) -> Result<Vec<u8>, AssemblyError> {
    let parsed = parser::parse_source(source)?;
    let glued = assembler::glue_labels_and_sections(parsed)?;
    let items = assembler::install_vectors(glued)?;

    let mut references = ReferenceTable::with_built_ins();
    let mut regions = RegionTable::with_reserved();

    let sections = assembler::section_sizes(&items);
    assembler::assign_sections(&mut regions, &sections)?;

    let items = assembler::assign_constants(&mut references, &mut regions, items)?;
    let items = assembler::assign_instructions(&mut references, &mut regions, items)?;
    let cells = assembler::resolve_references(&references, items)?;

    Ok(match format {
        OutputFormat::Text => output::to_text(&regions, &cells),
        OutputFormat::Bin => output::to_bin(&cells),
        OutputFormat::Hex => output::to_hex(&cells),
    })
}
