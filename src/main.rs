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

use anyhow::{Context, Result};
use clap::Parser as clap_parser;
use clap::ValueEnum;
use colored::Colorize;
use sma16asm::assemble;
use sma16asm::output::OutputFormat;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(clap_parser)]
#[clap(version, about = "Assembler for the SMA16 virtual machine")]
struct Opts {
    /// Input assembly source file
    input: PathBuf,
    /// Output file path
    #[clap(short, long, default_value = "a.txt")]
    output: PathBuf,
    /// Output format; auto picks from the output extension
    #[clap(short, long, value_enum, default_value = "auto")]
    format: Format,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    Auto,
    #[value(alias = "t")]
    Text,
    #[value(alias = "b")]
    Bin,
    #[value(alias = "h", alias = "x")]
    Hex,
}

impl Format {
    // auto resolves from the output extension: .bin and .hex are image
    // formats, anything else gets the text listing.
    fn resolve(self, output_path: &Path) -> OutputFormat {
        match self {
            Format::Text => OutputFormat::Text,
            Format::Bin => OutputFormat::Bin,
            Format::Hex => OutputFormat::Hex,
            Format::Auto => match output_path.extension().and_then(|ext| ext.to_str()) {
                Some("bin") => OutputFormat::Bin,
                Some("hex") => OutputFormat::Hex,
                _ => OutputFormat::Text,
            },
        }
    }
}

fn main() -> ExitCode {
    match run(Opts::parse()) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(opts: Opts) -> Result<ExitCode> {
    let output_path = std::path::absolute(&opts.output)
        .with_context(|| format!("Bad output path: {}", opts.output.display()))?;
    let format = opts.format.resolve(&output_path);

    if !output_path.parent().is_some_and(Path::is_dir) {
        println!("Output directory does not exist.");
        return Ok(ExitCode::from(2));
    }

    let input_path = std::path::absolute(&opts.input)
        .with_context(|| format!("Bad input path: {}", opts.input.display()))?;

    if !input_path.is_file() {
        println!("Input file does not exist.");
        return Ok(ExitCode::from(3));
    }

    let source = fs::read_to_string(&input_path)
        .with_context(|| format!("Failed to read input file: {}", input_path.display()))?;

    match assemble(&source, format) {
        Ok(image) => {
            fs::write(&output_path, image)
                .with_context(|| format!("Failed to write output: {}", output_path.display()))?;
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            // No output file is written on failure, so no stale artifact
            // can be left behind.
            eprintln!("{} {}.", "Assembly failed:".red().bold(), error);
            Ok(ExitCode::from(1))
        }
    }
}
