use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum AssemblyError {
    #[error("Syntax Error: {0}")]
    PestError(#[from] pest::error::Error<crate::parser::Rule>),

    #[error("reference name invalid {name} on line {line}")]
    InvalidReferenceName { name: String, line: usize },

    #[error("invalid integer literal {text} on line {line}")]
    InvalidInteger { text: String, line: usize },

    #[error("invalid {kind} {text} on line {line}")]
    MalformedLiteral {
        kind: &'static str,
        text: String,
        line: usize,
    },

    #[error("invalid {kind} value {text} on line {line}")]
    LiteralLength {
        kind: &'static str,
        text: String,
        line: usize,
    },

    #[error("invalid section name for .sec on line {line}")]
    InvalidSectionName { line: usize },

    #[error("unknown vector {name} on line {line}")]
    UnknownVector { name: String, line: usize },

    #[error("vector directive {name} requires a reference value on line {line}")]
    VectorWithoutReference { name: String, line: usize },

    #[error("unknown directive {name} on line {line}")]
    UnknownDirective { name: String, line: usize },

    #[error("unknown instruction {name} on line {line}")]
    UnknownInstruction { name: String, line: usize },

    #[error("character '{character}' cannot be encoded in small encoding")]
    SmallEncoding { character: char },

    #[error("raw value {text} cannot be placed in a cell on line {line}")]
    RawValueInCell { text: String, line: usize },

    #[error("reference to undefined location {name}{suggestion}")]
    UndefinedReference { name: String, suggestion: String },

    #[error("memory full")]
    MemoryFull,

    #[error("region {name} assigned in used space, memory is likely full")]
    RegionOverlap { name: String },

    #[error("ran out of free space")]
    OutOfSpace,

    #[error(
        "item from line {line} has section {section} which is not in region table, this is a bug"
    )]
    SectionMissing { section: String, line: usize },

    #[error("item from line {line} did not fit in section {section}, this is a bug")]
    SectionOverflow { section: String, line: usize },

    #[error("item from line {line} was never assigned an address, this is a bug")]
    UnassignedItem { line: usize },
}
