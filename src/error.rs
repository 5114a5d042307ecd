//! Diagnostic types shared by every assembler stage.
//!
//! `ErrorKind` carries the per-variant message template (via `thiserror`);
//! `AsmError` pairs a kind with the source `Span` it was raised at.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub col: usize,
}

impl Span {
    pub const fn dummy() -> Self {
        Span { start: 0, end: 0, line: 1, col: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("expected digits after '#'")]
    EmptyDecimalLiteral,
    #[error("invalid decimal literal '{0}'")]
    InvalidDecimalLiteral(String),
    #[error("hex literal '{0}' exceeds 16 bits")]
    HexLiteralOutOfRange(String),
    #[error("invalid hex literal '{0}'")]
    InvalidHexLiteral(String),
    #[error("invalid register R{0} (must be R0-R7)")]
    InvalidRegister(u8),
    #[error("unknown directive .{0}")]
    UnknownDirective(String),

    #[error("unexpected token at start of line")]
    UnexpectedToken,
    #[error("{0}")]
    ExpectedOperand(String),
    #[error("{0}")]
    ExpectedRegister(String),
    #[error("{0}")]
    ExpectedComma(String),
    #[error("{0}")]
    TooManyOperands(String),
    #[error("{0}")]
    TooFewOperands(String),
    #[error("{0}")]
    InvalidOperandType(String),

    #[error("duplicate label '{label}' (first defined at address x{first_addr:04X})")]
    DuplicateLabel { label: String, first_addr: u16 },
    #[error("undefined label '{0}'")]
    UndefinedLabel(String),
    #[error("expected .ORIG before any instructions")]
    MissingOrig,
    #[error(".ORIG must be the first statement in the program")]
    OrigNotFirst,
    #[error("multiple .ORIG directives are not supported")]
    MultipleOrig,
    #[error("no .END directive found")]
    MissingEnd,
    #[error(".ORIG address must be 0x0000-0xFFFF")]
    InvalidOrigAddress,
    #[error(".BLKW count {0} is out of range (must be 0-65535)")]
    InvalidBlkwCount(i32),
    #[error("address overflow: location counter would exceed 0xFFFF (at x{addr:04X} + {words} words)")]
    AddressOverflow { addr: u16, words: u32 },
    #[error("PC offset {offset} to label '{label}' exceeds {bits}-bit range [{min}, {max}]")]
    OffsetOutOfRange { offset: i32, label: String, bits: u8, min: i32, max: i32 },
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("ERROR (line {}:{}): {kind}", span.line, span.col)]
pub struct AsmError {
    pub kind: ErrorKind,
    pub span: Span,
}

impl AsmError {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn duplicate_label(label: impl Into<String>, first_addr: u16, span: Span) -> Self {
        Self::new(
            ErrorKind::DuplicateLabel { label: label.into(), first_addr },
            span,
        )
    }

    pub fn undefined_label(label: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::UndefinedLabel(label.into()), span)
    }
}
