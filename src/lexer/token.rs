//! Token types for LC-3 assembly.
//!
//! The source is lowercased before scanning (see `lexer::tokenize`), so every
//! lexeme stored here is lowercase; mnemonics and directives are matched
//! case-insensitively as a side effect.

use crate::error::Span;

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // === LC-3 Opcodes ===
    OpAdd,
    OpAnd,
    OpNot,
    OpBr(BrFlags),
    OpJmp,
    OpJsr,
    OpJsrr,
    OpLd,
    OpLdi,
    OpLdr,
    OpLea,
    OpSt,
    OpSti,
    OpStr,
    OpTrap,
    OpRti,

    // === Pseudo-ops ===
    PseudoRet,
    PseudoGetc,
    PseudoOut,
    PseudoPuts,
    PseudoIn,
    PseudoPutsp,
    PseudoHalt,

    // === Directives ===
    DirOrig,
    DirEnd,
    DirFill,
    DirBlkw,
    DirStringz,

    // === Operands ===
    Register(u8),
    NumDecimal(i32),
    NumHex(i32),
    StringLiteral(String),

    /// A bare identifier used as an operand (label reference).
    Ident(String),
    /// An identifier occupying the first position on a line (label
    /// declaration). Distinguished from `Ident` by position, not spelling.
    Label(String),

    Comma,
    Newline,
    Comment(String),

    Eof,
}

/// Branch condition flags for the BR instruction.
///
/// Encoding matches bits [11:9] of the instruction word: bit 11 = N,
/// bit 10 = Z, bit 9 = P.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrFlags {
    pub n: bool,
    pub z: bool,
    pub p: bool,
}

impl BrFlags {
    pub fn new(n: bool, z: bool, p: bool) -> Self {
        Self { n, z, p }
    }

    /// Parse flags from a lowercase mnemonic like "br", "brn", "brnzp".
    pub fn parse(s: &str) -> Option<Self> {
        if !s.starts_with("br") {
            return None;
        }

        let flags_part = &s[2..];
        if flags_part.is_empty() {
            return Some(Self::new(true, true, true));
        }

        let mut n = false;
        let mut z = false;
        let mut p = false;

        for ch in flags_part.chars() {
            match ch {
                'n' => n = true,
                'z' => z = true,
                'p' => p = true,
                _ => return None,
            }
        }
        Some(Self::new(n, z, p))
    }

    /// 3-bit encoding [N][Z][P], used unshifted in bits [11:9] of `BR`.
    pub fn as_u16(&self) -> u16 {
        ((self.n as u16) << 2) | ((self.z as u16) << 1) | (self.p as u16)
    }
}

impl std::fmt::Display for BrFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.n {
            f.write_str("n")?;
        }
        if self.z {
            f.write_str("z")?;
        }
        if self.p {
            f.write_str("p")?;
        }
        Ok(())
    }
}

impl TokenKind {
    pub fn is_instruction_or_directive(&self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            OpAdd
                | OpAnd
                | OpNot
                | OpBr(_)
                | OpJmp
                | OpJsr
                | OpJsrr
                | OpRti
                | OpLd
                | OpLdi
                | OpLdr
                | OpLea
                | OpSt
                | OpSti
                | OpStr
                | OpTrap
                | PseudoRet
                | PseudoGetc
                | PseudoOut
                | PseudoPuts
                | PseudoIn
                | PseudoPutsp
                | PseudoHalt
                | DirOrig
                | DirEnd
                | DirFill
                | DirBlkw
                | DirStringz
        )
    }
}
