//! Parses a token stream into an Abstract Syntax Tree (AST).
//!
//! Tokens are split into lines at each `NEWLINE`; an optional leading
//! `LABEL` is peeled off, and the remaining tokens for each line are matched
//! against the grammar for the mnemonic or directive that follows. Errors
//! are line-scoped: a malformed line is recorded as an error and the parser
//! resumes at the next line, so one bad line does not abort the whole file.
//!
//! Declarative macros (`macros.rs`) generate the parsers for instruction
//! shapes that repeat across several mnemonics.

#[macro_use]
mod macros;
pub mod ast;

#[cfg(test)]
mod tests;

use crate::error::{AsmError, ErrorKind, Span};
use crate::lexer::token::{Token, TokenKind};
use ast::{Instruction, LineContent, SourceLine};

pub struct ParseResult {
    pub lines: Vec<SourceLine>,
    pub errors: Vec<AsmError>,
}

#[must_use]
pub fn parse_lines(tokens: &[Token]) -> ParseResult {
    let mut lines = Vec::new();
    let mut errors = Vec::new();
    let mut line_start = 0;
    let mut line_number = 1;

    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::Newline => {
                process_line(&tokens[line_start..i], line_number, &mut lines, &mut errors);
                line_start = i + 1;
                line_number += 1;
            }
            TokenKind::Eof => {
                process_line(&tokens[line_start..i], line_number, &mut lines, &mut errors);
                break;
            }
            _ => {}
        }
    }

    ParseResult { lines, errors }
}

fn process_line(
    tokens: &[Token],
    line_number: usize,
    lines: &mut Vec<SourceLine>,
    errors: &mut Vec<AsmError>,
) {
    let span = line_span(tokens, line_number);
    let code_end = tokens
        .iter()
        .position(|t| matches!(t.kind, TokenKind::Comment(_)))
        .unwrap_or(tokens.len());
    let filtered: Vec<&Token> = tokens[..code_end].iter().collect();

    if filtered.is_empty() {
        lines.push(SourceLine { label: None, content: LineContent::Empty, line_number, span });
        return;
    }

    let first = filtered[0];
    let mut label: Option<String> = None;
    let content_tokens: &[&Token];

    match &first.kind {
        TokenKind::Label(name) => {
            label = Some(name.clone());
            if filtered.len() > 1 && filtered[1].kind.is_instruction_or_directive() {
                content_tokens = &filtered[1..];
            } else {
                lines.push(SourceLine { label, content: LineContent::Empty, line_number, span });
                return;
            }
        }
        kind if kind.is_instruction_or_directive() => {
            content_tokens = &filtered[..];
        }
        _ => {
            errors.push(AsmError::new(ErrorKind::UnexpectedToken, first.span));
            lines.push(SourceLine { label: None, content: LineContent::Empty, line_number, span });
            return;
        }
    }

    match parse_content(content_tokens) {
        Ok(content) => lines.push(SourceLine { label, content, line_number, span }),
        Err(err) => {
            errors.push(err);
            lines.push(SourceLine { label, content: LineContent::Empty, line_number, span });
        }
    }
}

fn line_span(tokens: &[Token], line_number: usize) -> Span {
    if let (Some(first), Some(last)) = (tokens.first(), tokens.last()) {
        Span { start: first.span.start, end: last.span.end, line: first.span.line, col: first.span.col }
    } else {
        Span { start: 0, end: 0, line: line_number, col: 1 }
    }
}

fn parse_content(tokens: &[&Token]) -> Result<LineContent, AsmError> {
    let first = tokens[0];

    match &first.kind {
        TokenKind::OpAdd => parse_reg_reg_or_imm!(
            "ADD",
            |dr, sr1, sr2| Instruction::AddReg { dr, sr1, sr2 },
            |dr, sr1, imm5| Instruction::AddImm { dr, sr1, imm5 }
        )(tokens),

        TokenKind::OpAnd => parse_reg_reg_or_imm!(
            "AND",
            |dr, sr1, sr2| Instruction::AndReg { dr, sr1, sr2 },
            |dr, sr1, imm5| Instruction::AndImm { dr, sr1, imm5 }
        )(tokens),

        TokenKind::OpNot => parse_not(tokens),
        TokenKind::OpBr(flags) => parse_br(tokens, *flags),

        TokenKind::OpLd => parse_reg_label!("LD", |dr, label| Instruction::Ld { dr, label })(tokens),
        TokenKind::OpLdi => parse_reg_label!("LDI", |dr, label| Instruction::Ldi { dr, label })(tokens),
        TokenKind::OpLea => parse_reg_label!("LEA", |dr, label| Instruction::Lea { dr, label })(tokens),
        TokenKind::OpSt => parse_reg_label!("ST", |sr, label| Instruction::St { sr, label })(tokens),
        TokenKind::OpSti => parse_reg_label!("STI", |sr, label| Instruction::Sti { sr, label })(tokens),

        TokenKind::OpLdr => parse_reg_reg_imm!("LDR", |dr, base_r, offset6| Instruction::Ldr { dr, base_r, offset6 })(tokens),
        TokenKind::OpStr => parse_reg_reg_imm!("STR", |sr, base_r, offset6| Instruction::Str { sr, base_r, offset6 })(tokens),

        TokenKind::OpJmp => parse_single_reg!("JMP", |base_r| Instruction::Jmp { base_r })(tokens),
        TokenKind::OpJsr => parse_single_label!("JSR", |label| Instruction::Jsr { label })(tokens),
        TokenKind::OpJsrr => parse_single_reg!("JSRR", |base_r| Instruction::Jsrr { base_r })(tokens),

        TokenKind::OpTrap => parse_trap(tokens),

        TokenKind::OpRti => parse_no_operands!("RTI", Instruction::Rti)(tokens),
        TokenKind::PseudoRet => parse_no_operands!("RET", Instruction::Ret)(tokens),
        TokenKind::PseudoGetc => parse_no_operands!("GETC", Instruction::Getc)(tokens),
        TokenKind::PseudoOut => parse_no_operands!("OUT", Instruction::Out)(tokens),
        TokenKind::PseudoPuts => parse_no_operands!("PUTS", Instruction::Puts)(tokens),
        TokenKind::PseudoIn => parse_no_operands!("IN", Instruction::In)(tokens),
        TokenKind::PseudoPutsp => parse_no_operands!("PUTSP", Instruction::Putsp)(tokens),
        TokenKind::PseudoHalt => parse_no_operands!("HALT", Instruction::Halt)(tokens),

        TokenKind::DirOrig => parse_orig(tokens),
        TokenKind::DirFill => parse_fill(tokens),
        TokenKind::DirBlkw => parse_blkw(tokens),
        TokenKind::DirStringz => parse_stringz(tokens),

        _ => Err(AsmError::new(ErrorKind::UnexpectedToken, first.span)),
    }
}

fn parse_not(tokens: &[&Token]) -> Result<LineContent, AsmError> {
    if tokens.len() < 4 {
        return Err(AsmError::new(
            ErrorKind::TooFewOperands("NOT requires 2 operands: NOT DR, SR".into()),
            tokens[0].span,
        ));
    }
    expect_comma(tokens, 2, "Expected comma after first operand")?;
    let dr = expect_register(tokens, 1, "NOT first operand must be a register (R0-R7)")?;
    let sr = expect_register(tokens, 3, "NOT second operand must be a register (R0-R7)")?;
    ensure_no_extra(tokens, 4)?;
    Ok(LineContent::Instruction(Instruction::Not { dr, sr }))
}

fn parse_br(tokens: &[&Token], flags: crate::lexer::token::BrFlags) -> Result<LineContent, AsmError> {
    if tokens.len() < 2 {
        return Err(AsmError::new(
            ErrorKind::TooFewOperands("BR requires a label operand".into()),
            tokens[0].span,
        ));
    }
    let label = expect_label(tokens, 1, "BR requires a label operand")?;
    ensure_no_extra(tokens, 2)?;
    Ok(LineContent::Instruction(Instruction::Br { flags, label }))
}

fn parse_trap(tokens: &[&Token]) -> Result<LineContent, AsmError> {
    if tokens.len() < 2 {
        return Err(AsmError::new(
            ErrorKind::TooFewOperands("TRAP requires a numeric trap vector (e.g., TRAP x25)".into()),
            tokens[0].span,
        ));
    }
    let value = token_to_i32(tokens[1]).ok_or_else(|| {
        AsmError::new(
            ErrorKind::InvalidOperandType("TRAP requires a numeric trap vector (e.g., TRAP x25)".into()),
            tokens[1].span,
        )
    })?;
    if !(0..=0xFF).contains(&value) {
        return Err(AsmError::new(
            ErrorKind::InvalidOperandType(format!("TRAP vector {} is out of range (must be 0x00-0xFF)", value)),
            tokens[1].span,
        ));
    }
    ensure_no_extra(tokens, 2)?;
    Ok(LineContent::Instruction(Instruction::Trap { trapvect8: value as u8 }))
}

fn parse_orig(tokens: &[&Token]) -> Result<LineContent, AsmError> {
    if tokens.len() < 2 {
        return Err(AsmError::new(
            ErrorKind::TooFewOperands(".ORIG requires a numeric operand".into()),
            tokens[0].span,
        ));
    }
    let value = token_to_i32(tokens[1]).ok_or_else(|| {
        AsmError::new(ErrorKind::InvalidOperandType(".ORIG requires a numeric operand".into()), tokens[1].span)
    })?;
    // Hex literals above 0x7FFF arrive as negative i32 (two's complement);
    // decimal literals arrive already wrapped the same way by the lexer.
    if !(i16::MIN as i32..=0xFFFF_i32).contains(&value) {
        return Err(AsmError::new(ErrorKind::InvalidOrigAddress, tokens[1].span));
    }
    ensure_no_extra(tokens, 2)?;
    Ok(LineContent::Orig(value as u16))
}

fn parse_fill(tokens: &[&Token]) -> Result<LineContent, AsmError> {
    if tokens.len() < 2 {
        return Err(AsmError::new(
            ErrorKind::TooFewOperands(".FILL requires a numeric or label operand".into()),
            tokens[0].span,
        ));
    }
    if let Some(value) = token_to_i32(tokens[1]) {
        if !(i16::MIN as i32..=0xFFFF_i32).contains(&value) {
            return Err(AsmError::new(
                ErrorKind::InvalidOperandType(format!(
                    ".FILL value {} is out of 16-bit range (-32768 to 65535)",
                    value
                )),
                tokens[1].span,
            ));
        }
        ensure_no_extra(tokens, 2)?;
        Ok(LineContent::FillImmediate(value))
    } else if let Some(label) = token_to_label(tokens[1]) {
        ensure_no_extra(tokens, 2)?;
        Ok(LineContent::FillLabel(label))
    } else {
        Err(AsmError::new(
            ErrorKind::InvalidOperandType(".FILL requires a numeric or label operand".into()),
            tokens[1].span,
        ))
    }
}

fn parse_blkw(tokens: &[&Token]) -> Result<LineContent, AsmError> {
    if tokens.len() < 2 {
        return Err(AsmError::new(
            ErrorKind::TooFewOperands(".BLKW requires a numeric operand".into()),
            tokens[0].span,
        ));
    }
    let value = token_to_i32(tokens[1]).ok_or_else(|| {
        AsmError::new(ErrorKind::InvalidOperandType(".BLKW requires a numeric operand".into()), tokens[1].span)
    })?;
    // Zero is a valid (if useless) reservation — it emits nothing. Negative
    // counts and counts overflowing the address space are rejected.
    if !(0..=0xFFFF).contains(&value) {
        return Err(AsmError::new(ErrorKind::InvalidBlkwCount(value), tokens[1].span));
    }
    ensure_no_extra(tokens, 2)?;
    Ok(LineContent::Blkw(value as u16))
}

fn parse_stringz(tokens: &[&Token]) -> Result<LineContent, AsmError> {
    if tokens.len() < 2 {
        return Err(AsmError::new(
            ErrorKind::TooFewOperands(".STRINGZ requires a string literal operand".into()),
            tokens[0].span,
        ));
    }
    match &tokens[1].kind {
        TokenKind::StringLiteral(s) => {
            ensure_no_extra(tokens, 2)?;
            Ok(LineContent::Stringz(s.clone()))
        }
        _ => Err(AsmError::new(
            ErrorKind::InvalidOperandType(".STRINGZ requires a string literal operand".into()),
            tokens[1].span,
        )),
    }
}

// Helper functions — pub(crate) so the macros above can reach them via
// `$crate::parser::*` without exposing them in the public library API.
pub(crate) fn ensure_no_extra(tokens: &[&Token], expected_len: usize) -> Result<(), AsmError> {
    if tokens.len() > expected_len {
        return Err(AsmError::new(
            ErrorKind::TooManyOperands("Unexpected token after instruction".into()),
            tokens[expected_len].span,
        ));
    }
    Ok(())
}

pub(crate) fn expect_comma(tokens: &[&Token], idx: usize, message: &str) -> Result<(), AsmError> {
    if tokens.len() <= idx {
        return Err(AsmError::new(ErrorKind::ExpectedComma(message.into()), tokens[0].span));
    }
    match tokens[idx].kind {
        TokenKind::Comma => Ok(()),
        _ => Err(AsmError::new(ErrorKind::ExpectedComma(message.into()), tokens[idx].span)),
    }
}

pub(crate) fn expect_register(tokens: &[&Token], idx: usize, message: &str) -> Result<u8, AsmError> {
    if tokens.len() <= idx {
        return Err(AsmError::new(ErrorKind::ExpectedRegister(message.into()), tokens[0].span));
    }
    token_to_register(tokens[idx]).ok_or_else(|| AsmError::new(ErrorKind::ExpectedRegister(message.into()), tokens[idx].span))
}

pub(crate) fn expect_label(tokens: &[&Token], idx: usize, message: &str) -> Result<String, AsmError> {
    if tokens.len() <= idx {
        return Err(AsmError::new(ErrorKind::ExpectedOperand(message.into()), tokens[0].span));
    }
    token_to_label(tokens[idx]).ok_or_else(|| AsmError::new(ErrorKind::ExpectedOperand(message.into()), tokens[idx].span))
}

pub(crate) fn token_to_i32(token: &Token) -> Option<i32> {
    match &token.kind {
        TokenKind::NumDecimal(v) => Some(*v),
        TokenKind::NumHex(v) => Some(*v),
        _ => None,
    }
}

pub(crate) fn token_to_register(token: &Token) -> Option<u8> {
    match &token.kind {
        TokenKind::Register(r) => Some(*r),
        _ => None,
    }
}

/// Label *references* (operands) are lexed as `Ident`, not `Label` — only
/// the first token on a line is a `Label` declaration.
pub(crate) fn token_to_label(token: &Token) -> Option<String> {
    match &token.kind {
        TokenKind::Ident(s) => Some(s.clone()),
        _ => None,
    }
}
