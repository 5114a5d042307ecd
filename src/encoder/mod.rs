//! Converts the parsed AST plus the sealed symbol table from pass one into
//! 16-bit LC-3 machine code words (pass two).

use crate::error::{AsmError, ErrorKind, Span};
use crate::first_pass::{symbol_table::SymbolTable, FirstPassResult};
use crate::isa::*;
use crate::parser::ast::{Instruction, LineContent, SourceLine};

pub struct EncodeResult {
    pub machine_code: Vec<u16>,
    pub orig_address: u16,
    pub errors: Vec<AsmError>,
}

#[must_use]
pub fn encode(first_pass: &FirstPassResult) -> EncodeResult {
    let mut encoder = Encoder::new(&first_pass.symbol_table, first_pass.orig_address);

    for line in &first_pass.source_lines {
        encoder.encode_line(line);
    }

    EncodeResult { machine_code: encoder.machine_code, orig_address: encoder.orig_address, errors: encoder.errors }
}

struct Encoder<'a> {
    symbol_table: &'a SymbolTable,
    machine_code: Vec<u16>,
    orig_address: u16,
    current_address: u16,
    errors: Vec<AsmError>,
}

impl<'a> Encoder<'a> {
    fn new(symbol_table: &'a SymbolTable, orig_address: u16) -> Self {
        Self {
            symbol_table,
            machine_code: Vec::new(),
            orig_address,
            current_address: orig_address,
            errors: Vec::new(),
        }
    }

    fn encode_line(&mut self, line: &SourceLine) {
        match &line.content {
            LineContent::Empty | LineContent::Orig(_) => {}
            LineContent::FillImmediate(value) => self.emit(*value as u16),
            LineContent::FillLabel(label) => match self.symbol_table.get(label) {
                Some(addr) => self.emit(addr),
                None => {
                    self.errors.push(AsmError::undefined_label(label.clone(), line.span));
                    self.emit(0);
                }
            },
            LineContent::Blkw(count) => {
                for _ in 0..*count {
                    self.emit(0);
                }
            }
            LineContent::Stringz(s) => {
                for ch in s.chars() {
                    self.emit(ch as u16);
                }
                self.emit(0);
            }
            LineContent::Instruction(inst) => self.encode_instruction(inst, line.span),
        }
    }

    fn encode_instruction(&mut self, inst: &Instruction, span: Span) {
        let encoded = match inst {
            Instruction::AddReg { dr, sr1, sr2 } => {
                (OP_ADD << 12) | ((*dr as u16) << 9) | ((*sr1 as u16) << 6) | (*sr2 as u16)
            }
            Instruction::AddImm { dr, sr1, imm5 } => {
                (OP_ADD << 12) | ((*dr as u16) << 9) | ((*sr1 as u16) << 6) | (1 << 5) | truncate(*imm5, 5)
            }
            Instruction::AndReg { dr, sr1, sr2 } => {
                (OP_AND << 12) | ((*dr as u16) << 9) | ((*sr1 as u16) << 6) | (*sr2 as u16)
            }
            Instruction::AndImm { dr, sr1, imm5 } => {
                (OP_AND << 12) | ((*dr as u16) << 9) | ((*sr1 as u16) << 6) | (1 << 5) | truncate(*imm5, 5)
            }
            Instruction::Not { dr, sr } => (OP_NOT << 12) | ((*dr as u16) << 9) | ((*sr as u16) << 6) | 0b111111,

            Instruction::Ld { dr, label } => {
                let offset = self.calc_pc_offset(label, 9, span);
                (OP_LD << 12) | ((*dr as u16) << 9) | offset
            }
            Instruction::Ldi { dr, label } => {
                let offset = self.calc_pc_offset(label, 9, span);
                (OP_LDI << 12) | ((*dr as u16) << 9) | offset
            }
            Instruction::Lea { dr, label } => {
                let offset = self.calc_pc_offset(label, 9, span);
                (OP_LEA << 12) | ((*dr as u16) << 9) | offset
            }
            Instruction::St { sr, label } => {
                let offset = self.calc_pc_offset(label, 9, span);
                (OP_ST << 12) | ((*sr as u16) << 9) | offset
            }
            Instruction::Sti { sr, label } => {
                let offset = self.calc_pc_offset(label, 9, span);
                (OP_STI << 12) | ((*sr as u16) << 9) | offset
            }

            Instruction::Ldr { dr, base_r, offset6 } => {
                (OP_LDR << 12) | ((*dr as u16) << 9) | ((*base_r as u16) << 6) | truncate(*offset6, 6)
            }
            Instruction::Str { sr, base_r, offset6 } => {
                (OP_STR << 12) | ((*sr as u16) << 9) | ((*base_r as u16) << 6) | truncate(*offset6, 6)
            }

            Instruction::Br { flags, label } => {
                let offset = self.calc_pc_offset(label, 9, span);
                (OP_BR << 12) | (flags.as_u16() << 9) | offset
            }

            Instruction::Jmp { base_r } => (OP_JMP << 12) | ((*base_r as u16) << 6),
            Instruction::Ret => (OP_JMP << 12) | (7 << 6),

            Instruction::Jsr { label } => {
                let offset = self.calc_pc_offset(label, 11, span);
                (OP_JSR << 12) | (1 << 11) | offset
            }
            Instruction::Jsrr { base_r } => (OP_JSR << 12) | ((*base_r as u16) << 6),

            Instruction::Trap { trapvect8 } => (OP_TRAP << 12) | (*trapvect8 as u16),
            Instruction::Getc => TRAP_WORD_GETC,
            Instruction::Out => TRAP_WORD_OUT,
            Instruction::Puts => TRAP_WORD_PUTS,
            Instruction::In => TRAP_WORD_IN,
            Instruction::Putsp => TRAP_WORD_PUTSP,
            Instruction::Halt => TRAP_WORD_HALT,

            Instruction::Rti => OP_RTI << 12,
        };

        self.emit(encoded);
    }

    /// `offset = target_address - (current_address + 1)`: at execution
    /// time PC has already advanced past the current instruction.
    fn calc_pc_offset(&mut self, label: &str, bits: u8, span: Span) -> u16 {
        match self.symbol_table.get(label) {
            Some(target_addr) => {
                let pc = self.current_address.wrapping_add(1);
                let offset = (target_addr as i32) - (pc as i32);

                let max_offset = (1 << (bits - 1)) - 1;
                let min_offset = -(1 << (bits - 1));

                if offset < min_offset || offset > max_offset {
                    self.errors.push(AsmError::new(
                        ErrorKind::OffsetOutOfRange {
                            offset,
                            label: label.to_string(),
                            bits,
                            min: min_offset,
                            max: max_offset,
                        },
                        span,
                    ));
                    0
                } else {
                    (offset as u16) & ((1 << bits) - 1)
                }
            }
            None => {
                self.errors.push(AsmError::undefined_label(label, span));
                0
            }
        }
    }

    fn emit(&mut self, word: u16) {
        self.machine_code.push(word);
        self.current_address = self.current_address.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::first_pass::first_pass;
    use crate::lexer::tokenize;
    use crate::parser::parse_lines;

    fn assemble(source: &str) -> EncodeResult {
        let lexed = tokenize(source);
        assert!(lexed.errors.is_empty(), "lexer errors: {:?}", lexed.errors);
        let parsed = parse_lines(&lexed.tokens);
        assert!(parsed.errors.is_empty(), "parser errors: {:?}", parsed.errors);
        let first = first_pass(parsed.lines, lexed.saw_end);
        assert!(first.errors.is_empty(), "first pass errors: {:?}", first.errors);
        encode(&first)
    }

    #[test]
    fn encodes_add_immediate() {
        let result = assemble(".ORIG x3000\nADD R0, R0, #5\n.END");
        assert_eq!(result.machine_code, vec![0b0001_000_000_1_00101]);
    }

    #[test]
    fn encodes_forward_branch_offset() {
        let result = assemble(".ORIG x3000\nBRz SKIP\nADD R0, R0, #1\nSKIP HALT\n.END");
        // BRz at x3000 targets x3002: offset = 0x3002 - (0x3000+1) = 1
        assert_eq!(result.machine_code[0], 0b0000_010_000000001);
    }

    #[test]
    fn ldr_str_use_a_six_bit_offset_mask() {
        let result = assemble(".ORIG x3000\nLDR R0, R1, #-1\n.END");
        assert_eq!(result.machine_code[0] & 0x3F, 0x3F);
    }

    #[test]
    fn undefined_label_is_reported() {
        let lexed = tokenize(".ORIG x3000\nBRz NOWHERE\n.END");
        let parsed = parse_lines(&lexed.tokens);
        let first = first_pass(parsed.lines, lexed.saw_end);
        let result = encode(&first);
        assert!(result.errors.iter().any(|e| matches!(e.kind, ErrorKind::UndefinedLabel(_))));
    }

    #[test]
    fn out_of_range_branch_offset_is_reported() {
        let mut source = String::from(".ORIG x3000\nBRz FAR\n");
        for _ in 0..300 {
            source.push_str("ADD R0, R0, #0\n");
        }
        source.push_str("FAR HALT\n.END");
        let lexed = tokenize(&source);
        let parsed = parse_lines(&lexed.tokens);
        let first = first_pass(parsed.lines, lexed.saw_end);
        let result = encode(&first);
        assert!(result.errors.iter().any(|e| matches!(e.kind, ErrorKind::OffsetOutOfRange { .. })));
    }
}
