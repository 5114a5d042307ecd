//! Builds the symbol table and validates program structure.
//!
//! Walks the parsed lines once, tracking a location counter: every label
//! declaration is recorded at the current address, and every line advances
//! the counter by `LineContent::word_count()`. `.ORIG` must be the program's
//! first statement; anything else before it is flagged rather than silently
//! tolerated.

pub mod symbol_table;

#[cfg(test)]
mod tests;

use crate::error::{AsmError, ErrorKind, Span};
use crate::parser::ast::{LineContent, SourceLine};
use symbol_table::SymbolTable;

pub struct FirstPassResult {
    pub symbol_table: SymbolTable,
    pub source_lines: Vec<SourceLine>,
    pub orig_address: u16,
    pub errors: Vec<AsmError>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum AssemblerState {
    WaitingForOrig,
    Processing,
}

/// Run the first pass over parsed lines. `saw_end` comes from the scanner:
/// since `.end` terminates scanning rather than producing a token, whether
/// the program had an `.END` at all is known only to the lexer.
#[must_use]
pub fn first_pass(lines: Vec<SourceLine>, saw_end: bool) -> FirstPassResult {
    let mut symbol_table = SymbolTable::new();
    let mut errors = Vec::new();
    let mut location_counter: Option<u16> = None;
    let mut orig_address: u16 = 0;
    let mut state = AssemblerState::WaitingForOrig;

    for line in &lines {
        match state {
            AssemblerState::WaitingForOrig => match &line.content {
                LineContent::Orig(addr) => {
                    state = AssemblerState::Processing;
                    orig_address = *addr;
                    location_counter = Some(*addr);
                    if let Some(ref label) = line.label {
                        record_label(&mut symbol_table, label, *addr, line.span, &mut errors);
                    }
                    continue;
                }
                LineContent::Empty => continue,
                _ => {
                    errors.push(AsmError::new(ErrorKind::OrigNotFirst, line.span));
                    state = AssemblerState::Processing;
                    orig_address = 0x3000;
                    location_counter = Some(0x3000);
                }
            },
            AssemblerState::Processing => {}
        }

        let lc = location_counter.unwrap();

        if let Some(ref label) = line.label {
            record_label(&mut symbol_table, label, lc, line.span, &mut errors);
        }

        if matches!(line.content, LineContent::Orig(_)) {
            errors.push(AsmError::new(ErrorKind::MultipleOrig, line.span));
        }

        let words = line.content.word_count();
        let new_lc = (lc as u32) + words;
        if new_lc > 0x10000 {
            errors.push(AsmError::new(
                ErrorKind::AddressOverflow { addr: lc, words },
                line.span,
            ));
            location_counter = Some(0xFFFF);
        } else {
            location_counter = Some(new_lc as u16);
        }
    }

    if state == AssemblerState::WaitingForOrig {
        errors.push(AsmError::new(ErrorKind::MissingOrig, Span::dummy()));
    }

    if !saw_end {
        errors.push(AsmError::new(ErrorKind::MissingEnd, Span::dummy()));
    }

    FirstPassResult { symbol_table, source_lines: lines, orig_address, errors }
}

fn record_label(table: &mut SymbolTable, label: &str, address: u16, span: Span, errors: &mut Vec<AsmError>) {
    if let Some(first_addr) = table.get(label) {
        errors.push(AsmError::duplicate_label(label, first_addr, span));
    } else {
        table.insert(label.to_string(), address);
    }
}
