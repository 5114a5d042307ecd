use crate::error::ErrorKind;
use crate::lexer::tokenize;
use crate::parser::ast::{Instruction, LineContent, SourceLine};
use crate::parser::parse_lines;

fn parse_ok(input: &str) -> Vec<SourceLine> {
    let lexed = tokenize(input);
    assert!(lexed.errors.is_empty(), "lexer errors: {:?}", lexed.errors);
    let parsed = parse_lines(&lexed.tokens);
    assert!(parsed.errors.is_empty(), "parser errors: {:?}", parsed.errors);
    parsed.lines
}

fn parse_errors(input: &str) -> Vec<ErrorKind> {
    let lexed = tokenize(input);
    let parsed = parse_lines(&lexed.tokens);
    parsed.errors.into_iter().map(|e| e.kind).collect()
}

#[test]
fn parse_add_register() {
    let lines = parse_ok("ADD R1, R2, R3");
    assert_eq!(lines[0].content, LineContent::Instruction(Instruction::AddReg { dr: 1, sr1: 2, sr2: 3 }));
}

#[test]
fn parse_add_immediate() {
    let lines = parse_ok("ADD R1, R2, #5");
    assert_eq!(lines[0].content, LineContent::Instruction(Instruction::AddImm { dr: 1, sr1: 2, imm5: 5 }));
}

#[test]
fn parse_label_declaration() {
    let lines = parse_ok("LOOP ADD R0, R0, #1");
    assert_eq!(lines[0].label.as_deref(), Some("loop"));
}

#[test]
fn parse_br_with_label_operand() {
    let lines = parse_ok("BRz DONE");
    match &lines[0].content {
        LineContent::Instruction(Instruction::Br { label, .. }) => assert_eq!(label, "done"),
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn parse_blkw_zero_is_accepted() {
    let lines = parse_ok(".BLKW #0");
    assert_eq!(lines[0].content, LineContent::Blkw(0));
}

#[test]
fn parse_blkw_negative_is_an_error() {
    let errors = parse_errors(".BLKW #-1");
    assert!(matches!(errors[0], ErrorKind::InvalidBlkwCount(-1)));
}

#[test]
fn parse_fill_with_label() {
    let lines = parse_ok(".FILL TARGET");
    assert_eq!(lines[0].content, LineContent::FillLabel("target".into()));
}

#[test]
fn parse_stringz() {
    let lines = parse_ok(".STRINGZ \"hi\"");
    assert_eq!(lines[0].content, LineContent::Stringz("hi".into()));
}

#[test]
fn parse_no_operand_instructions() {
    assert_eq!(parse_ok("RET")[0].content, LineContent::Instruction(Instruction::Ret));
    assert_eq!(parse_ok("HALT")[0].content, LineContent::Instruction(Instruction::Halt));
}

#[test]
fn missing_comma_is_an_error() {
    let errors = parse_errors("ADD R1 R2, R3");
    assert!(matches!(errors[0], ErrorKind::ExpectedComma(_)));
}

#[test]
fn unknown_leading_token_is_an_error() {
    let errors = parse_errors("#5");
    assert!(matches!(errors[0], ErrorKind::UnexpectedToken));
}

#[test]
fn trap_vector_out_of_range_is_an_error() {
    let errors = parse_errors("TRAP #256");
    assert!(matches!(errors[0], ErrorKind::InvalidOperandType(_)));
}

#[test]
fn imm5_out_of_range_is_rejected_rather_than_truncated() {
    let errors = parse_errors("ADD R1, R2, #100");
    assert!(matches!(errors[0], ErrorKind::InvalidOperandType(_)));
}

#[test]
fn offset6_out_of_range_is_rejected_rather_than_truncated() {
    let errors = parse_errors("LDR R1, R2, #100");
    assert!(matches!(errors[0], ErrorKind::InvalidOperandType(_)));
}
