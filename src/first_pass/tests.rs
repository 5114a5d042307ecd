use crate::error::ErrorKind;
use crate::first_pass::first_pass;
use crate::lexer::tokenize;
use crate::parser::parse_lines;

fn run_first_pass(source: &str) -> crate::first_pass::FirstPassResult {
    let lexed = tokenize(source);
    assert!(lexed.errors.is_empty(), "lexer errors: {:?}", lexed.errors);
    let parsed = parse_lines(&lexed.tokens);
    assert!(parsed.errors.is_empty(), "parser errors: {:?}", parsed.errors);
    first_pass(parsed.lines, lexed.saw_end)
}

#[test]
fn records_label_addresses() {
    let result = run_first_pass(".ORIG x3000\nLOOP ADD R0, R0, #1\nBRnzp LOOP\n.END");
    assert_eq!(result.symbol_table.get("loop"), Some(0x3000));
    assert!(result.errors.is_empty());
}

#[test]
fn missing_orig_is_reported() {
    let result = run_first_pass("ADD R0, R0, #1\n.END");
    assert!(result.errors.iter().any(|e| matches!(e.kind, ErrorKind::OrigNotFirst)));
}

#[test]
fn missing_end_is_reported() {
    let result = run_first_pass(".ORIG x3000\nHALT");
    assert!(result.errors.iter().any(|e| matches!(e.kind, ErrorKind::MissingEnd)));
}

#[test]
fn duplicate_label_is_reported() {
    let result = run_first_pass(".ORIG x3000\nA ADD R0, R0, #1\nA ADD R0, R0, #1\n.END");
    assert!(result.errors.iter().any(|e| matches!(e.kind, ErrorKind::DuplicateLabel { .. })));
}

#[test]
fn blkw_advances_location_counter_by_count() {
    let result = run_first_pass(".ORIG x3000\nARR .BLKW #3\nAFTER HALT\n.END");
    assert_eq!(result.symbol_table.get("arr"), Some(0x3000));
    assert_eq!(result.symbol_table.get("after"), Some(0x3003));
}

#[test]
fn blkw_zero_does_not_advance_location_counter() {
    let result = run_first_pass(".ORIG x3000\nARR .BLKW #0\nAFTER HALT\n.END");
    assert_eq!(result.symbol_table.get("after"), Some(0x3000));
    assert!(result.errors.is_empty());
}

#[test]
fn stringz_reserves_length_plus_one() {
    let result = run_first_pass(".ORIG x3000\nMSG .STRINGZ \"hi\"\nAFTER HALT\n.END");
    assert_eq!(result.symbol_table.get("after"), Some(0x3003));
}

#[test]
fn multiple_orig_is_reported() {
    let result = run_first_pass(".ORIG x3000\nHALT\n.ORIG x4000\nHALT\n.END");
    assert!(result.errors.iter().any(|e| matches!(e.kind, ErrorKind::MultipleOrig)));
}
