use super::*;
use crate::lexer::token::TokenKind::*;

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source).tokens.into_iter().map(|t| t.kind).collect()
}

fn lex_ok(source: &str) -> Vec<TokenKind> {
    let result = tokenize(source);
    assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
    result.tokens.into_iter().map(|t| t.kind).collect()
}

#[test]
fn registers_and_comma() {
    assert_eq!(lex_ok("R0, R7"), vec![Register(0), Comma, Register(7), Eof]);
}

#[test]
fn case_insensitive_mnemonics() {
    assert_eq!(
        lex_ok("AdD r0, R1, r2"),
        vec![OpAdd, Register(0), Comma, Register(1), Comma, Register(2), Eof]
    );
}

#[test]
fn label_vs_identifier_reference() {
    // LOOP is a label declaration (first on its line); SKIP is an operand reference.
    let toks = lex_ok("LOOP ADD R0, R0, #1\nBRz SKIP");
    assert!(matches!(toks[0], Label(ref s) if s == "loop"));
    assert!(toks.iter().any(|k| matches!(k, Ident(s) if s == "skip")));
}

#[test]
fn blank_lines_coalesce_to_single_newline() {
    let toks = kinds("ADD R0, R0, R1\n\n\n\nAND R0, R0, R1");
    let newline_count = toks.iter().filter(|k| matches!(k, Newline)).count();
    assert_eq!(newline_count, 1);
}

#[test]
fn comment_only_line_emits_no_newline() {
    let toks = kinds("; just a comment\nADD R0, R0, R1");
    let newline_count = toks.iter().filter(|k| matches!(k, Newline)).count();
    assert_eq!(newline_count, 0);
}

#[test]
fn decimal_literal_wraps_to_16_bits() {
    assert_eq!(lex_ok("#-1"), vec![NumDecimal(-1), Eof]);
    assert_eq!(lex_ok("#65535"), vec![NumDecimal(-1), Eof]);
    assert_eq!(lex_ok("#5"), vec![NumDecimal(5), Eof]);
}

#[test]
fn hex_literal_is_two_s_complement() {
    assert_eq!(lex_ok("xFFFF"), vec![NumHex(-1), Eof]);
    assert_eq!(lex_ok("x3000"), vec![NumHex(0x3000), Eof]);
}

#[test]
fn hex_prefixed_identifier_is_not_a_literal() {
    assert_eq!(lex_ok("xray"), vec![Ident("xray".into()), Eof]);
}

#[test]
fn negative_hex_literal_lexes_as_a_single_token() {
    assert_eq!(lex_ok("x-1"), vec![NumHex(-1), Eof]);
    assert_eq!(lex_ok("x-10"), vec![NumHex(-16), Eof]);
}

#[test]
fn string_literal_has_no_escape_processing() {
    let toks = lex_ok(".STRINGZ \"a\\nb\"");
    assert_eq!(toks, vec![DirStringz, StringLiteral("a\\nb".into()), Eof]);
}

#[test]
fn br_variants_parse_flags() {
    assert_eq!(lex_ok("BR"), vec![OpBr(BrFlags::new(true, true, true)), Eof]);
    assert_eq!(lex_ok("BRnzp"), vec![OpBr(BrFlags::new(true, true, true)), Eof]);
    assert_eq!(lex_ok("BRz"), vec![OpBr(BrFlags::new(false, true, false)), Eof]);
}

#[test]
fn unknown_directive_is_an_error() {
    let result = tokenize(".NOPE");
    assert_eq!(result.errors.len(), 1);
    assert!(matches!(result.errors[0].kind, ErrorKind::UnknownDirective(_)));
}

#[test]
fn invalid_register_number_is_an_error() {
    let result = tokenize("R9");
    assert_eq!(result.errors.len(), 1);
    assert!(matches!(result.errors[0].kind, ErrorKind::InvalidRegister(9)));
}

#[test]
fn unterminated_string_is_an_error() {
    let result = tokenize("\"abc");
    assert_eq!(result.errors.len(), 1);
    assert!(matches!(result.errors[0].kind, ErrorKind::UnterminatedString));
}

#[test]
fn end_directive_stops_scanning() {
    let result = tokenize(".ORIG x3000\nHALT\n.END\nADD R0, R0, R0");
    assert!(result.saw_end);
    assert!(result.tokens.iter().all(|t| !matches!(t.kind, OpAdd)));
}
