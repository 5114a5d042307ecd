//! Tokenizes LC-3 assembly source code into a stream of tokens.
//!
//! ## Features
//!
//! - **Numeric literals**: decimal (`#10`, `#-5`) and hexadecimal (`x3000`,
//!   `x-1`, `xFFFF`) notation, both wrapped to 16-bit two's complement.
//! - **String literals**: no escape processing — the content between the
//!   quotes is taken verbatim.
//! - **Comments**: `;` to end of line.
//! - **Branch variants**: `BR`, `BRn`, `BRz`, `BRp`, `BRnz`, ..., `BRnzp`.
//! - **Case folding**: the whole source is lowercased before scanning, so
//!   keywords and labels are case-insensitive.
//! - **`.END` termination**: `.end` is consumed and causes scanning to stop;
//!   it never produces a token of its own. `LexResult::saw_end` records
//!   whether it was seen.

pub mod cursor;
pub mod token;

#[cfg(test)]
mod tests;

use crate::error::{AsmError, ErrorKind, Span};
use cursor::Cursor;
use token::{BrFlags, Token, TokenKind};

pub struct LexResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<AsmError>,
    /// Whether a `.end` directive was encountered (and scanning stopped).
    pub saw_end: bool,
}

/// Interpret a value already masked to `bits` bits as a 16-bit two's
/// complement signed integer.
#[inline]
fn u16_to_twos_complement(v: u32) -> i32 {
    if v > 0x7FFF {
        (v as i32) - 0x10000
    } else {
        v as i32
    }
}

enum LexOutcome {
    Token(Token),
    Skip,
    End,
}

#[must_use]
pub fn tokenize(source: &str) -> LexResult {
    let lowered = source.to_ascii_lowercase();
    let mut cursor = Cursor::new(&lowered);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut at_line_start = true;
    let mut pending_newline = false;
    let mut saw_end = false;

    loop {
        if cursor.is_at_end() {
            break;
        }
        match lex_token(&mut cursor) {
            Ok(LexOutcome::End) => {
                saw_end = true;
                break;
            }
            Ok(LexOutcome::Skip) => {}
            Ok(LexOutcome::Token(mut token)) => match token.kind {
                TokenKind::Newline => {
                    if pending_newline {
                        tokens.push(token);
                        pending_newline = false;
                        at_line_start = true;
                    }
                }
                TokenKind::Comment(_) => {
                    tokens.push(token);
                }
                _ => {
                    if let TokenKind::Ident(ref name) = token.kind {
                        if at_line_start {
                            token.kind = TokenKind::Label(name.clone());
                        }
                    }
                    at_line_start = false;
                    pending_newline = true;
                    tokens.push(token);
                }
            },
            Err(err) => {
                errors.push(err);
                at_line_start = false;
                pending_newline = true;
            }
        }
    }

    let (b, l, c) = cursor.current_pos();
    tokens.push(Token {
        kind: TokenKind::Eof,
        lexeme: String::new(),
        span: Span { start: b, end: b, line: l, col: c },
    });

    LexResult { tokens, errors, saw_end }
}

fn lex_token(cursor: &mut Cursor) -> Result<LexOutcome, AsmError> {
    while matches!(cursor.peek(), Some(' ' | '\t')) {
        cursor.advance();
    }

    if cursor.is_at_end() {
        return Ok(LexOutcome::Skip);
    }

    let (sb, sl, sc) = cursor.current_pos();
    let ch = cursor.peek().unwrap();

    match ch {
        '\n' | '\r' => lex_newline(cursor, sb, sl, sc),
        ';' => lex_comment(cursor, sb, sl, sc),
        ',' => {
            cursor.advance();
            Ok(LexOutcome::Token(Token {
                kind: TokenKind::Comma,
                lexeme: ",".into(),
                span: cursor.make_span(sb, sl, sc),
            }))
        }
        '"' => lex_string(cursor, sb, sl, sc),
        '#' => lex_decimal(cursor, sb, sl, sc),
        '.' => lex_directive(cursor, sb, sl, sc),
        c if c.is_ascii_alphabetic() || c == '_' => lex_word(cursor, sb, sl, sc),
        _ => {
            cursor.advance();
            Err(AsmError::new(
                ErrorKind::UnexpectedCharacter(ch),
                cursor.make_span(sb, sl, sc),
            ))
        }
    }
}

fn lex_newline(cursor: &mut Cursor, sb: usize, sl: usize, sc: usize) -> Result<LexOutcome, AsmError> {
    if cursor.peek() == Some('\r') {
        cursor.advance();
        if cursor.peek() == Some('\n') {
            cursor.advance();
        }
    } else {
        cursor.advance();
    }

    Ok(LexOutcome::Token(Token {
        kind: TokenKind::Newline,
        lexeme: "\n".into(),
        span: cursor.make_span(sb, sl, sc),
    }))
}

fn lex_comment(cursor: &mut Cursor, sb: usize, sl: usize, sc: usize) -> Result<LexOutcome, AsmError> {
    cursor.advance();
    let mut text = String::new();
    while let Some(ch) = cursor.peek() {
        if ch == '\n' || ch == '\r' {
            break;
        }
        cursor.advance();
        text.push(ch);
    }

    Ok(LexOutcome::Token(Token {
        kind: TokenKind::Comment(text.clone()),
        lexeme: format!(";{}", text),
        span: cursor.make_span(sb, sl, sc),
    }))
}

fn lex_string(cursor: &mut Cursor, sb: usize, sl: usize, sc: usize) -> Result<LexOutcome, AsmError> {
    cursor.advance();
    let mut content = String::new();

    loop {
        if cursor.is_at_end() {
            return Err(AsmError::new(ErrorKind::UnterminatedString, cursor.make_span(sb, sl, sc)));
        }
        let ch = cursor.peek().unwrap();
        if ch == '\n' || ch == '\r' {
            return Err(AsmError::new(ErrorKind::UnterminatedString, cursor.make_span(sb, sl, sc)));
        }
        if ch == '"' {
            cursor.advance();
            break;
        }
        content.push(cursor.advance().unwrap());
    }

    Ok(LexOutcome::Token(Token {
        kind: TokenKind::StringLiteral(content.clone()),
        lexeme: format!("\"{}\"", content),
        span: cursor.make_span(sb, sl, sc),
    }))
}

fn lex_decimal(cursor: &mut Cursor, sb: usize, sl: usize, sc: usize) -> Result<LexOutcome, AsmError> {
    cursor.advance();
    let mut raw = String::from("#");
    let mut negative = false;

    if cursor.peek() == Some('-') {
        cursor.advance();
        raw.push('-');
        negative = true;
    }

    let mut digits = String::new();
    while matches!(cursor.peek(), Some(c) if c.is_ascii_digit()) {
        let ch = cursor.advance().unwrap();
        digits.push(ch);
        raw.push(ch);
    }

    if digits.is_empty() {
        return Err(AsmError::new(ErrorKind::EmptyDecimalLiteral, cursor.make_span(sb, sl, sc)));
    }

    let magnitude: i64 = digits.parse().map_err(|_| {
        AsmError::new(ErrorKind::InvalidDecimalLiteral(raw.clone()), cursor.make_span(sb, sl, sc))
    })?;
    let signed = if negative { -magnitude } else { magnitude };
    let wrapped = (signed as i64).rem_euclid(0x10000) as u32;
    let value = u16_to_twos_complement(wrapped);

    Ok(LexOutcome::Token(Token {
        kind: TokenKind::NumDecimal(value),
        lexeme: raw,
        span: cursor.make_span(sb, sl, sc),
    }))
}

fn lex_directive(cursor: &mut Cursor, sb: usize, sl: usize, sc: usize) -> Result<LexOutcome, AsmError> {
    cursor.advance();
    let mut raw = String::from(".");
    let mut word = String::new();

    while matches!(cursor.peek(), Some(c) if c.is_ascii_alphabetic()) {
        let ch = cursor.advance().unwrap();
        word.push(ch);
        raw.push(ch);
    }

    let kind = match word.as_str() {
        "orig" => TokenKind::DirOrig,
        "fill" => TokenKind::DirFill,
        "blkw" => TokenKind::DirBlkw,
        "stringz" => TokenKind::DirStringz,
        "end" => return Ok(LexOutcome::End),
        _ => return Err(AsmError::new(ErrorKind::UnknownDirective(word), cursor.make_span(sb, sl, sc))),
    };

    Ok(LexOutcome::Token(Token { kind, lexeme: raw, span: cursor.make_span(sb, sl, sc) }))
}

fn lex_word(cursor: &mut Cursor, sb: usize, sl: usize, sc: usize) -> Result<LexOutcome, AsmError> {
    let mut word = String::new();
    while matches!(cursor.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
        word.push(cursor.advance().unwrap());
    }

    if word.len() == 2 && word.starts_with('r') {
        let digit = word.chars().nth(1).unwrap();
        if let Some(reg) = digit.to_digit(10) {
            if reg <= 7 {
                return Ok(LexOutcome::Token(Token {
                    kind: TokenKind::Register(reg as u8),
                    lexeme: word,
                    span: cursor.make_span(sb, sl, sc),
                }));
            }
            return Err(AsmError::new(
                ErrorKind::InvalidRegister(reg as u8),
                cursor.make_span(sb, sl, sc),
            ));
        }
    }

    let kind = match word.as_str() {
        "add" => TokenKind::OpAdd,
        "and" => TokenKind::OpAnd,
        "not" => TokenKind::OpNot,
        "ld" => TokenKind::OpLd,
        "ldi" => TokenKind::OpLdi,
        "ldr" => TokenKind::OpLdr,
        "lea" => TokenKind::OpLea,
        "st" => TokenKind::OpSt,
        "sti" => TokenKind::OpSti,
        "str" => TokenKind::OpStr,
        "jmp" => TokenKind::OpJmp,
        "jsr" => TokenKind::OpJsr,
        "jsrr" => TokenKind::OpJsrr,
        "trap" => TokenKind::OpTrap,
        "rti" => TokenKind::OpRti,
        "ret" => TokenKind::PseudoRet,
        "getc" => TokenKind::PseudoGetc,
        "out" => TokenKind::PseudoOut,
        "puts" => TokenKind::PseudoPuts,
        "in" => TokenKind::PseudoIn,
        "putsp" => TokenKind::PseudoPutsp,
        "halt" => TokenKind::PseudoHalt,
        _ => {
            if let Some(flags) = BrFlags::parse(&word) {
                return Ok(LexOutcome::Token(Token {
                    kind: TokenKind::OpBr(flags),
                    lexeme: word,
                    span: cursor.make_span(sb, sl, sc),
                }));
            }

            if word == "x" && cursor.peek() == Some('-') && cursor.peek_at(1).is_some_and(|c| c.is_ascii_hexdigit()) {
                cursor.advance();
                let mut digits = String::new();
                while matches!(cursor.peek(), Some(c) if c.is_ascii_hexdigit()) {
                    digits.push(cursor.advance().unwrap());
                }
                return lex_hex(&digits, true, cursor, sb, sl, sc);
            }

            if word.starts_with('x') && word.len() > 1 && word[1..].chars().all(|c| c.is_ascii_hexdigit()) {
                return lex_hex(&word[1..], false, cursor, sb, sl, sc);
            }

            TokenKind::Ident(word.clone())
        }
    };

    Ok(LexOutcome::Token(Token { kind, lexeme: word, span: cursor.make_span(sb, sl, sc) }))
}

/// Hex literals are unsigned magnitudes wrapped to 16-bit two's complement
/// (e.g. `xFFFF` reads as -1). `x-1` is also accepted: the `-` negates the
/// magnitude before the same wrap is applied, mirroring `lex_decimal`'s
/// handling of `#-n`.
fn lex_hex(digits: &str, negative: bool, cursor: &Cursor, sb: usize, sl: usize, sc: usize) -> Result<LexOutcome, AsmError> {
    let lexeme = if negative { format!("x-{digits}") } else { format!("x{digits}") };
    match u32::from_str_radix(digits, 16) {
        Ok(v) if v <= 0xFFFF => {
            let magnitude = v as i64;
            let signed = if negative { -magnitude } else { magnitude };
            let wrapped = signed.rem_euclid(0x10000) as u32;
            Ok(LexOutcome::Token(Token {
                kind: TokenKind::NumHex(u16_to_twos_complement(wrapped)),
                lexeme,
                span: cursor.make_span(sb, sl, sc),
            }))
        }
        Ok(_) => Err(AsmError::new(ErrorKind::HexLiteralOutOfRange(lexeme), cursor.make_span(sb, sl, sc))),
        Err(_) => Err(AsmError::new(ErrorKind::InvalidHexLiteral(lexeme), cursor.make_span(sb, sl, sc))),
    }
}
