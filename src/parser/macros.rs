//! Declarative macros that generate parsers for repetitive instruction
//! shapes (ADD/AND's reg-or-imm form, LD/LDI/LEA/ST/STI's reg+label form,
//! LDR/STR's reg+reg+imm form, JMP/JSRR's single register, JSR's single
//! label, and the many no-operand pseudo-ops).

macro_rules! parse_reg_reg_or_imm {
    ($name:expr, $reg_variant:expr, $imm_variant:expr) => {
        |tokens: &[&$crate::lexer::token::Token]| -> Result<$crate::parser::ast::LineContent, $crate::error::AsmError> {
            use $crate::error::{AsmError, ErrorKind};
            use $crate::parser::ast::LineContent;

            if tokens.len() < 6 {
                return Err(AsmError::new(
                    ErrorKind::TooFewOperands(format!("{} requires 3 operands: {} DR, SR1, SR2/imm5", $name, $name)),
                    tokens[0].span,
                ));
            }
            $crate::parser::macros::expect_comma(tokens, 2, "Expected comma after first operand")?;
            $crate::parser::macros::expect_comma(tokens, 4, "Expected comma after second operand")?;
            let dr = $crate::parser::macros::expect_register(tokens, 1, &format!("{} first operand must be a register (R0-R7)", $name))?;
            let sr1 = $crate::parser::macros::expect_register(tokens, 3, &format!("{} second operand must be a register (R0-R7)", $name))?;

            if let Some(sr2) = $crate::parser::macros::token_to_register(tokens[5]) {
                $crate::parser::macros::ensure_no_extra(tokens, 6)?;
                Ok(LineContent::Instruction($reg_variant(dr, sr1, sr2)))
            } else if let Some(imm) = $crate::parser::macros::token_to_i32(tokens[5]) {
                if !(-16..=15).contains(&imm) {
                    return Err(AsmError::new(
                        ErrorKind::InvalidOperandType(format!(
                            "{} immediate {} is out of 5-bit signed range (-16 to 15)",
                            $name, imm
                        )),
                        tokens[5].span,
                    ));
                }
                $crate::parser::macros::ensure_no_extra(tokens, 6)?;
                Ok(LineContent::Instruction($imm_variant(dr, sr1, imm as i16)))
            } else {
                Err(AsmError::new(
                    ErrorKind::InvalidOperandType(format!("{} third operand must be a register (R0-R7) or immediate (#n)", $name)),
                    tokens[5].span,
                ))
            }
        }
    };
}

macro_rules! parse_reg_label {
    ($name:expr, $variant:expr) => {
        |tokens: &[&$crate::lexer::token::Token]| -> Result<$crate::parser::ast::LineContent, $crate::error::AsmError> {
            use $crate::error::{AsmError, ErrorKind};
            use $crate::parser::ast::LineContent;

            if tokens.len() < 4 {
                return Err(AsmError::new(
                    ErrorKind::TooFewOperands(format!("{} requires 2 operands: {} DR, LABEL", $name, $name)),
                    tokens[0].span,
                ));
            }
            $crate::parser::macros::expect_comma(tokens, 2, "Expected comma after first operand")?;
            let reg = $crate::parser::macros::expect_register(tokens, 1, &format!("{} first operand must be a register (R0-R7)", $name))?;
            let label = $crate::parser::macros::expect_label(tokens, 3, &format!("{} requires a label operand", $name))?;
            $crate::parser::macros::ensure_no_extra(tokens, 4)?;
            Ok(LineContent::Instruction($variant(reg, label)))
        }
    };
}

macro_rules! parse_reg_reg_imm {
    ($name:expr, $variant:expr) => {
        |tokens: &[&$crate::lexer::token::Token]| -> Result<$crate::parser::ast::LineContent, $crate::error::AsmError> {
            use $crate::error::{AsmError, ErrorKind};
            use $crate::parser::ast::LineContent;

            if tokens.len() < 6 {
                return Err(AsmError::new(
                    ErrorKind::TooFewOperands(format!("{} requires 3 operands: {} DR, BaseR, #offset6", $name, $name)),
                    tokens[0].span,
                ));
            }
            $crate::parser::macros::expect_comma(tokens, 2, "Expected comma after first operand")?;
            $crate::parser::macros::expect_comma(tokens, 4, "Expected comma after second operand")?;
            let r1 = $crate::parser::macros::expect_register(tokens, 1, &format!("{} first operand must be a register (R0-R7)", $name))?;
            let r2 = $crate::parser::macros::expect_register(tokens, 3, &format!("{} second operand must be a register (R0-R7)", $name))?;
            let value = $crate::parser::macros::token_to_i32(tokens[5]).ok_or_else(|| AsmError::new(
                ErrorKind::InvalidOperandType(format!("{} third operand must be an immediate (#n)", $name)),
                tokens[5].span,
            ))?;
            if !(-32..=31).contains(&value) {
                return Err(AsmError::new(
                    ErrorKind::InvalidOperandType(format!(
                        "{} offset {} is out of 6-bit signed range (-32 to 31)",
                        $name, value
                    )),
                    tokens[5].span,
                ));
            }
            $crate::parser::macros::ensure_no_extra(tokens, 6)?;
            Ok(LineContent::Instruction($variant(r1, r2, value as i16)))
        }
    };
}

macro_rules! parse_single_reg {
    ($name:expr, $variant:expr) => {
        |tokens: &[&$crate::lexer::token::Token]| -> Result<$crate::parser::ast::LineContent, $crate::error::AsmError> {
            use $crate::error::{AsmError, ErrorKind};
            use $crate::parser::ast::LineContent;

            if tokens.len() < 2 {
                return Err(AsmError::new(
                    ErrorKind::TooFewOperands(format!("{} requires 1 operand: {} BaseR", $name, $name)),
                    tokens[0].span,
                ));
            }
            let base_r = $crate::parser::macros::expect_register(tokens, 1, &format!("{} operand must be a register (R0-R7)", $name))?;
            $crate::parser::macros::ensure_no_extra(tokens, 2)?;
            Ok(LineContent::Instruction($variant(base_r)))
        }
    };
}

macro_rules! parse_single_label {
    ($name:expr, $variant:expr) => {
        |tokens: &[&$crate::lexer::token::Token]| -> Result<$crate::parser::ast::LineContent, $crate::error::AsmError> {
            use $crate::error::{AsmError, ErrorKind};
            use $crate::parser::ast::LineContent;

            if tokens.len() < 2 {
                return Err(AsmError::new(
                    ErrorKind::TooFewOperands(format!("{} requires 1 operand: {} LABEL", $name, $name)),
                    tokens[0].span,
                ));
            }
            let label = $crate::parser::macros::expect_label(tokens, 1, &format!("{} requires a label operand", $name))?;
            $crate::parser::macros::ensure_no_extra(tokens, 2)?;
            Ok(LineContent::Instruction($variant(label)))
        }
    };
}

macro_rules! parse_no_operands {
    ($name:expr, $variant:expr) => {
        |tokens: &[&$crate::lexer::token::Token]| -> Result<$crate::parser::ast::LineContent, $crate::error::AsmError> {
            use $crate::error::{AsmError, ErrorKind};
            use $crate::parser::ast::LineContent;

            if tokens.len() > 1 {
                return Err(AsmError::new(
                    ErrorKind::TooManyOperands(format!("{} takes no operands", $name)),
                    tokens[1].span,
                ));
            }
            Ok(LineContent::Instruction($variant))
        }
    };
}

pub use super::{
    ensure_no_extra, expect_comma, expect_label, expect_register, token_to_i32, token_to_register,
};
