use std::fs;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use lc3_assembler::encoder::encode;
use lc3_assembler::first_pass::first_pass;
use lc3_assembler::lexer::tokenize;
use lc3_assembler::object::ObjectImage;
use lc3_assembler::parser::parse_lines;

/// Assemble LC-3 source into a binary object file.
#[derive(Parser, Debug)]
#[command(name = "lc3-assembler", version, about)]
struct Args {
    /// Path to the .asm source file.
    source: String,
    /// Path to write the assembled object file to.
    output: String,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let source = fs::read_to_string(&args.source)
        .with_context(|| format!("failed to read source file {}", args.source))?;

    let mut had_errors = false;

    let lexed = tokenize(&source);
    for err in &lexed.errors {
        eprintln!("{err}");
    }
    had_errors |= !lexed.errors.is_empty();

    let parsed = parse_lines(&lexed.tokens);
    for err in &parsed.errors {
        eprintln!("{err}");
    }
    had_errors |= !parsed.errors.is_empty();

    let first = first_pass(parsed.lines, lexed.saw_end);
    for err in &first.errors {
        eprintln!("{err}");
    }
    had_errors |= !first.errors.is_empty();

    let orig_address = first.orig_address;
    let encoded = encode(&first);
    for err in &encoded.errors {
        eprintln!("{err}");
    }
    had_errors |= !encoded.errors.is_empty();

    if had_errors {
        return Ok(ExitCode::FAILURE);
    }

    let image = ObjectImage { orig_address, words: encoded.machine_code };
    let output_file = fs::File::create(&args.output)
        .with_context(|| format!("failed to create output file {}", args.output))?;
    image
        .write_to(output_file)
        .with_context(|| format!("failed to write object file {}", args.output))?;

    Ok(ExitCode::SUCCESS)
}
