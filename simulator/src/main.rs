use std::fs;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use lc3_assembler::object::ObjectImage;
use lc3_vm::io::TerminalIo;
use lc3_vm::Vm;

/// Run an assembled LC-3 object file.
#[derive(Parser, Debug)]
#[command(name = "lc3-vm", version, about)]
struct Args {
    /// Path to the assembled object file.
    object: String,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let file = fs::File::open(&args.object)
        .with_context(|| format!("failed to open object file {}", args.object))?;
    let image = ObjectImage::read_from(file)
        .with_context(|| format!("failed to read object file {}", args.object))?;

    let mut vm = Vm::new();
    vm.load_image(&image);

    let mut terminal_io = TerminalIo;
    if let Err(err) = vm.run(&mut terminal_io) {
        eprintln!("{err}");
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
