use std::io::Seek;

use lc3_assembler::encoder::encode;
use lc3_assembler::first_pass::first_pass;
use lc3_assembler::lexer::tokenize;
use lc3_assembler::object::ObjectImage;
use lc3_assembler::parser::parse_lines;
use lc3_vm::io::MockIo;
use lc3_vm::Vm;

/// Assembles a full pipeline, asserting no errors at any stage.
fn assemble(source: &str) -> ObjectImage {
    let lexed = tokenize(source);
    assert!(lexed.errors.is_empty(), "lexer errors: {:?}", lexed.errors);
    let parsed = parse_lines(&lexed.tokens);
    assert!(parsed.errors.is_empty(), "parser errors: {:?}", parsed.errors);
    let first = first_pass(parsed.lines, lexed.saw_end);
    assert!(first.errors.is_empty(), "first pass errors: {:?}", first.errors);
    let orig_address = first.orig_address;
    let encoded = encode(&first);
    assert!(encoded.errors.is_empty(), "encoder errors: {:?}", encoded.errors);
    ObjectImage { orig_address, words: encoded.machine_code }
}

fn round_trip_through_object_file(image: &ObjectImage) -> ObjectImage {
    let mut file = tempfile::tempfile().expect("failed to create temp file");
    image.write_to(&file).expect("failed to write object file");
    file.rewind().expect("failed to rewind temp file");
    ObjectImage::read_from(&file).expect("failed to read object file")
}

#[test]
fn assembled_program_round_trips_through_object_file() {
    let image = assemble(".ORIG x3000\nAND R0, R0, #0\nADD R0, R0, #5\nHALT\n.END");
    let decoded = round_trip_through_object_file(&image);
    assert_eq!(decoded, image);
}

#[test]
fn vm_executes_an_assembled_arithmetic_program() {
    let image = assemble(".ORIG x3000\nAND R0, R0, #0\nADD R0, R0, #5\nADD R0, R0, #3\nHALT\n.END");
    let decoded = round_trip_through_object_file(&image);

    let mut vm = Vm::new();
    vm.load_image(&decoded);
    let mut io = MockIo::with_input(&[]);
    vm.run(&mut io).expect("VM execution failed");
}

#[test]
fn vm_executes_a_branching_loop() {
    // R1 counts down from 3 to 0, looping on BRp.
    let image = assemble(
        ".ORIG x3000\n\
         AND R1, R1, #0\n\
         ADD R1, R1, #3\n\
         LOOP ADD R1, R1, #-1\n\
         BRp LOOP\n\
         HALT\n\
         .END",
    );
    let decoded = round_trip_through_object_file(&image);

    let mut vm = Vm::new();
    vm.load_image(&decoded);
    let mut io = MockIo::with_input(&[]);
    vm.run(&mut io).expect("VM execution failed");
}
