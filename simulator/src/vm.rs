//! Fetch-decode-execute loop and trap service dispatch.

use std::io;

use lc3_assembler::isa::{self, *};
use lc3_assembler::object::ObjectImage;
use thiserror::Error;

use crate::io::CharIo;
use crate::memory::Memory;
use crate::registers::Registers;

#[derive(Debug, Error)]
pub enum VmError {
    #[error("opcode {opcode:#06b} at x{pc:04X} is not implemented")]
    UnknownOpcode { opcode: u16, pc: u16 },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub struct Vm {
    memory: Memory,
    registers: Registers,
    running: bool,
}

impl Vm {
    pub fn new() -> Self {
        Self { memory: Memory::new(), registers: Registers::new(), running: true }
    }

    pub fn load_image(&mut self, image: &ObjectImage) {
        self.memory.load_image(image.orig_address, &image.words);
        self.registers.pc = image.orig_address;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Runs until `HALT` fires or a fault occurs.
    pub fn run(&mut self, io: &mut dyn CharIo) -> Result<(), VmError> {
        while self.running {
            self.step(io)?;
        }
        Ok(())
    }

    /// Executes exactly one fetch-decode-execute cycle.
    pub fn step(&mut self, io: &mut dyn CharIo) -> Result<(), VmError> {
        let pc_at_fetch = self.registers.pc;
        let inst = self.memory.read(self.registers.pc);
        self.registers.pc = self.registers.pc.wrapping_add(1);
        let opcode = inst >> 12;

        match opcode {
            OP_ADD => {
                let (dr, sr1) = (bits_9_11(inst), bits_6_8(inst));
                let b = self.second_operand(inst, 5);
                let value = self.registers.read(sr1).wrapping_add(b);
                self.registers.write(dr, value);
                self.registers.update_flags(value);
            }
            OP_AND => {
                let (dr, sr1) = (bits_9_11(inst), bits_6_8(inst));
                let b = self.second_operand(inst, 5);
                let value = self.registers.read(sr1) & b;
                self.registers.write(dr, value);
                self.registers.update_flags(value);
            }
            OP_NOT => {
                let (dr, sr) = (bits_9_11(inst), bits_6_8(inst));
                let value = !self.registers.read(sr);
                self.registers.write(dr, value);
                self.registers.update_flags(value);
            }
            OP_BR => {
                let nzp = bits_9_11(inst);
                if nzp & (self.registers.psr & 0b111) != 0 {
                    self.registers.pc = self.registers.pc.wrapping_add(isa::sext(inst & 0x1FF, 9));
                }
            }
            OP_JMP => {
                let base_r = bits_6_8(inst);
                self.registers.pc = self.registers.read(base_r);
            }
            OP_JSR => {
                let temp = self.registers.pc;
                if inst & (1 << 11) != 0 {
                    self.registers.pc = self.registers.pc.wrapping_add(isa::sext(inst & 0x7FF, 11));
                } else {
                    let base_r = bits_6_8(inst);
                    self.registers.pc = self.registers.read(base_r);
                }
                self.registers.write(7, temp);
            }
            OP_LD => {
                let dr = bits_9_11(inst);
                let addr = self.registers.pc.wrapping_add(isa::sext(inst & 0x1FF, 9));
                let value = self.memory.read(addr);
                self.registers.write(dr, value);
                self.registers.update_flags(value);
            }
            OP_LDI => {
                let dr = bits_9_11(inst);
                let addr = self.memory.read(self.registers.pc.wrapping_add(isa::sext(inst & 0x1FF, 9)));
                let value = self.memory.read(addr);
                self.registers.write(dr, value);
                self.registers.update_flags(value);
            }
            OP_LDR => {
                let (dr, base_r) = (bits_9_11(inst), bits_6_8(inst));
                let addr = self.registers.read(base_r).wrapping_add(isa::sext(inst & 0x3F, 6));
                let value = self.memory.read(addr);
                self.registers.write(dr, value);
                self.registers.update_flags(value);
            }
            OP_LEA => {
                let dr = bits_9_11(inst);
                let addr = self.registers.pc.wrapping_add(isa::sext(inst & 0x1FF, 9));
                self.registers.write(dr, addr);
            }
            OP_ST => {
                let sr = bits_9_11(inst);
                let addr = self.registers.pc.wrapping_add(isa::sext(inst & 0x1FF, 9));
                self.memory.write(addr, self.registers.read(sr));
            }
            OP_STI => {
                let sr = bits_9_11(inst);
                let addr = self.memory.read(self.registers.pc.wrapping_add(isa::sext(inst & 0x1FF, 9)));
                self.memory.write(addr, self.registers.read(sr));
            }
            OP_STR => {
                let (sr, base_r) = (bits_9_11(inst), bits_6_8(inst));
                let addr = self.registers.read(base_r).wrapping_add(isa::sext(inst & 0x3F, 6));
                self.memory.write(addr, self.registers.read(sr));
            }
            OP_RTI => {
                let r6 = self.registers.read(6);
                self.registers.pc = self.memory.read(r6);
                self.registers.psr = self.memory.read(r6.wrapping_add(1));
                self.registers.write(6, r6.wrapping_add(2));
            }
            OP_TRAP => self.trap(inst & 0xFF, io)?,
            _ => return Err(VmError::UnknownOpcode { opcode, pc: pc_at_fetch }),
        }

        Ok(())
    }

    /// ADD/AND's second operand: an immediate if bit 5 is set, else a register.
    fn second_operand(&self, inst: u16, imm_bits: u8) -> u16 {
        if inst & (1 << 5) != 0 {
            isa::sext(inst & ((1 << imm_bits) - 1), imm_bits)
        } else {
            self.registers.read((inst & 0x7) as u8)
        }
    }

    fn trap(&mut self, vector: u16, io: &mut dyn CharIo) -> Result<(), VmError> {
        match vector {
            TRAP_GETC => {
                let byte = io.read_byte()?;
                self.registers.write(0, byte as u16);
            }
            TRAP_OUT => {
                io.write_byte(self.registers.read(0) as u8)?;
                io.flush()?;
            }
            TRAP_PUTS => {
                let mut addr = self.registers.read(0);
                loop {
                    let word = self.memory.read(addr);
                    if word == 0 {
                        break;
                    }
                    io.write_byte(word as u8)?;
                    addr = addr.wrapping_add(1);
                }
                io.flush()?;
            }
            TRAP_IN => {
                let byte = io.read_byte()?;
                io.write_byte(byte)?;
                io.flush()?;
                self.registers.write(0, byte as u16);
            }
            TRAP_PUTSP => {
                let mut addr = self.registers.read(0);
                loop {
                    let word = self.memory.read(addr);
                    if word == 0 {
                        break;
                    }
                    io.write_byte((word & 0xFF) as u8)?;
                    let hi = (word >> 8) as u8;
                    if hi != 0 {
                        io.write_byte(hi)?;
                    }
                    addr = addr.wrapping_add(1);
                }
                io.flush()?;
            }
            TRAP_HALT => self.running = false,
            _ => return Err(VmError::UnknownOpcode { opcode: OP_TRAP, pc: self.registers.pc.wrapping_sub(1) }),
        }
        Ok(())
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

fn bits_9_11(inst: u16) -> u8 {
    ((inst >> 9) & 0x7) as u8
}

fn bits_6_8(inst: u16) -> u8 {
    ((inst >> 6) & 0x7) as u8
}
