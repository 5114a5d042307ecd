//! Character I/O for the `GETC`/`OUT`/`PUTS`/`IN`/`PUTSP` traps, abstracted
//! behind a trait so the VM's execution loop can be exercised with scripted
//! input in tests instead of a real terminal.

use std::io::{self, Read, Write};

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

pub trait CharIo {
    fn read_byte(&mut self) -> io::Result<u8>;
    fn write_byte(&mut self, byte: u8) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()>;
}

/// Real terminal I/O. Reads put the controlling terminal into raw mode for
/// the duration of the read and restore cooked mode immediately after,
/// regardless of whether the read succeeded.
#[derive(Default)]
pub struct TerminalIo;

impl CharIo for TerminalIo {
    fn read_byte(&mut self) -> io::Result<u8> {
        enable_raw_mode()?;
        let result = (|| {
            let mut buf = [0u8; 1];
            io::stdin().read_exact(&mut buf)?;
            Ok(buf[0])
        })();
        disable_raw_mode()?;
        result
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        io::stdout().write_all(&[byte])
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

/// Scripted I/O for tests: reads drain a fixed byte queue, writes accumulate
/// into a buffer instead of touching a real terminal.
pub struct MockIo {
    pub input: std::collections::VecDeque<u8>,
    pub output: Vec<u8>,
}

impl MockIo {
    pub fn with_input(bytes: &[u8]) -> Self {
        Self { input: bytes.iter().copied().collect(), output: Vec::new() }
    }
}

impl CharIo for MockIo {
    fn read_byte(&mut self) -> io::Result<u8> {
        self.input.pop_front().ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more scripted input"))
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.output.push(byte);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
