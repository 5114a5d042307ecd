//! LC-3 object file format: binary, little-endian 16-bit words. Word 0 is
//! the load address; every subsequent word is placed at consecutive
//! addresses starting there. No header, section table, or symbols.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

/// An assembled program ready to be written to (or as read from) an object
/// file: a load address plus the words that follow it.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectImage {
    pub orig_address: u16,
    pub words: Vec<u16>,
}

impl ObjectImage {
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_u16::<LittleEndian>(self.orig_address)?;
        for &word in &self.words {
            writer.write_u16::<LittleEndian>(word)?;
        }
        Ok(())
    }

    pub fn read_from<R: Read>(mut reader: R) -> io::Result<Self> {
        let orig_address = reader.read_u16::<LittleEndian>()?;
        let mut words = Vec::new();
        loop {
            match reader.read_u16::<LittleEndian>() {
                Ok(word) => words.push(word),
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e),
            }
        }
        Ok(Self { orig_address, words })
    }
}
