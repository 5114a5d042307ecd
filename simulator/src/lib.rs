//! Virtual machine for the LC-3 architecture: 64 K-word memory, eight
//! general-purpose registers, and a fetch-decode-execute loop with the
//! standard trap service routines.

pub mod io;
pub mod memory;
pub mod registers;
pub mod vm;

pub use vm::{Vm, VmError};
