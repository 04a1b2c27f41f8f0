/*!
## Rust Machine Module

This Rust module is the dictionary compiler and the indirect-threaded
virtual machine for the kernel.

All code, data, stacks and registers share one 16 KiB byte-addressable
memory. Cells are 16 bits, little-endian.

*/

pub type Cell = u16;
pub type Address = u16;

/// Bytes per cell.
pub const CELLL: Address = 2;
/// Total addressable memory.
pub const EM: Address = 0x4000;

// Memory-mapped registers.
pub const PC: Address = 0;
pub const IP: Address = CELLL;
pub const SP: Address = 2 * CELLL;
pub const RP: Address = 3 * CELLL;
pub const WP: Address = 4 * CELLL;
/// First address past the register cells.
pub const REG_TOP: Address = 5 * CELLL;

/// Depth of each stack in bytes.
pub const RTS: Address = 64 * CELLL;
/// Return stack floor.
pub const RPP: Address = EM - 8 * CELLL;
/// Terminal input buffer.
pub const TIBB: Address = RPP - RTS;
/// Data stack floor.
pub const SPP: Address = TIBB - 8 * CELLL;

pub const COLDD: Address = 0x100;
/// User area size in bytes.
pub const US: Address = 64 * CELLL;
/// User area base.
pub const UPP: Address = EM - 256 * CELLL;
/// Top of name space; headers grow down from here.
pub const NAMEE: Address = UPP - 8 * CELLL;
/// Bottom of code space; code grows up from here.
pub const CODEE: Address = COLDD + US;

pub const TRUE: Cell = 0xFFFF;
pub const FALSE: Cell = 0;

pub fn align(n: usize) -> usize {
    let offset = n % CELLL as usize;
    if offset == 0 {
        n
    } else {
        n + (CELLL as usize - offset)
    }
}

mod compile;
mod dictionary;
pub mod image;
mod io;
mod memory;
mod opcode;
mod runtime;
mod stack;

pub use compile::{build, Compiler, DEFAULT_ENTRY};
pub use dictionary::{Dictionary, Header, Operand, Tags, User, BYTE_MODE, LABEL_BASE};
pub use io::{Buffer, Console, Io};
pub use memory::Memory;
pub use opcode::{Opcode, PRIM_COUNT};
pub use runtime::{Event, Runtime, State};
pub use stack::Stack;

#[cfg(test)]
mod tests;
