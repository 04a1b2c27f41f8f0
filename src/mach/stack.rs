use super::{Address, Cell, Memory, CELLL, RP, RPP, RTS, SP, SPP};
use crate::error;
use crate::lang::Error;

type Result<T> = std::result::Result<T, Error>;

/// ## Stack enforced and size limited memory region
///
/// A stack is a register cell holding a pointer into `Memory` plus the
/// floor it grows down from. The data and return stacks share this one
/// implementation and differ only in register, floor and messages.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stack {
    register: Address,
    floor: Address,
    depth: Address,
    name: &'static str,
}

impl Stack {
    pub const DATA: Stack = Stack::new(SP, SPP, RTS, "DATA STACK");
    pub const RETURN: Stack = Stack::new(RP, RPP, RTS, "RETURN STACK");

    pub const fn new(register: Address, floor: Address, depth: Address, name: &'static str) -> Stack {
        Stack {
            register,
            floor,
            depth,
            name,
        }
    }

    fn pointer(&self, mem: &Memory) -> Result<Address> {
        mem.get16(self.register)
    }

    pub fn reset(&self, mem: &mut Memory) -> Result<()> {
        mem.set16(self.register, self.floor)
    }

    /// Number of cells on the stack. Zero when the pointer sits at or
    /// above the floor.
    pub fn len(&self, mem: &Memory) -> Result<usize> {
        let p = self.pointer(mem)?;
        Ok((self.floor.saturating_sub(p) / CELLL) as usize)
    }

    pub fn is_empty(&self, mem: &Memory) -> Result<bool> {
        Ok(self.len(mem)? == 0)
    }

    pub fn push(&self, mem: &mut Memory, value: Cell) -> Result<()> {
        let p = self.pointer(mem)?.wrapping_sub(CELLL);
        if self.floor as i32 - p as i32 > self.depth as i32 {
            return Err(error!(StackOverflow, @p; self.name));
        }
        mem.set16(self.register, p)?;
        mem.set16(p, value)
    }

    pub fn pop(&self, mem: &mut Memory) -> Result<Cell> {
        let p = self.pointer(mem)?;
        if p >= self.floor {
            return Err(error!(StackUnderflow, @p; self.name));
        }
        let value = mem.get16(p)?;
        mem.set16(self.register, p.wrapping_add(CELLL))?;
        Ok(value)
    }

    pub fn pop_2(&self, mem: &mut Memory) -> Result<(Cell, Cell)> {
        let two = self.pop(mem)?;
        let one = self.pop(mem)?;
        Ok((one, two))
    }

    /// Reads the cell `n` places below the top without popping.
    pub fn peek(&self, mem: &Memory, n: Address) -> Result<Cell> {
        let p = self.pointer(mem)?;
        let addr = p.wrapping_add(n * CELLL);
        if p > self.floor || addr >= self.floor {
            return Err(error!(StackUnderflow, @p; self.name));
        }
        mem.get16(addr)
    }

    /// Overwrites the top cell in place.
    pub fn replace(&self, mem: &mut Memory, value: Cell) -> Result<()> {
        let p = self.pointer(mem)?;
        if p >= self.floor {
            return Err(error!(StackUnderflow, @p; self.name));
        }
        mem.set16(p, value)
    }
}
