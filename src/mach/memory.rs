use super::{Address, Cell, CELLL, EM, IP, PC, RP, SP, WP};
use crate::error;
use crate::lang::Error;
use std::io::{Read, Write};

type Result<T> = std::result::Result<T, Error>;

/// ## Unified machine memory
///
/// One fixed buffer of `EM` bytes. Registers live at the low addresses
/// and are plain cells; the named accessors are aliases for `get16`/`set16`.

#[derive(Clone, PartialEq, Eq)]
pub struct Memory {
    bytes: Box<[u8]>,
}

impl Default for Memory {
    fn default() -> Memory {
        Memory::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Memory {{ PC: {:04X}, IP: {:04X}, SP: {:04X}, RP: {:04X}, WP: {:04X} }}",
            self.pc(),
            self.ip(),
            self.sp(),
            self.rp(),
            self.wp()
        )
    }
}

impl Memory {
    pub fn new() -> Memory {
        Memory {
            bytes: vec![0; EM as usize].into_boxed_slice(),
        }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Memory> {
        if bytes.len() != EM as usize {
            return Err(error!(ImageMismatch; format!(
                "EXPECTED {} BYTES, FOUND {}",
                EM,
                bytes.len()
            )));
        }
        Ok(Memory {
            bytes: bytes.into_boxed_slice(),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<Memory> {
        let mut bytes = Vec::with_capacity(EM as usize);
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| error!(InternalError; e.to_string()))?;
        Memory::from_bytes(bytes)
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer
            .write_all(&self.bytes)
            .map_err(|e| error!(InternalError; e.to_string()))
    }

    fn index(&self, addr: Address, width: Address) -> Result<usize> {
        let end = addr as usize + width as usize;
        if end > self.bytes.len() {
            Err(error!(AddressError, @addr; "OUT OF RANGE"))
        } else {
            Ok(addr as usize)
        }
    }

    pub fn get8(&self, addr: Address) -> Result<u8> {
        let i = self.index(addr, 1)?;
        Ok(self.bytes[i])
    }

    pub fn set8(&mut self, addr: Address, value: u8) -> Result<()> {
        let i = self.index(addr, 1)?;
        self.bytes[i] = value;
        Ok(())
    }

    pub fn get16(&self, addr: Address) -> Result<Cell> {
        if addr % CELLL != 0 {
            return Err(error!(AddressError, @addr; "UNALIGNED CELL"));
        }
        let i = self.index(addr, CELLL)?;
        Ok(Cell::from_le_bytes([self.bytes[i], self.bytes[i + 1]]))
    }

    pub fn set16(&mut self, addr: Address, value: Cell) -> Result<()> {
        if addr % CELLL != 0 {
            return Err(error!(AddressError, @addr; "UNALIGNED CELL"));
        }
        let i = self.index(addr, CELLL)?;
        self.bytes[i..i + 2].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    fn register(&self, addr: Address) -> Cell {
        let i = addr as usize;
        Cell::from_le_bytes([self.bytes[i], self.bytes[i + 1]])
    }

    fn set_register(&mut self, addr: Address, value: Cell) {
        let i = addr as usize;
        self.bytes[i..i + 2].copy_from_slice(&value.to_le_bytes());
    }

    pub fn pc(&self) -> Address {
        self.register(PC)
    }
    pub fn set_pc(&mut self, value: Address) {
        self.set_register(PC, value)
    }
    pub fn ip(&self) -> Address {
        self.register(IP)
    }
    pub fn set_ip(&mut self, value: Address) {
        self.set_register(IP, value)
    }
    pub fn sp(&self) -> Address {
        self.register(SP)
    }
    pub fn set_sp(&mut self, value: Address) {
        self.set_register(SP, value)
    }
    pub fn rp(&self) -> Address {
        self.register(RP)
    }
    pub fn set_rp(&mut self, value: Address) {
        self.set_register(RP, value)
    }
    pub fn wp(&self) -> Address {
        self.register(WP)
    }
    pub fn set_wp(&mut self, value: Address) {
        self.set_register(WP, value)
    }
}
