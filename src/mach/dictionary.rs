use super::{
    align, Address, Cell, Memory, Opcode, Stack, CELLL, CODEE, EM, NAMEE, REG_TOP, RPP, SPP, TIBB,
    UPP, US,
};
use crate::error;
use crate::lang::Error;
use std::collections::HashSet;
use tracing::debug;

type Result<T> = std::result::Result<T, Error>;

/// A value to emit: a cell, a byte, a label reference or the byte-mode toggle.
pub type Operand = u32;

/// Operands at or above this are `LABEL_BASE + byte offset` into the
/// definition being compiled.
pub const LABEL_BASE: Operand = 65536;
/// Toggles byte-mode emission; occupies no space.
pub const BYTE_MODE: Operand = Operand::MAX;

pub const COMPILE_ONLY: u8 = 0x40;
pub const IMMEDIATE: u8 = 0x80;
pub const LENGTH_MASK: u8 = 0x1F;

const COMPOS: &str = r#"doLIT doLIST next ?branch branch RP! >R doVAR doUSER tmp doVOC do$ $"| ."| abort" xio COMPILE ;"#;
const IMEDDS: &str = r#".( ( \ [ [COMPILE] LITERAL RECURSE FOR BEGIN NEXT UNTIL AGAIN IF AHEAD REPEAT THEN AFT ELSE WHILE ABORT" $" ." ;"#;

/// ## User area slots
///
/// Byte offsets from `UPP`. `Context` is followed by eight vocabulary
/// cells and `Current` by one spare cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum User {
    Cp = 0,
    Np = 2,
    Sp0 = 4,
    Rp0 = 6,
    NTib = 8,
    Tib = 10,
    Csp = 12,
    Hld = 14,
    Base = 16,
    Tmp = 18,
    In = 20,
    Context = 22,
    Current = 40,
    Span = 44,
    Handler = 46,
    Eval = 48,
    Number = 50,
    Emit = 52,
    Expect = 54,
    Tap = 56,
    Echo = 58,
    Prompt = 60,
    Last = 62,
}

impl User {
    pub fn addr(self) -> Address {
        UPP + self as Address
    }
}

/// Names that get the COMPILE-ONLY or IMMEDIATE bit in their length byte.
#[derive(Debug, Clone, Default)]
pub struct Tags {
    compile_only: HashSet<String>,
    immediate: HashSet<String>,
}

impl Tags {
    pub fn kernel() -> Tags {
        Tags {
            compile_only: COMPOS.split(' ').map(String::from).collect(),
            immediate: IMEDDS.split(' ').map(String::from).collect(),
        }
    }

    pub fn compile_only<S: Into<String>>(mut self, name: S) -> Tags {
        self.compile_only.insert(name.into());
        self
    }

    pub fn immediate<S: Into<String>>(mut self, name: S) -> Tags {
        self.immediate.insert(name.into());
        self
    }

    fn flags(&self, name: &str) -> u8 {
        let mut flags = 0;
        if self.compile_only.contains(name) {
            flags |= COMPILE_ONLY;
        }
        if self.immediate.contains(name) {
            flags |= IMMEDIATE;
        }
        flags
    }
}

/// ## Word header as stored in name space
///
/// `[code][link][len|flags][name bytes]`, with `nfa` pointing at the
/// length byte. Links point at the previous `nfa`, zero ends the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub nfa: Address,
    pub link: Address,
    pub flags: u8,
    pub name: String,
    pub code: Address,
}

impl Header {
    pub fn read(mem: &Memory, nfa: Address) -> Result<Header> {
        if nfa < CODEE + 2 * CELLL || nfa >= NAMEE || nfa % CELLL != 0 {
            return Err(error!(AddressError, @nfa; "NOT A NAME FIELD"));
        }
        let tagged = mem.get8(nfa)?;
        let len = tagged & LENGTH_MASK;
        let mut name = String::with_capacity(len as usize);
        for i in 0..len as Address {
            name.push(char::from(mem.get8(nfa + 1 + i)?));
        }
        Ok(Header {
            nfa,
            link: mem.get16(nfa - CELLL)?,
            flags: tagged & !LENGTH_MASK,
            name,
            code: mem.get16(nfa - 2 * CELLL)?,
        })
    }

    /// Walks the chain from `last` to the oldest header. Links must point
    /// strictly upward, so a damaged image cannot loop forever.
    pub fn walk(mem: &Memory, last: Address) -> Result<Vec<Header>> {
        let mut headers = vec![];
        let mut ptr = last;
        while ptr != 0 {
            let header = Header::read(mem, ptr)?;
            if header.link != 0 && header.link <= ptr {
                return Err(error!(InternalError, @ptr; "CORRUPT DICTIONARY LINK"));
            }
            ptr = header.link;
            headers.push(header);
        }
        Ok(headers)
    }

    pub fn is_immediate(&self) -> bool {
        self.flags & IMMEDIATE != 0
    }

    pub fn is_compile_only(&self) -> bool {
        self.flags & COMPILE_ONLY != 0
    }
}

/// ## Dictionary under construction
///
/// Owns the memory image while it is being built. Headers grow down from
/// `NAMEE`, code grows up from `CODEE`; the two must never cross.

#[derive(Debug)]
pub struct Dictionary {
    mem: Memory,
    tags: Tags,
    link: Address,
    name: Address,
    code: Address,
    user: Address,
    byte_mode: bool,
}

impl Dictionary {
    pub fn new() -> Result<Dictionary> {
        Dictionary::with_tags(Memory::new(), Tags::kernel())
    }

    /// Prepares registers and the user area in `mem`, then registers
    /// every primitive.
    pub fn with_tags(mem: Memory, tags: Tags) -> Result<Dictionary> {
        let mut dict = Dictionary {
            mem,
            tags,
            link: 0,
            name: NAMEE,
            code: CODEE,
            user: 0,
            byte_mode: false,
        };
        dict.prepare_registers()?;
        dict.prepare_user_area()?;
        dict.primitives()?;
        Ok(dict)
    }

    fn prepare_registers(&mut self) -> Result<()> {
        for reg in (0..REG_TOP).step_by(CELLL as usize) {
            self.mem.set16(reg, 0)?;
        }
        Stack::DATA.reset(&mut self.mem)?;
        Stack::RETURN.reset(&mut self.mem)
    }

    fn prepare_user_area(&mut self) -> Result<()> {
        for offset in (0..US).step_by(CELLL as usize) {
            self.mem.set16(UPP + offset, 0)?;
        }
        self.mem.set16(User::Sp0.addr(), SPP)?;
        self.mem.set16(User::Rp0.addr(), RPP)?;
        // TIB grows up into the space above the data stack
        self.mem.set16(User::Tib.addr(), TIBB)?;
        self.mem.set16(User::Base.addr(), 10)?;
        self.sync()
    }

    fn primitives(&mut self) -> Result<()> {
        for op in Opcode::ALL.iter() {
            self.code(op.name())?;
            self.emit16(*op as Cell)?;
        }
        self.sync()
    }

    fn sync(&mut self) -> Result<()> {
        self.mem.set16(User::Cp.addr(), self.code)?;
        self.mem.set16(User::Np.addr(), self.name)?;
        self.mem.set16(User::Last.addr(), self.link)
    }

    pub fn memory(&self) -> &Memory {
        &self.mem
    }

    pub fn into_memory(self) -> Memory {
        self.mem
    }

    /// Next free code address.
    pub fn here(&self) -> Address {
        self.code
    }

    /// Lowest address used by headers.
    pub fn name_pointer(&self) -> Address {
        self.name
    }

    /// Name field of the newest header, zero when empty.
    pub fn last(&self) -> Address {
        self.link
    }

    /// Next free user area offset.
    pub fn user_offset(&self) -> Address {
        self.user
    }

    pub fn find(&self, name: &str) -> Result<Option<Header>> {
        let bytes = name.as_bytes();
        let mut ptr = self.link;
        while ptr != 0 {
            let prev = self.mem.get16(ptr - CELLL)?;
            let len = self.mem.get8(ptr)? & LENGTH_MASK;
            if len as usize == bytes.len() {
                let mut matched = true;
                for (i, b) in bytes.iter().enumerate() {
                    if self.mem.get8(ptr + 1 + i as Address)? != *b {
                        matched = false;
                        break;
                    }
                }
                if matched {
                    return Header::read(&self.mem, ptr).map(Some);
                }
            }
            if prev != 0 && prev <= ptr {
                return Err(error!(InternalError, @ptr; "CORRUPT DICTIONARY LINK"));
            }
            ptr = prev;
        }
        Ok(None)
    }

    /// Code field address of the newest word called `name`.
    pub fn lookup(&self, name: &str) -> Result<Address> {
        match self.find(name)? {
            Some(header) => Ok(header.code),
            None => Err(error!(UndefinedWord; name)),
        }
    }

    pub fn words(&self) -> Result<Vec<Header>> {
        Header::walk(&self.mem, self.link)
    }

    /// Lays down a header for `name` pointing at the current code address
    /// and makes it the newest word. Returns the name field address.
    pub fn code(&mut self, name: &str) -> Result<Address> {
        let lex = name.len();
        if lex == 0 || lex > LENGTH_MASK as usize {
            return Err(error!(SyntaxError; format!("BAD NAME LENGTH {}", name)));
        }
        debug_assert_eq!(self.code % CELLL, 0);
        let size = (lex as Address / CELLL + 3) * CELLL;
        if self.name < self.code + size {
            return Err(error!(OutOfMemory; "DICTIONARY FULL"));
        }
        self.name -= size;

        let mut ptr = self.name;
        self.mem.set16(ptr, self.code)?;
        ptr += CELLL;
        self.mem.set16(ptr, self.link)?;
        ptr += CELLL;
        self.link = ptr;

        self.mem.set8(ptr, lex as u8 | self.tags.flags(name))?;
        for b in name.bytes() {
            ptr += 1;
            self.mem.set8(ptr, b)?;
        }
        self.sync()?;
        debug!(word = name, link = self.link, code = self.code, "header");
        Ok(self.link)
    }

    fn emit8(&mut self, value: u8) -> Result<()> {
        if self.code >= self.name {
            return Err(error!(OutOfMemory; "DICTIONARY FULL"));
        }
        self.mem.set8(self.code, value)?;
        self.code += 1;
        Ok(())
    }

    fn emit16(&mut self, value: Cell) -> Result<()> {
        if self.code + CELLL > self.name {
            return Err(error!(OutOfMemory; "DICTIONARY FULL"));
        }
        self.mem.set16(self.code, value)?;
        self.code += CELLL;
        Ok(())
    }

    fn align_code(&mut self) {
        self.code = align(self.code as usize) as Address;
    }

    fn resolve(&self, start: Address, operand: Operand) -> Result<Cell> {
        if operand >= LABEL_BASE {
            let addr = start as Operand + (operand - LABEL_BASE);
            if addr >= EM as Operand || addr % CELLL as Operand != 0 {
                return Err(error!(BadLabelAddress; format!("{:#06X}", addr)));
            }
            Ok(addr as Cell)
        } else if operand > Cell::MAX as Operand {
            Err(error!(Overflow; format!("{} DOES NOT FIT A CELL", operand)))
        } else {
            Ok(operand as Cell)
        }
    }

    /// Header plus body. Returns the code field address. On error the
    /// dictionary is left as it was before the call.
    pub fn colon(&mut self, name: &str, operands: &[Operand]) -> Result<Address> {
        let (link, names, code) = (self.link, self.name, self.code);
        match self.emit_definition(name, operands) {
            Ok(start) => Ok(start),
            Err(e) => {
                self.link = link;
                self.name = names;
                self.code = code;
                self.byte_mode = false;
                self.sync()?;
                Err(e)
            }
        }
    }

    fn emit_definition(&mut self, name: &str, operands: &[Operand]) -> Result<Address> {
        self.code(name)?;
        let start = self.code;
        for &operand in operands {
            if operand == BYTE_MODE {
                self.align_code();
                self.byte_mode = !self.byte_mode;
                continue;
            }
            if self.byte_mode {
                if operand >= LABEL_BASE {
                    return Err(error!(BadLabelAddress; "LABEL IN BYTE MODE"));
                }
                if operand > u8::MAX as Operand {
                    return Err(error!(Overflow; format!("{} DOES NOT FIT A BYTE", operand)));
                }
                self.emit8(operand as u8)?;
            } else {
                let cell = self.resolve(start, operand)?;
                self.emit16(cell)?;
            }
        }
        if self.byte_mode {
            self.byte_mode = false;
            self.align_code();
        }
        self.sync()?;
        Ok(start)
    }

    /// Allocates the next user area cell. A named slot becomes a word whose
    /// code field is `doUSER` followed by the slot offset.
    pub fn user(&mut self, name: &str) -> Result<Address> {
        let offset = self.user;
        if offset + CELLL > US {
            return Err(error!(OutOfMemory; "USER AREA FULL"));
        }
        if !name.is_empty() {
            self.colon(name, &[Opcode::DoUser as Operand, offset as Operand])?;
        }
        self.user += CELLL;
        Ok(offset)
    }
}
