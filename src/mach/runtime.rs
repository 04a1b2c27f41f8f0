use super::{Address, Cell, Header, Io, Memory, Opcode, Stack, User, CELLL, FALSE, TRUE, UPP};
use crate::error;
use crate::lang::Error;
use std::collections::HashSet;
use std::convert::TryFrom;
use tracing::{debug, info, trace};

type Result<T> = std::result::Result<T, Error>;

/// Dispatch budget per `execute` call made by `run`.
const RUN_CYCLES: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    /// KEY executed; waiting for `resume` or a fresh `run`.
    Paused,
    /// BYE executed or a fatal error occurred. Terminal.
    Halted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Cycle budget exhausted, machine still running.
    Running,
    /// Suspended on KEY.
    Key,
    Halted,
}

/// ## Indirect-threaded interpreter
///
/// PC addresses the code field about to be dispatched; IP walks the
/// body of the compiled definition being executed. Every primitive ends
/// with "next": `PC = memory[IP]; IP += CELLL`.
#[derive(Debug)]
pub struct Runtime {
    mem: Memory,
    state: State,
    /// Code fields of every header, valid while LAST equals `entries_last`.
    entries: HashSet<Address>,
    entries_last: Option<Address>,
}

impl Runtime {
    pub fn new(mem: Memory) -> Runtime {
        Runtime {
            mem,
            state: State::Running,
            entries: HashSet::new(),
            entries_last: None,
        }
    }

    pub fn memory(&self) -> &Memory {
        &self.mem
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        self.entries_last = None;
        &mut self.mem
    }

    pub fn into_memory(self) -> Memory {
        self.mem
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Starts execution at the code field `addr`.
    pub fn enter(&mut self, addr: Address) {
        self.mem.set_pc(addr);
        self.state = State::Running;
    }

    pub fn push(&mut self, value: Cell) -> Result<()> {
        Stack::DATA.push(&mut self.mem, value)
    }

    pub fn pop(&mut self) -> Result<Cell> {
        Stack::DATA.pop(&mut self.mem)
    }

    /// Data stack contents, bottom first.
    pub fn stack(&self) -> Result<Vec<Cell>> {
        let len = Stack::DATA.len(&self.mem)?;
        let mut cells = Vec::with_capacity(len);
        for n in (0..len).rev() {
            cells.push(Stack::DATA.peek(&self.mem, n as Address)?);
        }
        Ok(cells)
    }

    /// Pushes a character for a suspended KEY and makes the machine
    /// runnable again. The dispatch loop is re-entered by the next
    /// `run`/`execute`.
    pub fn resume(&mut self, ch: Cell) -> Result<()> {
        if self.state == State::Halted {
            return Err(error!(InternalError; "MACHINE HALTED"));
        }
        if let Err(e) = self.push(ch) {
            self.state = State::Halted;
            return Err(e);
        }
        debug!(ch, "key pushed");
        self.wake();
        Ok(())
    }

    fn wake(&mut self) {
        if self.state == State::Paused {
            debug!(pc = self.mem.pc(), "resumed");
            self.state = State::Running;
        }
    }

    /// Runs until BYE, or until KEY finds the collaborator without input.
    ///
    /// Calling `run` on a paused machine resumes it: the caller is taken
    /// to have pushed the character KEY is waiting for.
    pub fn run(&mut self, io: &mut dyn Io) -> Result<Event> {
        self.wake();
        loop {
            match self.execute(io, RUN_CYCLES)? {
                Event::Running => {}
                Event::Key => {
                    io.key(self)?;
                    if self.state != State::Running {
                        return Ok(Event::Key);
                    }
                }
                Event::Halted => return Ok(Event::Halted),
            }
        }
    }

    /// Dispatches at most `cycles` primitives.
    pub fn execute(&mut self, io: &mut dyn Io, cycles: usize) -> Result<Event> {
        for _ in 0..cycles {
            match self.step(io)? {
                Event::Running => {}
                event => return Ok(event),
            }
        }
        Ok(Event::Running)
    }

    /// Dispatches exactly one code field. Errors halt the machine.
    pub fn step(&mut self, io: &mut dyn Io) -> Result<Event> {
        match self.state {
            State::Halted => return Ok(Event::Halted),
            State::Paused => return Ok(Event::Key),
            State::Running => {}
        }
        let result = self.dispatch(io);
        if let Err(e) = &result {
            info!(error = %e, "halted on error");
            self.state = State::Halted;
        }
        result
    }

    fn next(&mut self) -> Result<()> {
        let ip = self.mem.ip();
        let pc = self.mem.get16(ip)?;
        self.mem.set_pc(pc);
        self.mem.set_ip(ip.wrapping_add(CELLL));
        Ok(())
    }

    /// Inline operand at IP.
    fn operand(&self) -> Result<Cell> {
        self.mem.get16(self.mem.ip())
    }

    fn skip_operand(&mut self) {
        let ip = self.mem.ip();
        self.mem.set_ip(ip.wrapping_add(CELLL));
    }

    fn jump(&mut self) -> Result<()> {
        let target = self.operand()?;
        self.mem.set_ip(target);
        Ok(())
    }

    /// A code field that holds an address instead of an opcode. Only the
    /// code field of a dictionary header is a valid target.
    fn call(&mut self, target: Cell) -> Result<()> {
        let last = self.mem.get16(User::Last.addr())?;
        if self.entries_last != Some(last) {
            self.entries = Header::walk(&self.mem, last)?
                .into_iter()
                .map(|header| header.code)
                .collect();
            self.entries_last = Some(last);
        }
        if !self.entries.contains(&target) {
            return Err(error!(IllegalOpcode, @self.mem.wp(); format!("{:#06X}", target)));
        }
        let ret = self.mem.pc();
        trace!(ret, target, "call");
        Stack::RETURN.push(&mut self.mem, ret)?;
        self.mem.set_pc(target);
        Ok(())
    }

    fn dispatch(&mut self, io: &mut dyn Io) -> Result<Event> {
        let pc = self.mem.pc();
        let cell = self.mem.get16(pc)?;
        self.mem.set_wp(pc);
        self.mem.set_pc(pc.wrapping_add(CELLL));
        let op = match Opcode::try_from(cell) {
            Ok(op) => op,
            Err(target) => {
                self.call(target)?;
                return Ok(Event::Running);
            }
        };
        trace!(pc, ip = self.mem.ip(), op = op.name(), "dispatch");

        use Opcode::*;
        let data = Stack::DATA;
        let ret = Stack::RETURN;
        match op {
            Bye => {
                info!(pc, "bye");
                self.state = State::Halted;
                return Ok(Event::Halted);
            }
            Key => {
                self.next()?;
                self.state = State::Paused;
                debug!(pc, "awaiting key");
                return Ok(Event::Key);
            }
            TxStore => {
                let ch = data.pop(&mut self.mem)?;
                io.txsto(ch);
            }
            DoLit => {
                let value = self.operand()?;
                data.push(&mut self.mem, value)?;
                self.skip_operand();
            }
            Exit => {
                let ip = ret.pop(&mut self.mem)?;
                self.mem.set_ip(ip);
            }
            Execute => {
                let addr = data.pop(&mut self.mem)?;
                self.mem.set_pc(addr);
                return Ok(Event::Running);
            }
            Next => {
                let count = ret.peek(&self.mem, 0)? as i32 - 1;
                if count < 0 {
                    ret.pop(&mut self.mem)?;
                    self.skip_operand();
                } else {
                    ret.replace(&mut self.mem, count as Cell)?;
                    self.jump()?;
                }
            }
            QBranch => {
                if data.pop(&mut self.mem)? == 0 {
                    self.jump()?;
                } else {
                    self.skip_operand();
                }
            }
            Branch => self.jump()?,
            Store => {
                let (value, addr) = data.pop_2(&mut self.mem)?;
                self.mem.set16(addr, value)?;
            }
            Fetch => {
                let addr = data.pop(&mut self.mem)?;
                let value = self.mem.get16(addr)?;
                data.push(&mut self.mem, value)?;
            }
            CStore => {
                let (value, addr) = data.pop_2(&mut self.mem)?;
                self.mem.set8(addr, value as u8)?;
            }
            CFetch => {
                let addr = data.pop(&mut self.mem)?;
                let value = self.mem.get8(addr)?;
                data.push(&mut self.mem, value as Cell)?;
            }
            RpFetch => {
                let rp = self.mem.rp();
                data.push(&mut self.mem, rp)?;
            }
            RpStore => {
                let rp = data.pop(&mut self.mem)?;
                self.mem.set_rp(rp);
            }
            RFrom => {
                let value = ret.pop(&mut self.mem)?;
                data.push(&mut self.mem, value)?;
            }
            RFetch => {
                let value = ret.peek(&self.mem, 0)?;
                data.push(&mut self.mem, value)?;
            }
            ToR => {
                let value = data.pop(&mut self.mem)?;
                ret.push(&mut self.mem, value)?;
            }
            SpFetch => {
                let sp = self.mem.sp();
                data.push(&mut self.mem, sp)?;
            }
            SpStore => {
                let sp = data.pop(&mut self.mem)?;
                self.mem.set_sp(sp);
            }
            Drop => {
                data.pop(&mut self.mem)?;
            }
            Dup => {
                let value = data.peek(&self.mem, 0)?;
                data.push(&mut self.mem, value)?;
            }
            Swap => {
                let (one, two) = data.pop_2(&mut self.mem)?;
                data.push(&mut self.mem, two)?;
                data.push(&mut self.mem, one)?;
            }
            Over => {
                let value = data.peek(&self.mem, 1)?;
                data.push(&mut self.mem, value)?;
            }
            ZeroLess => {
                let value = data.pop(&mut self.mem)?;
                let flag = if value & 0x8000 != 0 { TRUE } else { FALSE };
                data.push(&mut self.mem, flag)?;
            }
            And => {
                let (one, two) = data.pop_2(&mut self.mem)?;
                data.push(&mut self.mem, one & two)?;
            }
            Or => {
                let (one, two) = data.pop_2(&mut self.mem)?;
                data.push(&mut self.mem, one | two)?;
            }
            Xor => {
                let (one, two) = data.pop_2(&mut self.mem)?;
                data.push(&mut self.mem, one ^ two)?;
            }
            UmPlus => {
                let (one, two) = data.pop_2(&mut self.mem)?;
                let sum = one as u32 + two as u32;
                data.push(&mut self.mem, sum as Cell)?;
                data.push(&mut self.mem, (sum >> 16) as Cell)?;
            }
            DoList => {
                let ip = self.mem.ip();
                ret.push(&mut self.mem, ip)?;
                let body = self.mem.pc();
                self.mem.set_ip(body);
            }
            DoUser => {
                let offset = self.mem.get16(self.mem.pc())?;
                data.push(&mut self.mem, UPP.wrapping_add(offset))?;
            }
        }
        self.next()?;
        Ok(Event::Running)
    }
}
