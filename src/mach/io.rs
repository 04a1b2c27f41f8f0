use super::{Cell, Runtime};
use crate::lang::Error;
use std::collections::VecDeque;
use std::io::Write;
use tracing::debug;

const CR: Cell = 13;

/// ## Character I/O collaborator
///
/// `key` is called by `Runtime::run` after the machine suspended on KEY.
/// It may hand over a character at once with `vm.resume(ch)`. It may
/// also just `vm.push(ch)`, or return and deliver later; the machine then
/// stays paused until its owner calls `run` again.
/// `txsto` receives every character written by TX!.
pub trait Io {
    fn key(&mut self, vm: &mut Runtime) -> Result<(), Error>;
    fn txsto(&mut self, ch: Cell);
}

/// Scripted collaborator: a queue of input characters and captured output.
#[derive(Debug, Default, Clone)]
pub struct Buffer {
    input: VecDeque<Cell>,
    output: Vec<Cell>,
}

impl Buffer {
    pub fn new() -> Buffer {
        Buffer::default()
    }

    pub fn with_input(s: &str) -> Buffer {
        let mut buffer = Buffer::new();
        buffer.feed(s);
        buffer
    }

    pub fn feed(&mut self, s: &str) {
        self.input.extend(s.bytes().map(Cell::from));
    }

    pub fn pending(&self) -> usize {
        self.input.len()
    }

    pub fn output(&self) -> &[Cell] {
        &self.output
    }

    /// Output as text; each cell contributes its low byte.
    pub fn text(&self) -> String {
        self.output.iter().map(|c| char::from(*c as u8)).collect()
    }

    pub fn take_text(&mut self) -> String {
        let s = self.text();
        self.output.clear();
        s
    }
}

impl Io for Buffer {
    fn key(&mut self, vm: &mut Runtime) -> Result<(), Error> {
        match self.input.pop_front() {
            Some(ch) => vm.resume(ch),
            None => Ok(()),
        }
    }

    fn txsto(&mut self, ch: Cell) {
        self.output.push(ch);
    }
}

/// Line-oriented collaborator for a real terminal. Typed lines are queued
/// and handed to KEY one character at a time, each line ending in CR.
/// TX! output goes straight to the writer.
pub struct Console<W: Write> {
    pending: VecDeque<Cell>,
    out: W,
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Console<W> {
        Console {
            pending: VecDeque::new(),
            out,
        }
    }

    pub fn feed(&mut self, s: &str) {
        self.pending.extend(s.bytes().map(Cell::from));
    }

    pub fn feed_line(&mut self, line: &str) {
        self.feed(line);
        self.pending.push_back(CR);
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Io for Console<W> {
    fn key(&mut self, vm: &mut Runtime) -> Result<(), Error> {
        match self.pending.pop_front() {
            Some(ch) => vm.resume(ch),
            None => Ok(()),
        }
    }

    fn txsto(&mut self, ch: Cell) {
        let out = &mut self.out;
        if let Err(error) = out.write_all(&[ch as u8]).and_then(|_| out.flush()) {
            debug!(ch, %error, "console write failed");
        }
    }
}
