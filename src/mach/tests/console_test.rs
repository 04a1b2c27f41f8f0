use super::*;
use crate::mach::{Console, Event, Io, State};
use std::io::{self, Write};

/// A writer whose every write fails, like a closed stdout.
struct Closed;

impl Write for Closed {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }
}

const ECHO: &str = "START L: KEY DUP TX! doLIT 13 XOR ?branch DONE branch L DONE: BYE";

#[test]
fn test_lines_end_in_cr() {
    let mut vm = machine(ECHO);
    let mut console = Console::new(Vec::new());
    console.feed_line("ok");
    assert_eq!(console.pending(), 3);
    assert_eq!(vm.run(&mut console).unwrap(), Event::Halted);
    assert_eq!(console.into_inner(), b"ok\r".to_vec());
}

#[test]
fn test_waits_for_next_line() {
    let mut vm = machine(ECHO);
    let mut console = Console::new(Vec::new());
    console.feed("a");
    assert_eq!(vm.run(&mut console).unwrap(), Event::Key);
    assert_eq!(vm.state(), State::Paused);
    console.feed_line("b");
    console.key(&mut vm).unwrap();
    assert_eq!(vm.run(&mut console).unwrap(), Event::Halted);
    assert_eq!(console.into_inner(), b"ab\r".to_vec());
}

#[test]
fn test_write_failure_does_not_stop_machine() {
    let mut vm = machine(ECHO);
    let mut console = Console::new(Closed);
    console.feed_line("xyz");
    assert_eq!(vm.run(&mut console).unwrap(), Event::Halted);
    assert_eq!(vm.state(), State::Halted);
    assert_eq!(console.pending(), 0);
}
