#![allow(dead_code)]

use forth::mach::{build, Buffer, Compiler, Event, Memory, Runtime};

pub const KERNEL: &str = include_str!("../../forth/kernel.fs");

/// The sample kernel plus one extra definition named TEST.
pub fn kernel_with(body: &str) -> String {
    format!("{}\nTEST {} BYE\n", KERNEL, body)
}

pub fn memory(source: &str, entry: &str) -> Memory {
    build(source, entry).unwrap()
}

pub fn compiler(source: &str) -> Compiler {
    let mut c = Compiler::new().unwrap();
    c.compile(source).unwrap();
    c
}

/// Runs until BYE. Panics if the machine is left waiting for input.
pub fn exec(mem: Memory, input: &str) -> (Runtime, String) {
    let mut vm = Runtime::new(mem);
    let mut io = Buffer::with_input(input);
    let event = vm.run(&mut io).unwrap();
    assert_eq!(event, Event::Halted, "output so far: {:?}", io.text());
    (vm, io.text())
}

/// Data stack left by the TEST word.
pub fn eval(body: &str) -> Vec<u16> {
    let (vm, _) = exec(memory(&kernel_with(body), "TEST"), "");
    vm.stack().unwrap()
}
