use crate::lang::Error;
use crate::mach::{build, Buffer, Runtime, DEFAULT_ENTRY};

mod console_test;

/// Two-cell addition, needed by most programs.
const PLUS: &str = "+ UM+ DROP EXIT\n";

fn machine(source: &str) -> Runtime {
    Runtime::new(build(source, DEFAULT_ENTRY).unwrap())
}

fn run(source: &str) -> (Runtime, Buffer) {
    run_input(source, "")
}

fn run_input(source: &str, input: &str) -> (Runtime, Buffer) {
    let mut vm = machine(source);
    let mut io = Buffer::with_input(input);
    vm.run(&mut io).unwrap();
    (vm, io)
}

fn run_err(source: &str) -> (Runtime, Error) {
    let mut vm = machine(source);
    let mut io = Buffer::new();
    let e = vm.run(&mut io).unwrap_err();
    (vm, e)
}

fn stack(source: &str) -> Vec<u16> {
    let (vm, _) = run(source);
    vm.stack().unwrap()
}
