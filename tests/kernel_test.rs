mod common;
use common::*;
use forth::lang::ErrorCode;
use forth::mach::{build, Buffer, Event, Io, Runtime, State, CELLL, DEFAULT_ENTRY, UPP};

#[test]
fn test_greeting_and_echo() {
    let (vm, out) = exec(memory(KERNEL, DEFAULT_ENTRY), "abq");
    assert_eq!(out, "HELLO!\r\nabq\r\n");
    assert_eq!(vm.state(), State::Halted);
}

#[test]
fn test_key_counter_variable() {
    let c = compiler(KERNEL);
    let keys = c.dictionary().lookup("KEYS").unwrap();
    let (vm, _) = exec(memory(KERNEL, DEFAULT_ENTRY), "hello q");
    assert_eq!(vm.memory().get16(keys + CELLL).unwrap(), 7);
}

#[test]
fn test_waits_for_more_input() {
    let mut vm = Runtime::new(memory(KERNEL, DEFAULT_ENTRY));
    let mut io = Buffer::with_input("ab");
    assert_eq!(vm.run(&mut io).unwrap(), Event::Key);
    assert_eq!(io.take_text(), "HELLO!\r\nab");
    io.feed("cq");
    io.key(&mut vm).unwrap();
    assert_eq!(vm.run(&mut io).unwrap(), Event::Halted);
    assert_eq!(io.text(), "cq\r\n");
}

#[test]
fn test_arithmetic_words() {
    assert_eq!(eval("doLIT 10 doLIT 3 -"), vec![7]);
    assert_eq!(eval("doLIT 5 NEGATE"), vec![0xFFFB]);
    assert_eq!(eval("doLIT 0 1- doLIT 65535 1+"), vec![0xFFFF, 0]);
    assert_eq!(eval("doLIT 0 NOT"), vec![0xFFFF]);
    assert_eq!(eval("doLIT 0 0= doLIT 3 0="), vec![0xFFFF, 0]);
}

#[test]
fn test_stack_words() {
    assert_eq!(eval("doLIT 1 doLIT 2 doLIT 3 ROT"), vec![2, 3, 1]);
    assert_eq!(eval("doLIT 0 ?DUP"), vec![0]);
    assert_eq!(eval("doLIT 4 ?DUP"), vec![4, 4]);
}

#[test]
fn test_user_variables() {
    let stack = eval("BASE @ SP0 @ LAST");
    assert_eq!(stack[0], 10);
    assert_eq!(stack[1], forth::mach::SPP);
    assert_eq!(stack[2], UPP + 62);
}

#[test]
fn test_type_and_count() {
    let source = kernel_with("doLIT S COUNT TYPE");
    let source = source.replace("TEST ", "$RAW S $B 3 70 79 79 $B\nTEST ");
    let (_, out) = exec(memory(&source, "TEST"), "");
    assert_eq!(out, "FOO");
}

#[test]
fn test_word_listing() {
    let c = compiler(KERNEL);
    let words = c.dictionary().words().unwrap();
    assert_eq!(words[0].name, "START");
    assert_eq!(words.last().unwrap().name, "BYE");
    let dovar = words.iter().find(|h| h.name == "doVAR").unwrap();
    assert!(dovar.is_compile_only());
    assert!(!dovar.is_immediate());
}

#[test]
fn test_redefinition_shadows() {
    let source = format!("{}\nCR doLIT 35 EMIT EXIT\nTEST CR BYE", KERNEL);
    let (_, out) = exec(memory(&source, "TEST"), "");
    assert_eq!(out, "#");
}

#[test]
fn test_build_errors_carry_line() {
    let source = format!("{}\nBROKEN NOPE EXIT\n", KERNEL);
    let lines = source.lines().count();
    let e = build(&source, DEFAULT_ENTRY).unwrap_err();
    assert_eq!(e.code(), ErrorCode::UndefinedWord);
    assert_eq!(e.line_number(), Some(lines));
    let e = build(KERNEL, "MISSING").unwrap_err();
    assert_eq!(e.code(), ErrorCode::UndefinedWord);
}
