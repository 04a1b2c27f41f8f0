//! # 16-bit Forth kernel
//!
//! A dictionary compiler and an indirect-threaded virtual machine in the
//! eForth tradition. Kernel source is compiled one definition per line
//! into a 16 KiB memory image; the machine then runs that image one
//! primitive at a time.
//!
//! ```
//! use forth::mach::{build, Buffer, Runtime, DEFAULT_ENTRY};
//!
//! let source = "+ UM+ DROP EXIT\nSTART doLIT 40 doLIT 2 + TX! BYE";
//! let mut vm = Runtime::new(build(source, DEFAULT_ENTRY).unwrap());
//! let mut io = Buffer::new();
//! vm.run(&mut io).unwrap();
//! assert_eq!(io.text(), "*");
//! ```
//!
//! The `forth` binary builds images from source, runs them against the
//! terminal and lists their words.

pub mod lang;
pub mod mach;
