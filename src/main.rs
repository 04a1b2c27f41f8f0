//! # forth
//!
//! Build, run and inspect 16-bit Forth kernel images.
//!

mod term;

fn main() {
    term::main();
}
