use super::*;

mod label_test;

fn body(s: &str) -> Vec<Token> {
    match lex(&format!("T {}", s)) {
        Some((_, tokens)) => tokens,
        None => vec![],
    }
}
