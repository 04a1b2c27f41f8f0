use super::token::Token;
use super::Error;
use crate::error;
use crate::mach::{align, Address, CELLL};
use std::collections::HashMap;
use std::convert::TryFrom;

type Result<T> = std::result::Result<T, Error>;

/// ## Label extraction
///
/// First pass records `name: -> byte offset` for every declaration and
/// drops the declarations from the stream. Byte-mode spans advance the
/// offset one byte per token and realign on every toggle, exactly as the
/// dictionary will emit them. Second pass rewrites matching words into
/// `LabelRef`s. Labels are local to one definition.
pub fn resolve_labels(body: Vec<Token>) -> Result<Vec<Token>> {
    let mut labels: HashMap<String, Address> = HashMap::new();
    let mut code: Vec<Token> = Vec::with_capacity(body.len());
    let mut offset: usize = 0;
    let mut byte_mode = false;

    for token in body {
        match token {
            Token::Label(name) => {
                let at = Address::try_from(offset)
                    .map_err(|_| error!(OutOfMemory; "DEFINITION TOO LARGE"))?;
                if labels.insert(name.clone(), at).is_some() {
                    return Err(error!(SyntaxError; format!("DUPLICATE LABEL {}", name)));
                }
            }
            Token::ByteMode => {
                offset = align(offset);
                byte_mode = !byte_mode;
                code.push(token);
            }
            _ => {
                offset += if byte_mode { 1 } else { CELLL as usize };
                code.push(token);
            }
        }
    }

    Ok(code
        .into_iter()
        .map(|token| match token {
            Token::Word(name) => match labels.get(&name) {
                Some(offset) => Token::LabelRef(*offset),
                None => Token::Word(name),
            },
            other => other,
        })
        .collect())
}
