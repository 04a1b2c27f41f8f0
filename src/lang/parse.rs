use super::lex::lex;
use super::token::{Token, RAW_DIRECTIVE, USER_DIRECTIVE};
use super::Error;
use crate::error;

type Result<T> = std::result::Result<T, Error>;

/// ## One source definition
///
/// `Colon` bodies get an implicit `doLIST` code field when compiled,
/// `Raw` bodies are emitted exactly as written.
#[derive(Debug, PartialEq, Clone)]
pub enum Definition {
    Colon { name: String, body: Vec<Token> },
    Raw { name: String, body: Vec<Token> },
    /// An empty name reserves a slot without creating a word.
    User(String),
}

impl Definition {
    pub fn name(&self) -> &str {
        match self {
            Definition::Colon { name, .. } | Definition::Raw { name, .. } => name,
            Definition::User(name) => name,
        }
    }
}

pub fn parse(s: &str) -> Result<Option<Definition>> {
    let (name, mut body) = match lex(s) {
        Some(lexed) => lexed,
        None => return Ok(None),
    };
    match name.as_str() {
        USER_DIRECTIVE => match body.len() {
            0 => Ok(Some(Definition::User(String::new()))),
            1 => Ok(Some(Definition::User(body.remove(0).to_string()))),
            _ => Err(error!(SyntaxError; "$USER TAKES ONE NAME")),
        },
        RAW_DIRECTIVE => {
            if body.is_empty() {
                return Err(error!(SyntaxError; "$RAW NEEDS A NAME"));
            }
            let name = body.remove(0).to_string();
            Ok(Some(Definition::Raw { name, body }))
        }
        _ => Ok(Some(Definition::Colon { name, body })),
    }
}
