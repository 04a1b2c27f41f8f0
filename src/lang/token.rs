use crate::mach::Address;

/// Reserved token that toggles byte-mode emission.
pub const BYTE_MODE_TOKEN: &str = "$B";
/// Directive introducing a user variable line.
pub const USER_DIRECTIVE: &str = "$USER";
/// Directive introducing a definition with no implicit code field.
pub const RAW_DIRECTIVE: &str = "$RAW";

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Token {
    /// Name to be resolved against labels, constants, then the dictionary.
    Word(String),
    /// Decimal literal as written, not yet wrapped to a cell.
    Number(i64),
    /// `name:` declares a label at the current emission offset.
    Label(String),
    /// Resolved label reference: byte offset from the start of the definition.
    LabelRef(Address),
    ByteMode,
}

impl Token {
    pub fn from_str(s: &str) -> Token {
        if s == BYTE_MODE_TOKEN {
            return Token::ByteMode;
        }
        if s.len() > 1 && s.ends_with(':') {
            return Token::Label(s[..s.len() - 1].to_string());
        }
        if is_number(s) {
            // saturates; the range check happens at emission
            let n = s.parse::<i64>().unwrap_or(if s.starts_with('-') {
                i64::MIN
            } else {
                i64::MAX
            });
            return Token::Number(n);
        }
        Token::Word(s.to_string())
    }
}

fn is_number(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Token::*;
        match self {
            Word(s) => write!(f, "{}", s),
            Number(n) => write!(f, "{}", n),
            Label(s) => write!(f, "{}:", s),
            LabelRef(offset) => write!(f, "<+{}>", offset),
            ByteMode => write!(f, "{}", BYTE_MODE_TOKEN),
        }
    }
}
