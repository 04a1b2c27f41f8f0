use super::token::Token;

/// Splits one source line into the definition name and its body tokens.
/// Returns `None` for blank lines and `\` comment lines.
pub fn lex(s: &str) -> Option<(String, Vec<Token>)> {
    let mut words = s.split_whitespace();
    let name = match words.next() {
        None => return None,
        Some("\\") => return None,
        Some(name) => name.to_string(),
    };
    Some((name, words.map(Token::from_str).collect()))
}
