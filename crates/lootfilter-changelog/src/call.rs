//! Canonical line form for logged calls.
//!
//! Every entry in a change log (and every line of a batch input file) is one
//! call in the form `kind arg1 ... argN`. Arguments containing whitespace or
//! quote characters are quoted with shell-style rules, so
//! `set_currency_to_tier "Chromatic Orb" 2` tokenizes back into a kind and
//! two arguments.

use thiserror::Error;

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq)]
pub enum CallParseError {
    #[error("unterminated quote in call line")]
    UnterminatedQuote,
    #[error("trailing backslash in call line")]
    TrailingEscape,
    #[error("empty call line")]
    Empty,
}

// ── Call ──────────────────────────────────────────────────────────────────

/// One named, argument-carrying request against the filter.
///
/// Arguments are opaque strings; semantic parsing (integers, enums) belongs
/// to whoever applies the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub kind: String,
    pub args: Vec<String>,
}

impl Call {
    pub fn new(kind: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            kind: kind.into(),
            args,
        }
    }

    /// Parses one canonical line into a call. Fails on a blank line.
    pub fn parse(line: &str) -> Result<Self, CallParseError> {
        let mut tokens = split_tokens(line)?;
        if tokens.is_empty() {
            return Err(CallParseError::Empty);
        }
        let kind = tokens.remove(0);
        Ok(Self { kind, args: tokens })
    }

    /// Renders the call in canonical line form.
    pub fn to_line(&self) -> String {
        let mut out = quote_token(&self.kind);
        for arg in &self.args {
            out.push(' ');
            out.push_str(&quote_token(arg));
        }
        out
    }
}

impl std::fmt::Display for Call {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_line())
    }
}

// ── Tokenizer ─────────────────────────────────────────────────────────────

/// Splits a line into whitespace-separated tokens with shell-style quoting:
/// single quotes are literal runs, double quotes allow `\"` and `\\`
/// escapes, and a bare backslash escapes the next character.
pub fn split_tokens(line: &str) -> Result<Vec<String>, CallParseError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            '\'' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(inner) => current.push(inner),
                        None => return Err(CallParseError::UnterminatedQuote),
                    }
                }
            }
            '"' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(esc @ ('"' | '\\')) => current.push(esc),
                            Some(other) => {
                                current.push('\\');
                                current.push(other);
                            }
                            None => return Err(CallParseError::UnterminatedQuote),
                        },
                        Some(inner) => current.push(inner),
                        None => return Err(CallParseError::UnterminatedQuote),
                    }
                }
            }
            '\\' => {
                in_token = true;
                match chars.next() {
                    Some(esc) => current.push(esc),
                    None => return Err(CallParseError::TrailingEscape),
                }
            }
            c => {
                in_token = true;
                current.push(c);
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Quotes a token for the canonical line form. Plain tokens pass through;
/// anything with whitespace, quotes, or backslashes is double-quoted.
fn quote_token(token: &str) -> String {
    let needs_quoting = token.is_empty()
        || token
            .chars()
            .any(|c| c.is_whitespace() || c == '"' || c == '\'' || c == '\\');
    if !needs_quoting {
        return token.to_string();
    }
    let mut out = String::with_capacity(token.len() + 2);
    out.push('"');
    for c in token.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_tokens() {
        let call = Call::parse("set_gem_min_quality 14").unwrap();
        assert_eq!(call.kind, "set_gem_min_quality");
        assert_eq!(call.args, vec!["14"]);
    }

    #[test]
    fn parse_double_quoted_argument() {
        let call = Call::parse(r#"set_currency_to_tier "Chromatic Orb" 5"#).unwrap();
        assert_eq!(call.args, vec!["Chromatic Orb", "5"]);
    }

    #[test]
    fn parse_single_quoted_argument() {
        let call = Call::parse("set_lowest_visible_oil 'Violet Oil'").unwrap();
        assert_eq!(call.args, vec!["Violet Oil"]);
    }

    #[test]
    fn parse_apostrophe_inside_double_quotes() {
        let call = Call::parse(r#"set_currency_to_tier "Jeweller's Orb" 3"#).unwrap();
        assert_eq!(call.args, vec!["Jeweller's Orb", "3"]);
    }

    #[test]
    fn parse_escaped_quote() {
        let call = Call::parse(r#"op "a \"b\" c""#).unwrap();
        assert_eq!(call.args, vec![r#"a "b" c"#]);
    }

    #[test]
    fn parse_rejects_unterminated_quote() {
        assert_eq!(
            Call::parse(r#"op "half open"#),
            Err(CallParseError::UnterminatedQuote)
        );
    }

    #[test]
    fn parse_rejects_blank_line() {
        assert_eq!(Call::parse("   "), Err(CallParseError::Empty));
    }

    #[test]
    fn to_line_quotes_whitespace() {
        let call = Call::new(
            "set_currency_to_tier",
            vec!["Chromatic Orb".into(), "2".into()],
        );
        assert_eq!(call.to_line(), r#"set_currency_to_tier "Chromatic Orb" 2"#);
    }

    #[test]
    fn line_roundtrip_preserves_tokens() {
        let call = Call::new(
            "set_rule_visibility",
            vec!["rare->redeemer".into(), "t12".into(), "show".into()],
        );
        assert_eq!(Call::parse(&call.to_line()).unwrap(), call);
    }

    #[test]
    fn line_roundtrip_with_embedded_quote() {
        let call = Call::new("op", vec![r#"say "hi" there"#.into()]);
        assert_eq!(Call::parse(&call.to_line()).unwrap(), call);
    }
}
