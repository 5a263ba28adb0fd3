//! Splits a raw input line into tokens.
//!
//! Tokens are separated by whitespace. A double-quoted span forms part of a
//! single token with the quotes removed, and a quote may open in the middle of
//! a token (`a"b c"` yields `ab c`). An unterminated quote runs to the end of
//! the line. There is no escape processing.

/// Tokenizes a full input line, command name included.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    // Set once a token has started, so that `""` still yields an empty token.
    let mut started = false;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                started = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if started {
                    tokens.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            c => {
                current.push(c);
                started = true;
            }
        }
    }

    if started {
        tokens.push(current);
    }

    tokens
}

/// Tokenizes `line` and separates the command name from its arguments.
///
/// Returns `None` when the line holds no tokens.
pub fn split_command(line: &str) -> Option<(String, Vec<String>)> {
    let mut tokens = tokenize(line).into_iter();
    let name = tokens.next()?;
    Some((name, tokens.collect()))
}
