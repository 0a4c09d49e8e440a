//! Line tokenizer

/// Split an input line into whitespace separated tokens
///
/// Runs of whitespace never produce empty tokens. A `"` starts a quoted
/// region that lasts until the next `"`, so quoted ASCII payloads may contain
/// spaces. The quotes stay part of the token; [`crate::parse_payload`] uses
/// them to tell ASCII from hex.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                current.push(c);
            }
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_split() {
        assert_eq!(tokenize("open 1 2"), vec!["open", "1", "2"]);
    }

    #[test]
    fn test_repeated_spaces() {
        assert_eq!(tokenize("  gc   "), vec!["gc"]);
        assert_eq!(tokenize("cc\t2"), vec!["cc", "2"]);
    }

    #[test]
    fn test_empty_line() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_quoted_token_keeps_spaces() {
        assert_eq!(
            tokenize("sc 0x40 1 0 0 5 \"a b c\" 100"),
            vec!["sc", "0x40", "1", "0", "0", "5", "\"a b c\"", "100"]
        );
    }

    #[test]
    fn test_unterminated_quote_runs_to_end() {
        assert_eq!(tokenize("sc \"abc def"), vec!["sc", "\"abc def"]);
    }

    #[test]
    fn test_trailing_newline_is_whitespace() {
        assert_eq!(tokenize("list\r\n"), vec!["list"]);
    }
}
