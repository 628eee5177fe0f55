//! Comment support for the JSON files of the compiler.
//!
//! The database and the resource file are JSON documents that may carry
//! `//` and `/* */` comments. Comments are replaced with blanks (newlines are
//! kept) so `serde_json` error positions still point at the right line.

use serde_json::Value;

pub(crate) fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match (c, chars.peek()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                out.push_str("  ");
                let mut previous = '\0';
                for skipped in chars.by_ref() {
                    out.push(if skipped == '\n' { '\n' } else { ' ' });
                    if previous == '*' && skipped == '/' {
                        break;
                    }
                    previous = skipped;
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Parses a JSON document that may contain comments.
pub(crate) fn parse(input: &str) -> serde_json::Result<Value> {
    serde_json::from_str(&strip_comments(input))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn line_comments_are_dropped() {
        let value = parse("// header\n// more\n{\"a\": 1} // trailing\n").unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn block_comments_keep_line_numbers() {
        let stripped = strip_comments("/* one\ntwo */ null");
        assert_eq!(stripped.lines().count(), 2);
        assert_eq!(parse("/* one\ntwo */ null").unwrap(), Value::Null);
    }

    #[test]
    fn slashes_inside_strings_are_kept() {
        let value = parse(r#"{"db": "/tmp//x.db", "q": "a \" // b"}"#).unwrap();
        assert_eq!(value, json!({"db": "/tmp//x.db", "q": "a \" // b"}));
    }
}
