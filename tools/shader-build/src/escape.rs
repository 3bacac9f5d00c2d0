//! Quoted-literal escaping for option values and emitted `#define` strings

/// Escape `"`, `'`, tab, CR, LF and backslash, optionally wrapping in quotes.
///
/// Works in a single pass so backslashes introduced for one sequence are
/// never escaped a second time.
pub fn escape_string(raw: &str, add_quotes: bool) -> String {
    let mut result = String::with_capacity(raw.len() + 2);
    if add_quotes {
        result.push('"');
    }
    for c in raw.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\'' => result.push_str("\\'"),
            '\t' => result.push_str("\\t"),
            '\r' => result.push_str("\\r"),
            '\n' => result.push_str("\\n"),
            '\\' => result.push_str("\\\\"),
            _ => result.push(c),
        }
    }
    if add_quotes {
        result.push('"');
    }
    result
}

/// Inverse of [`escape_string`] for the body of a literal (no quote handling).
///
/// Unknown escape sequences and a trailing lone backslash are kept verbatim.
pub fn unescape_body(escaped: &str) -> String {
    let mut result = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => result.push('"'),
            Some('\'') => result.push('\''),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('n') => result.push('\n'),
            Some('\\') => result.push('\\'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result
}

/// Strip one pair of wrapping quotes and unescape the inside.
///
/// Strings that are not wrapped in quotes come back unchanged.
pub fn unescape_string(maybe_quoted: &str) -> String {
    match strip_quotes(maybe_quoted) {
        Some(inner) => unescape_body(inner),
        None => maybe_quoted.to_string(),
    }
}

fn strip_quotes(s: &str) -> Option<&str> {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        Some(&s[1..s.len() - 1])
    } else {
        None
    }
}
