//! Attribute value escaping for component tags.
//!
//! Component attribute values are double-quoted. A backslash escapes the next `"` or `\`, and
//! values never span lines, so newlines are folded into spaces on the way in.

/// Escape a value for use inside a double-quoted component attribute.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push(' '),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Reverse [`escape`]. Unknown escapes keep their backslash.
pub fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.peek() {
                Some(&next @ ('\\' | '"')) => {
                    out.push(next);
                    chars.next();
                }
                _ => out.push('\\'),
            },
            '\n' | '\r' => out.push(' '),
            _ => out.push(c),
        }
    }
    out
}

/// Parse the attribute source of a component tag into name/value pairs.
///
/// Accepts `name="value"` (with escapes), `name='value'`, `name=bare` and boolean `name`.
/// Returns `None` on a dangling quote.
pub fn parse_attributes(source: &str) -> Option<Vec<(String, String)>> {
    let mut attributes = Vec::new();
    let mut chars = source.char_indices().peekable();

    loop {
        while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
        let Some(&(name_start, _)) = chars.peek() else {
            break;
        };

        let mut name_end = name_start;
        while let Some((i, c)) = chars.next_if(|(_, c)| !c.is_whitespace() && *c != '=') {
            name_end = i + c.len_utf8();
        }
        let name = source[name_start..name_end].to_string();

        while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
        if chars.next_if(|(_, c)| *c == '=').is_none() {
            attributes.push((name, String::new()));
            continue;
        }
        while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}

        let value = match chars.peek() {
            Some(&(_, quote @ ('"' | '\''))) => {
                chars.next();
                let mut raw = String::new();
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    if c == '\\' && quote == '"' {
                        raw.push(c);
                        if let Some((_, escaped)) = chars.next() {
                            raw.push(escaped);
                        }
                        continue;
                    }
                    if c == quote {
                        closed = true;
                        break;
                    }
                    raw.push(c);
                }
                if !closed {
                    return None;
                }
                if quote == '"' {
                    unescape(&raw)
                } else {
                    raw
                }
            }
            _ => {
                let mut raw = String::new();
                while let Some((_, c)) = chars.next_if(|(_, c)| !c.is_whitespace()) {
                    raw.push(c);
                }
                raw
            }
        };
        attributes.push((name, value));
    }

    Some(attributes)
}
