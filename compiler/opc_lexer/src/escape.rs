//! Escape sequence processing for string literals.
//!
//! Recognized escapes follow JSON: `\"`, `\\`, `\/`, `\b`, `\f`, `\n`, `\r`,
//! `\t` and `\uXXXX` (with surrogate pairs).

/// An escape that could not be decoded.
///
/// `offset` is the byte offset of the backslash within the string contents.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct BadEscape {
    pub offset: usize,
}

/// Resolve a single-character escape to its replacement.
#[inline]
fn resolve_escape(c: char) -> Option<char> {
    match c {
        '"' => Some('"'),
        '\\' => Some('\\'),
        '/' => Some('/'),
        'b' => Some('\u{8}'),
        'f' => Some('\u{c}'),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        _ => None,
    }
}

/// Read four hex digits following `\u`.
fn read_hex4(chars: &mut std::str::CharIndices<'_>) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..4 {
        let (_, c) = chars.next()?;
        value = value * 16 + c.to_digit(16)?;
    }
    Some(value)
}

/// Process string escape sequences in the contents of a quoted literal.
pub(crate) fn unescape_string(s: &str) -> Result<String, BadEscape> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.char_indices();

    while let Some((offset, c)) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        let bad = BadEscape { offset };
        let (_, esc) = chars.next().ok_or(bad)?;
        if esc != 'u' {
            result.push(resolve_escape(esc).ok_or(bad)?);
            continue;
        }
        let high = read_hex4(&mut chars).ok_or(bad)?;
        let code = if (0xD800..0xDC00).contains(&high) {
            // High surrogate: must be followed by `\uDC00`..`\uDFFF`.
            let (Some((_, '\\')), Some((_, 'u'))) = (chars.next(), chars.next()) else {
                return Err(bad);
            };
            let low = read_hex4(&mut chars).ok_or(bad)?;
            if !(0xDC00..0xE000).contains(&low) {
                return Err(bad);
            }
            0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
        } else {
            high
        };
        result.push(char::from_u32(code).ok_or(bad)?);
    }

    Ok(result)
}
