//! Field normalization for raw SEPOMEX values.
//!
//! Cleans free text into values that are safe inside single-quoted SQL
//! literals and formats numeric-looking codes into fixed-width, zero-padded
//! strings. Every function here is total: bad input degrades to an empty
//! string or `None`, never to an error.

use std::borrow::Cow;
use tracing::trace;

/// Returns true when a raw value carries no information.
///
/// Missing values, blank text and the literal `nan` (any case) are all
/// treated as absent. Every component that needs to know whether a value
/// is present goes through this predicate.
pub fn is_absent(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(text) => {
            let trimmed = text.trim();
            trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan")
        }
    }
}

/// Clean a free-text field for use inside a single-quoted SQL literal.
///
/// Steps, in order:
/// 1. absent input becomes an empty string
/// 2. C1 control characters (U+0080..=U+009F) are removed
/// 3. whitespace runs collapse to a single space and the ends are trimmed
/// 4. the text is truncated to `max_length` characters
/// 5. `'` and `"` are doubled and `\` becomes `/`
/// 6. the result is truncated again to `max_length` without splitting an
///    escaped quote pair
///
/// Quote runs that already have an even length are taken as escaped, which
/// makes the function idempotent: `clean_text(Some(&clean_text(x, n)), n)`
/// returns its input unchanged.
pub fn clean_text(raw: Option<&str>, max_length: usize) -> String {
    if is_absent(raw) {
        return String::new();
    }
    let original = raw.unwrap_or_default();

    let stripped: String = original.chars().filter(|c| !is_c1_control(*c)).collect();
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    let escaped = escape_sql_literal(truncate_chars(&collapsed, max_length));
    let cleaned = truncate_escaped(&escaped, max_length).trim_end();

    if is_absent(Some(cleaned)) {
        return String::new();
    }

    if cleaned != original {
        trace!("clean_text: '{}' -> '{}'", original, cleaned);
    }

    cleaned.to_string()
}

/// Format a raw code as a zero-padded decimal string of at least `digits` characters.
///
/// Decimal text such as `"5.0"` is accepted and truncated toward zero.
/// Absent, unparsable, non-finite and negative values return `None`. Values
/// wider than `digits` are returned unpadded; width limits are enforced by
/// pattern validation, not here.
pub fn format_codigo(raw: Option<&str>, digits: usize) -> Option<String> {
    if is_absent(raw) {
        return None;
    }
    let text = raw?.trim();

    let value: u128 = if text.contains('.') {
        let parsed: f64 = text.parse().ok()?;
        if !parsed.is_finite() || parsed < 0.0 {
            return None;
        }
        let truncated = parsed.trunc();
        if truncated >= u128::MAX as f64 {
            return None;
        }
        truncated as u128
    } else {
        let parsed: i128 = text.parse().ok()?;
        u128::try_from(parsed).ok()?
    };

    Some(format!("{value:0>digits$}"))
}

/// Convert bytes to text, dropping invalid UTF-8 sequences instead of
/// substituting a replacement character.
pub fn drop_invalid_utf8(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            let mut text = String::with_capacity(bytes.len());
            for chunk in bytes.utf8_chunks() {
                text.push_str(chunk.valid());
            }
            Cow::Owned(text)
        }
    }
}

fn is_c1_control(c: char) -> bool {
    ('\u{80}'..='\u{9f}').contains(&c)
}

/// Truncate to at most `max_chars` characters (not bytes)
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// Double single and double quotes (runs are padded to even length) and
/// replace backslashes with forward slashes.
fn escape_sql_literal(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 8);
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                let mut run = 1;
                while chars.next_if_eq(&c).is_some() {
                    run += 1;
                }
                escaped.extend(std::iter::repeat_n(c, run + run % 2));
            }
            '\\' => escaped.push('/'),
            other => escaped.push(other),
        }
    }

    escaped
}

/// Truncate escaped text, dropping the dangling half of a cut quote pair
fn truncate_escaped(text: &str, max_chars: usize) -> &str {
    let cut = truncate_chars(text, max_chars);
    let Some(last) = cut.chars().last() else {
        return cut;
    };
    if last != '\'' && last != '"' {
        return cut;
    }

    let run = cut.chars().rev().take_while(|c| *c == last).count();
    if run % 2 == 1 {
        &cut[..cut.len() - last.len_utf8()]
    } else {
        cut
    }
}
