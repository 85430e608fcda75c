//! Character and string predicates shared by the tokenizer and parser passes.

/// Hyphen-minus plus the Unicode dash block U+2010..U+2015.
pub(crate) fn is_dash_char(c: char) -> bool {
    matches!(c, '-' | '\u{2010}'..='\u{2015}')
}

pub(crate) fn is_dash_or_space(c: char) -> bool {
    c == ' ' || is_dash_char(c)
}

/// A single dash character, e.g. the separator in "Title - 08".
pub(crate) fn is_dash(s: &str) -> bool {
    let mut chars = s.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if is_dash_char(c))
}

pub(crate) fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

pub(crate) fn starts_with_digit(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_digit())
}

pub(crate) fn ends_with_digit(s: &str) -> bool {
    s.chars().next_back().is_some_and(|c| c.is_ascii_digit())
}

pub(crate) fn contains_digit(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit())
}

/// 8-digit hexadecimal CRC32 checksum.
pub(crate) fn is_crc32(s: &str) -> bool {
    s.len() == 8 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Basic Latin through Latin Extended-B.
fn is_latin_char(c: char) -> bool {
    c <= '\u{024F}'
}

pub(crate) fn is_mostly_latin(s: &str) -> bool {
    let total = s.chars().count().max(1);
    let latin = s.chars().filter(|&c| is_latin_char(c)).count();
    latin as f64 / total as f64 >= 0.5
}

/// Integer value of the leading digits, `0` when there are none.
pub(crate) fn to_int(s: &str) -> u32 {
    s.bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u32, |n, b| n.saturating_mul(10).saturating_add(u32::from(b - b'0')))
}

/// Numeric value of the leading `digits[.digits]`, `0.0` when there are none.
pub(crate) fn to_float(s: &str) -> f64 {
    let end = s
        .char_indices()
        .scan(false, |seen_dot, (i, c)| match c {
            '0'..='9' => Some(i + 1),
            '.' if !*seen_dot => {
                *seen_dot = true;
                Some(i)
            }
            _ => None,
        })
        .last()
        .unwrap_or(0);
    s[..end].parse().unwrap_or(0.0)
}
