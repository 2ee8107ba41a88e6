//! Literal value normalization.
//!
//! Literal values enter `literal_set` tagged by type so that the number `1`
//! and the string `"1"` never collide. Quotes, string prefixes and digit
//! separators are stripped; escape sequences are kept verbatim.

pub(crate) const NUMBER_TAG: &str = "num:";
pub(crate) const STRING_TAG: &str = "str:";
pub(crate) const CHAR_TAG: &str = "chr:";

/// `1_000`, `1'000` and `1000` are the same number; hex digits fold to lower case.
pub(crate) fn number(raw: &str) -> String {
    let mut out = String::with_capacity(NUMBER_TAG.len() + raw.len());
    out.push_str(NUMBER_TAG);
    out.extend(
        raw.trim()
            .chars()
            .filter(|c| *c != '_' && *c != '\'')
            .map(|c| c.to_ascii_lowercase()),
    );
    out
}

pub(crate) fn tagged_string(body: &str) -> String {
    format!("{STRING_TAG}{body}")
}

pub(crate) fn tagged_char(raw: &str) -> String {
    format!("{CHAR_TAG}{}", strip_quoted(strip_prefix(raw), &["'"]))
}

/// Body of a Python string literal: `rb'''x'''` -> `x`.
pub(crate) fn python_string_body(raw: &str) -> &str {
    strip_quoted(strip_prefix(raw), &["\"\"\"", "'''", "\"", "'"])
}

/// Body of a C/C++ string literal: `u8"x"` -> `x`.
pub(crate) fn c_string_body(raw: &str) -> &str {
    strip_quoted(strip_prefix(raw), &["\""])
}

/// Body of a C++ raw string literal: `R"tag(x)tag"` -> `x`.
pub(crate) fn c_raw_string_body(raw: &str) -> &str {
    let Some(open_quote) = raw.find('"') else {
        return raw;
    };
    let rest = &raw[open_quote + 1..];
    match (rest.find('('), rest.rfind(')')) {
        (Some(open), Some(close)) if open < close => &rest[open + 1..close],
        _ => rest.trim_end_matches('"'),
    }
}

fn strip_prefix(raw: &str) -> &str {
    raw.trim().trim_start_matches(|c: char| c.is_ascii_alphanumeric())
}

fn strip_quoted<'a>(body: &'a str, quotes: &[&str]) -> &'a str {
    for quote in quotes {
        if body.len() >= quote.len() * 2 {
            if let Some(inner) = body
                .strip_prefix(quote)
                .and_then(|rest| rest.strip_suffix(quote))
            {
                return inner;
            }
        }
    }
    body
}
