//! A not-so-strict parser for `Cookie` request headers.
//!
//! - Allows pretty much everything in the value, including `=`
//! - Trims names and values
//! - Ignores a pair only when both name and value are empty (either one alone may be empty)
//!
//! Inbound headers are uncontrolled client data, so nothing here ever fails.

use indexmap::IndexMap;

/// Parse a `Cookie` header into an ordered name/value mapping.
///
/// Later duplicates overwrite earlier values but keep the position of the first occurrence.
pub fn parse_cookie_header(header: Option<&str>) -> IndexMap<String, String> {
    let Some(header) = header else {
        return IndexMap::new();
    };

    split_pairs(header)
        .into_iter()
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            let (name, value) = (name.trim(), value.trim());
            if name.is_empty() && value.is_empty() {
                return None;
            }
            Some((name.to_owned(), value.to_owned()))
        })
        .collect()
}

/// Split on every `;` that is followed by at least one whitespace character.
///
/// A bare `;` stays part of the surrounding pair.
fn split_pairs(header: &str) -> Vec<&str> {
    let mut pairs = Vec::new();
    let mut start = 0;
    let mut chars = header.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if ch != ';' {
            continue;
        }

        let mut end = idx + 1;
        while let Some(&(next_idx, next)) = chars.peek() {
            if !next.is_whitespace() {
                break;
            }
            end = next_idx + next.len_utf8();
            chars.next();
        }

        if end > idx + 1 {
            pairs.push(&header[start..idx]);
            start = end;
        }
    }

    pairs.push(&header[start..]);
    pairs
}
