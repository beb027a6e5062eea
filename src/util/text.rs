use std::str::FromStr;

/// Parses a quoted price.
///
/// The feed publishes prices as plain integer strings. An empty string or the literal
/// `"0"` means the price is not quoted, and anything that is not an integer is treated
/// the same way, so a bad field never aborts the batch.
///
/// # Example
///
/// ```
/// assert_eq!(parse_price("118000000"), Some(118000000));
/// assert_eq!(parse_price("0"), None);
/// ```
pub fn parse_price(s: &str) -> Option<i64> {
    if s.is_empty() || s == "0" {
        return None;
    }

    i64::from_str(s.trim()).ok()
}

/// Returns the character after the last `_` of a key, e.g. `"n_3"` → `"3"`.
///
/// Only the final character is used, which is why slot indices are limited to 1..=9:
/// `"n_12"` yields `"2"`.
pub fn trailing_suffix(key: &str) -> Option<&str> {
    let (_, tail) = key.rsplit_once('_')?;
    let last = tail.chars().last()?;
    Some(&tail[tail.len() - last.len_utf8()..])
}
