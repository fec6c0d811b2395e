//! TXT value encoding for concurrent challenges
//!
//! Several validation tokens can share one TXT record. They are stored in
//! a single value joined by the two-character literal `\n` (a backslash
//! followed by `n`), not by a newline byte. Records written by earlier
//! releases use the same encoding.

/// Delimiter between tokens inside one record value
pub const DELIMITER: &str = "\\n";

/// Split a stored record value into its tokens
pub fn split(value: &str) -> Vec<String> {
    value.split(DELIMITER).map(str::to_string).collect()
}

/// Join tokens into a single record value
pub fn join<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(DELIMITER)
}

/// Fully-qualified form of a record name (trailing dot)
pub fn fqdn(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{}.", name)
    }
}
