//! Percent-encoding for option values
//!
//! Alphanumerics and `_ ~ . -` pass through; path values additionally keep
//! their `/` separators.

use std::borrow::Cow;

/// Encode a query parameter value
pub fn encode_value(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

/// Encode a path, leaving `/` unescaped
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment))
        .collect::<Vec<_>>()
        .join("/")
}
