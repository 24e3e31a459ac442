//! Refresh-token rewriting for load URLs.
//!
//! The token is located by plain substring search for `<name>=`. A url that
//! carries the same literal text elsewhere (for example inside another
//! parameter's value, or as the tail of a longer parameter name) is matched
//! at the first occurrence; this is a known limitation.

use std::fmt::Display;

/// Return `url` carrying `name=value` exactly once.
///
/// An existing `name=` keeps its position and only its value (up to the next
/// `&` or the end of the url) is replaced. Otherwise the parameter is appended
/// with `?` or `&` depending on whether a query string is already present.
pub fn with_refresh_param(url: &str, name: &str, value: impl Display) -> String {
    let needle = format!("{name}=");
    match url.find(&needle) {
        Some(start) => {
            let value_start = start + needle.len();
            let value_end = url[value_start..]
                .find('&')
                .map_or(url.len(), |offset| value_start + offset);
            format!("{}{}{}", &url[..value_start], value, &url[value_end..])
        }
        None => {
            let separator = if url.contains('?') { '&' } else { '?' };
            format!("{url}{separator}{needle}{value}")
        }
    }
}
