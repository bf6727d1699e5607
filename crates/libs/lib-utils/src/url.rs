//! URL utility functions for reading and rewriting query parameters
//!
//! Operates on location strings as the router sees them
//! (`/pool/pool1xyz?action=delegate&tab=blocks#top`), not on full absolute URLs,
//! although those work too since everything before `?` is treated as the path.

/// Split a location into `(path, query, fragment)`, without the `?` and `#` separators.
fn split_location(location: &str) -> (&str, Option<&str>, Option<&str>) {
    let (rest, fragment) = match location.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (location, None),
    };
    match rest.split_once('?') {
        Some((path, query)) => (path, Some(query), fragment),
        None => (rest, None, fragment),
    }
}

fn decode(value: &str) -> String {
    let plus_decoded = value.replace('+', " ");
    urlencoding::decode(&plus_decoded)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(plus_decoded)
}

/// Iterate the decoded `(key, value)` pairs of a query string.
///
/// A parameter with no `=` yields an empty value.
fn query_pairs(query: &str) -> impl Iterator<Item = (String, String)> + '_ {
    query.split('&').filter(|pair| !pair.is_empty()).map(|pair| {
        match pair.split_once('=') {
            Some((key, value)) => (decode(key), decode(value)),
            None => (decode(pair), String::new()),
        }
    })
}

/// Get a query parameter from a location string.
///
/// Returns the first occurrence, URL-decoded.
pub fn get_query_param(location: &str, key: &str) -> Option<String> {
    let (_, query, _) = split_location(location);
    query_pairs(query?)
        .find(|(param_key, _)| param_key == key)
        .map(|(_, value)| value)
}

/// Check whether `key` is present with exactly `value`.
pub fn has_query_param(location: &str, key: &str, value: &str) -> bool {
    let (_, query, _) = split_location(location);
    match query {
        Some(query) => query_pairs(query).any(|(k, v)| k == key && v == value),
        None => false,
    }
}

/// Path component of a location (everything before `?` or `#`).
pub fn location_path(location: &str) -> &str {
    split_location(location).0
}

/// Rewrite a location without any occurrence of `key`.
///
/// Other parameters keep their original (still encoded) text and order; the
/// fragment is preserved. When no parameters remain the `?` is dropped.
pub fn remove_query_param(location: &str, key: &str) -> String {
    let (path, query, fragment) = split_location(location);

    let kept: Vec<&str> = query
        .map(|query| {
            query
                .split('&')
                .filter(|pair| !pair.is_empty())
                .filter(|pair| {
                    let raw_key = pair.split_once('=').map(|(k, _)| k).unwrap_or(pair);
                    decode(raw_key) != key
                })
                .collect()
        })
        .unwrap_or_default();

    let mut rewritten = path.to_string();
    if !kept.is_empty() {
        rewritten.push('?');
        rewritten.push_str(&kept.join("&"));
    }
    if let Some(fragment) = fragment {
        rewritten.push('#');
        rewritten.push_str(fragment);
    }
    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_query_param() {
        let location = "/pool/pool1abc?action=delegate&note=hello%20world";
        assert_eq!(get_query_param(location, "action"), Some("delegate".to_string()));
        assert_eq!(get_query_param(location, "note"), Some("hello world".to_string()));
        assert_eq!(get_query_param(location, "missing"), None);
        assert_eq!(get_query_param("/pool/pool1abc", "action"), None);
    }

    #[test]
    fn test_flag_without_value() {
        assert_eq!(get_query_param("/x?debug&a=1", "debug"), Some(String::new()));
    }

    #[test]
    fn test_has_query_param_matches_value() {
        assert!(has_query_param("/drep/drep1xyz?action=delegate", "action", "delegate"));
        assert!(!has_query_param("/drep/drep1xyz?action=vote", "action", "delegate"));
        assert!(!has_query_param("/drep/drep1xyz#action=delegate", "action", "delegate"));
    }

    #[test]
    fn test_remove_query_param_keeps_others_and_fragment() {
        assert_eq!(
            remove_query_param("/pool/p1?tab=blocks&action=delegate&page=2#top", "action"),
            "/pool/p1?tab=blocks&page=2#top"
        );
        assert_eq!(remove_query_param("/pool/p1?action=delegate", "action"), "/pool/p1");
        assert_eq!(remove_query_param("/pool/p1", "action"), "/pool/p1");
    }

    #[test]
    fn test_location_path() {
        assert_eq!(location_path("/pool/p1?action=delegate#x"), "/pool/p1");
        assert_eq!(location_path("/drep/d1"), "/drep/d1");
    }
}
