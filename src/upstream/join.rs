//! Target URL construction.

/// Join the upstream base URL with an inbound path and query string.
///
/// Trailing slashes on `base` and leading slashes on `path` are collapsed
/// so exactly one `/` separates them. The query is appended verbatim.
pub fn build_target_url(base: &str, path: &str, query: Option<&str>) -> String {
    let mut target = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    );

    if let Some(query) = query.filter(|q| !q.is_empty()) {
        target.push('?');
        target.push_str(query);
    }

    target
}
