/// Canonical, filesystem-safe cache key for a keyword.
///
/// Trim, replace spaces with `_`, keep only `[A-Za-z0-9_-]`, lowercase.
/// Pure and idempotent; may return an empty string (callers must treat that as unusable).
pub fn normalize_cache_key(keyword: &str) -> String {
    keyword
        .trim()
        .chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
