/// Checks if a host falls under an allowed domain entry
///
/// The entry matches the host itself and any subdomain of it. A leading
/// `*.` on the entry is accepted and means the same thing, so config files
/// may use either spelling.
///
/// Both arguments are expected to be lowercase already.
///
/// # Examples
///
/// ```
/// use fetcharoo::url::matches_domain;
///
/// assert!(matches_domain("example.com", "example.com"));
/// assert!(matches_domain("example.com", "api.v2.example.com"));
/// assert!(matches_domain("*.example.com", "blog.example.com"));
/// assert!(!matches_domain("example.com", "notexample.com"));
/// ```
pub fn matches_domain(allowed: &str, host: &str) -> bool {
    let base = allowed.strip_prefix("*.").unwrap_or(allowed);
    if base.is_empty() {
        return false;
    }

    host == base
        || host
            .strip_suffix(base)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
