/// Schemes that never point at a crawlable page
const IGNORED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Cleans a raw `href`/`src` attribute value
///
/// # Normalization Steps
///
/// 1. Strip surrounding whitespace and quote characters
/// 2. Drop everything from the first `?` or `#` onward
/// 3. Drop a single trailing `/`
///
/// The result may be empty (for example `#top` or `?page=2`).
///
/// # Examples
///
/// ```
/// use site_tree::url::sanitize_link;
///
/// assert_eq!(sanitize_link(" \"/about/?x=1#y\" "), "/about");
/// ```
pub fn sanitize_link(raw: &str) -> String {
    let trimmed = trim_attribute(raw);

    let without_query = match trimmed.find(|c: char| c == '?' || c == '#') {
        Some(index) => &trimmed[..index],
        None => trimmed,
    };

    without_query
        .strip_suffix('/')
        .unwrap_or(without_query)
        .to_string()
}

/// Returns true when the link carries no `http://` or `https://` prefix
pub fn is_relative(link: &str) -> bool {
    let lower = link.to_ascii_lowercase();
    !lower.starts_with("http://") && !lower.starts_with("https://")
}

/// Strips the whitespace and quote characters around an attribute value
pub(crate) fn trim_attribute(raw: &str) -> &str {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '"' || c == '\'')
}

/// Returns true for `javascript:`, `mailto:`, `tel:` and `data:` links
pub(crate) fn has_ignored_scheme(link: &str) -> bool {
    let lower = link.trim_start().to_ascii_lowercase();
    IGNORED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
}

/// Resolves a sanitized relative link to an absolute URL
///
/// - an empty link is the site root
/// - `//host/path` inherits the scheme of the base URL
/// - `/path` is appended to the base URL
/// - anything else found on the base URL itself is joined with a single `/`
/// - anything else is resolved against the directory of `page_url`
///   (everything up to and including its last `/`)
pub(crate) fn absolutize(base_url: &str, page_url: &str, link: &str) -> String {
    // "/" loses its only character to trailing-slash removal
    if link.is_empty() {
        return base_url.to_string();
    }

    if let Some(rest) = link.strip_prefix("//") {
        let scheme = base_url.split("://").next().unwrap_or("http");
        return format!("{}://{}", scheme, rest);
    }

    if link.starts_with('/') {
        return format!("{}{}", base_url, link);
    }

    if page_url == base_url {
        return format!("{}/{}", base_url, link);
    }

    let directory = match page_url.rfind('/') {
        Some(index) => &page_url[..=index],
        None => page_url,
    };
    format!("{}{}", directory, link)
}
