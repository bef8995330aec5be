/// Render a markdown link.
pub fn markdown_link(label: &str, url: &str) -> String { format!("[{label}]({url})") }

/// Render a markdown link whose label is the URL itself.
pub fn self_link(url: &str) -> String { markdown_link(url, url) }

/// URL of the tree view for a ref, e.g. `https://github.com/o/r/tree/refs/heads/main`.
pub fn tree_url(repository_url: &str, git_ref: &str) -> String {
    format!("{}/tree/{}", repository_url.trim_end_matches('/'), git_ref)
}

/// Check that `value` is an absolute URL, returning it unchanged.
pub fn parse_absolute_url(value: &str) -> Result<String, url::ParseError> {
    let url = url::Url::parse(value)?;
    if url.cannot_be_a_base() {
        return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase);
    }
    Ok(value.to_string())
}
