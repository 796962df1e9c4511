//! Input parsing helpers

use crate::types::SourceUrl;

/// Split user input into source URLs, one per line
///
/// Lines are trimmed (so `\r\n` endings and stray indentation are tolerated) and
/// blank lines are dropped. Input order is preserved; duplicates are kept, each
/// is fetched on its own.
///
/// # Examples
///
/// ```
/// use imgsrc_dl::utils::parse_source_urls;
///
/// let urls = parse_source_urls("https://a.example/p1\n\n  https://a.example/p2\r\n");
/// assert_eq!(urls.len(), 2);
/// assert_eq!(urls[1].as_str(), "https://a.example/p2");
/// ```
pub fn parse_source_urls(input: &str) -> Vec<SourceUrl> {
    input
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(SourceUrl::from)
        .collect()
}
