//! Image URL extraction from page text
//!
//! Extraction is a fixed pattern match, not HTML parsing. The default pattern is
//! `image_src" href="(.*)"`: case-sensitive, first match only, greedy up to the
//! last quote on that line (`.` does not cross newlines).

use regex::Regex;
use std::sync::LazyLock;

/// Pattern used by [`ImageSrcExtractor::default`]
pub const IMAGE_SRC_PATTERN: &str = r#"image_src" href="(.*)""#;

// Constant pattern, covered by tests
#[allow(clippy::expect_used)]
static IMAGE_SRC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(IMAGE_SRC_PATTERN).expect("image_src pattern compiles"));

/// Pulls an image URL out of page text.
pub trait ImageUrlExtractor: Send + Sync {
    /// Return the linked image URL, or None when the page has none
    fn extract(&self, page_text: &str) -> Option<String>;
}

/// Extractor matching a `<link rel="image_src" href="...">` tag by pattern
#[derive(Clone, Debug)]
pub struct ImageSrcExtractor {
    pattern: Regex,
}

impl ImageSrcExtractor {
    /// Use a custom pattern; the first capture group is the image URL.
    pub fn with_pattern(pattern: &str) -> std::result::Result<Self, regex::Error> {
        Ok(Self {
            pattern: regex::RegexBuilder::new(pattern)
                .size_limit(1024 * 1024)
                .build()?,
        })
    }
}

impl Default for ImageSrcExtractor {
    fn default() -> Self {
        Self {
            pattern: IMAGE_SRC.clone(),
        }
    }
}

impl ImageUrlExtractor for ImageSrcExtractor {
    fn extract(&self, page_text: &str) -> Option<String> {
        self.pattern
            .captures(page_text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|url| !url.is_empty())
            .map(str::to_string)
    }
}
