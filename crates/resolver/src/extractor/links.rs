use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashSet;

use crate::extractor::target::BVID_REGEX;

/// Base used to synthesize a page URL from a bare identifier.
pub const VIDEO_BASE_URL: &str = "https://www.bilibili.com/video/";

// Links end at whitespace or at full-width punctuation, which chat messages often glue
// directly onto a pasted URL.
static SHORT_LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://b23\.tv/[^\s，。！？、；：“”‘’（）【】《》]+").unwrap()
});

static PAGE_LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"https?://(?:www\.)?bilibili\.com/(?:video|bangumi/play)/[^\s，。！？、；：“”‘’（）【】《》]*",
    )
    .unwrap()
});

/// Finds every candidate link in `text`.
///
/// Short links and canonical page links are taken verbatim. A bare `BV` identifier becomes
/// a synthesized page URL, unless it sits inside a link that was already matched or a page
/// link already contains it. Results are ordered by position in `text`; repeated links are
/// kept, while a repeated bare identifier is only reported once.
pub fn extract_links(text: &str) -> Vec<String> {
    let mut found: Vec<(usize, String)> = Vec::new();
    let mut covered: Vec<Range<usize>> = Vec::new();
    let mut synthesized = FxHashSet::default();

    for m in SHORT_LINK_REGEX.find_iter(text) {
        covered.push(m.range());
        found.push((m.start(), m.as_str().to_string()));
    }

    let page_links: Vec<_> = PAGE_LINK_REGEX.find_iter(text).collect();
    for m in &page_links {
        covered.push(m.range());
        found.push((m.start(), m.as_str().to_string()));
    }

    for m in BVID_REGEX.find_iter(text) {
        let inside = covered
            .iter()
            .any(|range| range.start <= m.start() && m.end() <= range.end);
        let already_linked = page_links
            .iter()
            .any(|link| link.as_str().contains(m.as_str()));

        if !inside && !already_linked && synthesized.insert(m.as_str()) {
            found.push((m.start(), format!("{VIDEO_BASE_URL}{}", m.as_str())));
        }
    }

    found.sort_by_key(|(start, _)| *start);
    found.into_iter().map(|(_, link)| link).collect()
}
