use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Public video identifier, e.g. `BV1xx411c7mD`.
pub static BVID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"BV[0-9A-Za-z]{10,}").unwrap());

static EPISODE_PATH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/bangumi/play/ep(\d+)").unwrap());

static EPISODE_QUERY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[?&])ep_id=(\d+)").unwrap());

/// What a canonical page URL points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LinkTarget {
    /// A single episode of a series (PGC), addressed by episode id.
    Episode { episode_id: u64 },
    /// A standalone video (UGC), addressed by its public identifier.
    Video { bvid: String },
}

impl LinkTarget {
    /// Classifies a canonical page URL.
    ///
    /// The episode patterns are tried first, then the video identifier. Returns `None` for
    /// pages that are neither.
    pub fn classify(url: &str) -> Option<Self> {
        if let Some(caps) = EPISODE_PATH_REGEX
            .captures(url)
            .or_else(|| EPISODE_QUERY_REGEX.captures(url))
        {
            return caps
                .get(1)
                .and_then(|m| m.as_str().parse().ok())
                .map(|episode_id| LinkTarget::Episode { episode_id });
        }

        BVID_REGEX.find(url).map(|m| LinkTarget::Video {
            bvid: m.as_str().to_string(),
        })
    }
}

/// A fully expanded page URL together with the part it asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalUrl {
    url: String,
    part: usize,
}

impl CanonicalUrl {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let part = part_index(&url);
        Self { url, part }
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// One-based part index, taken from the `p` query parameter.
    pub fn part(&self) -> usize {
        self.part
    }

    pub fn into_string(self) -> String {
        self.url
    }
}

/// Reads the `p` query parameter; anything missing, malformed or below one means part 1.
pub fn part_index(url: &str) -> usize {
    Url::parse(url)
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "p")
                .and_then(|(_, value)| value.trim().parse::<i64>().ok())
        })
        .map(|p| p.max(1) as usize)
        .unwrap_or(1)
}
