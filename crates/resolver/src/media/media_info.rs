use serde::{Deserialize, Serialize};

use super::stream_info::StreamDescriptor;

/// Descriptive metadata of one resolved link.
///
/// `author` is `"name(uid:…)"` for standalone videos and `"name(mid)"` for episodes; empty
/// when the upstream carries no owner name (episodes fall back to the season title).
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    pub author: String,
}

/// A link that resolved to a playable stream.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ResolvedLink {
    // Canonical page URL, short links already expanded
    pub source_url: String,
    pub metadata: VideoMetadata,
    pub stream: StreamDescriptor,
}
