use serde::{Deserialize, Serialize};

use super::media_info::ResolvedLink;

/// Result of checking a stream's declared size against the configured ceiling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizeVerdict {
    Unknown,
    WithinLimit,
    Oversize { actual_mb: f64, limit_mb: f64 },
}

/// Per-link result of one resolution batch.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    Resolved(ResolvedLink),
    /// The stream exceeds the size ceiling; its metadata and URL are withheld.
    Oversize {
        source_url: String,
        actual_mb: f64,
        limit_mb: f64,
    },
    /// Unsupported link or failed resolution. Callers are expected to stay silent.
    Skipped { link: String },
}

impl ResolutionOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolutionOutcome::Resolved(_))
    }

    pub fn as_resolved(&self) -> Option<&ResolvedLink> {
        match self {
            ResolutionOutcome::Resolved(link) => Some(link),
            _ => None,
        }
    }
}
