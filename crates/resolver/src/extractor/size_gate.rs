use tracing::debug;

use crate::{extractor::api::BilibiliApi, media::SizeVerdict};

pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Optional ceiling on the declared size of a resolved stream.
///
/// The gate fails open: when the size cannot be determined the link passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeGate {
    limit_mb: f64,
}

impl SizeGate {
    pub fn new(limit_mb: f64) -> Self {
        Self { limit_mb }
    }

    /// A ceiling of zero (or below) disables the gate.
    pub fn is_enabled(&self) -> bool {
        self.limit_mb > 0.0
    }

    pub fn verdict(&self, content_length: Option<u64>) -> SizeVerdict {
        match content_length {
            None => SizeVerdict::Unknown,
            Some(bytes) => {
                let actual_mb = bytes as f64 / BYTES_PER_MB;
                if self.is_enabled() && actual_mb > self.limit_mb {
                    SizeVerdict::Oversize {
                        actual_mb,
                        limit_mb: self.limit_mb,
                    }
                } else {
                    SizeVerdict::WithinLimit
                }
            }
        }
    }

    /// Reads the declared size of `url` with a header-only request.
    pub async fn check(&self, api: &dyn BilibiliApi, url: &str, referer: &str) -> SizeVerdict {
        match api.content_length(url, referer).await {
            Ok(content_length) => self.verdict(content_length),
            Err(e) => {
                debug!(error = %e, "size check failed, letting the stream through");
                SizeVerdict::Unknown
            }
        }
    }
}
