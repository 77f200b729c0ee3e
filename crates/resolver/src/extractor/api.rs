use async_trait::async_trait;

use crate::extractor::{
    error::ResolverError,
    models::{PageEntry, PlayUrlData, SeasonData, ViewData},
};

/// Which playback endpoint to hit and how it addresses the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackTarget<'a> {
    /// Standalone video, addressed by identifier plus the part's internal content id.
    Video { bvid: &'a str, cid: u64 },
    /// Series episode, addressed by episode id directly.
    Episode { episode_id: u64 },
}

#[derive(Debug, Clone, Copy)]
pub struct PlayUrlRequest<'a> {
    pub target: PlaybackTarget<'a>,
    /// Requested quality tier (`qn`).
    pub quality: u32,
    /// Format capability flags (`fnval`); 0 asks for a single progressive file.
    pub fnval: u32,
    /// Page the request pretends to originate from.
    pub referer: &'a str,
}

/// The upstream calls the resolver depends on.
///
/// Every method is a single network round trip with its own timeout. Implementations must
/// report a non-zero upstream status as [`ResolverError::UpstreamError`].
#[async_trait]
pub trait BilibiliApi: Send + Sync {
    /// Follows redirects from `url` and returns the final URL.
    async fn follow_redirects(&self, url: &str) -> Result<String, ResolverError>;

    async fn view_info(&self, bvid: &str) -> Result<ViewData, ResolverError>;

    async fn season_info(&self, episode_id: u64) -> Result<SeasonData, ResolverError>;

    async fn page_list(&self, bvid: &str) -> Result<Vec<PageEntry>, ResolverError>;

    async fn play_url(&self, request: PlayUrlRequest<'_>) -> Result<PlayUrlData, ResolverError>;

    /// Issues a header-only request and returns the declared content length, if any.
    async fn content_length(&self, url: &str, referer: &str)
    -> Result<Option<u64>, ResolverError>;
}
