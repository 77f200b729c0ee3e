use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rustc_hash::FxHashMap;

use crate::extractor::{
    api::{BilibiliApi, PlayUrlRequest, PlaybackTarget},
    error::ResolverError,
    models::{PageEntry, PlayUrlData, SeasonData, ViewData},
};

/// Macro to initialize tracing for tests
///
/// Usage:
/// - `init_test_tracing!()` - uses DEBUG level (default)
/// - `init_test_tracing!(INFO)` - uses specified level
#[macro_export]
macro_rules! init_test_tracing {
    () => {
        $crate::init_test_tracing!(DEBUG);
    };
    ($level:ident) => {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::$level)
            .with_test_writer()
            .try_init();
    };
}

/// One recorded upstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Redirect(String),
    View(String),
    Season(u64),
    Pages(String),
    PlayUrl {
        cid: Option<u64>,
        episode_id: Option<u64>,
        quality: u32,
        fnval: u32,
    },
    Head(String),
}

/// In-memory upstream.
///
/// Unknown identifiers answer like the real API does for missing content (`-404`).
/// Playback answers are keyed by `(fnval, quality)`, independent of the target.
#[derive(Default)]
pub struct FakeApi {
    redirects: FxHashMap<String, String>,
    views: FxHashMap<String, ViewData>,
    seasons: FxHashMap<u64, SeasonData>,
    pages: FxHashMap<String, Vec<PageEntry>>,
    plays: FxHashMap<(u32, u32), PlayUrlData>,
    lengths: FxHashMap<String, u64>,
    failing_head: bool,
    panicking_views: Vec<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<Call>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeApi {
    pub fn with_redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(from.to_string(), to.to_string());
        self
    }

    pub fn with_view(mut self, bvid: &str, view: ViewData) -> Self {
        self.views.insert(bvid.to_string(), view);
        self
    }

    pub fn with_season(mut self, episode_id: u64, season: SeasonData) -> Self {
        self.seasons.insert(episode_id, season);
        self
    }

    pub fn with_pages(mut self, bvid: &str, cids: &[u64]) -> Self {
        let pages = cids
            .iter()
            .enumerate()
            .map(|(index, cid)| PageEntry {
                cid: *cid,
                page: Some(index as u32 + 1),
                part: None,
            })
            .collect();
        self.pages.insert(bvid.to_string(), pages);
        self
    }

    pub fn with_play(mut self, fnval: u32, quality: u32, data: PlayUrlData) -> Self {
        self.plays.insert((fnval, quality), data);
        self
    }

    pub fn with_content_length(mut self, url: &str, bytes: u64) -> Self {
        self.lengths.insert(url.to_string(), bytes);
        self
    }

    pub fn with_failing_head(mut self) -> Self {
        self.failing_head = true;
        self
    }

    /// Makes the view call for `bvid` panic, simulating a bug inside one task.
    pub fn with_panicking_view(mut self, bvid: &str) -> Self {
        self.panicking_views.push(bvid.to_string());
        self
    }

    /// Makes metadata calls take `delay`, so that concurrent tasks overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Highest number of metadata calls that were running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    async fn simulate_latency(&self) {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    fn not_found() -> ResolverError {
        ResolverError::upstream(-404, "啥都木有")
    }
}

#[async_trait]
impl BilibiliApi for FakeApi {
    async fn follow_redirects(&self, url: &str) -> Result<String, ResolverError> {
        self.record(Call::Redirect(url.to_string()));
        self.redirects
            .get(url)
            .cloned()
            .ok_or_else(|| ResolverError::InvalidUrl(url.to_string()))
    }

    async fn view_info(&self, bvid: &str) -> Result<ViewData, ResolverError> {
        self.record(Call::View(bvid.to_string()));
        if self.panicking_views.iter().any(|id| id == bvid) {
            panic!("view handler exploded for {bvid}");
        }
        self.simulate_latency().await;
        self.views.get(bvid).cloned().ok_or_else(Self::not_found)
    }

    async fn season_info(&self, episode_id: u64) -> Result<SeasonData, ResolverError> {
        self.record(Call::Season(episode_id));
        self.simulate_latency().await;
        self.seasons
            .get(&episode_id)
            .cloned()
            .ok_or_else(Self::not_found)
    }

    async fn page_list(&self, bvid: &str) -> Result<Vec<PageEntry>, ResolverError> {
        self.record(Call::Pages(bvid.to_string()));
        self.pages.get(bvid).cloned().ok_or_else(Self::not_found)
    }

    async fn play_url(&self, request: PlayUrlRequest<'_>) -> Result<PlayUrlData, ResolverError> {
        let (cid, episode_id) = match request.target {
            PlaybackTarget::Video { cid, .. } => (Some(cid), None),
            PlaybackTarget::Episode { episode_id } => (None, Some(episode_id)),
        };
        self.record(Call::PlayUrl {
            cid,
            episode_id,
            quality: request.quality,
            fnval: request.fnval,
        });
        self.plays
            .get(&(request.fnval, request.quality))
            .cloned()
            .ok_or_else(Self::not_found)
    }

    async fn content_length(
        &self,
        url: &str,
        _referer: &str,
    ) -> Result<Option<u64>, ResolverError> {
        self.record(Call::Head(url.to_string()));
        if self.failing_head {
            return Err(ResolverError::Timeout { seconds: 10 });
        }
        Ok(self.lengths.get(url).copied())
    }
}
