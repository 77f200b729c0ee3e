use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, error, info, warn};

use crate::{
    extractor::{
        api::BilibiliApi,
        client::BilibiliClient,
        default::{DEFAULT_UA, ProxyConfig, create_client},
        error::ResolverError,
        links::extract_links,
        metadata::fetch_metadata,
        redirect,
        size_gate::SizeGate,
        stream::resolve_stream,
        target::{CanonicalUrl, LinkTarget},
    },
    media::{ResolutionOutcome, ResolvedLink, SizeVerdict},
};

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Size ceiling in megabytes; 0 disables the size check.
    pub max_video_size_mb: f64,
    /// Resolution tasks allowed to run at once, across all batches of one resolver.
    pub max_concurrent: usize,
    /// Timeout of every single upstream call.
    pub request_timeout: Duration,
    /// Budget for the whole chain of calls behind one link.
    pub session_timeout: Duration,
    pub user_agent: String,
    pub proxy: Option<ProxyConfig>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_video_size_mb: 0.0,
            max_concurrent: 10,
            request_timeout: Duration::from_secs(10),
            session_timeout: Duration::from_secs(30),
            user_agent: DEFAULT_UA.to_string(),
            proxy: None,
        }
    }
}

/// Resolves every link found in a piece of text.
///
/// Cloning is cheap and clones share the concurrency limiter, so one resolver created at
/// startup caps the number of active resolution tasks for the whole process.
#[derive(Clone)]
pub struct Resolver {
    api: Arc<dyn BilibiliApi>,
    limiter: Arc<Semaphore>,
    size_gate: SizeGate,
    session_timeout: Duration,
}

/// Aborts the batch's tasks when the caller stops waiting for them.
struct BatchGuard(Vec<AbortHandle>);

impl Drop for BatchGuard {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

impl Resolver {
    pub fn new(config: ResolverConfig) -> Result<Self, ResolverError> {
        let client = create_client(config.proxy.clone())?;
        let api = BilibiliClient::new(client, &config.user_agent, config.request_timeout);
        Ok(Self::with_api(Arc::new(api), &config))
    }

    /// Builds a resolver on top of any upstream implementation.
    pub fn with_api(api: Arc<dyn BilibiliApi>, config: &ResolverConfig) -> Self {
        Self {
            api,
            limiter: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
            size_gate: SizeGate::new(config.max_video_size_mb),
            session_timeout: config.session_timeout,
        }
    }

    /// Resolves every link in `text`, one outcome per extracted link in extraction order.
    ///
    /// An empty result means no links were found. Failures of individual links are logged
    /// and reported as [`ResolutionOutcome::Skipped`]; they never affect other links.
    pub async fn resolve(&self, text: &str) -> Vec<ResolutionOutcome> {
        let links = extract_links(text);
        if links.is_empty() {
            debug!("no links found");
            return Vec::new();
        }
        debug!(count = links.len(), "extracted links");

        let handles: Vec<JoinHandle<ResolutionOutcome>> = links
            .iter()
            .map(|link| {
                let resolver = self.clone();
                let link = link.clone();
                tokio::spawn(async move { resolver.run_task(link).await })
            })
            .collect();
        let _guard = BatchGuard(handles.iter().map(JoinHandle::abort_handle).collect());

        let mut outcomes = Vec::with_capacity(links.len());
        for (link, handle) in links.into_iter().zip(handles) {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    error!(link = %link, error = ?e, "resolution task failed unexpectedly");
                    outcomes.push(ResolutionOutcome::Skipped { link });
                }
            }
        }

        outcomes
    }

    /// Runs one link under the limiter and the session budget, converting every failure
    /// into a skip.
    async fn run_task(self, link: String) -> ResolutionOutcome {
        let _permit = match self.limiter.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                warn!(link = %link, error = %e, "concurrency limiter closed");
                return ResolutionOutcome::Skipped { link };
            }
        };

        let result = match tokio::time::timeout(self.session_timeout, self.resolve_link(&link))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(ResolverError::Timeout {
                seconds: self.session_timeout.as_secs(),
            }),
        };

        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(link = %link, error = %e, "failed to resolve link");
                ResolutionOutcome::Skipped { link }
            }
        }
    }

    /// The full pipeline for one link: expand, classify, fetch metadata, negotiate the
    /// stream and check its size.
    pub async fn resolve_link(&self, link: &str) -> Result<ResolutionOutcome, ResolverError> {
        let api = self.api.as_ref();

        let page_url = redirect::expand(api, link).await?;
        let Some(target) = LinkTarget::classify(&page_url) else {
            debug!(link = %link, page = %page_url, "unsupported link");
            return Ok(ResolutionOutcome::Skipped {
                link: link.to_string(),
            });
        };
        let page = CanonicalUrl::new(page_url);
        debug!(link = %link, ?target, part = page.part(), "classified link");

        let metadata = fetch_metadata(api, &target).await?;
        let stream = resolve_stream(api, &target, &page).await?;

        if self.size_gate.is_enabled() {
            let verdict = self
                .size_gate
                .check(api, &stream.direct_url, page.as_str())
                .await;
            if let SizeVerdict::Oversize {
                actual_mb,
                limit_mb,
            } = verdict
            {
                info!(link = %link, actual_mb, limit_mb, "stream exceeds size limit");
                return Ok(ResolutionOutcome::Oversize {
                    source_url: page.into_string(),
                    actual_mb,
                    limit_mb,
                });
            }
        }

        info!(link = %link, title = %metadata.title, stream = %stream, "resolved link");
        Ok(ResolutionOutcome::Resolved(ResolvedLink {
            source_url: page.into_string(),
            metadata,
            stream,
        }))
    }
}
