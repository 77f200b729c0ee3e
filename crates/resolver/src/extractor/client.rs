use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::extractor::{
    api::{BilibiliApi, PlayUrlRequest, PlaybackTarget},
    default::DEFAULT_UA,
    error::ResolverError,
    models::{EpisodePlayUrl, PageEntry, PlayUrlData, SeasonData, ViewData, parse_response},
};

/// reqwest-backed access to the Bilibili web API.
///
/// Every request carries a browser-like header set and its own timeout; playback requests
/// additionally carry `Referer`/`Origin`, without which the upstream refuses to answer.
#[derive(Debug, Clone)]
pub struct BilibiliClient {
    client: Client,
    headers: HeaderMap,
    request_timeout: Duration,
}

impl BilibiliClient {
    pub const BASE_URL: &str = "https://www.bilibili.com";

    const VIEW_URL: &str = "https://api.bilibili.com/x/web-interface/view";

    const SEASON_URL: &str = "https://api.bilibili.com/pgc/view/web/season";

    const PAGE_LIST_URL: &str = "https://api.bilibili.com/x/player/pagelist";

    const VIDEO_PLAY_URL: &str = "https://api.bilibili.com/x/player/playurl";

    const EPISODE_PLAY_URL: &str = "https://api.bilibili.com/pgc/player/web/v2/playurl";

    pub fn new(client: Client, user_agent: &str, request_timeout: Duration) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_str(user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_UA)),
        );
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("zh-CN,zh;q=0.8,en-US;q=0.5,en;q=0.3"),
        );

        Self {
            client,
            headers,
            request_timeout,
        }
    }

    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .headers(self.headers.clone())
            .timeout(self.request_timeout)
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    /// Adds the page-origin headers the playback and CDN hosts check.
    fn with_referer(builder: RequestBuilder, referer: &str) -> RequestBuilder {
        builder
            .header(header::REFERER, referer)
            .header(header::ORIGIN, Self::BASE_URL)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ResolverError> {
        let response = builder.send().await?;
        let body = response.text().await?;
        parse_response(&body)
    }
}

#[async_trait]
impl BilibiliApi for BilibiliClient {
    async fn follow_redirects(&self, url: &str) -> Result<String, ResolverError> {
        let response = self.get(url).send().await?;
        Ok(response.url().to_string())
    }

    async fn view_info(&self, bvid: &str) -> Result<ViewData, ResolverError> {
        let builder = self.get(Self::VIEW_URL).query(&[("bvid", bvid)]);
        self.get_json::<ViewData>(builder).await
    }

    async fn season_info(&self, episode_id: u64) -> Result<SeasonData, ResolverError> {
        let builder = self
            .get(Self::SEASON_URL)
            .query(&[("ep_id", episode_id.to_string())]);
        self.get_json::<SeasonData>(builder).await
    }

    async fn page_list(&self, bvid: &str) -> Result<Vec<PageEntry>, ResolverError> {
        let builder = self
            .get(Self::PAGE_LIST_URL)
            .query(&[("bvid", bvid), ("jsonp", "json")]);
        self.get_json::<Vec<PageEntry>>(builder).await
    }

    async fn play_url(&self, request: PlayUrlRequest<'_>) -> Result<PlayUrlData, ResolverError> {
        let quality = request.quality.to_string();
        let fnval = request.fnval.to_string();

        match request.target {
            PlaybackTarget::Video { bvid, cid } => {
                let params = [
                    ("bvid", bvid.to_string()),
                    ("cid", cid.to_string()),
                    ("qn", quality),
                    ("fnver", "0".to_string()),
                    ("fnval", fnval),
                    ("fourk", "1".to_string()),
                    ("otype", "json".to_string()),
                    ("platform", "html5".to_string()),
                    ("high_quality", "1".to_string()),
                ];
                debug!("video playurl params: {:?}", params);

                let builder = Self::with_referer(
                    self.get(Self::VIDEO_PLAY_URL).query(&params),
                    request.referer,
                );
                self.get_json::<PlayUrlData>(builder).await
            }
            PlaybackTarget::Episode { episode_id } => {
                let params = [
                    ("ep_id", episode_id.to_string()),
                    ("qn", quality),
                    ("fnver", "0".to_string()),
                    ("fnval", fnval),
                    ("fourk", "1".to_string()),
                    ("otype", "json".to_string()),
                ];
                debug!("episode playurl params: {:?}", params);

                let builder = Self::with_referer(
                    self.get(Self::EPISODE_PLAY_URL).query(&params),
                    request.referer,
                );
                let payload = self.get_json::<EpisodePlayUrl>(builder).await?;
                Ok(payload.into_data())
            }
        }
    }

    async fn content_length(
        &self,
        url: &str,
        referer: &str,
    ) -> Result<Option<u64>, ResolverError> {
        let response = self
            .request(Method::HEAD, url)
            .header(header::REFERER, referer)
            .send()
            .await?;

        if !response.status().is_success() {
            debug!(status = %response.status(), "size check rejected");
            return Ok(None);
        }

        Ok(response
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok()))
    }
}
