//! Upstream JSON payloads.
//!
//! The upstream API is loose about its response shapes: payloads live under `data` or
//! `result`, fields come and go depending on the account tier and the content type, and
//! some keys exist in both camel and snake case. Everything optional is modelled as
//! `Option` so that a missing field never fails deserialization.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::extractor::error::ResolverError;

/// Status half of the envelope, readable whatever shape the payload has.
#[derive(Debug, Deserialize)]
struct Status {
    code: i64,
    message: Option<String>,
}

/// Decodes an envelope and returns its payload.
///
/// The status is checked before the payload is typed, so an error response keeps its
/// upstream code even when its `data` does not match `T`.
pub fn parse_response<T: DeserializeOwned>(body: &str) -> Result<T, ResolverError> {
    let status: Status = serde_json::from_str(body)?;
    if status.code != 0 {
        return Err(ResolverError::upstream(
            status.code,
            status.message.unwrap_or_default(),
        ));
    }

    serde_json::from_str::<ApiResponse<T>>(body)?.into_payload()
}

/// Common envelope shared by every endpoint.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i64,
    pub message: Option<String>,
    pub data: Option<T>,
    pub result: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Returns the payload, preferring `result` over `data`.
    pub fn into_payload(self) -> Result<T, ResolverError> {
        if self.code != 0 {
            return Err(ResolverError::upstream(
                self.code,
                self.message.unwrap_or_default(),
            ));
        }

        self.result
            .or(self.data)
            .ok_or_else(|| ResolverError::ValidationError("response carried no payload".into()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewData {
    pub bvid: Option<String>,
    pub title: Option<String>,
    pub desc: Option<String>,
    pub owner: Option<Owner>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Owner {
    pub name: Option<String>,
    pub mid: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeasonData {
    pub title: Option<String>,
    pub season_title: Option<String>,
    pub evaluate: Option<String>,
    pub summary: Option<String>,
    pub episodes: Option<Vec<SeasonEpisode>>,
    pub up_info: Option<UpInfo>,
    #[serde(rename = "upInfo")]
    pub up_info_camel: Option<UpInfo>,
    pub publisher: Option<UpInfo>,
}

impl SeasonData {
    pub fn up_info(&self) -> Option<&UpInfo> {
        self.up_info.as_ref().or(self.up_info_camel.as_ref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeasonEpisode {
    pub id: Option<u64>,
    pub ep_id: Option<u64>,
    pub share_copy: Option<String>,
    pub long_title: Option<String>,
    pub title: Option<String>,
}

impl SeasonEpisode {
    pub fn matches(&self, episode_id: u64) -> bool {
        self.ep_id == Some(episode_id) || self.id == Some(episode_id)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpInfo {
    pub name: Option<String>,
    pub mid: Option<u64>,
    pub uid: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageEntry {
    pub cid: u64,
    pub page: Option<u32>,
    pub part: Option<String>,
}

/// Playback description returned by both playback endpoints.
///
/// Depending on `fnval` the response carries a `durl` list (single progressive file) or a
/// `dash` object (separate tracks), sometimes both, sometimes neither.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayUrlData {
    pub quality: Option<u32>,
    pub accept_quality: Option<Vec<u32>>,
    pub durl: Option<Vec<Durl>>,
    pub dash: Option<Dash>,
}

impl PlayUrlData {
    pub fn durl(&self) -> &[Durl] {
        self.durl.as_deref().unwrap_or_default()
    }

    pub fn dash_videos(&self) -> &[DashTrack] {
        self.dash
            .as_ref()
            .and_then(|dash| dash.video.as_deref())
            .unwrap_or_default()
    }
}

/// The episode endpoint sometimes nests the playback description under `video_info`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EpisodePlayUrl {
    pub video_info: Option<PlayUrlData>,
    #[serde(flatten)]
    pub inline: PlayUrlData,
}

impl EpisodePlayUrl {
    pub fn into_data(self) -> PlayUrlData {
        self.video_info.unwrap_or(self.inline)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Durl {
    pub url: Option<String>,
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Dash {
    pub video: Option<Vec<DashTrack>>,
    pub audio: Option<Vec<DashTrack>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashTrack {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub bandwidth: u64,
    #[serde(rename = "baseUrl")]
    pub base_url_camel: Option<String>,
    pub base_url: Option<String>,
    pub codecs: Option<String>,
}

impl DashTrack {
    pub fn url(&self) -> Option<&str> {
        self.base_url_camel
            .as_deref()
            .filter(|url| !url.is_empty())
            .or_else(|| self.base_url.as_deref().filter(|url| !url.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_status_wins_over_mismatched_payload() {
        let body = r#"{"code":-400,"message":"请求错误","data":{}}"#;

        match parse_response::<Vec<PageEntry>>(body) {
            Err(ResolverError::UpstreamError { code, message }) => {
                assert_eq!(code, -400);
                assert_eq!(message, "请求错误");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn successful_body_is_typed() {
        let body = r#"{"code":0,"message":"0","data":[{"cid":1001,"page":1,"part":"P1"}]}"#;

        let pages = parse_response::<Vec<PageEntry>>(body).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].cid, 1001);
    }

    #[test]
    fn envelope_prefers_result_over_data() {
        let response: ApiResponse<SeasonData> = serde_json::from_value(json!({
            "code": 0,
            "message": "success",
            "data": { "title": "from data" },
            "result": { "title": "from result" }
        }))
        .unwrap();

        let payload = response.into_payload().unwrap();
        assert_eq!(payload.title.as_deref(), Some("from result"));
    }

    #[test]
    fn envelope_reports_upstream_code() {
        let response: ApiResponse<ViewData> = serde_json::from_value(json!({
            "code": -404,
            "message": "啥都木有",
            "data": null
        }))
        .unwrap();

        match response.into_payload() {
            Err(ResolverError::UpstreamError { code, message }) => {
                assert_eq!(code, -404);
                assert_eq!(message, "啥都木有");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn episode_playback_uses_nested_video_info() {
        let payload: EpisodePlayUrl = serde_json::from_value(json!({
            "video_info": {
                "quality": 80,
                "durl": [{ "url": "https://upos.example/nested.mp4" }]
            }
        }))
        .unwrap();

        let data = payload.into_data();
        assert_eq!(data.quality, Some(80));
        assert_eq!(
            data.durl()[0].url.as_deref(),
            Some("https://upos.example/nested.mp4")
        );
    }

    #[test]
    fn dash_track_accepts_both_url_spellings() {
        let tracks: Vec<DashTrack> = serde_json::from_value(json!([
            { "id": 80, "bandwidth": 10, "baseUrl": "https://a.example/camel.m4s" },
            { "id": 80, "bandwidth": 10, "base_url": "https://a.example/snake.m4s" },
            { "id": 80, "bandwidth": 10, "baseUrl": "", "base_url": "https://a.example/both.m4s" }
        ]))
        .unwrap();

        assert_eq!(tracks[0].url(), Some("https://a.example/camel.m4s"));
        assert_eq!(tracks[1].url(), Some("https://a.example/snake.m4s"));
        assert_eq!(tracks[2].url(), Some("https://a.example/both.m4s"));
    }
}
