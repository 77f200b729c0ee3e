use tracing::debug;
use url::Url;

use crate::extractor::{api::BilibiliApi, error::ResolverError};

pub const SHORT_LINK_HOST: &str = "b23.tv";

pub fn is_short_link(url: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|url| {
            url.host_str()
                .map(|host| host.eq_ignore_ascii_case(SHORT_LINK_HOST))
        })
        .unwrap_or(false)
}

/// Expands a short link to the page it redirects to; any other URL is returned unchanged.
pub async fn expand(api: &dyn BilibiliApi, url: &str) -> Result<String, ResolverError> {
    if !is_short_link(url) {
        return Ok(url.to_string());
    }

    let expanded = api.follow_redirects(url).await?;
    debug!(short = %url, expanded = %expanded, "expanded short link");
    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{Call, FakeApi};

    #[test]
    fn detects_short_link_host() {
        assert!(is_short_link("https://b23.tv/AbCdEf"));
        assert!(is_short_link("http://B23.TV/AbCdEf"));
        assert!(!is_short_link("https://www.bilibili.com/video/BV1xx411c7mD"));
        assert!(!is_short_link("https://b23.tv.evil.example/AbCdEf"));
        assert!(!is_short_link("b23.tv/AbCdEf"));
    }

    #[tokio::test]
    async fn expands_short_link() {
        let api = FakeApi::default().with_redirect(
            "https://b23.tv/AbCdEf",
            "https://www.bilibili.com/video/BV1xx411c7mD?p=2",
        );

        let expanded = expand(&api, "https://b23.tv/AbCdEf").await.unwrap();
        assert_eq!(expanded, "https://www.bilibili.com/video/BV1xx411c7mD?p=2");
    }

    #[tokio::test]
    async fn leaves_canonical_url_untouched() {
        let api = FakeApi::default();

        let url = "https://www.bilibili.com/video/BV1xx411c7mD";
        assert_eq!(expand(&api, url).await.unwrap(), url);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn expansion_failure_propagates() {
        let api = FakeApi::default();

        let result = expand(&api, "https://b23.tv/missing").await;
        assert!(result.is_err());
        assert_eq!(
            api.calls(),
            vec![Call::Redirect("https://b23.tv/missing".to_string())]
        );
    }
}
