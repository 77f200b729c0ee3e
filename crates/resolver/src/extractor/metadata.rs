use tracing::debug;

use crate::{
    extractor::{
        api::BilibiliApi,
        error::ResolverError,
        models::{SeasonData, ViewData},
        target::LinkTarget,
    },
    media::VideoMetadata,
};

/// Fetches title, description and author for a classified target.
pub async fn fetch_metadata(
    api: &dyn BilibiliApi,
    target: &LinkTarget,
) -> Result<VideoMetadata, ResolverError> {
    match target {
        LinkTarget::Video { bvid } => {
            let view = api.view_info(bvid).await?;
            Ok(from_view(view))
        }
        LinkTarget::Episode { episode_id } => {
            let season = api.season_info(*episode_id).await?;
            Ok(from_season(season, *episode_id))
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

pub fn from_view(view: ViewData) -> VideoMetadata {
    let owner = view.owner.unwrap_or_default();
    let author = match (non_empty(owner.name.as_deref()), owner.mid) {
        (Some(name), Some(mid)) => format!("{name}(uid:{mid})"),
        (Some(name), None) => name.to_string(),
        (None, _) => String::new(),
    };

    VideoMetadata {
        title: view.title.unwrap_or_default(),
        description: view.desc.unwrap_or_default(),
        author,
    }
}

pub fn from_season(season: SeasonData, episode_id: u64) -> VideoMetadata {
    let season_title = non_empty(season.season_title.as_deref())
        .or_else(|| non_empty(season.title.as_deref()))
        .unwrap_or_default();

    let episode = season
        .episodes
        .as_deref()
        .unwrap_or_default()
        .iter()
        .find(|episode| episode.matches(episode_id));
    if episode.is_none() {
        debug!(episode_id, "episode not listed in season, using season title");
    }

    let title = episode
        .and_then(|episode| {
            non_empty(episode.share_copy.as_deref())
                .or_else(|| non_empty(episode.long_title.as_deref()))
                .or_else(|| non_empty(episode.title.as_deref()))
        })
        .unwrap_or(season_title);

    let description = non_empty(season.evaluate.as_deref())
        .or_else(|| non_empty(season.summary.as_deref()))
        .unwrap_or_default();

    let (mut name, mut mid) = season
        .up_info()
        .map(|up| (non_empty(up.name.as_deref()), up.mid.or(up.uid)))
        .unwrap_or((None, None));

    if name.is_none() {
        if let Some(publisher) = &season.publisher {
            name = non_empty(publisher.name.as_deref());
            mid = publisher.mid.or(mid);
        }
    }

    let author = match (name, mid) {
        (Some(name), Some(mid)) => format!("{name}({mid})"),
        (Some(name), None) => name.to_string(),
        (None, _) => season_title.to_string(),
    };

    VideoMetadata {
        title: title.to_string(),
        description: description.to_string(),
        author,
    }
}
