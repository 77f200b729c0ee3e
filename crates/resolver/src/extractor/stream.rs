//! Stream negotiation.
//!
//! The playback endpoints hand out a single progressive file for some quality/account
//! combinations and only separate adaptive tracks for others. Resolution therefore runs in
//! up to three calls:
//!
//! 1. probe at a high tier with every adaptive capability flag set, to learn which tiers
//!    are actually available;
//! 2. ask for a progressive file at the best available tier;
//! 3. only if no file came back, ask again with adaptive flags and pick the best video
//!    track.

use tracing::debug;

use crate::{
    extractor::{
        api::{BilibiliApi, PlayUrlRequest, PlaybackTarget},
        error::ResolverError,
        models::{DashTrack, PlayUrlData},
        target::{CanonicalUrl, LinkTarget},
    },
    media::{QualityTier, StreamDescriptor, StreamFormat},
};

/// Tier requested by the probe call.
pub const PROBE_QUALITY: u32 = QualityTier::FourK as u32;

/// Tier used when the probe reveals nothing at all.
pub const FALLBACK_QUALITY: u32 = QualityTier::FullHd as u32;

/// `fnval` with every adaptive capability bit set.
pub const FNVAL_ADAPTIVE: u32 = 4048;

/// `fnval` asking for a single progressive file.
pub const FNVAL_MERGED: u32 = 0;

/// Highest tier the probe advertises: the explicit supported list when present, otherwise
/// the highest adaptive video track.
pub fn best_quality(probe: &PlayUrlData) -> Option<u32> {
    probe
        .accept_quality
        .as_deref()
        .and_then(|accepted| accepted.iter().copied().max())
        .or_else(|| probe.dash_videos().iter().map(|track| track.id).max())
        .filter(|quality| *quality > 0)
}

/// Tier to request after probing.
pub fn select_quality(probe: &PlayUrlData) -> u32 {
    best_quality(probe)
        .or(probe.quality.filter(|quality| *quality > 0))
        .unwrap_or(FALLBACK_QUALITY)
}

/// Best video-only track: highest tier, ties broken by highest bandwidth.
pub fn pick_best_track(tracks: &[DashTrack]) -> Option<&DashTrack> {
    tracks
        .iter()
        .max_by(|a, b| a.id.cmp(&b.id).then(a.bandwidth.cmp(&b.bandwidth)))
}

/// Resolves a direct stream URL for `target`.
///
/// For videos the part index carried by `page` is validated against the part list; an
/// out-of-range index fails instead of being clamped.
pub async fn resolve_stream(
    api: &dyn BilibiliApi,
    target: &LinkTarget,
    page: &CanonicalUrl,
) -> Result<StreamDescriptor, ResolverError> {
    match target {
        LinkTarget::Video { bvid } => {
            let pages = api.page_list(bvid).await?;
            let index = page.part();
            let entry = pages
                .get(index - 1)
                .ok_or(ResolverError::PartIndexOutOfRange {
                    index,
                    parts: pages.len(),
                })?;
            debug!(bvid = %bvid, part = index, cid = entry.cid, "resolved part");

            negotiate(
                api,
                PlaybackTarget::Video {
                    bvid,
                    cid: entry.cid,
                },
                page.as_str(),
            )
            .await
        }
        LinkTarget::Episode { episode_id } => {
            negotiate(
                api,
                PlaybackTarget::Episode {
                    episode_id: *episode_id,
                },
                page.as_str(),
            )
            .await
        }
    }
}

async fn negotiate(
    api: &dyn BilibiliApi,
    target: PlaybackTarget<'_>,
    referer: &str,
) -> Result<StreamDescriptor, ResolverError> {
    let request = |quality, fnval| PlayUrlRequest {
        target,
        quality,
        fnval,
        referer,
    };

    let probe = api.play_url(request(PROBE_QUALITY, FNVAL_ADAPTIVE)).await?;
    let quality = select_quality(&probe);
    debug!(?target, quality, "selected quality from probe");

    let merged = api.play_url(request(quality, FNVAL_MERGED)).await?;
    if let Some(file) = merged.durl().first() {
        return match file.url.as_deref().filter(|url| !url.is_empty()) {
            Some(url) => Ok(StreamDescriptor {
                direct_url: url.to_string(),
                format: StreamFormat::Progressive,
                quality: merged.quality.unwrap_or(quality),
            }),
            None => Err(ResolverError::NoStreamAvailable),
        };
    }

    debug!(?target, quality, "no progressive file, falling back to adaptive tracks");
    let adaptive = api.play_url(request(quality, FNVAL_ADAPTIVE)).await?;
    let track = pick_best_track(adaptive.dash_videos()).ok_or(ResolverError::NoStreamAvailable)?;
    let url = track.url().ok_or(ResolverError::NoStreamAvailable)?;

    Ok(StreamDescriptor {
        direct_url: url.to_string(),
        format: StreamFormat::Adaptive,
        quality: track.id,
    })
}
