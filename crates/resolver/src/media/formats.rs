use std::fmt::Display;

use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

/// How the direct URL delivers the media.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StreamFormat {
    /// A single file carrying both audio and video.
    Progressive,
    /// A video-only track out of an adaptive track set.
    Adaptive,
}

impl StreamFormat {
    pub fn as_str(&self) -> &str {
        match self {
            StreamFormat::Progressive => "progressive",
            StreamFormat::Adaptive => "adaptive",
        }
    }
}

impl Display for StreamFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Upstream quality tiers (`qn`).
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Copy, Clone, TryFromPrimitive)]
#[repr(u32)]
pub enum QualityTier {
    // 240P 极速
    Lowest = 6,
    // 360P 流畅
    Low = 16,
    // 480P 清晰
    Sd = 32,
    // 720P 高清
    Hd = 64,
    // 720P60 高帧率
    Hd60 = 74,
    // 1080P 高清
    FullHd = 80,
    // 1080P+ 高码率
    FullHdPlus = 112,
    // 1080P60 高帧率
    FullHd60 = 116,
    // 4K 超清
    FourK = 120,
    // HDR 真彩
    Hdr = 125,
    // 杜比视界
    DolbyVision = 126,
    // 8K 超高清
    EightK = 127,
}

impl QualityTier {
    pub fn label(&self) -> &'static str {
        match self {
            QualityTier::Lowest => "240P",
            QualityTier::Low => "360P",
            QualityTier::Sd => "480P",
            QualityTier::Hd => "720P",
            QualityTier::Hd60 => "720P60",
            QualityTier::FullHd => "1080P",
            QualityTier::FullHdPlus => "1080P+",
            QualityTier::FullHd60 => "1080P60",
            QualityTier::FourK => "4K",
            QualityTier::Hdr => "HDR",
            QualityTier::DolbyVision => "Dolby Vision",
            QualityTier::EightK => "8K",
        }
    }
}
