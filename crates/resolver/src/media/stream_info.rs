use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::media::{QualityTier, StreamFormat};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StreamDescriptor {
    // Playable URL, needs a bilibili referer when fetched
    pub direct_url: String,
    pub format: StreamFormat,
    // Upstream quality tier the URL was obtained at
    pub quality: u32,
}

impl StreamDescriptor {
    pub fn quality_label(&self) -> String {
        QualityTier::try_from_primitive(self.quality)
            .map(|tier| tier.label().to_string())
            .unwrap_or_else(|_| format!("qn {}", self.quality))
    }
}

impl fmt::Display for StreamDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) - {}",
            self.quality_label(),
            self.format,
            self.direct_url
        )
    }
}
