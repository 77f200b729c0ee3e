pub mod formats;
pub mod media_info;
pub mod outcome;
pub mod stream_info;

pub use formats::{QualityTier, StreamFormat};
pub use media_info::{ResolvedLink, VideoMetadata};
pub use outcome::{ResolutionOutcome, SizeVerdict};
pub use stream_info::StreamDescriptor;
