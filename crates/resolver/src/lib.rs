//! # Bili Resolver
//!
//! Turns Bilibili links embedded in free-form text into direct, playable media URLs.
//!
//! The crate finds candidate links (short links, canonical video/episode pages and bare
//! `BV` identifiers), expands short links, classifies each page as a standalone video or a
//! series episode, fetches descriptive metadata and negotiates the best stream the upstream
//! playback API is willing to hand out. Links are resolved concurrently under a shared
//! limiter; a failing link never affects its siblings.
//!
//! ```no_run
//! use bili_resolver::{Resolver, ResolverConfig};
//!
//! # async fn run() -> Result<(), bili_resolver::extractor::error::ResolverError> {
//! let resolver = Resolver::new(ResolverConfig::default())?;
//! for outcome in resolver.resolve("看看这个 https://www.bilibili.com/video/BV1xx411c7mD").await {
//!     println!("{outcome:?}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## License
//!
//! MIT OR Apache-2.0

pub mod extractor;
pub mod media;

#[cfg(test)]
pub(crate) mod test_utils;

pub use extractor::{ProxyConfig, Resolver, ResolverConfig, target::LinkTarget};
pub use media::{
    ResolutionOutcome, ResolvedLink, SizeVerdict, StreamDescriptor, StreamFormat, VideoMetadata,
};
