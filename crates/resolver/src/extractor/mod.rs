pub mod api;
pub mod client;
mod default;
pub mod error;
pub mod links;
pub mod metadata;
pub mod models;
pub mod redirect;
pub mod resolver;
pub mod size_gate;
pub mod stream;
pub mod target;

pub use default::{DEFAULT_UA, ProxyConfig, create_client, default_client};
pub use resolver::{Resolver, ResolverConfig};
