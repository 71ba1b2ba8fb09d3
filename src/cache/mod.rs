//! Presswire Cache System
//!
//! Two pieces cooperate here:
//!
//! - **Policy table**: named, immutable cache strategies chosen per query
//! - **Fetch cache**: an in-process response cache keyed by request, with
//!   per-entry expiry and tag-based invalidation
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! enabled = true
//! entry_limit = 512
//! ```

mod config;
mod keys;
mod lock;
pub mod policy;
mod registry;
mod store;

pub use config::CacheConfig;
pub use keys::FetchKey;
pub use policy::{CacheMode, CachePolicy, PolicyName, Revalidate};
pub use registry::TagRegistry;
pub use store::{CachedBody, FetchCache};
