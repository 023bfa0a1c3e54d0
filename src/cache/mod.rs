//! Generic normalized caching layer.
//!
//! This module provides a domain-agnostic cache that:
//! - Stores each entity once, addressed by a reference token (`Type:key`)
//! - Keeps query collections as ordered, duplicate-free token sets
//! - Serves fresh collections without a network round-trip
//! - Lets callers patch a collection in place after a write

mod layer;
mod refs;
mod storage;
mod traits;

pub use layer::CacheLayer;
pub use refs::RefSet;
pub use storage::{CacheStorage, MemoryStorage};
pub use traits::{CacheRef, Cacheable, QueryKey};
