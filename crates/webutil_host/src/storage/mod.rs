//! Settings persistence: backing-store contracts and the write-through cache.

pub mod backend;
pub mod settings;
