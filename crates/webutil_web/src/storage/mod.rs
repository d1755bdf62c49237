//! Browser backing stores for the settings cache.

pub mod extension_sync;
pub mod local_storage;
