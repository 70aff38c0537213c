//! Shared types for the now-playing display: configuration, platform paths,
//! playback snapshots and now-playing scripts.

pub mod config;
pub mod platform;
pub mod script;
pub mod snapshot;
