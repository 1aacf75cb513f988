//! sputils - Spotify library utilities for the shell
//!
//! This library collects a user's saved albums, tracks, playlists and artists
//! from Spotify, flattens them into plain records and renders them as JSON,
//! YAML or templated lines.

/// Command-line surface
pub mod cli;
/// Client modules for interacting with the Spotify catalog
pub mod clients;
/// Concurrent collection of paginated library resources
pub mod collector;
/// Credential configuration from files and flags
pub mod config;
/// Output rendering
pub mod formatter;
/// Raw payload to record conversions
pub mod normalize;
/// Page window arithmetic
pub mod pager;
/// Dispatch of resource names to collection and search
pub mod router;
