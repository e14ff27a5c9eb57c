//! booru-view - networking and caching core for image-board clients.
//!
//! This crate talks to Danbooru-style content APIs with clean architecture:
//! a typed REST client over a resilient transport, a two-level image cache
//! with a throttled fetcher, progressive image slots, and credential and
//! search history persistence.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing use cases, services and DTOs.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "booru-view";
