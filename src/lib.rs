//! Offline submission and sync core for a geotagged stories client.
//!
//! ARCHITECTURE
//! ============
//! - `store`: durable SQLite store holding the pending queue and favorites.
//! - `submission`: decides whether a new story is sent now or queued.
//! - `sync`: background trigger plus the foreground drain coordinator.
//! - `api`: the remote story service client.
//! - `connectivity`, `notice`: host signals in, user-facing notices out.

pub mod api;
pub mod config;
pub mod connectivity;
pub mod db;
pub mod error;
pub mod favorites;
pub mod models;
pub mod notice;
pub mod photo;
pub mod store;
pub mod submission;
pub mod sync;
