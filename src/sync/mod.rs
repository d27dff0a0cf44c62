//! Background synchronization of the pending submission queue.
//!
//! ARCHITECTURE
//! ============
//! Two execution contexts cooperate only through messages:
//!
//! - the trigger (`trigger`) runs as its own task, outlives any page, has no
//!   store access, and broadcasts `SyncMessage::DrainRequested`;
//! - the foreground page (`foreground`) owns the store and the API client and
//!   runs the `DrainCoordinator` whenever it receives that message, or on its
//!   own connectivity listener when no trigger is available.

pub mod drain;
pub mod foreground;
pub mod message;
pub mod trigger;

pub use drain::{DrainCoordinator, DrainSummary};
pub use message::{SYNC_TAG, SyncMessage};
pub use trigger::{SyncRegistration, TriggerHandle, spawn_sync_trigger};
