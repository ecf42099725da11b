//! Trait definitions for extensible components
//!
//! These traits let callers swap the document store, cache, reminder
//! transport, clock, and scheduled jobs for their own implementations.

pub mod cache;
pub mod clock;
pub mod job;
pub mod notifier;
pub mod store;
