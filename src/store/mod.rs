//! Document store plumbing: structured filters, an in-memory backend, and
//! a deadline decorator for any backend.

mod deadline;
mod filter;
mod in_memory;

pub use deadline::{DEFAULT_STORE_TIMEOUT, DeadlineStore, within_deadline};
pub use filter::{Filter, Patch};
pub use in_memory::InMemoryDocumentStore;
