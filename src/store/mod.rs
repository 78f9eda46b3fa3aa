//! Persistence layer for completed profiles.

pub mod memory;
pub mod traits;

pub use memory::InMemoryProfileStore;
pub use traits::ProfileStore;
