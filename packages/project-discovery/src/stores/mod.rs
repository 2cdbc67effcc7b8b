//! Storage implementations.

pub mod memory;
pub mod staging;

pub use memory::MemoryRegistry;
pub use staging::StagingStore;
