//! Concrete providers.
//!
//! Backends implement [`Provider`](crate::Provider) for different storage
//! types. Archive-backed providers live in the `strata-archive` crate.

mod memory;

pub use memory::MemoryProvider;
