//! Store layer: the shared state store contract and its in-memory backend.

pub mod memory;
pub mod storage;
pub mod store;
