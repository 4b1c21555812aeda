//! seqindex-storage: the in-memory indices behind the query service.
//!
//! - [`memory`]: height, time, header and namespace indices under one lock

pub mod memory;

pub use memory::{BlockIndex, Window};
