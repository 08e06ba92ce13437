//! Redis-backed ordered store for sharing one failure log across processes.

mod redis_ordered_store;
pub use redis_ordered_store::*;

mod common;
pub(crate) use common::*;
