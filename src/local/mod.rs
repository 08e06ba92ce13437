//! In-process ordered store.
//!
//! The local store keeps the failure log within the current process using
//! thread-safe data structures ([`DashMap`](dashmap::DashMap)).
//!
//! # Key Characteristics
//!
//! - **Thread-safe:** Safe for concurrent recorders and evaluators across threads
//! - **Zero external dependencies:** No network or database required
//! - **Process-scoped:** The log is not shared across processes and does not survive restarts
//!
//! # When to Use
//!
//! ✅ **Use the local store when:**
//! - A single process both records failures and decides whether to back off
//! - Writing tests that need deterministic window boundaries
//!
//! ❌ **Don't use the local store when:**
//! - Several processes or hosts must observe the same failure history
//!   (use the Redis store behind the `redis-tokio` or `redis-smol` feature)

mod local_ordered_store;
pub use local_ordered_store::*;
