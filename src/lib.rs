#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod backstop;
pub use backstop::*;

mod clock;
pub use clock::*;

mod common;
pub use common::*;

mod error;
pub use error::*;

mod event_recorder;
pub use event_recorder::*;

mod ordered_store;
pub use ordered_store::*;

mod window_evaluator;
pub use window_evaluator::*;

pub mod local;

#[cfg(any(feature = "redis-tokio", feature = "redis-smol"))]
#[cfg_attr(docsrs, doc(cfg(any(feature = "redis-tokio", feature = "redis-smol"))))]
pub mod redis;

#[cfg(any(feature = "redis-tokio", feature = "redis-smol"))]
mod runtime;

#[cfg(test)]
mod tests;
