//! just-weather-core: Core types and traits shared by the just-weather crates
//!
//! This crate provides the error type used by the transport, HTTP and cache
//! layers, the time source abstraction, cache key construction, cache
//! observability hooks and the doubly linked [`List`] used for recency
//! ordering.

mod error;
mod list;
mod traits;
mod types;

pub use error::{Error, ErrorKind, Result};
pub use list::{IntoIter, Iter, List, NodeRef};
pub use traits::*;
pub use types::*;
