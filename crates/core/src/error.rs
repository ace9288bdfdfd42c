//! Error types shared with the runtime.
//!
//! The controller adds no failure modes of its own; everything surfaces as
//! [`ras_runtime::Error`].

pub use ras_runtime::error::{Error, Result};
