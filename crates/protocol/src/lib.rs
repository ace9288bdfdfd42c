//! Wire types for the HEC-RAS automation surface.
//!
//! This crate contains the plain data types shared by the runtime and the
//! controller facade:
//!
//! - [`Value`] - a marshaled argument or result slot of a native call
//! - [`ValueKind`] / [`IndexBase`] - the declared type of a slot, including
//!   the array indexing convention the vendor expects
//! - [`Param`] / [`Signature`] - the fixed shape of one automation method
//! - [`VersionTag`] - the closed set of supported HEC-RAS releases
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! - **Pure data**: No behavior beyond conversion and serialization
//! - **1:1 with the vendor surface**: Shapes match what the automation object
//!   accepts and returns, quirks included
//! - **Stable**: Changes only when a vendor release changes a signature

pub mod signature;
pub mod value;
pub mod version;

pub use signature::*;
pub use value::*;
pub use version::*;
