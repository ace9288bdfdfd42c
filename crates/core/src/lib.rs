//! ras: version-resolved automation of HEC-RAS
//!
//! This crate drives the HEC-RAS controller automation object. One
//! [`Controller`] owns one native session; which vendor methods it exposes is
//! decided once, at launch, from the release the caller asked for.
//!
//! # Examples
//!
//! ## Open a project and run the current plan
//!
//! ```ignore
//! use ras::{Controller, default_backend};
//!
//! fn main() -> ras::Result<()> {
//!     let backend = default_backend();
//!     let mut ras = Controller::builder("5.0.7")
//!         .project(r"C:\models\BeaverCreek\BEAVCREK.prj")
//!         .launch(backend.as_ref())?;
//!
//!     let report = ras.compute_current_plan(true)?;
//!     for line in &report.messages {
//!         println!("{line}");
//!     }
//!
//!     let rivers = ras.geometry_get_rivers()?;
//!     let reaches = ras.geometry_get_reaches(1)?;
//!     println!("{} / {}", rivers[0], reaches[0]);
//!     Ok(())
//! }
//! ```
//!
//! ## Capabilities differ by release
//!
//! ```ignore
//! use ras::{CapabilitySet, VersionTag};
//!
//! let old = CapabilitySet::resolve(VersionTag::Ras41);
//! let new = CapabilitySet::resolve(VersionTag::Ras500);
//! assert!(old.contains("Compute_Cancel"));
//! assert!(!new.contains("Compute_Cancel"));
//! assert!(old.diff(&new).added.contains(&"QuitRas"));
//! ```
//!
//! Calling an operation the release does not have fails with
//! [`Error::UnsupportedOperation`] before anything reaches the native side.

pub mod controller;
pub mod error;
pub mod registry;
pub mod resolve;

/// Scripted backends for tests.
pub mod testing {
	pub use ras_runtime::testing::*;
}

pub use controller::compute::ComputeReport;
pub use controller::geometry::NodeInfo;
pub use controller::output::{
	FlowSlice, LevelExportColumns, OutputVariable, ReachOutput, StageFlowSeries, ole_date,
};
pub use controller::plan::DataLocation;
pub use controller::project::{GIS_EXPORT_SUFFIX, gis_export_path};
pub use controller::schematic::{CrossSectionLine, ReachPolyline};
pub use controller::{CallOutput, Controller, ControllerBuilder};
pub use error::{Error, Result};
pub use ras_protocol::{
	Direction, ERROR_MESSAGE_PARAM, IndexBase, Param, Signature, UnknownVersion, Value, ValueError, ValueKind,
	VersionTag,
};
pub use ras_runtime::{
	Backend, DialogOutcome, HeadlessWindows, NativeSession, ProcessControl, RAS_PROCESS_NAME, SyncConfig,
	SystemProcesses, TerminateOutcome, UnavailableBackend, WaitDescriptor, WindowHandle, WindowInfo, WindowSynchronizer,
	WindowSystem, default_backend, kill_all_by_name,
};
pub use registry::{CAPABILITIES, Capability};
pub use resolve::{CapabilityDiff, CapabilitySet};
