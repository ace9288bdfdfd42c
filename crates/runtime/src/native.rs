//! Native session boundary.
//!
//! The automation object itself is owned by the vendor. This module only
//! describes how the rest of the workspace talks to it:
//!
//! - [`NativeSession`]: one live automation object, invoked by method name
//! - [`Backend`]: creates sessions and exposes the OS collaborators
//!   (windowing and process control) that belong to the same platform

use std::sync::Arc;

use ras_protocol::{Value, VersionTag};

use crate::error::{Error, Result};
use crate::process::{ProcessControl, SystemProcesses};
use crate::window::{HeadlessWindows, WindowSystem};

/// A live connection to one automation object.
///
/// `invoke` receives already-marshaled arguments and returns the return value
/// followed by the final content of every argument slot, in order. Slots the
/// vendor does not write come back unchanged. Implementations are not
/// required to be `Send`: COM objects live on the thread that created them.
pub trait NativeSession {
	/// Release this session was created for.
	fn version(&self) -> VersionTag;

	/// Calls a vendor method by name.
	fn invoke(&mut self, method: &str, args: Vec<Value>) -> Result<Vec<Value>>;
}

/// Factory for native sessions plus the platform collaborators they need.
pub trait Backend {
	/// Instantiates the automation object for `version`.
	///
	/// # Errors
	///
	/// Returns [`Error::BackendUnavailable`] if the version is not installed
	/// or its automation object is not registered.
	fn launch(&self, version: VersionTag) -> Result<Box<dyn NativeSession>>;

	/// Instantiates the geometry automation object for `version`.
	///
	/// The geometry object answers node and river counts and writes geometry
	/// edits back to disk; it shares the controller's process.
	fn geometry(&self, version: VersionTag) -> Result<Box<dyn NativeSession>>;

	/// Versions whose automation object is registered on this machine.
	fn available_versions(&self) -> Vec<VersionTag>;

	fn windows(&self) -> Arc<dyn WindowSystem>;

	fn processes(&self) -> Arc<dyn ProcessControl>;
}

/// Backend for platforms without COM automation.
///
/// Every launch fails with [`Error::BackendUnavailable`]; process control
/// still works so that cleanup utilities remain usable.
#[derive(Debug, Default)]
pub struct UnavailableBackend {
	reason: String,
}

impl UnavailableBackend {
	pub fn new(reason: impl Into<String>) -> Self {
		Self { reason: reason.into() }
	}
}

impl Backend for UnavailableBackend {
	fn launch(&self, version: VersionTag) -> Result<Box<dyn NativeSession>> {
		Err(Error::backend_unavailable(version.as_str(), self.reason.clone()))
	}

	fn geometry(&self, version: VersionTag) -> Result<Box<dyn NativeSession>> {
		Err(Error::backend_unavailable(version.as_str(), self.reason.clone()))
	}

	fn available_versions(&self) -> Vec<VersionTag> {
		Vec::new()
	}

	fn windows(&self) -> Arc<dyn WindowSystem> {
		Arc::new(HeadlessWindows)
	}

	fn processes(&self) -> Arc<dyn ProcessControl> {
		Arc::new(SystemProcesses)
	}
}

/// Returns the COM backend on Windows and an [`UnavailableBackend`] elsewhere.
pub fn default_backend() -> Box<dyn Backend> {
	#[cfg(windows)]
	{
		Box::new(crate::com::ComBackend::new())
	}

	#[cfg(not(windows))]
	{
		Box::new(UnavailableBackend::new("HEC-RAS automation requires Windows"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unavailable_backend_refuses_every_version() {
		let backend = UnavailableBackend::new("no COM here");
		for version in VersionTag::ALL {
			let err = backend.launch(version).err().expect("launch must fail");
			assert!(err.is_backend_unavailable());
			assert!(err.to_string().contains("no COM here"));
			assert!(backend.geometry(version).err().expect("geometry must fail").is_backend_unavailable());
		}
		assert!(backend.available_versions().is_empty());
	}
}
