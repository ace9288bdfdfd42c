//! The version-resolved controller facade.
//!
//! A [`Controller`] owns one native session, the [`CapabilitySet`] of its
//! release and the [`WindowSynchronizer`] bound to its process. Every vendor
//! method goes through [`Controller::call_with`]:
//!
//! 1. look the operation up in the resolved set (else `UnsupportedOperation`)
//! 2. check arity and types against the signature, fill output placeholders,
//!    pad 1-based arrays
//! 3. invoke the native session
//! 4. fail with `NativeCallFailed` if the vendor wrote an `errmsg`
//! 5. synchronize on the capability's window, if it has one, preferring a
//!    window the call opened over one that was already there
//! 6. strip 1-based padding and hand back a [`CallOutput`]
//!
//! The typed methods in the area submodules are thin wrappers over this path.

mod call;
pub mod compute;
pub mod current;
pub mod edit;
pub mod geometry;
pub mod output;
pub mod plan;
pub mod plot;
pub mod project;
pub mod schematic;
pub mod steady;

use std::path::PathBuf;
use std::time::Duration;

pub use call::CallOutput;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::registry::Capability;
use crate::resolve::CapabilitySet;
use crate::{
	Backend, DialogOutcome, ERROR_MESSAGE_PARAM, NativeSession, SyncConfig, TerminateOutcome, UnknownVersion, Value,
	VersionTag, WindowSynchronizer,
};

/// Configures and launches a [`Controller`].
#[derive(Debug, Clone)]
pub struct ControllerBuilder {
	tag: String,
	project: Option<PathBuf>,
	config: SyncConfig,
}

impl ControllerBuilder {
	/// Starts a builder for the release named by `tag` (`"4.1"`, `"5.0"`,
	/// `"5.0.7"` or a `RASxx` library prefix).
	pub fn new(tag: impl Into<String>) -> Self {
		Self {
			tag: tag.into(),
			project: None,
			config: SyncConfig::default(),
		}
	}

	/// Opens this project right after launch.
	pub fn project(mut self, path: impl Into<PathBuf>) -> Self {
		self.project = Some(path.into());
		self
	}

	pub fn config(mut self, config: SyncConfig) -> Self {
		self.config = config;
		self
	}

	/// Launches one native session and attaches to its main window.
	///
	/// # Errors
	///
	/// - [`Error::BackendUnavailable`] for an unknown tag or a backend that
	///   cannot create the automation object; this is checked before the
	///   project path
	/// - [`Error::ProjectNotFound`] if the project path is not an existing
	///   file; the session just launched is killed again
	pub fn launch(self, backend: &dyn Backend) -> Result<Controller> {
		let version: VersionTag = self
			.tag
			.parse()
			.map_err(|e: UnknownVersion| Error::backend_unavailable(self.tag.clone(), e.to_string()))?;

		let session = backend.launch(version)?;
		info!(target = "ras", version = %version, "native session launched");

		let geometry = match backend.geometry(version) {
			Ok(geometry) => Some(geometry),
			Err(err) => {
				warn!(target = "ras", error = %err, "geometry automation object not available");
				None
			}
		};

		let mut controller = Controller {
			session,
			geometry,
			capabilities: CapabilitySet::resolve(version),
			sync: WindowSynchronizer::new(backend.windows(), backend.processes(), self.config),
		};
		controller.attach();

		if let Some(path) = self.project {
			controller.project_open(path)?;
		}
		Ok(controller)
	}
}

/// A live HEC-RAS session for one release.
///
/// Dropping the controller kills the native process, as does [`close`].
///
/// [`close`]: Controller::close
pub struct Controller {
	session: Box<dyn NativeSession>,
	/// The release's geometry object, if the backend could create one.
	geometry: Option<Box<dyn NativeSession>>,
	capabilities: CapabilitySet,
	sync: WindowSynchronizer,
}

impl std::fmt::Debug for Controller {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Controller").finish_non_exhaustive()
	}
}

impl Controller {
	pub fn builder(tag: impl Into<String>) -> ControllerBuilder {
		ControllerBuilder::new(tag)
	}

	/// Launches a session with default settings and no project.
	pub fn launch(tag: &str, backend: &dyn Backend) -> Result<Self> {
		ControllerBuilder::new(tag).launch(backend)
	}

	pub fn version(&self) -> VersionTag {
		self.capabilities.version()
	}

	pub fn capabilities(&self) -> &CapabilitySet {
		&self.capabilities
	}

	pub fn supports(&self, operation: &str) -> bool {
		self.capabilities.contains(operation)
	}

	/// Process id of the native session, if attaching found its main window.
	pub fn pid(&self) -> Option<u32> {
		self.sync.pid()
	}

	pub fn sync_config(&self) -> &SyncConfig {
		self.sync.config()
	}

	fn attach(&mut self) {
		let session = &mut self.session;
		let capabilities = &self.capabilities;
		let attached = self.sync.attach(|| {
			capabilities.require("ShowRas")?;
			session.invoke("ShowRas", Vec::new()).map(|_| ())
		});
		match attached {
			Ok(Some(pid)) => debug!(target = "ras", pid, "session attached"),
			Ok(None) => {}
			Err(err) => warn!(target = "ras", error = %err, "could not attach to the main window"),
		}
	}

	/// Calls `operation` with the caller-supplied arguments.
	///
	/// `args` lists only `In`/`InOut` parameters, in declaration order.
	pub fn call(&mut self, operation: &str, args: &[Value]) -> Result<CallOutput> {
		self.call_with(operation, args, None)
	}

	/// Like [`call`](Self::call), overriding whether the capability's window
	/// is closed immediately or waited on.
	pub fn call_with(&mut self, operation: &str, args: &[Value], close_override: Option<bool>) -> Result<CallOutput> {
		self.invoke_capability(operation, args, &[], close_override)
	}

	/// Like [`call`](Self::call), but `Out` slots named in `presized` are sent
	/// with the given value instead of an empty placeholder. Used where the
	/// vendor only fills arrays the caller already sized.
	pub(crate) fn call_presized(
		&mut self,
		operation: &str,
		args: &[Value],
		presized: &[(&str, Value)],
	) -> Result<CallOutput> {
		self.invoke_capability(operation, args, presized, None)
	}

	fn invoke_capability(
		&mut self,
		operation: &str,
		args: &[Value],
		presized: &[(&str, Value)],
		close_override: Option<bool>,
	) -> Result<CallOutput> {
		let cap = self.capabilities.require(operation)?;
		let wire = marshal(cap, args, presized)?;

		let existing = if cap.wait.is_some() { self.sync.window_snapshot() } else { Vec::new() };

		debug!(target = "ras", operation = cap.name, args = args.len(), "native call");
		let raw = self.session.invoke(cap.name, wire)?;
		let mut output = unmarshal(cap, raw)?;

		let vendor_error = output
			.output(ERROR_MESSAGE_PARAM)
			.and_then(Value::as_str)
			.filter(|message| !message.is_empty());
		if let Some(message) = vendor_error {
			return Err(Error::NativeCallFailed {
				operation: cap.name.to_string(),
				message: message.to_string(),
			});
		}

		if let Some(wait) = cap.wait {
			let wait = close_override.map_or(wait, |close| wait.with_close(close));
			let outcome = self.sync.await_dialog(&wait, &existing);
			debug!(target = "ras", operation = cap.name, outcome = ?outcome, "window synchronized");
			output.dialog = Some(outcome);
		}
		Ok(output)
	}

	/// Calls a windowed operation and reports how the window was handled.
	pub(crate) fn call_window(&mut self, operation: &str, args: &[Value], close: bool) -> Result<DialogOutcome> {
		let output = self.call_with(operation, args, Some(close))?;
		Ok(output.dialog.unwrap_or(DialogOutcome::NotFound))
	}

	/// Shows the HEC-RAS main window.
	pub fn show(&mut self) -> Result<()> {
		self.call("ShowRas", &[])?;
		self.sync.show_main_window();
		Ok(())
	}

	/// Hides the HEC-RAS main window.
	pub fn hide(&mut self) -> bool {
		self.sync.hide_main_window()
	}

	/// Asks the native application to exit (5.0 and later).
	pub fn quit_ras(&mut self) -> Result<()> {
		self.call("QuitRas", &[]).map(|_| ())
	}

	pub fn pause(&self, duration: Duration) {
		self.sync.pause(duration);
	}

	/// Calls `method` on the geometry automation object.
	pub(crate) fn geometry_object(&mut self, method: &str, args: Vec<Value>) -> Result<Vec<Value>> {
		let version = self.version();
		let Some(geometry) = self.geometry.as_mut() else {
			return Err(Error::backend_unavailable(
				version.as_str(),
				format!("{} is not available", version.geometry_prog_id()),
			));
		};
		debug!(target = "ras", method, "geometry object call");
		geometry.invoke(method, args)
	}

	/// Kills the native process.
	pub fn close(mut self) -> TerminateOutcome {
		self.sync.terminate()
	}
}

impl Drop for Controller {
	fn drop(&mut self) {
		if !self.sync.is_terminated() {
			let outcome = self.sync.terminate();
			debug!(target = "ras", outcome = ?outcome, "controller dropped");
		}
	}
}

fn marshal(cap: &Capability, args: &[Value], presized: &[(&str, Value)]) -> Result<Vec<Value>> {
	let sig = &cap.signature;
	if args.len() != sig.input_count() {
		return Err(Error::InvalidArgument(format!(
			"{} expects {} argument(s) {}, got {}",
			cap.name,
			sig.input_count(),
			sig.display(),
			args.len()
		)));
	}

	let mut supplied = args.iter();
	let mut wire = Vec::with_capacity(sig.params.len());
	for param in sig.params {
		let value = if param.is_supplied() {
			let arg = supplied.next().cloned().unwrap_or_default();
			arg.coerce(param.kind)
				.map_err(|e| Error::InvalidArgument(format!("{} {}: {e}", cap.name, param.name)))?
				.to_wire(param.kind)
		} else {
			match presized.iter().find(|(name, _)| *name == param.name) {
				Some((_, value)) => value.clone().to_wire(param.kind),
				None => param.kind.placeholder(),
			}
		};
		wire.push(value);
	}
	Ok(wire)
}

fn unmarshal(cap: &'static Capability, raw: Vec<Value>) -> Result<CallOutput> {
	let sig = &cap.signature;
	if raw.len() != sig.params.len() + 1 {
		return Err(Error::unexpected(
			cap.name,
			format!("expected {} result slots, got {}", sig.params.len() + 1, raw.len()),
		));
	}

	let mut slots = raw.into_iter();
	let ret = match (slots.next(), sig.returns) {
		(Some(value), Some(kind)) => value.from_wire(kind),
		_ => Value::Null,
	};
	let outputs = sig
		.params
		.iter()
		.zip(slots)
		.filter(|(param, _)| param.is_read_back())
		.map(|(param, value)| (param.name, value.from_wire(param.kind)))
		.collect();

	Ok(CallOutput {
		operation: cap.name,
		ret,
		outputs,
		dialog: None,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::WindowSystem;
	use crate::testing::FakeBackend;

	fn controller(tag: &str) -> (FakeBackend, Controller) {
		let backend = FakeBackend::all();
		let controller = Controller::launch(tag, &backend).unwrap();
		(backend, controller)
	}

	#[test]
	fn launch_attaches_and_hides_main_window() {
		let (backend, controller) = controller("5.0.7");
		assert_eq!(controller.version(), VersionTag::Ras507);
		assert!(controller.pid().is_some());
		assert_eq!(backend.native().methods(), ["ShowRas"]);
		assert!(backend.fake_windows().top_level_windows().iter().all(|w| !w.visible));
	}

	#[test]
	fn arity_mismatch_never_reaches_native() {
		let (backend, mut controller) = controller("4.1");
		let err = controller.call("Edit_XS", &["Beaver Creek".into()]).unwrap_err();
		assert!(matches!(err, Error::InvalidArgument(_)));
		assert_eq!(backend.native().call_count("Edit_XS"), 0);
	}

	#[test]
	fn type_mismatch_names_the_parameter() {
		let (_backend, mut controller) = controller("4.1");
		let err = controller
			.call("Geometry_GetNode", &["one".into(), Value::Int(1), "100".into()])
			.unwrap_err();
		assert!(err.to_string().contains("Geometry_GetNode riv"), "{err}");
	}

	#[test]
	fn output_slots_get_placeholders_and_are_read_back() {
		let (backend, mut controller) = controller("5.0");
		backend.native().on_call("Geometry_GetRivers", |args| {
			args[0] = Value::Int(1);
			args[1] = Value::StrSeq(vec!["Beaver Creek".into()]);
			Ok(Value::Null)
		});

		let out = controller.call("Geometry_GetRivers", &[]).unwrap();

		let sent = backend.native().last_call("Geometry_GetRivers").unwrap();
		assert_eq!(sent.args, vec![Value::Int(0), Value::StrSeq(Vec::new())]);
		assert_eq!(out.output("nRiver"), Some(&Value::Int(1)));
		assert_eq!(out.output("river"), Some(&Value::StrSeq(vec!["Beaver Creek".into()])));
	}

	#[test]
	fn vendor_error_message_fails_the_call() {
		let (backend, mut controller) = controller("4.1");
		backend
			.native()
			.writes("Edit_AddXS", 3, "River not found: Beaver", Value::Null);

		let err = controller
			.call("Edit_AddXS", &["Beaver".into(), "Upper".into(), "5.9".into()])
			.unwrap_err();
		assert_eq!(err.native_message(), Some("River not found: Beaver"));
	}

	#[test]
	fn malformed_native_result_is_unexpected() {
		let (backend, mut controller) = controller("4.1");
		backend.native().on_call("CurrentPlanFile", |args| {
			args.push(Value::Null);
			Ok(Value::Null)
		});
		let err = controller.call("CurrentPlanFile", &[]).unwrap_err();
		assert!(matches!(err, Error::UnexpectedResult { .. }));
	}

	#[test]
	fn drop_kills_the_native_process() {
		let (backend, controller) = controller("5.0.7");
		let pid = controller.pid().unwrap();
		drop(controller);
		assert_eq!(backend.fake_processes().kills(), vec![pid]);
	}

	#[test]
	fn close_then_drop_kills_once() {
		let (backend, controller) = controller("4.1");
		let pid = controller.pid().unwrap();
		assert_eq!(controller.close(), TerminateOutcome::Killed(pid));
		assert_eq!(backend.fake_processes().kills(), vec![pid]);
	}

	#[test]
	fn show_reveals_and_hide_conceals_main_window() {
		let (backend, mut controller) = controller("5.0");
		controller.show().unwrap();
		assert!(backend.fake_windows().top_level_windows()[0].visible);
		assert!(controller.hide());
		assert!(!backend.fake_windows().top_level_windows()[0].visible);
	}

	#[test]
	fn quit_is_unsupported_in_41() {
		let (backend, mut controller) = controller("4.1");
		assert!(controller.quit_ras().unwrap_err().is_unsupported());
		assert_eq!(backend.native().call_count("QuitRas"), 0);
	}
}
