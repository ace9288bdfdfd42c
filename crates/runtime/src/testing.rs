//! In-memory doubles for the native boundary.
//!
//! These stand in for the vendor automation object, the desktop and the OS
//! process table so that controllers can be driven end to end on any
//! platform:
//!
//! - [`FakeWindows`]: scripted top-level windows with visibility and close state
//! - [`FakeProcesses`]: a process table that records kills
//! - [`FakeNative`]: shared script and call log for [`FakeSession`]s
//! - [`FakeBackend`]: launches fake sessions for a chosen set of versions
//!
//! # Example
//!
//! ```ignore
//! use ras_runtime::testing::FakeBackend;
//!
//! let backend = FakeBackend::new(&[VersionTag::Ras507]);
//! backend.native().returns("CurrentPlanFile", "C:\\bvr\\BeaverCreek.p01");
//! backend.native().opens_window("Edit_XS", "Cross Section Data - Beaver Creek");
//! ```

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use ras_protocol::{Value, VersionTag};

use crate::error::{Error, Result};
use crate::native::{Backend, NativeSession};
use crate::process::{ProcessControl, RAS_PROCESS_NAME};
use crate::window::{WindowHandle, WindowInfo, WindowSystem};

#[derive(Debug, Clone)]
struct FakeWindow {
	handle: WindowHandle,
	title: String,
	pid: u32,
	visible: bool,
	close_requested: bool,
}

#[derive(Debug, Default)]
struct WindowTable {
	next_handle: isize,
	windows: Vec<FakeWindow>,
}

impl WindowTable {
	fn get_mut(&mut self, handle: WindowHandle) -> Option<&mut FakeWindow> {
		self.windows.iter_mut().find(|w| w.handle == handle)
	}
}

/// Scripted desktop.
///
/// A posted close request removes the window from enumeration, the same way
/// a dialog disappears once it processes `WM_CLOSE`.
#[derive(Debug, Default, Clone)]
pub struct FakeWindows {
	table: Arc<Mutex<WindowTable>>,
}

impl FakeWindows {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a visible top-level window owned by `pid`.
	pub fn add_window(&self, title: &str, pid: u32) -> WindowHandle {
		let mut table = self.table.lock();
		table.next_handle += 1;
		let handle = WindowHandle(table.next_handle);
		table.windows.push(FakeWindow {
			handle,
			title: title.to_string(),
			pid,
			visible: true,
			close_requested: false,
		});
		handle
	}

	/// Hides `window` from a background thread after `delay`, as if the user
	/// closed it.
	pub fn hide_after(&self, window: WindowHandle, delay: Duration) {
		let table = Arc::clone(&self.table);
		thread::spawn(move || {
			thread::sleep(delay);
			if let Some(w) = table.lock().get_mut(window) {
				w.visible = false;
			}
		});
	}

	/// Returns true if a close request was posted to `window`.
	pub fn close_requested(&self, window: WindowHandle) -> bool {
		self.table
			.lock()
			.windows
			.iter()
			.any(|w| w.handle == window && w.close_requested)
	}

	/// Titles of all windows that have not been closed.
	pub fn titles(&self) -> Vec<String> {
		self.top_level_windows().into_iter().map(|w| w.title).collect()
	}
}

impl WindowSystem for FakeWindows {
	fn top_level_windows(&self) -> Vec<WindowInfo> {
		self.table
			.lock()
			.windows
			.iter()
			.filter(|w| !w.close_requested)
			.map(|w| WindowInfo {
				handle: w.handle,
				title: w.title.clone(),
				visible: w.visible,
			})
			.collect()
	}

	fn is_visible(&self, window: WindowHandle) -> bool {
		self.table
			.lock()
			.windows
			.iter()
			.any(|w| w.handle == window && w.visible && !w.close_requested)
	}

	fn set_visible(&self, window: WindowHandle, visible: bool) {
		if let Some(w) = self.table.lock().get_mut(window) {
			w.visible = visible;
		}
	}

	fn post_close(&self, window: WindowHandle) {
		if let Some(w) = self.table.lock().get_mut(window) {
			w.close_requested = true;
			w.visible = false;
		}
	}

	fn owner_pid(&self, window: WindowHandle) -> Option<u32> {
		self.table
			.lock()
			.windows
			.iter()
			.find(|w| w.handle == window && !w.close_requested)
			.map(|w| w.pid)
	}
}

#[derive(Debug, Default)]
struct ProcessTable {
	alive: HashMap<u32, String>,
	unkillable: HashSet<u32>,
	kills: Vec<u32>,
}

/// Scripted process table.
#[derive(Debug, Default, Clone)]
pub struct FakeProcesses {
	table: Arc<Mutex<ProcessTable>>,
}

impl FakeProcesses {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn spawn(&self, pid: u32, name: &str) {
		self.table.lock().alive.insert(pid, name.to_string());
	}

	/// Makes every kill of `pid` fail while the process stays alive.
	pub fn make_unkillable(&self, pid: u32) {
		self.table.lock().unkillable.insert(pid);
	}

	/// Pids successfully killed, in order.
	pub fn kills(&self) -> Vec<u32> {
		self.table.lock().kills.clone()
	}
}

impl ProcessControl for FakeProcesses {
	fn kill(&self, pid: u32) -> io::Result<()> {
		let mut table = self.table.lock();
		if table.unkillable.contains(&pid) {
			return Err(io::Error::new(io::ErrorKind::PermissionDenied, "access is denied"));
		}
		if table.alive.remove(&pid).is_none() {
			return Err(io::Error::new(io::ErrorKind::NotFound, format!("process {pid} not found")));
		}
		table.kills.push(pid);
		Ok(())
	}

	fn is_alive(&self, pid: u32) -> bool {
		self.table.lock().alive.contains_key(&pid)
	}

	fn pids_by_name(&self, name: &str) -> io::Result<Vec<u32>> {
		Ok(self
			.table
			.lock()
			.alive
			.iter()
			.filter(|(_, image)| image.eq_ignore_ascii_case(name))
			.map(|(pid, _)| *pid)
			.collect())
	}
}

/// One invocation seen by a [`FakeSession`], with arguments in wire form.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
	pub version: VersionTag,
	pub method: String,
	pub args: Vec<Value>,
}

type Hook = Box<dyn FnMut(&mut Vec<Value>) -> Result<Value> + Send>;

#[derive(Default)]
struct NativeScript {
	calls: Vec<RecordedCall>,
	hooks: HashMap<String, Hook>,
}

/// Script and call log shared by every session a [`FakeBackend`] launches.
///
/// Methods without a hook leave their arguments untouched and return
/// [`Value::Null`].
#[derive(Clone, Default)]
pub struct FakeNative {
	script: Arc<Mutex<NativeScript>>,
}

impl FakeNative {
	pub fn new() -> Self {
		Self::default()
	}

	/// Installs a hook for `method`. The hook may rewrite argument slots in
	/// place; its return value becomes the method's return value.
	pub fn on_call<F>(&self, method: &str, hook: F)
	where
		F: FnMut(&mut Vec<Value>) -> Result<Value> + Send + 'static,
	{
		self.script.lock().hooks.insert(method.to_string(), Box::new(hook));
	}

	/// Makes `method` return `value`.
	pub fn returns(&self, method: &str, value: impl Into<Value>) {
		let value = value.into();
		self.on_call(method, move |_| Ok(value.clone()));
	}

	/// Writes `value` into argument slot `index` (0-based, wire form) and
	/// returns `ret`.
	pub fn writes(&self, method: &str, index: usize, value: impl Into<Value>, ret: impl Into<Value>) {
		let value = value.into();
		let ret = ret.into();
		self.on_call(method, move |args| {
			if let Some(slot) = args.get_mut(index) {
				*slot = value.clone();
			}
			Ok(ret.clone())
		});
	}

	/// Makes `method` fail with a COM-level error.
	pub fn fails(&self, method: &str, message: &str) {
		let message = message.to_string();
		self.on_call(method, move |_| Err(Error::Com(message.clone())));
	}

	/// Makes `method` open a visible window titled `title` on `windows`.
	pub fn opens_window(&self, method: &str, windows: &FakeWindows, title: &str, pid: u32) {
		let windows = windows.clone();
		let title = title.to_string();
		self.on_call(method, move |_| {
			windows.add_window(&title, pid);
			Ok(Value::Null)
		});
	}

	pub fn calls(&self) -> Vec<RecordedCall> {
		self.script.lock().calls.clone()
	}

	/// Names of the invoked methods, in order.
	pub fn methods(&self) -> Vec<String> {
		self.script.lock().calls.iter().map(|c| c.method.clone()).collect()
	}

	pub fn call_count(&self, method: &str) -> usize {
		self.script.lock().calls.iter().filter(|c| c.method == method).count()
	}

	/// Most recent call to `method`.
	pub fn last_call(&self, method: &str) -> Option<RecordedCall> {
		self.script.lock().calls.iter().rev().find(|c| c.method == method).cloned()
	}

	fn dispatch(&self, version: VersionTag, method: &str, mut args: Vec<Value>) -> Result<Vec<Value>> {
		let hook = {
			let mut script = self.script.lock();
			script.calls.push(RecordedCall {
				version,
				method: method.to_string(),
				args: args.clone(),
			});
			script.hooks.remove(method)
		};

		let ret = match hook {
			Some(mut hook) => {
				let ret = hook(&mut args);
				self.script.lock().hooks.entry(method.to_string()).or_insert(hook);
				ret?
			}
			None => Value::Null,
		};

		let mut out = Vec::with_capacity(args.len() + 1);
		out.push(ret);
		out.extend(args);
		Ok(out)
	}
}

/// Native session driven by a [`FakeNative`] script.
///
/// `ShowRas` makes the session's main window visible; every other method
/// goes through the script.
pub struct FakeSession {
	version: VersionTag,
	native: FakeNative,
	windows: FakeWindows,
	main_window: WindowHandle,
}

impl NativeSession for FakeSession {
	fn version(&self) -> VersionTag {
		self.version
	}

	fn invoke(&mut self, method: &str, args: Vec<Value>) -> Result<Vec<Value>> {
		if method == "ShowRas" {
			self.windows.set_visible(self.main_window, true);
		}
		self.native.dispatch(self.version, method, args)
	}
}

/// Prefix under which [`FakeGeometry`] calls are recorded and scripted, so
/// `"HECRASGeometry.nNode"` names the geometry object's `nNode`.
pub const GEOMETRY_OBJECT: &str = "HECRASGeometry";

/// Geometry automation object driven by the same [`FakeNative`] script as
/// the controller sessions.
pub struct FakeGeometry {
	version: VersionTag,
	native: FakeNative,
}

impl NativeSession for FakeGeometry {
	fn version(&self) -> VersionTag {
		self.version
	}

	fn invoke(&mut self, method: &str, args: Vec<Value>) -> Result<Vec<Value>> {
		self.native.dispatch(self.version, &format!("{GEOMETRY_OBJECT}.{method}"), args)
	}
}

/// Backend that launches [`FakeSession`]s.
///
/// Each launch allocates a fresh pid, registers a `ras.exe` process under it
/// and creates a hidden main window titled `HEC-RAS <version>`.
pub struct FakeBackend {
	installed: Vec<VersionTag>,
	native: FakeNative,
	windows: FakeWindows,
	processes: FakeProcesses,
	next_pid: Mutex<u32>,
}

impl FakeBackend {
	pub fn new(installed: &[VersionTag]) -> Self {
		Self {
			installed: installed.to_vec(),
			native: FakeNative::new(),
			windows: FakeWindows::new(),
			processes: FakeProcesses::new(),
			next_pid: Mutex::new(4100),
		}
	}

	/// Backend with every supported version installed.
	pub fn all() -> Self {
		Self::new(&VersionTag::ALL)
	}

	pub fn native(&self) -> &FakeNative {
		&self.native
	}

	pub fn fake_windows(&self) -> &FakeWindows {
		&self.windows
	}

	pub fn fake_processes(&self) -> &FakeProcesses {
		&self.processes
	}
}

impl Backend for FakeBackend {
	fn launch(&self, version: VersionTag) -> Result<Box<dyn NativeSession>> {
		if !self.installed.contains(&version) {
			return Err(Error::backend_unavailable(version.as_str(), "not installed"));
		}

		let pid = {
			let mut next = self.next_pid.lock();
			*next += 1;
			*next
		};
		self.processes.spawn(pid, RAS_PROCESS_NAME);
		let main_window = self.windows.add_window(&format!("HEC-RAS {}", version.as_str()), pid);
		self.windows.set_visible(main_window, false);

		Ok(Box::new(FakeSession {
			version,
			native: self.native.clone(),
			windows: self.windows.clone(),
			main_window,
		}))
	}

	fn geometry(&self, version: VersionTag) -> Result<Box<dyn NativeSession>> {
		if !self.installed.contains(&version) {
			return Err(Error::backend_unavailable(version.as_str(), "not installed"));
		}
		Ok(Box::new(FakeGeometry {
			version,
			native: self.native.clone(),
		}))
	}

	fn available_versions(&self) -> Vec<VersionTag> {
		let mut versions = self.installed.clone();
		versions.sort();
		versions
	}

	fn windows(&self) -> Arc<dyn WindowSystem> {
		Arc::new(self.windows.clone())
	}

	fn processes(&self) -> Arc<dyn ProcessControl> {
		Arc::new(self.processes.clone())
	}
}
