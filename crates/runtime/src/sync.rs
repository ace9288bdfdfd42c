//! Blocking window synchronization.
//!
//! Several vendor methods open an editor or plot window and return at once.
//! [`WindowSynchronizer::await_dialog`] turns them into blocking calls by
//! polling the desktop until the window with the expected title is gone, or
//! by posting a close request straight away for edits that only need the
//! editor to open and close.
//!
//! Discovery and termination are best effort. A dialog that cannot be found
//! is reported as [`DialogOutcome::NotFound`] and a failed kill as
//! [`TerminateOutcome::Failed`]; neither is an error.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::process::{ProcessControl, RAS_PROCESS_NAME};
use crate::window::{WindowHandle, WindowSystem, find_by_prefix, find_opened_by_title};

/// Default visibility polling interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Title prefix of the HEC-RAS main window.
pub const MAIN_WINDOW_TITLE: &str = "HEC-RAS ";

/// Synchronizer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncConfig {
	/// Sleep between two visibility checks.
	#[serde(with = "millis")]
	pub poll_interval: Duration,
	/// Title prefix used to find the main window.
	pub main_window_title: String,
	/// Executable name used by kill-by-name cleanup.
	pub process_name: String,
	/// Hide the main window as soon as the session attaches.
	pub start_hidden: bool,
}

impl Default for SyncConfig {
	fn default() -> Self {
		Self {
			poll_interval: DEFAULT_POLL_INTERVAL,
			main_window_title: MAIN_WINDOW_TITLE.to_string(),
			process_name: RAS_PROCESS_NAME.to_string(),
			start_hidden: true,
		}
	}
}

mod millis {
	use std::time::Duration;

	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
		s.serialize_u64(d.as_millis() as u64)
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
		u64::deserialize(d).map(Duration::from_millis)
	}
}

/// How to synchronize after a call that opens a native window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct WaitDescriptor {
	/// Substring of the window title to look for.
	pub title: &'static str,
	/// Post a close request instead of waiting for the user.
	pub close_immediately: bool,
}

impl WaitDescriptor {
	/// Wait until the window is closed.
	pub const fn blocking(title: &'static str) -> Self {
		Self {
			title,
			close_immediately: false,
		}
	}

	pub const fn with_close(self, close_immediately: bool) -> Self {
		Self {
			title: self.title,
			close_immediately,
		}
	}
}

/// Result of [`WindowSynchronizer::await_dialog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogOutcome {
	/// No window matched; the call returned immediately.
	NotFound,
	/// A close request was posted to the window.
	CloseRequested,
	/// The window was visible and has since been hidden or closed.
	Closed { waited: Duration },
}

/// Result of [`WindowSynchronizer::terminate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminateOutcome {
	Killed(u32),
	/// The process was already gone or a previous call terminated it.
	AlreadyTerminated,
	/// No process id was recorded for this session.
	NotAttached,
	/// The kill failed and the process still appears alive.
	Failed { pid: u32, reason: String },
}

/// Window-based synchronization for one native session.
pub struct WindowSynchronizer {
	windows: Arc<dyn WindowSystem>,
	processes: Arc<dyn ProcessControl>,
	config: SyncConfig,
	main_window: Option<WindowHandle>,
	pid: Option<u32>,
	terminated: bool,
}

impl WindowSynchronizer {
	pub fn new(windows: Arc<dyn WindowSystem>, processes: Arc<dyn ProcessControl>, config: SyncConfig) -> Self {
		Self {
			windows,
			processes,
			config,
			main_window: None,
			pid: None,
			terminated: false,
		}
	}

	pub fn config(&self) -> &SyncConfig {
		&self.config
	}

	/// Process id of the attached native session.
	pub fn pid(&self) -> Option<u32> {
		self.pid
	}

	pub fn is_terminated(&self) -> bool {
		self.terminated
	}

	/// Binds to the session's main window and records its owning process.
	///
	/// The main window only exists once the session has been shown, so
	/// `show` is run first (normally the vendor's `ShowRas`). If no main
	/// window turns up the synchronizer stays unattached and
	/// [`terminate`](Self::terminate) becomes a no-op.
	pub fn attach<F>(&mut self, show: F) -> Result<Option<u32>>
	where
		F: FnOnce() -> Result<()>,
	{
		show()?;

		let Some(main) = find_by_prefix(self.windows.as_ref(), &self.config.main_window_title) else {
			warn!(
				target = "ras.sync",
				title = %self.config.main_window_title,
				"main window not found; session will not be killed on close"
			);
			return Ok(None);
		};

		self.main_window = Some(main.handle);
		self.pid = self.windows.owner_pid(main.handle);
		debug!(target = "ras.sync", title = %main.title, pid = ?self.pid, "attached to main window");

		if self.config.start_hidden {
			self.windows.set_visible(main.handle, false);
		}
		Ok(self.pid)
	}

	/// Blocks until the dialog described by `wait` is gone.
	///
	/// Scans the desktop once, preferring windows that are not in `existing`
	/// (a [`window_snapshot`](Self::window_snapshot) taken before the call).
	/// If nothing matches, returns [`DialogOutcome::NotFound`] immediately. If
	/// `close_immediately` is set, posts a close request and returns.
	/// Otherwise polls visibility every `poll_interval` with no upper bound: a
	/// dialog left open blocks the caller until someone closes it.
	pub fn await_dialog(&self, wait: &WaitDescriptor, existing: &[WindowHandle]) -> DialogOutcome {
		let Some(window) = find_opened_by_title(self.windows.as_ref(), wait.title, existing) else {
			debug!(target = "ras.sync", title = wait.title, "no window to wait for");
			return DialogOutcome::NotFound;
		};

		if wait.close_immediately {
			debug!(target = "ras.sync", title = %window.title, "posting close request");
			self.windows.post_close(window.handle);
			return DialogOutcome::CloseRequested;
		}

		info!(target = "ras.sync", title = %window.title, "waiting for window to close");
		let started = Instant::now();
		loop {
			thread::sleep(self.config.poll_interval);
			if !self.windows.is_visible(window.handle) {
				break;
			}
		}
		let waited = started.elapsed();
		debug!(target = "ras.sync", title = %window.title, waited_ms = waited.as_millis() as u64, "window closed");
		DialogOutcome::Closed { waited }
	}

	/// Handles of the top-level windows open right now.
	pub fn window_snapshot(&self) -> Vec<WindowHandle> {
		self.windows.top_level_windows().into_iter().map(|w| w.handle).collect()
	}

	/// Hides the main window. Returns false if it cannot be found.
	pub fn hide_main_window(&mut self) -> bool {
		self.set_main_visible(false)
	}

	/// Shows the main window. Returns false if it cannot be found.
	pub fn show_main_window(&mut self) -> bool {
		self.set_main_visible(true)
	}

	fn set_main_visible(&mut self, visible: bool) -> bool {
		let handle = match self.main_window {
			Some(handle) => handle,
			None => match find_by_prefix(self.windows.as_ref(), &self.config.main_window_title) {
				Some(info) => {
					self.main_window = Some(info.handle);
					info.handle
				}
				None => {
					debug!(target = "ras.sync", visible, "main window not found");
					return false;
				}
			},
		};
		self.windows.set_visible(handle, visible);
		true
	}

	/// Sleeps the calling thread.
	pub fn pause(&self, duration: Duration) {
		thread::sleep(duration);
	}

	/// Force-kills the attached native process.
	///
	/// Idempotent: once a kill succeeded, or the process was found dead,
	/// later calls report [`TerminateOutcome::AlreadyTerminated`].
	pub fn terminate(&mut self) -> TerminateOutcome {
		if self.terminated {
			return TerminateOutcome::AlreadyTerminated;
		}
		let Some(pid) = self.pid else {
			return TerminateOutcome::NotAttached;
		};

		let outcome = match self.processes.kill(pid) {
			Ok(()) => {
				info!(target = "ras.sync", pid, "terminated native session");
				TerminateOutcome::Killed(pid)
			}
			Err(err) if !self.processes.is_alive(pid) => {
				debug!(target = "ras.sync", pid, error = %err, "native session already gone");
				TerminateOutcome::AlreadyTerminated
			}
			Err(err) => {
				warn!(target = "ras.sync", pid, error = %err, "failed to terminate native session");
				TerminateOutcome::Failed {
					pid,
					reason: err.to_string(),
				}
			}
		};

		self.terminated = true;
		self.main_window = None;
		outcome
	}
}
