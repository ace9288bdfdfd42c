//! Process lifecycle for native sessions.
//!
//! The primary shutdown path kills the process id recorded when a session
//! attached to its main window. [`kill_all_by_name`] is a coarse cleanup
//! utility for sessions that were never attached or that leaked.

use std::io;
use std::process::{Command, Stdio};

use tracing::{debug, warn};

/// Executable name of the HEC-RAS user interface process.
pub const RAS_PROCESS_NAME: &str = "ras.exe";

/// Force-kill and lookup of OS processes.
pub trait ProcessControl: Send + Sync {
	/// Force-kills `pid`.
	fn kill(&self, pid: u32) -> io::Result<()>;

	fn is_alive(&self, pid: u32) -> bool;

	/// Process ids whose executable name equals `name` (case-insensitive).
	fn pids_by_name(&self, name: &str) -> io::Result<Vec<u32>>;
}

/// [`ProcessControl`] backed by the platform's process tools
/// (`taskkill`/`tasklist` on Windows, `kill`/`pgrep` elsewhere).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcesses;

impl ProcessControl for SystemProcesses {
	fn kill(&self, pid: u32) -> io::Result<()> {
		#[cfg(windows)]
		let status = Command::new("taskkill")
			.args(["/PID", &pid.to_string(), "/F"])
			.stdout(Stdio::null())
			.stderr(Stdio::null())
			.status()?;

		#[cfg(not(windows))]
		let status = Command::new("kill")
			.args(["-KILL", &pid.to_string()])
			.stdout(Stdio::null())
			.stderr(Stdio::null())
			.status()?;

		if status.success() {
			Ok(())
		} else {
			Err(io::Error::other(format!("kill of pid {pid} exited with {status}")))
		}
	}

	fn is_alive(&self, pid: u32) -> bool {
		#[cfg(windows)]
		{
			let filter = format!("PID eq {pid}");
			Command::new("tasklist")
				.args(["/FI", &filter, "/FO", "CSV", "/NH"])
				.output()
				.map(|out| !parse_tasklist_csv(&String::from_utf8_lossy(&out.stdout)).is_empty())
				.unwrap_or(false)
		}

		#[cfg(not(windows))]
		{
			Command::new("kill")
				.args(["-0", &pid.to_string()])
				.stdout(Stdio::null())
				.stderr(Stdio::null())
				.status()
				.map(|status| status.success())
				.unwrap_or(false)
		}
	}

	fn pids_by_name(&self, name: &str) -> io::Result<Vec<u32>> {
		#[cfg(windows)]
		{
			let output = Command::new("tasklist").args(["/FO", "CSV", "/NH"]).output()?;
			let listing = String::from_utf8_lossy(&output.stdout);
			Ok(parse_tasklist_csv(&listing)
				.into_iter()
				.filter(|(image, _)| image.eq_ignore_ascii_case(name))
				.map(|(_, pid)| pid)
				.collect())
		}

		#[cfg(not(windows))]
		{
			let output = Command::new("pgrep").args(["-x", name]).output()?;
			// pgrep exits 1 when nothing matches
			if !output.status.success() && output.status.code() != Some(1) {
				return Err(io::Error::other(format!("pgrep exited with {}", output.status)));
			}
			Ok(String::from_utf8_lossy(&output.stdout)
				.lines()
				.filter_map(|line| line.trim().parse().ok())
				.collect())
		}
	}
}

/// Parses `tasklist /FO CSV` output into `(image name, pid)` pairs.
///
/// Header rows and the "no tasks" info line are skipped.
pub fn parse_tasklist_csv(listing: &str) -> Vec<(String, u32)> {
	listing
		.lines()
		.filter_map(|line| {
			let line = line.trim();
			let inner = line.strip_prefix('"')?.strip_suffix('"')?;
			let mut fields = inner.split("\",\"");
			let image = fields.next()?;
			let pid = fields.next()?.parse().ok()?;
			Some((image.to_string(), pid))
		})
		.collect()
}

/// Force-kills every process named `name`. Best effort: failures are logged
/// and skipped. Returns the pids that were killed.
pub fn kill_all_by_name(processes: &dyn ProcessControl, name: &str) -> Vec<u32> {
	let pids = match processes.pids_by_name(name) {
		Ok(pids) => pids,
		Err(err) => {
			warn!(target = "ras", name, error = %err, "could not enumerate processes");
			return Vec::new();
		}
	};

	let mut killed = Vec::with_capacity(pids.len());
	for pid in pids {
		match processes.kill(pid) {
			Ok(()) => {
				debug!(target = "ras", pid, name, "killed process");
				killed.push(pid);
			}
			Err(err) => warn!(target = "ras", pid, name, error = %err, "failed to kill process"),
		}
	}
	killed
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::FakeProcesses;

	#[test]
	fn parses_tasklist_rows() {
		let listing = "\"System Idle Process\",\"0\",\"Services\",\"0\",\"8 K\"\r\n\
		               \"ras.exe\",\"4242\",\"Console\",\"1\",\"120,000 K\"\r\n\
		               INFO: No tasks are running which match the specified criteria.\r\n";
		let rows = parse_tasklist_csv(listing);
		assert_eq!(rows, vec![("System Idle Process".to_string(), 0), ("ras.exe".to_string(), 4242)]);
	}

	#[test]
	fn kill_all_by_name_kills_only_matches() {
		let processes = FakeProcesses::new();
		processes.spawn(10, "ras.exe");
		processes.spawn(11, "RAS.EXE");
		processes.spawn(12, "explorer.exe");

		let mut killed = kill_all_by_name(&processes, RAS_PROCESS_NAME);
		killed.sort_unstable();
		assert_eq!(killed, vec![10, 11]);
		assert!(processes.is_alive(12));
		assert!(!processes.is_alive(10));
	}

	#[test]
	fn kill_all_by_name_with_no_matches_is_empty() {
		let processes = FakeProcesses::new();
		assert!(kill_all_by_name(&processes, RAS_PROCESS_NAME).is_empty());
	}
}
