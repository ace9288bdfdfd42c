//! Running plans.

use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use super::Controller;
use crate::Value;
use crate::error::Result;

/// Outcome of [`Controller::compute_current_plan`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComputeReport {
	pub success: bool,
	/// Computation messages, in the order the vendor reported them.
	pub messages: Vec<String>,
}

impl Controller {
	/// Runs the current plan.
	///
	/// `blocking` is forwarded as `BlockingMode` where the release accepts it
	/// (5.0 and later). Earlier releases always block.
	pub fn compute_current_plan(&mut self, blocking: bool) -> Result<ComputeReport> {
		let cap = self.capabilities.require("Compute_CurrentPlan")?;
		let args = if cap.signature.has_param("BlockingMode") {
			vec![Value::Bool(blocking)]
		} else {
			if !blocking {
				debug!(target = "ras", version = %self.version(), "non-blocking compute not available; blocking");
			}
			Vec::new()
		};

		info!(target = "ras", blocking, "computing current plan");
		let mut out = self.call("Compute_CurrentPlan", &args)?;
		let success = out.ret_bool()?;
		let messages = out.counted_strings("nmsg", "Msg")?;
		Ok(ComputeReport { success, messages })
	}

	/// Returns true once a non-blocking computation has finished (5.0+).
	pub fn compute_complete(&mut self) -> Result<bool> {
		self.call("Compute_Complete", &[])?.ret_bool()
	}

	/// Returns true while a computation is running (4.1 only).
	pub fn compute_is_still_computing(&mut self) -> Result<bool> {
		self.call("Compute_IsStillComputing", &[])?.ret_bool()
	}

	/// Cancels a running computation (4.1 only).
	pub fn compute_cancel(&mut self) -> Result<()> {
		self.call("Compute_Cancel", &[]).map(|_| ())
	}

	pub fn compute_started_from_controller(&mut self) -> Result<bool> {
		self.call("Compute_StartedFromController", &[])?.ret_bool()
	}

	pub fn compute_hide_window(&mut self) -> Result<()> {
		self.call("Compute_HideComputationWindow", &[]).map(|_| ())
	}

	pub fn compute_show_window(&mut self) -> Result<()> {
		self.call("Compute_ShowComputationWindow", &[]).map(|_| ())
	}

	/// Blocks until the running computation finishes, polling at the
	/// synchronizer interval. Returns the time spent waiting.
	///
	/// Uses `Compute_Complete` where available and falls back to
	/// `Compute_IsStillComputing` on 4.1.
	pub fn wait_for_compute(&mut self) -> Result<Duration> {
		let started = Instant::now();
		let interval = self.sync_config().poll_interval;
		let use_complete = self.supports("Compute_Complete");
		loop {
			let done = if use_complete {
				self.compute_complete()?
			} else {
				!self.compute_is_still_computing()?
			};
			if done {
				break;
			}
			thread::sleep(interval);
		}
		let waited = started.elapsed();
		debug!(target = "ras", waited_ms = waited.as_millis() as u64, "computation finished");
		Ok(waited)
	}
}
