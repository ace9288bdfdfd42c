use std::path::{Path, PathBuf};

use ras::Controller;
use serde::Serialize;
use tracing::{info, warn};

use super::{CommandContext, Outcome, finish};
use crate::error::{CliError, Result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeData {
	pub success: bool,
	pub plan_file: Option<PathBuf>,
	pub message_count: usize,
}

pub fn execute(
	ctx: &CommandContext<'_>,
	project: &Path,
	plan: Option<&str>,
	show_window: bool,
) -> Result<Outcome<ComputeData>> {
	let mut controller = ctx.launch(project)?;
	let result = run(&mut controller, plan, show_window);
	finish(controller);
	result
}

fn run(controller: &mut Controller, plan: Option<&str>, show_window: bool) -> Result<Outcome<ComputeData>> {
	if let Some(plan) = plan {
		if !controller.plan_set_current(plan)? {
			return Err(CliError::InvalidInput(format!("no plan named '{plan}' in this project")));
		}
	}
	if !show_window && controller.supports("Compute_HideComputationWindow") {
		controller.compute_hide_window()?;
	}

	let plan_file = controller.current_plan_file()?;
	let report = controller.compute_current_plan(true)?;
	if report.success {
		info!(target = "ras", messages = report.messages.len(), "computation finished");
	} else {
		warn!(target = "ras", messages = report.messages.len(), "computation reported failure");
	}

	Ok(Outcome {
		data: ComputeData {
			success: report.success,
			plan_file,
			message_count: report.messages.len(),
		},
		messages: report.messages,
	})
}
