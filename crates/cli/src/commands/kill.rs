use ras::kill_all_by_name;
use serde::Serialize;
use tracing::info;

use super::CommandContext;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KillData {
	pub process_name: String,
	pub killed: Vec<u32>,
}

pub fn execute(ctx: &CommandContext<'_>) -> KillData {
	let name = ctx.config.sync.process_name.clone();
	let killed = kill_all_by_name(ctx.backend.processes().as_ref(), &name);
	info!(target = "ras", process = %name, count = killed.len(), "killed HEC-RAS processes");
	KillData {
		process_name: name,
		killed,
	}
}
