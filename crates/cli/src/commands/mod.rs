mod call;
mod capabilities;
mod compute;
mod kill;
mod open;
mod versions;

use std::path::Path;
use std::time::Instant;

use ras::{Backend, Controller, TerminateOutcome};
use serde::Serialize;
use tracing::{debug, warn};

use crate::cli::{Cli, Commands};
use crate::config::{EffectiveConfig, RasConfig, RuntimeOverrides};
use crate::error::Result;
use crate::output::{CommandInputs, DiagnosticLevel, OutputFormat, ResultBuilder, print_result};

/// What every command runs against.
pub struct CommandContext<'a> {
	pub backend: &'a dyn Backend,
	pub config: EffectiveConfig,
}

impl<'a> CommandContext<'a> {
	pub fn new(backend: &'a dyn Backend, config: EffectiveConfig) -> Self {
		Self { backend, config }
	}

	/// Launches the configured release and opens `project` in it.
	pub fn launch(&self, project: &Path) -> Result<Controller> {
		let controller = Controller::builder(self.config.version.as_str())
			.config(self.config.sync.clone())
			.project(project)
			.launch(self.backend)?;
		Ok(controller)
	}
}

/// Payload of a successful command, with any messages HEC-RAS reported.
#[derive(Debug)]
pub struct Outcome<T> {
	pub data: T,
	pub messages: Vec<String>,
}

impl<T> From<T> for Outcome<T> {
	fn from(data: T) -> Self {
		Self {
			data,
			messages: Vec::new(),
		}
	}
}

pub fn dispatch(cli: Cli, backend: &dyn Backend) -> Result<()> {
	let started = Instant::now();
	let format = cli.format;
	let overrides = RuntimeOverrides {
		version: command_version(&cli.command),
		poll_interval_ms: cli.poll_ms,
	};
	let config = RasConfig::load(cli.config.as_deref())?.apply(&overrides);
	debug!(target = "ras", version = %config.version, poll_ms = config.sync.poll_interval.as_millis() as u64, "effective configuration");

	let ctx = CommandContext::new(backend, config);
	let name = cli.command.name();
	let inputs = inputs_for(&cli.command, &ctx.config);

	match cli.command {
		Commands::Versions => emit(name, inputs, started, format, Outcome::from(versions::execute(&ctx))),
		Commands::Capabilities { tag, diff } => {
			emit(name, inputs, started, format, Outcome::from(capabilities::execute(&tag, diff.as_deref())?))
		}
		Commands::Open { project, .. } => emit(name, inputs, started, format, Outcome::from(open::execute(&ctx, &project)?)),
		Commands::Compute {
			project,
			plan,
			show_window,
			..
		} => emit(
			name,
			inputs,
			started,
			format,
			compute::execute(&ctx, &project, plan.as_deref(), show_window)?,
		),
		Commands::Call {
			project,
			operation,
			args,
			..
		} => emit(
			name,
			inputs,
			started,
			format,
			Outcome::from(call::execute(&ctx, &project, &operation, &args)?),
		),
		Commands::Kill => emit(name, inputs, started, format, Outcome::from(kill::execute(&ctx))),
	}
	Ok(())
}

fn command_version(command: &Commands) -> Option<String> {
	match command {
		Commands::Open { version, .. } | Commands::Compute { version, .. } | Commands::Call { version, .. } => {
			version.clone()
		}
		_ => None,
	}
}

/// Builds the inputs block before the command consumes its arguments.
pub fn inputs_for(command: &Commands, config: &EffectiveConfig) -> Option<CommandInputs> {
	let inputs = match command {
		Commands::Versions | Commands::Kill => return None,
		Commands::Capabilities { tag, diff } => CommandInputs {
			version: Some(tag.clone()),
			extra: diff.as_ref().map(|d| serde_json::json!({ "diff": d })),
			..Default::default()
		},
		Commands::Open { project, .. } => CommandInputs {
			project: Some(project.clone()),
			version: Some(config.version.clone()),
			..Default::default()
		},
		Commands::Compute { project, plan, .. } => CommandInputs {
			project: Some(project.clone()),
			version: Some(config.version.clone()),
			extra: plan.as_ref().map(|p| serde_json::json!({ "plan": p })),
			..Default::default()
		},
		Commands::Call { project, operation, .. } => CommandInputs {
			project: Some(project.clone()),
			version: Some(config.version.clone()),
			operation: Some(operation.clone()),
			..Default::default()
		},
	};
	Some(inputs)
}

fn emit<T: Serialize>(
	command: &str,
	inputs: Option<CommandInputs>,
	started: Instant,
	format: OutputFormat,
	outcome: Outcome<T>,
) {
	let mut builder = ResultBuilder::new(command).started_at(started).data(outcome.data);
	if let Some(inputs) = inputs {
		builder = builder.inputs(inputs);
	}
	for message in outcome.messages {
		builder = builder.diagnostic(DiagnosticLevel::Info, message);
	}
	print_result(&builder.build(), format);
}

/// Shuts the session down, logging a failed kill instead of failing the command.
pub(crate) fn finish(controller: Controller) {
	match controller.close() {
		TerminateOutcome::Failed { pid, reason } => {
			warn!(target = "ras", pid, %reason, "HEC-RAS process could not be killed");
		}
		outcome => debug!(target = "ras", ?outcome, "session closed"),
	}
}
