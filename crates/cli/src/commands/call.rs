use std::path::Path;

use ras::{CallOutput, Value};

use super::{CommandContext, finish};
use crate::error::{CliError, Result};

/// Parses `--args`: a JSON array whose items become the operation's inputs.
pub fn parse_args(json: &str) -> Result<Vec<Value>> {
	serde_json::from_str(json).map_err(|err| CliError::InvalidInput(format!("--args must be a JSON array: {err}")))
}

pub fn execute(ctx: &CommandContext<'_>, project: &Path, operation: &str, args: &str) -> Result<CallOutput> {
	let args = parse_args(args)?;
	let mut controller = ctx.launch(project)?;
	let result = controller.call(operation, &args);
	finish(controller);
	Ok(result?)
}

#[cfg(test)]
mod tests {
	use std::fs;
	use std::path::PathBuf;

	use ras::testing::FakeBackend;
	use tempfile::TempDir;

	use super::*;
	use crate::config::{RasConfig, RuntimeOverrides};

	fn setup(version: &str) -> (TempDir, PathBuf, FakeBackend, RasConfig, RuntimeOverrides) {
		let temp = TempDir::new().unwrap();
		let project = temp.path().join("BEAVCREK.prj");
		fs::write(&project, "").unwrap();
		let overrides = RuntimeOverrides {
			version: Some(version.into()),
			poll_interval_ms: None,
		};
		(temp, project, FakeBackend::all(), RasConfig::default(), overrides)
	}

	#[test]
	fn args_must_be_an_array() {
		assert_eq!(parse_args("[]").unwrap(), Vec::<Value>::new());
		assert_eq!(
			parse_args(r#"["Beaver Creek", 1, true]"#).unwrap(),
			[Value::Str("Beaver Creek".into()), Value::Int(1), Value::Bool(true)]
		);
		assert!(matches!(parse_args(r#"{"river": 1}"#), Err(CliError::InvalidInput(_))));
	}

	#[test]
	fn returns_outputs_of_the_call() {
		let (_temp, project, backend, config, overrides) = setup("5.0.7");
		backend.native().on_call("Geometry_GetReaches", |args| {
			args[1] = Value::Int(1);
			args[2] = Value::StrSeq(vec!["Kentwood".into()]);
			Ok(Value::Null)
		});
		let ctx = CommandContext::new(&backend, config.apply(&overrides));

		let out = execute(&ctx, &project, "Geometry_GetReaches", "[1]").unwrap();
		assert_eq!(out.operation, "Geometry_GetReaches");
		assert_eq!(out.output("nReach"), Some(&Value::Int(1)));
	}

	#[test]
	fn unsupported_operation_is_refused_for_the_release() {
		let (_temp, project, backend, config, overrides) = setup("4.1");
		let ctx = CommandContext::new(&backend, config.apply(&overrides));

		let err = execute(&ctx, &project, "QuitRas", "[]").unwrap_err();
		assert!(matches!(err, CliError::Ras(ref e) if e.is_unsupported()), "{err}");
		assert_eq!(backend.native().call_count("QuitRas"), 0);
		assert_eq!(backend.fake_processes().kills().len(), 1);
	}
}
