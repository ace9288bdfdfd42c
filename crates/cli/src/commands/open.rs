use std::path::{Path, PathBuf};

use anyhow::Context;
use ras::{Controller, VersionTag};
use serde::Serialize;
use tracing::info;

use super::{CommandContext, finish};
use crate::error::Result;

/// What is current in a freshly opened project.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
	pub version: VersionTag,
	pub title: String,
	pub project_file: Option<PathBuf>,
	pub plan_file: Option<PathBuf>,
	pub geom_file: Option<PathBuf>,
	pub steady_file: Option<PathBuf>,
	pub unsteady_file: Option<PathBuf>,
	pub plans: Vec<String>,
}

pub fn execute(ctx: &CommandContext<'_>, project: &Path) -> Result<ProjectSummary> {
	let mut controller = ctx.launch(project)?;
	let summary = summarize(&mut controller);
	finish(controller);
	let summary = summary.with_context(|| format!("reading current files of {}", project.display()))?;
	info!(target = "ras", title = %summary.title, plans = summary.plans.len(), "project opened");
	Ok(summary)
}

pub(crate) fn summarize(controller: &mut Controller) -> ras::Result<ProjectSummary> {
	Ok(ProjectSummary {
		version: controller.version(),
		title: controller.current_project_title()?,
		project_file: controller.current_project_file()?,
		plan_file: controller.current_plan_file()?,
		geom_file: controller.current_geom_file()?,
		steady_file: controller.current_steady_file()?,
		unsteady_file: controller.current_unsteady_file()?,
		plans: controller.plan_names(false)?,
	})
}

#[cfg(test)]
mod tests {
	use std::fs;

	use ras::Value;
	use ras::testing::FakeBackend;
	use tempfile::TempDir;

	use super::*;
	use crate::config::{RasConfig, RuntimeOverrides};
	use crate::error::CliError;

	fn context<'a>(backend: &'a FakeBackend, version: &str) -> CommandContext<'a> {
		let overrides = RuntimeOverrides {
			version: Some(version.into()),
			poll_interval_ms: Some(10),
		};
		CommandContext::new(backend, RasConfig::default().apply(&overrides))
	}

	#[test]
	fn summarizes_current_files_and_plans() {
		let temp = TempDir::new().unwrap();
		let project = temp.path().join("BEAVCREK.prj");
		fs::write(&project, "Proj Title=Beaver Creek\n").unwrap();

		let backend = FakeBackend::all();
		let native = backend.native();
		native.returns("CurrentProjectTitle", "Beaver Creek");
		native.returns("CurrentPlanFile", r"C:\models\BEAVCREK.p01");
		native.on_call("Plan_Names", |args| {
			args[0] = Value::Int(2);
			args[1] = Value::StrSeq(vec!["Steady Flow Run".into(), "Unsteady Run".into()]);
			Ok(Value::Null)
		});

		let summary = execute(&context(&backend, "4.1"), &project).unwrap();
		assert_eq!(summary.version, VersionTag::Ras41);
		assert_eq!(summary.title, "Beaver Creek");
		assert_eq!(summary.plan_file, Some(PathBuf::from(r"C:\models\BEAVCREK.p01")));
		assert_eq!(summary.geom_file, None);
		assert_eq!(summary.plans, ["Steady Flow Run", "Unsteady Run"]);
		assert_eq!(backend.native().call_count("Project_Open"), 1);
		assert_eq!(backend.fake_processes().kills().len(), 1);
	}

	#[test]
	fn missing_project_is_reported_and_session_killed() {
		let temp = TempDir::new().unwrap();
		let backend = FakeBackend::all();

		let err = execute(&context(&backend, "5.0.7"), &temp.path().join("missing.prj")).unwrap_err();
		assert!(matches!(err, CliError::Ras(ras::Error::ProjectNotFound(_))), "{err}");
		assert_eq!(backend.native().call_count("Project_Open"), 0);
		assert_eq!(backend.fake_processes().kills().len(), 1);
	}

	#[test]
	fn uninstalled_release_is_reported_before_the_project() {
		let temp = TempDir::new().unwrap();
		let backend = FakeBackend::new(&[VersionTag::Ras41]);

		let err = execute(&context(&backend, "5.0.7"), &temp.path().join("missing.prj")).unwrap_err();
		assert!(matches!(err, CliError::Ras(ref e) if e.is_backend_unavailable()), "{err}");
	}
}
