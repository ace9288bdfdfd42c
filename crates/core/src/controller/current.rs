//! Files of the current project.

use std::path::PathBuf;

use super::Controller;
use crate::error::Result;

impl Controller {
	fn current_file(&mut self, operation: &str) -> Result<Option<PathBuf>> {
		let path = self.call(operation, &[])?.ret_string()?;
		Ok((!path.is_empty()).then(|| PathBuf::from(path)))
	}

	pub fn current_geom_file(&mut self) -> Result<Option<PathBuf>> {
		self.current_file("CurrentGeomFile")
	}

	pub fn current_plan_file(&mut self) -> Result<Option<PathBuf>> {
		self.current_file("CurrentPlanFile")
	}

	/// Full path of the open project, `None` if nothing is open.
	pub fn current_project_file(&mut self) -> Result<Option<PathBuf>> {
		self.current_file("CurrentProjectFile")
	}

	pub fn current_project_title(&mut self) -> Result<String> {
		self.call("CurrentProjectTitle", &[])?.ret_string()
	}

	pub fn current_steady_file(&mut self) -> Result<Option<PathBuf>> {
		self.current_file("CurrentSteadyFile")
	}

	pub fn current_unsteady_file(&mut self) -> Result<Option<PathBuf>> {
		self.current_file("CurrentUnSteadyFile")
	}
}
