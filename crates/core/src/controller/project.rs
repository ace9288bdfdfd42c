//! Project files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::Controller;
use crate::Value;
use crate::error::{Error, Result};

/// Suffix the vendor appends to the project name for GIS exports.
pub const GIS_EXPORT_SUFFIX: &str = ".RASexport.sdf";

/// Absolute path of an existing project file.
///
/// # Errors
///
/// [`Error::ProjectNotFound`] if `path` is not a regular file.
pub fn existing_project(path: &Path) -> Result<PathBuf> {
	if !path.is_file() {
		return Err(Error::ProjectNotFound(path.to_path_buf()));
	}
	Ok(std::path::absolute(path)?)
}

/// Absolute path for a file about to be written, creating its directory.
pub fn prepare_target(path: &Path) -> Result<PathBuf> {
	let full = std::path::absolute(path)?;
	if let Some(dir) = full.parent().filter(|dir| !dir.is_dir()) {
		debug!(target = "ras", dir = %dir.display(), "creating project directory");
		fs::create_dir_all(dir)?;
	}
	Ok(full)
}

/// Path of the GIS export written next to `project_file`.
///
/// The export is named after the project file up to its first dot.
pub fn gis_export_path(project_file: &Path) -> PathBuf {
	let name = project_file.file_name().and_then(|n| n.to_str()).unwrap_or_default();
	let stem = name.split('.').next().unwrap_or_default();
	let dir = project_file.parent().unwrap_or_else(|| Path::new(""));
	dir.join(format!("{stem}{GIS_EXPORT_SUFFIX}"))
}

fn path_value(path: &Path) -> Value {
	Value::Str(path.to_string_lossy().into_owned())
}

impl Controller {
	/// Opens an existing project.
	///
	/// # Errors
	///
	/// [`Error::ProjectNotFound`] before any native call if `path` is not an
	/// existing file.
	pub fn project_open(&mut self, path: impl AsRef<Path>) -> Result<()> {
		let full = existing_project(path.as_ref())?;
		info!(target = "ras", project = %full.display(), "opening project");
		self.call("Project_Open", &[path_value(&full)])?;
		Ok(())
	}

	/// Creates a new project, creating its directory if needed.
	pub fn project_new(&mut self, title: &str, path: impl AsRef<Path>) -> Result<PathBuf> {
		let full = prepare_target(path.as_ref())?;
		self.call("Project_New", &[title.into(), path_value(&full)])?;
		Ok(full)
	}

	pub fn project_save(&mut self) -> Result<()> {
		self.call("Project_Save", &[]).map(|_| ())
	}

	/// Saves the current project under a new name, creating its directory if
	/// needed.
	pub fn project_save_as(&mut self, path: impl AsRef<Path>) -> Result<PathBuf> {
		let full = prepare_target(path.as_ref())?;
		self.call("Project_SaveAs", &[path_value(&full)])?;
		Ok(full)
	}

	/// Title of the current project.
	pub fn project_current(&mut self) -> Result<String> {
		self.call("Project_Current", &[])?.ret_string()
	}

	/// Exports the current project to GIS and returns the export path.
	pub fn export_gis(&mut self) -> Result<PathBuf> {
		let project = self.current_project_file()?.ok_or_else(|| {
			Error::InvalidArgument("ExportGIS requires an open project".to_string())
		})?;
		let target = gis_export_path(&project);
		self.call("ExportGIS", &[])?;
		Ok(target)
	}

	pub fn map_add(&mut self, path: impl AsRef<Path>) -> Result<()> {
		self.call("Map_Add", &[path_value(path.as_ref())]).map(|_| ())
	}

	/// Release reported by the running application, e.g. `"5.0.7"`.
	pub fn ras_version(&mut self) -> Result<String> {
		self.call("GetRASVersion", &[])?.ret_string()
	}

	/// Version string of the controller type library.
	pub fn hecras_version(&mut self) -> Result<String> {
		self.call("HECRASVersion", &[])?.ret_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn gis_export_is_named_after_project_stem() {
		let path = gis_export_path(Path::new("/data/bvr/BEAVCREK.prj"));
		assert_eq!(path, Path::new("/data/bvr/BEAVCREK.RASexport.sdf"));
	}

	#[test]
	fn gis_export_stops_at_first_dot() {
		let path = gis_export_path(Path::new("/data/Bald.Lat.prj"));
		assert_eq!(path, Path::new("/data/Bald.RASexport.sdf"));
	}

	#[test]
	fn missing_project_is_reported_with_its_path() {
		let err = existing_project(Path::new("/definitely/not/here.prj")).unwrap_err();
		assert!(matches!(err, Error::ProjectNotFound(ref p) if p == Path::new("/definitely/not/here.prj")));
	}

	#[test]
	fn directories_are_not_projects() {
		let dir = tempfile::tempdir().unwrap();
		assert!(matches!(existing_project(dir.path()), Err(Error::ProjectNotFound(_))));
	}

	#[test]
	fn prepare_target_creates_missing_directories() {
		let dir = tempfile::tempdir().unwrap();
		let target = dir.path().join("nested/deeper/new.prj");
		let full = prepare_target(&target).unwrap();
		assert!(full.parent().unwrap().is_dir());
		assert!(full.is_absolute());
	}
}
