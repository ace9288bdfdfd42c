//! Plans, plan output and DSS data locations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::Controller;
use crate::Value;
use crate::error::{Error, Result};

/// A DSS record a plan reads from or writes to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataLocation {
	/// Location description; empty for output locations.
	#[serde(default)]
	pub description: String,
	pub dss_file: String,
	pub dss_pathname: String,
}

impl Controller {
	/// File of the plan titled `plan`, `None` if there is no such plan.
	pub fn plan_get_filename(&mut self, plan: &str) -> Result<Option<PathBuf>> {
		let path = self.call("Plan_GetFilename", &[plan.into()])?.ret_string()?;
		Ok((!path.is_empty()).then(|| PathBuf::from(path)))
	}

	/// Plan titles of the current project.
	///
	/// With `base_directory_only`, plans stored outside the project directory
	/// are left out.
	pub fn plan_names(&mut self, base_directory_only: bool) -> Result<Vec<String>> {
		let mut out = self.call("Plan_Names", &[base_directory_only.into()])?;
		out.counted_strings("PlanCount", "PlanNames")
	}

	pub fn plan_reports(&mut self) -> Result<Vec<String>> {
		let mut out = self.call("Plan_Reports", &[])?;
		out.counted_strings("ReportCount", "ReportNames")
	}

	/// Makes `plan` the current plan. Returns false if there is no such plan.
	pub fn plan_set_current(&mut self, plan: &str) -> Result<bool> {
		self.call("Plan_SetCurrent", &[plan.into()])?.ret_bool()
	}

	/// Returns true if the output of `plan` is up to date with its inputs.
	pub fn plan_output_is_current(&mut self, plan: &str, show_messages: bool) -> Result<bool> {
		self.call("PlanOutput_IsCurrent", &[plan.into(), show_messages.into()])?
			.ret_bool()
	}

	pub fn plan_output_set_current(&mut self, plan: &str) -> Result<bool> {
		self.call("PlanOutput_SetCurrent", &[plan.into()])?.ret_bool()
	}

	/// Loads the output of several plans at once. Returns the number of plans
	/// the vendor accepted.
	pub fn plan_output_set_multiple(&mut self, plans: &[&str], show_messages: bool) -> Result<i64> {
		let args: Vec<Value> = vec![Value::Int(plans.len() as i64), plans.into(), show_messages.into()];
		self.call("PlanOutput_SetMultiple", &args)?.ret_i64()
	}

	/// Input data locations of `plan` (4.1 only).
	pub fn get_data_locations_input(&mut self, plan: &str) -> Result<Vec<DataLocation>> {
		let mut out = self.call("GetDataLocations_Input", &[plan.into()])?;
		let n = out.ret_i64()?.max(0) as usize;
		let descriptions = out.strings("LocationDescriptions")?;
		let files = out.strings("DSSFiles")?;
		let pathnames = out.strings("DSSPathnames")?;
		Ok(zip_locations(n, descriptions, files, pathnames))
	}

	/// Output data locations of `plan` (4.1 only).
	pub fn get_data_locations_output(&mut self, plan: &str) -> Result<Vec<DataLocation>> {
		let mut out = self.call("GetDataLocations_Output", &[plan.into()])?;
		let n = out.ret_i64()?.max(0) as usize;
		let files = out.strings("DSSFiles")?;
		let pathnames = out.strings("DSSPathnames")?;
		Ok(zip_locations(n, Vec::new(), files, pathnames))
	}

	pub fn get_data_locations_input_count(&mut self, plan: &str) -> Result<i64> {
		self.call("GetDataLocations_Input_count", &[plan.into()])?.ret_i64()
	}

	pub fn get_data_locations_output_count(&mut self, plan: &str) -> Result<i64> {
		self.call("GetDataLocations_Output_count", &[plan.into()])?.ret_i64()
	}

	/// Replaces the input data locations of `plan` (4.1 only).
	pub fn set_data_locations(&mut self, plan: &str, locations: &[DataLocation]) -> Result<i64> {
		if locations.is_empty() {
			return Err(Error::InvalidArgument("SetDataLocations needs at least one location".to_string()));
		}
		let descriptions = locations.iter().map(|l| l.description.clone()).collect();
		let files = locations.iter().map(|l| l.dss_file.clone()).collect();
		let pathnames = locations.iter().map(|l| l.dss_pathname.clone()).collect();
		let args: Vec<Value> = vec![
			plan.into(),
			Value::Int(locations.len() as i64),
			Value::StrSeq(descriptions),
			Value::StrSeq(files),
			Value::StrSeq(pathnames),
		];
		self.call("SetDataLocations", &args)?.ret_i64()
	}
}

fn zip_locations(n: usize, descriptions: Vec<String>, files: Vec<String>, pathnames: Vec<String>) -> Vec<DataLocation> {
	let mut descriptions = descriptions.into_iter();
	let mut pathnames = pathnames.into_iter();
	files
		.into_iter()
		.take(n)
		.map(|dss_file| DataLocation {
			description: descriptions.next().unwrap_or_default(),
			dss_file,
			dss_pathname: pathnames.next().unwrap_or_default(),
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::FakeBackend;

	fn controller(tag: &str) -> (FakeBackend, Controller) {
		let backend = FakeBackend::all();
		let controller = Controller::launch(tag, &backend).unwrap();
		(backend, controller)
	}

	#[test]
	fn plan_names_follow_reported_count() {
		let (backend, mut controller) = controller("5.0.7");
		backend.native().on_call("Plan_Names", |args| {
			args[0] = Value::Int(2);
			args[1] = Value::StrSeq(vec!["Steady Flow Run".into(), "Unsteady Run".into(), String::new()]);
			Ok(Value::Null)
		});

		assert_eq!(controller.plan_names(true).unwrap(), ["Steady Flow Run", "Unsteady Run"]);
		let sent = backend.native().last_call("Plan_Names").unwrap();
		assert_eq!(sent.args[2], Value::Bool(true));
	}

	#[test]
	fn unknown_plan_has_no_file() {
		let (backend, mut controller) = controller("4.1");
		backend.native().returns("Plan_GetFilename", "");
		assert_eq!(controller.plan_get_filename("Nope").unwrap(), None);
	}

	#[test]
	fn multiple_plan_output_sends_count_and_titles() {
		let (backend, mut controller) = controller("5.0");
		backend.native().returns("PlanOutput_SetMultiple", 2i64);

		let accepted = controller.plan_output_set_multiple(&["Plan A", "Plan B"], false).unwrap();
		assert_eq!(accepted, 2);
		let sent = backend.native().last_call("PlanOutput_SetMultiple").unwrap();
		assert_eq!(sent.args[0], Value::Int(2));
		assert_eq!(sent.args[1], Value::StrSeq(vec!["Plan A".into(), "Plan B".into()]));
	}

	#[test]
	fn output_locations_read_back_files_and_pathnames() {
		let (backend, mut controller) = controller("4.1");
		backend.native().on_call("GetDataLocations_Output", |args| {
			args[1] = Value::StrSeq(vec!["bvr.dss".into()]);
			args[2] = Value::StrSeq(vec!["/BEAVER/KENTWOOD/FLOW//1HOUR/RUN/".into()]);
			Ok(Value::Int(1))
		});

		let locations = controller.get_data_locations_output("Unsteady Run").unwrap();
		assert_eq!(
			locations,
			[DataLocation {
				description: String::new(),
				dss_file: "bvr.dss".into(),
				dss_pathname: "/BEAVER/KENTWOOD/FLOW//1HOUR/RUN/".into(),
			}]
		);
	}

	#[test]
	fn data_locations_are_gone_in_50() {
		let (backend, mut controller) = controller("5.0");
		assert!(controller.get_data_locations_input_count("Run").unwrap_err().is_unsupported());
		assert_eq!(backend.native().call_count("GetDataLocations_Input_count"), 0);
	}

	#[test]
	fn set_data_locations_sends_columns() {
		let (backend, mut controller) = controller("4.1");
		backend.native().returns("SetDataLocations", 1i64);
		let location = DataLocation {
			description: "Beaver Creek Kentwood 5.99".into(),
			dss_file: "bvr.dss".into(),
			dss_pathname: "/BEAVER/5.99/FLOW//1HOUR/OBS/".into(),
		};

		assert_eq!(controller.set_data_locations("Unsteady Run", &[location]).unwrap(), 1);
		let sent = backend.native().last_call("SetDataLocations").unwrap();
		assert_eq!(sent.args[1], Value::Int(1));
		assert_eq!(sent.args[3], Value::StrSeq(vec!["bvr.dss".into()]));
	}
}
