//! Data editors.
//!
//! Each editor opens a native window. By default the call blocks until the
//! user closes it; passing `close = true` posts a close request as soon as the
//! window appears, which commits whatever the editor just loaded.

use super::Controller;
use crate::error::Result;
use crate::{DialogOutcome, Value};

fn location(river: &str, reach: &str, rs: &str) -> [Value; 3] {
	[river.into(), reach.into(), rs.into()]
}

impl Controller {
	fn add_then_edit(&mut self, add: &str, edit: &str, river: &str, reach: &str, rs: &str, close: bool) -> Result<()> {
		self.call(add, &location(river, reach, rs))?;
		self.call_window(edit, &location(river, reach, rs), close)?;
		Ok(())
	}

	/// Adds a bridge/culvert at `rs`. The editor has to open and close for the
	/// addition to persist, hence `close` should normally be true.
	pub fn edit_add_bc(&mut self, river: &str, reach: &str, rs: &str, close: bool) -> Result<()> {
		self.add_then_edit("Edit_AddBC", "Edit_BC", river, reach, rs, close)
	}

	/// Adds an inline structure at `rs`.
	pub fn edit_add_iw(&mut self, river: &str, reach: &str, rs: &str, close: bool) -> Result<()> {
		self.add_then_edit("Edit_AddIW", "Edit_IW", river, reach, rs, close)
	}

	/// Adds a lateral structure at `rs`.
	pub fn edit_add_lw(&mut self, river: &str, reach: &str, rs: &str, close: bool) -> Result<()> {
		self.add_then_edit("Edit_AddLW", "Edit_LW", river, reach, rs, close)
	}

	/// Adds a cross section at `rs`.
	pub fn edit_add_xs(&mut self, river: &str, reach: &str, rs: &str, close: bool) -> Result<()> {
		self.add_then_edit("Edit_AddXS", "Edit_XS", river, reach, rs, close)
	}

	pub fn edit_bc(&mut self, river: &str, reach: &str, rs: &str, close: bool) -> Result<DialogOutcome> {
		self.call_window("Edit_BC", &location(river, reach, rs), close)
	}

	pub fn edit_iw(&mut self, river: &str, reach: &str, rs: &str, close: bool) -> Result<DialogOutcome> {
		self.call_window("Edit_IW", &location(river, reach, rs), close)
	}

	pub fn edit_lw(&mut self, river: &str, reach: &str, rs: &str, close: bool) -> Result<DialogOutcome> {
		self.call_window("Edit_LW", &location(river, reach, rs), close)
	}

	pub fn edit_xs(&mut self, river: &str, reach: &str, rs: &str, close: bool) -> Result<DialogOutcome> {
		self.call_window("Edit_XS", &location(river, reach, rs), close)
	}

	pub fn edit_geometric_data(&mut self) -> Result<DialogOutcome> {
		self.call_window("Edit_GeometricData", &[], false)
	}

	pub fn edit_multiple_run(&mut self) -> Result<DialogOutcome> {
		self.call_window("Edit_MultipleRun", &[], false)
	}

	pub fn edit_plan_data(&mut self) -> Result<DialogOutcome> {
		self.call_window("Edit_PlanData", &[], false)
	}

	pub fn edit_quasi_unsteady_flow_data(&mut self) -> Result<DialogOutcome> {
		self.call_window("Edit_QuasiUnsteadyFlowData", &[], false)
	}

	pub fn edit_sediment_data(&mut self) -> Result<DialogOutcome> {
		self.call_window("Edit_SedimentData", &[], false)
	}

	pub fn edit_steady_flow_data(&mut self) -> Result<DialogOutcome> {
		self.call_window("Edit_SteadyFlowData", &[], false)
	}

	pub fn edit_unsteady_flow_data(&mut self) -> Result<DialogOutcome> {
		self.call_window("Edit_UnsteadyFlowData", &[], false)
	}

	pub fn edit_water_quality_data(&mut self) -> Result<DialogOutcome> {
		self.call_window("Edit_WaterQualityData", &[], false)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::FakeBackend;

	#[test]
	fn inline_structure_editor_is_opened_after_adding() {
		let backend = FakeBackend::all();
		let mut controller = Controller::launch("5.0.7", &backend).unwrap();
		let pid = controller.pid().unwrap();
		backend
			.native()
			.opens_window("Edit_IW", backend.fake_windows(), "Inline Structure Data - Beaver Creek", pid);

		controller.edit_add_iw("Beaver Creek", "Kentwood", "5.39", true).unwrap();

		assert_eq!(backend.native().methods(), ["ShowRas", "Edit_AddIW", "Edit_IW"]);
		assert!(backend.fake_windows().titles().iter().all(|t| !t.starts_with("Inline Structure Data")));
	}

	#[test]
	fn closing_editor_without_window_is_not_an_error() {
		let backend = FakeBackend::all();
		let mut controller = Controller::launch("4.1", &backend).unwrap();

		let outcome = controller.edit_xs("Beaver Creek", "Kentwood", "5.99", true).unwrap();
		assert_eq!(outcome, DialogOutcome::NotFound);
	}
}
