//! Steady and unsteady flow data.

use super::Controller;
use crate::Value;
use crate::error::{Error, Result};

impl Controller {
	/// Removes every flow from the current steady flow file.
	pub fn steady_clear_flow_data(&mut self) -> Result<()> {
		self.call("SteadyFlow_ClearFlowData", &[]).map(|_| ())
	}

	/// Sets a fixed water surface boundary, one elevation per profile.
	pub fn steady_fixed_ws_boundary(&mut self, river: &str, reach: &str, downstream: bool, ws: &[f64]) -> Result<()> {
		let args: Vec<Value> = vec![river.into(), reach.into(), downstream.into(), ws.into()];
		self.call("SteadyFlow_FixedWSBoundary", &args).map(|_| ())
	}

	/// Number of profiles in the current steady flow file.
	pub fn steady_profile_count(&mut self) -> Result<i64> {
		self.call("SteadyFlow_nProfile", &[])?.ret_i64()
	}

	/// Sets the flow at `rs`, one value per profile.
	pub fn steady_set_flow(&mut self, river: &str, reach: &str, rs: &str, flows: &[f64]) -> Result<()> {
		if flows.is_empty() {
			return Err(Error::InvalidArgument("SteadyFlow_SetFlow needs one flow per profile".to_string()));
		}
		let args: Vec<Value> = vec![river.into(), reach.into(), rs.into(), flows.into()];
		self.call("SteadyFlow_SetFlow", &args).map(|_| ())
	}

	/// Sets a constant gate opening for an unsteady run.
	pub fn unsteady_set_gate_opening_constant(
		&mut self,
		river: &str,
		reach: &str,
		rs: &str,
		gate: &str,
		open_height: f64,
	) -> Result<()> {
		let args: Vec<Value> = vec![river.into(), reach.into(), rs.into(), gate.into(), open_height.into()];
		self.call("UnsteadyFlow_SetGateOpening_Constant", &args).map(|_| ())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::FakeBackend;

	#[test]
	fn flows_are_sent_one_based() {
		let backend = FakeBackend::all();
		let mut controller = Controller::launch("5.0.7", &backend).unwrap();

		controller
			.steady_set_flow("Beaver Creek", "Kentwood", "5.99", &[1500.0, 3000.0, 4500.0])
			.unwrap();

		let sent = backend.native().last_call("SteadyFlow_SetFlow").unwrap();
		assert_eq!(sent.args[3], Value::FloatSeq(vec![0.0, 1500.0, 3000.0, 4500.0]));
	}

	#[test]
	fn fixed_ws_boundary_pads_elevations() {
		let backend = FakeBackend::all();
		let mut controller = Controller::launch("4.1", &backend).unwrap();

		controller
			.steady_fixed_ws_boundary("Beaver Creek", "Kentwood", true, &[210.0, 211.5])
			.unwrap();

		let sent = backend.native().last_call("SteadyFlow_FixedWSBoundary").unwrap();
		assert_eq!(sent.args[2], Value::Bool(true));
		assert_eq!(sent.args[3], Value::FloatSeq(vec![0.0, 210.0, 211.5]));
	}

	#[test]
	fn gate_error_message_is_surfaced() {
		let backend = FakeBackend::all();
		backend
			.native()
			.writes("UnsteadyFlow_SetGateOpening_Constant", 5, "Gate not found", Value::Null);
		let mut controller = Controller::launch("5.0", &backend).unwrap();

		let err = controller
			.unsteady_set_gate_opening_constant("Beaver Creek", "Kentwood", "5.39", "Gate #9", 2.0)
			.unwrap_err();
		assert_eq!(err.native_message(), Some("Gate not found"));
	}
}
