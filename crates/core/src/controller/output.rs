//! Computed results.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::Serialize;

use super::Controller;
use super::geometry::require_id;
use crate::Value;
use crate::error::{Error, Result};

/// Output of one variable along a reach for one profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReachOutput {
	pub river_stations: Vec<String>,
	pub channel_distances: Vec<f64>,
	pub values: Vec<f64>,
}

/// An output variable as listed by the vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputVariable {
	/// 1-based id, as passed to the node and reach output calls.
	pub id: i64,
	pub name: String,
	pub description: String,
}

/// One conveyance slice of a velocity distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSlice {
	pub left_station: f64,
	pub right_station: f64,
	pub conveyance_percent: f64,
	pub area: f64,
	pub wetted_perimeter: f64,
	pub flow: f64,
	pub hydraulic_depth: f64,
	pub velocity: f64,
}

/// Stage and flow hydrographs read from the DSS output.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StageFlowSeries {
	pub times: Vec<NaiveDateTime>,
	pub stage: Vec<f64>,
	pub flow: Vec<f64>,
}

impl StageFlowSeries {
	pub fn len(&self) -> usize {
		self.times.len()
	}

	pub fn is_empty(&self) -> bool {
		self.times.is_empty()
	}
}

/// Columns written by [`Controller::output_computation_level_export`].
///
/// The default writes none of them, matching the vendor's own defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelExportColumns {
	pub flow: bool,
	pub stage: bool,
	pub area: bool,
	pub top_width: bool,
}

/// Converts an OLE automation date (days since 1899-12-30) to a timestamp,
/// rounded to the millisecond.
pub fn ole_date(days: f64) -> Option<NaiveDateTime> {
	if !days.is_finite() {
		return None;
	}
	let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
	let offset = TimeDelta::try_milliseconds((days * 86_400_000.0).round() as i64)?;
	epoch.checked_add_signed(offset)
}

fn nth(values: &[f64], i: usize) -> f64 {
	values.get(i).copied().unwrap_or_default()
}

impl Controller {
	/// Prepares output retrieval for the current plan (4.1 only).
	pub fn output_initialize(&mut self) -> Result<()> {
		self.call("Output_Initialize", &[]).map(|_| ())
	}

	/// Node index of `rs` in the output, `None` if there is no such station.
	pub fn output_get_node(&mut self, river_id: i64, reach_id: i64, rs: &str) -> Result<Option<i64>> {
		require_id("river id", river_id)?;
		require_id("reach id", reach_id)?;
		let node = self
			.call("Output_GetNode", &[river_id.into(), reach_id.into(), rs.into()])?
			.ret_i64()?;
		Ok((node > 0).then_some(node))
	}

	/// River stations and node types of a reach, in output order.
	pub fn output_get_nodes(&mut self, river_id: i64, reach_id: i64) -> Result<Vec<(String, String)>> {
		require_id("river id", river_id)?;
		require_id("reach id", reach_id)?;
		let mut out = self.call("Output_GetNodes", &[river_id.into(), reach_id.into()])?;
		let stations = out.counted_strings("nRS", "rs")?;
		let mut types = out.strings("NodeType")?.into_iter();
		Ok(stations
			.into_iter()
			.map(|rs| (rs, types.next().unwrap_or_default()))
			.collect())
	}

	pub fn output_get_profiles(&mut self) -> Result<Vec<String>> {
		let mut out = self.call("Output_GetProfiles", &[])?;
		out.counted_strings("nProfile", "ProfileName")
	}

	/// Id of the reach named `reach`, `None` if the river has no such reach.
	pub fn output_get_reach(&mut self, river_id: i64, reach: &str) -> Result<Option<i64>> {
		require_id("river id", river_id)?;
		let id = self.call("Output_GetReach", &[river_id.into(), reach.into()])?.ret_i64()?;
		Ok((id > 0).then_some(id))
	}

	pub fn output_get_reaches(&mut self, river_id: i64) -> Result<Vec<String>> {
		require_id("river id", river_id)?;
		let mut out = self.call("Output_GetReaches", &[river_id.into()])?;
		out.counted_strings("nReach", "reach")
	}

	/// Id of the river named `river`, `None` if there is none.
	pub fn output_get_river(&mut self, river: &str) -> Result<Option<i64>> {
		let id = self.call("Output_GetRiver", &[river.into()])?.ret_i64()?;
		Ok((id > 0).then_some(id))
	}

	pub fn output_get_rivers(&mut self) -> Result<Vec<String>> {
		let mut out = self.call("Output_GetRivers", &[])?;
		out.counted_strings("nRiver", "river")
	}

	/// Value of output variable `variable` at one node.
	///
	/// `up_down` picks the section of a structure node (0 for plain cross
	/// sections).
	pub fn output_node_output(
		&mut self,
		river_id: i64,
		reach_id: i64,
		node: i64,
		up_down: i64,
		profile: i64,
		variable: i64,
	) -> Result<f64> {
		require_id("river id", river_id)?;
		require_id("reach id", reach_id)?;
		let args: Vec<Value> = vec![
			river_id.into(),
			reach_id.into(),
			node.into(),
			up_down.into(),
			profile.into(),
			variable.into(),
		];
		self.call("Output_NodeOutput", &args)?.ret_f64()
	}

	/// Output variable `variable` along a whole reach.
	pub fn output_reach_output(
		&mut self,
		river_id: i64,
		reach_id: i64,
		profile: i64,
		variable: i64,
	) -> Result<ReachOutput> {
		require_id("river id", river_id)?;
		require_id("reach id", reach_id)?;
		let args: Vec<Value> = vec![river_id.into(), reach_id.into(), profile.into(), variable.into()];
		let mut out = self.call("Output_ReachOutput", &args)?;
		let n = out.i64_out("nRS")?.max(0) as usize;
		let mut river_stations = out.strings("rs")?;
		let mut channel_distances = out.floats("ChannelDist")?;
		let mut values = out.floats("value")?;
		river_stations.truncate(n);
		channel_distances.truncate(n);
		values.truncate(n);
		Ok(ReachOutput {
			river_stations,
			channel_distances,
			values,
		})
	}

	pub fn output_variables(&mut self) -> Result<Vec<OutputVariable>> {
		let mut out = self.call("Output_Variables", &[])?;
		let names = out.counted_strings("nVar", "VarName")?;
		let mut descriptions = out.strings("VarDesc")?.into_iter();
		Ok(names
			.into_iter()
			.zip(1..)
			.map(|(name, id)| OutputVariable {
				id,
				name,
				description: descriptions.next().unwrap_or_default(),
			})
			.collect())
	}

	/// Velocity distribution at one node for one profile.
	pub fn output_velocity_distribution(
		&mut self,
		river_id: i64,
		reach_id: i64,
		node: i64,
		up_down: i64,
		profile: i64,
	) -> Result<Vec<FlowSlice>> {
		require_id("river id", river_id)?;
		require_id("reach id", reach_id)?;
		let args: Vec<Value> = vec![
			river_id.into(),
			reach_id.into(),
			node.into(),
			up_down.into(),
			profile.into(),
		];
		let mut out = self.call("Output_VelDist", &args)?;
		let n = out.i64_out("nv")?.max(0) as usize;
		let left = out.floats("LeftSta")?;
		let right = out.floats("RightSta")?;
		let conveyance = out.floats("ConvPerc")?;
		let area = out.floats("Area")?;
		let wetted = out.floats("WP")?;
		let flow = out.floats("Flow")?;
		let depth = out.floats("HydrDepth")?;
		let velocity = out.floats("Velocity")?;
		Ok((0..n)
			.map(|i| FlowSlice {
				left_station: nth(&left, i),
				right_station: nth(&right, i),
				conveyance_percent: nth(&conveyance, i),
				area: nth(&area, i),
				wetted_perimeter: nth(&wetted, i),
				flow: nth(&flow, i),
				hydraulic_depth: nth(&depth, i),
				velocity: nth(&velocity, i),
			})
			.collect())
	}

	/// Stage and flow hydrographs at a cross section, from the DSS output.
	pub fn output_dss_stage_flow(&mut self, river: &str, reach: &str, rs: &str) -> Result<StageFlowSeries> {
		self.stage_flow("OutputDSS_GetStageFlow", &[river.into(), reach.into(), rs.into()])
	}

	/// Stage and flow hydrographs of a storage area, from the DSS output.
	pub fn output_dss_stage_flow_sa(&mut self, storage_area: &str) -> Result<StageFlowSeries> {
		self.stage_flow("OutputDSS_GetStageFlowSA", &[storage_area.into()])
	}

	fn stage_flow(&mut self, operation: &str, args: &[Value]) -> Result<StageFlowSeries> {
		let mut out = self.call(operation, args)?;
		if !out.ret_bool()? {
			return Ok(StageFlowSeries::default());
		}
		let n = out.i64_out("nvalue")?.max(0) as usize;
		let times = out
			.floats("ValueDateTime")?
			.into_iter()
			.take(n)
			.map(|days| {
				ole_date(days).ok_or_else(|| Error::unexpected(operation, format!("{days} is not a valid date")))
			})
			.collect::<Result<Vec<_>>>()?;
		let mut stage = out.floats("Stage")?;
		let mut flow = out.floats("Flow")?;
		stage.truncate(n);
		flow.truncate(n);
		Ok(StageFlowSeries { times, stage, flow })
	}

	/// Writes computation-level output of the current plan to `filename`.
	pub fn output_computation_level_export(&mut self, filename: &str, columns: LevelExportColumns) -> Result<bool> {
		let args: Vec<Value> = vec![
			filename.into(),
			columns.flow.into(),
			columns.stage.into(),
			columns.area.into(),
			columns.top_width.into(),
		];
		self.call("Output_ComputationLevel_Export", &args)?.ret_bool()
	}
}

#[cfg(test)]
mod tests {
	use chrono::{NaiveDate, Timelike};

	use super::*;
	use crate::testing::FakeBackend;

	fn controller(tag: &str) -> (FakeBackend, Controller) {
		let backend = FakeBackend::all();
		let controller = Controller::launch(tag, &backend).unwrap();
		(backend, controller)
	}

	#[test]
	fn ole_dates_count_days_from_1899() {
		let day = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
		assert_eq!(ole_date(0.0).unwrap(), day(1899, 12, 30).and_hms_opt(0, 0, 0).unwrap());
		assert_eq!(ole_date(2.0).unwrap().date(), day(1900, 1, 1));
		let noon = ole_date(43466.5).unwrap();
		assert_eq!(noon.date(), day(2019, 1, 1));
		assert_eq!(noon.hour(), 12);
		assert!(ole_date(f64::NAN).is_none());
	}

	#[test]
	fn stage_flow_drops_one_based_dummy() {
		let (backend, mut controller) = controller("5.0.7");
		backend.native().on_call("OutputDSS_GetStageFlow", |args| {
			args[3] = Value::Int(2);
			args[4] = Value::FloatSeq(vec![-1.0, 43466.0, 43466.25]);
			args[5] = Value::FloatSeq(vec![-1.0, 210.5, 211.0]);
			args[6] = Value::FloatSeq(vec![-1.0, 1500.0, 1800.0]);
			Ok(Value::Bool(true))
		});

		let series = controller.output_dss_stage_flow("Beaver Creek", "Kentwood", "5.99").unwrap();
		assert_eq!(series.len(), 2);
		assert_eq!(series.times[1].hour(), 6);
		assert_eq!(series.stage, [210.5, 211.0]);
		assert_eq!(series.flow, [1500.0, 1800.0]);
	}

	#[test]
	fn missing_dss_output_is_empty_series() {
		let (backend, mut controller) = controller("4.1");
		backend.native().returns("OutputDSS_GetStageFlowSA", false);
		assert!(controller.output_dss_stage_flow_sa("Pond 1").unwrap().is_empty());
	}

	#[test]
	fn variables_are_numbered_from_one() {
		let (backend, mut controller) = controller("5.0");
		backend.native().on_call("Output_Variables", |args| {
			args[0] = Value::Int(2);
			args[1] = Value::StrSeq(vec!["W.S. Elev".into(), "Vel Chnl".into()]);
			args[2] = Value::StrSeq(vec!["Water surface".into(), "Channel velocity".into()]);
			Ok(Value::Null)
		});

		let vars = controller.output_variables().unwrap();
		assert_eq!(vars[0].id, 1);
		assert_eq!(vars[1].id, 2);
		assert_eq!(vars[1].name, "Vel Chnl");
		assert_eq!(vars[1].description, "Channel velocity");
	}

	#[test]
	fn reach_output_is_trimmed_to_station_count() {
		let (backend, mut controller) = controller("5.0.7");
		backend.native().on_call("Output_ReachOutput", |args| {
			args[4] = Value::Int(2);
			args[5] = Value::StrSeq(vec!["5.99".into(), "5.9".into(), String::new()]);
			args[6] = Value::FloatSeq(vec![0.0, 310.0, 0.0]);
			args[7] = Value::FloatSeq(vec![213.1, 212.8, 0.0]);
			Ok(Value::Null)
		});

		let reach = controller.output_reach_output(1, 1, 1, 2).unwrap();
		assert_eq!(reach.river_stations, ["5.99", "5.9"]);
		assert_eq!(reach.channel_distances, [0.0, 310.0]);
		assert_eq!(reach.values, [213.1, 212.8]);
	}

	#[test]
	fn unknown_river_has_no_id() {
		let (backend, mut controller) = controller("4.1");
		backend.native().returns("Output_GetRiver", 0i64);
		assert_eq!(controller.output_get_river("Nowhere").unwrap(), None);
	}

	#[test]
	fn level_export_sends_columns_after_filename() {
		let (backend, mut controller) = controller("5.0.7");
		backend.native().returns("Output_ComputationLevel_Export", true);
		let columns = LevelExportColumns {
			flow: true,
			stage: true,
			top_width: true,
			..LevelExportColumns::default()
		};

		assert!(controller.output_computation_level_export("levels.txt", columns).unwrap());
		let sent = backend.native().last_call("Output_ComputationLevel_Export").unwrap();
		assert_eq!(
			sent.args,
			vec![
				Value::Str("levels.txt".into()),
				Value::Str(String::new()),
				Value::Bool(true),
				Value::Bool(true),
				Value::Bool(false),
				Value::Bool(true),
			]
		);
	}

	#[test]
	fn level_export_writes_no_columns_by_default() {
		let (backend, mut controller) = controller("4.1");
		backend.native().returns("Output_ComputationLevel_Export", true);

		controller
			.output_computation_level_export("levels.txt", LevelExportColumns::default())
			.unwrap();

		let sent = backend.native().last_call("Output_ComputationLevel_Export").unwrap();
		assert_eq!(sent.args[2..].to_vec(), vec![Value::Bool(false); 4]);
	}
}
