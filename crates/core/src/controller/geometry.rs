//! Geometry queries and edits.
//!
//! River and reach ids are 1-based positions in the lists returned by
//! [`Controller::geometry_get_rivers`] and [`Controller::geometry_get_reaches`].
//!
//! Counts and saving go through the release's separate geometry automation
//! object rather than the controller.

use serde::Serialize;
use tracing::info;

use super::Controller;
use crate::Value;
use crate::error::{Error, Result};

/// A cross section or structure on a reach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
	pub river_station: String,
	/// Vendor node type code; empty for plain cross sections.
	pub node_type: String,
}

fn geometry_count(method: &str, out: &[Value]) -> Result<i64> {
	let ret = out.first().ok_or_else(|| Error::unexpected(method, "no return value"))?;
	ret.as_i64()
		.ok_or_else(|| Error::unexpected(method, format!("return value is {}", ret.type_name())))
}

pub(crate) fn require_id(name: &str, id: i64) -> Result<()> {
	if id <= 0 {
		return Err(Error::InvalidArgument(format!("{name} must be a 1-based id, got {id}")));
	}
	Ok(())
}

impl Controller {
	/// Gate names of the inline structure at `station`.
	pub fn geometry_get_gate_names(&mut self, river: &str, reach: &str, station: &str) -> Result<Vec<String>> {
		let mut out = self.call("Geometry_GetGateNames", &[river.into(), reach.into(), station.into()])?;
		out.counted_strings("ngate", "GateNames")
	}

	/// GML of a geometry file.
	pub fn geometry_gml(&mut self, geometry_file: &str) -> Result<String> {
		self.call("Geometry_GetGML", &[geometry_file.into()])?.ret_string()
	}

	/// Node index of river station `rs`, or `None` if the reach has no such
	/// station.
	pub fn geometry_get_node(&mut self, river_id: i64, reach_id: i64, rs: &str) -> Result<Option<i64>> {
		require_id("river id", river_id)?;
		require_id("reach id", reach_id)?;
		let node = self
			.call("Geometry_GetNode", &[river_id.into(), reach_id.into(), rs.into()])?
			.ret_i64()?;
		Ok((node > 0).then_some(node))
	}

	/// Number of nodes on a reach, from the geometry object.
	pub fn geometry_node_count(&mut self, river_id: i64, reach_id: i64) -> Result<i64> {
		require_id("river id", river_id)?;
		require_id("reach id", reach_id)?;
		let out = self.geometry_object("nNode", vec![river_id.into(), reach_id.into()])?;
		geometry_count("nNode", &out)
	}

	/// Number of rivers in the current geometry, from the geometry object.
	pub fn geometry_river_count(&mut self) -> Result<i64> {
		let out = self.geometry_object("nRiver", Vec::new())?;
		geometry_count("nRiver", &out)
	}

	/// Writes the current geometry back to its file.
	pub fn geometry_save(&mut self) -> Result<()> {
		self.geometry_object("Save", Vec::new())?;
		Ok(())
	}

	/// Every node on a reach, upstream first.
	///
	/// The vendor only fills arrays the caller sized, so the node count is
	/// read from the geometry object first.
	pub fn geometry_get_nodes(&mut self, river_id: i64, reach_id: i64) -> Result<Vec<NodeInfo>> {
		let n = self.geometry_node_count(river_id, reach_id)?;
		let slots = n.max(0) as usize + 1;
		let presized = [
			("nRS", Value::Int(n)),
			("rs", Value::StrSeq(vec![String::new(); slots])),
			("NodeType", Value::StrSeq(vec![String::new(); slots])),
		];
		let mut out = self.call_presized("Geometry_GetNodes", &[river_id.into(), reach_id.into()], &presized)?;
		let stations = out.counted_strings("nRS", "rs")?;
		let types = out.strings("NodeType")?;
		if types.len() < stations.len() {
			return Err(Error::unexpected(
				"Geometry_GetNodes",
				format!("{} node types for {} stations", types.len(), stations.len()),
			));
		}
		Ok(stations
			.into_iter()
			.zip(types)
			.map(|(river_station, node_type)| NodeInfo { river_station, node_type })
			.collect())
	}

	/// Reach names of a river.
	pub fn geometry_get_reaches(&mut self, river_id: i64) -> Result<Vec<String>> {
		require_id("river id", river_id)?;
		let mut out = self.call("Geometry_GetReaches", &[river_id.into()])?;
		out.counted_strings("nReach", "reach")
	}

	pub fn geometry_get_rivers(&mut self) -> Result<Vec<String>> {
		let mut out = self.call("Geometry_GetRivers", &[])?;
		out.counted_strings("nRiver", "river")
	}

	/// Sets horizontally varied Manning's n at a cross section.
	///
	/// `n_values[i]` starts at `stations[i]`. Both slices must have the same
	/// length.
	pub fn geometry_set_mann(
		&mut self,
		river: &str,
		reach: &str,
		rs: &str,
		n_values: &[f64],
		stations: &[f64],
	) -> Result<bool> {
		if n_values.len() != stations.len() {
			return Err(Error::InvalidArgument(format!(
				"Geometry_SetMann got {} n values for {} stations",
				n_values.len(),
				stations.len()
			)));
		}
		let args: Vec<Value> = vec![
			river.into(),
			reach.into(),
			rs.into(),
			Value::Int(n_values.len() as i64),
			n_values.into(),
			stations.into(),
		];
		self.call("Geometry_SetMann", &args)?.ret_bool()
	}

	/// Sets left overbank, channel and right overbank Manning's n.
	pub fn geometry_set_mann_lchr(
		&mut self,
		river: &str,
		reach: &str,
		rs: &str,
		left: f64,
		channel: f64,
		right: f64,
	) -> Result<bool> {
		let args: Vec<Value> = vec![river.into(), reach.into(), rs.into(), left.into(), channel.into(), right.into()];
		self.call("Geometry_SetMann_LChR", &args)?.ret_bool()
	}

	/// Sets the area of a storage area and saves the geometry.
	///
	/// The vendor only keeps the new area once the geometry object saves.
	pub fn geometry_set_sa_area(&mut self, storage_area: &str, area: f64) -> Result<bool> {
		let ok = self
			.call("Geometry_SetSAArea", &[storage_area.into(), area.into()])?
			.ret_bool()?;
		if ok {
			info!(target = "ras", storage_area, area, "storage area updated; saving geometry");
			self.geometry_save()?;
		}
		Ok(ok)
	}

	/// Scales Manning's n by `ratio` between two nodes of a river (5.0+).
	pub fn geometry_ratio_mann(
		&mut self,
		river_id: i64,
		upstream: (i64, i64),
		downstream: (i64, i64),
		ratio: f64,
	) -> Result<bool> {
		require_id("river id", river_id)?;
		let args: Vec<Value> = vec![
			river_id.into(),
			upstream.0.into(),
			upstream.1.into(),
			downstream.0.into(),
			downstream.1.into(),
			ratio.into(),
		];
		self.call("Geometry_RatioMann", &args)?.ret_bool()
	}

	/// Dam breach parameters of the current geometry as XML (5.0+).
	pub fn geometry_breach_params_xml(&mut self) -> Result<String> {
		self.call("Geometry_BreachParamGetXML", &[])?.ret_string()
	}

	pub fn geometry_set_breach_params_xml(&mut self, xml: &str) -> Result<()> {
		self.call("Geometry_BreachParamSetXML", &[xml.into()]).map(|_| ())
	}

	/// Imports GIS data into a new geometry titled `title`.
	pub fn geometry_gis_import(&mut self, title: &str, filename: &str) -> Result<()> {
		self.call("Geometery_GISImport", &[title.into(), filename.into()]).map(|_| ())
	}
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
	fn zero_node_means_missing_station() {
		let (backend, mut controller) = controller("5.0.7");
		backend.native().returns("Geometry_GetNode", 0i64);
		assert_eq!(controller.geometry_get_node(1, 1, "99.9").unwrap(), None);

		backend.native().returns("Geometry_GetNode", 4i64);
		assert_eq!(controller.geometry_get_node(1, 1, "5.99").unwrap(), Some(4));
	}

	#[test]
	fn non_positive_ids_are_rejected_before_calling() {
		let (backend, mut controller) = controller("4.1");
		assert!(matches!(
			controller.geometry_get_node(0, 1, "5.99"),
			Err(Error::InvalidArgument(_))
		));
		assert!(controller.geometry_get_reaches(-1).is_err());
		assert_eq!(backend.native().call_count("Geometry_GetNode"), 0);
		assert_eq!(backend.native().call_count("Geometry_GetReaches"), 0);
	}

	#[test]
	fn nodes_pair_stations_with_types() {
		let (backend, mut controller) = controller("5.0");
		backend.native().returns("HECRASGeometry.nNode", 2_i64);
		backend.native().on_call("Geometry_GetNodes", |args| {
			args[2] = Value::Int(2);
			args[3] = Value::StrSeq(vec!["5.99".into(), "5.4".into(), "5.3".into()]);
			args[4] = Value::StrSeq(vec![String::new(), "BR".into(), String::new()]);
			Ok(Value::Null)
		});

		let nodes = controller.geometry_get_nodes(1, 1).unwrap();
		assert_eq!(
			nodes,
			[
				NodeInfo { river_station: "5.99".into(), node_type: String::new() },
				NodeInfo { river_station: "5.4".into(), node_type: "BR".into() },
			]
		);
	}

	#[test]
	fn node_arrays_are_sized_from_the_geometry_object() {
		let (backend, mut controller) = controller("4.1");
		backend.native().returns("HECRASGeometry.nNode", 3_i64);

		controller.geometry_get_nodes(2, 1).unwrap();

		assert_eq!(backend.native().methods(), ["ShowRas", "HECRASGeometry.nNode", "Geometry_GetNodes"]);
		let count = backend.native().last_call("HECRASGeometry.nNode").unwrap();
		assert_eq!(count.args, vec![Value::Int(2), Value::Int(1)]);
		let sent = backend.native().last_call("Geometry_GetNodes").unwrap();
		assert_eq!(sent.args[2], Value::Int(3));
		assert_eq!(sent.args[3], Value::StrSeq(vec![String::new(); 4]));
		assert_eq!(sent.args[4], Value::StrSeq(vec![String::new(); 4]));
	}

	#[test]
	fn short_node_type_array_is_an_unexpected_result() {
		let (backend, mut controller) = controller("5.0.7");
		backend.native().returns("HECRASGeometry.nNode", 2_i64);
		backend.native().on_call("Geometry_GetNodes", |args| {
			args[2] = Value::Int(2);
			args[3] = Value::StrSeq(vec!["5.99".into(), "5.4".into()]);
			args[4] = Value::StrSeq(vec![String::new()]);
			Ok(Value::Null)
		});

		let err = controller.geometry_get_nodes(1, 1).unwrap_err();
		assert!(matches!(err, Error::UnexpectedResult { ref operation, .. } if operation == "Geometry_GetNodes"));
		assert!(err.to_string().contains("1 node types for 2 stations"), "{err}");
	}

	#[test]
	fn river_count_comes_from_the_geometry_object() {
		let (backend, mut controller) = controller("5.0.7");
		backend.native().returns("HECRASGeometry.nRiver", 3_i64);
		assert_eq!(controller.geometry_river_count().unwrap(), 3);

		backend.native().returns("HECRASGeometry.nRiver", "three");
		assert!(matches!(controller.geometry_river_count(), Err(Error::UnexpectedResult { .. })));
	}

	#[test]
	fn set_mann_pads_one_based_arrays() {
		let (backend, mut controller) = controller("5.0.7");
		backend.native().returns("Geometry_SetMann", true);

		assert!(
			controller
				.geometry_set_mann("Beaver Creek", "Kentwood", "5.99", &[0.12, 0.04, 0.12], &[0.0, 200.0, 400.0])
				.unwrap()
		);

		let sent = backend.native().last_call("Geometry_SetMann").unwrap();
		assert_eq!(sent.args[3], Value::Int(3));
		assert_eq!(sent.args[4], Value::FloatSeq(vec![0.0, 0.12, 0.04, 0.12]));
		assert_eq!(sent.args[5], Value::FloatSeq(vec![0.0, 0.0, 200.0, 400.0]));
	}

	#[test]
	fn set_mann_rejects_mismatched_lengths() {
		let (backend, mut controller) = controller("4.1");
		let err = controller
			.geometry_set_mann("Beaver Creek", "Kentwood", "5.99", &[0.12, 0.04], &[0.0])
			.unwrap_err();
		assert!(err.to_string().contains("2 n values for 1 stations"), "{err}");
		assert_eq!(backend.native().call_count("Geometry_SetMann"), 0);
	}

	#[test]
	fn storage_area_update_saves_geometry() {
		let (backend, mut controller) = controller("5.0.7");
		backend.native().returns("Geometry_SetSAArea", true);

		assert!(controller.geometry_set_sa_area("Pond 1", 1250.0).unwrap());
		assert_eq!(backend.native().methods(), ["ShowRas", "Geometry_SetSAArea", "HECRASGeometry.Save"]);
		assert_eq!(backend.native().call_count("Project_Save"), 0);
	}

	#[test]
	fn failed_storage_area_update_does_not_save() {
		let (backend, mut controller) = controller("5.0.7");
		backend.native().returns("Geometry_SetSAArea", false);

		assert!(!controller.geometry_set_sa_area("Pond 1", 1250.0).unwrap());
		assert_eq!(backend.native().call_count("HECRASGeometry.Save"), 0);
	}

	#[test]
	fn breach_xml_needs_50() {
		let (_backend, mut controller) = controller("4.1");
		assert!(controller.geometry_breach_params_xml().unwrap_err().is_unsupported());
	}
}
