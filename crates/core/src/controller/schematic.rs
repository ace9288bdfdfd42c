//! Geometry schematic coordinates.
//!
//! The vendor fills caller-sized arrays, so every query first asks for the
//! matching counts.

use serde::Serialize;

use super::Controller;
use crate::Value;
use crate::error::{Error, Result};

/// Centerline of one reach.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReachPolyline {
	pub river: String,
	pub reach: String,
	pub points: Vec<(f64, f64)>,
}

/// Cut line of one cross section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossSectionLine {
	pub river_station: String,
	/// 0-based index of the reach in [`Controller::schematic_reach_points`].
	pub reach_index: i64,
	pub points: Vec<(f64, f64)>,
}

fn count(n: i64) -> usize {
	n.max(0) as usize
}

/// Points `start..start + len` of the shared coordinate arrays.
fn slice_points(operation: &str, xs: &[f64], ys: &[f64], start: i64, len: i64) -> Result<Vec<(f64, f64)>> {
	let (start, len) = (count(start), count(len));
	let end = start + len;
	if end > xs.len() || end > ys.len() {
		return Err(Error::unexpected(
			operation,
			format!("points {start}..{end} out of range for {} coordinates", xs.len().min(ys.len())),
		));
	}
	Ok(xs[start..end].iter().copied().zip(ys[start..end].iter().copied()).collect())
}

impl Controller {
	pub fn schematic_reach_count(&mut self) -> Result<i64> {
		self.call("Schematic_ReachCount", &[])?.ret_i64()
	}

	/// Total number of centerline points over all reaches.
	pub fn schematic_reach_point_count(&mut self) -> Result<i64> {
		self.call("Schematic_ReachPointCount", &[])?.ret_i64()
	}

	pub fn schematic_xs_count(&mut self) -> Result<i64> {
		self.call("Schematic_XSCount", &[])?.ret_i64()
	}

	/// Total number of cut line points over all cross sections.
	pub fn schematic_xs_point_count(&mut self) -> Result<i64> {
		self.call("Schematic_XSPointCount", &[])?.ret_i64()
	}

	/// Centerline of every reach.
	pub fn schematic_reach_points(&mut self) -> Result<Vec<ReachPolyline>> {
		let reaches = count(self.schematic_reach_count()?);
		let points = count(self.schematic_reach_point_count()?);
		let args = vec![
			Value::StrSeq(vec![String::new(); reaches]),
			Value::StrSeq(vec![String::new(); reaches]),
			Value::IntSeq(vec![0; reaches]),
			Value::IntSeq(vec![0; reaches]),
			Value::FloatSeq(vec![0.0; points]),
			Value::FloatSeq(vec![0.0; points]),
		];
		let mut out = self.call("Schematic_ReachPoints", &args)?;
		let rivers = out.strings("RiverName_0")?;
		let names = out.strings("ReachName_0")?;
		let starts = out.ints("ReachStartIndex_0")?;
		let lens = out.ints("ReachPointCount_0")?;
		let xs = out.floats("ReachPointX_0")?;
		let ys = out.floats("ReachPointY_0")?;

		rivers
			.into_iter()
			.zip(names)
			.zip(starts.into_iter().zip(lens))
			.take(reaches)
			.map(|((river, reach), (start, len))| {
				Ok(ReachPolyline {
					river,
					reach,
					points: slice_points("Schematic_ReachPoints", &xs, &ys, start, len)?,
				})
			})
			.collect()
	}

	/// Cut line of every cross section.
	pub fn schematic_xs_points(&mut self) -> Result<Vec<CrossSectionLine>> {
		let sections = count(self.schematic_xs_count()?);
		let points = count(self.schematic_xs_point_count()?);
		let args = vec![
			Value::StrSeq(vec![String::new(); sections]),
			Value::IntSeq(vec![0; sections]),
			Value::IntSeq(vec![0; sections]),
			Value::IntSeq(vec![0; sections]),
			Value::FloatSeq(vec![0.0; points]),
			Value::FloatSeq(vec![0.0; points]),
		];
		let mut out = self.call("Schematic_XSPoints", &args)?;
		let stations = out.strings("RSName_0")?;
		let reach_indices = out.ints("ReachIndex_0")?;
		let starts = out.ints("XSStartIndex_0")?;
		let lens = out.ints("XSPointCount_0")?;
		let xs = out.floats("XSPointX_0")?;
		let ys = out.floats("XSPointY_0")?;

		stations
			.into_iter()
			.zip(reach_indices)
			.zip(starts.into_iter().zip(lens))
			.take(sections)
			.map(|((river_station, reach_index), (start, len))| {
				Ok(CrossSectionLine {
					river_station,
					reach_index,
					points: slice_points("Schematic_XSPoints", &xs, &ys, start, len)?,
				})
			})
			.collect()
	}
}
