//! Plot and table windows.
//!
//! These calls only open a window; they return once the user has closed it.

use super::Controller;
use crate::DialogOutcome;
use crate::error::Result;

impl Controller {
	pub fn plot_hydraulic_tables(&mut self, river: &str, reach: &str, rs: &str) -> Result<DialogOutcome> {
		self.call_window("PlotHydraulicTables", &[river.into(), reach.into(), rs.into()], false)
	}

	pub fn plot_pf(&mut self, river: &str, reach: &str) -> Result<DialogOutcome> {
		self.call_window("PlotPF", &[river.into(), reach.into()], false)
	}

	pub fn plot_pf_general(&mut self, river: &str, reach: &str) -> Result<DialogOutcome> {
		self.call_window("PlotPFGeneral", &[river.into(), reach.into()], false)
	}

	pub fn plot_rating_curve(&mut self, river: &str, reach: &str, rs: &str) -> Result<DialogOutcome> {
		self.call_window("PlotRatingCurve", &[river.into(), reach.into(), rs.into()], false)
	}

	pub fn plot_stage_flow(&mut self, river: &str, reach: &str, rs: &str) -> Result<DialogOutcome> {
		self.call_window("PlotStageFlow", &[river.into(), reach.into(), rs.into()], false)
	}

	/// Stage and flow hydrographs of a storage area.
	pub fn plot_stage_flow_sa(&mut self, storage_area: &str) -> Result<DialogOutcome> {
		self.call_window("PlotStageFlow_SA", &[storage_area.into()], false)
	}

	pub fn plot_xs(&mut self, river: &str, reach: &str, rs: &str) -> Result<DialogOutcome> {
		self.call_window("PlotXS", &[river.into(), reach.into(), rs.into()], false)
	}

	/// X-Y-Z perspective plot of a reach.
	pub fn plot_xyz(&mut self, river: &str, reach: &str) -> Result<DialogOutcome> {
		self.call_window("PlotXYZ", &[river.into(), reach.into()], false)
	}

	pub fn table_pf(&mut self, river: &str, reach: &str) -> Result<DialogOutcome> {
		self.call_window("TablePF", &[river.into(), reach.into()], false)
	}

	pub fn table_xs(&mut self, river: &str, reach: &str, rs: &str) -> Result<DialogOutcome> {
		self.call_window("TableXS", &[river.into(), reach.into(), rs.into()], false)
	}
}
