//! Capability registry and the declaration macro that builds it.
//!
//! Every vendor method is declared once per signature it ever had. A row is
//! valid from the release that introduced it up to (not including) the
//! release that removed it; [`CapabilitySet`](crate::CapabilitySet) picks the
//! rows that apply to one version.

use serde::Serialize;

use crate::{Signature, VersionTag, WaitDescriptor};

/// One definition of a vendor method.
///
/// Identity is the name: two rows with the same name are two definitions of
/// one operation over different version intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capability {
	pub name: &'static str,
	pub introduced: VersionTag,
	/// First release without this definition, if any.
	pub removed: Option<VersionTag>,
	pub signature: Signature,
	/// Native window to synchronize on after the call.
	pub wait: Option<WaitDescriptor>,
}

impl Capability {
	/// Returns true if this definition applies to `version`.
	pub fn is_valid_for(&self, version: VersionTag) -> bool {
		self.introduced <= version && self.removed.is_none_or(|removed| version < removed)
	}
}

/// The registry macro: generates the `CAPABILITIES` table.
///
/// Each row is `Name [Since..Until] (params) -> Return, wait "Title";` where
/// the `..Until` bound, the return kind and the wait title are optional.
/// Parameter directions are `In`, `Out` and `InOut`.
///
/// ```ignore
/// capability_registry! {
///   Compute_Cancel [Ras41..Ras500] ();
///   CurrentPlanFile [Ras41] () -> STR;
///   Edit_XS [Ras41] (In river: STR, In reach: STR, In rs: STR), wait "Cross Section Data";
/// }
/// ```
#[macro_export]
macro_rules! capability_registry {
	(
		$(
			$name:ident [ $since:ident $( .. $until:ident )? ]
			( $( $dir:ident $param:ident : $kind:expr ),* $(,)? )
			$( -> $ret:expr )?
			$( , wait $title:literal )?
		);+ $(;)?
	) => {
		/// Every capability definition, in declaration order.
		pub static CAPABILITIES: &[$crate::registry::Capability] = &[
			$(
				$crate::registry::Capability {
					name: stringify!($name),
					introduced: $crate::VersionTag::$since,
					removed: $crate::capability_registry!(@until $($until)?),
					signature: $crate::Signature::new(
						&[
							$( $crate::capability_registry!(@param $dir $param $kind), )*
						],
						$crate::capability_registry!(@returns $($ret)?),
					),
					wait: $crate::capability_registry!(@wait $($title)?),
				},
			)+
		];
	};
	(@param In $param:ident $kind:expr) => { $crate::Param::input(stringify!($param), $kind) };
	(@param Out $param:ident $kind:expr) => { $crate::Param::output(stringify!($param), $kind) };
	(@param InOut $param:ident $kind:expr) => { $crate::Param::in_out(stringify!($param), $kind) };
	(@until) => { None };
	(@until $until:ident) => { Some($crate::VersionTag::$until) };
	(@returns) => { None };
	(@returns $ret:expr) => { Some($ret) };
	(@wait) => { None };
	(@wait $title:literal) => { Some($crate::WaitDescriptor::blocking($title)) };
}

mod kinds {
	use crate::{IndexBase, ValueKind};

	pub const BOOL: ValueKind = ValueKind::Bool;
	pub const INT: ValueKind = ValueKind::Int;
	pub const FLOAT: ValueKind = ValueKind::Float;
	pub const STR: ValueKind = ValueKind::Str;
	pub const INTS: ValueKind = ValueKind::IntSeq(IndexBase::Zero);
	pub const FLOATS: ValueKind = ValueKind::FloatSeq(IndexBase::Zero);
	pub const STRS: ValueKind = ValueKind::StrSeq(IndexBase::Zero);
	/// 1-based float array; element 0 is ignored by the vendor.
	pub const FLOATS_1: ValueKind = ValueKind::FloatSeq(IndexBase::One);
}

use kinds::*;

capability_registry! {
	// Compute
	Compute_Cancel [Ras41..Ras500] ();
	Compute_Complete [Ras500] () -> BOOL;
	Compute_CurrentPlan [Ras41..Ras500] (Out nmsg: INT, Out Msg: STRS) -> BOOL;
	Compute_CurrentPlan [Ras500] (Out nmsg: INT, Out Msg: STRS, In BlockingMode: BOOL) -> BOOL;
	Compute_HideComputationWindow [Ras41] ();
	Compute_IsStillComputing [Ras41..Ras500] () -> BOOL;
	Compute_ShowComputationWindow [Ras41] ();
	Compute_StartedFromController [Ras500] () -> BOOL;

	// Current files
	CurrentGeomFile [Ras41] () -> STR;
	CurrentPlanFile [Ras41] () -> STR;
	CurrentProjectFile [Ras41] () -> STR;
	CurrentProjectTitle [Ras41] () -> STR;
	CurrentSteadyFile [Ras41] () -> STR;
	CurrentUnSteadyFile [Ras41] () -> STR;

	// Editors
	Edit_AddBC [Ras41] (In river: STR, In reach: STR, In rs: STR, Out errmsg: STR);
	Edit_AddIW [Ras41] (In river: STR, In reach: STR, In rs: STR, Out errmsg: STR);
	Edit_AddLW [Ras41] (In river: STR, In reach: STR, In rs: STR, Out errmsg: STR);
	Edit_AddXS [Ras41] (In river: STR, In reach: STR, In rs: STR, Out errmsg: STR);
	Edit_BC [Ras41] (In river: STR, In reach: STR, In rs: STR), wait "Bridge Culvert Data";
	Edit_GeometricData [Ras41] (), wait "Geometric Data";
	Edit_IW [Ras41] (In river: STR, In reach: STR, In rs: STR), wait "Inline Structure Data";
	Edit_LW [Ras41] (In river: STR, In reach: STR, In rs: STR), wait "Lateral Structure Editor";
	Edit_MultipleRun [Ras41] (), wait "Run Multiple Plans";
	Edit_PlanData [Ras41] (), wait "Steady Flow Analysis";
	Edit_QuasiUnsteadyFlowData [Ras41] (), wait "Quasi Unsteady Flow Editor";
	Edit_SedimentData [Ras41] (), wait "Sediment Data";
	Edit_SteadyFlowData [Ras41] (), wait "Steady Flow Data";
	Edit_UnsteadyFlowData [Ras41] (), wait "Unsteady Flow Data";
	Edit_WaterQualityData [Ras41] (), wait "Water Quality Data";
	Edit_XS [Ras41] (In river: STR, In reach: STR, In rs: STR), wait "Cross Section Data";

	ExportGIS [Ras41] ();

	// Geometry
	Geometery_GISImport [Ras41] (In title: STR, In Filename: STR);
	Geometry_BreachParamGetXML [Ras500] () -> STR;
	Geometry_BreachParamSetXML [Ras500] (In xmlText: STR);
	Geometry_GetGateNames [Ras41] (
		In river: STR, In reach: STR, In station: STR,
		Out ngate: INT, Out GateNames: STRS, Out errmsg: STR,
	);
	Geometry_GetGML [Ras41] (In geomfilename: STR) -> STR;
	Geometry_GetNode [Ras41] (In riv: INT, In rch: INT, In rs: STR) -> INT;
	Geometry_GetNodes [Ras41] (In riv: INT, In rch: INT, Out nRS: INT, Out rs: STRS, Out NodeType: STRS);
	Geometry_GetReaches [Ras41] (In riv: INT, Out nReach: INT, Out reach: STRS);
	Geometry_GetRivers [Ras41] (Out nRiver: INT, Out river: STRS);
	Geometry_RatioMann [Ras500] (
		In riv: INT, In rchUp: INT, In nUp: INT, In rchDn: INT, In nDn: INT, In ratio: FLOAT,
		Out errmsg: STR,
	) -> BOOL;
	Geometry_SetMann [Ras41] (
		In river: STR, In reach: STR, In rs: STR,
		In nMann: INT, In Mann_n: FLOATS_1, In Station: FLOATS_1,
		Out errmsg: STR,
	) -> BOOL;
	Geometry_SetMann_LChR [Ras41] (
		In river: STR, In reach: STR, In rs: STR,
		In MannLOB: FLOAT, In MannChan: FLOAT, In MannROB: FLOAT,
		Out errmsg: STR,
	) -> BOOL;
	Geometry_SetSAArea [Ras41] (In SAName: STR, In Area: FLOAT, Out errmsg: STR) -> BOOL;

	// Data locations
	GetDataLocations_Input [Ras41..Ras500] (
		In PlanTitle: STR,
		Out LocationDescriptions: STRS, Out DSSFiles: STRS, Out DSSPathnames: STRS,
		Out errmsg: STR,
	) -> INT;
	GetDataLocations_Input_count [Ras41..Ras500] (In PlanTitle: STR, Out errmsg: STR) -> INT;
	GetDataLocations_Output [Ras41..Ras500] (
		In PlanTitle: STR, Out DSSFiles: STRS, Out DSSPathnames: STRS, Out errmsg: STR,
	) -> INT;
	GetDataLocations_Output_count [Ras41..Ras500] (In PlanTitle: STR, Out errmsg: STR) -> INT;
	SetDataLocations [Ras41..Ras500] (
		In PlanTitle: STR, In count: INT,
		In LocationDescriptions: STRS, In DSSFiles: STRS, In DSSPathnames: STRS,
		Out errmsg: STR,
	) -> INT;

	GetRASVersion [Ras41] () -> STR;
	HECRASVersion [Ras41] () -> STR;
	Map_Add [Ras41] (In Filename: STR);

	// Output
	Output_ComputationLevel_Export [Ras41] (
		In filename: STR, Out errmsg: STR,
		In WriteFlow: BOOL, In WriteStage: BOOL, In WriteArea: BOOL, In WriteTopWidth: BOOL,
	) -> BOOL;
	Output_GetNode [Ras41] (In riv: INT, In reach: INT, In rs: STR) -> INT;
	Output_GetNodes [Ras41] (In riv: INT, In reach: INT, Out nRS: INT, Out rs: STRS, Out NodeType: STRS);
	Output_GetProfiles [Ras41] (Out nProfile: INT, Out ProfileName: STRS);
	Output_GetReach [Ras41] (In riv: INT, In reach: STR) -> INT;
	Output_GetReaches [Ras41] (In riv: INT, Out nReach: INT, Out reach: STRS);
	Output_GetRiver [Ras41] (In river: STR) -> INT;
	Output_GetRivers [Ras41] (Out nRiver: INT, Out river: STRS);
	Output_Initialize [Ras41..Ras500] ();
	Output_NodeOutput [Ras41] (
		In riv: INT, In rch: INT, In n: INT, In updn: INT, In prof: INT, In nVar: INT,
	) -> FLOAT;
	Output_ReachOutput [Ras41] (
		In riv: INT, In rch: INT, In prof: INT, In nVar: INT,
		Out nRS: INT, Out rs: STRS, Out ChannelDist: FLOATS, Out value: FLOATS,
	);
	Output_Variables [Ras41] (Out nVar: INT, Out VarName: STRS, Out VarDesc: STRS);
	Output_VelDist [Ras41] (
		In riv: INT, In rch: INT, In n: INT, In updn: INT, In prof: INT,
		Out nv: INT,
		Out LeftSta: FLOATS, Out RightSta: FLOATS, Out ConvPerc: FLOATS, Out Area: FLOATS,
		Out WP: FLOATS, Out Flow: FLOATS, Out HydrDepth: FLOATS, Out Velocity: FLOATS,
	);
	OutputDSS_GetStageFlow [Ras41] (
		In riv: STR, In rch: STR, In rs: STR,
		Out nvalue: INT, Out ValueDateTime: FLOATS_1, Out Stage: FLOATS_1, Out Flow: FLOATS_1,
		Out errmsg: STR,
	) -> BOOL;
	OutputDSS_GetStageFlowSA [Ras41] (
		In StorageArea: STR,
		Out nvalue: INT, Out ValueDateTime: FLOATS_1, Out Stage: FLOATS_1, Out Flow: FLOATS_1,
		Out errmsg: STR,
	) -> BOOL;

	// Plans
	Plan_GetFilename [Ras41] (In planName: STR) -> STR;
	Plan_Names [Ras41] (Out PlanCount: INT, Out PlanNames: STRS, In IncludeOnlyPlansInBaseDirectory: BOOL);
	Plan_Reports [Ras41] (Out ReportCount: INT, Out ReportNames: STRS);
	Plan_SetCurrent [Ras41] (In PlanTitleToSet: STR) -> BOOL;
	PlanOutput_IsCurrent [Ras41] (In PlanTitleToCheck: STR, In ShowMessageList: BOOL, Out errmsg: STR) -> BOOL;
	PlanOutput_SetCurrent [Ras41] (In PlanTitleToSet: STR) -> BOOL;
	PlanOutput_SetMultiple [Ras41] (
		In nPlanTitleToSet: INT, In PlanTitleToSet_0: STRS, In ShowMessageList: BOOL,
	) -> INT;

	// Plots and tables
	PlotHydraulicTables [Ras41] (In river: STR, In reach: STR, In rs: STR), wait "View Hydraulic Property Tables";
	PlotPF [Ras41] (In river: STR, In reach: STR), wait "Profile Plot";
	PlotPFGeneral [Ras41] (In river: STR, In reach: STR), wait "General Profile Plot";
	PlotRatingCurve [Ras41] (In river: STR, In reach: STR, In rs: STR), wait "Rating Curve";
	PlotStageFlow [Ras41] (In river: STR, In reach: STR, In rs: STR), wait "Stage and Flow Hydrographs";
	PlotStageFlow_SA [Ras41] (In SAName: STR), wait "Stage and Flow Hydrographs";
	PlotXS [Ras41] (In river: STR, In reach: STR, In rs: STR), wait "Cross Section";
	PlotXYZ [Ras41] (In river: STR, In reach: STR), wait "X-Y-Z Perspective Plot";
	TablePF [Ras41] (In river: STR, In reach: STR), wait "Profile Output Table";
	TableXS [Ras41] (In river: STR, In reach: STR, In rs: STR), wait "Cross Section Output";

	// Project
	Project_Current [Ras41] () -> STR;
	Project_New [Ras41] (In title: STR, In Filename: STR);
	Project_Open [Ras41] (In ProjectFileName: STR);
	Project_Save [Ras41] ();
	Project_SaveAs [Ras41] (In newProjectName: STR);

	QuitRas [Ras500] ();

	// Schematic
	Schematic_ReachCount [Ras41] () -> INT;
	Schematic_ReachPointCount [Ras41] () -> INT;
	Schematic_ReachPoints [Ras41] (
		InOut RiverName_0: STRS, InOut ReachName_0: STRS,
		InOut ReachStartIndex_0: INTS, InOut ReachPointCount_0: INTS,
		InOut ReachPointX_0: FLOATS, InOut ReachPointY_0: FLOATS,
	);
	Schematic_XSCount [Ras41] () -> INT;
	Schematic_XSPointCount [Ras41] () -> INT;
	Schematic_XSPoints [Ras41] (
		InOut RSName_0: STRS, InOut ReachIndex_0: INTS,
		InOut XSStartIndex_0: INTS, InOut XSPointCount_0: INTS,
		InOut XSPointX_0: FLOATS, InOut XSPointY_0: FLOATS,
	);

	ShowRas [Ras41] ();

	// Steady flow
	SteadyFlow_ClearFlowData [Ras41] ();
	SteadyFlow_FixedWSBoundary [Ras41] (In river: STR, In reach: STR, In Downstream: BOOL, In WSElev: FLOATS_1);
	SteadyFlow_nProfile [Ras41] () -> INT;
	SteadyFlow_SetFlow [Ras41] (In river: STR, In reach: STR, In rs: STR, In Flow: FLOATS_1);

	UnsteadyFlow_SetGateOpening_Constant [Ras41] (
		In river: STR, In reach: STR, In rs: STR, In GateName: STR, In OpenHeight: FLOAT,
		Out errmsg: STR,
	);
}

/// Every definition of `name`, oldest first.
pub fn definitions(name: &str) -> impl Iterator<Item = &'static Capability> + '_ {
	CAPABILITIES.iter().filter(move |c| c.name == name)
}

/// Returns true if any release defines `name`.
pub fn is_known(name: &str) -> bool {
	definitions(name).next().is_some()
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::*;

	#[test]
	fn no_two_definitions_share_name_and_introduction() {
		let mut seen = HashSet::new();
		for cap in CAPABILITIES {
			assert!(seen.insert((cap.name, cap.introduced)), "duplicate row for {}", cap.name);
		}
	}

	#[test]
	fn intervals_are_not_empty() {
		for cap in CAPABILITIES {
			if let Some(removed) = cap.removed {
				assert!(cap.introduced < removed, "{} is never valid", cap.name);
			}
		}
	}

	#[test]
	fn compute_current_plan_has_two_definitions() {
		let defs: Vec<_> = definitions("Compute_CurrentPlan").collect();
		assert_eq!(defs.len(), 2);
		assert!(!defs[0].signature.has_param("BlockingMode"));
		assert!(defs[1].signature.has_param("BlockingMode"));
	}

	#[test]
	fn editors_and_plots_synchronize_on_their_window() {
		let xs = definitions("Edit_XS").next().unwrap();
		assert_eq!(xs.wait, Some(WaitDescriptor::blocking("Cross Section Data")));
		let sa = definitions("PlotStageFlow_SA").next().unwrap();
		assert_eq!(sa.wait.map(|w| w.title), Some("Stage and Flow Hydrographs"));
		assert!(definitions("Project_Open").next().unwrap().wait.is_none());
	}

	#[test]
	fn directions_come_from_row_keywords() {
		use crate::Direction;

		let points = definitions("Schematic_ReachPoints").next().unwrap();
		assert!(points.signature.params.iter().all(|p| p.dir == Direction::InOut));
		assert_eq!(points.signature.input_count(), points.signature.params.len());

		let compute = definitions("Compute_CurrentPlan").next().unwrap();
		let dirs: Vec<_> = compute.signature.params.iter().map(|p| (p.name, p.dir)).collect();
		assert_eq!(dirs, [("nmsg", Direction::Out), ("Msg", Direction::Out)]);
		let node = definitions("Geometry_GetNode").next().unwrap();
		assert_eq!(node.signature.params[0], crate::Param::input("riv", crate::ValueKind::Int));
	}

	#[test]
	fn vendor_misspelling_is_kept() {
		assert!(is_known("Geometery_GISImport"));
		assert!(!is_known("Geometry_GISImport"));
	}

	#[test]
	fn mannings_arrays_are_one_based() {
		let set_mann = definitions("Geometry_SetMann").next().unwrap();
		let bases: Vec<_> = set_mann
			.signature
			.params
			.iter()
			.filter_map(|p| p.kind.index_base().map(|b| (p.name, b)))
			.collect();
		assert_eq!(bases, [("Mann_n", crate::IndexBase::One), ("Station", crate::IndexBase::One)]);
	}
}
