// Capability resolution across releases
//
// Tests cover:
// - which names each release exposes
// - 5.0.7 inheriting 5.0 unchanged
// - redefinitions winning over older rows
// - unsupported operations never reaching the native session

use std::collections::BTreeSet;

use ras::testing::FakeBackend;
use ras::{CAPABILITIES, Capability, CapabilitySet, Controller, Direction, Error, Param, Signature, VersionTag};

const ONLY_41: [&str; 8] = [
	"Compute_Cancel",
	"Compute_IsStillComputing",
	"GetDataLocations_Input",
	"GetDataLocations_Input_count",
	"GetDataLocations_Output",
	"GetDataLocations_Output_count",
	"Output_Initialize",
	"SetDataLocations",
];

const ADDED_IN_50: [&str; 6] = [
	"Compute_Complete",
	"Compute_StartedFromController",
	"Geometry_BreachParamGetXML",
	"Geometry_BreachParamSetXML",
	"Geometry_RatioMann",
	"QuitRas",
];

fn names(version: VersionTag) -> BTreeSet<&'static str> {
	CapabilitySet::resolve(version).names().collect()
}

#[test]
fn test_41_and_50_differ_by_known_names() {
	let v41 = names(VersionTag::Ras41);
	let v50 = names(VersionTag::Ras500);

	let only_41: BTreeSet<_> = v41.difference(&v50).copied().collect();
	let only_50: BTreeSet<_> = v50.difference(&v41).copied().collect();

	assert_eq!(only_41, ONLY_41.into_iter().collect());
	assert_eq!(only_50, ADDED_IN_50.into_iter().collect());
	assert_eq!(v41.len() - ONLY_41.len(), v50.len() - ADDED_IN_50.len());
}

#[test]
fn test_507_inherits_50_unchanged() {
	let v50 = CapabilitySet::resolve(VersionTag::Ras500);
	let v507 = CapabilitySet::resolve(VersionTag::Ras507);
	assert!(v50.diff(&v507).is_empty());
	assert_eq!(v50.len(), v507.len());
}

#[test]
fn test_common_operations_are_everywhere() {
	for version in VersionTag::ALL {
		let set = CapabilitySet::resolve(version);
		for name in ["ShowRas", "Project_Open", "Edit_XS", "Geometery_GISImport", "OutputDSS_GetStageFlow"] {
			assert!(set.contains(name), "{name} missing in {version}");
		}
	}
}

#[test]
fn test_compute_current_plan_is_redefined_in_50() {
	let diff = CapabilitySet::resolve(VersionTag::Ras41).diff(&CapabilitySet::resolve(VersionTag::Ras500));
	assert_eq!(diff.changed, ["Compute_CurrentPlan"]);

	for (version, blocking) in [
		(VersionTag::Ras41, false),
		(VersionTag::Ras500, true),
		(VersionTag::Ras507, true),
	] {
		let cap = CapabilitySet::resolve(version)
			.require("Compute_CurrentPlan")
			.expect("Compute_CurrentPlan resolves everywhere");
		assert_eq!(cap.signature.has_param("BlockingMode"), blocking, "{version}");
	}
}

#[test]
fn test_every_row_is_resolvable_somewhere() {
	for cap in CAPABILITIES {
		let resolved = VersionTag::ALL
			.into_iter()
			.filter(|v| cap.is_valid_for(*v))
			.any(|v| CapabilitySet::resolve(v).get(cap.name) == Some(cap));
		assert!(resolved, "{} introduced in {} is never selected", cap.name, cap.introduced);
	}
}

static OVERLAPPING: &[Capability] = &[
	Capability {
		name: "Legacy",
		introduced: VersionTag::Ras41,
		removed: None,
		signature: Signature::new(&[], None),
		wait: None,
	},
	Capability {
		name: "Legacy",
		introduced: VersionTag::Ras500,
		removed: None,
		signature: Signature::new(
			&[Param {
				name: "flag",
				kind: ras::ValueKind::Bool,
				dir: Direction::In,
			}],
			None,
		),
		wait: None,
	},
];

#[test]
fn test_latest_introduction_wins_when_intervals_overlap() {
	let v41 = CapabilitySet::from_table(OVERLAPPING, VersionTag::Ras41);
	let v507 = CapabilitySet::from_table(OVERLAPPING, VersionTag::Ras507);

	assert_eq!(v41.get("Legacy").map(|c| c.introduced), Some(VersionTag::Ras41));
	assert_eq!(v507.get("Legacy").map(|c| c.introduced), Some(VersionTag::Ras500));
	assert_eq!(v507.len(), 1);
}

#[test]
fn test_removed_operations_never_reach_native() {
	let backend = FakeBackend::all();
	let mut controller = Controller::launch("5.0", &backend).expect("Failed to launch 5.0");

	for name in ONLY_41 {
		let err = controller.call(name, &[]).expect_err("operation removed in 5.0");
		assert!(err.is_unsupported(), "{name}: {err}");
		assert_eq!(
			err.to_string(),
			format!("{name}: operation not available in version 5.0")
		);
	}
	assert_eq!(backend.native().methods(), ["ShowRas"]);
}

#[test]
fn test_added_operations_are_unsupported_in_41() {
	let backend = FakeBackend::all();
	let mut controller = Controller::launch("4.1", &backend).expect("Failed to launch 4.1");

	for name in ADDED_IN_50 {
		assert!(matches!(
			controller.call(name, &[]),
			Err(Error::UnsupportedOperation { .. })
		));
	}
	assert!(controller.call("Not_A_Method", &[]).unwrap_err().is_unsupported());
	assert_eq!(backend.native().call_count("QuitRas"), 0);
	assert_eq!(backend.native().calls().len(), 1);
}
