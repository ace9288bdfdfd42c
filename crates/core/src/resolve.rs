//! Version resolution.
//!
//! Releases form a linear lineage. A definition applies to version `V` when
//! `introduced <= V < removed`; when several definitions of one name apply,
//! the one introduced most recently wins.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::trace;

use crate::VersionTag;
use crate::error::{Error, Result};
use crate::registry::{CAPABILITIES, Capability};

/// The capabilities available in one release, at most one per name.
#[derive(Debug, Clone)]
pub struct CapabilitySet {
	version: VersionTag,
	by_name: BTreeMap<&'static str, &'static Capability>,
}

/// Differences between two resolved sets, names sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CapabilityDiff {
	/// Present in the newer set only.
	pub added: Vec<&'static str>,
	/// Present in the older set only.
	pub removed: Vec<&'static str>,
	/// Present in both with a different definition.
	pub changed: Vec<&'static str>,
}

impl CapabilityDiff {
	pub fn is_empty(&self) -> bool {
		self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
	}
}

impl CapabilitySet {
	/// Resolves the built-in registry for `version`.
	pub fn resolve(version: VersionTag) -> Self {
		Self::from_table(CAPABILITIES, version)
	}

	/// Resolves an arbitrary definition table for `version`.
	pub fn from_table(table: &'static [Capability], version: VersionTag) -> Self {
		let mut by_name: BTreeMap<&'static str, &'static Capability> = BTreeMap::new();
		for cap in table.iter().filter(|c| c.is_valid_for(version)) {
			match by_name.get(cap.name) {
				Some(current) if current.introduced >= cap.introduced => {}
				_ => {
					by_name.insert(cap.name, cap);
				}
			}
		}
		trace!(target = "ras", version = %version, capabilities = by_name.len(), "resolved capability set");
		Self { version, by_name }
	}

	pub fn version(&self) -> VersionTag {
		self.version
	}

	pub fn get(&self, name: &str) -> Option<&'static Capability> {
		self.by_name.get(name).copied()
	}

	/// Looks `name` up, failing with [`Error::UnsupportedOperation`] if this
	/// release does not provide it.
	pub fn require(&self, name: &str) -> Result<&'static Capability> {
		self.get(name).ok_or_else(|| Error::UnsupportedOperation {
			operation: name.to_string(),
			version: self.version,
		})
	}

	pub fn contains(&self, name: &str) -> bool {
		self.by_name.contains_key(name)
	}

	/// Capability names in sorted order.
	pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.by_name.keys().copied()
	}

	pub fn iter(&self) -> impl Iterator<Item = &'static Capability> + '_ {
		self.by_name.values().copied()
	}

	pub fn len(&self) -> usize {
		self.by_name.len()
	}

	pub fn is_empty(&self) -> bool {
		self.by_name.is_empty()
	}

	/// What changes going from `self` to `newer`.
	pub fn diff(&self, newer: &CapabilitySet) -> CapabilityDiff {
		let mut diff = CapabilityDiff::default();
		for (name, cap) in &self.by_name {
			match newer.by_name.get(name) {
				None => diff.removed.push(*name),
				Some(other) if other != cap => diff.changed.push(*name),
				Some(_) => {}
			}
		}
		diff.added = newer
			.by_name
			.keys()
			.filter(|name| !self.by_name.contains_key(*name))
			.copied()
			.collect();
		diff
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{Signature, ValueKind};

	#[test]
	fn compute_current_plan_picks_most_recent_definition() {
		let v41 = CapabilitySet::resolve(VersionTag::Ras41);
		let v500 = CapabilitySet::resolve(VersionTag::Ras500);

		assert!(!v41.require("Compute_CurrentPlan").unwrap().signature.has_param("BlockingMode"));
		assert!(v500.require("Compute_CurrentPlan").unwrap().signature.has_param("BlockingMode"));
	}

	#[test]
	fn removed_capabilities_are_unsupported() {
		let set = CapabilitySet::resolve(VersionTag::Ras500);
		let err = set.require("Compute_Cancel").unwrap_err();
		assert_eq!(err.to_string(), "Compute_Cancel: operation not available in version 5.0");
	}

	#[test]
	fn diff_between_41_and_50() {
		let diff = CapabilitySet::resolve(VersionTag::Ras41).diff(&CapabilitySet::resolve(VersionTag::Ras500));
		assert_eq!(
			diff.added,
			[
				"Compute_Complete",
				"Compute_StartedFromController",
				"Geometry_BreachParamGetXML",
				"Geometry_BreachParamSetXML",
				"Geometry_RatioMann",
				"QuitRas",
			]
		);
		assert_eq!(
			diff.removed,
			[
				"Compute_Cancel",
				"Compute_IsStillComputing",
				"GetDataLocations_Input",
				"GetDataLocations_Input_count",
				"GetDataLocations_Output",
				"GetDataLocations_Output_count",
				"Output_Initialize",
				"SetDataLocations",
			]
		);
		assert_eq!(diff.changed, ["Compute_CurrentPlan"]);
	}

	#[test]
	fn later_introduction_wins_over_open_interval() {
		static TABLE: &[Capability] = &[
			Capability {
				name: "Probe",
				introduced: VersionTag::Ras41,
				removed: None,
				signature: Signature::new(&[], None),
				wait: None,
			},
			Capability {
				name: "Probe",
				introduced: VersionTag::Ras500,
				removed: None,
				signature: Signature::new(&[], Some(ValueKind::Int)),
				wait: None,
			},
		];

		let old = CapabilitySet::from_table(TABLE, VersionTag::Ras41);
		let new = CapabilitySet::from_table(TABLE, VersionTag::Ras507);
		assert_eq!(old.get("Probe").unwrap().signature.returns, None);
		assert_eq!(new.get("Probe").unwrap().signature.returns, Some(ValueKind::Int));
	}
}
