use ras::{CapabilityDiff, CapabilitySet, VersionTag};
use serde::Serialize;

use crate::error::Result;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityRow {
	pub name: &'static str,
	pub signature: String,
	pub introduced: VersionTag,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub removed: Option<VersionTag>,
	/// Window title the call synchronizes on
	#[serde(skip_serializing_if = "Option::is_none")]
	pub window: Option<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CapabilitiesData {
	#[serde(rename_all = "camelCase")]
	List {
		version: VersionTag,
		count: usize,
		capabilities: Vec<CapabilityRow>,
	},
	#[serde(rename_all = "camelCase")]
	Diff {
		from: VersionTag,
		to: VersionTag,
		#[serde(flatten)]
		diff: CapabilityDiff,
	},
}

pub fn execute(tag: &str, diff_against: Option<&str>) -> Result<CapabilitiesData> {
	let version: VersionTag = tag.parse()?;
	let set = CapabilitySet::resolve(version);

	if let Some(other) = diff_against {
		let to: VersionTag = other.parse()?;
		let diff = set.diff(&CapabilitySet::resolve(to));
		return Ok(CapabilitiesData::Diff {
			from: version,
			to,
			diff,
		});
	}

	let capabilities: Vec<CapabilityRow> = set
		.iter()
		.map(|cap| CapabilityRow {
			name: cap.name,
			signature: cap.signature.display(),
			introduced: cap.introduced,
			removed: cap.removed,
			window: cap.wait.map(|w| w.title),
		})
		.collect();

	Ok(CapabilitiesData::List {
		version,
		count: capabilities.len(),
		capabilities,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::CliError;

	#[test]
	fn lists_resolved_rows_in_name_order() {
		let CapabilitiesData::List {
			version,
			count,
			capabilities,
		} = execute("RAS41", None).unwrap()
		else {
			panic!("expected a listing");
		};
		assert_eq!(version, VersionTag::Ras41);
		assert_eq!(count, capabilities.len());
		assert!(capabilities.windows(2).all(|w| w[0].name < w[1].name));

		let cancel = capabilities.iter().find(|c| c.name == "Compute_Cancel").unwrap();
		assert_eq!(cancel.removed, Some(VersionTag::Ras500));
	}

	#[test]
	fn diff_between_releases() {
		let CapabilitiesData::Diff { from, to, diff } = execute("4.1", Some("5.0")).unwrap() else {
			panic!("expected a diff");
		};
		assert_eq!((from, to), (VersionTag::Ras41, VersionTag::Ras500));
		assert!(diff.removed.contains(&"Compute_Cancel"));
		assert!(diff.changed.contains(&"Compute_CurrentPlan"));
	}

	#[test]
	fn diff_serializes_flat() {
		let data = execute("5.0", Some("5.0.7")).unwrap();
		let json = serde_json::to_value(&data).unwrap();
		assert_eq!(json["from"], "5.0");
		assert_eq!(json["to"], "5.0.7");
		assert!(json["added"].as_array().unwrap().is_empty());
	}

	#[test]
	fn unknown_tag_is_invalid_input() {
		assert!(matches!(execute("6.1", None), Err(CliError::InvalidInput(_))));
	}
}
