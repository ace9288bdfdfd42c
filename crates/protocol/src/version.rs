//! Supported HEC-RAS releases.
//!
//! Releases form a single linear lineage, oldest first. Capability
//! availability is expressed as half-open intervals over this ordering.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One HEC-RAS release with its own automation type library.
///
/// The derived ordering follows the release lineage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VersionTag {
	/// HEC-RAS 4.1.0
	#[serde(rename = "4.1")]
	Ras41,
	/// HEC-RAS 5.0 (2014-10-01 beta and later 5.0.x up to 5.0.6)
	#[serde(rename = "5.0")]
	Ras500,
	/// HEC-RAS 5.0.7
	#[serde(rename = "5.0.7")]
	Ras507,
}

/// A version tag that is not part of the supported lineage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown HEC-RAS version tag '{0}' (expected one of 4.1, 5.0, 5.0.7)")]
pub struct UnknownVersion(pub String);

impl VersionTag {
	/// Every supported version, oldest first.
	pub const ALL: [VersionTag; 3] = [VersionTag::Ras41, VersionTag::Ras500, VersionTag::Ras507];

	/// Dotted release number, e.g. `"5.0.7"`.
	pub fn as_str(self) -> &'static str {
		match self {
			VersionTag::Ras41 => "4.1",
			VersionTag::Ras500 => "5.0",
			VersionTag::Ras507 => "5.0.7",
		}
	}

	/// Type library prefix used by the vendor, e.g. `"RAS507"`.
	pub fn library(self) -> &'static str {
		match self {
			VersionTag::Ras41 => "RAS41",
			VersionTag::Ras500 => "RAS500",
			VersionTag::Ras507 => "RAS507",
		}
	}

	/// ProgID of the controller automation object.
	pub fn controller_prog_id(self) -> String {
		format!("{}.HECRASController", self.library())
	}

	/// ProgID of the geometry automation object.
	pub fn geometry_prog_id(self) -> String {
		format!("{}.HECRASGeometry", self.library())
	}

	/// Position in the lineage, `0` for the oldest release.
	pub fn ordinal(self) -> usize {
		self as usize
	}

	/// The release that immediately precedes this one, if any.
	pub fn previous(self) -> Option<VersionTag> {
		self.ordinal().checked_sub(1).map(|i| Self::ALL[i])
	}
}

impl fmt::Display for VersionTag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for VersionTag {
	type Err = UnknownVersion;

	/// Accepts dotted release numbers (`"5.0.7"`) and library prefixes
	/// (`"RAS507"`, case-insensitive).
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let trimmed = s.trim();
		let tag = match trimmed.to_ascii_uppercase().as_str() {
			"4.1" | "4.1.0" | "RAS41" => VersionTag::Ras41,
			"5.0" | "5.0.0" | "RAS500" => VersionTag::Ras500,
			"5.0.7" | "RAS507" => VersionTag::Ras507,
			_ => return Err(UnknownVersion(trimmed.to_string())),
		};
		Ok(tag)
	}
}
