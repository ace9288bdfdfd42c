use ras::VersionTag;
use serde::Serialize;

use super::CommandContext;

#[derive(Debug, Serialize)]
pub struct VersionsData {
	/// Releases whose automation library is installed
	pub installed: Vec<VersionTag>,
	/// Releases this build knows how to drive
	pub supported: Vec<VersionTag>,
}

pub fn execute(ctx: &CommandContext<'_>) -> VersionsData {
	VersionsData {
		installed: ctx.backend.available_versions(),
		supported: VersionTag::ALL.to_vec(),
	}
}

#[cfg(test)]
mod tests {
	use ras::testing::FakeBackend;

	use super::*;
	use crate::config::{RasConfig, RuntimeOverrides};

	#[test]
	fn lists_installed_and_supported_releases() {
		let backend = FakeBackend::new(&[VersionTag::Ras507, VersionTag::Ras41]);
		let ctx = CommandContext::new(&backend, RasConfig::default().apply(&RuntimeOverrides::default()));

		let data = execute(&ctx);
		assert_eq!(data.installed, [VersionTag::Ras41, VersionTag::Ras507]);
		assert_eq!(data.supported.len(), 3);

		let json = serde_json::to_value(&data).unwrap();
		assert_eq!(json["installed"][1], "5.0.7");
	}
}
