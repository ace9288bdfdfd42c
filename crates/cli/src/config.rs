//! CLI configuration file.
//!
//! Looked up in order: `--config`, `$RAS_CONFIG`, then
//! `<user config dir>/ras/config.json`. Only the last one may be absent.
//!
//! ```json
//! {
//!   "version": "5.0.7",
//!   "sync": { "pollInterval": 250, "startHidden": true }
//! }
//! ```

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ras::SyncConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CliError, Result};

pub const CONFIG_ENV: &str = "RAS_CONFIG";

/// Release used when neither the command line nor the file names one.
pub const DEFAULT_VERSION: &str = "5.0.7";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RasConfig {
	pub version: Option<String>,
	pub sync: SyncConfig,
}

/// Command line values that win over the file.
#[derive(Debug, Clone, Default)]
pub struct RuntimeOverrides {
	pub version: Option<String>,
	pub poll_interval_ms: Option<u64>,
}

/// Configuration after overrides, as used by commands.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveConfig {
	pub version: String,
	pub sync: SyncConfig,
}

enum Source {
	Required(PathBuf),
	Optional(PathBuf),
	None,
}

fn locate(explicit: Option<&Path>, env: Option<OsString>) -> Source {
	if let Some(path) = explicit {
		return Source::Required(path.to_path_buf());
	}
	if let Some(path) = env.filter(|v| !v.is_empty()) {
		return Source::Required(PathBuf::from(path));
	}
	match dirs::config_dir() {
		Some(dir) => Source::Optional(dir.join("ras").join("config.json")),
		None => Source::None,
	}
}

impl RasConfig {
	/// Loads the configuration from the first location that applies.
	pub fn load(explicit: Option<&Path>) -> Result<Self> {
		match locate(explicit, std::env::var_os(CONFIG_ENV)) {
			Source::Required(path) => Self::from_file(&path),
			Source::Optional(path) if path.is_file() => Self::from_file(&path),
			Source::Optional(path) => {
				debug!(target = "ras", path = %path.display(), "no configuration file, using defaults");
				Ok(Self::default())
			}
			Source::None => Ok(Self::default()),
		}
	}

	pub fn from_file(path: &Path) -> Result<Self> {
		let content = match fs::read_to_string(path) {
			Ok(content) => content,
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
				return Err(CliError::ConfigNotFound(path.to_path_buf()));
			}
			Err(err) => return Err(err.into()),
		};
		let config = serde_json::from_str(&content).map_err(|source| CliError::Config {
			path: path.to_path_buf(),
			source,
		})?;
		debug!(target = "ras", path = %path.display(), "loaded configuration");
		Ok(config)
	}

	pub fn apply(self, overrides: &RuntimeOverrides) -> EffectiveConfig {
		let mut sync = self.sync;
		if let Some(ms) = overrides.poll_interval_ms {
			sync.poll_interval = Duration::from_millis(ms);
		}
		let version = overrides
			.version
			.clone()
			.or(self.version)
			.unwrap_or_else(|| DEFAULT_VERSION.to_string());
		EffectiveConfig { version, sync }
	}
}
