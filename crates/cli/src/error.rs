use std::path::PathBuf;

use thiserror::Error;

use crate::output::{CommandError, ErrorCode};

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
	#[error(transparent)]
	Ras(#[from] ras::Error),

	#[error("invalid configuration in {}: {source}", path.display())]
	Config {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	#[error("configuration file not found: {}", .0.display())]
	ConfigNotFound(PathBuf),

	#[error("invalid input: {0}")]
	InvalidInput(String),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Anyhow(#[from] anyhow::Error),
}

impl From<ras::UnknownVersion> for CliError {
	fn from(err: ras::UnknownVersion) -> Self {
		CliError::InvalidInput(err.to_string())
	}
}

impl CliError {
	/// Maps the error onto the envelope's error block.
	pub fn to_command_error(&self) -> CommandError {
		let (code, details) = match self {
			CliError::Ras(err) => classify_ras_error(err),
			CliError::Config { path, .. } | CliError::ConfigNotFound(path) => (
				ErrorCode::InvalidInput,
				Some(serde_json::json!({ "config": path })),
			),
			CliError::InvalidInput(_) | CliError::Json(_) => (ErrorCode::InvalidInput, None),
			CliError::Io(_) => (ErrorCode::IoError, None),
			CliError::Anyhow(err) => match err.downcast_ref::<ras::Error>() {
				Some(ras_err) => classify_ras_error(ras_err),
				None => (ErrorCode::InternalError, None),
			},
		};
		let message = match self {
			CliError::Anyhow(err) => format!("{err:#}"),
			other => other.to_string(),
		};
		CommandError { code, message, details }
	}
}

fn classify_ras_error(err: &ras::Error) -> (ErrorCode, Option<serde_json::Value>) {
	use ras::Error;

	match err {
		Error::BackendUnavailable { version, .. } => (
			ErrorCode::BackendUnavailable,
			Some(serde_json::json!({ "version": version })),
		),
		Error::ProjectNotFound(path) => (ErrorCode::ProjectNotFound, Some(serde_json::json!({ "project": path }))),
		Error::UnsupportedOperation { operation, version } => (
			ErrorCode::UnsupportedOperation,
			Some(serde_json::json!({ "operation": operation, "version": version })),
		),
		Error::NativeCallFailed { operation, message } => (
			ErrorCode::NativeCallFailed,
			Some(serde_json::json!({ "operation": operation, "nativeMessage": message })),
		),
		Error::InvalidArgument(_) => (ErrorCode::InvalidInput, None),
		Error::UnexpectedResult { operation, .. } => (
			ErrorCode::UnexpectedResult,
			Some(serde_json::json!({ "operation": operation })),
		),
		Error::Io(_) => (ErrorCode::IoError, None),
		Error::Com(_) => (ErrorCode::InternalError, None),
	}
}
