//! Error types for the HEC-RAS runtime.

use std::path::PathBuf;

use ras_protocol::VersionTag;
use thiserror::Error;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving a HEC-RAS session.
///
/// Window-wait and process-termination problems are not errors; see
/// [`DialogOutcome`](crate::sync::DialogOutcome) and
/// [`TerminateOutcome`](crate::sync::TerminateOutcome).
#[derive(Debug, Error)]
pub enum Error {
	/// The automation object for the requested version cannot be created.
	#[error("HEC-RAS {version} automation object not available: {reason}")]
	BackendUnavailable {
		/// Version tag as requested by the caller.
		version: String,
		reason: String,
	},

	/// A project path does not point at an existing file.
	#[error("project file not found: {}", .0.display())]
	ProjectNotFound(PathBuf),

	/// The operation exists in some release but not in the resolved one.
	#[error("{operation}: operation not available in version {version}")]
	UnsupportedOperation { operation: String, version: VersionTag },

	/// The vendor reported a failure through its error-message output.
	#[error("{operation} failed: {message}")]
	NativeCallFailed {
		operation: String,
		/// Vendor message, verbatim.
		message: String,
	},

	/// Arguments do not match the operation's declared signature.
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),

	/// The native side returned a result of the wrong shape.
	#[error("{operation} returned an unexpected result: {detail}")]
	UnexpectedResult { operation: String, detail: String },

	/// COM-level failure (HRESULT) outside the vendor's own error channel.
	#[error("COM error: {0}")]
	Com(String),

	/// I/O error.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}

impl Error {
	pub fn backend_unavailable(version: impl Into<String>, reason: impl Into<String>) -> Self {
		Error::BackendUnavailable {
			version: version.into(),
			reason: reason.into(),
		}
	}

	pub fn unexpected(operation: &str, detail: impl Into<String>) -> Self {
		Error::UnexpectedResult {
			operation: operation.to_string(),
			detail: detail.into(),
		}
	}

	/// Returns true if the operation is absent from the resolved version.
	pub fn is_unsupported(&self) -> bool {
		matches!(self, Error::UnsupportedOperation { .. })
	}

	/// Returns true if the session could not be created at all.
	pub fn is_backend_unavailable(&self) -> bool {
		matches!(self, Error::BackendUnavailable { .. })
	}

	/// Returns the vendor message if this is a native call failure.
	pub fn native_message(&self) -> Option<&str> {
		match self {
			Error::NativeCallFailed { message, .. } => Some(message),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unsupported_operation_names_the_version() {
		let err = Error::UnsupportedOperation {
			operation: "Compute_Cancel".to_string(),
			version: VersionTag::Ras500,
		};
		assert!(err.is_unsupported());
		assert_eq!(err.to_string(), "Compute_Cancel: operation not available in version 5.0");
	}

	#[test]
	fn native_failure_keeps_vendor_message_verbatim() {
		let err = Error::NativeCallFailed {
			operation: "Geometry_SetMann".to_string(),
			message: "River not found: Beaver Creek".to_string(),
		};
		assert_eq!(err.native_message(), Some("River not found: Beaver Creek"));
	}
}
