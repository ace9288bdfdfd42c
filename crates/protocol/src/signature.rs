//! Fixed method shapes of the automation surface.
//!
//! Every vendor method takes a fixed ordered parameter list. Some parameters
//! are written by the vendor (`ByRef` outputs); callers never supply those,
//! the facade fills a placeholder and reads the slot back after the call.

use serde::Serialize;

use crate::value::ValueKind;

/// Name of the string output the vendor uses to report failures.
pub const ERROR_MESSAGE_PARAM: &str = "errmsg";

/// Data flow of one parameter slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
	/// Supplied by the caller, not read back.
	In,
	/// Written by the vendor, supplied as a placeholder.
	Out,
	/// Supplied by the caller and read back.
	InOut,
}

/// One parameter slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Param {
	pub name: &'static str,
	pub kind: ValueKind,
	pub dir: Direction,
}

impl Param {
	pub const fn input(name: &'static str, kind: ValueKind) -> Self {
		Self { name, kind, dir: Direction::In }
	}

	pub const fn output(name: &'static str, kind: ValueKind) -> Self {
		Self { name, kind, dir: Direction::Out }
	}

	pub const fn in_out(name: &'static str, kind: ValueKind) -> Self {
		Self { name, kind, dir: Direction::InOut }
	}

	pub fn is_supplied(&self) -> bool {
		matches!(self.dir, Direction::In | Direction::InOut)
	}

	pub fn is_read_back(&self) -> bool {
		matches!(self.dir, Direction::Out | Direction::InOut)
	}

	pub fn is_error_message(&self) -> bool {
		self.name == ERROR_MESSAGE_PARAM && self.is_read_back()
	}
}

/// Ordered parameters and return kind of one method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Signature {
	pub params: &'static [Param],
	/// `None` for vendor subs that return nothing.
	pub returns: Option<ValueKind>,
}

impl Signature {
	pub const fn new(params: &'static [Param], returns: Option<ValueKind>) -> Self {
		Self { params, returns }
	}

	/// Parameters the caller must supply, in order.
	pub fn inputs(&self) -> impl Iterator<Item = &'static Param> {
		self.params.iter().filter(|p| p.is_supplied())
	}

	/// Parameters read back after the call, in order.
	pub fn outputs(&self) -> impl Iterator<Item = &'static Param> {
		self.params.iter().filter(|p| p.is_read_back())
	}

	pub fn input_count(&self) -> usize {
		self.inputs().count()
	}

	pub fn has_param(&self, name: &str) -> bool {
		self.params.iter().any(|p| p.name == name)
	}

	/// Human-readable form, e.g. `(river: string, reach: string) -> bool`.
	pub fn display(&self) -> String {
		let params = self
			.params
			.iter()
			.map(|p| {
				let prefix = match p.dir {
					Direction::In => "",
					Direction::Out => "out ",
					Direction::InOut => "inout ",
				};
				format!("{prefix}{}: {}", p.name, p.kind)
			})
			.collect::<Vec<_>>()
			.join(", ");
		match self.returns {
			Some(kind) => format!("({params}) -> {kind}"),
			None => format!("({params})"),
		}
	}
}
