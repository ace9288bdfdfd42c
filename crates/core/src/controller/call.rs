//! Result of a generic capability call.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::{DialogOutcome, Value};

/// Return value and read-back slots of one native call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallOutput {
	pub operation: &'static str,
	/// Return value, `Null` for vendor subs.
	pub ret: Value,
	/// Every `Out`/`InOut` slot, in declaration order, after unmarshaling.
	pub outputs: Vec<(&'static str, Value)>,
	/// Window synchronization performed after the call, if any.
	#[serde(skip)]
	pub dialog: Option<DialogOutcome>,
}

impl CallOutput {
	pub fn output(&self, name: &str) -> Option<&Value> {
		self.outputs.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
	}

	/// Removes and returns an output slot; a missing slot reads as `Null`.
	pub fn take(&mut self, name: &str) -> Value {
		match self.outputs.iter().position(|(n, _)| *n == name) {
			Some(i) => self.outputs.remove(i).1,
			None => Value::Null,
		}
	}

	fn unexpected(&self, what: &str, value: &Value) -> Error {
		Error::unexpected(self.operation, format!("{what} is {}", value.type_name()))
	}

	pub fn ret_bool(&self) -> Result<bool> {
		self.ret.as_bool().ok_or_else(|| self.unexpected("return value", &self.ret))
	}

	pub fn ret_i64(&self) -> Result<i64> {
		self.ret.as_i64().ok_or_else(|| self.unexpected("return value", &self.ret))
	}

	pub fn ret_f64(&self) -> Result<f64> {
		self.ret.as_f64().ok_or_else(|| self.unexpected("return value", &self.ret))
	}

	pub fn ret_string(&self) -> Result<String> {
		self.ret
			.clone()
			.into_string()
			.ok_or_else(|| self.unexpected("return value", &self.ret))
	}

	/// Integer output; a `Null` slot reads as 0.
	pub fn i64_out(&self, name: &str) -> Result<i64> {
		match self.output(name) {
			None | Some(Value::Null) => Ok(0),
			Some(v) => v.as_i64().ok_or_else(|| self.unexpected(name, v)),
		}
	}

	pub fn strings(&mut self, name: &str) -> Result<Vec<String>> {
		let value = self.take(name);
		let found = value.type_name();
		value
			.into_str_seq()
			.ok_or_else(|| Error::unexpected(self.operation, format!("{name} is {found}")))
	}

	pub fn floats(&mut self, name: &str) -> Result<Vec<f64>> {
		let value = self.take(name);
		let found = value.type_name();
		value
			.into_f64_seq()
			.ok_or_else(|| Error::unexpected(self.operation, format!("{name} is {found}")))
	}

	pub fn ints(&mut self, name: &str) -> Result<Vec<i64>> {
		let value = self.take(name);
		let found = value.type_name();
		value
			.into_i64_seq()
			.ok_or_else(|| Error::unexpected(self.operation, format!("{name} is {found}")))
	}

	/// String sequence trimmed to the length reported in `count`.
	pub fn counted_strings(&mut self, count: &str, name: &str) -> Result<Vec<String>> {
		let n = self.i64_out(count)?.max(0) as usize;
		let mut items = self.strings(name)?;
		items.truncate(n);
		Ok(items)
	}
}
