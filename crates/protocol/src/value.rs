//! Marshaled values exchanged with the automation object.
//!
//! A native call takes an ordered list of [`Value`]s and hands back the
//! return value followed by the final contents of every argument slot.
//! Array slots carry an [`IndexBase`] because the vendor mixes 0-based and
//! 1-based conventions from one method to the next.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Indexing convention of an array slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBase {
	/// The sequence is passed through as-is.
	Zero,
	/// The vendor ignores element 0; a dummy element is prepended on the way
	/// in and dropped on the way out.
	One,
}

/// Declared type of an argument or result slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "base", rename_all = "snake_case")]
pub enum ValueKind {
	Bool,
	Int,
	Float,
	Str,
	IntSeq(IndexBase),
	FloatSeq(IndexBase),
	StrSeq(IndexBase),
	/// Slot whose shape the vendor does not fix (variant results).
	Any,
}

/// A single marshaled slot.
///
/// Serialized untagged so that plain JSON (`"Beaver Creek"`, `2`, `[0.1, 0.2]`)
/// maps straight onto values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
	#[default]
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	Str(String),
	IntSeq(Vec<i64>),
	FloatSeq(Vec<f64>),
	StrSeq(Vec<String>),
}

/// A value that does not fit the slot it was offered to.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("expected {expected}, got {found}")]
pub struct ValueError {
	pub expected: ValueKind,
	pub found: &'static str,
}

impl fmt::Display for ValueKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let base = |b: &IndexBase| match b {
			IndexBase::Zero => "0-based",
			IndexBase::One => "1-based",
		};
		match self {
			ValueKind::Bool => f.write_str("bool"),
			ValueKind::Int => f.write_str("int"),
			ValueKind::Float => f.write_str("float"),
			ValueKind::Str => f.write_str("string"),
			ValueKind::IntSeq(b) => write!(f, "int[] ({})", base(b)),
			ValueKind::FloatSeq(b) => write!(f, "float[] ({})", base(b)),
			ValueKind::StrSeq(b) => write!(f, "string[] ({})", base(b)),
			ValueKind::Any => f.write_str("any"),
		}
	}
}

impl ValueKind {
	/// Value handed to the native side for an output-only slot.
	pub fn placeholder(self) -> Value {
		match self {
			ValueKind::Bool => Value::Bool(false),
			ValueKind::Int => Value::Int(0),
			ValueKind::Float => Value::Float(0.0),
			ValueKind::Str => Value::Str(String::new()),
			ValueKind::IntSeq(_) => Value::IntSeq(Vec::new()),
			ValueKind::FloatSeq(_) => Value::FloatSeq(Vec::new()),
			ValueKind::StrSeq(_) => Value::StrSeq(Vec::new()),
			ValueKind::Any => Value::Null,
		}
	}

	pub fn index_base(self) -> Option<IndexBase> {
		match self {
			ValueKind::IntSeq(b) | ValueKind::FloatSeq(b) | ValueKind::StrSeq(b) => Some(b),
			_ => None,
		}
	}
}

impl Value {
	/// Short name of the variant, used in error messages.
	pub fn type_name(&self) -> &'static str {
		match self {
			Value::Null => "null",
			Value::Bool(_) => "bool",
			Value::Int(_) => "int",
			Value::Float(_) => "float",
			Value::Str(_) => "string",
			Value::IntSeq(_) => "int[]",
			Value::FloatSeq(_) => "float[]",
			Value::StrSeq(_) => "string[]",
		}
	}

	/// Converts the value to the declared slot kind.
	///
	/// Widening conversions are applied (int to float, int[] to float[]),
	/// everything else must already match. An empty sequence is accepted for
	/// any sequence kind.
	pub fn coerce(self, kind: ValueKind) -> Result<Value, ValueError> {
		let found = self.type_name();
		let mismatch = || ValueError { expected: kind, found };
		match (kind, self) {
			(ValueKind::Any, v) => Ok(v),
			(ValueKind::Bool, Value::Bool(b)) => Ok(Value::Bool(b)),
			(ValueKind::Bool, Value::Int(i)) if i == 0 || i == 1 || i == -1 => Ok(Value::Bool(i != 0)),
			(ValueKind::Int, Value::Int(i)) => Ok(Value::Int(i)),
			(ValueKind::Float, Value::Float(x)) => Ok(Value::Float(x)),
			(ValueKind::Float, Value::Int(i)) => Ok(Value::Float(i as f64)),
			(ValueKind::Str, Value::Str(s)) => Ok(Value::Str(s)),
			(ValueKind::IntSeq(_), Value::IntSeq(v)) => Ok(Value::IntSeq(v)),
			(ValueKind::FloatSeq(_), Value::FloatSeq(v)) => Ok(Value::FloatSeq(v)),
			(ValueKind::FloatSeq(_), Value::IntSeq(v)) => Ok(Value::FloatSeq(v.into_iter().map(|i| i as f64).collect())),
			(ValueKind::StrSeq(_), Value::StrSeq(v)) => Ok(Value::StrSeq(v)),
			(ValueKind::IntSeq(_) | ValueKind::StrSeq(_), Value::FloatSeq(v)) if v.is_empty() => Ok(kind.placeholder()),
			(ValueKind::FloatSeq(_) | ValueKind::StrSeq(_), Value::IntSeq(v)) if v.is_empty() => Ok(kind.placeholder()),
			(ValueKind::IntSeq(_) | ValueKind::FloatSeq(_), Value::StrSeq(v)) if v.is_empty() => Ok(kind.placeholder()),
			_ => Err(mismatch()),
		}
	}

	/// Applies the slot's indexing convention before a native call.
	pub fn to_wire(self, kind: ValueKind) -> Value {
		if kind.index_base() != Some(IndexBase::One) {
			return self;
		}
		match self {
			Value::IntSeq(mut v) => {
				v.insert(0, 0);
				Value::IntSeq(v)
			}
			Value::FloatSeq(mut v) => {
				v.insert(0, 0.0);
				Value::FloatSeq(v)
			}
			Value::StrSeq(mut v) => {
				v.insert(0, String::new());
				Value::StrSeq(v)
			}
			other => other,
		}
	}

	/// Reverses [`Value::to_wire`] on a value read back from a native call.
	pub fn from_wire(self, kind: ValueKind) -> Value {
		if kind.index_base() != Some(IndexBase::One) {
			return self;
		}
		match self {
			Value::IntSeq(v) => Value::IntSeq(v.into_iter().skip(1).collect()),
			Value::FloatSeq(v) => Value::FloatSeq(v.into_iter().skip(1).collect()),
			Value::StrSeq(v) => Value::StrSeq(v.into_iter().skip(1).collect()),
			other => other,
		}
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::Str(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Value::Int(i) => Some(*i),
			Value::Float(x) if x.fract() == 0.0 => Some(*x as i64),
			_ => None,
		}
	}

	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Value::Float(x) => Some(*x),
			Value::Int(i) => Some(*i as f64),
			_ => None,
		}
	}

	/// Truthiness as the vendor reports it (VB `True` is `-1`).
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Value::Bool(b) => Some(*b),
			Value::Int(i) => Some(*i != 0),
			_ => None,
		}
	}

	/// String sequence; a null slot reads as empty.
	pub fn into_str_seq(self) -> Option<Vec<String>> {
		match self {
			Value::StrSeq(v) => Some(v),
			Value::Null => Some(Vec::new()),
			_ => None,
		}
	}

	/// Float sequence; integer sequences widen and a null slot reads as empty.
	pub fn into_f64_seq(self) -> Option<Vec<f64>> {
		match self {
			Value::FloatSeq(v) => Some(v),
			Value::IntSeq(v) => Some(v.into_iter().map(|i| i as f64).collect()),
			Value::Null => Some(Vec::new()),
			_ => None,
		}
	}

	pub fn into_i64_seq(self) -> Option<Vec<i64>> {
		match self {
			Value::IntSeq(v) => Some(v),
			Value::Null => Some(Vec::new()),
			_ => None,
		}
	}

	pub fn into_string(self) -> Option<String> {
		match self {
			Value::Str(s) => Some(s),
			Value::Null => Some(String::new()),
			_ => None,
		}
	}
}

impl From<&str> for Value {
	fn from(s: &str) -> Self {
		Value::Str(s.to_string())
	}
}

impl From<String> for Value {
	fn from(s: String) -> Self {
		Value::Str(s)
	}
}

impl From<bool> for Value {
	fn from(b: bool) -> Self {
		Value::Bool(b)
	}
}

impl From<i64> for Value {
	fn from(i: i64) -> Self {
		Value::Int(i)
	}
}

impl From<i32> for Value {
	fn from(i: i32) -> Self {
		Value::Int(i64::from(i))
	}
}

impl From<u32> for Value {
	fn from(i: u32) -> Self {
		Value::Int(i64::from(i))
	}
}

impl From<f64> for Value {
	fn from(x: f64) -> Self {
		Value::Float(x)
	}
}

impl From<Vec<f64>> for Value {
	fn from(v: Vec<f64>) -> Self {
		Value::FloatSeq(v)
	}
}

impl From<&[f64]> for Value {
	fn from(v: &[f64]) -> Self {
		Value::FloatSeq(v.to_vec())
	}
}

impl From<Vec<String>> for Value {
	fn from(v: Vec<String>) -> Self {
		Value::StrSeq(v)
	}
}

impl From<&[&str]> for Value {
	fn from(v: &[&str]) -> Self {
		Value::StrSeq(v.iter().map(|s| s.to_string()).collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn one_based_sequences_gain_and_lose_a_dummy_element() {
		let kind = ValueKind::FloatSeq(IndexBase::One);
		let wire = Value::FloatSeq(vec![0.035, 0.04]).to_wire(kind);
		assert_eq!(wire, Value::FloatSeq(vec![0.0, 0.035, 0.04]));
		assert_eq!(wire.from_wire(kind), Value::FloatSeq(vec![0.035, 0.04]));
	}

	#[test]
	fn zero_based_sequences_pass_through() {
		let kind = ValueKind::StrSeq(IndexBase::Zero);
		let v = Value::StrSeq(vec!["a".into(), "b".into()]);
		assert_eq!(v.clone().to_wire(kind), v);
		assert_eq!(v.clone().from_wire(kind), v);
	}

	#[test]
	fn coerce_widens_ints() {
		assert_eq!(Value::Int(3).coerce(ValueKind::Float).unwrap(), Value::Float(3.0));
		assert_eq!(
			Value::IntSeq(vec![1, 2]).coerce(ValueKind::FloatSeq(IndexBase::One)).unwrap(),
			Value::FloatSeq(vec![1.0, 2.0])
		);
	}

	#[test]
	fn coerce_rejects_mismatched_kinds() {
		let err = Value::Str("x".into()).coerce(ValueKind::Int).unwrap_err();
		assert_eq!(err.found, "string");
		assert_eq!(err.to_string(), "expected int, got string");
	}

	#[test]
	fn untagged_json_maps_to_values() {
		let values: Vec<Value> = serde_json::from_str(r#"["Beaver Creek", 2, 0.5, [0.1, 0.2], ["a"], null, true]"#).unwrap();
		assert_eq!(values[0], Value::Str("Beaver Creek".into()));
		assert_eq!(values[1], Value::Int(2));
		assert_eq!(values[2], Value::Float(0.5));
		assert_eq!(values[3], Value::FloatSeq(vec![0.1, 0.2]));
		assert_eq!(values[4], Value::StrSeq(vec!["a".into()]));
		assert_eq!(values[5], Value::Null);
		assert_eq!(values[6], Value::Bool(true));
	}

	#[test]
	fn vb_true_reads_as_bool() {
		assert_eq!(Value::Int(-1).as_bool(), Some(true));
		assert_eq!(Value::Int(0).as_bool(), Some(false));
	}
}
