//! Property values stored in component styles and exchanged with the client.

use serde::{Deserialize, Serialize};

/// A property value.
///
/// Values are deliberately small: the framework never interprets them beyond
/// equality checks, so anything richer (extents, colors, layout data) travels
/// as text or numbers and is given meaning by the peers that render it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
	/// Boolean flag.
	Bool(bool),
	/// Signed integer.
	Int(i64),
	/// Floating point number.
	Float(f64),
	/// Text.
	Text(String),
}

impl Value {
	/// Returns the boolean payload, if this is a `Bool`.
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(b) => Some(*b),
			_ => None,
		}
	}

	/// Returns the integer payload, if this is an `Int`.
	pub fn as_int(&self) -> Option<i64> {
		match self {
			Self::Int(i) => Some(*i),
			_ => None,
		}
	}

	/// Returns the float payload, accepting `Int` with lossless widening.
	pub fn as_float(&self) -> Option<f64> {
		match self {
			Self::Float(f) => Some(*f),
			Self::Int(i) => Some(*i as f64),
			_ => None,
		}
	}

	/// Returns the text payload, if this is `Text`.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Text(s) => Some(s),
			_ => None,
		}
	}
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Self::Bool(v)
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Self::Int(v)
	}
}

impl From<i32> for Value {
	fn from(v: i32) -> Self {
		Self::Int(v.into())
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Self::Float(v)
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Self::Text(v.to_owned())
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Self::Text(v)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn untagged_round_trip() {
		let values = vec![
			Value::Bool(true),
			Value::Int(-3),
			Value::Float(1.5),
			Value::Text("50%".into()),
		];
		let json = serde_json::to_string(&values).unwrap();
		assert_eq!(json, r#"[true,-3,1.5,"50%"]"#);
		let back: Vec<Value> = serde_json::from_str(&json).unwrap();
		assert_eq!(back, values);
	}

	#[test]
	fn integers_deserialize_as_int_not_float() {
		let v: Value = serde_json::from_str("7").unwrap();
		assert_eq!(v, Value::Int(7));
		let v: Value = serde_json::from_str("7.0").unwrap();
		assert_eq!(v, Value::Float(7.0));
	}

	#[test]
	fn accessors() {
		assert_eq!(Value::from(true).as_bool(), Some(true));
		assert_eq!(Value::from(2).as_int(), Some(2));
		assert_eq!(Value::from(2).as_float(), Some(2.0));
		assert_eq!(Value::from("x").as_str(), Some("x"));
		assert_eq!(Value::from("x").as_int(), None);
	}
}
