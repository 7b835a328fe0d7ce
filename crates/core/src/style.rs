//! Property stores and the application stylesheet.
//!
//! Rendered property lookup is layered: a component's local style wins over
//! its shared style, which wins over the stylesheet entry selected by the
//! component's kind and style name. The first layer where a property is
//! explicitly set decides, even when it is set to an "empty" value.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::component::ComponentKind;
use crate::value::Value;

/// One named property entry: either a scalar or an indexed series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum Slot {
	Scalar(Value),
	Indexed(Vec<Option<Value>>),
}

/// A set of named (and optionally indexed) property values.
///
/// Used both as the local property store of a component and as a shared
/// style attached to many components at once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Style {
	entries: FxHashMap<Box<str>, Slot>,
}

impl Style {
	/// Creates an empty style.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets `name` to `value`, returning the previous scalar value.
	///
	/// Setting `None` removes the entry, which is distinct from the entry
	/// never having been set only in the return value.
	pub fn set(&mut self, name: &str, value: Option<Value>) -> Option<Value> {
		match value {
			Some(value) => match self.entries.insert(name.into(), Slot::Scalar(value)) {
				Some(Slot::Scalar(old)) => Some(old),
				_ => None,
			},
			None => match self.entries.remove(name) {
				Some(Slot::Scalar(old)) => Some(old),
				_ => None,
			},
		}
	}

	/// Sets position `index` of the indexed property `name`.
	///
	/// The series grows as needed; unset positions read as `None`.
	pub fn set_indexed(&mut self, name: &str, index: usize, value: Option<Value>) -> Option<Value> {
		let slot = self
			.entries
			.entry(name.into())
			.or_insert_with(|| Slot::Indexed(Vec::new()));
		if !matches!(slot, Slot::Indexed(_)) {
			// A scalar under the same name is displaced by the series.
			*slot = Slot::Indexed(Vec::new());
		}
		let Slot::Indexed(series) = slot else {
			return None;
		};
		if series.len() <= index {
			series.resize(index + 1, None);
		}
		std::mem::replace(&mut series[index], value)
	}

	/// Returns the scalar value of `name`, if set.
	pub fn get(&self, name: &str) -> Option<&Value> {
		match self.entries.get(name)? {
			Slot::Scalar(value) => Some(value),
			Slot::Indexed(_) => None,
		}
	}

	/// Returns position `index` of the indexed property `name`, if set.
	pub fn get_indexed(&self, name: &str, index: usize) -> Option<&Value> {
		match self.entries.get(name)? {
			Slot::Indexed(series) => series.get(index)?.as_ref(),
			Slot::Scalar(_) => None,
		}
	}

	/// Whether `name` is explicitly set (scalar or any indexed position).
	pub fn is_set(&self, name: &str) -> bool {
		self.entries.contains_key(name)
	}

	/// Whether no property is set.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterates over scalar entries.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.entries.iter().filter_map(|(name, slot)| match slot {
			Slot::Scalar(value) => Some((name.as_ref(), value)),
			Slot::Indexed(_) => None,
		})
	}
}

/// One stylesheet rule: properties applied to components of `kind` whose
/// style name equals `name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StyleSheetEntry {
	kind: Box<str>,
	name: Box<str>,
	properties: Style,
}

/// An application-wide stylesheet.
///
/// Rules are keyed by `(component kind, style name)`. Kinds are addressed by
/// their wire name (see [`ComponentKind::name`]) so custom kinds participate
/// without special registration.
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
	styles: FxHashMap<(Box<str>, Box<str>), Arc<Style>>,
}

impl StyleSheet {
	/// Creates an empty stylesheet.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds or replaces the rule for `(kind, name)`.
	pub fn insert(&mut self, kind: ComponentKind, name: &str, style: Style) {
		self.styles
			.insert((kind.name().into(), name.into()), Arc::new(style));
	}

	/// Returns the style for `(kind, name)`, if a rule exists.
	pub fn get(&self, kind: ComponentKind, name: &str) -> Option<&Arc<Style>> {
		self.styles.get(&(Box::from(kind.name()), Box::from(name)))
	}

	/// Resolves a single property through the stylesheet layer.
	pub fn property(&self, kind: ComponentKind, name: &str, property: &str) -> Option<&Value> {
		self.get(kind, name)?.get(property)
	}

	/// Parses a stylesheet from its JSON document form.
	///
	/// The document is a list of `{kind, name, properties}` rules. Later
	/// rules for the same `(kind, name)` replace earlier ones.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		let entries: Vec<StyleSheetEntry> = serde_json::from_str(json)?;
		let mut sheet = Self::new();
		for entry in entries {
			sheet
				.styles
				.insert((entry.kind, entry.name), Arc::new(entry.properties));
		}
		Ok(sheet)
	}
}
