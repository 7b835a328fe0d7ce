//! Small helpers for the HTML-flavoured markup the peers emit.

use trellis_core::{ComponentHandle, ComponentUpdate, SyncContext, Value, props};

/// Escapes text for use inside markup text content or attribute values.
pub fn escape(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			_ => out.push(c),
		}
	}
	out
}

/// Renders a value as an attribute string.
pub fn attr_value(value: &Value) -> String {
	match value {
		Value::Text(text) => escape(text),
		Value::Bool(b) => b.to_string(),
		Value::Int(i) => i.to_string(),
		Value::Float(f) => f.to_string(),
	}
}

/// Appends ` name="value"` when the rendered property is set.
pub fn push_attr(markup: &mut String, cx: &SyncContext<'_>, component: ComponentHandle, name: &str) {
	if let Some(value) = cx.rendered_property(component, name) {
		markup.push_str(&format!(" {name}=\"{}\"", attr_value(&value)));
	}
}

/// Whether the update touched the style layers, which invalidates every
/// rendered property and therefore the whole element.
pub fn style_changed(update: &ComponentUpdate) -> bool {
	update.property(props::STYLE_NAME).is_some() || update.property(props::SHARED_STYLE).is_some()
}
