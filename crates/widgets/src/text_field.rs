//! Single-line text input, writable from the client.

use trellis_core::{
	ApplicationInstance, ComponentHandle, ComponentKind, ComponentSpec, ComponentUpdate,
	Directive, PeerError, SyncContext, SyncPeer, props,
};

use crate::html;

/// Displayed width in characters.
pub const COLUMNS: &str = "columns";

/// Action name a client sends when the field's value is committed (enter).
pub const COMMIT: &str = "commit";

/// Builder for a text field.
#[derive(Debug, Default)]
pub struct TextField {
	text: Option<String>,
	columns: Option<i64>,
	style_name: Option<String>,
}

impl TextField {
	/// An empty field.
	pub fn new() -> Self {
		Self::default()
	}

	/// Initial text.
	pub fn text(mut self, text: impl Into<String>) -> Self {
		self.text = Some(text.into());
		self
	}

	/// Displayed width in characters.
	pub fn columns(mut self, columns: i64) -> Self {
		self.columns = Some(columns);
		self
	}

	/// Stylesheet style name.
	pub fn style_name(mut self, name: impl Into<String>) -> Self {
		self.style_name = Some(name.into());
		self
	}

	/// Creates the component, detached.
	pub fn create(self, app: &mut ApplicationInstance) -> ComponentHandle {
		let mut spec = ComponentSpec::new(ComponentKind::TextField);
		if let Some(text) = self.text {
			spec = spec.property(props::TEXT, text);
		}
		if let Some(columns) = self.columns {
			spec = spec.property(COLUMNS, columns);
		}
		if let Some(name) = self.style_name {
			spec = spec.style_name(&name);
		}
		app.create(spec)
	}
}

/// Renders `<input class="text-field"/>`.
pub struct TextFieldPeer;

impl SyncPeer for TextFieldPeer {
	fn render_add(&self, cx: &mut SyncContext<'_>, component: ComponentHandle) -> Result<(), PeerError> {
		let element = cx.element_id(component)?;
		let container = cx.container_of(component)?;
		let mut markup = String::from("<input class=\"text-field\"");
		if let Some(text) = cx.rendered_property(component, props::TEXT) {
			markup.push_str(&format!(" value=\"{}\"", html::attr_value(&text)));
		}
		if let Some(columns) = cx.rendered_property(component, COLUMNS) {
			markup.push_str(&format!(" size=\"{}\"", html::attr_value(&columns)));
		}
		markup.push_str("/>");
		cx.emit(Directive::Append {
			container,
			element,
			markup,
		});
		Ok(())
	}

	fn render_update(
		&self,
		cx: &mut SyncContext<'_>,
		component: ComponentHandle,
		update: &ComponentUpdate,
	) -> Result<bool, PeerError> {
		if html::style_changed(update) {
			return Ok(true);
		}
		let element = cx.element_id(component)?;
		for (name, _) in update.changed_properties() {
			let attribute = match name {
				props::TEXT => "value",
				COLUMNS => "size",
				other => other,
			};
			let value = cx
				.rendered_property(component, name)
				.as_ref()
				.map(html::attr_value)
				.unwrap_or_default();
			cx.emit(Directive::SetAttribute {
				element: element.clone(),
				name: attribute.to_owned(),
				value,
			});
		}
		Ok(false)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn builder_round_trip() {
		let mut app = ApplicationInstance::new();
		let field = TextField::new().text("abc").columns(24).create(&mut app);
		assert_eq!(
			app.tree().local_property(field, props::TEXT),
			Some(&"abc".into())
		);
		assert_eq!(
			app.tree().local_property(field, COLUMNS),
			Some(&24i64.into())
		);
	}
}
