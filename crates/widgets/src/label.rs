//! Static text display.

use trellis_core::{
	ApplicationInstance, ComponentHandle, ComponentKind, ComponentSpec, ComponentUpdate,
	Directive, PeerError, SyncContext, SyncPeer, props,
};

use crate::html;

/// Builder for a text label.
#[derive(Debug, Default)]
pub struct Label {
	text: Option<String>,
	style_name: Option<String>,
}

impl Label {
	/// A label with initial text.
	pub fn new(text: impl Into<String>) -> Self {
		Self {
			text: Some(text.into()),
			..Self::default()
		}
	}

	/// An empty label.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Stylesheet style name.
	pub fn style_name(mut self, name: impl Into<String>) -> Self {
		self.style_name = Some(name.into());
		self
	}

	/// Creates the component, detached.
	pub fn create(self, app: &mut ApplicationInstance) -> ComponentHandle {
		let mut spec = ComponentSpec::new(ComponentKind::Label);
		if let Some(text) = self.text {
			spec = spec.property(props::TEXT, text);
		}
		if let Some(name) = self.style_name {
			spec = spec.style_name(&name);
		}
		app.create(spec)
	}
}

/// Renders `<span class="label">…</span>`.
pub struct LabelPeer;

impl SyncPeer for LabelPeer {
	fn render_add(&self, cx: &mut SyncContext<'_>, component: ComponentHandle) -> Result<(), PeerError> {
		let element = cx.element_id(component)?;
		let container = cx.container_of(component)?;
		let mut markup = String::from("<span class=\"label\"");
		html::push_attr(&mut markup, cx, component, "foreground");
		html::push_attr(&mut markup, cx, component, "background");
		markup.push('>');
		if let Some(text) = cx.rendered_property(component, props::TEXT) {
			markup.push_str(&html::attr_value(&text));
		}
		markup.push_str("</span>");
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
			match name {
				props::TEXT => {
					let text = cx
						.rendered_property(component, props::TEXT)
						.and_then(|v| v.as_str().map(html::escape))
						.unwrap_or_default();
					cx.emit(Directive::SetText {
						element: element.clone(),
						text,
					});
				}
				other => {
					let value = cx
						.rendered_property(component, other)
						.map(|v| html::attr_value(&v))
						.unwrap_or_default();
					cx.emit(Directive::SetAttribute {
						element: element.clone(),
						name: other.to_owned(),
						value,
					});
				}
			}
		}
		Ok(false)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn builder_sets_text_and_style_name() {
		let mut app = ApplicationInstance::new();
		let label = Label::new("hi").style_name("title").create(&mut app);
		assert_eq!(app.tree().kind(label).unwrap(), ComponentKind::Label);
		assert_eq!(
			app.tree().local_property(label, props::TEXT),
			Some(&"hi".into())
		);
		assert_eq!(app.tree().style_name(label), Some("title"));
	}
}
