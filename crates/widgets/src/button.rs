//! Push button emitting click actions.

use trellis_core::{
	ApplicationInstance, ComponentHandle, ComponentKind, ComponentSpec, ComponentUpdate,
	Directive, PeerError, SyncContext, SyncPeer, Value, props,
};

use crate::html;

/// Action name a client sends when the button is pressed.
pub const CLICK: &str = "click";

/// Builder for a push button.
#[derive(Debug, Default)]
pub struct Button {
	text: Option<String>,
	style_name: Option<String>,
	enabled: Option<bool>,
}

impl Button {
	/// A button with a caption.
	pub fn new(text: impl Into<String>) -> Self {
		Self {
			text: Some(text.into()),
			..Self::default()
		}
	}

	/// Stylesheet style name.
	pub fn style_name(mut self, name: impl Into<String>) -> Self {
		self.style_name = Some(name.into());
		self
	}

	/// Initial enabled state (enabled when unset).
	pub fn enabled(mut self, enabled: bool) -> Self {
		self.enabled = Some(enabled);
		self
	}

	/// Creates the component, detached.
	pub fn create(self, app: &mut ApplicationInstance) -> ComponentHandle {
		let mut spec = ComponentSpec::new(ComponentKind::Button);
		if let Some(text) = self.text {
			spec = spec.property(props::TEXT, text);
		}
		if let Some(enabled) = self.enabled {
			spec = spec.property(props::ENABLED, enabled);
		}
		if let Some(name) = self.style_name {
			spec = spec.style_name(&name);
		}
		app.create(spec)
	}
}

/// Registers `handler` for the button's click action.
pub fn on_click(
	app: &mut ApplicationInstance,
	button: ComponentHandle,
	mut handler: impl FnMut(&mut ApplicationInstance) + Send + 'static,
) {
	app.on_action(button, move |app, event| {
		if &*event.name == CLICK {
			handler(app);
		}
	});
}

/// Renders `<button class="button">…</button>`.
pub struct ButtonPeer;

impl ButtonPeer {
	fn is_enabled(cx: &SyncContext<'_>, component: ComponentHandle) -> bool {
		cx.rendered_property(component, props::ENABLED)
			.and_then(|v| v.as_bool())
			.unwrap_or(true)
	}
}

impl SyncPeer for ButtonPeer {
	fn render_add(&self, cx: &mut SyncContext<'_>, component: ComponentHandle) -> Result<(), PeerError> {
		let element = cx.element_id(component)?;
		let container = cx.container_of(component)?;
		let mut markup = String::from("<button class=\"button\"");
		if !Self::is_enabled(cx, component) {
			markup.push_str(" disabled=\"true\"");
		}
		html::push_attr(&mut markup, cx, component, "background");
		markup.push('>');
		if let Some(text) = cx.rendered_property(component, props::TEXT) {
			markup.push_str(&html::attr_value(&text));
		}
		markup.push_str("</button>");
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
				props::ENABLED => {
					cx.emit(Directive::SetAttribute {
						element: element.clone(),
						name: "disabled".into(),
						value: (!Self::is_enabled(cx, component)).to_string(),
					});
				}
				other => {
					let value = cx
						.rendered_property(component, other)
						.as_ref()
						.map(html::attr_value)
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
