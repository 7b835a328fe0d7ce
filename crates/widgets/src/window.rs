//! The top-level window and the content pane that fills it.

use trellis_core::{
	ApplicationInstance, ComponentHandle, ComponentKind, ComponentSpec, ComponentUpdate,
	Directive, PeerError, SyncContext, SyncPeer,
};

use crate::html;

/// Window title text.
pub const TITLE: &str = "title";

/// Builder for the top-level window.
#[derive(Debug, Default)]
pub struct Window {
	title: Option<String>,
}

impl Window {
	/// A window with a title.
	pub fn new(title: impl Into<String>) -> Self {
		Self {
			title: Some(title.into()),
		}
	}

	/// An untitled window.
	pub fn untitled() -> Self {
		Self::default()
	}

	/// Creates the component, detached. Install it with
	/// `ApplicationInstance::set_window`.
	pub fn create(self, app: &mut ApplicationInstance) -> ComponentHandle {
		let mut spec = ComponentSpec::new(ComponentKind::Window);
		if let Some(title) = self.title {
			spec = spec.property(TITLE, title);
		}
		app.create(spec)
	}
}

/// Builder for a content pane.
#[derive(Debug, Default)]
pub struct ContentPane {
	style_name: Option<String>,
}

impl ContentPane {
	/// A plain content pane.
	pub fn new() -> Self {
		Self::default()
	}

	/// Stylesheet style name.
	pub fn style_name(mut self, name: impl Into<String>) -> Self {
		self.style_name = Some(name.into());
		self
	}

	/// Creates the component, detached.
	pub fn create(self, app: &mut ApplicationInstance) -> ComponentHandle {
		let mut spec = ComponentSpec::new(ComponentKind::ContentPane);
		if let Some(name) = self.style_name {
			spec = spec.style_name(&name);
		}
		app.create(spec)
	}
}

/// Renders the window shell.
pub struct WindowPeer;

impl SyncPeer for WindowPeer {
	fn render_add(&self, cx: &mut SyncContext<'_>, component: ComponentHandle) -> Result<(), PeerError> {
		let element = cx.element_id(component)?;
		let container = cx.container_of(component)?;
		let mut markup = String::from("<window");
		html::push_attr(&mut markup, cx, component, TITLE);
		markup.push('>');
		cx.emit(Directive::Append {
			container,
			element,
			markup,
		});
		cx.render_children(component)
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
			let value = cx
				.rendered_property(component, name)
				.as_ref()
				.map(html::attr_value)
				.unwrap_or_default();
			cx.emit(Directive::SetAttribute {
				element: element.clone(),
				name: name.to_owned(),
				value,
			});
		}
		Ok(false)
	}
}

/// Renders `<div class="content-pane">`.
pub struct ContentPanePeer;

impl SyncPeer for ContentPanePeer {
	fn render_add(&self, cx: &mut SyncContext<'_>, component: ComponentHandle) -> Result<(), PeerError> {
		let element = cx.element_id(component)?;
		let container = cx.container_of(component)?;
		let mut markup = String::from("<div class=\"content-pane\"");
		html::push_attr(&mut markup, cx, component, "background");
		markup.push('>');
		cx.emit(Directive::Append {
			container,
			element,
			markup,
		});
		cx.render_children(component)
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
			let value = cx
				.rendered_property(component, name)
				.as_ref()
				.map(html::attr_value)
				.unwrap_or_default();
			cx.emit(Directive::SetAttribute {
				element: element.clone(),
				name: name.to_owned(),
				value,
			});
		}
		Ok(false)
	}
}
