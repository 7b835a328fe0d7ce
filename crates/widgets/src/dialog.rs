//! Modal dialog overlay.

use trellis_core::{
	ApplicationInstance, ComponentHandle, ComponentKind, ComponentSpec, ComponentUpdate,
	Directive, PeerError, SyncContext, SyncPeer, TreeError,
};

use crate::html;
use crate::window::TITLE;

/// Builder for a modal dialog.
#[derive(Debug, Default)]
pub struct Dialog {
	title: Option<String>,
	style_name: Option<String>,
}

impl Dialog {
	/// A dialog with a title.
	pub fn new(title: impl Into<String>) -> Self {
		Self {
			title: Some(title.into()),
			..Self::default()
		}
	}

	/// Stylesheet style name.
	pub fn style_name(mut self, name: impl Into<String>) -> Self {
		self.style_name = Some(name.into());
		self
	}

	/// Creates the component, detached.
	pub fn create(self, app: &mut ApplicationInstance) -> ComponentHandle {
		let mut spec = ComponentSpec::new(ComponentKind::Dialog);
		if let Some(title) = self.title {
			spec = spec.property(TITLE, title);
		}
		if let Some(name) = self.style_name {
			spec = spec.style_name(&name);
		}
		app.create(spec)
	}

	/// Creates the dialog, attaches it under `host`, and raises its modal
	/// barrier.
	pub fn open(
		self,
		app: &mut ApplicationInstance,
		host: ComponentHandle,
	) -> Result<ComponentHandle, TreeError> {
		let dialog = self.create(app);
		app.add(host, dialog, None)?;
		app.set_modal(dialog, true)?;
		Ok(dialog)
	}
}

/// Retires the dialog's barrier and detaches it from its parent.
pub fn close(app: &mut ApplicationInstance, dialog: ComponentHandle) -> Result<(), TreeError> {
	app.set_modal(dialog, false)?;
	if let Some(parent) = app.tree().parent(dialog) {
		app.remove(parent, dialog)?;
	}
	Ok(())
}

/// Renders `<dialog class="dialog">`.
pub struct DialogPeer;

impl SyncPeer for DialogPeer {
	fn render_add(&self, cx: &mut SyncContext<'_>, component: ComponentHandle) -> Result<(), PeerError> {
		let element = cx.element_id(component)?;
		let container = cx.container_of(component)?;
		let mut markup = String::from("<dialog class=\"dialog\"");
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

#[cfg(test)]
mod tests {
	use super::*;
	use crate::window::{ContentPane, Window};

	#[test]
	fn open_raises_the_barrier_and_close_retires_it() {
		let mut app = ApplicationInstance::new();
		let window = Window::new("main").create(&mut app);
		let pane = ContentPane::new().create(&mut app);
		app.add(window, pane, None).unwrap();
		app.set_window(window).unwrap();

		let dialog = Dialog::new("confirm").open(&mut app, pane).unwrap();
		assert_eq!(app.modal_context(), Some(dialog));

		close(&mut app, dialog).unwrap();
		assert_eq!(app.modal_context(), None);
		assert_eq!(app.tree().parent(dialog), None);
	}
}
