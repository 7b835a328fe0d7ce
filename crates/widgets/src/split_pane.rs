//! Two-child resizable pane with slot-addressed children.

use tracing::trace;
use trellis_core::{
	ApplicationInstance, ComponentHandle, ComponentKind, ComponentSpec, ComponentTree,
	ComponentUpdate, Directive, ElementId, PeerError, SyncContext, SyncPeer, UpdateFlags,
};

use crate::html;

/// `horizontal` or `vertical` split direction.
pub const ORIENTATION: &str = "orientation";

/// Separator offset from the leading edge, in pixels.
pub const SEPARATOR_POSITION: &str = "separator-position";

/// Builder for a split pane.
#[derive(Debug, Default)]
pub struct SplitPane {
	vertical: bool,
	separator_position: Option<i64>,
	style_name: Option<String>,
}

impl SplitPane {
	/// A left/right split.
	pub fn horizontal() -> Self {
		Self::default()
	}

	/// A top/bottom split.
	pub fn vertical() -> Self {
		Self {
			vertical: true,
			..Self::default()
		}
	}

	/// Separator offset in pixels.
	pub fn separator_position(mut self, position: i64) -> Self {
		self.separator_position = Some(position);
		self
	}

	/// Stylesheet style name.
	pub fn style_name(mut self, name: impl Into<String>) -> Self {
		self.style_name = Some(name.into());
		self
	}

	/// Creates the component, detached.
	pub fn create(self, app: &mut ApplicationInstance) -> ComponentHandle {
		let mut spec = ComponentSpec::new(ComponentKind::SplitPane).property(
			ORIENTATION,
			if self.vertical { "vertical" } else { "horizontal" },
		);
		if let Some(position) = self.separator_position {
			spec = spec.property(SEPARATOR_POSITION, position);
		}
		if let Some(name) = self.style_name {
			spec = spec.style_name(&name);
		}
		app.create(spec)
	}
}

/// Which child occupied which slot at the previous render.
struct SplitState {
	slots: [Option<ComponentHandle>; 2],
}

fn current_slots(tree: &ComponentTree, component: ComponentHandle) -> [Option<ComponentHandle>; 2] {
	let children = tree.children(component);
	[children.first().copied(), children.get(1).copied()]
}

/// Renders the split shell with two slot containers.
pub struct SplitPanePeer;

impl SyncPeer for SplitPanePeer {
	fn render_add(&self, cx: &mut SyncContext<'_>, component: ComponentHandle) -> Result<(), PeerError> {
		let element = cx.element_id(component)?;
		let container = cx.container_of(component)?;
		let mut markup = String::from("<div class=\"split-pane\"");
		html::push_attr(&mut markup, cx, component, ORIENTATION);
		html::push_attr(&mut markup, cx, component, SEPARATOR_POSITION);
		markup.push('>');
		for slot in 0..2 {
			markup.push_str(&format!(
				"<div class=\"split-pane-slot\" id=\"{element}.{slot}\"/>"
			));
		}
		markup.push_str("</div>");
		cx.emit(Directive::Append {
			container,
			element,
			markup,
		});
		cx.set_state(
			component,
			SplitState {
				slots: current_slots(cx.tree(), component),
			},
		);
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
		if update.property(ORIENTATION).is_some()
			|| update.flags().contains(UpdateFlags::LAYOUT_CHILD)
		{
			return Ok(true);
		}
		let slots = current_slots(cx.tree(), component);
		if update.flags().contains(UpdateFlags::CHILDREN) {
			// A surviving child sitting in a different slot than last render
			// (a swap, or the shift after removing the first child) cannot be
			// patched: its element lives inside the old slot container.
			let moved = match cx.state::<SplitState>(component) {
				Some(state) => slots.iter().enumerate().any(|(index, &slot)| {
					slot.is_some_and(|child| {
						state
							.slots
							.iter()
							.position(|&prev| prev == Some(child))
							.is_some_and(|previous| previous != index)
					})
				}),
				None => true,
			};
			if moved {
				trace!(?component, "slot reassignment forces split replace");
				return Ok(true);
			}
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
		cx.set_state(component, SplitState { slots });
		Ok(false)
	}

	fn container_id(
		&self,
		tree: &ComponentTree,
		parent: ComponentHandle,
		child: ComponentHandle,
	) -> ElementId {
		let Some(id) = tree.id(parent) else {
			return ElementId::root();
		};
		let slot = tree
			.children(parent)
			.iter()
			.position(|&c| c == child)
			.unwrap_or(0);
		ElementId::slot(id, slot)
	}
}
