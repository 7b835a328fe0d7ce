//! Column and row containers: linear sequences of cells.
//!
//! The peer remembers the child list it last rendered. Because the surface
//! vocabulary can only append into a container, anything other than removals
//! and tail-appends (a mid-list insert, a reorder, a layout-data change)
//! forces a full replace of the container.

use tracing::trace;
use trellis_core::{
	ApplicationInstance, ComponentHandle, ComponentKind, ComponentSpec, ComponentUpdate,
	Directive, PeerError, SyncContext, SyncPeer, UpdateFlags,
};

use crate::html;

/// Spacing between cells, in pixels.
pub const CELL_SPACING: &str = "cell-spacing";

/// Builder for a vertical cell sequence.
#[derive(Debug, Default)]
pub struct Column {
	cell_spacing: Option<i64>,
	style_name: Option<String>,
}

impl Column {
	/// An empty column.
	pub fn new() -> Self {
		Self::default()
	}

	/// Spacing between cells.
	pub fn cell_spacing(mut self, spacing: i64) -> Self {
		self.cell_spacing = Some(spacing);
		self
	}

	/// Stylesheet style name.
	pub fn style_name(mut self, name: impl Into<String>) -> Self {
		self.style_name = Some(name.into());
		self
	}

	/// Creates the component, detached.
	pub fn create(self, app: &mut ApplicationInstance) -> ComponentHandle {
		create_stack(app, ComponentKind::Column, self.cell_spacing, self.style_name)
	}
}

/// Builder for a horizontal cell sequence.
#[derive(Debug, Default)]
pub struct Row {
	cell_spacing: Option<i64>,
	style_name: Option<String>,
}

impl Row {
	/// An empty row.
	pub fn new() -> Self {
		Self::default()
	}

	/// Spacing between cells.
	pub fn cell_spacing(mut self, spacing: i64) -> Self {
		self.cell_spacing = Some(spacing);
		self
	}

	/// Stylesheet style name.
	pub fn style_name(mut self, name: impl Into<String>) -> Self {
		self.style_name = Some(name.into());
		self
	}

	/// Creates the component, detached.
	pub fn create(self, app: &mut ApplicationInstance) -> ComponentHandle {
		create_stack(app, ComponentKind::Row, self.cell_spacing, self.style_name)
	}
}

fn create_stack(
	app: &mut ApplicationInstance,
	kind: ComponentKind,
	cell_spacing: Option<i64>,
	style_name: Option<String>,
) -> ComponentHandle {
	let mut spec = ComponentSpec::new(kind);
	if let Some(spacing) = cell_spacing {
		spec = spec.property(CELL_SPACING, spacing);
	}
	if let Some(name) = style_name {
		spec = spec.style_name(&name);
	}
	app.create(spec)
}

/// Child list as of the previous render.
struct StackState {
	children: Vec<ComponentHandle>,
}

/// Peer for [`Column`] and [`Row`].
pub struct StackPeer {
	vertical: bool,
}

impl StackPeer {
	/// Peer for columns.
	pub fn column() -> Self {
		Self { vertical: true }
	}

	/// Peer for rows.
	pub fn row() -> Self {
		Self { vertical: false }
	}

	fn class(&self) -> &'static str {
		if self.vertical { "column" } else { "row" }
	}

	/// Whether the transition from `previous` to `current` is expressible as
	/// removals plus tail-appends.
	fn tail_extends(previous: &[ComponentHandle], current: &[ComponentHandle]) -> bool {
		let surviving: Vec<ComponentHandle> = previous
			.iter()
			.copied()
			.filter(|c| current.contains(c))
			.collect();
		if current.len() < surviving.len() {
			return false;
		}
		current[..surviving.len()] == surviving[..]
			&& current[surviving.len()..]
				.iter()
				.all(|c| !previous.contains(c))
	}
}

impl SyncPeer for StackPeer {
	fn render_add(&self, cx: &mut SyncContext<'_>, component: ComponentHandle) -> Result<(), PeerError> {
		let element = cx.element_id(component)?;
		let container = cx.container_of(component)?;
		let mut markup = format!("<div class=\"{}\"", self.class());
		html::push_attr(&mut markup, cx, component, CELL_SPACING);
		html::push_attr(&mut markup, cx, component, "background");
		markup.push('>');
		cx.emit(Directive::Append {
			container,
			element,
			markup,
		});
		cx.set_state(
			component,
			StackState {
				children: cx.tree().children(component).to_vec(),
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
		if update.flags().contains(UpdateFlags::LAYOUT_CHILD) {
			// A child's cell hints changed; cells are baked into the markup.
			trace!(?component, "layout data change forces stack replace");
			return Ok(true);
		}
		let current = cx.tree().children(component).to_vec();
		if update.flags().contains(UpdateFlags::CHILDREN) {
			let ordered = match cx.state::<StackState>(component) {
				Some(state) => Self::tail_extends(&state.children, &current),
				None => false,
			};
			if !ordered {
				trace!(?component, "non-tail child change forces stack replace");
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
		cx.set_state(component, StackState { children: current });
		Ok(false)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn handles(app: &mut ApplicationInstance, n: usize) -> Vec<ComponentHandle> {
		(0..n)
			.map(|_| app.create(ComponentSpec::new(ComponentKind::Label)))
			.collect()
	}

	#[test]
	fn tail_extension_detection() {
		let mut app = ApplicationInstance::new();
		let h = handles(&mut app, 4);

		// Pure appends.
		assert!(StackPeer::tail_extends(&h[..2], &h[..4]));
		// Removal only.
		assert!(StackPeer::tail_extends(&h[..3], &[h[0], h[2]]));
		// Removal plus tail append.
		assert!(StackPeer::tail_extends(&[h[0], h[1]], &[h[1], h[2]]));
		// Mid-list insert is not a tail extension.
		assert!(!StackPeer::tail_extends(&[h[0], h[1]], &[h[0], h[2], h[1]]));
		// Reorder is not a tail extension.
		assert!(!StackPeer::tail_extends(&[h[0], h[1]], &[h[1], h[0]]));
	}
}
