//! Component kinds, capability sets, and creation specs.
//!
//! There is no component type hierarchy: a component is its kind tag plus an
//! explicit capability set, and structural rules (who may contain whom, how
//! many children) are data on the node rather than behavior on a subclass.

use std::sync::Arc;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::style::Style;
use crate::value::Value;

/// Well-known property names.
///
/// The framework itself only interprets [`ACTION`]; the rest are shared
/// vocabulary between widgets, peers, and clients.
pub mod props {
	/// Layout hints a child carries for its parent's layout strategy.
	pub const LAYOUT_DATA: &str = "layout-data";
	/// Whether the component accepts input. Ordinary rendered property.
	pub const ENABLED: &str = "enabled";
	/// Main text of labels, buttons, and text fields.
	pub const TEXT: &str = "text";
	/// Pseudo-property carried by inbound action events. Never stored.
	pub const ACTION: &str = "action";
	/// Recorded when a component's shared style reference changes.
	pub const SHARED_STYLE: &str = "shared-style";
	/// Recorded when a component's stylesheet name changes.
	pub const STYLE_NAME: &str = "style-name";
}

/// Closed type tag of a component.
///
/// The variants cover the shipped widget set; [`ComponentKind::Custom`]
/// admits out-of-tree widgets, which supply their own wire name and
/// capability set at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
	/// Top-level window. At most one per application, at most one child.
	Window,
	/// Fills a window, dialog, or split pane slot.
	ContentPane,
	/// Vertical sequence of cells.
	Column,
	/// Horizontal sequence of cells.
	Row,
	/// Two-child resizable pane.
	SplitPane,
	/// Static text.
	Label,
	/// Clickable control emitting action events.
	Button,
	/// Client-editable text input.
	TextField,
	/// Modal overlay establishing an input barrier.
	Dialog,
	/// Out-of-tree component kind with its own wire name.
	Custom(&'static str),
}

impl ComponentKind {
	/// Wire name of the kind, used in stylesheets and directives.
	pub fn name(self) -> &'static str {
		match self {
			Self::Window => "window",
			Self::ContentPane => "content-pane",
			Self::Column => "column",
			Self::Row => "row",
			Self::SplitPane => "split-pane",
			Self::Label => "label",
			Self::Button => "button",
			Self::TextField => "text-field",
			Self::Dialog => "dialog",
			Self::Custom(name) => name,
		}
	}

	/// Default capability set for the built-in kinds.
	///
	/// `Custom` kinds default to leaf components; their creators pass an
	/// explicit set through [`ComponentSpec::capabilities`].
	pub fn default_capabilities(self) -> Capabilities {
		match self {
			Self::Window => Capabilities::CONTAINER | Capabilities::TOP_LEVEL,
			Self::ContentPane => Capabilities::CONTAINER | Capabilities::PANE,
			Self::Column | Self::Row => Capabilities::CONTAINER,
			Self::SplitPane => Capabilities::CONTAINER | Capabilities::PANE,
			Self::Label => Capabilities::empty(),
			Self::Button => Capabilities::FOCUSABLE,
			Self::TextField => Capabilities::FOCUSABLE,
			Self::Dialog => {
				Capabilities::CONTAINER | Capabilities::MODAL | Capabilities::FOCUSABLE
			}
			Self::Custom(_) => Capabilities::empty(),
		}
	}

	/// Default child capacity for the built-in kinds.
	pub fn default_child_capacity(self) -> Option<usize> {
		match self {
			Self::Window | Self::Dialog => Some(1),
			Self::SplitPane => Some(2),
			_ => None,
		}
	}
}

impl std::fmt::Display for ComponentKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name())
	}
}

bitflags! {
	/// Capability set of a component.
	#[derive(Debug, Clone, Copy, PartialEq, Eq)]
	pub struct Capabilities: u8 {
		/// May hold children.
		const CONTAINER = 1 << 0;
		/// Fills a pane slot (window content, split pane side).
		const PANE = 1 << 1;
		/// May establish a modal input barrier.
		const MODAL = 1 << 2;
		/// Participates in focus traversal.
		const FOCUSABLE = 1 << 3;
		/// Only valid as a tree root, never as a child.
		const TOP_LEVEL = 1 << 4;
		/// Receives a validation pass before each synchronization cycle.
		const VALIDATED = 1 << 5;
	}
}

/// Locale tag attached to components and applications, e.g. `en-US`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale(Box<str>);

impl Locale {
	/// Creates a locale from its tag.
	pub fn new(tag: &str) -> Self {
		Self(tag.into())
	}

	/// The locale tag.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl std::fmt::Display for Locale {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

/// Everything needed to create a component in a tree.
#[derive(Debug, Clone)]
pub struct ComponentSpec {
	pub(crate) kind: ComponentKind,
	pub(crate) capabilities: Capabilities,
	pub(crate) child_capacity: Option<usize>,
	pub(crate) child_requires: Capabilities,
	pub(crate) visible: bool,
	pub(crate) locale: Option<Locale>,
	pub(crate) style_name: Option<Box<str>>,
	pub(crate) shared_style: Option<Arc<Style>>,
	pub(crate) properties: Vec<(Box<str>, Value)>,
}

impl ComponentSpec {
	/// Starts a spec for `kind` with that kind's default capabilities and
	/// child constraints.
	pub fn new(kind: ComponentKind) -> Self {
		let child_requires = match kind {
			ComponentKind::Window | ComponentKind::Dialog => Capabilities::PANE,
			_ => Capabilities::empty(),
		};
		Self {
			kind,
			capabilities: kind.default_capabilities(),
			child_capacity: kind.default_child_capacity(),
			child_requires,
			visible: true,
			locale: None,
			style_name: None,
			shared_style: None,
			properties: Vec::new(),
		}
	}

	/// Overrides the capability set. Intended for `Custom` kinds.
	pub fn capabilities(mut self, capabilities: Capabilities) -> Self {
		self.capabilities = capabilities;
		self
	}

	/// Overrides the child capacity. Intended for `Custom` kinds.
	pub fn child_capacity(mut self, capacity: Option<usize>) -> Self {
		self.child_capacity = capacity;
		self
	}

	/// Requires children to carry the given capabilities.
	pub fn child_requires(mut self, required: Capabilities) -> Self {
		self.child_requires = required;
		self
	}

	/// Initial visibility (default: visible).
	pub fn visible(mut self, visible: bool) -> Self {
		self.visible = visible;
		self
	}

	/// Component-local locale.
	pub fn locale(mut self, locale: Locale) -> Self {
		self.locale = Some(locale);
		self
	}

	/// Stylesheet style name.
	pub fn style_name(mut self, name: &str) -> Self {
		self.style_name = Some(name.into());
		self
	}

	/// Shared style reference.
	pub fn shared_style(mut self, style: Arc<Style>) -> Self {
		self.shared_style = Some(style);
		self
	}

	/// Initial local property.
	pub fn property(mut self, name: &str, value: impl Into<Value>) -> Self {
		self.properties.push((name.into(), value.into()));
		self
	}
}
