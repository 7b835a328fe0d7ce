//! Render directives and the surface peers emit them into.
//!
//! The core never defines wire bytes; a directive is the most concrete thing
//! it knows about. The transport layer serializes the directive batch however
//! it likes (the types derive serde for the common case) and applies it to
//! the client-side representation.

use serde::{Deserialize, Serialize};

use crate::tree::ComponentId;

/// Identifier of an element on the rendered surface.
///
/// Component elements are addressed as `c_<id>`; parents hand out slot
/// addresses such as `c_<id>.0` so children attach without knowing the
/// parent's rendering strategy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(Box<str>);

impl ElementId {
	/// The client root element, container of the top-level window.
	pub fn root() -> Self {
		Self("root".into())
	}

	/// The element of a component itself.
	pub fn component(id: ComponentId) -> Self {
		Self(format!("c_{}", id.0).into())
	}

	/// A numbered slot inside a component's element.
	pub fn slot(id: ComponentId, slot: usize) -> Self {
		Self(format!("c_{}.{slot}", id.0).into())
	}

	/// The id as a string.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl std::fmt::Display for ElementId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

/// One render operation against the client-side representation.
///
/// Directives are idempotent with respect to re-application and carry enough
/// addressing to be applied in any order within one batch, with the single
/// exception that an `Append` must precede operations on the appended
/// element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Directive {
	/// Insert a new element into a container.
	Append {
		/// Container slot receiving the element.
		container: ElementId,
		/// The new element.
		element: ElementId,
		/// Markup for the element's initial rendering.
		markup: String,
	},
	/// Replace an element's markup wholesale.
	Update {
		/// Element to replace.
		element: ElementId,
		/// Replacement markup.
		markup: String,
	},
	/// Patch an element's text content.
	SetText {
		/// Element to patch.
		element: ElementId,
		/// New text content.
		text: String,
	},
	/// Patch a single attribute of an element.
	SetAttribute {
		/// Element to patch.
		element: ElementId,
		/// Attribute name.
		name: String,
		/// Attribute value.
		value: String,
	},
	/// Remove an element (and its children) from the surface.
	Remove {
		/// Element to remove.
		element: ElementId,
	},
}

/// Sink for render directives produced during one synchronization cycle.
pub trait RenderSurface {
	/// Accepts one directive.
	fn emit(&mut self, directive: Directive);
}

/// A surface that simply collects directives, for tests and for transports
/// that serialize the batch after the cycle completes.
#[derive(Debug, Default)]
pub struct DirectiveBuffer {
	directives: Vec<Directive>,
}

impl DirectiveBuffer {
	/// Creates an empty buffer.
	pub fn new() -> Self {
		Self::default()
	}

	/// The collected directives.
	pub fn directives(&self) -> &[Directive] {
		&self.directives
	}

	/// Consumes the buffer, returning the batch.
	pub fn into_directives(self) -> Vec<Directive> {
		self.directives
	}

	/// Clears the buffer, e.g. to discard a partially rendered cycle.
	pub fn clear(&mut self) {
		self.directives.clear();
	}
}

impl RenderSurface for DirectiveBuffer {
	fn emit(&mut self, directive: Directive) {
		self.directives.push(directive);
	}
}
