//! Synchronization peers: per-kind renderers and their dispatch registry.
//!
//! A peer translates tree state and pending update records into render
//! directives for one component kind. Peers are stateless; whatever they need
//! to remember between cycles lives in the [`RenderStateStore`] threaded
//! through the [`SyncContext`].

use std::any::Any;

use rustc_hash::FxHashMap;

use crate::app::ApplicationInstance;
use crate::component::{ComponentKind, Locale};
use crate::error::PeerError;
use crate::recorder::ComponentUpdate;
use crate::render_state::RenderStateStore;
use crate::style::StyleSheet;
use crate::surface::{Directive, ElementId, RenderSurface};
use crate::tree::{ComponentHandle, ComponentTree};
use crate::value::Value;

/// Renderer/synchronizer for one component kind.
pub trait SyncPeer: Send + Sync {
	/// Renders `component` (and its visible subtree) as a fresh addition to
	/// its container on the surface.
	fn render_add(&self, cx: &mut SyncContext<'_>, component: ComponentHandle) -> Result<(), PeerError>;

	/// Applies `update` incrementally.
	///
	/// Returning `Ok(true)` signals that the update cannot be patched: the
	/// coordinator removes the component's element, calls
	/// [`SyncPeer::render_add`] again, and treats every child as freshly
	/// added (descendant records pending this cycle are skipped).
	fn render_update(
		&self,
		cx: &mut SyncContext<'_>,
		component: ComponentHandle,
		update: &ComponentUpdate,
	) -> Result<bool, PeerError>;

	/// Tears `component` down on the surface after its removal from the
	/// tree. The default removes the component's element.
	fn render_dispose(&self, cx: &mut SyncContext<'_>, component: ComponentHandle) -> Result<(), PeerError> {
		let element = cx.element_id(component)?;
		cx.emit(Directive::Remove { element });
		Ok(())
	}

	/// The surface element a given child should attach itself into.
	///
	/// This indirection lets a parent change its rendering strategy without
	/// children knowing. The default attaches children directly inside the
	/// parent's own element.
	fn container_id(
		&self,
		tree: &ComponentTree,
		parent: ComponentHandle,
		child: ComponentHandle,
	) -> ElementId {
		let _ = child;
		tree.id(parent)
			.map_or_else(ElementId::root, ElementId::component)
	}

	/// Pre-cycle validation hook for kinds that lazily rebuild derived
	/// children. May mutate the tree through the session; those mutations
	/// are captured like any other.
	fn validate(&self, app: &mut ApplicationInstance, component: ComponentHandle) -> Result<(), PeerError> {
		let _ = (app, component);
		Ok(())
	}
}

/// Explicit kind → peer map, assembled at construction time.
#[derive(Default)]
pub struct PeerRegistry {
	peers: FxHashMap<ComponentKind, Box<dyn SyncPeer>>,
}

impl PeerRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `peer` for `kind`, replacing any previous registration.
	pub fn register(&mut self, kind: ComponentKind, peer: impl SyncPeer + 'static) {
		self.peers.insert(kind, Box::new(peer));
	}

	/// Builder-style [`PeerRegistry::register`].
	pub fn with(mut self, kind: ComponentKind, peer: impl SyncPeer + 'static) -> Self {
		self.register(kind, peer);
		self
	}

	/// The peer registered for `kind`.
	pub fn get(&self, kind: ComponentKind) -> Option<&dyn SyncPeer> {
		self.peers.get(&kind).map(Box::as_ref)
	}
}

/// Everything a peer may touch while rendering one cycle.
pub struct SyncContext<'a> {
	tree: &'a ComponentTree,
	stylesheet: &'a StyleSheet,
	app_locale: Option<&'a Locale>,
	peers: &'a PeerRegistry,
	states: &'a mut RenderStateStore,
	surface: &'a mut dyn RenderSurface,
}

impl<'a> SyncContext<'a> {
	/// Assembles a context from its parts. Transports embedding the core
	/// directly normally get one via `ApplicationInstance::sync` instead.
	pub fn new(
		tree: &'a ComponentTree,
		stylesheet: &'a StyleSheet,
		app_locale: Option<&'a Locale>,
		peers: &'a PeerRegistry,
		states: &'a mut RenderStateStore,
		surface: &'a mut dyn RenderSurface,
	) -> Self {
		Self {
			tree,
			stylesheet,
			app_locale,
			peers,
			states,
			surface,
		}
	}

	/// The component tree, read-only for the duration of the cycle.
	pub fn tree(&self) -> &'a ComponentTree {
		self.tree
	}

	/// Emits one directive into the surface.
	pub fn emit(&mut self, directive: Directive) {
		self.surface.emit(directive);
	}

	/// The surface element of `component`.
	pub fn element_id(&self, component: ComponentHandle) -> Result<ElementId, PeerError> {
		self.tree
			.id(component)
			.map(ElementId::component)
			.ok_or_else(|| PeerError::new(component, "component has no assigned id"))
	}

	/// The container element `component` attaches into, as decided by its
	/// parent's peer. The tree root attaches into the client root element.
	pub fn container_of(&self, component: ComponentHandle) -> Result<ElementId, PeerError> {
		let Some(parent) = self.tree.parent(component) else {
			return Ok(ElementId::root());
		};
		let kind = self
			.tree
			.kind(parent)
			.map_err(|_| PeerError::new(component, "parent vanished during render"))?;
		let peer = self
			.peers
			.get(kind)
			.ok_or_else(|| PeerError::new(parent, format!("no peer for kind `{kind}`")))?;
		Ok(peer.container_id(self.tree, parent, component))
	}

	/// Renders `child` as a fresh addition via its own peer.
	///
	/// Invisible children are omitted from rendering entirely; they will be
	/// rendered when they become visible.
	pub fn render_child(&mut self, child: ComponentHandle) -> Result<(), PeerError> {
		if !self.tree.is_visible(child) {
			return Ok(());
		}
		let kind = self
			.tree
			.kind(child)
			.map_err(|_| PeerError::new(child, "child vanished during render"))?;
		let peers = self.peers;
		let peer = peers
			.get(kind)
			.ok_or_else(|| PeerError::new(child, format!("no peer for kind `{kind}`")))?;
		peer.render_add(self, child)
	}

	/// Renders every visible child of `parent`, in order.
	pub fn render_children(&mut self, parent: ComponentHandle) -> Result<(), PeerError> {
		let tree = self.tree;
		for &child in tree.children(parent) {
			self.render_child(child)?;
		}
		Ok(())
	}

	/// Resolves a rendered property: local style, shared style, stylesheet.
	pub fn rendered_property(&self, component: ComponentHandle, name: &str) -> Option<Value> {
		self.tree
			.style_property(component, name)
			.cloned()
			.or_else(|| {
				let style_name = self.tree.style_name(component)?;
				let kind = self.tree.kind(component).ok()?;
				self.stylesheet.property(kind, style_name, name).cloned()
			})
	}

	/// Resolves the component's effective locale, falling back to the
	/// application locale.
	pub fn rendered_locale(&self, component: ComponentHandle) -> Option<Locale> {
		self.tree
			.resolved_locale(component)
			.or(self.app_locale)
			.cloned()
	}

	/// The render state stored for `component`, if of the expected type.
	pub fn state<T: Any>(&self, component: ComponentHandle) -> Option<&T> {
		self.states.get(component)
	}

	/// Overwrites the render state for `component`.
	pub fn set_state<T: Any + Send>(&mut self, component: ComponentHandle, state: T) {
		self.states.set(component, state);
	}

	/// Drops the render state for `component`.
	pub fn clear_state(&mut self, component: ComponentHandle) {
		self.states.remove(component);
	}
}
