//! The session-owned component tree.
//!
//! Components live in an arena keyed by [`ComponentHandle`]; handles are
//! monotonic and never reused within a session, so a stale handle is detected
//! rather than silently aliasing a newer component. Structural and property
//! mutations return the [`TreeEvent`]s they emitted; the session routes those
//! into the change recorder for registered subtrees.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::component::{Capabilities, ComponentKind, ComponentSpec, Locale, props};
use crate::error::{InvalidChildReason, TreeError};
use crate::style::Style;
use crate::value::Value;

/// Creation-time identity of a component within its session.
///
/// Handles address components in every server-side API and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentHandle(u64);

/// Application-scoped id assigned on registration; the id used on the wire.
///
/// Assigned lazily the first time a component becomes registered and kept for
/// the component's lifetime; the registry entry exists only while registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(pub u64);

/// Identity of one application instance, used to detect cross-instance
/// registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceId(u64);

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

impl InstanceId {
	/// Allocates a process-unique instance id.
	pub fn next() -> Self {
		Self(NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed))
	}
}

/// A mutation notification emitted by the tree.
///
/// Delivered synchronously, in the exact order mutations occurred.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeEvent {
	/// A local property changed.
	///
	/// When a property is set to a non-null value equal to its current
	/// non-null value, the event still fires but carries `None` for both
	/// `old` and `new`. Consumers rely on receiving an event for every set;
	/// the nulled payload is the contract, not an optimization target.
	PropertyChanged {
		/// Component whose property changed.
		component: ComponentHandle,
		/// Property name.
		name: Box<str>,
		/// Position, for indexed properties.
		index: Option<usize>,
		/// Previous value.
		old: Option<Value>,
		/// New value.
		new: Option<Value>,
	},
	/// A child was attached.
	ChildAdded {
		/// Parent gaining the child.
		parent: ComponentHandle,
		/// The attached child.
		child: ComponentHandle,
	},
	/// A child was detached.
	ChildRemoved {
		/// Parent losing the child.
		parent: ComponentHandle,
		/// The detached child.
		child: ComponentHandle,
	},
	/// Visibility flipped. Only emitted on actual change.
	VisibilityChanged {
		/// Component whose visibility flipped.
		component: ComponentHandle,
		/// The new visibility.
		visible: bool,
	},
}

impl TreeEvent {
	/// The component a recorder should file this event under: the parent for
	/// structural events, the component itself otherwise.
	pub fn subject(&self) -> ComponentHandle {
		match self {
			Self::PropertyChanged { component, .. } | Self::VisibilityChanged { component, .. } => {
				*component
			}
			Self::ChildAdded { parent, .. } | Self::ChildRemoved { parent, .. } => *parent,
		}
	}
}

/// Result of a structural mutation: the emitted events plus the components
/// that lost their registration (for render-state cleanup).
#[derive(Debug, Default)]
pub struct TreeDelta {
	/// Events emitted, in order.
	pub events: SmallVec<[TreeEvent; 2]>,
	/// Components deregistered by this mutation, pre-order.
	pub deregistered: Vec<ComponentHandle>,
}

struct ComponentNode {
	kind: ComponentKind,
	capabilities: Capabilities,
	child_capacity: Option<usize>,
	child_requires: Capabilities,
	visible: bool,
	locale: Option<Locale>,
	local_style: Style,
	shared_style: Option<Arc<Style>>,
	style_name: Option<Box<str>>,
	parent: Option<ComponentHandle>,
	children: SmallVec<[ComponentHandle; 4]>,
	id: Option<ComponentId>,
	owner: Option<InstanceId>,
}

/// The mutable component hierarchy of one session.
pub struct ComponentTree {
	instance: InstanceId,
	nodes: FxHashMap<ComponentHandle, ComponentNode>,
	registry: FxHashMap<ComponentId, ComponentHandle>,
	next_handle: u64,
	next_id: u64,
}

impl ComponentTree {
	/// Creates an empty tree owned by `instance`.
	pub fn new(instance: InstanceId) -> Self {
		Self {
			instance,
			nodes: FxHashMap::default(),
			registry: FxHashMap::default(),
			next_handle: 1,
			next_id: 1,
		}
	}

	/// Creates a detached, unregistered component from `spec`.
	pub fn create(&mut self, spec: ComponentSpec) -> ComponentHandle {
		let handle = ComponentHandle(self.next_handle);
		self.next_handle += 1;
		let mut local_style = Style::new();
		for (name, value) in spec.properties {
			local_style.set(&name, Some(value));
		}
		self.nodes.insert(
			handle,
			ComponentNode {
				kind: spec.kind,
				capabilities: spec.capabilities,
				child_capacity: spec.child_capacity,
				child_requires: spec.child_requires,
				visible: spec.visible,
				locale: spec.locale,
				local_style,
				shared_style: spec.shared_style,
				style_name: spec.style_name,
				parent: None,
				children: SmallVec::new(),
				id: None,
				owner: None,
			},
		);
		handle
	}

	fn node(&self, handle: ComponentHandle) -> Result<&ComponentNode, TreeError> {
		self.nodes
			.get(&handle)
			.ok_or(TreeError::DanglingHandle(handle))
	}

	fn node_mut(&mut self, handle: ComponentHandle) -> Result<&mut ComponentNode, TreeError> {
		self.nodes
			.get_mut(&handle)
			.ok_or(TreeError::DanglingHandle(handle))
	}

	/// Whether `handle` names a live component.
	pub fn contains(&self, handle: ComponentHandle) -> bool {
		self.nodes.contains_key(&handle)
	}

	/// The component's kind.
	pub fn kind(&self, handle: ComponentHandle) -> Result<ComponentKind, TreeError> {
		Ok(self.node(handle)?.kind)
	}

	/// The component's capability set.
	pub fn capabilities(&self, handle: ComponentHandle) -> Result<Capabilities, TreeError> {
		Ok(self.node(handle)?.capabilities)
	}

	/// The component's parent, if attached.
	pub fn parent(&self, handle: ComponentHandle) -> Option<ComponentHandle> {
		self.nodes.get(&handle).and_then(|node| node.parent)
	}

	/// The component's children, in order.
	pub fn children(&self, handle: ComponentHandle) -> &[ComponentHandle] {
		self.nodes
			.get(&handle)
			.map_or(&[], |node| node.children.as_slice())
	}

	/// Number of direct children.
	pub fn component_count(&self, handle: ComponentHandle) -> usize {
		self.children(handle).len()
	}

	/// Whether the component is currently visible.
	pub fn is_visible(&self, handle: ComponentHandle) -> bool {
		self.nodes.get(&handle).is_some_and(|node| node.visible)
	}

	/// Whether the component is registered to this tree's application.
	pub fn is_registered(&self, handle: ComponentHandle) -> bool {
		self.nodes
			.get(&handle)
			.is_some_and(|node| node.owner.is_some())
	}

	/// The component's application-scoped id, if one was ever assigned.
	pub fn id(&self, handle: ComponentHandle) -> Option<ComponentId> {
		self.nodes.get(&handle).and_then(|node| node.id)
	}

	/// Resolves an id to a handle. Only registered components resolve.
	pub fn by_id(&self, id: ComponentId) -> Option<ComponentHandle> {
		self.registry.get(&id).copied()
	}

	/// Whether `ancestor` is a (strict or equal) ancestor of `descendant`.
	pub fn is_ancestor_of(&self, ancestor: ComponentHandle, descendant: ComponentHandle) -> bool {
		let mut current = Some(descendant);
		while let Some(handle) = current {
			if handle == ancestor {
				return true;
			}
			current = self.parent(handle);
		}
		false
	}

	/// Pre-order traversal of the subtree rooted at `root`.
	pub fn subtree(&self, root: ComponentHandle) -> Vec<ComponentHandle> {
		let mut out = Vec::new();
		let mut stack = vec![root];
		while let Some(handle) = stack.pop() {
			if !self.contains(handle) {
				continue;
			}
			out.push(handle);
			for &child in self.children(handle).iter().rev() {
				stack.push(child);
			}
		}
		out
	}

	/// Attaches `child` under `parent` at `index` (clamped; `None` appends).
	///
	/// The child is detached from any prior parent first, which cascades
	/// deregistration of its subtree; attachment under a registered parent
	/// cascades registration back. The returned delta carries the detach
	/// event (if any) before the attach event.
	pub fn add(
		&mut self,
		parent: ComponentHandle,
		child: ComponentHandle,
		index: Option<usize>,
	) -> Result<TreeDelta, TreeError> {
		let parent_node = self.node(parent)?;
		let parent_kind = parent_node.kind;
		let parent_caps = parent_node.capabilities;
		let capacity = parent_node.child_capacity;
		let required = parent_node.child_requires;
		let child_node = self.node(child)?;
		let child_kind = child_node.kind;
		let child_caps = child_node.capabilities;

		let reject = |reason| TreeError::InvalidChild {
			parent: parent_kind,
			child: child_kind,
			reason,
		};

		if !parent_caps.contains(Capabilities::CONTAINER) {
			return Err(reject(InvalidChildReason::NotAContainer));
		}
		if child_caps.contains(Capabilities::TOP_LEVEL) {
			return Err(reject(InvalidChildReason::TopLevelChild));
		}
		if !child_caps.contains(required) {
			return Err(reject(InvalidChildReason::MissingCapability));
		}
		if child == parent || self.is_ancestor_of(child, parent) {
			return Err(reject(InvalidChildReason::Cycle));
		}
		let already_here = self.node(child)?.parent == Some(parent);
		if let Some(capacity) = capacity {
			let effective = self.component_count(parent) - usize::from(already_here);
			if effective >= capacity {
				return Err(reject(InvalidChildReason::CapacityExceeded));
			}
		}

		let mut delta = TreeDelta::default();

		if let Some(old_parent) = self.node(child)?.parent {
			self.detach(old_parent, child, &mut delta);
		}

		{
			let parent_node = self.node_mut(parent)?;
			let len = parent_node.children.len();
			let position = index.unwrap_or(len).min(len);
			parent_node.children.insert(position, child);
		}
		self.node_mut(child)?.parent = Some(parent);

		if self.node(parent)?.owner.is_some() {
			self.register_subtree(child)?;
		}
		delta.events.push(TreeEvent::ChildAdded { parent, child });
		Ok(delta)
	}

	/// Detaches `child` from `parent`.
	///
	/// A no-op (empty delta) when `child` is not currently a child of
	/// `parent`. Deregistration cascades over the detached subtree before
	/// the detach event is emitted.
	pub fn remove(
		&mut self,
		parent: ComponentHandle,
		child: ComponentHandle,
	) -> Result<TreeDelta, TreeError> {
		self.node(parent)?;
		if self.node(child)?.parent != Some(parent) {
			return Ok(TreeDelta::default());
		}
		let mut delta = TreeDelta::default();
		self.detach(parent, child, &mut delta);
		Ok(delta)
	}

	fn detach(&mut self, parent: ComponentHandle, child: ComponentHandle, delta: &mut TreeDelta) {
		if self.is_registered(child) {
			delta.deregistered.extend(self.deregister_subtree(child));
		}
		if let Some(parent_node) = self.nodes.get_mut(&parent) {
			parent_node.children.retain(|c| *c != child);
		}
		if let Some(child_node) = self.nodes.get_mut(&child) {
			child_node.parent = None;
		}
		delta.events.push(TreeEvent::ChildRemoved { parent, child });
	}

	/// Registers the subtree rooted at `root` to this tree's application,
	/// assigning ids to components that never had one.
	///
	/// Fails without mutation when any component in the subtree is still
	/// registered to a different instance.
	pub(crate) fn register_subtree(&mut self, root: ComponentHandle) -> Result<(), TreeError> {
		let members = self.subtree(root);
		for &handle in &members {
			if let Some(node) = self.nodes.get(&handle)
				&& node.owner.is_some_and(|owner| owner != self.instance)
			{
				return Err(TreeError::ForeignInstance);
			}
		}
		for handle in members {
			let next_id = &mut self.next_id;
			let Some(node) = self.nodes.get_mut(&handle) else {
				continue;
			};
			node.owner = Some(self.instance);
			let id = *node.id.get_or_insert_with(|| {
				let id = ComponentId(*next_id);
				*next_id += 1;
				id
			});
			self.registry.insert(id, handle);
		}
		Ok(())
	}

	/// Deregisters the subtree rooted at `root`, returning the affected
	/// handles pre-order. Ids are kept; registry entries are dropped.
	pub(crate) fn deregister_subtree(&mut self, root: ComponentHandle) -> Vec<ComponentHandle> {
		let members = self.subtree(root);
		for &handle in &members {
			let Some(node) = self.nodes.get_mut(&handle) else {
				continue;
			};
			node.owner = None;
			if let Some(id) = node.id {
				self.registry.remove(&id);
			}
		}
		members
	}

	/// Sets local property `name`, emitting the change event.
	///
	/// Equal non-null old/new values still produce an event, with both
	/// payloads nulled (see [`TreeEvent::PropertyChanged`]).
	pub fn set_property(
		&mut self,
		handle: ComponentHandle,
		name: &str,
		value: Option<Value>,
	) -> Result<TreeEvent, TreeError> {
		let node = self.node_mut(handle)?;
		let old = node.local_style.get(name).cloned();
		node.local_style.set(name, value.clone());
		Ok(property_event(handle, name, None, old, value))
	}

	/// Sets position `index` of indexed local property `name`.
	pub fn set_property_indexed(
		&mut self,
		handle: ComponentHandle,
		name: &str,
		index: usize,
		value: Option<Value>,
	) -> Result<TreeEvent, TreeError> {
		let node = self.node_mut(handle)?;
		let old = node.local_style.get_indexed(name, index).cloned();
		node.local_style.set_indexed(name, index, value.clone());
		Ok(property_event(handle, name, Some(index), old, value))
	}

	/// Sets visibility, emitting an event only on actual change.
	pub fn set_visible(
		&mut self,
		handle: ComponentHandle,
		visible: bool,
	) -> Result<Option<TreeEvent>, TreeError> {
		let node = self.node_mut(handle)?;
		if node.visible == visible {
			return Ok(None);
		}
		node.visible = visible;
		Ok(Some(TreeEvent::VisibilityChanged {
			component: handle,
			visible,
		}))
	}

	/// Sets the stylesheet style name.
	pub fn set_style_name(
		&mut self,
		handle: ComponentHandle,
		name: Option<&str>,
	) -> Result<TreeEvent, TreeError> {
		let node = self.node_mut(handle)?;
		node.style_name = name.map(Box::from);
		Ok(property_event(handle, props::STYLE_NAME, None, None, None))
	}

	/// Sets the shared style reference.
	pub fn set_shared_style(
		&mut self,
		handle: ComponentHandle,
		style: Option<Arc<Style>>,
	) -> Result<TreeEvent, TreeError> {
		let node = self.node_mut(handle)?;
		node.shared_style = style;
		Ok(property_event(handle, props::SHARED_STYLE, None, None, None))
	}

	/// Sets the component-local locale. Not a rendered property; no event.
	pub fn set_locale(
		&mut self,
		handle: ComponentHandle,
		locale: Option<Locale>,
	) -> Result<(), TreeError> {
		self.node_mut(handle)?.locale = locale;
		Ok(())
	}

	/// The component's stylesheet style name.
	pub fn style_name(&self, handle: ComponentHandle) -> Option<&str> {
		self.nodes.get(&handle)?.style_name.as_deref()
	}

	/// The component's shared style, if any.
	pub fn shared_style(&self, handle: ComponentHandle) -> Option<&Arc<Style>> {
		self.nodes.get(&handle)?.shared_style.as_ref()
	}

	/// Reads a local property.
	pub fn local_property(&self, handle: ComponentHandle, name: &str) -> Option<&Value> {
		self.nodes.get(&handle)?.local_style.get(name)
	}

	/// Reads position `index` of an indexed local property.
	pub fn local_property_indexed(
		&self,
		handle: ComponentHandle,
		name: &str,
		index: usize,
	) -> Option<&Value> {
		self.nodes.get(&handle)?.local_style.get_indexed(name, index)
	}

	/// Resolves `name` through the local and shared style layers.
	///
	/// The stylesheet layer lives on the application; see
	/// `ApplicationInstance::rendered_property`.
	pub fn style_property(&self, handle: ComponentHandle, name: &str) -> Option<&Value> {
		let node = self.nodes.get(&handle)?;
		if node.local_style.is_set(name) {
			return node.local_style.get(name);
		}
		node.shared_style.as_ref()?.get(name)
	}

	/// Resolves the component's locale through its ancestor chain.
	///
	/// Returns `None` when neither the component nor any ancestor sets one;
	/// the application locale is the caller's final fallback.
	pub fn resolved_locale(&self, handle: ComponentHandle) -> Option<&Locale> {
		let mut current = Some(handle);
		while let Some(h) = current {
			let node = self.nodes.get(&h)?;
			if let Some(locale) = &node.locale {
				return Some(locale);
			}
			current = node.parent;
		}
		None
	}

	/// Drops a detached component and its subtree from the arena.
	///
	/// No-op while the component is still attached or registered; detach it
	/// first.
	pub fn destroy(&mut self, handle: ComponentHandle) -> Result<(), TreeError> {
		if self.node(handle)?.owner.is_some() || self.node(handle)?.parent.is_some() {
			return Ok(());
		}
		for member in self.subtree(handle) {
			self.nodes.remove(&member);
		}
		Ok(())
	}

	/// Number of live components in the arena.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Whether the arena is empty.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

fn property_event(
	component: ComponentHandle,
	name: &str,
	index: Option<usize>,
	old: Option<Value>,
	new: Option<Value>,
) -> TreeEvent {
	// Equal non-null values are suppressed from the payload but the event
	// itself still fires; see the TreeEvent::PropertyChanged contract.
	let (old, new) = if old.is_some() && new.is_some() && old == new {
		(None, None)
	} else {
		(old, new)
	};
	TreeEvent::PropertyChanged {
		component,
		name: name.into(),
		index,
		old,
		new,
	}
}
