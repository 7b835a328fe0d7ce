//! The application instance: one user session's worth of state.
//!
//! Every mutation of the component tree flows through the instance so the
//! change recorder observes it. There is no ambient "current application";
//! callers hold the instance and pass it (or a context borrowed from it)
//! explicitly.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::client::ActionEvent;
use crate::component::{Capabilities, ComponentSpec, Locale, props};
use crate::error::TreeError;
use crate::render_state::RenderStateStore;
use crate::style::{Style, StyleSheet};
use crate::tasks::TaskQueues;
use crate::tree::{ComponentHandle, ComponentId, ComponentTree, InstanceId, TreeDelta};
use crate::update_manager::UpdateManager;
use crate::value::Value;

/// Callback invoked when a client action targets a component.
pub type ActionHandler = Box<dyn FnMut(&mut ApplicationInstance, &ActionEvent) + Send>;

/// One user session: the component tree plus everything scoped to it.
///
/// An instance is driven by at most one synchronization thread at a time;
/// the only piece shared with other threads is the [`TaskQueues`] handle.
pub struct ApplicationInstance {
	pub(crate) tree: ComponentTree,
	pub(crate) updates: UpdateManager,
	pub(crate) render_states: RenderStateStore,
	pub(crate) stylesheet: StyleSheet,
	pub(crate) locale: Option<Locale>,
	window: Option<ComponentHandle>,
	focus: Option<ComponentId>,
	modal_stack: Vec<ComponentHandle>,
	context: FxHashMap<Box<str>, Value>,
	task_queues: TaskQueues,
	actions: FxHashMap<ComponentHandle, Vec<ActionHandler>>,
}

impl Default for ApplicationInstance {
	fn default() -> Self {
		Self::new()
	}
}

impl ApplicationInstance {
	/// Creates an empty session.
	pub fn new() -> Self {
		Self {
			tree: ComponentTree::new(InstanceId::next()),
			updates: UpdateManager::new(),
			render_states: RenderStateStore::new(),
			stylesheet: StyleSheet::new(),
			locale: None,
			window: None,
			focus: None,
			modal_stack: Vec::new(),
			context: FxHashMap::default(),
			task_queues: TaskQueues::new(),
			actions: FxHashMap::default(),
		}
	}

	/// Read access to the component tree.
	pub fn tree(&self) -> &ComponentTree {
		&self.tree
	}

	/// The update manager coordinating outbound and inbound changes.
	pub fn update_manager(&self) -> &UpdateManager {
		&self.updates
	}

	/// Mutable access to the update manager (e.g. to force-invalidate).
	pub fn update_manager_mut(&mut self) -> &mut UpdateManager {
		&mut self.updates
	}

	/// Per-component render state kept for the peers.
	pub fn render_states(&self) -> &RenderStateStore {
		&self.render_states
	}

	// ── Tree mutation ──

	/// Creates a detached component.
	pub fn create(&mut self, spec: ComponentSpec) -> ComponentHandle {
		self.tree.create(spec)
	}

	/// Attaches `child` under `parent` at `index` (`None` appends).
	pub fn add(
		&mut self,
		parent: ComponentHandle,
		child: ComponentHandle,
		index: Option<usize>,
	) -> Result<(), TreeError> {
		let delta = self.tree.add(parent, child, index)?;
		self.apply_delta(delta);
		Ok(())
	}

	/// Detaches `child` from `parent`; no-op if not currently its child.
	pub fn remove(
		&mut self,
		parent: ComponentHandle,
		child: ComponentHandle,
	) -> Result<(), TreeError> {
		let delta = self.tree.remove(parent, child)?;
		self.apply_delta(delta);
		Ok(())
	}

	/// Sets a local property (see the tree for the equal-value contract).
	pub fn set_property(
		&mut self,
		component: ComponentHandle,
		name: &str,
		value: Option<Value>,
	) -> Result<(), TreeError> {
		let event = self.tree.set_property(component, name, value)?;
		self.updates.recorder_mut().record(&self.tree, &event);
		Ok(())
	}

	/// Sets position `index` of an indexed local property.
	pub fn set_property_indexed(
		&mut self,
		component: ComponentHandle,
		name: &str,
		index: usize,
		value: Option<Value>,
	) -> Result<(), TreeError> {
		let event = self.tree.set_property_indexed(component, name, index, value)?;
		self.updates.recorder_mut().record(&self.tree, &event);
		Ok(())
	}

	/// Sets the layout hints `component` carries for its parent.
	pub fn set_layout_data(
		&mut self,
		component: ComponentHandle,
		value: Option<Value>,
	) -> Result<(), TreeError> {
		self.set_property(component, props::LAYOUT_DATA, value)
	}

	/// Shows or hides a component.
	pub fn set_visible(
		&mut self,
		component: ComponentHandle,
		visible: bool,
	) -> Result<(), TreeError> {
		if let Some(event) = self.tree.set_visible(component, visible)? {
			self.updates.recorder_mut().record(&self.tree, &event);
		}
		Ok(())
	}

	/// Sets the stylesheet style name.
	pub fn set_style_name(
		&mut self,
		component: ComponentHandle,
		name: Option<&str>,
	) -> Result<(), TreeError> {
		let event = self.tree.set_style_name(component, name)?;
		self.updates.recorder_mut().record(&self.tree, &event);
		Ok(())
	}

	/// Sets the shared style reference.
	pub fn set_shared_style(
		&mut self,
		component: ComponentHandle,
		style: Option<Arc<Style>>,
	) -> Result<(), TreeError> {
		let event = self.tree.set_shared_style(component, style)?;
		self.updates.recorder_mut().record(&self.tree, &event);
		Ok(())
	}

	/// Sets a component-local locale.
	pub fn set_component_locale(
		&mut self,
		component: ComponentHandle,
		locale: Option<Locale>,
	) -> Result<(), TreeError> {
		self.tree.set_locale(component, locale)
	}

	// ── Resolution ──

	/// Resolves a rendered property: local style, then shared style, then
	/// the application stylesheet; `None` when unset everywhere.
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

	/// [`ApplicationInstance::rendered_property`] with a fallback for
	/// properties that are unset in every layer.
	pub fn rendered_property_or(
		&self,
		component: ComponentHandle,
		name: &str,
		default: Value,
	) -> Value {
		self.rendered_property(component, name).unwrap_or(default)
	}

	/// Resolves a component's effective locale: its own, the nearest
	/// ancestor's, then (for registered components) the application's.
	pub fn resolved_locale(&self, component: ComponentHandle) -> Option<Locale> {
		self.tree.resolved_locale(component).cloned().or_else(|| {
			if self.tree.is_registered(component) {
				self.locale.clone()
			} else {
				None
			}
		})
	}

	/// The application locale.
	pub fn locale(&self) -> Option<&Locale> {
		self.locale.as_ref()
	}

	/// Sets the application locale.
	pub fn set_locale(&mut self, locale: Option<Locale>) {
		self.locale = locale;
	}

	/// The application stylesheet.
	pub fn stylesheet(&self) -> &StyleSheet {
		&self.stylesheet
	}

	/// Replaces the application stylesheet.
	pub fn set_stylesheet(&mut self, stylesheet: StyleSheet) {
		self.stylesheet = stylesheet;
	}

	// ── Window ──

	/// Installs the top-level window, registering its subtree.
	///
	/// At most one window is supported; installing a second one fails with
	/// [`TreeError::WindowAlreadySet`]. Re-installing the same window is a
	/// no-op.
	pub fn set_window(&mut self, window: ComponentHandle) -> Result<(), TreeError> {
		let capabilities = self.tree.capabilities(window)?;
		if !capabilities.contains(Capabilities::TOP_LEVEL) {
			return Err(TreeError::CapabilityRequired {
				kind: self.tree.kind(window)?,
				capability: Capabilities::TOP_LEVEL,
			});
		}
		if self.window == Some(window) {
			return Ok(());
		}
		if self.window.is_some() {
			return Err(TreeError::WindowAlreadySet);
		}
		self.tree.register_subtree(window)?;
		self.window = Some(window);
		// First cycle renders the whole window subtree.
		self.updates.recorder_mut().invalidate(window);
		Ok(())
	}

	/// The top-level window, if installed.
	pub fn window(&self) -> Option<ComponentHandle> {
		self.window
	}

	// ── Focus ──

	/// Moves input focus to `component`.
	///
	/// The reference is weak: if the component is later removed, focus reads
	/// back as `None` rather than keeping the component alive.
	pub fn set_focus(&mut self, component: ComponentHandle) -> Result<(), TreeError> {
		if !self.tree.is_registered(component) {
			return Err(TreeError::NotRegistered(component));
		}
		self.focus = self.tree.id(component);
		Ok(())
	}

	/// The currently focused component, if still registered.
	pub fn focused_component(&self) -> Option<ComponentHandle> {
		self.tree.by_id(self.focus?)
	}

	/// Clears input focus.
	pub fn clear_focus(&mut self) {
		self.focus = None;
	}

	// ── Modal context ──

	/// Raises or retires a modal input barrier rooted at `component`.
	///
	/// The most recently raised barrier wins when several are active.
	pub fn set_modal(&mut self, component: ComponentHandle, modal: bool) -> Result<(), TreeError> {
		let capabilities = self.tree.capabilities(component)?;
		if !capabilities.contains(Capabilities::MODAL) {
			return Err(TreeError::CapabilityRequired {
				kind: self.tree.kind(component)?,
				capability: Capabilities::MODAL,
			});
		}
		self.modal_stack.retain(|&m| m != component);
		if modal {
			self.modal_stack.push(component);
		}
		Ok(())
	}

	/// The innermost active modal root, if any.
	///
	/// Entries whose component has been deregistered are pruned here rather
	/// than at removal time.
	pub fn modal_context(&mut self) -> Option<ComponentHandle> {
		let tree = &self.tree;
		self.modal_stack.retain(|&m| tree.is_registered(m));
		self.modal_stack.last().copied()
	}

	// ── Context properties ──

	/// Sets a host-supplied context property (e.g. authenticated principal).
	pub fn set_context_property(&mut self, name: &str, value: Option<Value>) {
		match value {
			Some(value) => {
				self.context.insert(name.into(), value);
			}
			None => {
				self.context.remove(name);
			}
		}
	}

	/// Reads a host-supplied context property.
	pub fn context_property(&self, name: &str) -> Option<&Value> {
		self.context.get(name)
	}

	// ── Task queues ──

	/// A cloneable handle to this session's task queues, safe to hand to
	/// other threads.
	pub fn task_queues(&self) -> TaskQueues {
		self.task_queues.clone()
	}

	/// Drains every task queue, including tasks enqueued by tasks already
	/// drained in the same call. Returns how many tasks ran.
	pub fn process_queued_tasks(&mut self) -> usize {
		let queues = self.task_queues.clone();
		let mut ran = 0;
		while let Some(task) = queues.pop_next() {
			task(self);
			ran += 1;
		}
		ran
	}

	// ── Actions ──

	/// Registers a handler for client actions targeting `component`.
	pub fn on_action(
		&mut self,
		component: ComponentHandle,
		handler: impl FnMut(&mut ApplicationInstance, &ActionEvent) + Send + 'static,
	) {
		self.actions
			.entry(component)
			.or_default()
			.push(Box::new(handler));
	}

	pub(crate) fn dispatch_action(&mut self, event: &ActionEvent) {
		// Handlers are taken out for the duration of the call so they can
		// freely mutate the session, including registering more handlers.
		let mut handlers = std::mem::take(&mut self.actions);
		if let Some(list) = handlers.get_mut(&event.component) {
			for handler in list {
				handler(self, event);
			}
		}
		let registered_during = std::mem::replace(&mut self.actions, handlers);
		for (component, list) in registered_during {
			self.actions.entry(component).or_default().extend(list);
		}
	}

	// ── Internal routing ──

	/// Split borrows for the synchronization cycle: shared tree/styles plus
	/// exclusive render-state access.
	pub(crate) fn sync_parts(
		&mut self,
	) -> (
		&ComponentTree,
		&StyleSheet,
		Option<&Locale>,
		&mut RenderStateStore,
	) {
		(
			&self.tree,
			&self.stylesheet,
			self.locale.as_ref(),
			&mut self.render_states,
		)
	}

	fn apply_delta(&mut self, delta: TreeDelta) {
		for event in &delta.events {
			self.updates.recorder_mut().record(&self.tree, event);
		}
		for &handle in &delta.deregistered {
			self.render_states.remove(handle);
		}
	}
}
