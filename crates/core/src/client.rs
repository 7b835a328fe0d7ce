//! Inbound client updates: decoding, the modal barrier, and action dispatch.
//!
//! A client batch is applied in order, each property update re-entering the
//! change recorder exactly like a server-originated mutation. Items that
//! cannot be applied (stale id, outside the modal context) are dropped per
//! item; a batch never fails as a whole.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::ApplicationInstance;
use crate::tree::{ComponentHandle, ComponentId};
use crate::value::Value;

/// A decoded batch of client-submitted changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientMessage {
	/// Changes in the order the client produced them.
	pub updates: Vec<ClientUpdate>,
}

/// One client-submitted change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientUpdate {
	/// A property write, e.g. the current text of a text field.
	Property {
		/// Target component id.
		component: ComponentId,
		/// Property name.
		name: String,
		/// Position, for indexed properties.
		#[serde(default, skip_serializing_if = "Option::is_none")]
		index: Option<usize>,
		/// New value (`None` clears the property).
		value: Option<Value>,
	},
	/// A discrete input event, e.g. a button click.
	///
	/// Actions are a pseudo-property: they are interpreted by the consuming
	/// component's action handlers, never stored in the tree.
	Action {
		/// Target component id.
		component: ComponentId,
		/// Action name, e.g. `click`.
		name: String,
		/// Optional payload.
		#[serde(default, skip_serializing_if = "Option::is_none")]
		value: Option<Value>,
	},
}

/// An action delivered to a component's handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionEvent {
	/// The component the client targeted.
	pub component: ComponentHandle,
	/// Action name.
	pub name: Box<str>,
	/// Optional payload.
	pub value: Option<Value>,
}

/// Per-batch accounting returned by `ApplicationInstance::receive`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InboundReport {
	/// Property updates applied to the tree.
	pub applied: usize,
	/// Items dropped because their id resolved to nothing.
	pub dropped_unknown: usize,
	/// Items dropped by the modal barrier.
	pub dropped_barrier: usize,
	/// Actions dispatched to handlers.
	pub actions: usize,
}

impl ApplicationInstance {
	/// Applies a client batch to the tree and dispatches its actions.
	///
	/// Updates referencing unknown ids are logged and dropped (the component
	/// may have been removed concurrently); updates targeting components
	/// outside the current modal context are silently dropped. Neither is
	/// fatal to the batch.
	pub fn receive(&mut self, message: ClientMessage) -> InboundReport {
		let mut report = InboundReport::default();
		let mut actions = Vec::new();

		for update in message.updates {
			let (id, name) = match &update {
				ClientUpdate::Property { component, name, .. }
				| ClientUpdate::Action { component, name, .. } => (*component, name.as_str()),
			};
			let Some(component) = self.tree().by_id(id) else {
				debug!(?id, name, "dropping update for unknown component");
				report.dropped_unknown += 1;
				continue;
			};
			if !self.within_modal_context(component) {
				debug!(?id, name, "dropping update outside modal context");
				report.dropped_barrier += 1;
				continue;
			}
			match update {
				ClientUpdate::Property {
					name, index, value, ..
				} => {
					let applied = match index {
						Some(index) => {
							self.set_property_indexed(component, &name, index, value)
						}
						None => self.set_property(component, &name, value),
					};
					match applied {
						Ok(()) => report.applied += 1,
						Err(error) => {
							debug!(?id, name, %error, "dropping unappliable update");
							report.dropped_unknown += 1;
						}
					}
				}
				ClientUpdate::Action { name, value, .. } => {
					actions.push(ActionEvent {
						component,
						name: name.into(),
						value,
					});
				}
			}
		}

		// Actions fire after the batch's property writes so handlers observe
		// the state the client produced them against.
		for action in actions {
			report.actions += 1;
			self.dispatch_action(&action);
		}
		self.update_manager_mut().inbound_mut().absorb(&report);
		report
	}

	fn within_modal_context(&mut self, component: ComponentHandle) -> bool {
		match self.modal_context() {
			Some(root) => self.tree().is_ancestor_of(root, component),
			None => true,
		}
	}
}
