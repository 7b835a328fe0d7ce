use thiserror::Error;

use crate::component::{Capabilities, ComponentKind};
use crate::tree::ComponentHandle;

/// Errors raised by structural mutations of the component tree.
///
/// These are always synchronous and local: the tree is left unmodified when
/// one of them is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
	/// A handle referenced a component that no longer exists in this session.
	#[error("dangling component handle {0:?}")]
	DanglingHandle(ComponentHandle),
	/// A structural constraint rejected the parent/child relationship.
	#[error("{child:?} rejected as child of {parent:?}: {reason}")]
	InvalidChild {
		/// Kind of the would-be parent.
		parent: ComponentKind,
		/// Kind of the rejected child.
		child: ComponentKind,
		/// Which constraint rejected the relationship.
		reason: InvalidChildReason,
	},
	/// Attempt to register a component that is already registered to a
	/// different application instance.
	#[error("component is registered to a different application instance")]
	ForeignInstance,
	/// The operation requires a capability the component does not carry.
	#[error("`{kind}` lacks required capability {capability:?}")]
	CapabilityRequired {
		/// Kind of the rejected component.
		kind: ComponentKind,
		/// The capability the operation requires.
		capability: Capabilities,
	},
	/// A second top-level window was set while one is active.
	#[error("a top-level window is already set")]
	WindowAlreadySet,
	/// The operation requires the component to be registered.
	#[error("component {0:?} is not registered")]
	NotRegistered(ComponentHandle),
}

/// The specific constraint behind a [`TreeError::InvalidChild`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidChildReason {
	/// The parent kind does not accept children at all.
	NotAContainer,
	/// The parent is already at its child capacity.
	CapacityExceeded,
	/// The child kind is only usable as a tree root.
	TopLevelChild,
	/// The child does not carry a capability the parent requires.
	MissingCapability,
	/// Adding the child would create a cycle.
	Cycle,
}

impl std::fmt::Display for InvalidChildReason {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let msg = match self {
			Self::NotAContainer => "parent is not a container",
			Self::CapacityExceeded => "parent child capacity exceeded",
			Self::TopLevelChild => "child is a top-level component",
			Self::MissingCapability => "child lacks a capability the parent requires",
			Self::Cycle => "child is an ancestor of the parent",
		};
		f.write_str(msg)
	}
}

/// Error surfaced by a synchronization peer while rendering.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("peer failed rendering {component:?}: {message}")]
pub struct PeerError {
	/// Component the peer was rendering.
	pub component: ComponentHandle,
	/// Peer-supplied failure description.
	pub message: String,
}

impl PeerError {
	/// Creates a peer error for `component` with a failure description.
	pub fn new(component: ComponentHandle, message: impl Into<String>) -> Self {
		Self {
			component,
			message: message.into(),
		}
	}
}

/// Errors that abort a synchronization cycle.
///
/// A cycle abort does not terminate the session; the next cycle starts from
/// the current tree state. Render directives already emitted for the aborted
/// cycle are the transport layer's responsibility to discard.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
	/// A peer raised an error while rendering.
	#[error(transparent)]
	Peer(#[from] PeerError),
	/// No peer is registered for a component kind that needed rendering.
	#[error("no peer registered for component kind `{0}`")]
	MissingPeer(&'static str),
	/// A component in a pending update record vanished from the tree.
	#[error("pending update references dangling handle {0:?}")]
	DanglingUpdate(ComponentHandle),
}
