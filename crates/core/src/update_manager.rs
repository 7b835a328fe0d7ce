//! The update manager and the synchronization cycle it coordinates.
//!
//! One cycle: drain deferred tasks to exhaustion, run the validation walk,
//! flush the change recorder, then dispatch every pending record to its
//! peer in ancestor-first order. Components inside a subtree that was fully
//! replaced earlier in the cycle are skipped; the replacement re-rendered
//! them already.

use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use crate::app::ApplicationInstance;
use crate::client::InboundReport;
use crate::error::SyncError;
use crate::peer::{PeerRegistry, SyncContext};
use crate::recorder::{ChangeRecorder, UpdateFlags};
use crate::surface::{Directive, RenderSurface};
use crate::component::Capabilities;
use crate::tree::{ComponentHandle, ComponentTree};

/// Coordinates outbound change recording and inbound client processing for
/// one session. Owned by the application instance; the transport layer
/// reaches it through `ApplicationInstance::sync` and
/// `ApplicationInstance::receive`.
#[derive(Debug, Default)]
pub struct UpdateManager {
	recorder: ChangeRecorder,
	inbound: InboundProcessor,
}

impl UpdateManager {
	/// Creates an idle manager.
	pub fn new() -> Self {
		Self::default()
	}

	/// The outbound change recorder.
	pub fn recorder(&self) -> &ChangeRecorder {
		&self.recorder
	}

	/// Mutable access to the recorder (e.g. to force-invalidate a subtree).
	pub fn recorder_mut(&mut self) -> &mut ChangeRecorder {
		&mut self.recorder
	}

	/// Running totals of inbound client processing.
	pub fn inbound(&self) -> &InboundProcessor {
		&self.inbound
	}

	pub(crate) fn inbound_mut(&mut self) -> &mut InboundProcessor {
		&mut self.inbound
	}
}

/// Session-lifetime counters of the client update processor.
#[derive(Debug, Clone, Copy, Default)]
pub struct InboundProcessor {
	applied: u64,
	dropped_unknown: u64,
	dropped_barrier: u64,
	actions: u64,
}

impl InboundProcessor {
	pub(crate) fn absorb(&mut self, report: &InboundReport) {
		self.applied += report.applied as u64;
		self.dropped_unknown += report.dropped_unknown as u64;
		self.dropped_barrier += report.dropped_barrier as u64;
		self.actions += report.actions as u64;
	}

	/// Property updates applied over the session.
	pub fn applied(&self) -> u64 {
		self.applied
	}

	/// Updates dropped for stale or unknown ids.
	pub fn dropped_unknown(&self) -> u64 {
		self.dropped_unknown
	}

	/// Updates dropped by the modal barrier.
	pub fn dropped_barrier(&self) -> u64 {
		self.dropped_barrier
	}

	/// Actions dispatched to handlers.
	pub fn actions(&self) -> u64 {
		self.actions
	}
}

/// Summary of one synchronization cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
	/// Deferred tasks drained before rendering.
	pub tasks_run: usize,
	/// Pending records dispatched to peers.
	pub rendered: usize,
	/// Records skipped because an ancestor was fully replaced first.
	pub skipped: usize,
}

impl ApplicationInstance {
	/// Runs one synchronization cycle against `surface`.
	///
	/// On error the cycle aborts; directives already emitted this cycle are
	/// the caller's to discard (there is no partial-success contract). The
	/// session itself stays usable and the next cycle starts from current
	/// tree state.
	pub fn sync(
		&mut self,
		peers: &PeerRegistry,
		surface: &mut dyn RenderSurface,
	) -> Result<SyncReport, SyncError> {
		let tasks_run = self.process_queued_tasks();
		self.run_validation(peers)?;

		let pending = self.updates.recorder_mut().flush();
		let mut order: Vec<ComponentHandle> = pending.keys().copied().collect();
		order.sort_by_key(|&component| depth(&self.tree, component));

		let mut report = SyncReport {
			tasks_run,
			..SyncReport::default()
		};
		let mut replaced: FxHashSet<ComponentHandle> = FxHashSet::default();

		let (tree, stylesheet, locale, render_states) = self.sync_parts();
		let mut cx = SyncContext::new(tree, stylesheet, locale, peers, render_states, surface);

		// First pass: dispose every removed child. Doing this before any
		// rendering guarantees that a component moved between parents has
		// its old element gone before its new parent renders it.
		for &component in &order {
			if !tree.contains(component) {
				return Err(SyncError::DanglingUpdate(component));
			}
			for &removed in pending[&component].removed_children() {
				if !tree.contains(removed) {
					continue;
				}
				let removed_kind = tree
					.kind(removed)
					.map_err(|_| SyncError::DanglingUpdate(removed))?;
				let removed_peer = peers
					.get(removed_kind)
					.ok_or(SyncError::MissingPeer(removed_kind.name()))?;
				removed_peer.render_dispose(&mut cx, removed)?;
				cx.clear_state(removed);
			}
		}

		// Second pass: render, ancestors before descendants.
		for component in order {
			let update = &pending[&component];
			if under_replaced_ancestor(tree, &replaced, component) {
				trace!(?component, "skipping record under a replaced ancestor");
				report.skipped += 1;
				continue;
			}
			let kind = tree
				.kind(component)
				.map_err(|_| SyncError::DanglingUpdate(component))?;
			let peer = peers
				.get(kind)
				.ok_or(SyncError::MissingPeer(kind.name()))?;

			let full = update.flags().contains(UpdateFlags::FULL_REPLACE)
				|| peer.render_update(&mut cx, component, update)?;
			if full {
				let element = cx.element_id(component)?;
				cx.emit(Directive::Remove { element });
				if tree.is_visible(component) {
					peer.render_add(&mut cx, component)?;
				}
				replaced.insert(component);
			} else {
				// Incremental path: the peer patched the component itself;
				// the coordinator renders newly added children, in their
				// current child-list order.
				let mut added: Vec<ComponentHandle> = update
					.added_children()
					.iter()
					.copied()
					.filter(|&child| tree.parent(child) == Some(component))
					.collect();
				added.sort_by_key(|&child| {
					tree.children(component).iter().position(|&c| c == child)
				});
				for child in added {
					cx.render_child(child)?;
				}
			}
			report.rendered += 1;
		}

		debug!(
			rendered = report.rendered,
			skipped = report.skipped,
			tasks = report.tasks_run,
			"synchronization cycle complete"
		);
		Ok(report)
	}

	/// Pre-order validation walk over the window subtree.
	///
	/// Only components carrying [`Capabilities::VALIDATED`] are visited.
	/// Validation may mutate the tree; those mutations are recorded like any
	/// other. Components attached during the walk are validated next cycle.
	fn run_validation(&mut self, peers: &PeerRegistry) -> Result<(), SyncError> {
		let Some(window) = self.window() else {
			return Ok(());
		};
		let targets = self.tree.subtree(window);
		for component in targets {
			if !self.tree.is_registered(component) {
				continue;
			}
			let Ok(capabilities) = self.tree.capabilities(component) else {
				continue;
			};
			if !capabilities.contains(Capabilities::VALIDATED) {
				continue;
			}
			let Ok(kind) = self.tree.kind(component) else {
				continue;
			};
			let Some(peer) = peers.get(kind) else {
				trace!(%kind, "no peer to validate kind");
				continue;
			};
			peer.validate(self, component)?;
		}
		Ok(())
	}
}

fn depth(tree: &ComponentTree, mut component: ComponentHandle) -> usize {
	let mut depth = 0;
	while let Some(parent) = tree.parent(component) {
		depth += 1;
		component = parent;
	}
	depth
}

fn under_replaced_ancestor(
	tree: &ComponentTree,
	replaced: &FxHashSet<ComponentHandle>,
	component: ComponentHandle,
) -> bool {
	let mut current = tree.parent(component);
	while let Some(handle) = current {
		if replaced.contains(&handle) {
			return true;
		}
		current = tree.parent(handle);
	}
	false
}
