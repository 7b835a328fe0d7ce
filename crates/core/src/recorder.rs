//! Folds tree mutation events into per-component pending update records.
//!
//! One record exists per directly-affected component: the parent for
//! structural changes, the component itself for property changes. Records
//! accumulate between synchronization flushes and are consumed whole.

use bitflags::bitflags;
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use tracing::{trace, warn};

use crate::component::props;
use crate::tree::{ComponentHandle, ComponentTree, TreeEvent};
use crate::value::Value;

bitflags! {
	/// Summary flags of a pending update record.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
	pub struct UpdateFlags: u8 {
		/// The child list changed.
		const CHILDREN = 1 << 0;
		/// A child's layout data changed.
		const LAYOUT_CHILD = 1 << 1;
		/// Visibility flipped.
		const VISIBILITY = 1 << 2;
		/// The component must be fully re-rendered regardless of deltas.
		const FULL_REPLACE = 1 << 3;
	}
}

/// Old/new pair of one changed property.
///
/// `old` is taken from the first change in the cycle, `new` from the last.
/// An equal-value set arrives with both sides `None` (the tree nulls the
/// payload while still emitting the event).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertyDelta {
	/// Position, for indexed properties.
	pub index: Option<usize>,
	/// Value before the first change of the cycle.
	pub old: Option<Value>,
	/// Value after the most recent change.
	pub new: Option<Value>,
}

/// Accumulated changes for one component since the last flush.
#[derive(Debug, Default)]
pub struct ComponentUpdate {
	added: Vec<ComponentHandle>,
	removed: Vec<ComponentHandle>,
	properties: IndexMap<Box<str>, PropertyDelta>,
	flags: UpdateFlags,
}

impl ComponentUpdate {
	/// Children added during the cycle, in attach order.
	pub fn added_children(&self) -> &[ComponentHandle] {
		&self.added
	}

	/// Children removed during the cycle.
	pub fn removed_children(&self) -> &[ComponentHandle] {
		&self.removed
	}

	/// The delta recorded for `name`, if that property changed.
	pub fn property(&self, name: &str) -> Option<&PropertyDelta> {
		self.properties.get(name)
	}

	/// Changed properties in first-touch order.
	pub fn changed_properties(&self) -> impl Iterator<Item = (&str, &PropertyDelta)> {
		self.properties.iter().map(|(name, delta)| (name.as_ref(), delta))
	}

	/// Number of changed properties.
	pub fn property_count(&self) -> usize {
		self.properties.len()
	}

	/// Summary flags.
	pub fn flags(&self) -> UpdateFlags {
		self.flags
	}

	/// Whether nothing remains in the record (possible after net-cancels).
	pub fn is_noop(&self) -> bool {
		self.added.is_empty()
			&& self.removed.is_empty()
			&& self.properties.is_empty()
			&& self.flags.is_empty()
	}

	fn note_property(&mut self, name: &str, index: Option<usize>, old: Option<Value>, new: Option<Value>) {
		match self.properties.get_mut(name) {
			Some(delta) => {
				// First old wins, latest new wins.
				delta.index = index;
				delta.new = new;
			}
			None => {
				self.properties.insert(name.into(), PropertyDelta { index, old, new });
			}
		}
	}
}

/// The set of pending update records produced by a flush, keyed by the
/// affected component in first-touch order.
pub type PendingUpdates = IndexMap<ComponentHandle, ComponentUpdate>;

/// Observes tree mutation events and folds them into pending records.
#[derive(Debug, Default)]
pub struct ChangeRecorder {
	updates: PendingUpdates,
}

impl ChangeRecorder {
	/// Creates an empty recorder.
	pub fn new() -> Self {
		Self::default()
	}

	/// Folds one tree event into the pending records.
	///
	/// Events whose subject is not registered are ignored; unregistered
	/// subtrees have no client representation to update.
	pub fn record(&mut self, tree: &ComponentTree, event: &TreeEvent) {
		if !tree.is_registered(event.subject()) {
			trace!(?event, "ignoring event for unregistered subject");
			return;
		}
		match event {
			TreeEvent::ChildAdded { parent, child } => self.child_added(tree, *parent, *child),
			TreeEvent::ChildRemoved { parent, child } => self.child_removed(tree, *parent, *child),
			TreeEvent::PropertyChanged {
				component,
				name,
				index,
				old,
				new,
			} => self.property_changed(tree, *component, name, *index, old, new),
			TreeEvent::VisibilityChanged { component, .. } => {
				if self.in_replaced_subtree(tree, *component) {
					trace!(?component, "visibility change inside replaced subtree");
					return;
				}
				self.updates.entry(*component).or_default().flags |= UpdateFlags::VISIBILITY;
			}
		}
	}

	/// Forces a full re-render of `component` next cycle.
	pub fn invalidate(&mut self, component: ComponentHandle) {
		self.updates.entry(component).or_default().flags |= UpdateFlags::FULL_REPLACE;
	}

	/// Returns all pending records accumulated since the last flush and
	/// clears the recorder.
	pub fn flush(&mut self) -> PendingUpdates {
		let mut updates = std::mem::take(&mut self.updates);
		updates.retain(|component, update| {
			if update.is_noop() {
				trace!(?component, "dropping net-cancelled record");
				false
			} else {
				true
			}
		});
		updates
	}

	/// Whether any record is pending.
	pub fn has_updates(&self) -> bool {
		!self.updates.is_empty()
	}

	fn child_added(&mut self, tree: &ComponentTree, parent: ComponentHandle, child: ComponentHandle) {
		// A freshly attached subtree renders whole; any record left over for
		// it would describe a previous attachment.
		let discarded = self.discard_subtree(tree, child);
		if discarded > 0 {
			warn!(?child, discarded, "discarded stale records for re-added subtree");
		}
		if self.in_replaced_subtree(tree, parent) {
			// The parent renders fresh this cycle; its current child list is
			// part of that rendering.
			trace!(?parent, ?child, "child add inside replaced subtree");
			return;
		}
		let record = self.updates.entry(parent).or_default();
		if let Some(position) = record.removed.iter().position(|&c| c == child) {
			record.removed.remove(position);
		}
		if !record.added.contains(&child) {
			record.added.push(child);
		}
		record.flags |= UpdateFlags::CHILDREN;
	}

	fn child_removed(&mut self, tree: &ComponentTree, parent: ComponentHandle, child: ComponentHandle) {
		// Pending updates for the removed subtree will never render.
		self.discard_subtree(tree, child);
		if self.in_replaced_subtree(tree, parent) {
			trace!(?parent, ?child, "child removal inside replaced subtree");
			return;
		}
		let record = self.updates.entry(parent).or_default();
		if let Some(position) = record.added.iter().position(|&c| c == child) {
			// Added and removed within one cycle: net zero.
			record.added.remove(position);
		} else if !record.removed.contains(&child) {
			record.removed.push(child);
		}
		record.flags |= UpdateFlags::CHILDREN;
	}

	fn property_changed(
		&mut self,
		tree: &ComponentTree,
		component: ComponentHandle,
		name: &str,
		index: Option<usize>,
		old: &Option<Value>,
		new: &Option<Value>,
	) {
		if self.in_replaced_subtree(tree, component) {
			trace!(?component, name, "property change inside replaced subtree");
			return;
		}
		self.updates
			.entry(component)
			.or_default()
			.note_property(name, index, old.clone(), new.clone());
		if name == props::LAYOUT_DATA
			&& let Some(parent) = tree.parent(component)
			&& tree.is_registered(parent)
		{
			self.updates.entry(parent).or_default().flags |= UpdateFlags::LAYOUT_CHILD;
		}
	}

	/// Whether `component` sits inside a subtree that will be rendered whole
	/// this cycle (freshly added or explicitly invalidated), making
	/// incremental deltas for it redundant.
	fn in_replaced_subtree(&self, tree: &ComponentTree, component: ComponentHandle) -> bool {
		let mut current = component;
		loop {
			if self
				.updates
				.get(&current)
				.is_some_and(|u| u.flags.contains(UpdateFlags::FULL_REPLACE))
			{
				return true;
			}
			let Some(parent) = tree.parent(current) else {
				return false;
			};
			if self
				.updates
				.get(&parent)
				.is_some_and(|u| u.added.contains(&current))
			{
				return true;
			}
			current = parent;
		}
	}

	fn discard_subtree(&mut self, tree: &ComponentTree, root: ComponentHandle) -> usize {
		let members: FxHashSet<ComponentHandle> = tree.subtree(root).into_iter().collect();
		let before = self.updates.len();
		self.updates.retain(|subject, _| !members.contains(subject));
		before - self.updates.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::component::{ComponentKind, ComponentSpec};
	use crate::tree::InstanceId;

	struct Fixture {
		tree: ComponentTree,
		recorder: ChangeRecorder,
		root: ComponentHandle,
	}

	impl Fixture {
		fn new() -> Self {
			let mut tree = ComponentTree::new(InstanceId::next());
			let root = tree.create(ComponentSpec::new(ComponentKind::Column));
			tree.register_subtree(root).unwrap();
			Self {
				tree,
				recorder: ChangeRecorder::new(),
				root,
			}
		}

		fn container(&mut self) -> ComponentHandle {
			self.tree.create(ComponentSpec::new(ComponentKind::Column))
		}

		fn label(&mut self) -> ComponentHandle {
			self.tree.create(ComponentSpec::new(ComponentKind::Label))
		}

		fn add(&mut self, parent: ComponentHandle, child: ComponentHandle) {
			let delta = self.tree.add(parent, child, None).unwrap();
			for event in &delta.events {
				self.recorder.record(&self.tree, event);
			}
		}

		fn remove(&mut self, parent: ComponentHandle, child: ComponentHandle) {
			let delta = self.tree.remove(parent, child).unwrap();
			for event in &delta.events {
				self.recorder.record(&self.tree, event);
			}
		}

		fn set(&mut self, component: ComponentHandle, name: &str, value: &str) {
			let event = self
				.tree
				.set_property(component, name, Some(value.into()))
				.unwrap();
			self.recorder.record(&self.tree, &event);
		}
	}

	#[test]
	fn capture_is_complete_and_minimal() {
		let mut f = Fixture::new();
		let a = f.label();
		let b = f.label();
		let untouched = f.label();
		f.add(f.root, a);
		f.add(f.root, b);
		f.add(f.root, untouched);
		let _ = f.recorder.flush();

		// New cycle: touch a and b, leave untouched alone.
		f.set(a, "text", "one");
		f.set(b, "text", "two");
		let updates = f.recorder.flush();
		assert_eq!(updates.len(), 2);
		assert!(updates.contains_key(&a));
		assert!(updates.contains_key(&b));
		assert!(!updates.contains_key(&untouched));
	}

	#[test]
	fn added_child_needs_no_property_deltas() {
		let mut f = Fixture::new();
		let pane = f.container();
		let label = f.label();
		f.add(pane, label);
		f.add(f.root, pane);
		f.set(label, "text", "hello");

		let updates = f.recorder.flush();
		assert_eq!(updates.len(), 1);
		let root_update = &updates[&f.root];
		assert_eq!(root_update.added_children(), &[pane]);
		// The label's property change is folded into the fresh render.
		assert!(!updates.contains_key(&label));
	}

	#[test]
	fn add_then_remove_nets_to_nothing() {
		let mut f = Fixture::new();
		let label = f.label();
		f.add(f.root, label);
		f.set(label, "text", "gone");
		f.remove(f.root, label);

		let updates = f.recorder.flush();
		// The root record net-cancelled (flags remain from the child churn,
		// so a record may survive), but the label must not be a subject and
		// must appear in neither child list.
		assert!(!updates.contains_key(&label));
		if let Some(root_update) = updates.get(&f.root) {
			assert!(root_update.added_children().is_empty());
			assert!(root_update.removed_children().is_empty());
		}
		assert_eq!(f.tree.component_count(f.root), 0);
	}

	#[test]
	fn removal_discards_descendant_records() {
		let mut f = Fixture::new();
		let pane = f.container();
		let label = f.label();
		f.add(pane, label);
		f.add(f.root, pane);
		let _ = f.recorder.flush();

		f.set(label, "text", "pending");
		f.remove(f.root, pane);
		let updates = f.recorder.flush();
		assert!(!updates.contains_key(&label));
		assert!(!updates.contains_key(&pane));
		assert_eq!(updates[&f.root].removed_children(), &[pane]);
	}

	#[test]
	fn property_deltas_keep_first_old_latest_new() {
		let mut f = Fixture::new();
		let label = f.label();
		f.add(f.root, label);
		let _ = f.recorder.flush();

		f.set(label, "text", "one");
		f.set(label, "text", "two");
		f.set(label, "text", "three");
		let updates = f.recorder.flush();
		let delta = updates[&label].property("text").unwrap();
		assert_eq!(delta.old, None); // was unset before the cycle
		assert_eq!(delta.new, Some("three".into()));
	}

	#[test]
	fn layout_data_flags_the_parent() {
		let mut f = Fixture::new();
		let label = f.label();
		f.add(f.root, label);
		let _ = f.recorder.flush();

		f.set(label, props::LAYOUT_DATA, "cell:2");
		let updates = f.recorder.flush();
		assert!(updates[&label].property(props::LAYOUT_DATA).is_some());
		assert!(updates[&f.root].flags().contains(UpdateFlags::LAYOUT_CHILD));
	}

	#[test]
	fn visibility_sets_flag_not_property() {
		let mut f = Fixture::new();
		let label = f.label();
		f.add(f.root, label);
		let _ = f.recorder.flush();

		let event = f.tree.set_visible(label, false).unwrap().unwrap();
		f.recorder.record(&f.tree, &event);
		let updates = f.recorder.flush();
		assert!(updates[&label].flags().contains(UpdateFlags::VISIBILITY));
		assert_eq!(updates[&label].property_count(), 0);
	}

	#[test]
	fn invalidate_suppresses_descendant_deltas() {
		let mut f = Fixture::new();
		let pane = f.container();
		let label = f.label();
		f.add(pane, label);
		f.add(f.root, pane);
		let _ = f.recorder.flush();

		f.recorder.invalidate(pane);
		f.set(label, "text", "moot");
		let updates = f.recorder.flush();
		assert!(updates[&pane].flags().contains(UpdateFlags::FULL_REPLACE));
		assert!(!updates.contains_key(&label));
	}

	// ── Invariant stress test (deterministic xorshift) ──

	struct Xorshift64(u64);

	impl Xorshift64 {
		fn next(&mut self) -> u64 {
			let mut x = self.0;
			x ^= x << 13;
			x ^= x >> 7;
			x ^= x << 17;
			self.0 = x;
			x
		}

		fn pick(&mut self, bound: usize) -> usize {
			(self.next() % bound as u64) as usize
		}
	}

	#[test]
	fn stress_flush_invariants_hold() {
		const OPS: usize = 4_000;
		let mut f = Fixture::new();
		let containers: Vec<_> = (0..4).map(|_| f.container()).collect();
		let leaves: Vec<_> = (0..12).map(|_| f.label()).collect();
		for &c in &containers {
			f.add(f.root, c);
		}
		let mut rng = Xorshift64(0x5EED_CAFE);

		for _ in 0..OPS {
			match rng.pick(10) {
				// Attach a leaf somewhere (possibly moving it).
				0..=3 => {
					let leaf = leaves[rng.pick(leaves.len())];
					let target = containers[rng.pick(containers.len())];
					f.add(target, leaf);
				}
				// Detach a leaf if attached.
				4..=6 => {
					let leaf = leaves[rng.pick(leaves.len())];
					if let Some(parent) = f.tree.parent(leaf) {
						f.remove(parent, leaf);
					}
				}
				// Mutate a property.
				_ => {
					let leaf = leaves[rng.pick(leaves.len())];
					if f.tree.is_registered(leaf) {
						f.set(leaf, "text", if rng.pick(2) == 0 { "a" } else { "b" });
					}
				}
			}

			// Occasionally flush and check the full record set.
			if rng.pick(97) == 0 {
				let updates = f.recorder.flush();
				for (subject, update) in &updates {
					assert!(
						f.tree.is_registered(*subject),
						"record subject {subject:?} must be registered at flush"
					);
					for added in update.added_children() {
						assert_eq!(
							f.tree.parent(*added),
							Some(*subject),
							"added child must still belong to the subject"
						);
					}
					for removed in update.removed_children() {
						assert_ne!(
							f.tree.parent(*removed),
							Some(*subject),
							"removed child must no longer belong to the subject"
						);
						assert!(
							!update.added_children().contains(removed),
							"added and removed sets must be disjoint"
						);
					}
				}
			}
		}
	}
}
