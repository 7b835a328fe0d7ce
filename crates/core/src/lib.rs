#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Server-side component UI core: the tree, change tracking, and the
//! client synchronization engine.
//!
//! Application code builds a tree of stateful components inside an
//! [`ApplicationInstance`]; the framework folds every mutation into pending
//! update records and, once per synchronization cycle, turns those records
//! into render directives through per-kind peers. Inbound client batches are
//! decoded and applied back onto the tree, re-entering the same recorder.
//!
//! # Architecture
//!
//! ```text
//! ApplicationInstance
//! ├── tree: ComponentTree            // owned component hierarchy
//! ├── updates: UpdateManager         // ChangeRecorder + inbound totals
//! ├── render_states: RenderStateStore // per-component peer memos
//! └── task_queues: TaskQueues        // cross-thread deferred work
//!
//! mutate → record → sync(peers, surface) → directives → client
//!                ↑                                         │
//!                └──────────── receive(batch) ←────────────┘
//! ```
//!
//! Each session is driven by one synchronization thread at a time; sessions
//! are fully independent of each other.

/// Session state and the mutation API.
pub mod app;
/// Inbound client batches and action dispatch.
pub mod client;
pub mod component;
pub mod error;
/// Peer contract, registry, and the per-cycle context.
pub mod peer;
/// Pending update records.
pub mod recorder;
pub mod render_state;
pub mod style;
/// Render directives and the surface trait.
pub mod surface;
pub mod tasks;
/// The component tree and its mutation events.
pub mod tree;
pub mod update_manager;
pub mod value;

pub use app::{ActionHandler, ApplicationInstance};
pub use client::{ActionEvent, ClientMessage, ClientUpdate, InboundReport};
pub use component::{Capabilities, ComponentKind, ComponentSpec, Locale, props};
pub use error::{InvalidChildReason, PeerError, SyncError, TreeError};
pub use peer::{PeerRegistry, SyncContext, SyncPeer};
pub use recorder::{ChangeRecorder, ComponentUpdate, PendingUpdates, PropertyDelta, UpdateFlags};
pub use render_state::RenderStateStore;
pub use style::{Style, StyleSheet};
pub use surface::{Directive, DirectiveBuffer, ElementId, RenderSurface};
pub use tasks::{Task, TaskQueueHandle, TaskQueues};
pub use tree::{ComponentHandle, ComponentId, ComponentTree, InstanceId, TreeEvent};
pub use update_manager::{SyncReport, UpdateManager};
pub use value::Value;
