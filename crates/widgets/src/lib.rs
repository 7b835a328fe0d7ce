#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Reference widget set for the trellis core.
//!
//! Each widget is a thin builder over [`trellis_core::ComponentSpec`] plus a
//! [`SyncPeer`] that renders HTML-flavoured markup. The widgets exist to
//! exercise the core contract end-to-end; a real transport would swap the
//! markup for whatever its client understands while keeping the peers'
//! structure.
//!
//! ```no_run
//! use trellis_core::{ApplicationInstance, DirectiveBuffer};
//! use trellis_widgets::{ContentPane, Label, Window, default_peers};
//!
//! let peers = default_peers();
//! let mut app = ApplicationInstance::new();
//! let window = Window::new("demo").create(&mut app);
//! let pane = ContentPane::new().create(&mut app);
//! let label = Label::new("hello").create(&mut app);
//! app.add(window, pane, None).unwrap();
//! app.add(pane, label, None).unwrap();
//! app.set_window(window).unwrap();
//!
//! let mut surface = DirectiveBuffer::new();
//! app.sync(&peers, &mut surface).unwrap();
//! ```

use trellis_core::{ComponentKind, PeerRegistry};

pub mod button;
pub mod dialog;
mod html;
pub mod label;
pub mod split_pane;
pub mod stack;
pub mod text_field;
pub mod window;

pub use button::{Button, ButtonPeer, on_click};
pub use dialog::{Dialog, DialogPeer};
pub use label::{Label, LabelPeer};
pub use split_pane::{SplitPane, SplitPanePeer};
pub use stack::{Column, Row, StackPeer};
pub use text_field::{TextField, TextFieldPeer};
pub use window::{ContentPane, ContentPanePeer, Window, WindowPeer};

/// A peer registry covering every shipped widget kind.
pub fn default_peers() -> PeerRegistry {
	PeerRegistry::new()
		.with(ComponentKind::Window, WindowPeer)
		.with(ComponentKind::ContentPane, ContentPanePeer)
		.with(ComponentKind::Column, StackPeer::column())
		.with(ComponentKind::Row, StackPeer::row())
		.with(ComponentKind::SplitPane, SplitPanePeer)
		.with(ComponentKind::Label, LabelPeer)
		.with(ComponentKind::Button, ButtonPeer)
		.with(ComponentKind::TextField, TextFieldPeer)
		.with(ComponentKind::Dialog, DialogPeer)
}
