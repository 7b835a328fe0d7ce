//! Full framework loop through the shipped widgets: build a UI, render it,
//! feed client batches back, and render the follow-up cycles.

use pretty_assertions::assert_eq;
use trellis_core::{
	ApplicationInstance, ClientMessage, ComponentHandle, Directive, DirectiveBuffer, ElementId,
	PeerRegistry, Value, props,
};
use trellis_widgets::{
	Button, Column, ContentPane, Dialog, Label, SplitPane, TextField, Window, default_peers,
	dialog, on_click,
};

fn element(app: &ApplicationInstance, component: ComponentHandle) -> ElementId {
	ElementId::component(app.tree().id(component).unwrap())
}

fn sync(app: &mut ApplicationInstance, peers: &PeerRegistry) -> Vec<Directive> {
	let mut surface = DirectiveBuffer::new();
	app.sync(peers, &mut surface).unwrap();
	surface.into_directives()
}

struct Demo {
	app: ApplicationInstance,
	pane: ComponentHandle,
	column: ComponentHandle,
	label: ComponentHandle,
	button: ComponentHandle,
	field: ComponentHandle,
}

fn demo(peers: &PeerRegistry) -> Demo {
	let mut app = ApplicationInstance::new();
	let window = Window::new("demo").create(&mut app);
	let pane = ContentPane::new().create(&mut app);
	let column = Column::new().cell_spacing(8).create(&mut app);
	let label = Label::new("hello").create(&mut app);
	let button = Button::new("go").create(&mut app);
	let field = TextField::new().columns(24).create(&mut app);
	app.add(window, pane, None).unwrap();
	app.add(pane, column, None).unwrap();
	app.add(column, label, None).unwrap();
	app.add(column, button, None).unwrap();
	app.add(column, field, None).unwrap();
	app.set_window(window).unwrap();
	let first = sync(&mut app, peers);
	assert!(!first.is_empty());
	Demo {
		app,
		pane,
		column,
		label,
		button,
		field,
	}
}

#[test]
fn initial_render_walks_the_tree_top_down() {
	let peers = default_peers();
	let mut app = ApplicationInstance::new();
	let window = Window::new("demo").create(&mut app);
	let pane = ContentPane::new().create(&mut app);
	let column = Column::new().cell_spacing(8).create(&mut app);
	let label = Label::new("hello").create(&mut app);
	app.add(window, pane, None).unwrap();
	app.add(pane, column, None).unwrap();
	app.add(column, label, None).unwrap();
	app.set_window(window).unwrap();

	let directives = sync(&mut app, &peers);
	assert_eq!(
		directives,
		vec![
			Directive::Remove {
				element: element(&app, window),
			},
			Directive::Append {
				container: ElementId::root(),
				element: element(&app, window),
				markup: "<window title=\"demo\">".into(),
			},
			Directive::Append {
				container: element(&app, window),
				element: element(&app, pane),
				markup: "<div class=\"content-pane\">".into(),
			},
			Directive::Append {
				container: element(&app, pane),
				element: element(&app, column),
				markup: "<div class=\"column\" cell-spacing=\"8\">".into(),
			},
			Directive::Append {
				container: element(&app, column),
				element: element(&app, label),
				markup: "<span class=\"label\">hello</span>".into(),
			},
		]
	);
}

#[test]
fn client_text_input_round_trips() {
	let peers = default_peers();
	let mut demo = demo(&peers);
	let field_id = demo.app.tree().id(demo.field).unwrap();

	// Decode a wire batch the way a transport would.
	let json = format!(
		r#"{{"updates":[{{"type":"property","component":{},"name":"text","value":"typed"}}]}}"#,
		field_id.0
	);
	let message: ClientMessage = serde_json::from_str(&json).unwrap();
	let report = demo.app.receive(message);
	assert_eq!(report.applied, 1);
	assert_eq!(
		demo.app.tree().local_property(demo.field, props::TEXT),
		Some(&Value::from("typed"))
	);

	// The client-originated change renders incrementally.
	let directives = sync(&mut demo.app, &peers);
	assert_eq!(
		directives,
		vec![Directive::SetAttribute {
			element: element(&demo.app, demo.field),
			name: "value".into(),
			value: "typed".into(),
		}]
	);
}

#[test]
fn click_handler_mutates_and_rerenders() {
	let peers = default_peers();
	let mut demo = demo(&peers);
	let label = demo.label;
	on_click(&mut demo.app, demo.button, move |app| {
		app.set_property(label, props::TEXT, Some("clicked".into())).unwrap();
	});

	let report = demo.app.receive(ClientMessage {
		updates: vec![trellis_core::ClientUpdate::Action {
			component: demo.app.tree().id(demo.button).unwrap(),
			name: "click".into(),
			value: None,
		}],
	});
	assert_eq!(report.actions, 1);

	let directives = sync(&mut demo.app, &peers);
	assert_eq!(
		directives,
		vec![Directive::SetText {
			element: element(&demo.app, demo.label),
			text: "clicked".into(),
		}]
	);
}

#[test]
fn column_tail_append_stays_incremental() {
	let peers = default_peers();
	let mut demo = demo(&peers);
	let extra = Label::new("tail").create(&mut demo.app);
	demo.app.add(demo.column, extra, None).unwrap();

	let directives = sync(&mut demo.app, &peers);
	assert_eq!(
		directives,
		vec![Directive::Append {
			container: element(&demo.app, demo.column),
			element: element(&demo.app, extra),
			markup: "<span class=\"label\">tail</span>".into(),
		}]
	);
}

#[test]
fn column_mid_insert_forces_full_replace() {
	let peers = default_peers();
	let mut demo = demo(&peers);
	let first = Label::new("first").create(&mut demo.app);
	demo.app.add(demo.column, first, Some(0)).unwrap();

	let directives = sync(&mut demo.app, &peers);
	// The whole column is re-rendered: remove, shell, then every child.
	assert_eq!(
		directives[0],
		Directive::Remove {
			element: element(&demo.app, demo.column),
		}
	);
	let appends = directives
		.iter()
		.filter(|d| matches!(d, Directive::Append { .. }))
		.count();
	// Column shell + four children.
	assert_eq!(appends, 5);
}

#[test]
fn split_pane_swap_forces_full_replace() {
	let peers = default_peers();
	let mut app = ApplicationInstance::new();
	let window = Window::new("split demo").create(&mut app);
	let pane = ContentPane::new().create(&mut app);
	let split = SplitPane::horizontal().separator_position(200).create(&mut app);
	let left = Label::new("left").create(&mut app);
	let right = Label::new("right").create(&mut app);
	app.add(window, pane, None).unwrap();
	app.add(pane, split, None).unwrap();
	app.add(split, left, None).unwrap();
	app.add(split, right, None).unwrap();
	app.set_window(window).unwrap();
	let first = sync(&mut app, &peers);
	// Children land in their slot containers.
	let split_id = app.tree().id(split).unwrap();
	assert!(first.iter().any(|d| matches!(
		d,
		Directive::Append { container, .. } if *container == ElementId::slot(split_id, 0)
	)));
	assert!(first.iter().any(|d| matches!(
		d,
		Directive::Append { container, .. } if *container == ElementId::slot(split_id, 1)
	)));

	// Swap: move `left` to the second slot.
	app.remove(split, left).unwrap();
	app.add(split, left, Some(1)).unwrap();
	let directives = sync(&mut app, &peers);
	assert_eq!(
		directives[0],
		Directive::Remove {
			element: element(&app, split),
		}
	);

	// A separator nudge afterwards patches in place.
	app.set_property(split, trellis_widgets::split_pane::SEPARATOR_POSITION, Some(240.into()))
		.unwrap();
	let directives = sync(&mut app, &peers);
	assert_eq!(
		directives,
		vec![Directive::SetAttribute {
			element: element(&app, split),
			name: "separator-position".into(),
			value: "240".into(),
		}]
	);
}

#[test]
fn dialog_blocks_outside_actions_while_open() {
	let peers = default_peers();
	let mut demo = demo(&peers);
	let clicked = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
	let seen = clicked.clone();
	on_click(&mut demo.app, demo.button, move |_| {
		seen.store(true, std::sync::atomic::Ordering::SeqCst);
	});

	let dialog = Dialog::new("confirm").open(&mut demo.app, demo.pane).unwrap();
	let _ = sync(&mut demo.app, &peers);

	let report = demo.app.receive(ClientMessage {
		updates: vec![trellis_core::ClientUpdate::Action {
			component: demo.app.tree().id(demo.button).unwrap(),
			name: "click".into(),
			value: None,
		}],
	});
	assert_eq!(report.dropped_barrier, 1);
	assert!(!clicked.load(std::sync::atomic::Ordering::SeqCst));

	// Closing the dialog lets the click through.
	dialog::close(&mut demo.app, dialog).unwrap();
	let report = demo.app.receive(ClientMessage {
		updates: vec![trellis_core::ClientUpdate::Action {
			component: demo.app.tree().id(demo.button).unwrap(),
			name: "click".into(),
			value: None,
		}],
	});
	assert_eq!(report.actions, 1);
	assert!(clicked.load(std::sync::atomic::Ordering::SeqCst));
}
