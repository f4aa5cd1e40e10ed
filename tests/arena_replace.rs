use set_dom::{arena::ArenaTree, reconcile, Error, Replacement, Tree};

use arena_support_::{init_logging, parse, Journal, Recorder};

#[test]
fn kind_mismatch_adopts_the_new_node() {
	init_logging();
	let mut tree = ArenaTree::new();
	let mut recorder = Recorder::default();
	let old = parse(&mut tree, r#"<div><span id="gone">x</span></div>"#);
	let new = parse(&mut tree, "<div>text</div>");
	tree.set_mounted(&old);
	let span = tree.first_child(&old).unwrap();
	let text = tree.first_child(&new).unwrap();

	reconcile(&mut tree, &mut recorder, &old, new).unwrap();

	assert_eq!(tree.first_child(&old), Some(text));
	assert_eq!(tree.parent(&span), None);
	assert_eq!(recorder.0, ["dismount:gone"]);

	let newer = parse(&mut tree, r#"<div><span id="back">x</span></div>"#);
	let span = tree.first_child(&newer).unwrap();
	reconcile(&mut tree, &mut recorder, &old, newer).unwrap();

	assert_eq!(tree.first_child(&old), Some(span));
	assert_eq!(recorder.0, ["dismount:gone", "mount:back"]);
}

#[test]
fn kind_mismatch_orders_notifications_around_the_swap() {
	init_logging();
	let mut journal = Journal::default();
	let old = parse(&mut journal.tree, r#"<div><!-- placeholder --></div>"#);
	let new = parse(&mut journal.tree, r#"<div><p id="p"></p></div>"#);
	journal.tree.set_mounted(&old);
	let comment = journal.tree.first_child(&old).unwrap();
	let p = journal.tree.first_child(&new).unwrap();
	let mut listener = journal.listener();

	reconcile(&mut journal, &mut listener, &old, new).unwrap();

	assert!(journal.position(&format!("replace {} with {}", comment, p)) < journal.position(&format!("mount:p {}", p)));
}

#[test]
fn tag_mismatch_keeps_children() {
	init_logging();
	let mut tree = ArenaTree::new();
	let mut recorder = Recorder::default();
	let old = parse(&mut tree, r#"<div><b class="x"><i id="k">t</i></b></div>"#);
	let new = parse(&mut tree, r#"<div><u title="y"><i id="k">t2</i></u></div>"#);
	tree.set_mounted(&old);
	let b = tree.first_child(&old).unwrap();
	let i = tree.first_child(&b).unwrap();
	let u = tree.first_child(&new).unwrap();

	reconcile(&mut tree, &mut recorder, &old, new).unwrap();

	assert_eq!(tree.outer_html(old), r#"<div><u title="y"><i id="k">t2</i></u></div>"#);
	let replacement = tree.first_child(&old).unwrap();
	assert_ne!(replacement, b);
	assert_ne!(replacement, u, "a fresh element, not the new one");
	assert_eq!(tree.first_child(&replacement), Some(i));
	assert_eq!(tree.parent(&b), None);
	assert!(recorder.0.is_empty(), "{:?}", recorder.0);
}

#[test]
fn documents_resolve_to_their_root_element() {
	init_logging();
	let mut tree = ArenaTree::new();
	let mut recorder = Recorder::default();
	let document = tree.create_document();
	let html = tree.parse("<html><body><p>a</p></body></html>", set_dom::ParseMode::Document).unwrap();
	tree.append_child(&document, &html);

	reconcile(&mut tree, &mut recorder, &document, "<html><body><p>b</p></body></html>").unwrap();

	assert_eq!(tree.outer_html(document), "<html><body><p>b</p></body></html>");
	assert_eq!(tree.document_element(&document), Some(html));
	assert!(tree.is_mounted(&html));
}

#[test]
fn markup_fragments() {
	init_logging();
	let mut tree = ArenaTree::new();
	let mut recorder = Recorder::default();
	let old = tree.create_element("div");
	tree.set_attribute(old, "id", "app");

	reconcile(&mut tree, &mut recorder, &old, r#"<div id="app" class="a">hi<br></div>"#).unwrap();
	assert_eq!(tree.outer_html(old), r#"<div id="app" class="a">hi<br></div>"#);
	assert_eq!(recorder.0, ["mount:app"]);

	let markup = String::from(r#"<div id="app">bye</div>"#);
	reconcile(&mut tree, &mut recorder, &old, &markup).unwrap();
	assert_eq!(tree.outer_html(old), r#"<div id="app">bye</div>"#);
	assert_eq!(recorder.0, ["mount:app"]);
}

#[test]
fn invalid_arguments_are_rejected_before_mutating() {
	init_logging();
	let mut tree = ArenaTree::new();
	let mut recorder = Recorder::default();
	let old = parse(&mut tree, "<div>keep</div>");

	let mut other = ArenaTree::new();
	for _ in 0..16 {
		other.create_text("");
	}
	let foreign = other.create_text("foreign");

	assert_eq!(reconcile(&mut tree, &mut recorder, &foreign, "<div></div>"), Err(Error::InvalidArgument));
	assert_eq!(reconcile(&mut tree, &mut recorder, &old, foreign), Err(Error::InvalidArgument));

	let empty_document = tree.create_document();
	assert_eq!(reconcile(&mut tree, &mut recorder, &empty_document, "<html></html>"), Err(Error::InvalidArgument));

	assert_eq!(tree.outer_html(old), "<div>keep</div>");
	assert!(!tree.is_mounted(&old));
	assert!(recorder.0.is_empty());
}

#[test]
fn markup_errors_leave_the_tree_alone() {
	init_logging();
	let mut tree = ArenaTree::new();
	let mut recorder = Recorder::default();
	let old = parse(&mut tree, "<div>keep</div>");

	assert!(matches!(reconcile(&mut tree, &mut recorder, &old, "<div"), Err(Error::Markup(_))));
	assert_eq!(tree.outer_html(old), "<div>keep</div>");

	let mut journal = Journal::default();
	let old = parse(&mut journal.tree, "<div></div>");
	let mut listener = journal.listener();
	assert_eq!(reconcile(&mut journal, &mut listener, &old, Replacement::Markup("<div></div>")), Err(Error::MarkupUnsupported));
}

#[test]
fn fragments_diff_children_only() {
	init_logging();
	let mut tree = ArenaTree::new();
	let mut recorder = Recorder::default();
	let old = tree.create_fragment();
	tree.set_inner_html(old, r#"<p id="a">1</p>text"#).unwrap();
	let new = tree.create_fragment();
	tree.set_inner_html(new, r#"text<p id="a">2</p>"#).unwrap();
	tree.set_mounted(&old);
	let p = tree.first_child(&old).unwrap();

	reconcile(&mut tree, &mut recorder, &old, new).unwrap();

	assert_eq!(tree.inner_html(old), r#"text<p id="a">2</p>"#);
	assert_eq!(tree.children(&old)[1], p);
	assert!(recorder.0.is_empty(), "{:?}", recorder.0);
}
