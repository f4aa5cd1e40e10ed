use set_dom::{Config, Reconciler, Tree};

use arena_support_::{init_logging, Journal};

fn fragments(journal: &mut Journal, old: &str, new: &str) -> (set_dom::arena::NodeId, set_dom::arena::NodeId) {
	let old = journal.tree.parse(old, set_dom::ParseMode::Fragment).unwrap();
	let new = journal.tree.parse(new, set_dom::ParseMode::Fragment).unwrap();
	journal.tree.set_mounted(&old);
	(old, new)
}

#[test]
fn matching_checksums_skip_the_subtree() {
	init_logging();
	let mut journal = Journal::default();
	let (old, new) = fragments(&mut journal, r#"<div data-checksum="X"><span>old</span></div>"#, r#"<div data-checksum="X"><span>new</span></div>"#);
	let mut listener = journal.listener();

	Reconciler::new(&mut journal, &mut listener).with_config(Config::default()).reconcile(&old, new).unwrap();

	assert_eq!(journal.tree.outer_html(old), r#"<div data-checksum="X"><span>old</span></div>"#);
	assert!(journal.entries().is_empty(), "{:?}", journal.entries());
}

#[test]
fn differing_checksums_diff_fully() {
	init_logging();
	let mut journal = Journal::default();
	let (old, new) = fragments(&mut journal, r#"<div data-checksum="X"><span>old</span></div>"#, r#"<div data-checksum="Y"><span>new</span></div>"#);
	let mut listener = journal.listener();

	Reconciler::new(&mut journal, &mut listener).with_config(Config::default()).reconcile(&old, new).unwrap();

	assert_eq!(journal.tree.outer_html(old), r#"<div data-checksum="Y"><span>new</span></div>"#);
}

#[test]
fn missing_checksums_never_match() {
	init_logging();
	let mut journal = Journal::default();
	let (old, new) = fragments(&mut journal, "<div><span>old</span></div>", r#"<div data-checksum=""><span>new</span></div>"#);
	let mut listener = journal.listener();

	Reconciler::new(&mut journal, &mut listener).with_config(Config::default()).reconcile(&old, new).unwrap();

	assert_eq!(journal.tree.outer_html(old), r#"<div data-checksum=""><span>new</span></div>"#);
}

#[test]
fn checksums_can_be_disabled() {
	init_logging();
	let mut journal = Journal::default();
	let (old, new) = fragments(&mut journal, r#"<div data-checksum="X"><span>old</span></div>"#, r#"<div data-checksum="X"><span>new</span></div>"#);
	let mut listener = journal.listener();

	Reconciler::new(&mut journal, &mut listener).with_config(Config::default().without_checksum()).reconcile(&old, new).unwrap();

	assert_eq!(journal.tree.outer_html(old), r#"<div data-checksum="X"><span>new</span></div>"#);
}

#[test]
fn ignored_on_both_sides() {
	init_logging();
	let mut journal = Journal::default();
	let (old, new) = fragments(&mut journal, "<div data-ignore><span>old</span></div>", r#"<div data-ignore class="x"><b>new</b></div>"#);
	let mut listener = journal.listener();

	Reconciler::new(&mut journal, &mut listener).with_config(Config::default()).reconcile(&old, new).unwrap();

	assert_eq!(journal.tree.outer_html(old), r#"<div data-ignore=""><span>old</span></div>"#);
	assert!(journal.entries().is_empty(), "{:?}", journal.entries());

	let newer = journal.tree.parse(r#"<div class="x"><b>new</b></div>"#, set_dom::ParseMode::Fragment).unwrap();
	Reconciler::new(&mut journal, &mut listener).with_config(Config::default()).reconcile(&old, newer).unwrap();

	assert_eq!(journal.tree.outer_html(old), r#"<div class="x"><b>new</b></div>"#);
}

#[test]
fn ignored_on_one_side_only() {
	init_logging();
	let mut journal = Journal::default();
	let (old, new) = fragments(&mut journal, "<div><span>old</span></div>", "<div data-ignore><span>new</span></div>");
	let mut listener = journal.listener();

	Reconciler::new(&mut journal, &mut listener).with_config(Config::default()).reconcile(&old, new).unwrap();

	assert_eq!(journal.tree.outer_html(old), r#"<div data-ignore=""><span>new</span></div>"#);
}

#[test]
fn custom_marker_attributes() {
	init_logging();
	let mut journal = Journal::default();
	let (old, new) = fragments(&mut journal, r#"<ul><li sum="1">a</li><li keep>b</li></ul>"#, r#"<ul><li sum="1">A</li><li keep>B</li></ul>"#);
	let mut listener = journal.listener();

	let config = Config::default().checksum_attribute("sum").ignore_attribute("keep");
	Reconciler::new(&mut journal, &mut listener).with_config(config).reconcile(&old, new).unwrap();

	assert_eq!(journal.tree.outer_html(old), r#"<ul><li sum="1">a</li><li keep="">b</li></ul>"#);
}

#[test]
fn depth_limit() {
	init_logging();
	let mut journal = Journal::default();
	let (old, new) = fragments(&mut journal, r#"<div><p class="a"><b>x</b></p></div>"#, r#"<div><p class="b"><b>y</b></p></div>"#);
	let mut listener = journal.listener();

	Reconciler::new(&mut journal, &mut listener).with_config(Config::default().depth_limit(2)).reconcile(&old, new).unwrap();

	assert_eq!(journal.tree.outer_html(old), r#"<div><p class="b"><b>x</b></p></div>"#);
}
