#![cfg(target_arch = "wasm32")]

use set_dom::{
	reconcile,
	web::{reconcile_value, EventDispatcher, WebTree},
	Error, Tree,
};
use std::{cell::Cell, rc::Rc};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{window, Element, Node};

wasm_bindgen_test_configure!(run_in_browser);

static mut LOG_INITIALIZED: bool = false;

fn init_logging() {
	unsafe {
		if !LOG_INITIALIZED {
			tracing_wasm::set_as_global_default();
			LOG_INITIALIZED = true;
		}
	}
}

fn div(inner_html: &str) -> Element {
	let element = window().unwrap().document().unwrap().create_element("div").unwrap();
	element.set_inner_html(inner_html);
	element
}

fn diff(old: &Element, new: &Element) {
	reconcile(&mut WebTree::new(), &mut EventDispatcher, old, Node::from(new.clone())).unwrap()
}

fn child(node: &Node, index: usize) -> Node {
	let mut child = node.first_child().unwrap();
	for _ in 0..index {
		child = child.next_sibling().unwrap();
	}
	child
}

#[wasm_bindgen_test]
fn attributes() {
	init_logging();
	let old = div("");
	let new = div("");
	new.set_attribute("a", "1").unwrap();
	new.set_attribute("b", "2").unwrap();
	diff(&old, &new);
	assert_eq!(old.get_attribute("a").as_deref(), Some("1"));
	assert_eq!(old.get_attribute("b").as_deref(), Some("2"));

	let newer = div("");
	newer.set_attribute("b", "2").unwrap();
	diff(&old, &newer);
	assert_eq!(old.get_attribute("a"), None);
	assert_eq!(old.get_attribute("b").as_deref(), Some("2"));
}

#[wasm_bindgen_test]
fn node_value() {
	init_logging();
	let old = div("hello world");
	diff(&old, &div("hello world 2"));
	assert_eq!(old.first_child().unwrap().node_value().as_deref(), Some("hello world 2"));
}

#[wasm_bindgen_test]
fn children() {
	init_logging();
	let old = div(r#"<a href="link">hello</a><b>text</b><i>text2</i>"#);
	let first = old.first_child().unwrap();
	diff(&old, &div(r#"<a href="link2">hello2</a><i>text1</i>"#));
	assert_eq!(old.outer_html(), r#"<div><a href="link2">hello2</a><i>text1</i></div>"#);
	assert_eq!(old.first_child(), Some(first));
}

#[wasm_bindgen_test]
fn children_by_id() {
	init_logging();
	let old = div(r#"<a href="link">hello</a><b>text</b><i id="test">text2</i>"#);
	let (first, last) = (old.first_child().unwrap(), old.last_child().unwrap());
	diff(&old, &div(r#"<a href="link2">hello2</a><i id="test">text1</i>"#));
	assert_eq!(old.outer_html(), r#"<div><a href="link2">hello2</a><i id="test">text1</i></div>"#);
	assert_eq!(old.first_child(), Some(first));
	assert_eq!(old.last_child(), Some(last));
}

#[wasm_bindgen_test]
fn keyed_removal() {
	init_logging();
	let old = div(r#"<a href="link">hello</a><b>text</b><i data-key="test">text2</i>"#);
	let (first, last) = (old.first_child().unwrap(), old.last_child().unwrap());
	diff(&old, &div(r#"<a href="link2">hello2</a><i data-key="test">text1</i>"#));
	assert_eq!(old.outer_html(), r#"<div><a href="link2">hello2</a><i data-key="test">text1</i></div>"#);
	assert_eq!(old.first_child(), Some(first));
	assert_eq!(old.last_child(), Some(last));
}

#[wasm_bindgen_test]
fn keyed_move() {
	init_logging();
	let old = div(r#"<a href="link">hello</a><b data-key="test1">text</b><i data-key="test2">text2</i>"#);
	let (second, third) = (child(&old, 1), child(&old, 2));
	diff(&old, &div(r#"<a href="link">hello</a><i data-key="test2">text2</i><b data-key="test1">text</b>"#));
	assert_eq!(old.inner_html(), r#"<a href="link">hello</a><i data-key="test2">text2</i><b data-key="test1">text</b>"#);
	assert_eq!(child(&old, 1), third);
	assert_eq!(child(&old, 2), second);
}

#[wasm_bindgen_test]
fn xhtml_namespace() {
	init_logging();
	let document = window().unwrap().document().unwrap();
	let old = document.create_element_ns(Some("http://www.w3.org/1999/xhtml"), "div").unwrap();
	old.set_inner_html(r#"<a href="link">hello</a><b>text</b><i data-key="test">text2</i>"#);
	let new = document.create_element_ns(Some("http://www.w3.org/1999/xhtml"), "div").unwrap();
	new.set_inner_html(r#"<a href="link2">hello2</a><i data-key="test">text1</i>"#);
	let (first, last) = (old.first_child().unwrap(), old.last_child().unwrap());
	diff(&old, &new);
	assert_eq!(old.outer_html(), r#"<div><a href="link2">hello2</a><i data-key="test">text1</i></div>"#);
	assert_eq!(old.first_child(), Some(first));
	assert_eq!(old.last_child(), Some(last));
}

#[wasm_bindgen_test]
fn markup() {
	init_logging();
	let old = div("<p>a</p>");
	reconcile(&mut WebTree::new(), &mut EventDispatcher, &old, r#"<div class="x"><p>b</p></div>"#).unwrap();
	assert_eq!(old.outer_html(), r#"<div class="x"><p>b</p></div>"#);
}

#[wasm_bindgen_test]
fn lifecycle_events() {
	init_logging();
	let old = div("");
	diff(&old, &div(""));

	let new = div(r#"<p data-key="x"></p>"#);
	let p = new.first_child().unwrap();
	let (mounts, dismounts) = (Rc::new(Cell::new(0)), Rc::new(Cell::new(0)));
	let on_mount = {
		let mounts = mounts.clone();
		Closure::wrap(Box::new(move || mounts.set(mounts.get() + 1)) as Box<dyn FnMut()>)
	};
	let on_dismount = {
		let dismounts = dismounts.clone();
		Closure::wrap(Box::new(move || dismounts.set(dismounts.get() + 1)) as Box<dyn FnMut()>)
	};
	p.add_event_listener_with_callback("mount", on_mount.as_ref().unchecked_ref()).unwrap();
	p.add_event_listener_with_callback("dismount", on_dismount.as_ref().unchecked_ref()).unwrap();

	diff(&old, &new);
	assert_eq!((mounts.get(), dismounts.get()), (1, 0));
	assert_eq!(old.first_child(), Some(p));

	diff(&old, &div(""));
	assert_eq!((mounts.get(), dismounts.get()), (1, 1));
	assert_eq!(old.first_child(), None);
}

#[wasm_bindgen_test]
fn values_from_javascript() {
	init_logging();
	let old = div("a");
	assert!(WebTree::new().is_node(&old), "typed handles are taken as-is");
	reconcile_value(&old, &JsValue::from_str("<div>b</div>")).unwrap();
	assert_eq!(old.inner_html(), "b");

	assert_eq!(reconcile_value(&JsValue::NULL, &JsValue::from_str("<div></div>")), Err(Error::InvalidArgument));
	assert_eq!(reconcile_value(&JsValue::UNDEFINED, &JsValue::from_str("<div></div>")), Err(Error::InvalidArgument));
	assert_eq!(reconcile_value(&old, &JsValue::from(5)), Err(Error::InvalidArgument));
	assert_eq!(old.inner_html(), "b");
}
