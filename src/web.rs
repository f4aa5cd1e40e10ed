//! [`Tree`] and [`Listener`] implementations for the browser DOM.
//!
//! Mount and dismount notifications are delivered as non-bubbling [***Event***](https://developer.mozilla.org/en-US/docs/Web/API/Event)s
//! named `"mount"` and `"dismount"`, dispatched on the affected element.

use crate::{
	diff::{Reconciler, Replacement},
	error::{Error, Result},
	lifecycle::{Lifecycle, Listener},
	markers::Key,
	tree::{AttrName, NodeKind, ParseMode, TagName, Tree},
};
use js_sys::Reflect;
use tracing::{error, instrument, trace};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Attr, DomParser, Element, Event, Node, SupportedType};

/// Property set on a root node once it has been mounted.
const MOUNTED_PROPERTY: &str = "__setDomMounted";

impl<'m> From<Node> for Replacement<'m, Node> {
	fn from(node: Node) -> Self {
		Replacement::Node(node)
	}
}

/// The browser DOM, accessed through [`web_sys`].
///
/// DOM exceptions thrown by individual mutations are logged and otherwise ignored.
#[derive(Debug, Default)]
pub struct WebTree {
	parser: Option<DomParser>,
}

impl WebTree {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	fn parser(&mut self) -> Result<&DomParser> {
		if self.parser.is_none() {
			self.parser = Some(DomParser::new().map_err(|error| Error::Markup(format!("Could not create DOMParser: {:?}", error)))?);
		}
		self.parser.as_ref().ok_or(Error::MarkupUnsupported)
	}
}

impl Tree for WebTree {
	type Node = Node;
	type Attr = Attr;

	/// Always `true`: a typed [`Node`] handle can't refer to anything else.
	/// Untyped values are checked by [`reconcile_value`] instead.
	fn is_node(&self, _: &Node) -> bool {
		true
	}

	fn kind(&self, node: &Node) -> NodeKind {
		match node.node_type() {
			Node::ELEMENT_NODE => NodeKind::Element,
			Node::TEXT_NODE | Node::CDATA_SECTION_NODE => NodeKind::Text,
			Node::COMMENT_NODE => NodeKind::Comment,
			Node::DOCUMENT_FRAGMENT_NODE => NodeKind::Fragment,
			Node::DOCUMENT_NODE => NodeKind::Document,
			_ => NodeKind::Other,
		}
	}

	fn tag_name(&self, node: &Node) -> Option<TagName> {
		let element = node.dyn_ref::<Element>()?;
		let local_name = element.local_name();
		Some(TagName {
			namespace: element.namespace_uri(),
			name: match element.prefix() {
				Some(prefix) => format!("{}:{}", prefix, local_name),
				None => local_name,
			},
		})
	}

	fn attribute(&self, node: &Node, name: &str) -> Option<String> {
		node.dyn_ref::<Element>()?.get_attribute(name)
	}

	fn attributes(&self, node: &Node) -> Vec<Attr> {
		match node.dyn_ref::<Element>() {
			Some(element) => {
				let attributes = element.attributes();
				(0..attributes.length()).filter_map(|i| attributes.item(i)).collect()
			}
			None => Vec::new(),
		}
	}

	fn attribute_name(&self, attr: &Attr) -> AttrName {
		AttrName {
			namespace: attr.namespace_uri(),
			local_name: attr.local_name(),
		}
	}

	fn attribute_value(&self, attr: &Attr) -> String {
		attr.value()
	}

	fn get_attribute_ns(&self, node: &Node, namespace: Option<&str>, local_name: &str) -> Option<Attr> {
		node.dyn_ref::<Element>()?.attributes().get_named_item_ns(namespace, local_name)
	}

	fn remove_attribute_ns(&mut self, node: &Node, namespace: Option<&str>, local_name: &str) {
		if let Some(element) = node.dyn_ref::<Element>() {
			if let Err(error) = element.remove_attribute_ns(namespace, local_name) {
				error!("Could not remove attribute {:?} (namespace {:?}): {:?}", local_name, namespace, error)
			}
		}
	}

	fn set_attribute_value(&mut self, attr: &Attr, value: &str) {
		attr.set_value(value)
	}

	fn adopt_attribute(&mut self, from: &Node, to: &Node, attr: &Attr) {
		let (from, to) = match (from.dyn_ref::<Element>(), to.dyn_ref::<Element>()) {
			(Some(from), Some(to)) => (from, to),
			_ => return error!("Can only move attributes between elements."),
		};
		let namespace = attr.namespace_uri();
		if let Err(error) = from.attributes().remove_named_item_ns(namespace.as_deref(), &attr.local_name()) {
			return error!("Could not detach attribute {:?}: {:?}", attr.name(), error);
		}
		match to.attributes().set_named_item_ns(attr) {
			Ok(None) => (),
			Ok(Some(replaced)) => error!("Attribute collision. Adopted attribute {:?} replaced {:?}", attr.name(), replaced),
			Err(error) => error!("Could not attach attribute {:?}: {:?}", attr.name(), error),
		}
	}

	fn node_value(&self, node: &Node) -> Option<String> {
		node.node_value()
	}

	fn set_node_value(&mut self, node: &Node, value: &str) {
		node.set_node_value(Some(value))
	}

	fn parent(&self, node: &Node) -> Option<Node> {
		node.parent_node()
	}

	fn first_child(&self, node: &Node) -> Option<Node> {
		node.first_child()
	}

	fn next_sibling(&self, node: &Node) -> Option<Node> {
		node.next_sibling()
	}

	fn document_element(&self, node: &Node) -> Option<Node> {
		node.dyn_ref::<web_sys::Document>()?.document_element().map(Into::into)
	}

	fn insert_before(&mut self, parent: &Node, child: &Node, reference: Option<&Node>) {
		if let Err(error) = parent.insert_before(child, reference) {
			error!("Failed to insert node: {:?}", error)
		}
	}

	fn remove_child(&mut self, parent: &Node, child: &Node) {
		if let Err(error) = parent.remove_child(child) {
			error!("Failed to remove node: {:?}", error)
		}
	}

	fn replace_child(&mut self, parent: &Node, new_child: &Node, old_child: &Node) {
		if let Err(error) = parent.replace_child(new_child, old_child) {
			error!("Failed to replace node: {:?}", error)
		}
	}

	fn shallow_clone(&mut self, element: &Node) -> Node {
		element.clone_node().unwrap_or_else(|error| {
			error!("Failed to clone node: {:?}. Reusing it instead.", error);
			element.clone()
		})
	}

	fn is_mounted(&self, node: &Node) -> bool {
		Reflect::get(node, &JsValue::from_str(MOUNTED_PROPERTY)).map_or(false, |mounted| mounted.as_bool() == Some(true))
	}

	fn set_mounted(&mut self, node: &Node) {
		if let Err(error) = Reflect::set(node, &JsValue::from_str(MOUNTED_PROPERTY), &JsValue::TRUE) {
			error!("Failed to mark node as mounted: {:?}", error)
		}
	}

	/// Parses `markup` as `text/html`, returning either the document element or the first node in `<body>`.
	#[instrument(skip(self, markup))]
	fn parse(&mut self, markup: &str, mode: ParseMode) -> Result<Node> {
		let document = self
			.parser()?
			.parse_from_string(markup, SupportedType::TextHtml)
			.map_err(|error| Error::Markup(format!("{:?}", error)))?;
		let node = match mode {
			ParseMode::Document => document.document_element().map(Into::into),
			ParseMode::Fragment => {
				let body = document.document_element().and_then(|html| {
					let mut child = html.first_element_child();
					while let Some(element) = child {
						if element.local_name() == "body" {
							return Some(element);
						}
						child = element.next_element_sibling();
					}
					None
				});
				body.and_then(|body| body.first_child())
			}
		};
		node.ok_or_else(|| Error::Markup("The markup contains no nodes.".to_string()))
	}
}

/// Dispatches `"mount"`/`"dismount"` [***Event***](https://developer.mozilla.org/en-US/docs/Web/API/Event)s on keyed elements.
#[derive(Debug, Default, Clone, Copy)]
pub struct EventDispatcher;

impl Listener<Node> for EventDispatcher {
	fn notify(&mut self, node: &Node, key: &Key, lifecycle: Lifecycle) {
		let event = match Event::new(lifecycle.as_str()) {
			Ok(event) => event,
			Err(error) => return error!("Failed to create {} event: {:?}", lifecycle, error),
		};
		trace!(%key, %lifecycle, "Dispatching");
		if let Err(error) = node.dispatch_event(&event) {
			error!("Failed to dispatch {} event: {:?}", lifecycle, error)
		}
	}
}

/// Reconciles arbitrary JavaScript values, as received across an FFI boundary.
///
/// `new` may be a string of markup or a node.
///
/// # Errors
///
/// [`Error::InvalidArgument`] if `old_root` (or a non-string `new`) isn't a DOM node, including `null` and `undefined`.
/// Markup errors are passed through from [`WebTree::parse`](`Tree::parse`).
pub fn reconcile_value(old_root: &JsValue, new: &JsValue) -> Result<()> {
	let old_root = old_root.dyn_ref::<Node>().ok_or(Error::InvalidArgument)?;
	let mut tree = WebTree::new();
	let mut listener = EventDispatcher;
	let mut reconciler = Reconciler::new(&mut tree, &mut listener);
	match new.as_string() {
		Some(markup) => reconciler.reconcile(old_root, Replacement::Markup(&markup)),
		None => reconciler.reconcile(old_root, new.dyn_ref::<Node>().ok_or(Error::InvalidArgument)?.clone()),
	}
}
