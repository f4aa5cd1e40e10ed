//! An in-memory node tree.
//!
//! All nodes of an [`ArenaTree`] live in one arena, much like all nodes of a DOM document belong to it,
//! so the old and new trees of a reconciliation are both built in the same [`ArenaTree`].
//! Detached nodes are never freed, which keeps every handed-out [`NodeId`] and [`AttrId`] valid.
//!
//! The node structure itself is an [`indextree::Arena`]. Attribute instances live in a separate arena on top of it.

use crate::{
	diff::Replacement,
	error::Result,
	tree::{AttrName, NodeKind, ParseMode, TagName, Tree},
};
use core::fmt::{self, Display, Formatter};
use indexmap::IndexMap;
use indextree::Arena;
use tracing::error;

mod markup;

pub const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
pub const MATHML_NAMESPACE: &str = "http://www.w3.org/1998/Math/MathML";
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(indextree::NodeId);

impl Display for NodeId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

impl<'m> From<NodeId> for Replacement<'m, NodeId> {
	fn from(node: NodeId) -> Self {
		Replacement::Node(node)
	}
}

/// Identifies one attribute instance. Updating an attribute's value keeps its [`AttrId`], re-creating it doesn't.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttrId(usize);

#[derive(Debug)]
enum Data {
	Element { tag: TagName, attributes: IndexMap<AttrName, AttrId> },
	Text(String),
	Comment(String),
	Fragment,
	Document,
}

#[derive(Debug)]
struct NodeSlot {
	data: Data,
	mounted: bool,
}

#[derive(Debug)]
struct AttrSlot {
	name: AttrName,
	prefix: Option<String>,
	value: String,
}

impl AttrSlot {
	fn qualified_name(&self) -> String {
		match &self.prefix {
			Some(prefix) => format!("{}:{}", prefix, self.name.local_name),
			None => self.name.local_name.clone(),
		}
	}
}

#[derive(Debug, Default)]
pub struct ArenaTree {
	nodes: Arena<NodeSlot>,
	attributes: Vec<AttrSlot>,
}

impl ArenaTree {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	fn push(&mut self, data: Data) -> NodeId {
		NodeId(self.nodes.new_node(NodeSlot { data, mounted: false }))
	}

	fn slot(&self, node: NodeId) -> &NodeSlot {
		self.nodes[node.0].get()
	}

	fn slot_mut(&mut self, node: NodeId) -> &mut NodeSlot {
		self.nodes[node.0].get_mut()
	}

	fn element_attributes(&self, node: NodeId) -> Option<&IndexMap<AttrName, AttrId>> {
		match &self.slot(node).data {
			Data::Element { attributes, .. } => Some(attributes),
			_ => None,
		}
	}

	fn element_attributes_mut(&mut self, node: NodeId) -> Option<&mut IndexMap<AttrName, AttrId>> {
		match &mut self.slot_mut(node).data {
			Data::Element { attributes, .. } => Some(attributes),
			_ => None,
		}
	}

	/// Creates an HTML element. The name is lowercased, as `document.createElement` would in an HTML document.
	pub fn create_element(&mut self, name: &str) -> NodeId {
		self.create_element_ns(Some(XHTML_NAMESPACE), &name.to_ascii_lowercase())
	}

	pub fn create_element_ns(&mut self, namespace: Option<&str>, name: &str) -> NodeId {
		self.push(Data::Element {
			tag: TagName {
				namespace: namespace.map(ToString::to_string),
				name: name.to_string(),
			},
			attributes: IndexMap::new(),
		})
	}

	pub fn create_text(&mut self, text: &str) -> NodeId {
		self.push(Data::Text(text.to_string()))
	}

	pub fn create_comment(&mut self, comment: &str) -> NodeId {
		self.push(Data::Comment(comment.to_string()))
	}

	pub fn create_fragment(&mut self) -> NodeId {
		self.push(Data::Fragment)
	}

	pub fn create_document(&mut self) -> NodeId {
		self.push(Data::Document)
	}

	/// Sets a non-namespaced attribute, updating an existing one in place.
	pub fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) -> Option<AttrId> {
		self.set_attribute_ns(element, None, name, value)
	}

	/// Sets an attribute by namespace and qualified name (`prefix:local` or just `local`), updating an existing one in place.
	///
	/// Returns [`None`] if `element` isn't an element.
	pub fn set_attribute_ns(&mut self, element: NodeId, namespace: Option<&str>, qualified_name: &str, value: &str) -> Option<AttrId> {
		let (prefix, local_name) = match qualified_name.split_once(':') {
			Some((prefix, local_name)) if namespace.is_some() => (Some(prefix.to_string()), local_name),
			_ => (None, qualified_name),
		};
		let name = AttrName::with_namespace(namespace, local_name);

		if let Some(&existing) = self.element_attributes(element)?.get(&name) {
			self.attributes[existing.0].value = value.to_string();
			return Some(existing);
		}

		self.attributes.push(AttrSlot {
			name: name.clone(),
			prefix,
			value: value.to_string(),
		});
		let id = AttrId(self.attributes.len() - 1);
		self.element_attributes_mut(element)?.insert(name, id);
		Some(id)
	}

	/// Non-namespaced attribute value by qualified name.
	#[must_use]
	pub fn get_attribute(&self, element: NodeId, name: &str) -> Option<&str> {
		self.find_attribute(element, name).map(|id| self.attributes[id.0].value.as_str())
	}

	/// The attribute instance currently attached under `name`.
	#[must_use]
	pub fn attribute_id(&self, element: NodeId, name: &str) -> Option<AttrId> {
		self.find_attribute(element, name)
	}

	fn find_attribute(&self, element: NodeId, name: &str) -> Option<AttrId> {
		self.element_attributes(element)?.values().copied().find(|id| self.attributes[id.0].qualified_name() == name)
	}

	#[must_use]
	pub fn text(&self, node: NodeId) -> Option<&str> {
		match &self.slot(node).data {
			Data::Text(text) | Data::Comment(text) => Some(text),
			_ => None,
		}
	}

	/// Replaces `parent`'s children with the nodes parsed from `markup`.
	///
	/// # Errors
	///
	/// Iff the markup can't be parsed.
	pub fn set_inner_html(&mut self, parent: NodeId, markup: &str) -> Result<()> {
		while let Some(child) = self.nodes[parent.0].first_child() {
			child.detach(&mut self.nodes);
		}
		for node in markup::parse_nodes(self, markup)? {
			self.insert_before(&parent, &node, None);
		}
		Ok(())
	}

	#[must_use]
	pub fn outer_html(&self, node: NodeId) -> String {
		let mut html = String::new();
		markup::serialize(self, node, &mut html);
		html
	}

	#[must_use]
	pub fn inner_html(&self, node: NodeId) -> String {
		let mut html = String::new();
		for child in self.children(&node) {
			markup::serialize(self, child, &mut html);
		}
		html
	}

	fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
		node.0.ancestors(&self.nodes).any(|current| current == ancestor.0)
	}
}

impl Tree for ArenaTree {
	type Node = NodeId;
	type Attr = AttrId;

	fn is_node(&self, node: &NodeId) -> bool {
		self.nodes.get(node.0).map_or(false, |node| !node.is_removed())
	}

	fn kind(&self, node: &NodeId) -> NodeKind {
		match self.slot(*node).data {
			Data::Element { .. } => NodeKind::Element,
			Data::Text(_) => NodeKind::Text,
			Data::Comment(_) => NodeKind::Comment,
			Data::Fragment => NodeKind::Fragment,
			Data::Document => NodeKind::Document,
		}
	}

	fn tag_name(&self, node: &NodeId) -> Option<TagName> {
		match &self.slot(*node).data {
			Data::Element { tag, .. } => Some(tag.clone()),
			_ => None,
		}
	}

	fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
		self.get_attribute(*node, name).map(ToString::to_string)
	}

	fn attributes(&self, node: &NodeId) -> Vec<AttrId> {
		self.element_attributes(*node).map(|attributes| attributes.values().copied().collect()).unwrap_or_default()
	}

	fn attribute_name(&self, attr: &AttrId) -> AttrName {
		self.attributes[attr.0].name.clone()
	}

	fn attribute_value(&self, attr: &AttrId) -> String {
		self.attributes[attr.0].value.clone()
	}

	fn get_attribute_ns(&self, node: &NodeId, namespace: Option<&str>, local_name: &str) -> Option<AttrId> {
		self.element_attributes(*node)?.get(&AttrName::with_namespace(namespace, local_name)).copied()
	}

	fn remove_attribute_ns(&mut self, node: &NodeId, namespace: Option<&str>, local_name: &str) {
		if let Some(attributes) = self.element_attributes_mut(*node) {
			attributes.shift_remove(&AttrName::with_namespace(namespace, local_name));
		}
	}

	fn set_attribute_value(&mut self, attr: &AttrId, value: &str) {
		self.attributes[attr.0].value = value.to_string();
	}

	fn adopt_attribute(&mut self, from: &NodeId, to: &NodeId, attr: &AttrId) {
		let name = self.attributes[attr.0].name.clone();
		if let Some(attributes) = self.element_attributes_mut(*from) {
			if attributes.get(&name) == Some(attr) {
				attributes.shift_remove(&name);
			}
		}
		match self.element_attributes_mut(*to) {
			Some(attributes) => {
				attributes.insert(name, *attr);
			}
			None => error!("Can't adopt attribute {:?} onto non-element {}", name, to),
		}
	}

	fn node_value(&self, node: &NodeId) -> Option<String> {
		self.text(*node).map(ToString::to_string)
	}

	fn set_node_value(&mut self, node: &NodeId, value: &str) {
		match &mut self.slot_mut(*node).data {
			Data::Text(text) | Data::Comment(text) => *text = value.to_string(),
			_ => error!("Can't set the value of {}", node),
		}
	}

	fn parent(&self, node: &NodeId) -> Option<NodeId> {
		self.nodes[node.0].parent().map(NodeId)
	}

	fn first_child(&self, node: &NodeId) -> Option<NodeId> {
		self.nodes[node.0].first_child().map(NodeId)
	}

	fn next_sibling(&self, node: &NodeId) -> Option<NodeId> {
		self.nodes[node.0].next_sibling().map(NodeId)
	}

	fn children(&self, node: &NodeId) -> Vec<NodeId> {
		node.0.children(&self.nodes).map(NodeId).collect()
	}

	fn document_element(&self, node: &NodeId) -> Option<NodeId> {
		if !matches!(self.slot(*node).data, Data::Document) {
			return None;
		}
		self.children(node).into_iter().find(|&child| self.kind(&child) == NodeKind::Element)
	}

	fn insert_before(&mut self, parent: &NodeId, child: &NodeId, reference: Option<&NodeId>) {
		let (parent, child) = (*parent, *child);
		if self.is_inclusive_ancestor(child, parent) {
			return error!("Can't insert {} into its own subtree", child);
		}

		let reference = match reference {
			Some(&reference) if reference == child => self.next_sibling(&child),
			Some(&reference) if self.parent(&reference) != Some(parent) => {
				error!("Reference node {} isn't a child of {}. Appending instead.", reference, parent);
				None
			}
			reference => reference.copied(),
		};

		child.0.detach(&mut self.nodes);
		let inserted = match reference {
			Some(reference) => reference.0.checked_insert_before(child.0, &mut self.nodes),
			None => parent.0.checked_append(child.0, &mut self.nodes),
		};
		if let Err(error) = inserted {
			error!("Failed to insert {} into {}: {}", child, parent, error)
		}
	}

	fn remove_child(&mut self, parent: &NodeId, child: &NodeId) {
		if self.parent(child) == Some(*parent) {
			child.0.detach(&mut self.nodes);
		} else {
			error!("Can't remove {} from {}: not a child", child, parent);
		}
	}

	fn replace_child(&mut self, parent: &NodeId, new_child: &NodeId, old_child: &NodeId) {
		if new_child == old_child {
			return;
		}
		if self.parent(old_child) != Some(*parent) {
			return error!("Can't replace {} in {}: not a child", old_child, parent);
		}

		let mut reference = self.next_sibling(old_child);
		if reference == Some(*new_child) {
			reference = self.next_sibling(new_child);
		}
		old_child.0.detach(&mut self.nodes);
		self.insert_before(parent, new_child, reference.as_ref());
	}

	fn shallow_clone(&mut self, element: &NodeId) -> NodeId {
		let tag = match self.tag_name(element) {
			Some(tag) => tag,
			None => {
				error!("Can't shallow-clone non-element {} as element", element);
				TagName::new("")
			}
		};
		let clone = self.create_element_ns(tag.namespace.as_deref(), &tag.name);
		for attr in Tree::attributes(self, element) {
			let AttrSlot { name, prefix, value } = &self.attributes[attr.0];
			let (namespace, qualified_name, value) = (
				name.namespace.clone(),
				match prefix {
					Some(prefix) => format!("{}:{}", prefix, name.local_name),
					None => name.local_name.clone(),
				},
				value.clone(),
			);
			self.set_attribute_ns(clone, namespace.as_deref(), &qualified_name, &value);
		}
		clone
	}

	fn is_mounted(&self, node: &NodeId) -> bool {
		self.slot(*node).mounted
	}

	fn set_mounted(&mut self, node: &NodeId) {
		self.slot_mut(*node).mounted = true;
	}

	fn parse(&mut self, markup: &str, mode: ParseMode) -> Result<NodeId> {
		markup::parse(self, markup, mode)
	}
}
