//! The mutable tree capability the reconciler operates on.
//!
//! The reconciler never owns nodes. It holds handles for the duration of one call and mutates the tree exclusively through [`Tree`].
//! Two implementations ship with this crate: [`ArenaTree`](`crate::arena::ArenaTree`) and [`WebTree`](`crate::web::WebTree`).

use crate::error::{Error, Result};
use core::fmt::{self, Debug, Display, Formatter};

/// The broad kind of a node. Nodes are only ever diffed in place against nodes of the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
	Element,
	Text,
	Comment,
	Fragment,
	Document,
	/// Any other node with a (possibly empty) value, e.g. a processing instruction.
	Other,
}

/// An element's tag identity: its qualified name plus namespace.
///
/// Two elements are only updated in place if their tag names compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagName {
	pub namespace: Option<String>,
	pub name: String,
}

impl TagName {
	#[must_use]
	pub fn new(name: impl Into<String>) -> Self {
		Self { namespace: None, name: name.into() }
	}

	#[must_use]
	pub fn with_namespace(namespace: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			namespace: Some(namespace.into()),
			name: name.into(),
		}
	}

	/// Whether this tag denotes the root element of a whole document, which switches markup parsing to [`ParseMode::Document`].
	#[must_use]
	pub fn is_document_root(&self) -> bool {
		self.name.eq_ignore_ascii_case("html")
	}
}

impl Display for TagName {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match &self.namespace {
			Some(namespace) => write!(f, "{{{}}}{}", namespace, self.name),
			None => f.write_str(&self.name),
		}
	}
}

/// A namespace-qualified attribute name. Attributes are matched by this pair, never by prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttrName {
	pub namespace: Option<String>,
	pub local_name: String,
}

impl AttrName {
	#[must_use]
	pub fn new(local_name: impl Into<String>) -> Self {
		Self {
			namespace: None,
			local_name: local_name.into(),
		}
	}

	#[must_use]
	pub fn with_namespace(namespace: Option<impl Into<String>>, local_name: impl Into<String>) -> Self {
		Self {
			namespace: namespace.map(Into::into),
			local_name: local_name.into(),
		}
	}
}

/// Selects how [`Tree::parse`] interprets markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
	/// Parse a whole document and return its root element.
	Document,
	/// Parse a fragment and return its first top-level node.
	Fragment,
}

/// Abstract access to an externally owned, mutable node tree.
///
/// Handles are cheap to clone and compare by identity.
/// Structural mutations follow DOM adoption rules: inserting a node that already has a parent detaches it from there first.
///
/// Mutating methods don't return errors. Implementations backed by fallible APIs are expected to log failures and continue.
pub trait Tree {
	type Node: Clone + PartialEq + Debug;
	type Attr: Clone + PartialEq + Debug;

	/// Whether `node` is a live handle into this tree.
	fn is_node(&self, node: &Self::Node) -> bool;

	fn kind(&self, node: &Self::Node) -> NodeKind;

	/// [`None`] for anything that isn't an element.
	fn tag_name(&self, node: &Self::Node) -> Option<TagName>;

	/// Non-namespaced attribute lookup by (qualified) name. [`None`] for non-elements.
	fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

	/// Snapshot of the element's attributes in order. Empty for non-elements.
	fn attributes(&self, node: &Self::Node) -> Vec<Self::Attr>;

	fn attribute_name(&self, attr: &Self::Attr) -> AttrName;

	fn attribute_value(&self, attr: &Self::Attr) -> String;

	fn get_attribute_ns(&self, node: &Self::Node, namespace: Option<&str>, local_name: &str) -> Option<Self::Attr>;

	fn remove_attribute_ns(&mut self, node: &Self::Node, namespace: Option<&str>, local_name: &str);

	/// Changes the value of `attr` without replacing it.
	fn set_attribute_value(&mut self, attr: &Self::Attr, value: &str);

	/// Moves `attr` off `from` and onto `to`, keeping its identity.
	fn adopt_attribute(&mut self, from: &Self::Node, to: &Self::Node, attr: &Self::Attr);

	/// Text, comment and other character data. [`None`] for elements, fragments and documents.
	fn node_value(&self, node: &Self::Node) -> Option<String>;

	fn set_node_value(&mut self, node: &Self::Node, value: &str);

	fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

	fn first_child(&self, node: &Self::Node) -> Option<Self::Node>;

	fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

	/// The root element of a document node.
	fn document_element(&self, node: &Self::Node) -> Option<Self::Node>;

	/// Inserts `child` before `reference`, or appends it if `reference` is [`None`].
	fn insert_before(&mut self, parent: &Self::Node, child: &Self::Node, reference: Option<&Self::Node>);

	fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node);

	fn replace_child(&mut self, parent: &Self::Node, new_child: &Self::Node, old_child: &Self::Node);

	/// Creates a childless element with `element`'s tag name and copies of its attributes.
	fn shallow_clone(&mut self, element: &Self::Node) -> Self::Node;

	fn is_mounted(&self, node: &Self::Node) -> bool;

	fn set_mounted(&mut self, node: &Self::Node);

	/// Parses `markup` into a detached node.
	///
	/// # Errors
	///
	/// The default implementation always returns [`Error::MarkupUnsupported`].
	fn parse(&mut self, markup: &str, mode: ParseMode) -> Result<Self::Node> {
		let _ = (markup, mode);
		Err(Error::MarkupUnsupported)
	}

	fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) {
		self.insert_before(parent, child, None);
	}

	/// Collects `node`'s children in order.
	fn children(&self, node: &Self::Node) -> Vec<Self::Node> {
		let mut children = Vec::new();
		let mut child = self.first_child(node);
		while let Some(current) = child {
			child = self.next_sibling(&current);
			children.push(current);
		}
		children
	}
}
