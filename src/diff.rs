use crate::{
	config::Config,
	error::{Error, Result},
	lifecycle::{self, Listener},
	markers::Markers,
	scratch::KeyMapPool,
	tree::{NodeKind, ParseMode, Tree},
};
use tracing::{error, info, instrument, level_filters::STATIC_MAX_LEVEL, trace, trace_span, warn, Level};

mod attributes;
mod children;

use children::ChildList;

/// The target state for a [`Reconciler::reconcile`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum Replacement<'m, N> {
	/// A detached node (tree) that is adopted piecemeal into the old tree.
	/// It must not be reused afterwards.
	Node(N),
	/// Markup, parsed through [`Tree::parse`].
	Markup(&'m str),
}

impl<'m, N> From<&'m str> for Replacement<'m, N> {
	fn from(markup: &'m str) -> Self {
		Self::Markup(markup)
	}
}

impl<'m, N> From<&'m String> for Replacement<'m, N> {
	fn from(markup: &'m String) -> Self {
		Self::Markup(markup)
	}
}

/// Updates an existing tree in place to match another one.
///
/// Kept elements, including reordered ones with matching identity keys, keep their identity
/// (and with it any state attached to them), while nodes that enter or leave the tree are reported to a [`Listener`].
///
/// # Correct Use
///
/// Neither tree may be modified by anything else while [`Reconciler::reconcile`] runs.
/// Changes become visible to other observers of the tree as they happen, not atomically.
pub struct Reconciler<'a, T: Tree + ?Sized, L: Listener<T::Node> + ?Sized> {
	tree: &'a mut T,
	listener: &'a mut L,
	config: Config,
	key_maps: KeyMapPool<T::Node>,
}

impl<'a, T: Tree + ?Sized, L: Listener<T::Node> + ?Sized> Reconciler<'a, T, L> {
	/// Creates a reconciler using a snapshot of [`Config::global()`].
	#[must_use]
	pub fn new(tree: &'a mut T, listener: &'a mut L) -> Self {
		Self {
			tree,
			listener,
			config: Config::global(),
			key_maps: KeyMapPool::new(),
		}
	}

	#[must_use]
	pub fn with_config(mut self, config: Config) -> Self {
		self.config = config;
		self
	}

	#[must_use]
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Mutates `old_root`'s subtree to match `new`.
	///
	/// A document node is resolved to its root element first.
	/// Markup is parsed as a whole document if the (resolved) root is an `html` element, otherwise as a fragment.
	///
	/// The first successful call for a given root also notifies mounting of that root and all its keyed descendants.
	///
	/// # Errors
	///
	/// - [`Error::InvalidArgument`] if `old_root` (or a given replacement node) isn't a node of this tree,
	/// - errors from [`Tree::parse`] if markup is given.
	///
	/// Either way the tree is left untouched.
	#[instrument(skip(self, new))]
	pub fn reconcile<'m>(&mut self, old_root: &T::Node, new: impl Into<Replacement<'m, T::Node>>) -> Result<()> {
		if !self.tree.is_node(old_root) {
			return Err(Error::InvalidArgument);
		}

		let old_root = match self.tree.kind(old_root) {
			NodeKind::Document => self.tree.document_element(old_root).ok_or(Error::InvalidArgument)?,
			_ => old_root.clone(),
		};

		let new_root = match new.into() {
			Replacement::Node(node) => {
				if !self.tree.is_node(&node) {
					return Err(Error::InvalidArgument);
				}
				node
			}
			Replacement::Markup(markup) => {
				let mode = match self.tree.tag_name(&old_root) {
					Some(tag) if tag.is_document_root() => ParseMode::Document,
					_ => ParseMode::Fragment,
				};
				trace!(?mode, "Parsing markup");
				self.tree.parse(markup, mode)?
			}
		};

		let mut pass = Pass {
			tree: &mut *self.tree,
			listener: &mut *self.listener,
			markers: Markers::new(&self.config),
			key_maps: &mut self.key_maps,
		};
		pass.run(&old_root, &new_root, self.config.depth_limit);

		if !self.tree.is_mounted(&old_root) {
			let span = trace_span!("Initial mount");
			let _enter = span.enter();
			self.tree.set_mounted(&old_root);
			lifecycle::mount(&*self.tree, &mut *self.listener, Markers::new(&self.config), &old_root);
		}

		info!("Diff heap capacity (key maps): {}", self.key_maps.capacity());
		if STATIC_MAX_LEVEL >= Level::WARN && self.key_maps.capacity() >= 4096 {
			warn!(
				"The key map heap capacity is large ({}).\n\
				This may point to very long keyed child lists.",
				self.key_maps.capacity()
			)
		}
		Ok(())
	}
}

/// Reconciles `old_root` against `new` with the process-wide [`Config`].
///
/// See [`Reconciler::reconcile`].
///
/// # Errors
///
/// See [`Reconciler::reconcile`].
pub fn reconcile<'m, T: Tree + ?Sized, L: Listener<T::Node> + ?Sized>(tree: &mut T, listener: &mut L, old_root: &T::Node, new: impl Into<Replacement<'m, T::Node>>) -> Result<()> {
	Reconciler::new(tree, listener).reconcile(old_root, new)
}

/// State of one reconciliation call, split off [`Reconciler`] so the markers can be read while the tree is mutated.
struct Pass<'p, T: Tree + ?Sized, L: ?Sized> {
	tree: &'p mut T,
	listener: &'p mut L,
	markers: Markers<'p>,
	key_maps: &'p mut KeyMapPool<T::Node>,
}

/// Pending work of a [`Pass`]. The differ runs off an explicit stack of these, so nesting depth is bounded by
/// the configured depth limit alone and never by the native stack.
enum Task<N> {
	Node { old: N, new: N, depth_limit: usize },
	/// A partially aligned child list, resumed after the pair it handed out was diffed.
	Children(ChildList<N>),
	/// Attribute sync or retagging, once the element's children are done.
	FinishElement { old: N, new: N },
}

impl<'p, T: Tree + ?Sized, L: Listener<T::Node> + ?Sized> Pass<'p, T, L> {
	fn run(&mut self, old: &T::Node, new: &T::Node, depth_limit: usize) {
		let mut tasks = vec![Task::Node {
			old: old.clone(),
			new: new.clone(),
			depth_limit,
		}];
		while let Some(task) = tasks.pop() {
			match task {
				Task::Node { old, new, depth_limit } => self.diff_node(&old, &new, depth_limit, &mut tasks),
				Task::Children(list) => self.align_children(list, &mut tasks),
				Task::FinishElement { old, new } => self.finish_element(&old, &new),
			}
		}
	}

	#[instrument(level = "trace", skip(self, tasks))]
	fn diff_node(&mut self, old: &T::Node, new: &T::Node, depth_limit: usize, tasks: &mut Vec<Task<T::Node>>) {
		if depth_limit == 0 {
			return error!("Depth limit reached");
		}

		let (old_kind, new_kind) = (self.tree.kind(old), self.tree.kind(new));
		if old_kind != new_kind {
			let span = trace_span!("Replace mismatching", ?old_kind, ?new_kind);
			let _enter = span.enter();
			return self.replace(old, new);
		}

		match old_kind {
			NodeKind::Element => self.diff_element(old, new, depth_limit, tasks),
			NodeKind::Fragment | NodeKind::Document => {
				trace!(kind = ?old_kind, "Diffing fragment");
				let list = self.begin_children(old, new, depth_limit - 1);
				tasks.push(Task::Children(list));
			}
			NodeKind::Text | NodeKind::Comment | NodeKind::Other => {
				let value = self.tree.node_value(new).unwrap_or_default();
				if self.tree.node_value(old).as_deref() != Some(value.as_str()) {
					if cfg!(feature = "dangerous-logging") {
						trace!(kind = ?old_kind, ?value, "Updating node value");
					} else {
						trace!(kind = ?old_kind, "Updating node value");
					}
					self.tree.set_node_value(old, &value)
				}
			}
		}
	}

	fn diff_element(&mut self, old: &T::Node, new: &T::Node, depth_limit: usize, tasks: &mut Vec<Task<T::Node>>) {
		let markers = self.markers;
		let tree = &*self.tree;

		if markers.checksum(tree, old) == markers.checksum(tree, new) {
			return trace!("Checksums match. Skipping element.");
		}
		if markers.ignored(tree, old) && markers.ignored(tree, new) {
			return trace!("Both elements are ignored. Skipping element.");
		}

		trace!(tag = ?tree.tag_name(old), "Diffing element");
		tasks.push(Task::FinishElement { old: old.clone(), new: new.clone() });
		let list = self.begin_children(old, new, depth_limit - 1);
		tasks.push(Task::Children(list));
	}

	fn finish_element(&mut self, old: &T::Node, new: &T::Node) {
		let (old_tag, new_tag) = (self.tree.tag_name(old), self.tree.tag_name(new));
		if old_tag == new_tag {
			self.diff_attributes(old, new)
		} else {
			self.retag(old, new, old_tag.as_ref().map(ToString::to_string), new_tag.as_ref().map(ToString::to_string))
		}
	}
	/// Swaps `old` for a shallow copy of `new`, carrying over `old`'s (already diffed) children.
	///
	/// `old`'s own attributes and anything else attached to it are discarded.
	fn retag(&mut self, old: &T::Node, new: &T::Node, old_tag: Option<String>, new_tag: Option<String>) {
		let span = trace_span!("Retagging element", ?old_tag, ?new_tag);
		let _enter = span.enter();

		if STATIC_MAX_LEVEL >= Level::WARN {
			if let (Some(old_tag), Some(new_tag)) = (&old_tag, &new_tag) {
				if old_tag.eq_ignore_ascii_case(new_tag) {
					warn!(
						"Recreating element due to different tag name casing: {:?} -> {:?}\n\
						Children are kept, but the element itself loses its identity.",
						old_tag, new_tag
					)
				}
			}
		}

		let parent = match self.tree.parent(old) {
			Some(parent) => parent,
			None => {
				error!("Can't replace an element without parent node. Updating its attributes only.");
				return self.diff_attributes(old, new);
			}
		};

		let replacement = self.tree.shallow_clone(new);
		while let Some(child) = self.tree.first_child(old) {
			self.tree.append_child(&replacement, &child);
		}
		self.tree.replace_child(&parent, &replacement, old);
	}

	/// Swaps `old` for `new` itself, notifying both subtrees.
	fn replace(&mut self, old: &T::Node, new: &T::Node) {
		let parent = match self.tree.parent(old) {
			Some(parent) => parent,
			None => return error!("Can't replace a node without parent node. Leaving it as-is."),
		};

		lifecycle::dismount(&*self.tree, &mut *self.listener, self.markers, old);
		self.tree.replace_child(&parent, new, old);
		lifecycle::mount(&*self.tree, &mut *self.listener, self.markers, new);
	}
}
