//! Mount and dismount notifications for keyed elements.

use crate::{markers::Key, markers::Markers, tree::Tree};
use core::fmt::{self, Display, Formatter};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
	/// Delivered after a keyed element entered the tree, parents before children.
	Mount,
	/// Delivered before a keyed element leaves the tree, children before parents.
	Dismount,
}

impl Lifecycle {
	#[must_use]
	pub fn as_str(self) -> &'static str {
		match self {
			Lifecycle::Mount => "mount",
			Lifecycle::Dismount => "dismount",
		}
	}
}

impl Display for Lifecycle {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Receives lifecycle notifications. Only elements with an identity key are delivered.
pub trait Listener<N> {
	fn notify(&mut self, node: &N, key: &Key, lifecycle: Lifecycle);
}

impl<N, F: FnMut(&N, &Key, Lifecycle)> Listener<N> for F {
	fn notify(&mut self, node: &N, key: &Key, lifecycle: Lifecycle) {
		self(node, key, lifecycle)
	}
}

/// Notifies `node` and then its descendants, in document order.
pub(crate) fn mount<T: Tree + ?Sized, L: Listener<T::Node> + ?Sized>(tree: &T, listener: &mut L, markers: Markers<'_>, node: &T::Node) {
	let mut stack = vec![node.clone()];
	while let Some(current) = stack.pop() {
		if let Some(key) = markers.key(tree, &current) {
			trace!(%key, "Mounting");
			listener.notify(&current, &key, Lifecycle::Mount);
		}
		let first = stack.len();
		let mut child = tree.first_child(&current);
		while let Some(next) = child {
			child = tree.next_sibling(&next);
			stack.push(next);
		}
		stack[first..].reverse();
	}
}

/// Notifies the descendants of `node` in document order, each subtree before its root, and `node` last.
pub(crate) fn dismount<T: Tree + ?Sized, L: Listener<T::Node> + ?Sized>(tree: &T, listener: &mut L, markers: Markers<'_>, node: &T::Node) {
	// The flag marks nodes whose children were already pushed.
	let mut stack = vec![(node.clone(), false)];
	while let Some((current, expanded)) = stack.pop() {
		if expanded {
			if let Some(key) = markers.key(tree, &current) {
				trace!(%key, "Dismounting");
				listener.notify(&current, &key, Lifecycle::Dismount);
			}
			continue;
		}

		stack.push((current.clone(), true));
		let first = stack.len();
		let mut child = tree.first_child(&current);
		while let Some(next) = child {
			child = tree.next_sibling(&next);
			stack.push((next, false));
		}
		stack[first..].reverse();
	}
}
