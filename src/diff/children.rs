use super::{Pass, Task};
use crate::{
	lifecycle::{self, Listener},
	scratch::KeyMap,
	tree::Tree,
};
use tracing::{trace, warn};

/// A child list alignment in progress.
///
/// Keyed children are matched by key wherever they are, and moved into place.
/// Unkeyed children are matched by position, but never against a keyed old child.
/// New children without a counterpart are adopted and mounted, and leftover old children are dismounted and removed.
pub(super) struct ChildList<N> {
	old_parent: N,
	keyed: KeyMap<N>,
	/// The old child the next new child is aligned against. Everything from here on is unconsumed.
	cursor: Option<N>,
	new_child: Option<N>,
	depth_limit: usize,
	slot: usize,
	consumed: usize,
	old_len: usize,
}

impl<'p, T: Tree + ?Sized, L: Listener<T::Node> + ?Sized> Pass<'p, T, L> {
	pub(super) fn begin_children(&mut self, old_parent: &T::Node, new_parent: &T::Node, depth_limit: usize) -> ChildList<T::Node> {
		let markers = self.markers;
		let mut keyed = self.key_maps.take();

		let mut old_len = 0_usize;
		let mut old_child = self.tree.first_child(old_parent);
		while let Some(child) = old_child {
			old_child = self.tree.next_sibling(&child);
			if let Some(key) = markers.key(&*self.tree, &child) {
				if let Some((_, shadowed)) = keyed.insert(key, (child, old_len)) {
					warn!(shadowed, slot = old_len, "Duplicate key among old children. The earlier one will be removed.");
				}
			}
			old_len += 1;
		}

		ChildList {
			old_parent: old_parent.clone(),
			keyed,
			cursor: self.tree.first_child(old_parent),
			new_child: self.tree.first_child(new_parent),
			depth_limit,
			slot: 0,
			consumed: 0,
			old_len,
		}
	}

	/// Advances `list` up to the next pair of children that needs diffing and schedules that pair ahead of the rest of the list.
	/// Finishes the list once all new children are placed.
	pub(super) fn align_children(&mut self, mut list: ChildList<T::Node>, tasks: &mut Vec<Task<T::Node>>) {
		let markers = self.markers;
		while let Some(next) = list.new_child.take() {
			list.new_child = self.tree.next_sibling(&next);
			let slot = list.slot;
			list.slot += 1;

			let matched = if list.keyed.is_empty() {
				None
			} else {
				markers.key(&*self.tree, &next).and_then(|key| list.keyed.remove(&key))
			};

			let pair = if let Some((found, old_slot)) = matched {
				if list.cursor.as_ref() == Some(&found) {
					list.cursor = self.tree.next_sibling(&found);
				} else {
					trace!(old_slot, slot, "Moving keyed child");
					self.tree.insert_before(&list.old_parent, &found, list.cursor.as_ref());
				}
				found
			} else if let Some(current) = list.cursor.clone().filter(|current| markers.key(&*self.tree, current).is_none()) {
				list.cursor = self.tree.next_sibling(&current);
				current
			} else {
				trace!(slot, "Inserting new child");
				self.tree.insert_before(&list.old_parent, &next, list.cursor.as_ref());
				lifecycle::mount(&*self.tree, &mut *self.listener, markers, &next);
				continue;
			};

			list.consumed += 1;
			let depth_limit = list.depth_limit;
			tasks.push(Task::Children(list));
			tasks.push(Task::Node { old: pair, new: next, depth_limit });
			return;
		}

		self.finish_children(list);
	}

	/// Dismounts and removes the old children left from the cursor on, last to first.
	fn finish_children(&mut self, list: ChildList<T::Node>) {
		let ChildList {
			old_parent,
			keyed,
			mut cursor,
			slot,
			consumed,
			old_len,
			..
		} = list;
		self.key_maps.give_back(keyed);

		let mut leftover = Vec::new();
		while let Some(current) = cursor {
			cursor = self.tree.next_sibling(&current);
			leftover.push(current);
		}

		let removed = leftover.len();
		for (offset, current) in leftover.into_iter().enumerate().rev() {
			trace!(slot = slot + offset, "Removing old child");
			lifecycle::dismount(&*self.tree, &mut *self.listener, self.markers, &current);
			self.tree.remove_child(&old_parent, &current);
		}

		debug_assert_eq!(consumed + removed, old_len, "Old children were neither kept nor removed");
	}
}
