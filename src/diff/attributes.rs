use super::Pass;
use crate::{
	lifecycle::Listener,
	tree::{AttrName, Tree},
};
use tracing::trace;

impl<'p, T: Tree + ?Sized, L: Listener<T::Node> + ?Sized> Pass<'p, T, L> {
	/// Aligns `old`'s attributes with `new`'s by namespace and local name.
	///
	/// Attributes missing on `old` are moved over from `new`.
	/// Attributes present on both sides keep their identity on `old` and only have their value overwritten.
	pub(super) fn diff_attributes(&mut self, old: &T::Node, new: &T::Node) {
		for attribute in self.tree.attributes(old) {
			let AttrName { namespace, local_name } = self.tree.attribute_name(&attribute);
			if self.tree.get_attribute_ns(new, namespace.as_deref(), &local_name).is_none() {
				trace!(?namespace, %local_name, "Removing attribute");
				self.tree.remove_attribute_ns(old, namespace.as_deref(), &local_name);
			}
		}

		for attribute in self.tree.attributes(new) {
			let AttrName { namespace, local_name } = self.tree.attribute_name(&attribute);
			match self.tree.get_attribute_ns(old, namespace.as_deref(), &local_name) {
				None => {
					trace!(?namespace, %local_name, "Adopting attribute");
					self.tree.adopt_attribute(new, old, &attribute);
				}
				Some(existing) => {
					let value = self.tree.attribute_value(&attribute);
					if self.tree.attribute_value(&existing) != value {
						if cfg!(feature = "dangerous-logging") {
							trace!(?namespace, %local_name, %value, "Updating attribute");
						} else {
							trace!(?namespace, %local_name, "Updating attribute");
						}
						self.tree.set_attribute_value(&existing, &value);
					}
				}
			}
		}
	}
}
