//! Identity keys, checksums and the ignore flag, as read off elements.

use crate::{
	config::Config,
	tree::{NodeKind, Tree},
};
use core::fmt::{self, Display, Formatter};

/// An element's identity key.
///
/// Keys only ever compare against other keys, so they can't collide with positional matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(String);

impl Key {
	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl Display for Key {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// An element's checksum marker.
///
/// Like a floating point NaN, [`Checksum::Absent`] is unequal to everything including itself,
/// so two elements without checksums are never skipped as "unchanged".
#[derive(Debug, Clone)]
pub enum Checksum {
	Present(String),
	Absent,
}

impl PartialEq for Checksum {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Present(a), Self::Present(b)) => a == b,
			_ => false,
		}
	}
}

/// Reads markers according to one [`Config`] snapshot.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Markers<'a> {
	config: &'a Config,
}

impl<'a> Markers<'a> {
	pub(crate) fn new(config: &'a Config) -> Self {
		Self { config }
	}

	/// The configured key attribute, falling back to `id`. Empty values count as missing.
	pub(crate) fn key<T: Tree + ?Sized>(self, tree: &T, node: &T::Node) -> Option<Key> {
		if tree.kind(node) != NodeKind::Element {
			return None;
		}
		tree.attribute(node, &self.config.key_attribute)
			.filter(|key| !key.is_empty())
			.or_else(|| tree.attribute(node, "id").filter(|id| !id.is_empty()))
			.map(Key)
	}

	pub(crate) fn checksum<T: Tree + ?Sized>(self, tree: &T, node: &T::Node) -> Checksum {
		self.config
			.checksum_attribute
			.as_deref()
			.and_then(|name| tree.attribute(node, name))
			.filter(|checksum| !checksum.is_empty())
			.map_or(Checksum::Absent, Checksum::Present)
	}

	pub(crate) fn ignored<T: Tree + ?Sized>(self, tree: &T, node: &T::Node) -> bool {
		tree.attribute(node, &self.config.ignore_attribute).is_some()
	}
}
