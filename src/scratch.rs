use crate::markers::Key;
use hashbrown::HashMap;

/// Keyed-child lookup for one child list pass: the old child and the slot it was found in.
pub type KeyMap<N> = HashMap<Key, (N, usize)>;

/// Reusable key maps, one per nesting level of child list passes that are in flight.
pub struct KeyMapPool<N>(Vec<KeyMap<N>>);
impl<N> KeyMapPool<N> {
	pub fn new() -> Self {
		Self(Vec::new())
	}

	/// Hands out an empty map, reusing a previous allocation where possible.
	pub fn take(&mut self) -> KeyMap<N> {
		self.0.pop().unwrap_or_default()
	}

	/// Returns a map to the pool. Handles left inside are dropped here so the pool never keeps nodes alive.
	pub fn give_back(&mut self, mut map: KeyMap<N>) {
		map.clear();
		self.0.push(map);
	}

	/// Total capacity of the pooled maps, without counting maps currently handed out.
	pub fn capacity(&self) -> usize {
		self.0.iter().map(HashMap::capacity).sum()
	}
}
