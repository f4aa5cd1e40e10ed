//! Attribute names the reconciler looks for, and recursion bounds.
//!
//! A [`Reconciler`](`crate::Reconciler`) snapshots its [`Config`] once when it's created,
//! so changing the process-wide defaults never affects a pass that is already running.

use std::{
	borrow::Cow,
	sync::{PoisonError, RwLock},
};
use tracing::debug;

static GLOBAL: RwLock<Config> = RwLock::new(Config::DEFAULT);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
	/// Attribute holding an element's identity key. The `id` attribute is the fallback.
	pub key_attribute: Cow<'static, str>,
	/// Elements carrying this attribute (with any value) on both sides are left untouched.
	pub ignore_attribute: Cow<'static, str>,
	/// Elements with equal values for this attribute on both sides are skipped.
	/// [`None`] disables checksum skipping.
	pub checksum_attribute: Option<Cow<'static, str>>,
	/// Maximum element nesting the differ descends into.
	pub depth_limit: usize,
}

impl Config {
	pub const DEFAULT: Self = Self {
		key_attribute: Cow::Borrowed("data-key"),
		ignore_attribute: Cow::Borrowed("data-ignore"),
		checksum_attribute: Some(Cow::Borrowed("data-checksum")),
		depth_limit: 2048,
	};

	/// A copy of the current process-wide configuration.
	#[must_use]
	pub fn global() -> Self {
		GLOBAL.read().unwrap_or_else(PoisonError::into_inner).clone()
	}

	/// Replaces the process-wide configuration for all [`Reconciler`](`crate::Reconciler`)s created afterwards.
	pub fn set_global(config: Self) {
		debug!(?config, "Replacing global configuration");
		*GLOBAL.write().unwrap_or_else(PoisonError::into_inner) = config;
	}

	#[must_use]
	pub fn key_attribute(mut self, name: impl Into<Cow<'static, str>>) -> Self {
		self.key_attribute = name.into();
		self
	}

	#[must_use]
	pub fn ignore_attribute(mut self, name: impl Into<Cow<'static, str>>) -> Self {
		self.ignore_attribute = name.into();
		self
	}

	#[must_use]
	pub fn checksum_attribute(mut self, name: impl Into<Cow<'static, str>>) -> Self {
		self.checksum_attribute = Some(name.into());
		self
	}

	#[must_use]
	pub fn without_checksum(mut self) -> Self {
		self.checksum_attribute = None;
		self
	}

	#[must_use]
	pub fn depth_limit(mut self, depth_limit: usize) -> Self {
		self.depth_limit = depth_limit;
		self
	}
}

impl Default for Config {
	fn default() -> Self {
		Self::DEFAULT
	}
}
