//! In-place reconciliation of a live element tree against a target tree.
//!
//! [`reconcile`] mutates an existing tree until it matches a new one, reusing as much of it as possible:
//! elements are updated rather than recreated, keyed elements keep their identity across reorders,
//! and keyed elements entering or leaving the tree are reported as mounted or dismounted.
//!
//! The tree itself is abstracted by [`Tree`]. See [`arena`] for an in-memory implementation and [`web`] for the browser DOM.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod arena;
pub mod config;
mod diff;
mod error;
pub mod lifecycle;
mod markers;
mod scratch;
pub mod tree;
pub mod web;

pub use crate::{
	config::Config,
	diff::{reconcile, Reconciler, Replacement},
	error::{Error, Result},
	lifecycle::{Lifecycle, Listener},
	markers::{Checksum, Key},
	tree::{AttrName, NodeKind, ParseMode, TagName, Tree},
};
