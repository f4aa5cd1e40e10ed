/// Errors surfaced by [`reconcile`](`crate::reconcile()`).
///
/// Only [`Error::InvalidArgument`] is raised by the reconciler itself, and always before the tree is touched.
/// The remaining variants are reported by a [`Tree`](`crate::tree::Tree`)'s markup parser.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error("set-dom: You must provide a valid node to update.")]
	InvalidArgument,

	#[error("set-dom: This tree implementation can't parse markup.")]
	MarkupUnsupported,

	#[error("set-dom: Failed to parse markup: {0}")]
	Markup(String),
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
