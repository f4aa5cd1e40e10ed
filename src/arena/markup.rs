//! A small, forgiving HTML-ish parser and serializer for [`ArenaTree`].
//!
//! It understands elements, quoted, unquoted and valueless attributes, text, comments,
//! void and self-closing tags, raw text in `<script>`/`<style>`, and common character references.
//! It does not implement the HTML tree construction algorithm.

use super::{ArenaTree, NodeId, MATHML_NAMESPACE, SVG_NAMESPACE, XHTML_NAMESPACE, XLINK_NAMESPACE, XMLNS_NAMESPACE, XML_NAMESPACE};
use crate::{
	error::{Error, Result},
	tree::{NodeKind, ParseMode, Tree},
};
use tracing::{trace, warn};

const VOID_ELEMENTS: &[&str] = &["area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source", "track", "wbr"];
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

pub(super) fn parse(tree: &mut ArenaTree, markup: &str, mode: ParseMode) -> Result<NodeId> {
	let nodes = parse_nodes(tree, markup)?;
	match mode {
		ParseMode::Fragment => nodes.first().copied().ok_or_else(|| Error::Markup("The markup contains no nodes.".to_string())),
		ParseMode::Document => {
			if let Some(&html) = nodes.iter().find(|&&node| tree.tag_name(&node).map_or(false, |tag| tag.is_document_root())) {
				return Ok(html);
			}
			trace!("No <html> element found. Wrapping the markup into a document body.");
			let html = tree.create_element("html");
			let head = tree.create_element("head");
			let body = tree.create_element("body");
			tree.append_child(&html, &head);
			tree.append_child(&html, &body);
			for node in nodes {
				tree.append_child(&body, &node);
			}
			Ok(html)
		}
	}
}

/// Parses `markup` into detached top-level nodes.
pub(super) fn parse_nodes(tree: &mut ArenaTree, markup: &str) -> Result<Vec<NodeId>> {
	let mut parser = Parser { tree, rest: markup, roots: Vec::new(), open: Vec::new() };
	parser.run()?;
	Ok(parser.roots)
}

struct Parser<'t, 'm> {
	tree: &'t mut ArenaTree,
	rest: &'m str,
	roots: Vec<NodeId>,
	/// Open elements with their (lowercased) names.
	open: Vec<(NodeId, String)>,
}

impl<'t, 'm> Parser<'t, 'm> {
	fn run(&mut self) -> Result<()> {
		while !self.rest.is_empty() {
			if let Some(rest) = self.rest.strip_prefix("<!--") {
				let (comment, rest) = rest.split_once("-->").ok_or_else(|| Error::Markup("Unterminated comment.".to_string()))?;
				self.rest = rest;
				let node = self.tree.create_comment(comment);
				self.attach(node);
			} else if self.rest.starts_with("<!") || self.rest.starts_with("<?") {
				let end = self.rest.find('>').ok_or_else(|| Error::Markup("Unterminated declaration.".to_string()))?;
				self.rest = &self.rest[end + 1..];
			} else if let Some(rest) = self.rest.strip_prefix("</") {
				let end = rest.find('>').ok_or_else(|| Error::Markup("Unterminated end tag.".to_string()))?;
				let name = rest[..end].trim().to_ascii_lowercase();
				self.rest = &rest[end + 1..];
				self.close(&name);
			} else if self.rest.starts_with('<') && self.rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
				self.start_tag()?;
			} else {
				let rest = self.rest;
				let first = rest.chars().next().map_or(1, char::len_utf8);
				let end = rest[first..].find('<').map_or(rest.len(), |end| end + first);
				let text = decode_entities(&rest[..end]);
				self.rest = &rest[end..];
				let node = self.tree.create_text(&text);
				self.attach(node);
			}
		}

		if let Some((_, name)) = self.open.last() {
			trace!(%name, "Closing elements left open at end of markup");
		}
		Ok(())
	}

	fn attach(&mut self, node: NodeId) {
		match self.open.last() {
			Some(&(parent, _)) => self.tree.append_child(&parent, &node),
			None => self.roots.push(node),
		}
	}

	fn close(&mut self, name: &str) {
		match self.open.iter().rposition(|(_, open)| open == name) {
			Some(index) => self.open.truncate(index),
			None => warn!(%name, "Ignoring unmatched end tag"),
		}
	}

	fn namespace_for(&self, name: &str) -> &'static str {
		match name {
			"svg" => SVG_NAMESPACE,
			"math" => MATHML_NAMESPACE,
			_ => match self.open.last() {
				Some((parent, parent_name)) if parent_name != "foreignobject" => {
					match self.tree.tag_name(parent).and_then(|tag| tag.namespace) {
						Some(namespace) if namespace == SVG_NAMESPACE => SVG_NAMESPACE,
						Some(namespace) if namespace == MATHML_NAMESPACE => MATHML_NAMESPACE,
						_ => XHTML_NAMESPACE,
					}
				}
				_ => XHTML_NAMESPACE,
			},
		}
	}

	fn start_tag(&mut self) -> Result<()> {
		let rest = self.rest;
		let rest = &rest[1..];
		let name_end = rest.find(|c: char| c.is_whitespace() || c == '/' || c == '>').unwrap_or(rest.len());
		let lowercase_name = rest[..name_end].to_ascii_lowercase();
		let namespace = self.namespace_for(&lowercase_name);
		let element = if namespace == XHTML_NAMESPACE {
			self.tree.create_element(&lowercase_name)
		} else {
			self.tree.create_element_ns(Some(namespace), &rest[..name_end])
		};
		self.rest = &rest[name_end..];

		let self_closing = loop {
			self.rest = self.rest.trim_start();
			if let Some(rest) = self.rest.strip_prefix("/>") {
				self.rest = rest;
				break true;
			}
			if let Some(rest) = self.rest.strip_prefix('>') {
				self.rest = rest;
				break false;
			}
			if let Some(rest) = self.rest.strip_prefix('/') {
				self.rest = rest;
				continue;
			}
			if self.rest.is_empty() {
				return Err(Error::Markup(format!("Unterminated start tag <{}>.", lowercase_name)));
			}
			self.attribute(element, namespace)?;
		};

		self.attach(element);
		if self_closing || VOID_ELEMENTS.contains(&lowercase_name.as_str()) {
			return Ok(());
		}

		if RAW_TEXT_ELEMENTS.contains(&lowercase_name.as_str()) {
			let rest = self.rest;
			let end_tag = format!("</{}", lowercase_name);
			let end = rest.to_ascii_lowercase().find(&end_tag).unwrap_or(rest.len());
			if end > 0 {
				let text = self.tree.create_text(&rest[..end]);
				self.tree.append_child(&element, &text);
			}
			let rest = &rest[end..];
			self.rest = rest.find('>').map_or("", |close| &rest[close + 1..]);
			return Ok(());
		}

		self.open.push((element, lowercase_name));
		Ok(())
	}

	fn attribute(&mut self, element: NodeId, element_namespace: &str) -> Result<()> {
		let name_end = self.rest.find(|c: char| c.is_whitespace() || c == '=' || c == '>' || c == '/').unwrap_or(self.rest.len());
		if name_end == 0 {
			return Err(Error::Markup(format!("Unexpected character in tag: {:?}", self.rest.chars().next())));
		}
		let rest = self.rest;
		let raw_name = &rest[..name_end];
		let name = if element_namespace == XHTML_NAMESPACE { raw_name.to_ascii_lowercase() } else { raw_name.to_string() };
		let rest = rest[name_end..].trim_start();
		self.rest = rest;

		let value = if let Some(rest) = rest.strip_prefix('=') {
			let rest = rest.trim_start();
			let (raw, rest) = match rest.chars().next() {
				Some(quote @ ('"' | '\'')) => {
					let rest = &rest[1..];
					let end = rest.find(quote).ok_or_else(|| Error::Markup(format!("Unterminated value of attribute {:?}.", name)))?;
					(&rest[..end], &rest[end + 1..])
				}
				_ => {
					let end = rest.find(|c: char| c.is_whitespace() || c == '>').unwrap_or(rest.len());
					(&rest[..end], &rest[end..])
				}
			};
			self.rest = rest;
			decode_entities(raw)
		} else {
			String::new()
		};

		let namespace = match name.split_once(':') {
			Some(("xlink", _)) => Some(XLINK_NAMESPACE),
			Some(("xml", _)) => Some(XML_NAMESPACE),
			Some(("xmlns", _)) => Some(XMLNS_NAMESPACE),
			_ if name == "xmlns" => Some(XMLNS_NAMESPACE),
			_ => None,
		};
		if self.tree.get_attribute(element, &name).is_some() {
			trace!(%name, "Ignoring duplicate attribute");
		} else {
			self.tree.set_attribute_ns(element, namespace, &name, &value);
		}
		Ok(())
	}
}

fn decode_entities(text: &str) -> String {
	let mut decoded = String::with_capacity(text.len());
	let mut rest = text;
	while let Some(start) = rest.find('&') {
		decoded.push_str(&rest[..start]);
		rest = &rest[start..];
		let character = rest.find(';').filter(|&end| end <= 10).and_then(|end| {
			let character = match &rest[1..end] {
				"amp" => Some('&'),
				"lt" => Some('<'),
				"gt" => Some('>'),
				"quot" => Some('"'),
				"apos" => Some('\''),
				"nbsp" => Some('\u{a0}'),
				reference => reference
					.strip_prefix("#x")
					.or_else(|| reference.strip_prefix("#X"))
					.map(|hex| u32::from_str_radix(hex, 16))
					.or_else(|| reference.strip_prefix('#').map(str::parse))
					.and_then(core::result::Result::ok)
					.and_then(char::from_u32),
			};
			character.map(|character| (character, end))
		});
		match character {
			Some((character, end)) => {
				decoded.push(character);
				rest = &rest[end + 1..];
			}
			None => {
				decoded.push('&');
				rest = &rest[1..];
			}
		}
	}
	decoded.push_str(rest);
	decoded
}

pub(super) fn serialize(tree: &ArenaTree, node: NodeId, html: &mut String) {
	match tree.kind(&node) {
		NodeKind::Element => {
			let name = tree.tag_name(&node).map(|tag| tag.name).unwrap_or_default();
			html.push('<');
			html.push_str(&name);
			for attr in Tree::attributes(tree, &node) {
				let slot = &tree.attributes[attr.0];
				html.push(' ');
				html.push_str(&slot.qualified_name());
				html.push_str("=\"");
				escape(&slot.value, true, html);
				html.push('"');
			}
			html.push('>');
			let is_html = tree.tag_name(&node).and_then(|tag| tag.namespace).map_or(true, |namespace| namespace == XHTML_NAMESPACE);
			if is_html && VOID_ELEMENTS.contains(&name.as_str()) {
				return;
			}
			let raw = is_html && RAW_TEXT_ELEMENTS.contains(&name.as_str());
			for child in tree.children(&node) {
				match (raw, tree.text(child)) {
					(true, Some(text)) => html.push_str(text),
					_ => serialize(tree, child, html),
				}
			}
			html.push_str("</");
			html.push_str(&name);
			html.push('>');
		}
		NodeKind::Text | NodeKind::Other => escape(tree.text(node).unwrap_or_default(), false, html),
		NodeKind::Comment => {
			html.push_str("<!--");
			html.push_str(tree.text(node).unwrap_or_default());
			html.push_str("-->");
		}
		NodeKind::Fragment | NodeKind::Document => {
			for child in tree.children(&node) {
				serialize(tree, child, html);
			}
		}
	}
}

fn escape(text: &str, attribute: bool, html: &mut String) {
	for character in text.chars() {
		match character {
			'&' => html.push_str("&amp;"),
			'\u{a0}' => html.push_str("&nbsp;"),
			'"' if attribute => html.push_str("&quot;"),
			'<' if !attribute => html.push_str("&lt;"),
			'>' if !attribute => html.push_str("&gt;"),
			character => html.push(character),
		}
	}
}
