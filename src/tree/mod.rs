//! Skill tree data model and the flat-rows-to-hierarchy builder.

use std::collections::{HashMap, HashSet, VecDeque};

use log::{info, warn};
use serde::{Deserialize, Serialize};

mod context;
mod source;

pub use context::{SkillTreeProvider, SkillTreeState, use_skill_tree};
pub use source::{LayoutOverrides, TREE_DATA_ELEMENT, TreeError, TreePayload, parse_payload};

/// A position override, either absolute pixels or a fraction of the viewport.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pin {
	pub x: f64,
	pub y: f64,
	pub relative: bool,
}

impl Pin {
	/// Absolute coordinate of this pin inside a `width` x `height` viewport.
	pub fn resolve(&self, width: f64, height: f64) -> (f64, f64) {
		if self.relative {
			(self.x * width, self.y * height)
		} else {
			(self.x, self.y)
		}
	}

	/// Relative pin for an absolute position, rounded to three decimals.
	pub fn normalized(x: f64, y: f64, width: f64, height: f64) -> Self {
		let round3 = |v: f64| (v * 1000.0).round() / 1000.0;
		Self {
			x: round3(x / width),
			y: round3(y / height),
			relative: true,
		}
	}
}

/// One record of the backing store. `slug` is empty for the root.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillNodeRow {
	pub id: String,
	pub slug: String,
	pub parent_slug: Option<String>,
	pub name: String,
	pub size: f64,
	pub fixed: bool,
	pub logo: Option<String>,
	pub pin: Option<Pin>,
	pub content: Option<serde_json::Value>,
	pub updated_at: Option<String>,
	pub description: Option<String>,
}

impl SkillNodeRow {
	/// Only a null parent makes a root; `""` names the root's own slug.
	fn is_root(&self) -> bool {
		self.parent_slug.is_none()
	}
}

/// A node of the skill tree. Children are in sibling display order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SkillNode {
	pub id: String,
	pub name: String,
	pub slug: Option<String>,
	pub size: f64,
	pub fixed: bool,
	pub pin: Option<Pin>,
	pub children: Vec<SkillNode>,
	pub logo: Option<String>,
	pub description: Option<String>,
	pub content: Option<serde_json::Value>,
}

impl SkillNode {
	fn from_row(row: &SkillNodeRow) -> Self {
		Self {
			id: row.id.clone(),
			name: row.name.clone(),
			slug: Some(row.slug.clone()),
			size: row.size,
			fixed: row.fixed,
			pin: row.pin,
			children: Vec::new(),
			logo: row.logo.clone(),
			description: row.description.clone(),
			content: row.content.clone(),
		}
	}

	/// The size hint, or `None` when absent (zero, negative or not finite).
	pub fn size_hint(&self) -> Option<f64> {
		(self.size.is_finite() && self.size > 0.0).then_some(self.size)
	}

	/// Non-empty slug, if any.
	pub fn path_slug(&self) -> Option<&str> {
		self.slug.as_deref().filter(|s| !s.is_empty())
	}

	/// Breadth-first iterator over this node and everything below it.
	pub fn descendants(&self) -> Descendants<'_> {
		Descendants {
			queue: VecDeque::from([self]),
		}
	}

	pub fn node_count(&self) -> usize {
		self.descendants().count()
	}

	/// Resolves a slash-separated slug path, starting at this node.
	///
	/// An empty path (after trimming whitespace and slashes) is this node.
	/// Full slugs are matched first; otherwise the path is walked one segment
	/// per level, comparing each child's slug or its last path segment.
	pub fn node_by_path(&self, path: &str) -> Option<&SkillNode> {
		let key = normalize_path(path);
		if key.is_empty() {
			return Some(self);
		}
		if let Some(found) = self.descendants().find(|n| n.path_slug() == Some(key)) {
			return Some(found);
		}

		let mut current = self;
		for segment in key.split('/').filter(|s| !s.is_empty()) {
			current = current.children.iter().find(|child| {
				child
					.path_slug()
					.is_some_and(|slug| slug == segment || last_segment(slug) == segment)
			})?;
		}
		Some(current)
	}
}

/// Breadth-first traversal, see [`SkillNode::descendants`].
pub struct Descendants<'a> {
	queue: VecDeque<&'a SkillNode>,
}

impl<'a> Iterator for Descendants<'a> {
	type Item = &'a SkillNode;

	fn next(&mut self) -> Option<Self::Item> {
		let node = self.queue.pop_front()?;
		self.queue.extend(node.children.iter());
		Some(node)
	}
}

fn normalize_path(path: &str) -> &str {
	path.trim().trim_matches('/')
}

fn last_segment(slug: &str) -> &str {
	slug.rsplit('/').next().unwrap_or(slug)
}

/// Builds the tree from flat rows.
///
/// Returns `None` when no row is a root. Rows whose parent does not exist are
/// dropped. When several rows share a slug the last one is kept.
pub fn build_tree(rows: &[SkillNodeRow]) -> Option<SkillNode> {
	let mut by_slug: HashMap<&str, usize> = HashMap::with_capacity(rows.len());
	for (i, row) in rows.iter().enumerate() {
		by_slug.insert(row.slug.as_str(), i);
	}
	let canonical = |i: usize| by_slug.get(rows[i].slug.as_str()) == Some(&i);

	let mut roots = (0..rows.len()).filter(|&i| canonical(i) && rows[i].is_root());
	let Some(root) = roots.next() else {
		warn!("skill tree: no root row among {} rows", rows.len());
		return None;
	};
	let extra_roots = roots.count();
	if extra_roots > 0 {
		warn!("skill tree: ignoring {extra_roots} additional root rows");
	}

	let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
	for (i, row) in rows.iter().enumerate() {
		if !canonical(i) || row.is_root() {
			continue;
		}
		let parent = row.parent_slug.as_deref().and_then(|p| by_slug.get(p));
		if let Some(&parent) = parent {
			children.entry(parent).or_default().push(i);
		}
	}

	let mut visited = HashSet::new();
	let tree = assemble(root, rows, &children, &mut visited);

	let orphans = rows.len() - visited.len();
	if orphans > 0 {
		warn!("skill tree: {orphans} rows are not reachable from the root");
	}
	info!("skill tree: built {} nodes", visited.len());
	Some(tree)
}

fn assemble(
	index: usize,
	rows: &[SkillNodeRow],
	children: &HashMap<usize, Vec<usize>>,
	visited: &mut HashSet<usize>,
) -> SkillNode {
	visited.insert(index);
	let mut node = SkillNode::from_row(&rows[index]);
	for &child in children.get(&index).into_iter().flatten() {
		if visited.contains(&child) {
			continue;
		}
		let built = assemble(child, rows, children, visited);
		node.children.push(built);
	}
	node
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;

	pub(crate) fn row(slug: &str, parent: Option<&str>) -> SkillNodeRow {
		SkillNodeRow {
			id: format!("id-{slug}"),
			slug: slug.into(),
			parent_slug: parent.map(Into::into),
			name: if slug.is_empty() { "Root".into() } else { slug.to_uppercase() },
			size: 20.0,
			..Default::default()
		}
	}

	#[test]
	fn root_without_children() {
		let tree = build_tree(&[row("", None)]).unwrap();
		assert!(tree.children.is_empty());
		assert_eq!(tree.node_count(), 1);
	}

	#[test]
	fn no_root_is_none() {
		assert!(build_tree(&[row("a", Some("")), row("b", Some("a"))]).is_none());
		assert!(build_tree(&[]).is_none());
	}

	#[test]
	fn orphans_are_excluded() {
		let rows = [
			row("", None),
			row("art", Some("")),
			row("code", Some("")),
			row("art/ink", Some("art")),
			row("lost", Some("missing")),
			row("lost/child", Some("lost")),
		];
		let tree = build_tree(&rows).unwrap();
		assert_eq!(tree.node_count(), 4);
		let names: Vec<_> = tree.descendants().map(|n| n.name.as_str()).collect();
		assert_eq!(names, ["Root", "ART", "CODE", "ART/INK"]);
	}

	#[test]
	fn empty_parent_string_refers_to_root_slug() {
		let rows = [row("a", Some("")), row("", None), row("b", Some(""))];
		let tree = build_tree(&rows).unwrap();
		assert_eq!(tree.slug.as_deref(), Some(""));
		let slugs: Vec<_> = tree.children.iter().filter_map(|c| c.path_slug()).collect();
		assert_eq!(slugs, ["a", "b"]);
	}

	#[test]
	fn embedded_payload_keeps_every_row() {
		let html = include_str!("../../index.html");
		let start = html.find("<script id=\"skill-tree-data\"").unwrap();
		let body = &html[start..];
		let json = &body[body.find('>').unwrap() + 1..body.find("</script>").unwrap()];
		let payload = parse_payload(json).unwrap();
		let tree = build_tree(&payload.rows).unwrap();
		assert_eq!(tree.node_count(), payload.rows.len());
		assert_eq!(tree.node_by_path("hobbies/art").map(|n| n.name.as_str()), Some("Art"));
	}

	#[test]
	fn sibling_order_follows_rows() {
		let rows = [
			row("", None),
			row("z", Some("")),
			row("a", Some("")),
			row("m", Some("")),
		];
		let tree = build_tree(&rows).unwrap();
		let order: Vec<_> = tree.children.iter().filter_map(|c| c.path_slug()).collect();
		assert_eq!(order, ["z", "a", "m"]);
	}

	#[test]
	fn self_parent_does_not_loop() {
		let rows = [row("", None), row("a", Some("")), row("b", Some("b"))];
		let tree = build_tree(&rows).unwrap();
		assert_eq!(tree.node_count(), 2);
	}

	#[test]
	fn path_lookup() {
		let rows = [
			row("", None),
			row("hobbies", Some("")),
			row("hobbies/art", Some("hobbies")),
			row("code", Some("")),
			row("rust", Some("code")),
		];
		let tree = build_tree(&rows).unwrap();
		assert_eq!(tree.node_by_path("").map(|n| n.name.as_str()), Some("Root"));
		assert_eq!(tree.node_by_path("/hobbies/art/").map(|n| n.id.as_str()), Some("id-hobbies/art"));
		assert_eq!(tree.node_by_path("code/rust").map(|n| n.id.as_str()), Some("id-rust"));
		assert_eq!(tree.node_by_path("  rust ").map(|n| n.id.as_str()), Some("id-rust"));
		assert!(tree.node_by_path("code/python").is_none());
	}

	#[test]
	fn pin_resolution() {
		let pin = Pin { x: 0.5, y: 0.5, relative: true };
		assert_eq!(pin.resolve(800.0, 600.0), (400.0, 300.0));
		let abs = Pin { x: 12.0, y: 34.0, relative: false };
		assert_eq!(abs.resolve(800.0, 600.0), (12.0, 34.0));
		assert_eq!(Pin::normalized(200.0, 100.0, 800.0, 300.0), Pin { x: 0.25, y: 0.333, relative: true });
	}

	#[test]
	fn size_hint_defaults() {
		let mut node = SkillNode { size: 0.0, ..Default::default() };
		assert_eq!(node.size_hint(), None);
		node.size = 14.0;
		assert_eq!(node.size_hint(), Some(14.0));
	}
}
