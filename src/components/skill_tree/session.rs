//! One layout session: a node arena flattened from a tree snapshot, its
//! simulation, and the adjacency used for spotlighting.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use log::debug;

use crate::tree::SkillNode;

use super::profile::Profile;
use super::simulation::Simulation;
use super::spotlight::Adjacency;
use super::types::{LayoutLink, LayoutNode, NodeIdx, Viewport};

pub struct LayoutSession {
	root: Arc<SkillNode>,
	viewport: Viewport,
	simulation: Simulation,
	adjacency: Adjacency,
}

impl LayoutSession {
	/// Flattens `root` breadth-first and starts a simulation for it.
	///
	/// Returns `None` for a degenerate viewport. Fixed nodes with a pin start
	/// pinned at the resolved pin; every other node starts free.
	pub fn build(root: Arc<SkillNode>, viewport: Viewport, profile: &Profile) -> Option<Self> {
		if !viewport.is_valid() {
			debug!(
				"layout: skipping invalid viewport {}x{}",
				viewport.width, viewport.height
			);
			return None;
		}

		let (mut nodes, links) = flatten(&root);
		for node in &mut nodes {
			if let (true, Some(pin)) = (node.fixed, node.pin) {
				let (x, y) = pin.resolve(viewport.width, viewport.height);
				node.pin_at(x, y);
			}
		}
		let adjacency = Adjacency::from_links(&links);
		let simulation = Simulation::new(nodes, links, viewport, profile.simulation);

		Some(Self {
			root,
			viewport,
			simulation,
			adjacency,
		})
	}

	pub fn root(&self) -> &Arc<SkillNode> {
		&self.root
	}

	pub fn viewport(&self) -> Viewport {
		self.viewport
	}

	pub fn simulation(&self) -> &Simulation {
		&self.simulation
	}

	pub fn simulation_mut(&mut self) -> &mut Simulation {
		&mut self.simulation
	}

	pub fn adjacency(&self) -> &Adjacency {
		&self.adjacency
	}

	pub fn nodes(&self) -> &[LayoutNode] {
		self.simulation.nodes()
	}

	pub fn links(&self) -> &[LayoutLink] {
		self.simulation.links()
	}

	/// The tree node behind an arena entry.
	pub fn skill_node(&self, idx: NodeIdx) -> Option<&SkillNode> {
		let path = &self.simulation.node(idx)?.tree_path;
		path.iter()
			.try_fold(self.root.as_ref(), |node, &child| node.children.get(child))
	}
}

fn flatten(root: &SkillNode) -> (Vec<LayoutNode>, Vec<LayoutLink>) {
	let mut nodes: Vec<LayoutNode> = Vec::new();
	let mut links = Vec::new();
	let mut keys = HashSet::new();
	let mut queue = VecDeque::from([(root, None::<NodeIdx>, Vec::new())]);

	while let Some((skill, parent, tree_path)) = queue.pop_front() {
		let index = nodes.len();
		let key = unique_key(stable_key(skill, index), index, &mut keys);
		let depth = parent.map_or(0, |p| nodes[p].depth + 1);
		if let Some(source) = parent {
			links.push(LayoutLink {
				source,
				target: index,
			});
		}
		for (i, child) in skill.children.iter().enumerate() {
			let mut path = tree_path.clone();
			path.push(i);
			queue.push_back((child, Some(index), path));
		}
		nodes.push(LayoutNode {
			index,
			key,
			depth,
			parent,
			tree_path,
			name: skill.name.clone(),
			size_hint: skill.size_hint(),
			fixed: skill.fixed,
			pin: skill.pin,
			..Default::default()
		});
	}
	(nodes, links)
}

fn stable_key(node: &SkillNode, index: usize) -> String {
	node.path_slug()
		.or(Some(node.name.as_str()).filter(|n| !n.is_empty()))
		.map_or_else(|| index.to_string(), str::to_owned)
}

fn unique_key(key: String, index: usize, taken: &mut HashSet<String>) -> String {
	let key = if taken.contains(&key) {
		format!("{key}#{index}")
	} else {
		key
	};
	taken.insert(key.clone());
	key
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;
	use crate::tree::{Pin, SkillNode};

	pub(crate) fn skill(slug: &str, children: Vec<SkillNode>) -> SkillNode {
		SkillNode {
			id: slug.into(),
			name: slug.to_uppercase(),
			slug: Some(slug.into()),
			children,
			..Default::default()
		}
	}

	/// root -> (a -> (a1, a2), b)
	pub(crate) fn sample_tree() -> Arc<SkillNode> {
		Arc::new(skill(
			"",
			vec![
				skill("a", vec![skill("a1", vec![]), skill("a2", vec![])]),
				skill("b", vec![]),
			],
		))
	}

	#[test]
	fn flattens_breadth_first_with_depths() {
		let session = LayoutSession::build(sample_tree(), Viewport::new(800.0, 600.0), &Profile::full()).unwrap();
		let keys: Vec<_> = session.nodes().iter().map(|n| n.key.as_str()).collect();
		assert_eq!(keys, ["0", "a", "b", "a1", "a2"]);
		let depths: Vec<_> = session.nodes().iter().map(|n| n.depth).collect();
		assert_eq!(depths, [0, 1, 1, 2, 2]);
		assert_eq!(session.links().len(), 4);
		assert_eq!(session.links()[2], LayoutLink { source: 1, target: 3 });
		assert_eq!(session.skill_node(4).map(|n| n.id.as_str()), Some("a2"));
	}

	#[test]
	fn key_falls_back_to_name_then_index_and_stays_unique() {
		let mut root = skill("", vec![skill("dup", vec![]), skill("dup", vec![])]);
		root.name = "Me".into();
		let session = LayoutSession::build(Arc::new(root), Viewport::new(10.0, 10.0), &Profile::full()).unwrap();
		let keys: Vec<_> = session.nodes().iter().map(|n| n.key.as_str()).collect();
		assert_eq!(keys, ["Me", "dup", "dup#2"]);
	}

	#[test]
	fn invalid_viewport_builds_nothing() {
		assert!(LayoutSession::build(sample_tree(), Viewport::new(0.0, 600.0), &Profile::full()).is_none());
		assert!(LayoutSession::build(sample_tree(), Viewport::new(800.0, f64::NAN), &Profile::full()).is_none());
	}

	#[test]
	fn fixed_relative_pin_resolves_against_viewport() {
		let mut root = skill("", vec![skill("free", vec![])]);
		root.fixed = true;
		root.pin = Some(Pin { x: 0.5, y: 0.5, relative: true });
		root.children[0].pin = Some(Pin { x: 0.1, y: 0.1, relative: true });
		let session = LayoutSession::build(Arc::new(root), Viewport::new(800.0, 600.0), &Profile::full()).unwrap();
		let pinned = &session.nodes()[0];
		assert_eq!((pinned.fx, pinned.fy), (Some(400.0), Some(300.0)));
		assert_eq!((pinned.x, pinned.y), (400.0, 300.0));
		assert!(!session.nodes()[1].is_pinned());
	}
}
