//! Hover spotlight: fades everything outside the focused node's
//! neighbourhood and brightens the focused node itself.

use std::collections::HashSet;

use super::animation::Channel;
use super::profile::SpotlightStyle;
use super::scale::Rgb;
use super::types::{LayoutLink, NodeIdx};

/// Symmetric neighbour lookup built once per data load.
#[derive(Clone, Debug, Default)]
pub struct Adjacency {
	pairs: HashSet<(NodeIdx, NodeIdx)>,
}

impl Adjacency {
	pub fn from_links(links: &[LayoutLink]) -> Self {
		let mut pairs = HashSet::with_capacity(links.len() * 2);
		for link in links {
			pairs.insert((link.source, link.target));
			pairs.insert((link.target, link.source));
		}
		Self { pairs }
	}

	/// True for direct neighbours and for a node compared with itself.
	pub fn is_neighbor(&self, a: NodeIdx, b: NodeIdx) -> bool {
		a == b || self.pairs.contains(&(a, b))
	}
}

pub fn is_active(focus: Option<NodeIdx>, node: NodeIdx, adjacency: &Adjacency) -> bool {
	focus.is_none_or(|f| adjacency.is_neighbor(f, node))
}

#[derive(Clone, Debug)]
pub struct NodeVisual {
	pub base_fill: Rgb,
	pub opacity: Channel<f64>,
	pub fill: Channel<Rgb>,
	pub label_opacity: Channel<f64>,
}

#[derive(Clone, Debug)]
pub struct LinkVisual {
	pub opacity: Channel<f64>,
	pub width: Channel<f64>,
}

pub struct Spotlight {
	focus: Option<NodeIdx>,
	adjacency: Adjacency,
	style: SpotlightStyle,
	nodes: Vec<NodeVisual>,
	links: Vec<LinkVisual>,
}

impl Spotlight {
	/// `base_fills` holds one cached base colour per node, in arena order.
	pub fn new(adjacency: Adjacency, base_fills: Vec<Rgb>, link_count: usize, style: SpotlightStyle) -> Self {
		let nodes = base_fills
			.into_iter()
			.map(|base_fill| NodeVisual {
				base_fill,
				opacity: Channel::new(1.0),
				fill: Channel::new(base_fill),
				label_opacity: Channel::new(1.0),
			})
			.collect();
		let links = (0..link_count)
			.map(|_| LinkVisual {
				opacity: Channel::new(1.0),
				width: Channel::new(style.link_width),
			})
			.collect();
		Self {
			focus: None,
			adjacency,
			style,
			nodes,
			links,
		}
	}

	pub fn focus(&self) -> Option<NodeIdx> {
		self.focus
	}

	pub fn is_active(&self, node: NodeIdx) -> bool {
		is_active(self.focus, node, &self.adjacency)
	}

	pub fn node(&self, idx: NodeIdx) -> Option<&NodeVisual> {
		self.nodes.get(idx)
	}

	pub fn link(&self, idx: usize) -> Option<&LinkVisual> {
		self.links.get(idx)
	}

	/// Sets the focus and starts the spotlight transition on every node,
	/// label and link, preempting any spotlight transition still running.
	pub fn apply(&mut self, focus: Option<NodeIdx>, links: &[LayoutLink], now: f64) {
		self.focus = focus;
		let SpotlightStyle {
			duration, ease, ..
		} = self.style;

		for idx in 0..self.nodes.len() {
			let opacity = if self.is_active(idx) {
				1.0
			} else {
				self.style.faded_opacity
			};
			let visual = &mut self.nodes[idx];
			let fill = if focus == Some(idx) {
				visual.base_fill.brighter(self.style.brighten)
			} else {
				visual.base_fill
			};
			visual.opacity.transition(opacity, now, duration, ease);
			visual.fill.transition(fill, now, duration, ease);
			visual.label_opacity.transition(opacity, now, duration, ease);
		}

		for (link, visual) in links.iter().zip(self.links.iter_mut()) {
			let incident = focus.is_some_and(|f| link.touches(f));
			let (opacity, width) = match (focus, incident) {
				(None, _) => (1.0, self.style.link_width),
				(Some(_), true) => (1.0, self.style.link_focus_width),
				(Some(_), false) => (self.style.link_faded_opacity, self.style.link_width),
			};
			visual.opacity.transition(opacity, now, duration, ease);
			visual.width.transition(width, now, duration, ease);
		}
	}

	/// Drops finished tweens so idle frames sample resting values.
	pub fn settle(&mut self, now: f64) {
		for visual in &mut self.nodes {
			visual.opacity.settle(now);
			visual.fill.settle(now);
			visual.label_opacity.settle(now);
		}
		for visual in &mut self.links {
			visual.opacity.settle(now);
			visual.width.settle(now);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::skill_tree::scale::DARK_BLUE;

	// 0 -> 1, 0 -> 2, 1 -> 3
	fn links() -> Vec<LayoutLink> {
		[(0, 1), (0, 2), (1, 3)]
			.into_iter()
			.map(|(source, target)| LayoutLink { source, target })
			.collect()
	}

	fn spotlight() -> Spotlight {
		let links = links();
		Spotlight::new(
			Adjacency::from_links(&links),
			vec![DARK_BLUE; 4],
			links.len(),
			SpotlightStyle {
				faded_opacity: 0.4,
				..Default::default()
			},
		)
	}

	#[test]
	fn adjacency_is_symmetric() {
		let adj = Adjacency::from_links(&links());
		assert!(adj.is_neighbor(1, 0));
		assert!(adj.is_neighbor(0, 1));
		assert!(adj.is_neighbor(3, 3));
		assert!(!adj.is_neighbor(2, 3));
	}

	#[test]
	fn hover_activates_neighbours_only() {
		let mut s = spotlight();
		s.apply(Some(0), &links(), 0.0);
		assert!(s.is_active(0));
		assert!(s.is_active(1));
		assert!(!s.is_active(3));

		s.apply(None, &links(), 10.0);
		assert!((0..4).all(|n| s.is_active(n)));
	}

	#[test]
	fn transitions_reach_targets() {
		let mut s = spotlight();
		s.apply(Some(1), &links(), 0.0);
		let faded = s.node(2).unwrap();
		assert_eq!(faded.opacity.value_at(0.0), 1.0);
		assert_eq!(faded.opacity.value_at(320.0), 0.4);
		assert_eq!(faded.label_opacity.value_at(400.0), 0.4);
		assert_eq!(s.node(3).unwrap().opacity.value_at(320.0), 1.0);

		let focused = s.node(1).unwrap().fill.value_at(320.0);
		assert_eq!(focused, DARK_BLUE.brighter(0.35));
		assert_eq!(s.node(0).unwrap().fill.value_at(320.0), DARK_BLUE);

		let incident = s.link(0).unwrap();
		assert_eq!((incident.opacity.target(), incident.width.target()), (1.0, 2.5));
		let other = s.link(1).unwrap();
		assert_eq!((other.opacity.target(), other.width.target()), (0.25, 1.0));
	}

	#[test]
	fn rehover_preempts_stale_fade() {
		let mut s = spotlight();
		s.apply(Some(2), &links(), 0.0);
		s.apply(None, &links(), 100.0);
		s.apply(Some(3), &links(), 150.0);
		// node 2 was focused, then neutral, now faded: last hover wins.
		let visual = s.node(2).unwrap();
		assert_eq!(visual.opacity.target(), 0.4);
		assert_eq!(visual.fill.target(), DARK_BLUE);
		assert_eq!(visual.opacity.value_at(150.0 + 320.0), 0.4);
		s.settle(1000.0);
		assert!(!s.node(2).unwrap().opacity.is_animating());
	}
}
