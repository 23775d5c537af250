use crate::tree::Pin;

/// Index of a node in a layout session's arena.
pub type NodeIdx = usize;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub width: f64,
	pub height: f64,
}

impl Viewport {
	pub fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	pub fn is_valid(&self) -> bool {
		self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
	}

	pub fn center(&self) -> (f64, f64) {
		(self.width / 2.0, self.height / 2.0)
	}
}

/// Simulation state for one skill node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutNode {
	pub index: NodeIdx,
	/// Unique within the session: slug, else name, else the index.
	pub key: String,
	pub depth: usize,
	pub parent: Option<NodeIdx>,
	/// Child positions from the root down to this node.
	pub tree_path: Vec<usize>,
	pub name: String,
	pub size_hint: Option<f64>,
	pub fixed: bool,
	pub pin: Option<Pin>,
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	pub fx: Option<f64>,
	pub fy: Option<f64>,
}

impl LayoutNode {
	pub fn is_pinned(&self) -> bool {
		self.fx.is_some() || self.fy.is_some()
	}

	pub fn pin_at(&mut self, x: f64, y: f64) {
		self.fx = Some(x);
		self.fy = Some(y);
	}

	pub fn unpin(&mut self) {
		self.fx = None;
		self.fy = None;
	}
}

/// A parent (`source`) to child (`target`) edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutLink {
	pub source: NodeIdx,
	pub target: NodeIdx,
}

impl LayoutLink {
	pub fn touches(&self, node: NodeIdx) -> bool {
		self.source == node || self.target == node
	}
}
