use std::sync::Arc;

use log::debug;

use crate::tree::{Pin, SkillNode};

use super::drag::{DragController, PointerPress};
use super::profile::Profile;
use super::pulse::HaloPulse;
use super::session::LayoutSession;
use super::spotlight::Spotlight;
use super::types::{LayoutNode, NodeIdx, Viewport};

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Notifications for the embedding page, in the order they happened.
#[derive(Clone, Debug, PartialEq)]
pub enum GraphEvent {
	HoverStart { node: NodeIdx, pointer: (f64, f64) },
	HoverEnd { node: NodeIdx },
	Click { node: NodeIdx },
	Pinned { node: NodeIdx, pin: Pin },
}

pub struct GraphState {
	pub session: LayoutSession,
	pub profile: Profile,
	pub spotlight: Spotlight,
	pub pulse: HaloPulse,
	pub drag: DragController,
	pub pan: PanState,
	pub transform: ViewTransform,
	hovered: Option<NodeIdx>,
}

impl GraphState {
	pub fn new(root: Arc<SkillNode>, viewport: Viewport, profile: Profile) -> Option<Self> {
		let session = LayoutSession::build(root, viewport, &profile)?;
		let base_fills = session
			.nodes()
			.iter()
			.map(|n| profile.fill.color(n.depth))
			.collect();
		let spotlight = Spotlight::new(
			session.adjacency().clone(),
			base_fills,
			session.links().len(),
			profile.spotlight,
		);
		Some(Self {
			session,
			spotlight,
			pulse: HaloPulse::new(profile.pulse),
			drag: DragController::default(),
			pan: PanState::default(),
			transform: ViewTransform::default(),
			hovered: None,
			profile,
		})
	}

	pub fn viewport(&self) -> Viewport {
		self.session.viewport()
	}

	pub fn hovered(&self) -> Option<NodeIdx> {
		self.hovered
	}

	pub fn base_radius(&self, node: &LayoutNode) -> f64 {
		self.profile.radius.radius(node.size_hint, node.depth)
	}

	/// Radius including any pulse in progress.
	pub fn radius_at(&self, node: &LayoutNode, now: f64) -> f64 {
		self.pulse
			.radius(node.index, now)
			.unwrap_or_else(|| self.base_radius(node))
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node whose circle contains the screen point.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<NodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		self.session
			.nodes()
			.iter()
			.rev()
			.find(|node| {
				let (dx, dy) = (node.x - gx, node.y - gy);
				(dx * dx + dy * dy).sqrt() <= self.base_radius(node)
			})
			.map(|node| node.index)
	}

	/// Moves focus to `node`, running spotlight and pulse transitions.
	pub fn set_hover(
		&mut self,
		node: Option<NodeIdx>,
		pointer: (f64, f64),
		now: f64,
		events: &mut Vec<GraphEvent>,
	) {
		if self.hovered == node {
			return;
		}
		if let Some(prev) = self.hovered.take() {
			self.pulse.stop(prev, now);
			events.push(GraphEvent::HoverEnd { node: prev });
		}
		if let Some(idx) = node {
			if let Some(radius) = self.session.nodes().get(idx).map(|n| self.base_radius(n)) {
				self.pulse.start(idx, radius, now);
			}
			events.push(GraphEvent::HoverStart { node: idx, pointer });
		}
		self.hovered = node;
		self.spotlight.apply(node, self.session.links(), now);
	}

	pub fn pointer_down(
		&mut self,
		press: PointerPress,
		sx: f64,
		sy: f64,
		now: f64,
		events: &mut Vec<GraphEvent>,
	) {
		if !self.profile.interactive || !press.accepts() {
			return;
		}
		match self.node_at_position(sx, sy) {
			Some(idx) => {
				self.set_hover(Some(idx), (sx, sy), now, events);
				let sim = self.session.simulation_mut();
				self.drag.begin(press, idx, (sx, sy), sim);
			}
			None => {
				self.pan = PanState {
					active: true,
					start_x: sx,
					start_y: sy,
					transform_start_x: self.transform.x,
					transform_start_y: self.transform.y,
				};
			}
		}
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64, now: f64, events: &mut Vec<GraphEvent>) {
		if !self.profile.interactive {
			return;
		}
		if self.drag.is_dragging() {
			let (gx, gy) = self.screen_to_graph(sx, sy);
			let sim = self.session.simulation_mut();
			self.drag.update(gx, gy, (sx, sy), sim);
			return;
		}
		if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
			return;
		}
		let hovered = self.node_at_position(sx, sy);
		self.set_hover(hovered, (sx, sy), now, events);
	}

	pub fn pointer_up(&mut self, events: &mut Vec<GraphEvent>) {
		self.pan.active = false;
		let viewport = self.viewport();
		let sim = self.session.simulation_mut();
		let Some(release) = self.drag.end(sim, viewport) else {
			return;
		};
		if !release.moved {
			events.push(GraphEvent::Click { node: release.node });
		}
		if let Some(pin) = release.pin {
			events.push(GraphEvent::Pinned {
				node: release.node,
				pin,
			});
		}
	}

	/// Pointer left the canvas: finish gestures and clear hover.
	pub fn pointer_leave(&mut self, now: f64, events: &mut Vec<GraphEvent>) {
		let viewport = self.viewport();
		let sim = self.session.simulation_mut();
		if let Some(release) = self.drag.end(sim, viewport) {
			if let Some(pin) = release.pin {
				events.push(GraphEvent::Pinned {
					node: release.node,
					pin,
				});
			}
		}
		self.pan.active = false;
		self.set_hover(None, (0.0, 0.0), now, events);
	}

	/// Zooms around the pointer.
	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		if !self.profile.interactive {
			return;
		}
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Per-frame work: one simulation tick and animation bookkeeping.
	/// Returns whether the simulation moved.
	pub fn frame(&mut self, now: f64) -> bool {
		let ticked = self.session.simulation_mut().step();
		self.pulse.advance(now);
		self.spotlight.settle(now);
		ticked
	}

	pub fn stop(&mut self) {
		self.session.simulation_mut().stop();
	}
}

/// Outcome of driving a frame through a [`GraphSlot`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Frame {
	/// The caller's generation was replaced or torn down; it must stop.
	Stale,
	Ticked,
	Idle,
}

/// Owns the one mounted layout session, tagging each with a generation so
/// loops started for an older session can detect they have been replaced.
#[derive(Default)]
pub struct GraphSlot {
	generation: u64,
	state: Option<GraphState>,
}

impl GraphSlot {
	pub fn state(&self) -> Option<&GraphState> {
		self.state.as_ref()
	}

	pub fn state_mut(&mut self) -> Option<&mut GraphState> {
		self.state.as_mut()
	}

	/// Stops the current session, then builds its replacement. The view
	/// transform survives the rebuild. Returns the new generation, which is
	/// bumped even when nothing could be built. A hover held by the old
	/// session ends with it and is reported through `events`.
	pub fn rebuild(
		&mut self,
		root: Option<Arc<SkillNode>>,
		viewport: Viewport,
		profile: Profile,
		events: &mut Vec<GraphEvent>,
	) -> u64 {
		let transform = self.state.as_ref().map(|s| s.transform);
		self.teardown(events);
		self.state = root
			.and_then(|root| GraphState::new(root, viewport, profile))
			.map(|mut state| {
				state.transform = transform.unwrap_or_default();
				state
			});
		debug!(
			"layout: generation {} built ({} nodes)",
			self.generation,
			self.state.as_ref().map_or(0, |s| s.session.nodes().len())
		);
		self.generation
	}

	/// Stops and drops the current session and invalidates its generation.
	pub fn teardown(&mut self, events: &mut Vec<GraphEvent>) {
		if let Some(mut state) = self.state.take() {
			if let Some(node) = state.hovered.take() {
				events.push(GraphEvent::HoverEnd { node });
			}
			state.stop();
			debug!("layout: generation {} stopped", self.generation);
		}
		self.generation += 1;
	}

	pub fn frame(&mut self, generation: u64, now: f64) -> Frame {
		if generation != self.generation {
			return Frame::Stale;
		}
		match self.state.as_mut().map(|state| state.frame(now)) {
			Some(true) => Frame::Ticked,
			_ => Frame::Idle,
		}
	}
}
