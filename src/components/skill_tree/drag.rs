//! Drag-to-pin: pointer drags hold a node at the pointer while the
//! simulation is reheated, then either keep it pinned (fixed nodes) or
//! release it back to the forces.

use log::info;

use crate::tree::Pin;

use super::simulation::Simulation;
use super::types::{NodeIdx, Viewport};

/// Alpha target while a drag is active.
pub const DRAG_ALPHA_TARGET: f64 = 0.3;
/// Pointer travel (screen px) after which a press is a drag, not a click.
pub const CLICK_TOLERANCE: f64 = 3.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
	pub alt: bool,
	pub ctrl: bool,
	pub meta: bool,
	pub shift: bool,
}

impl Modifiers {
	pub fn any(&self) -> bool {
		self.alt || self.ctrl || self.meta || self.shift
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PointerPress {
	pub button: i16,
	pub modifiers: Modifiers,
}

impl PointerPress {
	pub fn primary() -> Self {
		Self::default()
	}

	/// Only unmodified primary-button presses start gestures.
	pub fn accepts(&self) -> bool {
		self.button == 0 && !self.modifiers.any()
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum DragState {
	#[default]
	Idle,
	Dragging {
		node: NodeIdx,
		origin: (f64, f64),
		moved: bool,
	},
}

/// What a finished drag did.
#[derive(Clone, Debug, PartialEq)]
pub struct DragRelease {
	pub node: NodeIdx,
	/// False for a press-and-release in place, which counts as a click.
	pub moved: bool,
	/// Normalized position for fixed nodes, which stay pinned.
	pub pin: Option<Pin>,
}

#[derive(Clone, Debug, Default)]
pub struct DragController {
	state: DragState,
}

impl DragController {
	pub fn active_node(&self) -> Option<NodeIdx> {
		match self.state {
			DragState::Dragging { node, .. } => Some(node),
			DragState::Idle => None,
		}
	}

	pub fn is_dragging(&self) -> bool {
		self.active_node().is_some()
	}

	/// Starts dragging `node`. `screen` is the pointer in screen space, used
	/// only to tell clicks from drags. Returns false when the press is ignored.
	pub fn begin(
		&mut self,
		press: PointerPress,
		node: NodeIdx,
		screen: (f64, f64),
		sim: &mut Simulation,
	) -> bool {
		if !press.accepts() || self.is_dragging() {
			return false;
		}
		let Some(layout) = sim.node_mut(node) else {
			return false;
		};
		let (x, y) = (layout.x, layout.y);
		layout.pin_at(x, y);
		sim.set_alpha_target(DRAG_ALPHA_TARGET);
		sim.restart();
		self.state = DragState::Dragging {
			node,
			origin: screen,
			moved: false,
		};
		true
	}

	/// Moves the held node to `(x, y)` in layout coordinates.
	pub fn update(&mut self, x: f64, y: f64, screen: (f64, f64), sim: &mut Simulation) {
		let DragState::Dragging {
			node,
			origin,
			ref mut moved,
		} = self.state
		else {
			return;
		};
		let travel = ((screen.0 - origin.0).powi(2) + (screen.1 - origin.1).powi(2)).sqrt();
		if travel > CLICK_TOLERANCE {
			*moved = true;
		}
		if let Some(layout) = sim.node_mut(node) {
			layout.pin_at(x, y);
		}
	}

	/// Ends the drag, cooling the simulation and deciding the node's pin.
	pub fn end(&mut self, sim: &mut Simulation, viewport: Viewport) -> Option<DragRelease> {
		let DragState::Dragging { node, moved, .. } = std::mem::take(&mut self.state) else {
			return None;
		};
		sim.set_alpha_target(0.0);
		let layout = sim.node_mut(node)?;
		let pin = if layout.fixed {
			let x = layout.fx.unwrap_or(layout.x);
			let y = layout.fy.unwrap_or(layout.y);
			layout.pin_at(x, y);
			let pin = Pin::normalized(x, y, viewport.width, viewport.height);
			info!(
				"Pin for {}: {}",
				layout.name,
				serde_json::to_string(&pin).unwrap_or_default()
			);
			Some(pin)
		} else {
			layout.unpin();
			None
		};
		Some(DragRelease { node, moved, pin })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::skill_tree::profile::SimulationParameters;
	use crate::components::skill_tree::types::{LayoutLink, LayoutNode};

	fn sim(fixed: bool) -> Simulation {
		let nodes = (0..2)
			.map(|index| LayoutNode {
				index,
				key: index.to_string(),
				fixed: fixed && index == 1,
				..Default::default()
			})
			.collect();
		let links = vec![LayoutLink { source: 0, target: 1 }];
		Simulation::new(nodes, links, Viewport::new(800.0, 600.0), SimulationParameters::default())
	}

	#[test]
	fn modified_or_secondary_presses_are_ignored() {
		let mut s = sim(false);
		while s.step() {}
		let mut drag = DragController::default();
		let modified = [
			Modifiers { alt: true, ..Default::default() },
			Modifiers { ctrl: true, ..Default::default() },
			Modifiers { meta: true, ..Default::default() },
			Modifiers { shift: true, ..Default::default() },
		];
		for modifiers in modified {
			let press = PointerPress { button: 0, modifiers };
			assert!(!press.accepts());
			assert!(!drag.begin(press, 1, (0.0, 0.0), &mut s));
		}
		assert!(!drag.begin(PointerPress { button: 1, ..Default::default() }, 1, (0.0, 0.0), &mut s));
		assert!(!drag.begin(PointerPress { button: 2, ..Default::default() }, 1, (0.0, 0.0), &mut s));
		assert!(!drag.is_dragging());
		assert!(!s.is_running());
		assert!(!s.nodes()[1].is_pinned());
	}

	#[test]
	fn start_reheats_and_pins_in_place() {
		let mut s = sim(false);
		while s.step() {}
		let (x, y) = (s.nodes()[1].x, s.nodes()[1].y);
		let mut drag = DragController::default();
		assert!(drag.begin(PointerPress::primary(), 1, (5.0, 5.0), &mut s));
		assert!(s.is_running());
		assert_eq!(s.alpha_target(), DRAG_ALPHA_TARGET);
		assert_eq!((s.nodes()[1].fx, s.nodes()[1].fy), (Some(x), Some(y)));
	}

	#[test]
	fn free_node_is_released() {
		let mut s = sim(false);
		let mut drag = DragController::default();
		drag.begin(PointerPress::primary(), 1, (0.0, 0.0), &mut s);
		drag.update(250.0, 120.0, (40.0, 0.0), &mut s);
		s.step();
		assert_eq!((s.nodes()[1].x, s.nodes()[1].y), (250.0, 120.0));
		let release = drag.end(&mut s, Viewport::new(800.0, 600.0)).unwrap();
		assert_eq!(release, DragRelease { node: 1, moved: true, pin: None });
		assert!(!s.nodes()[1].is_pinned());
		assert_eq!(s.alpha_target(), 0.0);
		assert!(!drag.is_dragging());
	}

	#[test]
	fn fixed_node_stays_pinned_at_release_point() {
		let mut s = sim(true);
		let mut drag = DragController::default();
		drag.begin(PointerPress::primary(), 1, (0.0, 0.0), &mut s);
		drag.update(200.0, 150.0, (30.0, 30.0), &mut s);
		let release = drag.end(&mut s, Viewport::new(800.0, 600.0)).unwrap();
		assert_eq!((s.nodes()[1].fx, s.nodes()[1].fy), (Some(200.0), Some(150.0)));
		assert_eq!(release.pin, Some(Pin { x: 0.25, y: 0.25, relative: true }));
	}

	#[test]
	fn press_without_travel_is_a_click() {
		let mut s = sim(false);
		let mut drag = DragController::default();
		drag.begin(PointerPress::primary(), 0, (10.0, 10.0), &mut s);
		drag.update(s.nodes()[0].x, s.nodes()[0].y, (11.0, 11.0), &mut s);
		let release = drag.end(&mut s, Viewport::new(800.0, 600.0)).unwrap();
		assert!(!release.moved);
		assert!(drag.end(&mut s, Viewport::new(800.0, 600.0)).is_none());
	}
}
