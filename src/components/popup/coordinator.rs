//! Debounced show and delayed unmount for the node detail popup.
//!
//! The coordinator owns no timers. It records deadlines and the caller
//! drives it with [`PopupCoordinator::advance`] whenever
//! [`PopupCoordinator::next_deadline`] passes, and with
//! [`PopupCoordinator::next_frame`] on the animation frame after a mount.

use crate::tree::SkillNode;

/// Quiet time after a hover before the popup is shown.
pub const SHOW_DELAY: f64 = 180.0;
/// Fade duration; the popup unmounts this long after hover ends.
pub const HIDE_DELAY: f64 = 200.0;
/// Popup origin relative to the pointer anchor.
pub const POPUP_OFFSET: (f64, f64) = (-100.0, 50.0);
pub const POPUP_WIDTH: f64 = 224.0;
pub const POPUP_MIN_HEIGHT: f64 = 160.0;

/// What the popup shows for one node.
#[derive(Clone, Debug, PartialEq)]
pub struct PopupContent {
	pub title: String,
	pub description: Option<String>,
}

impl PopupContent {
	pub fn from_node(node: &SkillNode) -> Self {
		let title = [Some(node.name.as_str()), node.slug.as_deref()]
			.into_iter()
			.flatten()
			.find(|s| !s.is_empty())
			.unwrap_or("Untitled Node")
			.to_string();
		Self {
			title,
			description: node.description.clone(),
		}
	}
}

/// A mounted popup.
#[derive(Clone, Debug, PartialEq)]
pub struct PopupView<N> {
	pub node: N,
	pub anchor: (f64, f64),
	pub visible: bool,
}

impl<N> PopupView<N> {
	/// Top-left corner of the popup frame.
	pub fn origin(&self) -> (f64, f64) {
		(self.anchor.0 + POPUP_OFFSET.0, self.anchor.1 + POPUP_OFFSET.1)
	}

	pub fn contains(&self, (x, y): (f64, f64)) -> bool {
		let (left, top) = self.origin();
		(left..=left + POPUP_WIDTH).contains(&x) && (top..=top + POPUP_MIN_HEIGHT).contains(&y)
	}
}

#[derive(Clone, Debug)]
struct PendingShow<N> {
	node: N,
	anchor: (f64, f64),
	due: f64,
}

#[derive(Clone, Debug)]
pub struct PopupCoordinator<N> {
	show: Option<PendingShow<N>>,
	unmount_at: Option<f64>,
	shown: Option<PopupView<N>>,
	reveal: bool,
}

impl<N> Default for PopupCoordinator<N> {
	fn default() -> Self {
		Self {
			show: None,
			unmount_at: None,
			shown: None,
			reveal: false,
		}
	}
}

impl<N: Clone> PopupCoordinator<N> {
	pub fn view(&self) -> Option<&PopupView<N>> {
		self.shown.as_ref()
	}

	/// Replaces any pending show with one for `node`. A popup already fading
	/// out keeps its unmount deadline.
	pub fn hover(&mut self, node: N, anchor: (f64, f64), now: f64) {
		self.show = Some(PendingShow {
			node,
			anchor,
			due: now + SHOW_DELAY,
		});
	}

	/// Cancels a pending show and starts the fade-out.
	pub fn hover_end(&mut self, now: f64) {
		self.show = None;
		self.reveal = false;
		if let Some(shown) = self.shown.as_mut() {
			shown.visible = false;
			self.unmount_at = Some(now + HIDE_DELAY);
		}
	}

	/// Fires every task due by `now`. Returns whether the view changed.
	pub fn advance(&mut self, now: f64) -> bool {
		let mut changed = false;
		let unmount_due = self.unmount_at.filter(|&due| due <= now);
		let show_due = self.show.as_ref().map(|p| p.due).filter(|&due| due <= now);
		if let Some(unmount) = unmount_due {
			if show_due.is_none_or(|show| unmount <= show) {
				self.unmount_at = None;
				self.shown = None;
				changed = true;
			}
		}
		if show_due.is_some() {
			if let Some(pending) = self.show.take() {
				// The new popup replaces the fading one, whose unmount is moot.
				self.unmount_at = None;
				self.shown = Some(PopupView {
					node: pending.node,
					anchor: pending.anchor,
					visible: false,
				});
				self.reveal = true;
				changed = true;
			}
		}
		changed
	}

	/// Whether a freshly mounted popup is waiting for its reveal frame.
	pub fn wants_frame(&self) -> bool {
		self.reveal
	}

	/// Makes a freshly mounted popup visible. Returns whether it did.
	pub fn next_frame(&mut self) -> bool {
		if !std::mem::take(&mut self.reveal) {
			return false;
		}
		match self.shown.as_mut() {
			Some(shown) => {
				shown.visible = true;
				true
			}
			None => false,
		}
	}

	/// A press outside the popup frame closes it at once, dropping any
	/// pending work. Returns whether anything was closed.
	pub fn pointer_down(&mut self, at: (f64, f64)) -> bool {
		if self.shown.as_ref().is_some_and(|v| v.contains(at)) {
			return false;
		}
		let closed = self.shown.is_some();
		*self = Self::default();
		closed
	}

	pub fn next_deadline(&self) -> Option<f64> {
		match (self.show.as_ref().map(|p| p.due), self.unmount_at) {
			(Some(a), Some(b)) => Some(a.min(b)),
			(a, b) => a.or(b),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn coordinator() -> PopupCoordinator<&'static str> {
		PopupCoordinator::default()
	}

	#[test]
	fn show_is_debounced_then_revealed() {
		let mut c = coordinator();
		c.hover("a", (300.0, 200.0), 0.0);
		assert_eq!(c.next_deadline(), Some(SHOW_DELAY));
		assert!(!c.advance(179.0));
		assert!(c.view().is_none());

		assert!(c.advance(180.0));
		let view = c.view().unwrap();
		assert_eq!((view.node, view.visible), ("a", false));
		assert!(c.wants_frame());
		assert!(c.next_frame());
		assert!(c.view().unwrap().visible);
		assert!(!c.next_frame());
	}

	#[test]
	fn rapid_hover_shows_only_the_last_node() {
		let mut c = coordinator();
		c.hover("a", (0.0, 0.0), 0.0);
		c.hover("b", (50.0, 50.0), 100.0);
		c.advance(200.0);
		assert!(c.view().is_none());
		c.advance(280.0);
		assert_eq!(c.view().map(|v| v.node), Some("b"));
		assert_eq!(c.next_deadline(), None);
	}

	#[test]
	fn hover_end_cancels_pending_show() {
		let mut c = coordinator();
		c.hover("a", (0.0, 0.0), 0.0);
		c.hover_end(100.0);
		assert_eq!(c.next_deadline(), None);
		assert!(!c.advance(1_000.0));
		assert!(c.view().is_none());
	}

	#[test]
	fn hover_end_fades_then_unmounts() {
		let mut c = coordinator();
		c.hover("a", (0.0, 0.0), 0.0);
		c.advance(180.0);
		c.next_frame();
		c.hover_end(500.0);
		assert!(!c.view().unwrap().visible);
		assert_eq!(c.next_deadline(), Some(700.0));
		c.advance(699.0);
		assert!(c.view().is_some());
		c.advance(700.0);
		assert!(c.view().is_none());
	}

	#[test]
	fn new_hover_during_fade_keeps_unmount_deadline() {
		let mut c = coordinator();
		c.hover("a", (0.0, 0.0), 0.0);
		c.advance(180.0);
		c.hover_end(300.0);
		c.hover("b", (10.0, 10.0), 350.0);
		assert_eq!(c.next_deadline(), Some(500.0));
		assert!(c.advance(500.0));
		assert!(c.view().is_none());
		c.advance(530.0);
		assert_eq!(c.view().map(|v| (v.node, v.visible)), Some(("b", false)));
	}

	#[test]
	fn show_before_unmount_replaces_fading_popup() {
		let mut c = coordinator();
		c.hover("a", (0.0, 0.0), 0.0);
		c.advance(180.0);
		c.hover_end(300.0);
		c.hover("b", (10.0, 10.0), 310.0);
		c.advance(490.0);
		assert_eq!(c.view().map(|v| v.node), Some("b"));
		assert_eq!(c.next_deadline(), None);
		c.advance(500.0);
		assert_eq!(c.view().map(|v| v.node), Some("b"));
	}

	#[test]
	fn late_advance_fires_tasks_in_deadline_order() {
		let mut c = coordinator();
		c.hover("a", (0.0, 0.0), 0.0);
		c.advance(180.0);
		c.hover_end(300.0);
		c.hover("b", (10.0, 10.0), 350.0);
		c.advance(1_000.0);
		assert_eq!(c.view().map(|v| v.node), Some("b"));
	}

	#[test]
	fn hover_end_before_reveal_frame_keeps_hidden() {
		let mut c = coordinator();
		c.hover("a", (0.0, 0.0), 0.0);
		c.advance(180.0);
		c.hover_end(181.0);
		assert!(!c.next_frame());
		assert!(!c.view().unwrap().visible);
	}

	#[test]
	fn outside_press_closes_immediately() {
		let mut c = coordinator();
		c.hover("a", (300.0, 200.0), 0.0);
		c.advance(180.0);
		c.next_frame();
		// Frame spans x 200..424, y 250..410.
		assert!(!c.pointer_down((250.0, 300.0)));
		assert!(c.view().is_some());
		assert!(c.pointer_down((10.0, 10.0)));
		assert!(c.view().is_none());
		assert_eq!(c.next_deadline(), None);
	}

	#[test]
	fn outside_press_drops_pending_show() {
		let mut c = coordinator();
		c.hover("a", (0.0, 0.0), 0.0);
		assert!(!c.pointer_down((500.0, 500.0)));
		assert!(!c.advance(1_000.0));
		assert!(c.view().is_none());
	}

	#[test]
	fn title_falls_back_to_slug_then_placeholder() {
		let mut node = SkillNode {
			name: "Rust".into(),
			slug: Some("rust".into()),
			description: Some("systems".into()),
			..Default::default()
		};
		assert_eq!(PopupContent::from_node(&node).title, "Rust");
		node.name.clear();
		assert_eq!(PopupContent::from_node(&node).title, "rust");
		node.slug = Some(String::new());
		let content = PopupContent::from_node(&node);
		assert_eq!(content.title, "Untitled Node");
		assert_eq!(content.description.as_deref(), Some("systems"));
	}
}
