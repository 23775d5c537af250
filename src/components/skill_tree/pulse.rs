//! Halo pulse on the hovered node.
//!
//! Each pulsing node runs a small state machine: `Grow` then `Shrink` make up
//! one cycle, and at every cycle boundary the hover flag decides whether
//! another cycle is scheduled. [`HaloPulse::stop`] interrupts whatever leg is
//! in flight and eases the radius back to its base before the glow is removed.

use super::animation::{Channel, Ease};
use super::profile::PulseStyle;
use super::types::NodeIdx;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PulsePhase {
	Grow,
	Shrink,
	Settle,
}

#[derive(Clone, Debug)]
struct PulseTrack {
	node: NodeIdx,
	base: f64,
	radius: Channel<f64>,
	phase: PulsePhase,
	hovered: bool,
}

#[derive(Clone, Debug, Default)]
pub struct HaloPulse {
	style: PulseStyle,
	tracks: Vec<PulseTrack>,
}

impl HaloPulse {
	pub fn new(style: PulseStyle) -> Self {
		Self {
			style,
			tracks: Vec::new(),
		}
	}

	/// Marks `node` hovered and starts a cycle from `base` radius.
	pub fn start(&mut self, node: NodeIdx, base: f64, now: f64) {
		let style = self.style;
		let pos = match self.tracks.iter().position(|t| t.node == node) {
			Some(pos) => pos,
			None => {
				self.tracks.push(PulseTrack {
					node,
					base,
					radius: Channel::new(base),
					phase: PulsePhase::Grow,
					hovered: true,
				});
				self.tracks.len() - 1
			}
		};
		let track = &mut self.tracks[pos];
		track.base = base;
		track.hovered = true;
		track.phase = PulsePhase::Grow;
		track
			.radius
			.transition_from(base, base * style.grow, now, style.leg, Ease::CubicInOut);
	}

	/// Clears the hover flag, interrupts the pulse and settles back to base.
	pub fn stop(&mut self, node: NodeIdx, now: f64) {
		let settle = self.style.settle;
		if let Some(track) = self.tracks.iter_mut().find(|t| t.node == node) {
			track.hovered = false;
			track.phase = PulsePhase::Settle;
			track.radius.interrupt(now);
			track.radius.transition(track.base, now, settle, Ease::CubicOut);
		}
	}

	/// Processes every leg that ended by `now`.
	pub fn advance(&mut self, now: f64) {
		let style = self.style;
		self.tracks.retain_mut(|track| {
			while let Some(ended) = track.radius.settle(now) {
				match track.phase {
					PulsePhase::Grow => {
						track.phase = PulsePhase::Shrink;
						let peak = track.base * style.grow;
						track
							.radius
							.transition_from(peak, track.base, ended, style.leg, Ease::CubicInOut);
					}
					PulsePhase::Shrink if track.hovered => {
						track.phase = PulsePhase::Grow;
						let peak = track.base * style.grow;
						track
							.radius
							.transition_from(track.base, peak, ended, style.leg, Ease::CubicInOut);
					}
					PulsePhase::Shrink | PulsePhase::Settle => return false,
				}
			}
			true
		});
	}

	pub fn is_pulsing(&self, node: NodeIdx) -> bool {
		self.tracks.iter().any(|t| t.node == node && t.hovered)
	}

	pub fn phase(&self, node: NodeIdx) -> Option<PulsePhase> {
		self.track(node).map(|t| t.phase)
	}

	/// Radius override while a track exists for `node`.
	pub fn radius(&self, node: NodeIdx, now: f64) -> Option<f64> {
		self.track(node).map(|t| t.radius.value_at(now))
	}

	pub fn has_glow(&self, node: NodeIdx) -> bool {
		self.track(node).is_some()
	}

	pub fn glow_blur(&self) -> f64 {
		self.style.glow_blur
	}

	pub fn is_idle(&self) -> bool {
		self.tracks.is_empty()
	}

	fn track(&self, node: NodeIdx) -> Option<&PulseTrack> {
		self.tracks.iter().find(|t| t.node == node)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn pulse() -> HaloPulse {
		HaloPulse::new(PulseStyle::default())
	}

	#[test]
	fn grows_then_shrinks() {
		let mut p = pulse();
		p.start(3, 10.0, 0.0);
		assert!(p.has_glow(3));
		assert_eq!(p.radius(3, 0.0), Some(10.0));
		p.advance(700.0);
		assert_eq!(p.phase(3), Some(PulsePhase::Shrink));
		assert_eq!(p.radius(3, 700.0), Some(13.0));
		p.advance(1400.0);
		assert_eq!(p.phase(3), Some(PulsePhase::Grow));
		assert_eq!(p.radius(3, 1400.0), Some(10.0));
	}

	#[test]
	fn loops_while_hovered() {
		let mut p = pulse();
		p.start(0, 10.0, 0.0);
		for frame in 1..=100 {
			p.advance(frame as f64 * 100.0);
		}
		assert!(p.is_pulsing(0));
		let r = p.radius(0, 10_000.0).unwrap();
		assert!((10.0..=13.0).contains(&r));
	}

	#[test]
	fn stop_settles_and_removes_glow() {
		let mut p = pulse();
		p.start(1, 10.0, 0.0);
		p.advance(350.0);
		let mid = p.radius(1, 350.0).unwrap();
		assert!(mid > 10.0 && mid < 13.0);
		p.stop(1, 350.0);
		assert!(!p.is_pulsing(1));
		assert_eq!(p.radius(1, 350.0), Some(mid));
		p.advance(500.0);
		assert!(p.has_glow(1));
		p.advance(550.0);
		assert!(!p.has_glow(1));
		assert!(p.is_idle());
	}

	#[test]
	fn hover_flag_checked_at_cycle_boundary() {
		let mut p = pulse();
		p.start(2, 10.0, 0.0);
		p.advance(700.0);
		// Flag cleared without an explicit stop: the current cycle finishes.
		p.tracks[0].hovered = false;
		p.advance(1000.0);
		assert_eq!(p.phase(2), Some(PulsePhase::Shrink));
		p.advance(1400.0);
		assert!(!p.has_glow(2));
	}

	#[test]
	fn moving_hover_keeps_tracks_independent() {
		let mut p = pulse();
		p.start(0, 10.0, 0.0);
		p.stop(0, 100.0);
		p.start(1, 8.0, 100.0);
		assert!(p.has_glow(0));
		assert!(p.is_pulsing(1));
		assert!(!p.is_pulsing(0));
		p.advance(300.0);
		assert!(!p.has_glow(0));
		assert!(p.is_pulsing(1));
	}
}
