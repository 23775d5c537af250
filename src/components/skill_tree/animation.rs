//! Time-based, interruptible transitions on single visual properties.
//!
//! Timestamps are milliseconds on the animation-frame clock. A [`Channel`]
//! holds at most one in-flight tween, so starting a new transition always
//! preempts the old one, picking up from wherever it had got to. Properties
//! animated by different concerns (spotlight opacity/fill, pulse radius)
//! live in different channels and never contend.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ease {
	Linear,
	CubicInOut,
	CubicOut,
}

impl Ease {
	pub fn apply(self, t: f64) -> f64 {
		let t = t.clamp(0.0, 1.0);
		match self {
			Self::Linear => t,
			Self::CubicInOut => {
				if t < 0.5 {
					4.0 * t * t * t
				} else {
					1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
				}
			}
			Self::CubicOut => 1.0 - (1.0 - t).powi(3),
		}
	}
}

pub trait Lerp: Copy {
	fn lerp(self, to: Self, t: f64) -> Self;
}

impl Lerp for f64 {
	fn lerp(self, to: Self, t: f64) -> Self {
		self + (to - self) * t
	}
}

#[derive(Clone, Copy, Debug)]
struct Tween<T> {
	from: T,
	to: T,
	start: f64,
	duration: f64,
	ease: Ease,
}

impl<T: Lerp> Tween<T> {
	fn end(&self) -> f64 {
		self.start + self.duration
	}

	fn sample(&self, now: f64) -> T {
		if self.duration <= 0.0 || now >= self.end() {
			return self.to;
		}
		let t = ((now - self.start) / self.duration).max(0.0);
		self.from.lerp(self.to, self.ease.apply(t))
	}
}

/// One animatable property.
#[derive(Clone, Copy, Debug)]
pub struct Channel<T> {
	value: T,
	tween: Option<Tween<T>>,
}

impl<T: Lerp> Channel<T> {
	pub fn new(value: T) -> Self {
		Self { value, tween: None }
	}

	pub fn value_at(&self, now: f64) -> T {
		match &self.tween {
			Some(tween) => tween.sample(now),
			None => self.value,
		}
	}

	/// Final value once any running transition completes.
	pub fn target(&self) -> T {
		self.tween.as_ref().map_or(self.value, |t| t.to)
	}

	pub fn is_animating(&self) -> bool {
		self.tween.is_some()
	}

	/// Starts a transition from the value at `now`, replacing any other.
	pub fn transition(&mut self, to: T, now: f64, duration: f64, ease: Ease) {
		self.transition_from(self.value_at(now), to, now, duration, ease);
	}

	pub fn transition_from(&mut self, from: T, to: T, start: f64, duration: f64, ease: Ease) {
		self.value = from;
		self.tween = Some(Tween {
			from,
			to,
			start,
			duration,
			ease,
		});
	}

	/// Freezes the property at its value at `now`.
	pub fn interrupt(&mut self, now: f64) {
		self.value = self.value_at(now);
		self.tween = None;
	}

	/// Jumps to `value` with no transition.
	pub fn set(&mut self, value: T) {
		self.value = value;
		self.tween = None;
	}

	/// Commits a tween that has ended by `now`, returning its end time.
	pub fn settle(&mut self, now: f64) -> Option<f64> {
		let tween = self.tween?;
		if now < tween.end() {
			return None;
		}
		self.value = tween.to;
		self.tween = None;
		Some(tween.end())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn easing_endpoints() {
		for ease in [Ease::Linear, Ease::CubicInOut, Ease::CubicOut] {
			assert_eq!(ease.apply(0.0), 0.0);
			assert_eq!(ease.apply(1.0), 1.0);
			assert_eq!(ease.apply(2.0), 1.0);
		}
		assert_eq!(Ease::CubicInOut.apply(0.5), 0.5);
		assert!(Ease::CubicOut.apply(0.5) > 0.5);
	}

	#[test]
	fn transition_samples_and_settles() {
		let mut ch = Channel::new(0.0);
		ch.transition(1.0, 100.0, 200.0, Ease::Linear);
		assert_eq!(ch.value_at(100.0), 0.0);
		assert_eq!(ch.value_at(200.0), 0.5);
		assert_eq!(ch.target(), 1.0);
		assert_eq!(ch.settle(250.0), None);
		assert_eq!(ch.settle(300.0), Some(300.0));
		assert!(!ch.is_animating());
		assert_eq!(ch.value_at(1000.0), 1.0);
	}

	#[test]
	fn new_transition_preempts_from_current_value() {
		let mut ch = Channel::new(1.0);
		ch.transition(0.0, 0.0, 100.0, Ease::Linear);
		ch.transition(1.0, 50.0, 100.0, Ease::Linear);
		assert_eq!(ch.value_at(50.0), 0.5);
		assert_eq!(ch.value_at(100.0), 0.75);
		assert_eq!(ch.target(), 1.0);
	}

	#[test]
	fn interrupt_freezes() {
		let mut ch = Channel::new(0.0);
		ch.transition(10.0, 0.0, 100.0, Ease::Linear);
		ch.interrupt(30.0);
		assert_eq!(ch.value_at(90.0), 3.0);
		assert!(!ch.is_animating());
	}
}
