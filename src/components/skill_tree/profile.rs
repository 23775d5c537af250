//! Tunables for the full graph and the compact preview.

use crate::tree::LayoutOverrides;

use super::animation::Ease;
use super::scale::{BaseRadius, DepthColor, FontScale, RadiusScale, Rgb};

pub const LINK_COLOR: Rgb = Rgb::new(0xcb, 0xd5, 0xe1);
pub const PREVIEW_FILL: Rgb = Rgb::new(0x3b, 0x82, 0xf6);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationParameters {
	pub alpha: f64,
	pub alpha_min: f64,
	pub alpha_decay: f64,
	pub alpha_target: f64,
	pub velocity_decay: f64,
	pub link_distance: f64,
	pub link_strength: f64,
	pub charge_strength: f64,
	pub charge_distance_min2: f64,
	pub center_strength: f64,
}

impl Default for SimulationParameters {
	fn default() -> Self {
		let alpha_min = 0.001_f64;
		Self {
			alpha: 1.0,
			alpha_min,
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			alpha_target: 0.0,
			velocity_decay: 0.4,
			link_distance: 30.0,
			link_strength: 1.0,
			charge_strength: -30.0,
			charge_distance_min2: 1.0,
			center_strength: 1.0,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpotlightStyle {
	pub duration: f64,
	pub ease: Ease,
	pub faded_opacity: f64,
	pub brighten: f64,
	pub link_faded_opacity: f64,
	pub link_width: f64,
	pub link_focus_width: f64,
}

impl Default for SpotlightStyle {
	fn default() -> Self {
		Self {
			duration: 320.0,
			ease: Ease::CubicInOut,
			faded_opacity: 0.5,
			brighten: 0.35,
			link_faded_opacity: 0.25,
			link_width: 1.0,
			link_focus_width: 2.5,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PulseStyle {
	pub grow: f64,
	pub leg: f64,
	pub settle: f64,
	pub glow_blur: f64,
}

impl Default for PulseStyle {
	fn default() -> Self {
		Self {
			grow: 1.3,
			leg: 700.0,
			settle: 200.0,
			glow_blur: 8.0,
		}
	}
}

/// Everything that differs between the full graph and the preview.
#[derive(Clone, Debug, PartialEq)]
pub struct Profile {
	pub simulation: SimulationParameters,
	pub radius: RadiusScale,
	pub labels: Option<FontScale>,
	pub fill: DepthColor,
	pub node_stroke: Option<(Rgb, f64)>,
	pub link_color: Rgb,
	pub link_opacity: f64,
	pub spotlight: SpotlightStyle,
	pub pulse: PulseStyle,
	pub interactive: bool,
}

impl Profile {
	pub fn full() -> Self {
		Self {
			simulation: SimulationParameters {
				link_distance: 100.0,
				charge_strength: -300.0,
				..Default::default()
			},
			radius: RadiusScale {
				base: BaseRadius::SizeHint { fallback: 20.0 },
				depth_decay: 2.0,
				min_radius: 4.0,
			},
			labels: Some(FontScale::default()),
			fill: DepthColor::default(),
			node_stroke: Some((Rgb::new(0xff, 0xff, 0xff), 2.0)),
			link_color: LINK_COLOR,
			link_opacity: 1.0,
			spotlight: SpotlightStyle {
				faded_opacity: 0.4,
				..Default::default()
			},
			pulse: PulseStyle::default(),
			interactive: true,
		}
	}

	pub fn preview() -> Self {
		Self {
			simulation: SimulationParameters {
				link_distance: 6.0,
				charge_strength: -40.0,
				..Default::default()
			},
			radius: RadiusScale {
				base: BaseRadius::Fixed(6.0),
				depth_decay: 1.8,
				min_radius: 2.0,
			},
			labels: None,
			fill: DepthColor::Flat(PREVIEW_FILL),
			node_stroke: None,
			link_color: LINK_COLOR,
			link_opacity: 0.7,
			spotlight: SpotlightStyle::default(),
			pulse: PulseStyle::default(),
			interactive: false,
		}
	}

	pub fn with_overrides(mut self, overrides: &LayoutOverrides) -> Self {
		if let Some(distance) = overrides.link_distance {
			self.simulation.link_distance = distance;
		}
		if let Some(charge) = overrides.charge {
			self.simulation.charge_strength = charge;
		}
		if let Some(opacity) = overrides.faded_opacity {
			self.spotlight.faded_opacity = opacity.clamp(0.0, 1.0);
		}
		self
	}
}

impl Default for Profile {
	fn default() -> Self {
		Self::full()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn overrides_apply_to_full() {
		let profile = Profile::full().with_overrides(&LayoutOverrides {
			link_distance: Some(80.0),
			charge: None,
			faded_opacity: Some(3.0),
		});
		assert_eq!(profile.simulation.link_distance, 80.0);
		assert_eq!(profile.simulation.charge_strength, -300.0);
		assert_eq!(profile.spotlight.faded_opacity, 1.0);
	}

	#[test]
	fn alpha_decay_reaches_min_in_300_ticks() {
		let p = SimulationParameters::default();
		let alpha = (0..300).fold(p.alpha, |a, _| a + (p.alpha_target - a) * p.alpha_decay);
		assert!((alpha - p.alpha_min).abs() < 1e-9);
	}
}
