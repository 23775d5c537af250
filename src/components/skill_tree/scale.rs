//! Depth-keyed visual scales: node radius, label font, fill colour.

use std::f64::consts::PI;

use super::animation::Lerp;

/// An sRGB colour with unclamped channels in 0..=255.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
	pub r: f64,
	pub g: f64,
	pub b: f64,
}

impl Rgb {
	pub const fn new(r: u8, g: u8, b: u8) -> Self {
		Self {
			r: r as f64,
			g: g as f64,
			b: b as f64,
		}
	}

	/// Scales every channel by `(1 / 0.7)^k`.
	pub fn brighter(self, k: f64) -> Self {
		let f = (1.0 / 0.7_f64).powf(k);
		Self {
			r: self.r * f,
			g: self.g * f,
			b: self.b * f,
		}
	}

	pub fn to_css(self) -> String {
		let c = |v: f64| v.round().clamp(0.0, 255.0) as u8;
		format!("rgb({}, {}, {})", c(self.r), c(self.g), c(self.b))
	}

	fn to_hcl(self) -> Hcl {
		let r = srgb_to_linear(self.r);
		let g = srgb_to_linear(self.g);
		let b = srgb_to_linear(self.b);
		let y = xyz_to_lab((0.222_504_5 * r + 0.716_878_6 * g + 0.060_616_9 * b) / YN);
		let (x, z) = if r == g && g == b {
			(y, y)
		} else {
			(
				xyz_to_lab((0.436_074_7 * r + 0.385_064_9 * g + 0.143_080_4 * b) / XN),
				xyz_to_lab((0.013_932_2 * r + 0.097_104_5 * g + 0.714_173_3 * b) / ZN),
			)
		};
		let (l, a, b) = (116.0 * y - 16.0, 500.0 * (x - y), 200.0 * (y - z));
		let c = (a * a + b * b).sqrt();
		let h = if c < 1e-9 {
			f64::NAN
		} else {
			let deg = b.atan2(a) * 180.0 / PI;
			if deg < 0.0 { deg + 360.0 } else { deg }
		};
		Hcl { h, c, l }
	}
}

impl Lerp for Rgb {
	fn lerp(self, to: Self, t: f64) -> Self {
		Self {
			r: Lerp::lerp(self.r, to.r, t),
			g: Lerp::lerp(self.g, to.g, t),
			b: Lerp::lerp(self.b, to.b, t),
		}
	}
}

const XN: f64 = 0.964_22;
const YN: f64 = 1.0;
const ZN: f64 = 0.825_21;
const T0: f64 = 4.0 / 29.0;
const T1: f64 = 6.0 / 29.0;
const T2: f64 = 3.0 * T1 * T1;
const T3: f64 = T1 * T1 * T1;

fn srgb_to_linear(v: f64) -> f64 {
	let v = v / 255.0;
	if v <= 0.040_45 {
		v / 12.92
	} else {
		((v + 0.055) / 1.055).powf(2.4)
	}
}

fn linear_to_srgb(v: f64) -> f64 {
	255.0
		* if v <= 0.003_130_8 {
			12.92 * v
		} else {
			1.055 * v.powf(1.0 / 2.4) - 0.055
		}
}

fn xyz_to_lab(t: f64) -> f64 {
	if t > T3 { t.cbrt() } else { t / T2 + T0 }
}

fn lab_to_xyz(t: f64) -> f64 {
	if t > T1 { t * t * t } else { T2 * (t - T0) }
}

#[derive(Clone, Copy, Debug)]
struct Hcl {
	h: f64,
	c: f64,
	l: f64,
}

impl Hcl {
	fn to_rgb(self) -> Rgb {
		let h = if self.h.is_nan() { 0.0 } else { self.h * PI / 180.0 };
		let (a, b) = (h.cos() * self.c, h.sin() * self.c);
		let y = (self.l + 16.0) / 116.0;
		let x = XN * lab_to_xyz(y + a / 500.0);
		let z = ZN * lab_to_xyz(y - b / 200.0);
		let y = YN * lab_to_xyz(y);
		Rgb {
			r: linear_to_srgb(3.133_856_1 * x - 1.616_866_7 * y - 0.490_614_6 * z),
			g: linear_to_srgb(-0.978_768_4 * x + 1.916_141_5 * y + 0.033_454_0 * z),
			b: linear_to_srgb(0.071_945_3 * x - 0.228_991_4 * y + 1.405_242_7 * z),
		}
	}
}

/// Interpolates in HCL along the shorter hue arc.
pub fn interpolate_hcl(from: Rgb, to: Rgb, t: f64) -> Rgb {
	let (a, b) = (from.to_hcl(), to.to_hcl());
	let h = match (a.h.is_nan(), b.h.is_nan()) {
		(true, true) => f64::NAN,
		(true, false) => b.h,
		(false, true) => a.h,
		(false, false) => {
			let mut d = b.h - a.h;
			if d.abs() > 180.0 {
				d -= 360.0 * (d / 360.0).round();
			}
			a.h + d * t
		}
	};
	Hcl {
		h,
		c: Lerp::lerp(a.c, b.c, t),
		l: Lerp::lerp(a.l, b.l, t),
	}
	.to_rgb()
}

/// Where a node's base radius comes from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BaseRadius {
	/// The node's own size hint, or `fallback` when it has none.
	SizeHint { fallback: f64 },
	/// The same base for every node.
	Fixed(f64),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadiusScale {
	pub base: BaseRadius,
	pub depth_decay: f64,
	pub min_radius: f64,
}

impl RadiusScale {
	pub fn radius(&self, size_hint: Option<f64>, depth: usize) -> f64 {
		let base = match self.base {
			BaseRadius::SizeHint { fallback } => size_hint.unwrap_or(fallback),
			BaseRadius::Fixed(base) => base,
		};
		(base - depth as f64 * self.depth_decay).max(self.min_radius)
	}
}

/// Label sizing: geometric shrink with depth, floored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontScale {
	pub base: f64,
	pub decay: f64,
	pub min: f64,
}

impl Default for FontScale {
	fn default() -> Self {
		Self {
			base: 26.0,
			decay: 0.7,
			min: 10.0,
		}
	}
}

impl FontScale {
	pub fn font_size(&self, depth: usize) -> f64 {
		(self.base * self.decay.powi(depth as i32)).max(self.min)
	}

	/// Baseline offset below the node centre.
	pub fn label_offset(&self, radius: f64, depth: usize) -> f64 {
		radius + 10.0 + (10.0 - depth as f64 * 2.0).max(0.0)
	}
}

/// Fill colour per depth.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DepthColor {
	/// HCL ramp: `t = 1 - step * depth`, clamped, from `light` (t=0) to `dark` (t=1).
	Ramp { light: Rgb, dark: Rgb, step: f64 },
	Flat(Rgb),
}

pub const LIGHT_BLUE: Rgb = Rgb::new(0x74, 0xd4, 0xfc);
pub const DARK_BLUE: Rgb = Rgb::new(0x20, 0x81, 0xbd);

impl Default for DepthColor {
	fn default() -> Self {
		Self::Ramp {
			light: LIGHT_BLUE,
			dark: DARK_BLUE,
			step: 0.6,
		}
	}
}

impl DepthColor {
	pub fn color(&self, depth: usize) -> Rgb {
		match *self {
			Self::Ramp { light, dark, step } => {
				let t = (1.0 - depth as f64 * step).clamp(0.0, 1.0);
				interpolate_hcl(light, dark, t)
			}
			Self::Flat(color) => color,
		}
	}
}
