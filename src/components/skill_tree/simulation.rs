//! Alpha-cooled force simulation: link springs, many-body repulsion and a
//! centering shift, integrated with velocity decay. Pinned nodes (`fx`/`fy`)
//! are held in place and excluded from force-driven movement.

use std::f64::consts::PI;

use super::profile::SimulationParameters;
use super::types::{LayoutLink, LayoutNode, Viewport};

const INITIAL_RADIUS: f64 = 10.0;

/// Linear congruential generator used for jiggle on coincident nodes.
#[derive(Clone, Debug)]
struct Lcg(u64);

impl Lcg {
	fn next(&mut self) -> f64 {
		self.0 = (1_664_525 * self.0 + 1_013_904_223) % 4_294_967_296;
		self.0 as f64 / 4_294_967_296.0
	}

	fn jiggle(&mut self) -> f64 {
		(self.next() - 0.5) * 1e-6
	}
}

pub struct Simulation {
	nodes: Vec<LayoutNode>,
	links: Vec<LayoutLink>,
	params: SimulationParameters,
	center: (f64, f64),
	alpha: f64,
	alpha_target: f64,
	running: bool,
	link_bias: Vec<f64>,
	link_strength: Vec<f64>,
	rng: Lcg,
}

impl Simulation {
	/// Seeds positions and starts the simulation hot.
	///
	/// Nodes that already carry `fx`/`fy` start at that position; the rest are
	/// laid out on a phyllotaxis spiral around the viewport centre.
	pub fn new(
		mut nodes: Vec<LayoutNode>,
		links: Vec<LayoutLink>,
		viewport: Viewport,
		params: SimulationParameters,
	) -> Self {
		let center = viewport.center();
		let golden_angle = PI * (3.0 - 5.0_f64.sqrt());
		for (i, node) in nodes.iter_mut().enumerate() {
			let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
			let angle = i as f64 * golden_angle;
			node.x = node.fx.unwrap_or(center.0 + radius * angle.cos());
			node.y = node.fy.unwrap_or(center.1 + radius * angle.sin());
			node.vx = 0.0;
			node.vy = 0.0;
		}

		let mut degree = vec![0usize; nodes.len()];
		for link in &links {
			degree[link.source] += 1;
			degree[link.target] += 1;
		}
		let link_bias = links
			.iter()
			.map(|l| degree[l.source] as f64 / (degree[l.source] + degree[l.target]) as f64)
			.collect();
		let link_strength = links.iter().map(|_| params.link_strength).collect();

		Self {
			nodes,
			links,
			params,
			center,
			alpha: params.alpha,
			alpha_target: params.alpha_target,
			running: true,
			link_bias,
			link_strength,
			rng: Lcg(1),
		}
	}

	pub fn nodes(&self) -> &[LayoutNode] {
		&self.nodes
	}

	pub fn nodes_mut(&mut self) -> &mut [LayoutNode] {
		&mut self.nodes
	}

	pub fn node(&self, idx: usize) -> Option<&LayoutNode> {
		self.nodes.get(idx)
	}

	pub fn node_mut(&mut self, idx: usize) -> Option<&mut LayoutNode> {
		self.nodes.get_mut(idx)
	}

	pub fn links(&self) -> &[LayoutLink] {
		&self.links
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn set_alpha(&mut self, alpha: f64) {
		self.alpha = alpha;
	}

	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target;
	}

	pub fn is_running(&self) -> bool {
		self.running
	}

	/// Resumes ticking without rebuilding nodes or links.
	pub fn restart(&mut self) {
		self.running = true;
	}

	pub fn stop(&mut self) {
		self.running = false;
	}

	/// Advances one tick if running; stops once alpha cools below the minimum.
	/// Returns whether a tick was applied.
	pub fn step(&mut self) -> bool {
		if !self.running {
			return false;
		}
		self.tick();
		if self.alpha < self.params.alpha_min {
			self.running = false;
		}
		true
	}

	/// Applies one tick regardless of the running state.
	pub fn tick(&mut self) {
		self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay;
		self.apply_links();
		self.apply_charge();
		self.apply_center();

		let keep = 1.0 - self.params.velocity_decay;
		for node in &mut self.nodes {
			match node.fx {
				Some(fx) => {
					node.x = fx;
					node.vx = 0.0;
				}
				None => {
					node.vx *= keep;
					node.x += node.vx;
				}
			}
			match node.fy {
				Some(fy) => {
					node.y = fy;
					node.vy = 0.0;
				}
				None => {
					node.vy *= keep;
					node.y += node.vy;
				}
			}
		}
	}

	fn apply_links(&mut self) {
		let distance = self.params.link_distance;
		for (i, link) in self.links.iter().enumerate() {
			let (s, t) = (&self.nodes[link.source], &self.nodes[link.target]);
			let mut x = t.x + t.vx - s.x - s.vx;
			let mut y = t.y + t.vy - s.y - s.vy;
			if x == 0.0 {
				x = self.rng.jiggle();
			}
			if y == 0.0 {
				y = self.rng.jiggle();
			}
			let len = (x * x + y * y).sqrt();
			let l = (len - distance) / len * self.alpha * self.link_strength[i];
			let (x, y) = (x * l, y * l);
			let bias = self.link_bias[i];

			let target = &mut self.nodes[link.target];
			target.vx -= x * bias;
			target.vy -= y * bias;
			let source = &mut self.nodes[link.source];
			source.vx += x * (1.0 - bias);
			source.vy += y * (1.0 - bias);
		}
	}

	fn apply_charge(&mut self) {
		let weight = self.params.charge_strength * self.alpha;
		let min2 = self.params.charge_distance_min2;
		for i in 0..self.nodes.len() {
			let (xi, yi) = (self.nodes[i].x, self.nodes[i].y);
			let (mut dvx, mut dvy) = (0.0, 0.0);
			for j in 0..self.nodes.len() {
				if i == j {
					continue;
				}
				let mut x = self.nodes[j].x - xi;
				let mut y = self.nodes[j].y - yi;
				let mut l = x * x + y * y;
				if x == 0.0 {
					x = self.rng.jiggle();
					l += x * x;
				}
				if y == 0.0 {
					y = self.rng.jiggle();
					l += y * y;
				}
				if l < min2 {
					l = (min2 * l).sqrt();
				}
				dvx += x * weight / l;
				dvy += y * weight / l;
			}
			self.nodes[i].vx += dvx;
			self.nodes[i].vy += dvy;
		}
	}

	fn apply_center(&mut self) {
		if self.nodes.is_empty() {
			return;
		}
		let n = self.nodes.len() as f64;
		let (sx, sy) = self
			.nodes
			.iter()
			.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
		let strength = self.params.center_strength;
		let dx = (sx / n - self.center.0) * strength;
		let dy = (sy / n - self.center.1) * strength;
		for node in &mut self.nodes {
			node.x -= dx;
			node.y -= dy;
		}
	}
}
