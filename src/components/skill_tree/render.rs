use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::scale::Rgb;
use super::state::GraphState;

const BACKGROUND: &str = "#f8fafc";
const LABEL_FILL: &str = "#374151";
const LABEL_HALO: &str = "#ffffff";
const LABEL_HALO_WIDTH: f64 = 3.0;

fn rgba(color: Rgb, alpha: f64) -> String {
	let c = |v: f64| v.round().clamp(0.0, 255.0) as u8;
	format!("rgba({}, {}, {}, {})", c(color.r), c(color.g), c(color.b), alpha)
}

/// Redraws the whole scene for the frame at `now`.
pub fn render(state: &GraphState, ctx: &CanvasRenderingContext2d, now: f64) {
	let viewport = state.viewport();
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, viewport.width, viewport.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx, now);
	draw_nodes(state, ctx, now);
	if state.profile.labels.is_some() {
		draw_labels(state, ctx, now);
	}
	ctx.restore();
}

fn draw_edges(state: &GraphState, ctx: &CanvasRenderingContext2d, now: f64) {
	let nodes = state.session.nodes();
	for (i, link) in state.session.links().iter().enumerate() {
		let (Some(source), Some(target)) = (nodes.get(link.source), nodes.get(link.target)) else {
			continue;
		};
		let (opacity, width) = state
			.spotlight
			.link(i)
			.map_or((1.0, 1.0), |v| (v.opacity.value_at(now), v.width.value_at(now)));

		ctx.set_stroke_style_str(&rgba(state.profile.link_color, opacity * state.profile.link_opacity));
		ctx.set_line_width(width);
		ctx.begin_path();
		ctx.move_to(source.x, source.y);
		ctx.line_to(target.x, target.y);
		ctx.stroke();
	}
}

fn draw_nodes(state: &GraphState, ctx: &CanvasRenderingContext2d, now: f64) {
	for node in state.session.nodes() {
		let radius = state.radius_at(node, now);
		let visual = state.spotlight.node(node.index);
		let (opacity, fill) = visual.map_or((1.0, state.profile.fill.color(node.depth)), |v| {
			(v.opacity.value_at(now), v.fill.value_at(now))
		});

		ctx.set_global_alpha(opacity);
		if state.pulse.has_glow(node.index) {
			ctx.set_shadow_blur(state.pulse.glow_blur());
			ctx.set_shadow_color(&fill.to_css());
		}
		ctx.begin_path();
		let _ = ctx.arc(node.x, node.y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&fill.to_css());
		ctx.fill();
		ctx.set_shadow_blur(0.0);

		if let Some((stroke, width)) = state.profile.node_stroke {
			ctx.set_stroke_style_str(&stroke.to_css());
			ctx.set_line_width(width);
			ctx.stroke();
		}
	}
	ctx.set_global_alpha(1.0);
}

fn draw_labels(state: &GraphState, ctx: &CanvasRenderingContext2d, now: f64) {
	let Some(font) = state.profile.labels else {
		return;
	};
	ctx.set_text_align("center");
	ctx.set_line_join("round");
	for node in state.session.nodes() {
		let opacity = state
			.spotlight
			.node(node.index)
			.map_or(1.0, |v| v.label_opacity.value_at(now));
		let y = node.y + font.label_offset(state.base_radius(node), node.depth);

		ctx.set_global_alpha(opacity);
		ctx.set_font(&format!("bold {}px sans-serif", font.font_size(node.depth)));
		ctx.set_stroke_style_str(LABEL_HALO);
		ctx.set_line_width(LABEL_HALO_WIDTH);
		let _ = ctx.stroke_text(&node.name, node.x, y);
		ctx.set_fill_style_str(LABEL_FILL);
		let _ = ctx.fill_text(&node.name, node.x, y);
	}
	ctx.set_global_alpha(1.0);
}
