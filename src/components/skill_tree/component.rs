use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::Arc;

use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::drag::{Modifiers, PointerPress};
use super::profile::Profile;
use super::render;
use super::state::{Frame, GraphEvent, GraphSlot};
use super::types::Viewport;
use crate::tree::{Pin, SkillNode};

type NodeHandler = Rc<dyn Fn(&SkillNode)>;
type HoverHandler = Rc<dyn Fn(&SkillNode, (f64, f64))>;
type PinHandler = Rc<dyn Fn(&SkillNode, Pin)>;

/// Callbacks from the graph to the embedding page. Hover positions are in
/// canvas pixels.
#[derive(Clone, Default)]
pub struct GraphHandlers {
	on_node_click: Option<NodeHandler>,
	on_node_hover: Option<HoverHandler>,
	on_node_hover_end: Option<Rc<dyn Fn()>>,
	on_node_pinned: Option<PinHandler>,
}

impl GraphHandlers {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn on_node_click(mut self, f: impl Fn(&SkillNode) + 'static) -> Self {
		self.on_node_click = Some(Rc::new(f));
		self
	}

	pub fn on_node_hover(mut self, f: impl Fn(&SkillNode, (f64, f64)) + 'static) -> Self {
		self.on_node_hover = Some(Rc::new(f));
		self
	}

	pub fn on_node_hover_end(mut self, f: impl Fn() + 'static) -> Self {
		self.on_node_hover_end = Some(Rc::new(f));
		self
	}

	pub fn on_node_pinned(mut self, f: impl Fn(&SkillNode, Pin) + 'static) -> Self {
		self.on_node_pinned = Some(Rc::new(f));
		self
	}
}

/// Milliseconds on the same clock as animation-frame timestamps.
pub(crate) fn now_ms() -> f64 {
	web_sys::window()
		.and_then(|w| w.performance())
		.map_or_else(js_sys::Date::now, |p| p.now())
}

fn pointer_press(ev: &MouseEvent) -> PointerPress {
	PointerPress {
		button: ev.button(),
		modifiers: Modifiers {
			alt: ev.alt_key(),
			ctrl: ev.ctrl_key(),
			meta: ev.meta_key(),
			shift: ev.shift_key(),
		},
	}
}

fn measure(
	window: &Window,
	canvas: &HtmlCanvasElement,
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
) -> Viewport {
	if fullscreen {
		let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
		return Viewport::new(dim(window.inner_width()), dim(window.inner_height()));
	}
	let parent = canvas.parent_element();
	Viewport::new(
		width.unwrap_or_else(|| parent.as_ref().map_or(800.0, |p| p.client_width() as f64)),
		height.unwrap_or_else(|| parent.as_ref().map_or(600.0, |p| p.client_height() as f64)),
	)
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok().flatten()?.dyn_into().ok()
}

/// Mutable state behind one mounted canvas: the layout slot plus the JS
/// callbacks that drive it.
struct CanvasRuntime {
	profile: Profile,
	handlers: GraphHandlers,
	root: RefCell<Option<Arc<SkillNode>>>,
	slot: RefCell<GraphSlot>,
	ctx: RefCell<Option<CanvasRenderingContext2d>>,
	frame_id: Cell<Option<i32>>,
	animate: RefCell<Option<Closure<dyn FnMut(f64)>>>,
	resize_cb: RefCell<Option<Closure<dyn FnMut()>>>,
}

impl CanvasRuntime {
	fn new(profile: Profile, handlers: GraphHandlers) -> Rc<Self> {
		Rc::new(Self {
			profile,
			handlers,
			root: RefCell::new(None),
			slot: RefCell::new(GraphSlot::default()),
			ctx: RefCell::new(None),
			frame_id: Cell::new(None),
			animate: RefCell::new(None),
			resize_cb: RefCell::new(None),
		})
	}

	/// Replaces the layout for `viewport` and restarts the frame loop bound
	/// to the new generation. A hover lost with the old layout is reported
	/// to the handlers.
	fn rebuild(self: &Rc<Self>, viewport: Viewport) {
		self.cancel_frame();
		let root = self.root.borrow().clone();
		let mut events = Vec::new();
		let generation = self
			.slot
			.borrow_mut()
			.rebuild(root, viewport, self.profile.clone(), &mut events);
		self.deliver(events.into_iter().map(|event| (event, None)).collect());

		let weak: Weak<Self> = Rc::downgrade(self);
		*self.animate.borrow_mut() = Some(Closure::new(move |now: f64| {
			if let Some(rt) = weak.upgrade() {
				rt.on_frame(generation, now);
			}
		}));
		self.request_frame();
	}

	fn on_frame(&self, generation: u64, now: f64) {
		self.frame_id.set(None);
		if self.slot.borrow_mut().frame(generation, now) == Frame::Stale {
			return;
		}
		let slot = self.slot.borrow();
		let ctx = self.ctx.borrow();
		let Some(ctx) = ctx.as_ref() else {
			return;
		};
		match slot.state() {
			Some(state) => render::render(state, ctx, now),
			None => {
				if let Some(canvas) = ctx.canvas() {
					ctx.clear_rect(0.0, 0.0, canvas.width() as f64, canvas.height() as f64);
				}
				return;
			}
		}
		drop(slot);
		self.request_frame();
	}

	fn request_frame(&self) {
		let Some(window) = web_sys::window() else {
			return;
		};
		if let Some(cb) = self.animate.borrow().as_ref() {
			if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
				self.frame_id.set(Some(id));
			}
		}
	}

	fn cancel_frame(&self) {
		if let (Some(id), Some(window)) = (self.frame_id.take(), web_sys::window()) {
			let _ = window.cancel_animation_frame(id);
		}
	}

	fn listen_resize(self: &Rc<Self>, window: &Window, canvas: HtmlCanvasElement) {
		let weak = Rc::downgrade(self);
		let cb: Closure<dyn FnMut()> = Closure::new(move || {
			let (Some(rt), Some(window)) = (weak.upgrade(), web_sys::window()) else {
				return;
			};
			let viewport = measure(&window, &canvas, true, None, None);
			canvas.set_width(viewport.width as u32);
			canvas.set_height(viewport.height as u32);
			rt.rebuild(viewport);
		});
		let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		*self.resize_cb.borrow_mut() = Some(cb);
	}

	/// Runs `f` against the mounted graph, then delivers the events it
	/// produced once every internal borrow is released.
	fn with_graph(&self, f: impl FnOnce(&mut super::state::GraphState, &mut Vec<GraphEvent>)) {
		let mut events = Vec::new();
		let resolved: Vec<(GraphEvent, Option<SkillNode>)> = {
			let mut slot = self.slot.borrow_mut();
			let Some(state) = slot.state_mut() else {
				return;
			};
			f(state, &mut events);
			events
				.into_iter()
				.map(|event| {
					let node = match &event {
						GraphEvent::HoverStart { node, .. }
						| GraphEvent::HoverEnd { node }
						| GraphEvent::Click { node }
						| GraphEvent::Pinned { node, .. } => state.session.skill_node(*node).cloned(),
					};
					(event, node)
				})
				.collect()
		};
		self.deliver(resolved);
	}

	fn deliver(&self, resolved: Vec<(GraphEvent, Option<SkillNode>)>) {
		let handlers = &self.handlers;
		for (event, node) in resolved {
			match (event, node) {
				(GraphEvent::HoverStart { pointer, .. }, Some(node)) => {
					if let Some(cb) = &handlers.on_node_hover {
						cb(&node, pointer);
					}
				}
				(GraphEvent::HoverEnd { .. }, _) => {
					if let Some(cb) = &handlers.on_node_hover_end {
						cb();
					}
				}
				(GraphEvent::Click { .. }, Some(node)) => {
					if let Some(cb) = &handlers.on_node_click {
						cb(&node);
					}
				}
				(GraphEvent::Pinned { pin, .. }, Some(node)) => {
					if let Some(cb) = &handlers.on_node_pinned {
						cb(&node, pin);
					}
				}
				_ => {}
			}
		}
	}

	/// Stops the simulation, the frame loop and window listeners.
	fn teardown(&self) {
		self.cancel_frame();
		self.animate.borrow_mut().take();
		// Handlers may already be disposed on unmount, so the lost hover is dropped.
		self.slot.borrow_mut().teardown(&mut Vec::new());
		if let Some(cb) = self.resize_cb.borrow_mut().take() {
			if let Some(window) = web_sys::window() {
				let _ =
					window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
	}
}

/// Tears the runtime down when the owning component is disposed.
struct RuntimeGuard(Rc<CanvasRuntime>);

impl Drop for RuntimeGuard {
	fn drop(&mut self) {
		self.0.teardown();
	}
}

#[component]
pub fn SkillTreeCanvas(
	#[prop(into)] data: Signal<Option<Arc<SkillNode>>>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	#[prop(default = Profile::full())] profile: Profile,
	#[prop(optional)] handlers: GraphHandlers,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let interactive = profile.interactive;
	let runtime = CanvasRuntime::new(profile, handlers);
	StoredValue::new_local(RuntimeGuard(runtime.clone()));

	let rt = runtime.clone();
	Effect::new(move |_| {
		let root = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			warn!("skill tree: no window, not rendering");
			return;
		};

		let viewport = measure(&window, &canvas, fullscreen, width, height);
		canvas.set_width(viewport.width as u32);
		canvas.set_height(viewport.height as u32);
		if rt.ctx.borrow().is_none() {
			let Some(ctx) = context_2d(&canvas) else {
				warn!("skill tree: canvas has no 2d context");
				return;
			};
			*rt.ctx.borrow_mut() = Some(ctx);
		}

		*rt.root.borrow_mut() = root;
		rt.rebuild(viewport);
		if fullscreen && rt.resize_cb.borrow().is_none() {
			rt.listen_resize(&window, canvas);
		}
	});

	let point = move |ev: &MouseEvent| -> Option<(f64, f64)> {
		let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
		let rect = canvas.get_bounding_client_rect();
		Some((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};

	let rt_md = runtime.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = point(&ev) else {
			return;
		};
		let (press, now) = (pointer_press(&ev), now_ms());
		rt_md.with_graph(|s, events| s.pointer_down(press, x, y, now, events));
	};

	let rt_mm = runtime.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = point(&ev) else {
			return;
		};
		let now = now_ms();
		rt_mm.with_graph(|s, events| s.pointer_move(x, y, now, events));
	};

	let rt_mu = runtime.clone();
	let on_mouseup = move |_: MouseEvent| {
		rt_mu.with_graph(|s, events| s.pointer_up(events));
	};

	let rt_ml = runtime.clone();
	let on_mouseleave = move |_: MouseEvent| {
		let now = now_ms();
		rt_ml.with_graph(|s, events| s.pointer_leave(now, events));
	};

	let rt_wh = runtime;
	let on_wheel = move |ev: WheelEvent| {
		if !interactive {
			return;
		}
		ev.prevent_default();
		let Some((x, y)) = point(&ev) else {
			return;
		};
		let delta = ev.delta_y();
		rt_wh.with_graph(|s, _| s.wheel(x, y, delta));
	};

	let cursor = if interactive { "grab" } else { "default" };
	view! {
		<div class="skill-tree" style="position: relative; width: 100%; height: 100%;">
			<canvas
				node_ref=canvas_ref
				class="skill-tree-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style=move || {
					let display = if data.with(Option::is_none) { "none" } else { "block" };
					format!("display: {display}; cursor: {cursor};")
				}
			/>
			<Show when=move || data.with(Option::is_none)>
				<div class="skill-tree-empty">
					<p>"No tree data."</p>
				</div>
			</Show>
		</div>
	}
}
