use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::time::Duration;

use leptos::leptos_dom::helpers::{
	AnimationFrameRequestHandle, TimeoutHandle, request_animation_frame_with_handle,
	set_timeout_with_handle,
};
use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::PointerEvent;

use super::coordinator::{POPUP_MIN_HEIGHT, POPUP_WIDTH, PopupContent, PopupCoordinator, PopupView};
use crate::components::skill_tree::{GraphHandlers, Profile, SkillTreeCanvas, now_ms};
use crate::tree::SkillNode;

type Published = Option<PopupView<PopupContent>>;

/// Connects a [`PopupCoordinator`] to browser timers and publishes its view.
struct PopupDriver {
	coordinator: RefCell<PopupCoordinator<PopupContent>>,
	publish: WriteSignal<Published>,
	timer: Cell<Option<TimeoutHandle>>,
	frame: Cell<Option<AnimationFrameRequestHandle>>,
	pointer_cb: RefCell<Option<Closure<dyn FnMut(PointerEvent)>>>,
}

impl PopupDriver {
	fn new(publish: WriteSignal<Published>) -> Rc<Self> {
		Rc::new(Self {
			coordinator: RefCell::new(PopupCoordinator::default()),
			publish,
			timer: Cell::new(None),
			frame: Cell::new(None),
			pointer_cb: RefCell::new(None),
		})
	}

	fn hover(self: &Rc<Self>, node: &SkillNode, pointer: (f64, f64)) {
		self.coordinator
			.borrow_mut()
			.hover(PopupContent::from_node(node), pointer, now_ms());
		self.sync();
	}

	fn hover_end(self: &Rc<Self>) {
		self.coordinator.borrow_mut().hover_end(now_ms());
		self.sync();
	}

	fn pointer_down(self: &Rc<Self>, at: (f64, f64)) {
		if self.coordinator.borrow_mut().pointer_down(at) {
			self.sync();
		}
	}

	/// Publishes the view, then re-arms the timer and the reveal frame.
	fn sync(self: &Rc<Self>) {
		let (view, deadline, wants_frame) = {
			let c = self.coordinator.borrow();
			(c.view().cloned(), c.next_deadline(), c.wants_frame())
		};
		self.publish.set(view);

		if let Some(handle) = self.timer.take() {
			handle.clear();
		}
		if let Some(deadline) = deadline {
			let weak = Rc::downgrade(self);
			let delay = Duration::from_secs_f64((deadline - now_ms()).max(0.0) / 1000.0);
			match set_timeout_with_handle(move || Self::on_timer(&weak), delay) {
				Ok(handle) => self.timer.set(Some(handle)),
				Err(e) => warn!("popup: failed to schedule timer: {e:?}"),
			}
		}

		if wants_frame && self.frame.get().is_none() {
			let weak = Rc::downgrade(self);
			match request_animation_frame_with_handle(move || Self::on_frame(&weak)) {
				Ok(handle) => self.frame.set(Some(handle)),
				Err(e) => warn!("popup: failed to request frame: {e:?}"),
			}
		}
	}

	fn on_timer(weak: &Weak<Self>) {
		let Some(driver) = weak.upgrade() else {
			return;
		};
		driver.timer.set(None);
		driver.coordinator.borrow_mut().advance(now_ms());
		driver.sync();
	}

	fn on_frame(weak: &Weak<Self>) {
		let Some(driver) = weak.upgrade() else {
			return;
		};
		driver.frame.set(None);
		if driver.coordinator.borrow_mut().next_frame() {
			driver.sync();
		}
	}

	fn teardown(&self) {
		if let Some(handle) = self.timer.take() {
			handle.clear();
		}
		if let Some(handle) = self.frame.take() {
			handle.cancel();
		}
		if let Some(cb) = self.pointer_cb.borrow_mut().take() {
			if let Some(document) = web_sys::window().and_then(|w| w.document()) {
				let _ = document
					.remove_event_listener_with_callback("pointerdown", cb.as_ref().unchecked_ref());
			}
		}
	}
}

struct DriverGuard(Rc<PopupDriver>);

impl Drop for DriverGuard {
	fn drop(&mut self) {
		self.0.teardown();
	}
}

fn popup_style(view: &PopupView<PopupContent>) -> String {
	let (left, top) = view.origin();
	let (opacity, shift) = if view.visible { (1, 0) } else { (0, 8) };
	format!(
		"position: absolute; left: {left}px; top: {top}px; width: {POPUP_WIDTH}px; \
		 min-height: {POPUP_MIN_HEIGHT}px; pointer-events: none; z-index: 50; \
		 opacity: {opacity}; transform: translateY({shift}px); \
		 transition: opacity 200ms ease-out, transform 200ms ease-out;"
	)
}

/// Detail card for the hovered node.
#[component]
pub fn Popup(#[prop(into)] popup: Signal<Published>) -> impl IntoView {
	view! {
		<Show when=move || popup.with(Option::is_some)>
			<div
				class="skill-popup"
				style=move || popup.with(|p| p.as_ref().map(popup_style).unwrap_or_default())
			>
				<h2 class="skill-popup-title">
					{move || popup.with(|p| p.as_ref().map(|p| p.node.title.clone()))}
				</h2>
				<div class="skill-popup-body">
					{move || popup.with(|p| p.as_ref().and_then(|p| p.node.description.clone()))}
				</div>
			</div>
		</Show>
	}
}

/// [`SkillTreeCanvas`] with a debounced hover popup.
#[component]
pub fn SkillTreeWithPopup(
	#[prop(into)] data: Signal<Option<Arc<SkillNode>>>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	#[prop(default = Profile::full())] profile: Profile,
	/// Click and pin callbacks. Hover callbacks are taken over by the popup.
	#[prop(optional)]
	handlers: GraphHandlers,
) -> impl IntoView {
	let container_ref = NodeRef::<leptos::html::Div>::new();
	let (popup, set_popup) = signal(None::<PopupView<PopupContent>>);
	let driver = PopupDriver::new(set_popup);
	StoredValue::new_local(DriverGuard(driver.clone()));

	let weak = Rc::downgrade(&driver);
	let on_pointer_down: Closure<dyn FnMut(PointerEvent)> = Closure::new(move |ev: PointerEvent| {
		let (Some(driver), Some(container)) = (weak.upgrade(), container_ref.get_untracked()) else {
			return;
		};
		let rect = container.get_bounding_client_rect();
		driver.pointer_down((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		));
	});
	match web_sys::window().and_then(|w| w.document()) {
		Some(document) => {
			let _ = document
				.add_event_listener_with_callback("pointerdown", on_pointer_down.as_ref().unchecked_ref());
			*driver.pointer_cb.borrow_mut() = Some(on_pointer_down);
		}
		None => warn!("popup: no document, outside presses will not close the popup"),
	}

	let (hover, hover_end) = (driver.clone(), driver);
	let handlers = handlers
		.on_node_hover(move |node, pointer| hover.hover(node, pointer))
		.on_node_hover_end(move || hover_end.hover_end());

	view! {
		<div node_ref=container_ref class="skill-tree-with-popup" style="position: relative; width: 100%; height: 100%;">
			<SkillTreeCanvas
				data=data
				fullscreen=fullscreen
				width=width
				height=height
				profile=profile
				handlers=handlers
			/>
			<Popup popup=popup />
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn view(visible: bool) -> PopupView<PopupContent> {
		PopupView {
			node: PopupContent {
				title: "Rust".into(),
				description: None,
			},
			anchor: (300.0, 200.0),
			visible,
		}
	}

	#[test]
	fn style_places_frame_at_offset() {
		let style = popup_style(&view(true));
		assert!(style.contains("left: 200px; top: 250px;"));
		assert!(style.contains("opacity: 1; transform: translateY(0px);"));
	}

	#[test]
	fn hidden_popup_is_transparent_and_lowered() {
		let style = popup_style(&view(false));
		assert!(style.contains("opacity: 0; transform: translateY(8px);"));
	}
}
