use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::components::popup::SkillTreeWithPopup;
use crate::components::skill_tree::{GraphHandlers, Profile};
use crate::tree::use_skill_tree;

/// Landing page with the full interactive tree.
#[component]
pub fn Home() -> impl IntoView {
	let tree = use_skill_tree();

	move || {
		if tree.loading.get() {
			return view! { <div class="status">"Loading..."</div> }.into_any();
		}
		if let Some(error) = tree.error.get() {
			return view! { <div class="status error">{error}</div> }.into_any();
		}
		if tree.tree.with(Option::is_none) {
			return view! { <div class="status">"No tree data."</div> }.into_any();
		}

		let profile = tree.layout.with(|layout| Profile::full().with_overrides(layout));
		let navigate = use_navigate();
		let handlers = GraphHandlers::new().on_node_click(move |node| {
			if let Some(slug) = node.path_slug() {
				navigate(&format!("/{slug}"), Default::default());
			}
		});
		view! {
			<div class="home">
				<header class="home-header">
					<h1>"Hi, I'm Faye!"</h1>
				</header>
				<div class="home-tree">
					<SkillTreeWithPopup
						data=tree.tree
						height=Some(600.0)
						profile=profile
						handlers=handlers
					/>
				</div>
			</div>
		}
		.into_any()
	}
}
