use std::sync::Arc;

use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_params_map;

use crate::components::skill_tree::PreviewTree;
use crate::tree::{SkillNode, use_skill_tree};

/// Detail page for the node at `/*path`.
#[component]
pub fn SkillPage() -> impl IntoView {
	let tree = use_skill_tree();
	let params = use_params_map();

	move || {
		let path = params.read().get("path").unwrap_or_default();
		if tree.tree.with(Option::is_none) {
			return view! { <div class="status">"No tree data."</div> }.into_any();
		}
		match tree.node_by_path(&path) {
			Some(node) => view! { <SkillDetail node=node /> }.into_any(),
			None => view! {
				<div class="status">
					<h1>"Not found"</h1>
					<p class="path">"/"{path}</p>
				</div>
			}
			.into_any(),
		}
	}
}

#[component]
fn SkillDetail(node: SkillNode) -> impl IntoView {
	let children = node
		.children
		.iter()
		.filter_map(|child| {
			let slug = child.path_slug()?;
			let href = format!("/{slug}");
			let name = child.name.clone();
			Some(view! { <li><A href=href>{name}</A></li> })
		})
		.collect_view();
	let name = node.name.clone();
	let description = node.description.clone();
	let subtree = Arc::new(node);

	view! {
		<article class="skill-page">
			<h1>{name}</h1>
			<p class="description">{description}</p>
			<PreviewTree data=Signal::derive(move || Some(subtree.clone())) />
			<ul class="children">{children}</ul>
		</article>
	}
}
