use std::sync::Arc;

use leptos::prelude::*;

use super::component::SkillTreeCanvas;
use super::profile::Profile;
use crate::tree::SkillNode;

/// Compact, non-interactive rendering of a subtree.
#[component]
pub fn PreviewTree(
	#[prop(into)] data: Signal<Option<Arc<SkillNode>>>,
	#[prop(default = 320.0)] width: f64,
	#[prop(default = 240.0)] height: f64,
) -> impl IntoView {
	view! {
		<div class="skill-tree-preview" style=format!("width: {width}px; height: {height}px;")>
			<SkillTreeCanvas data=data width=Some(width) height=Some(height) profile=Profile::preview() />
		</div>
	}
}
