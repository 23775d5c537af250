use std::sync::Arc;

use leptos::prelude::*;
use log::error;

use super::source::{self, LayoutOverrides};
use super::{SkillNode, build_tree};

/// Reactive tree state shared with every page below [`SkillTreeProvider`].
#[derive(Clone, Copy)]
pub struct SkillTreeState {
	pub tree: ReadSignal<Option<Arc<SkillNode>>>,
	pub loading: ReadSignal<bool>,
	pub error: ReadSignal<Option<String>>,
	pub layout: ReadSignal<LayoutOverrides>,
}

impl SkillTreeState {
	/// Looks up a node by slug path; see [`SkillNode::node_by_path`].
	pub fn node_by_path(&self, path: &str) -> Option<SkillNode> {
		self.tree
			.with(|tree| tree.as_ref().and_then(|root| root.node_by_path(path).cloned()))
	}
}

/// Loads the embedded tree once and provides [`SkillTreeState`] as context.
#[component]
pub fn SkillTreeProvider(
	#[prop(default = source::TREE_DATA_ELEMENT)] source_id: &'static str,
	children: Children,
) -> impl IntoView {
	let (tree, set_tree) = signal(None::<Arc<SkillNode>>);
	let (loading, set_loading) = signal(true);
	let (error, set_error) = signal(None::<String>);
	let (layout, set_layout) = signal(LayoutOverrides::default());

	match source::load_from_document(source_id) {
		Ok(payload) => {
			set_tree.set(build_tree(&payload.rows).map(Arc::new));
			set_layout.set(payload.layout);
		}
		Err(e) => {
			error!("Failed to fetch tree: {e}");
			set_tree.set(None);
			set_error.set(Some("Failed to fetch skill tree.".into()));
		}
	}
	set_loading.set(false);

	provide_context(SkillTreeState {
		tree,
		loading,
		error,
		layout,
	});
	children()
}

/// The provided tree state. Panics outside a [`SkillTreeProvider`].
pub fn use_skill_tree() -> SkillTreeState {
	expect_context::<SkillTreeState>()
}
