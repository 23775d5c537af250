pub mod popup;
pub mod skill_tree;
