//! Hover popup for skill tree nodes.

mod component;
mod coordinator;

pub use component::{Popup, SkillTreeWithPopup};
pub use coordinator::{HIDE_DELAY, PopupContent, PopupCoordinator, PopupView, SHOW_DELAY};
