//! Canvas rendering of a skill tree laid out by a force simulation.

mod animation;
mod component;
mod drag;
mod preview;
mod profile;
mod pulse;
mod render;
pub mod scale;
mod session;
mod simulation;
mod spotlight;
mod state;
mod types;

pub use component::{GraphHandlers, SkillTreeCanvas};
pub(crate) use component::now_ms;
pub use drag::{CLICK_TOLERANCE, DRAG_ALPHA_TARGET};
pub use preview::PreviewTree;
pub use profile::{Profile, PulseStyle, SimulationParameters, SpotlightStyle};
pub use state::{GraphEvent, GraphState};
pub use types::{LayoutLink, LayoutNode, Viewport};
