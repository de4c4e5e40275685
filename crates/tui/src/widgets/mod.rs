//! TUI widgets.
//!
//! The dashboard view is the stage list plus the detail panel; the
//! blueprint view owns its own node focus and drawer state.

pub mod blueprint;
pub mod detail_view;
pub mod stage_list;

pub use blueprint::BlueprintView;
pub use detail_view::DetailView;
pub use stage_list::render_stage_list;

use gta_protocol::stage_models::StageStatus;
use ratatui::style::Color;

/// Frames of the processing spinner.
pub const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Color used for a stage status everywhere in the UI.
pub fn status_color(status: StageStatus) -> Color {
    match status {
        StageStatus::Idle => Color::DarkGray,
        StageStatus::Processing => Color::Yellow,
        StageStatus::Completed => Color::Green,
        StageStatus::Error => Color::Red,
    }
}
