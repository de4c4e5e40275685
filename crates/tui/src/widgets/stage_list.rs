//! Stage list for the live dashboard.
//!
//! One row per stage with its status color. Completed stages get a check
//! mark, the active stage a spinner and an "Active" badge, and the selected
//! row is highlighted.

use gta_protocol::ipc::PipelineSnapshot;
use gta_protocol::stage_models::{Stage, StageStatus};
use ratatui::layout::Constraint;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Cell;
use ratatui::widgets::Row;
use ratatui::widgets::Table;
use ratatui::widgets::TableState;
use ratatui::Frame;

use super::{status_color, SPINNER};

/// Renders the pipeline stages as a table.
///
/// `spinner_frame` picks the spinner glyph for the processing stage.
pub fn render_stage_list(
    frame: &mut Frame,
    area: Rect,
    snapshot: &PipelineSnapshot,
    spinner_frame: usize,
) {
    let rows: Vec<Row> = snapshot
        .stages
        .iter()
        .map(|stage| {
            let active = snapshot.active_stage_id == Some(stage.id);
            let status_style = Style::default().fg(status_color(stage.status));

            Row::new(vec![
                Cell::from(stage_icon(stage, spinner_frame)).style(status_style),
                Cell::from(format!("{}", stage.id)),
                Cell::from(stage.name.clone()),
                Cell::from(stage.agent_name.clone()),
                Cell::from(stage.status.label()).style(status_style),
                Cell::from(if active { "Active" } else { "" }).style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
            ])
        })
        .collect();

    let header = Row::new(vec![
        Cell::from(""),
        Cell::from("#"),
        Cell::from("Stage"),
        Cell::from("Agent"),
        Cell::from("Status"),
        Cell::from(""),
    ])
    .style(
        Style::default()
            .add_modifier(Modifier::BOLD)
            .fg(Color::Cyan),
    );

    let widths = [
        Constraint::Length(2),
        Constraint::Length(3),
        Constraint::Percentage(40),
        Constraint::Percentage(30),
        Constraint::Length(11),
        Constraint::Length(7),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Pipeline Stages")
                .style(Style::default().fg(Color::White)),
        )
        .row_highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");

    let mut table_state = TableState::default();
    table_state.select(
        snapshot
            .stages
            .iter()
            .position(|s| s.id == snapshot.selected_stage_id),
    );

    frame.render_stateful_widget(table, area, &mut table_state);
}

fn stage_icon(stage: &Stage, spinner_frame: usize) -> &'static str {
    match stage.status {
        StageStatus::Completed => "✔",
        StageStatus::Processing => SPINNER[spinner_frame % SPINNER.len()],
        StageStatus::Error => "✖",
        StageStatus::Idle => "·",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gta_core::state::StageStore;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn render(snapshot: &PipelineSnapshot) -> Terminal<TestBackend> {
        let backend = TestBackend::new(100, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render_stage_list(frame, frame.area(), snapshot, 0))
            .unwrap();
        terminal
    }

    fn content(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_render_stage_list_shows_every_stage() {
        let snapshot = StageStore::with_catalog().snapshot();

        let terminal = render(&snapshot);
        let content = content(&terminal);

        assert!(content.contains("Pipeline Stages"));
        for stage in &snapshot.stages {
            assert!(content.contains(&stage.name), "missing {}", stage.name);
        }
        assert!(content.contains("idle"));
        assert!(!content.contains("Active"));
    }

    #[test]
    fn test_render_stage_list_marks_active_and_completed() {
        let mut snapshot = StageStore::with_catalog().snapshot();
        snapshot.running = true;
        snapshot.active_stage_id = Some(2);
        if let Some(stage) = snapshot.stage_mut(1) {
            stage.status = StageStatus::Completed;
        }
        if let Some(stage) = snapshot.stage_mut(2) {
            stage.status = StageStatus::Processing;
        }

        let terminal = render(&snapshot);
        let content = content(&terminal);

        assert!(content.contains("✔"));
        assert!(content.contains("processing"));
        assert!(content.contains("Active"));
    }

    #[test]
    fn test_render_stage_list_highlights_selection() {
        let mut snapshot = StageStore::with_catalog().snapshot();
        snapshot.selected_stage_id = 3;

        let terminal = render(&snapshot);
        let buffer = terminal.backend().buffer();

        // Border, header, then stages 1..=6
        let x: u16 = 5;
        let selected_row: u16 = 1 + 1 + 2;
        let cell = &buffer[(x, selected_row)];
        assert_eq!(cell.bg, Color::Blue);
        let other = &buffer[(x, selected_row + 1)];
        assert_ne!(other.bg, Color::Blue);
    }
}
