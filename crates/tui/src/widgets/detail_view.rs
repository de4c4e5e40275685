//! Detail panel for the selected stage.
//!
//! Shows the agent card on top, then the activity log and the generated
//! artifacts side by side. The activity log scrolls (PageUp/PageDown,
//! Home/End) and follows new lines until the user scrolls up.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use gta_protocol::stage_models::{Stage, StageStatus};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
    Frame,
};

use super::status_color;
use crate::event::EventStatus;
use std::cell::Cell;

/// Lines moved by PageUp/PageDown.
pub const PAGE_SIZE: usize = 5;

const ARTIFACT_NOTE: &str = "[Detailed analysis data would appear here, including specific codes, \
categorical relationships, or theoretical memos extracted from the source material.]";

/// Widget for displaying the selected stage with a scrollable log.
pub struct DetailView {
    /// Lines scrolled from the top of the activity log.
    pub scroll_offset: usize,
    /// Keep the newest log line in view.
    pub follow: bool,
    /// Log viewport height from the last draw.
    viewport: Cell<usize>,
}

impl DetailView {
    pub fn new() -> Self {
        Self {
            scroll_offset: 0,
            follow: true,
            viewport: Cell::new(0),
        }
    }

    /// Render the panel for `stage`.
    ///
    /// `cursor_on` toggles the blinking cursor under a processing log.
    pub fn render(&self, frame: &mut Frame, area: Rect, stage: Option<&Stage>, cursor_on: bool) {
        let Some(stage) = stage else {
            let placeholder = Paragraph::new("Select a stage to view details")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(placeholder, area);
            return;
        };

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Min(5)])
            .split(area);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);

        self.render_agent_card(frame, rows[0], stage);
        self.render_activity_log(frame, columns[0], stage, cursor_on);
        self.render_artifacts(frame, columns[1], stage);
    }

    fn render_agent_card(&self, frame: &mut Frame, area: Rect, stage: &Stage) {
        let lines = vec![
            Line::from(Span::styled(
                stage.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                Span::raw(format!("Agent: {}", stage.agent_name)),
                Span::raw("  "),
                Span::styled(
                    stage.status.label(),
                    Style::default().fg(status_color(stage.status)),
                ),
            ]),
            Line::from(Span::styled(
                stage.description.clone(),
                Style::default().fg(Color::Gray),
            )),
        ];

        let card = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Agent"));
        frame.render_widget(card, area);
    }

    fn render_activity_log(&self, frame: &mut Frame, area: Rect, stage: &Stage, cursor_on: bool) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Agent Activity Log");

        if stage.logs.is_empty() {
            let waiting = Paragraph::new("Waiting for process to start...")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(waiting, area);
            return;
        }

        let prompt = Style::default().fg(Color::DarkGray);
        let mut lines: Vec<Line> = stage
            .logs
            .iter()
            .map(|log| {
                Line::from(vec![
                    Span::styled("$ ", prompt),
                    Span::styled(log.clone(), Style::default().fg(Color::Green)),
                ])
            })
            .collect();
        if stage.status == StageStatus::Processing {
            lines.push(Line::from(Span::styled(
                if cursor_on { "█" } else { " " },
                Style::default().fg(Color::Green),
            )));
        }

        let total_lines = lines.len();
        let visible_lines = area.height.saturating_sub(2) as usize;
        self.viewport.set(visible_lines);
        let offset = self.effective_offset(total_lines, visible_lines);

        let paragraph = Paragraph::new(lines)
            .block(block)
            .scroll((offset as u16, 0));
        frame.render_widget(paragraph, area);

        if total_lines > visible_lines {
            let mut scrollbar_state = ScrollbarState::default()
                .content_length(total_lines)
                .viewport_content_length(visible_lines)
                .position(offset);

            let scrollbar = Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"));

            frame.render_stateful_widget(scrollbar, area, &mut scrollbar_state);
        }
    }

    fn render_artifacts(&self, frame: &mut Frame, area: Rect, stage: &Stage) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Generated Artifacts");

        let paragraph = match &stage.output {
            Some(output) => Paragraph::new(vec![
                Line::from(Span::styled(
                    "Output Generated",
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(output.clone(), Style::default().fg(Color::Cyan))),
                Line::from(""),
                Line::from(Span::styled(ARTIFACT_NOTE, Style::default().fg(Color::Gray))),
            ])
            .wrap(Wrap { trim: true }),
            None => Paragraph::new("No output generated yet")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray)),
        };

        frame.render_widget(paragraph.block(block), area);
    }

    /// The offset actually used when drawing `total_lines` in a viewport of
    /// `visible_lines`.
    pub fn effective_offset(&self, total_lines: usize, visible_lines: usize) -> usize {
        let max = total_lines.saturating_sub(visible_lines);
        if self.follow {
            max
        } else {
            self.scroll_offset.min(max)
        }
    }

    /// One line towards the top. Stops following new log lines.
    pub fn scroll_up(&mut self) {
        self.follow = false;
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    /// Scroll down by one line, up to `max`.
    pub fn scroll_down(&mut self, max: usize) {
        self.scroll_offset = (self.scroll_offset + 1).min(max);
    }

    pub fn page_up(&mut self, page_size: usize) {
        self.follow = false;
        self.scroll_offset = self.scroll_offset.saturating_sub(page_size);
    }

    pub fn page_down(&mut self, page_size: usize, max: usize) {
        self.scroll_offset = (self.scroll_offset + page_size).min(max);
        if self.scroll_offset == max {
            self.follow = true;
        }
    }

    pub fn scroll_to_top(&mut self) {
        self.follow = false;
        self.scroll_offset = 0;
    }

    /// Jump to the newest line and keep following.
    pub fn scroll_to_bottom(&mut self, max: usize) {
        self.follow = true;
        self.scroll_offset = max;
    }

    /// Back to following, for a newly selected stage.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Handle scroll keys for a log of `total_lines` lines.
    ///
    /// A scroll up while following starts from the bottom of the log.
    pub fn handle_key_event(&mut self, key_event: KeyEvent, total_lines: usize) -> EventStatus {
        if key_event.kind != KeyEventKind::Press {
            return EventStatus::NotConsumed;
        }

        let max = total_lines.saturating_sub(self.viewport.get());
        if self.follow {
            self.scroll_offset = max;
        }
        match key_event.code {
            KeyCode::PageUp => self.page_up(PAGE_SIZE),
            KeyCode::PageDown => self.page_down(PAGE_SIZE, max),
            KeyCode::Home => self.scroll_to_top(),
            KeyCode::End => self.scroll_to_bottom(max),
            _ => return EventStatus::NotConsumed,
        }
        EventStatus::Consumed
    }
}

impl Default for DetailView {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gta_core::state::initial_stages;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn create_test_stage(logs: &[&str], status: StageStatus) -> Stage {
        let mut stage = initial_stages().remove(0);
        stage.logs = logs.iter().map(|l| l.to_string()).collect();
        stage.status = status;
        stage
    }

    fn render(view: &DetailView, stage: Option<&Stage>, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| view.render(frame, frame.area(), stage, true))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_detail_view_renders_empty_state() {
        let content = render(&DetailView::new(), None, 80, 24);

        assert!(content.contains("Select a stage to view details"));
    }

    #[test]
    fn test_detail_view_renders_idle_stage() {
        let stage = create_test_stage(&[], StageStatus::Idle);

        let content = render(&DetailView::new(), Some(&stage), 120, 24);

        assert!(content.contains(&stage.name));
        assert!(content.contains(&format!("Agent: {}", stage.agent_name)));
        assert!(content.contains("idle"));
        assert!(content.contains("Agent Activity Log"));
        assert!(content.contains("Waiting for process to start..."));
        assert!(content.contains("Generated Artifacts"));
        assert!(content.contains("No output generated yet"));
    }

    #[test]
    fn test_detail_view_renders_logs_with_cursor() {
        let stage = create_test_stage(
            &["Querying vector database...", "Cross-referencing"],
            StageStatus::Processing,
        );

        let content = render(&DetailView::new(), Some(&stage), 120, 24);

        assert!(content.contains("$ Querying vector database..."));
        assert!(content.contains("$ Cross-referencing"));
        assert!(content.contains("█"));
        assert!(!content.contains("Waiting for process to start"));
    }

    #[test]
    fn test_detail_view_renders_output() {
        let mut stage = create_test_stage(&["done"], StageStatus::Completed);
        stage.output = Some("Generated output.".to_string());

        let content = render(&DetailView::new(), Some(&stage), 120, 24);

        assert!(content.contains("Output Generated"));
        assert!(content.contains("Generated output."));
        assert!(!content.contains("█"));
        assert!(!content.contains("No output generated yet"));
    }

    #[test]
    fn test_follow_shows_newest_line() {
        let logs: Vec<String> = (0..30).map(|i| format!("Line {i:02}")).collect();
        let refs: Vec<&str> = logs.iter().map(String::as_str).collect();
        let stage = create_test_stage(&refs, StageStatus::Completed);

        let content = render(&DetailView::new(), Some(&stage), 120, 20);

        assert!(content.contains("Line 29"));
        assert!(!content.contains("Line 00"));
    }

    #[test]
    fn test_scrolled_view_shows_offset() {
        let logs: Vec<String> = (0..30).map(|i| format!("Line {i:02}")).collect();
        let refs: Vec<&str> = logs.iter().map(String::as_str).collect();
        let stage = create_test_stage(&refs, StageStatus::Completed);
        let mut view = DetailView::new();
        view.scroll_to_top();

        let content = render(&view, Some(&stage), 120, 20);

        assert!(content.contains("Line 00"));
        assert!(!content.contains("Line 29"));
    }

    #[test]
    fn test_effective_offset() {
        let mut view = DetailView::new();
        assert_eq!(view.effective_offset(30, 10), 20);
        assert_eq!(view.effective_offset(5, 10), 0);

        view.follow = false;
        view.scroll_offset = 50;
        assert_eq!(view.effective_offset(30, 10), 20);
        view.scroll_offset = 3;
        assert_eq!(view.effective_offset(30, 10), 3);
    }

    #[test]
    fn test_detail_view_scroll_up_at_top() {
        let mut view = DetailView::new();
        view.scroll_offset = 0;

        view.scroll_up();
        assert_eq!(view.scroll_offset, 0);
        assert!(!view.follow);
    }

    #[test]
    fn test_detail_view_scroll_down_at_max() {
        let mut view = DetailView::new();
        view.scroll_offset = 10;

        view.scroll_down(10);
        assert_eq!(view.scroll_offset, 10);
    }

    #[test]
    fn test_detail_view_page_up_down() {
        let mut view = DetailView::new();
        view.scroll_offset = 20;

        view.page_up(10);
        assert_eq!(view.scroll_offset, 10);
        assert!(!view.follow);

        view.page_down(10, 50);
        assert_eq!(view.scroll_offset, 20);
        assert!(!view.follow);

        view.page_down(40, 50);
        assert_eq!(view.scroll_offset, 50);
        assert!(view.follow);
    }

    #[test]
    fn test_handle_key_event_page_up_leaves_follow() {
        let mut view = DetailView::new();

        let status = view.handle_key_event(KeyEvent::from(KeyCode::PageUp), 20);

        assert_eq!(status, EventStatus::Consumed);
        assert!(!view.follow);
        assert_eq!(view.scroll_offset, 20 - PAGE_SIZE);
    }

    #[test]
    fn test_handle_key_event_home_end() {
        let mut view = DetailView::new();

        view.handle_key_event(KeyEvent::from(KeyCode::Home), 20);
        assert_eq!(view.scroll_offset, 0);
        assert!(!view.follow);

        view.handle_key_event(KeyEvent::from(KeyCode::End), 20);
        assert_eq!(view.scroll_offset, 20);
        assert!(view.follow);
    }

    #[test]
    fn test_handle_key_event_uses_last_viewport() {
        let logs: Vec<String> = (0..30).map(|i| format!("Line {i:02}")).collect();
        let refs: Vec<&str> = logs.iter().map(String::as_str).collect();
        let stage = create_test_stage(&refs, StageStatus::Completed);
        let mut view = DetailView::new();
        // 20 rows leave a 12 line log viewport
        render(&view, Some(&stage), 120, 20);

        view.handle_key_event(KeyEvent::from(KeyCode::PageUp), 30);

        assert_eq!(view.scroll_offset, 18 - PAGE_SIZE);
        assert_eq!(view.effective_offset(30, 12), 18 - PAGE_SIZE);
    }

    #[test]
    fn test_handle_key_event_ignores_other_keys() {
        let mut view = DetailView::new();

        let status = view.handle_key_event(KeyEvent::from(KeyCode::Char('x')), 20);

        assert_eq!(status, EventStatus::NotConsumed);
        assert!(view.follow);
    }
}
