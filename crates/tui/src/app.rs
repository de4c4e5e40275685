//! The dashboard: a mirror of the pipeline plus view state, driven by a
//! `tokio::select!` loop over terminal input and engine events.
//!
//! The app never mutates the pipeline itself: it sends `Op`s to the engine
//! and mirrors the `Event`s the engine publishes.

use anyhow::Result;
use crossterm::event::KeyEvent;
use gta_protocol::ipc::{Control, Event, Op, PipelineSnapshot};
use gta_protocol::stage_models::StageStatus;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};
use std::time::Duration;
use tokio::select;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc::UnboundedSender;
use tokio_stream::StreamExt;

use crate::event_handler;
use crate::tui::{FrameRequester, Tui, TuiEvent};
use crate::widgets::{render_stage_list, BlueprintView, DetailView};

/// Redraw cadence for the spinner and cursor while a run is live.
const ANIMATION_FRAME: Duration = Duration::from_millis(250);

/// Which of the two top-level views is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Dashboard,
    Blueprint,
}

impl ViewMode {
    pub fn toggle(self) -> Self {
        match self {
            ViewMode::Dashboard => ViewMode::Blueprint,
            ViewMode::Blueprint => ViewMode::Dashboard,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ViewMode::Dashboard => "Live Dashboard",
            ViewMode::Blueprint => "System Blueprint",
        }
    }

    fn index(self) -> usize {
        match self {
            ViewMode::Dashboard => 0,
            ViewMode::Blueprint => 1,
        }
    }
}

/// Dashboard state. The pipeline mirror is only written from engine events.
pub struct App {
    /// Local mirror of the engine state.
    pub snapshot: PipelineSnapshot,
    /// Current top-level view.
    pub view: ViewMode,
    /// Blueprint focus and drawer.
    pub blueprint: BlueprintView,
    /// Dashboard detail panel scroll state.
    pub detail_view: DetailView,
    /// Channel to send operations to the engine.
    pub op_tx: UnboundedSender<Op>,
    /// Events published by the engine.
    pub event_rx: broadcast::Receiver<Event>,
    /// Set on `q` or when the engine stops publishing.
    pub should_exit: bool,
    /// Animation frame counter.
    pub spinner: usize,
}

impl App {
    /// Create a new App from the engine's current state.
    pub fn new(
        op_tx: UnboundedSender<Op>,
        event_rx: broadcast::Receiver<Event>,
        snapshot: PipelineSnapshot,
    ) -> Self {
        Self {
            snapshot,
            view: ViewMode::default(),
            blueprint: BlueprintView::new(),
            detail_view: DetailView::new(),
            op_tx,
            event_rx,
            should_exit: false,
            spinner: 0,
        }
    }

    /// Main event loop.
    ///
    /// Uses `tokio::select!` to handle keyboard input and engine events
    /// concurrently.
    pub async fn run(&mut self, tui: &mut Tui) -> Result<()> {
        let mut tui_events = tui.event_stream();
        let frames = tui.frame_requester();

        frames.schedule_frame();

        while !self.should_exit {
            select! {
                received = self.event_rx.recv() => match received {
                    Ok(event) => {
                        self.handle_core_event(event);
                        frames.schedule_frame();
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "event mirror lagged, requesting snapshot");
                        self.send(Op::GetSnapshot);
                    }
                    Err(RecvError::Closed) => {
                        tracing::info!("simulation engine closed its event channel");
                        self.should_exit = true;
                    }
                },
                Some(tui_event) = tui_events.next() => {
                    self.handle_tui_event(tui, &frames, tui_event)?;
                }
            }
        }

        Ok(())
    }

    fn handle_core_event(&mut self, event: Event) {
        let selected = self.snapshot.selected_stage_id;
        event_handler::handle_core_event(&mut self.snapshot, event);
        if self.snapshot.selected_stage_id != selected {
            self.detail_view.reset();
        }
    }

    fn handle_tui_event(
        &mut self,
        tui: &mut Tui,
        frames: &FrameRequester,
        event: TuiEvent,
    ) -> Result<()> {
        match event {
            TuiEvent::Key(key_event) => {
                self.handle_key_event(key_event);
                frames.schedule_frame();
            }
            TuiEvent::Draw => {
                tui.draw(|frame| {
                    self.render(frame);
                })?;
                if self.snapshot.running {
                    self.spinner = self.spinner.wrapping_add(1);
                    frames.schedule_frame_in(ANIMATION_FRAME);
                }
            }
        }
        Ok(())
    }

    /// Offer the key to the widget of the current view, then to the
    /// global bindings.
    fn handle_key_event(&mut self, key_event: KeyEvent) {
        let status = match self.view {
            ViewMode::Dashboard => {
                let total_lines = self.selected_log_lines();
                self.detail_view.handle_key_event(key_event, total_lines)
            }
            ViewMode::Blueprint => self
                .blueprint
                .handle_key_event(key_event, &self.snapshot.stages),
        };
        if status.is_consumed() {
            return;
        }

        self.should_exit = event_handler::handle_keyboard_event(
            key_event,
            &mut self.view,
            &self.snapshot,
            &self.op_tx,
        );
    }

    /// Log lines of the selected stage, counting the cursor line.
    fn selected_log_lines(&self) -> usize {
        self.snapshot.selected_stage().map_or(0, |stage| {
            stage.logs.len() + usize::from(stage.status == StageStatus::Processing)
        })
    }

    fn send(&self, op: Op) {
        if self.op_tx.send(op).is_err() {
            tracing::warn!("simulation engine is gone, dropping op");
        }
    }

    /// Render the TUI.
    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(3), // Controls
                Constraint::Min(10),   // Body
                Constraint::Length(1), // Key hints
            ])
            .split(frame.area());

        self.render_header(frame, chunks[0]);
        self.render_controls(frame, chunks[1]);
        match self.view {
            ViewMode::Dashboard => self.render_dashboard(frame, chunks[2]),
            ViewMode::Blueprint => self
                .blueprint
                .render(frame, chunks[2], &self.snapshot.stages),
        }
        self.render_hints(frame, chunks[3]);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(38)])
            .split(inner);

        let title = Paragraph::new(vec![
            Line::from(Span::styled(
                "Grounded Theory Automator",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "MULTI-AGENT WORKFLOW ORCHESTRATOR",
                Style::default().fg(Color::Gray),
            )),
        ]);
        frame.render_widget(title, columns[0]);

        let tabs = Tabs::new([ViewMode::Dashboard.title(), ViewMode::Blueprint.title()])
            .select(self.view.index())
            .style(Style::default().fg(Color::Gray))
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            )
            .divider("|");
        frame.render_widget(tabs, columns[1]);
    }

    fn render_controls(&self, frame: &mut Frame, area: Rect) {
        let control = self.snapshot.control();
        let control_style = match control {
            Control::Start | Control::Resume => Style::default().fg(Color::Green),
            Control::Pause => Style::default().fg(Color::Yellow),
            Control::Finished => Style::default().fg(Color::DarkGray),
        }
        .add_modifier(Modifier::BOLD);

        let state = match (self.snapshot.running, self.snapshot.active_stage_id) {
            (true, Some(id)) => format!("Running stage {id}"),
            (false, Some(id)) => format!("Paused at stage {id}"),
            _ if control == Control::Finished => "All stages completed".to_string(),
            _ => "Ready".to_string(),
        };

        let line = Line::from(vec![
            Span::styled("[s] ", Style::default().fg(Color::DarkGray)),
            Span::styled(control.label(), control_style),
            Span::raw("   "),
            Span::styled("[r] ", Style::default().fg(Color::DarkGray)),
            Span::raw("Reset"),
            Span::raw("   "),
            Span::styled(state, Style::default().fg(Color::Gray)),
        ]);

        let controls = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(controls, area);
    }

    fn render_dashboard(&self, frame: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(area);

        render_stage_list(frame, columns[0], &self.snapshot, self.spinner);
        self.detail_view.render(
            frame,
            columns[1],
            self.snapshot.selected_stage(),
            self.spinner % 2 == 0,
        );
    }

    fn render_hints(&self, frame: &mut Frame, area: Rect) {
        let hints = match self.view {
            ViewMode::Dashboard => {
                "Tab switch view · s start/pause · r reset · ↑/↓ select · PgUp/PgDn scroll · q quit"
            }
            ViewMode::Blueprint => {
                "Tab switch view · s start/pause · r reset · ←/→ node · Enter details · q quit"
            }
        };
        frame.render_widget(
            Paragraph::new(hints).style(Style::default().fg(Color::DarkGray)),
            area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyCode;
    use gta_core::state::StageStore;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    fn create_app() -> (App, UnboundedReceiver<Op>, broadcast::Sender<Event>) {
        let (op_tx, op_rx) = unbounded_channel();
        let (event_tx, event_rx) = broadcast::channel(16);
        let app = App::new(op_tx, event_rx, StageStore::with_catalog().snapshot());
        (app, op_rx, event_tx)
    }

    fn render(app: &App) -> String {
        let backend = TestBackend::new(140, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_app_renders_dashboard() {
        let (app, _op_rx, _event_tx) = create_app();

        let content = render(&app);

        assert!(content.contains("Grounded Theory Automator"));
        assert!(content.contains("Live Dashboard"));
        assert!(content.contains("System Blueprint"));
        assert!(content.contains("Start Workflow"));
        assert!(content.contains("Reset"));
        assert!(content.contains("Pipeline Stages"));
        assert!(content.contains("Open Coding"));
        assert!(content.contains("Waiting for process to start..."));
    }

    #[test]
    fn test_app_renders_blueprint() {
        let (mut app, _op_rx, _event_tx) = create_app();
        app.view = ViewMode::Blueprint;

        let content = render(&app);

        assert!(content.contains("Analyst Agent"));
        assert!(!content.contains("Pipeline Stages"));
    }

    #[test]
    fn test_app_control_label_follows_state() {
        let (mut app, _op_rx, _event_tx) = create_app();

        app.handle_core_event(Event::RunStateChanged {
            running: true,
            active_stage_id: Some(1),
        });
        let content = render(&app);
        assert!(content.contains("Pause"));
        assert!(content.contains("Running stage 1"));

        app.handle_core_event(Event::RunStateChanged {
            running: false,
            active_stage_id: Some(1),
        });
        app.handle_core_event(Event::StageStatusUpdate {
            stage_id: 1,
            status: StageStatus::Processing,
            at: chrono::Utc::now(),
        });
        let content = render(&app);
        assert!(content.contains("Resume"));
        assert!(content.contains("Paused at stage 1"));
    }

    #[test]
    fn test_app_quit_on_q() {
        let (mut app, _op_rx, _event_tx) = create_app();

        assert!(!app.should_exit);

        app.handle_key_event(KeyEvent::from(KeyCode::Char('q')));

        assert!(app.should_exit);
    }

    #[test]
    fn test_app_start_key_sends_op() {
        let (mut app, mut op_rx, _event_tx) = create_app();

        app.handle_key_event(KeyEvent::from(KeyCode::Char('s')));

        assert_eq!(op_rx.try_recv().ok(), Some(Op::Start));
    }

    #[test]
    fn test_app_blueprint_keys_go_to_widget_first() {
        let (mut app, mut op_rx, _event_tx) = create_app();
        app.view = ViewMode::Blueprint;

        app.handle_key_event(KeyEvent::from(KeyCode::Right));
        app.handle_key_event(KeyEvent::from(KeyCode::Enter));

        assert_eq!(app.blueprint.focused, 1);
        assert_eq!(app.blueprint.selected, Some(2));
        assert!(render(&app).contains("Node Details"));

        app.handle_key_event(KeyEvent::from(KeyCode::Esc));
        assert_eq!(app.blueprint.selected, None);
        assert!(op_rx.try_recv().is_err());
    }

    #[test]
    fn test_app_selection_change_resets_scroll() {
        let (mut app, _op_rx, _event_tx) = create_app();
        app.handle_key_event(KeyEvent::from(KeyCode::Home));
        assert!(!app.detail_view.follow);

        app.handle_core_event(Event::StageSelected { stage_id: 2 });

        assert_eq!(app.snapshot.selected_stage_id, 2);
        assert!(app.detail_view.follow);
    }

    #[tokio::test]
    async fn test_app_mirrors_broadcast_events() {
        let (mut app, _op_rx, event_tx) = create_app();

        event_tx
            .send(Event::StageLogChunk {
                stage_id: 1,
                content: "Identifying patterns...".to_string(),
            })
            .unwrap();
        let event = app.event_rx.recv().await.unwrap();
        app.handle_core_event(event);

        let content = render(&app);
        assert!(content.contains("$ Identifying patterns..."));
    }
}
