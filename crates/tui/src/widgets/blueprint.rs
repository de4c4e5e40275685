//! System blueprint view.
//!
//! The stages are drawn left to right as agent nodes joined by arrows.
//! Left/Right move the focus between nodes, Enter opens the "Node Details"
//! drawer for the focused node and Esc closes it.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use gta_protocol::stage_models::{Stage, StageId};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

use super::status_color;
use crate::event::EventStatus;

const NODE_WIDTH: u16 = 26;
const NODE_HEIGHT: u16 = 8;
const CONNECTOR_WIDTH: u16 = 5;
const DRAWER_WIDTH: u16 = 46;

/// Focus and drawer state of the blueprint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlueprintView {
    /// Index of the focused node.
    pub focused: usize,
    /// Stage whose details drawer is open.
    pub selected: Option<StageId>,
}

impl BlueprintView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus_next(&mut self, node_count: usize) {
        if self.focused + 1 < node_count {
            self.focused += 1;
        }
    }

    pub fn focus_prev(&mut self) {
        self.focused = self.focused.saturating_sub(1);
    }

    /// Open the drawer for the focused node.
    pub fn open(&mut self, stages: &[Stage]) {
        self.selected = stages.get(self.focused).map(|s| s.id);
    }

    pub fn close(&mut self) {
        self.selected = None;
    }

    pub fn handle_key_event(&mut self, key_event: KeyEvent, stages: &[Stage]) -> EventStatus {
        if key_event.kind != KeyEventKind::Press {
            return EventStatus::NotConsumed;
        }

        match key_event.code {
            KeyCode::Left | KeyCode::Char('h') => self.focus_prev(),
            KeyCode::Right | KeyCode::Char('l') => self.focus_next(stages.len()),
            KeyCode::Enter => self.open(stages),
            KeyCode::Esc if self.selected.is_some() => self.close(),
            _ => return EventStatus::NotConsumed,
        }
        EventStatus::Consumed
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, stages: &[Stage]) {
        let drawer_stage = self
            .selected
            .and_then(|id| stages.iter().find(|s| s.id == id));

        let (graph_area, drawer_area) = match drawer_stage {
            Some(_) => {
                let chunks = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Min(0), Constraint::Length(DRAWER_WIDTH)])
                    .split(area);
                (chunks[0], Some(chunks[1]))
            }
            None => (area, None),
        };

        self.render_graph(frame, graph_area, stages);
        if let (Some(stage), Some(drawer_area)) = (drawer_stage, drawer_area) {
            render_drawer(frame, drawer_area, stage);
        }
    }

    fn render_graph(&self, frame: &mut Frame, area: Rect, stages: &[Stage]) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("System Blueprint")
            .title_bottom(
                Line::from(" ←/→ select node · Enter details · Esc close ").centered(),
            );
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if stages.is_empty() || inner.width < NODE_WIDTH || inner.height < NODE_HEIGHT {
            return;
        }

        // Slide the window of visible nodes so the focused one stays on screen
        let slot = NODE_WIDTH + CONNECTOR_WIDTH;
        let fit = (((inner.width + CONNECTOR_WIDTH) / slot) as usize).max(1);
        let first = self.focused.saturating_sub(fit - 1).min(stages.len() - 1);
        let shown = &stages[first..(first + fit).min(stages.len())];

        let used = shown.len() as u16 * slot - CONNECTOR_WIDTH;
        let x0 = inner.x + (inner.width.saturating_sub(used)) / 2;
        let y = inner.y + (inner.height - NODE_HEIGHT) / 2;

        for (offset, stage) in shown.iter().enumerate() {
            let index = first + offset;
            let x = x0 + offset as u16 * slot;
            let node_area = Rect::new(x, y, NODE_WIDTH, NODE_HEIGHT);
            self.render_node(frame, node_area, stage, index);

            if index + 1 < stages.len() && offset + 1 < shown.len() {
                let arrow_area =
                    Rect::new(x + NODE_WIDTH, y + NODE_HEIGHT / 2, CONNECTOR_WIDTH, 1);
                let arrow =
                    Paragraph::new(" ──▶ ").style(Style::default().fg(Color::DarkGray));
                frame.render_widget(arrow, arrow_area);
            }
        }
    }

    fn render_node(&self, frame: &mut Frame, area: Rect, stage: &Stage, index: usize) {
        let is_selected = self.selected == Some(stage.id);
        let is_focused = self.focused == index;

        let border_style = if is_selected {
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
        } else if is_focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(if is_focused {
                BorderType::Thick
            } else {
                BorderType::Rounded
            })
            .border_style(border_style)
            .title(
                Line::from(Span::styled(
                    "●",
                    Style::default().fg(status_color(stage.status)),
                ))
                .right_aligned(),
            );

        let muted = Style::default().fg(Color::Gray);
        let lines = vec![
            Line::from(Span::styled(
                stage.agent_name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ))
            .centered(),
            Line::from(Span::styled(stage.name.to_uppercase(), muted)).centered(),
            Line::from(""),
            Line::from(vec![
                Span::styled("Model  ", muted),
                Span::raw(model_family(&stage.model)),
            ]),
            Line::from(vec![
                Span::styled("Tools  ", muted),
                Span::raw(stage.tools.len().to_string()),
            ]),
        ];

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

/// The model name up to its first dash, as shown on the node.
fn model_family(model: &str) -> &str {
    model.split('-').next().unwrap_or(model)
}

fn render_drawer(frame: &mut Frame, area: Rect, stage: &Stage) {
    let heading = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    let muted = Style::default().fg(Color::Gray);

    let mut lines = vec![
        Line::from(Span::styled(stage.name.clone(), heading)),
        Line::from(Span::styled(stage.agent_name.clone(), muted)),
        Line::from(""),
        Line::from(Span::styled("ROLE DESCRIPTION", muted)),
        Line::from(stage.description.clone()),
        Line::from(""),
        Line::from(Span::styled("Model Configuration", heading)),
        Line::from(vec![
            Span::styled("Model        ", muted),
            Span::raw(stage.model.clone()),
        ]),
        Line::from(vec![
            Span::styled("Temperature  ", muted),
            Span::raw(format!("{}", stage.temperature)),
        ]),
        Line::from(""),
        Line::from(Span::styled("Connected Tools", heading)),
    ];

    if stage.tools.is_empty() {
        lines.push(Line::from(Span::styled(
            "No external tools connected",
            muted.add_modifier(Modifier::ITALIC),
        )));
    } else {
        lines.extend(
            stage
                .tools
                .iter()
                .map(|tool| {
                    Line::from(Span::styled(
                        format!("[{tool}]"),
                        Style::default().fg(Color::Yellow),
                    ))
                }),
        );
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Inputs", heading)));
    lines.extend(bullet_list(&stage.inputs, "Previous Stage Output"));
    lines.push(Line::from(Span::styled("↓", muted)).centered());
    lines.push(Line::from(Span::styled("Outputs", heading)));
    lines.extend(bullet_list(&stage.outputs, "Analysis Result"));

    let drawer = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Magenta))
                .title("Node Details")
                .title_bottom(Line::from(" Esc to close ").right_aligned()),
        );
    frame.render_widget(drawer, area);
}

fn bullet_list(items: &[String], fallback: &str) -> Vec<Line<'static>> {
    if items.is_empty() {
        return vec![Line::from(format!("• {fallback}"))];
    }
    items.iter().map(|item| Line::from(format!("• {item}"))).collect()
}
