//! Terminal setup, input streaming and frame scheduling.
//!
//! [`Tui`] owns the ratatui terminal in raw mode on the alternate screen.
//! Redraws are requested through a [`FrameRequester`]; a background task
//! coalesces requests so that a burst of simulation events produces a
//! single draw.

use anyhow::Result;
use crossterm::event::Event as TermEvent;
use crossterm::event::KeyEvent;
use crossterm::execute;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::stdout;
use std::io::Stdout;
use std::pin::Pin;
use std::time::Duration;
use tokio::select;
use tokio::sync::broadcast;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_stream::Stream;
use tokio_stream::StreamExt;

/// Crossterm-backed terminal used by the dashboard.
pub type TerminalBackend = CrosstermBackend<Stdout>;

/// Input and redraw events consumed by the app loop.
#[derive(Debug)]
pub enum TuiEvent {
    /// A key press forwarded from crossterm.
    Key(KeyEvent),
    /// Time to redraw (scheduled frame or terminal resize).
    Draw,
}

/// Owns the terminal while the dashboard is on screen.
pub struct Tui {
    terminal: Terminal<TerminalBackend>,
    frame_tx: mpsc::UnboundedSender<Instant>,
    draw_tx: broadcast::Sender<()>,
}

impl Tui {
    /// Enter raw mode and the alternate screen, and start the frame scheduler.
    pub fn init() -> Result<Self> {
        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen)?;
        set_panic_hook();

        let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        let (draw_tx, _) = broadcast::channel(1);
        tokio::spawn(schedule_frames(frame_rx, draw_tx.clone()));

        Ok(Self {
            terminal,
            frame_tx,
            draw_tx,
        })
    }

    /// Leaves raw mode and the alternate screen.
    pub fn restore(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(stdout(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    /// A cloneable handle the app uses to ask for redraws.
    pub fn frame_requester(&self) -> FrameRequester {
        FrameRequester {
            frame_tx: self.frame_tx.clone(),
        }
    }

    /// Merge key presses, resizes and scheduled frames into one stream.
    pub fn event_stream(&self) -> Pin<Box<dyn Stream<Item = TuiEvent> + Send + 'static>> {
        let mut term_events = crossterm::event::EventStream::new();
        let mut draw_rx = self.draw_tx.subscribe();

        Box::pin(async_stream::stream! {
            loop {
                select! {
                    Some(Ok(event)) = term_events.next() => match event {
                        TermEvent::Key(key_event) => yield TuiEvent::Key(key_event),
                        TermEvent::Resize(_, _) => yield TuiEvent::Draw,
                        _ => {}
                    },
                    result = draw_rx.recv() => match result {
                        // Lagged draws collapse into one
                        Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                            yield TuiEvent::Draw;
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        })
    }

    /// Renders one frame.
    pub fn draw<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut ratatui::Frame),
    {
        self.terminal.draw(f)?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

/// Sends redraw deadlines to the frame scheduler.
#[derive(Clone, Debug)]
pub struct FrameRequester {
    frame_tx: mpsc::UnboundedSender<Instant>,
}

impl FrameRequester {
    /// Redraw as soon as possible.
    pub fn schedule_frame(&self) {
        let _ = self.frame_tx.send(Instant::now());
    }

    /// Redraw once `dur` has elapsed, unless an earlier frame is pending.
    pub fn schedule_frame_in(&self, dur: Duration) {
        let _ = self.frame_tx.send(Instant::now() + dur);
    }

    /// A requester whose frames go to `frame_tx`, for tests and headless use.
    pub fn from_sender(frame_tx: mpsc::UnboundedSender<Instant>) -> Self {
        Self { frame_tx }
    }
}

/// Fire one draw at the earliest requested instant, then wait for the next
/// request. Exits when every requester is gone.
async fn schedule_frames(
    mut frame_rx: mpsc::UnboundedReceiver<Instant>,
    draw_tx: broadcast::Sender<()>,
) {
    let mut next_deadline: Option<Instant> = None;

    loop {
        let wait = async move {
            match next_deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        select! {
            requested = frame_rx.recv() => match requested {
                Some(at) => {
                    next_deadline = Some(next_deadline.map_or(at, |current| current.min(at)));
                }
                None => break,
            },
            _ = wait => {
                next_deadline = None;
                let _ = draw_tx.send(());
            }
        }
    }
}

/// Restore the terminal before the default panic output.
fn set_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_frame_requests_coalesce_into_one_draw() {
        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        let (draw_tx, mut draw_rx) = broadcast::channel(4);
        tokio::spawn(schedule_frames(frame_rx, draw_tx));

        let requester = FrameRequester::from_sender(frame_tx);
        requester.schedule_frame_in(Duration::from_millis(50));
        requester.schedule_frame_in(Duration::from_millis(10));
        requester.schedule_frame_in(Duration::from_millis(30));

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(draw_rx.try_recv().is_ok());
        assert!(draw_rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_exits_when_requesters_drop() {
        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        let (draw_tx, _draw_rx) = broadcast::channel(4);
        let task = tokio::spawn(schedule_frames(frame_rx, draw_tx));

        drop(frame_tx);

        task.await.unwrap();
    }
}
