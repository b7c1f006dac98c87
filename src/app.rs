use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::collections::VecDeque;
use tokio::sync::mpsc;

use crate::api::{ChatClient, ProbeReport};
use crate::chat::{ChatScreen, MessageId, SendOutcome};

pub const CONNECTION_ERROR_TITLE: &str = "Connection Error";
pub const CONNECTION_ERROR_BODY: &str =
    "Could not connect to the chat server. Please make sure the server is running.";

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Connecting,
    Connected,
    /// Server answered the probe but reported a problem behind it.
    Degraded(String),
    Unreachable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub title: String,
    pub body: String,
}

/// Results reported back to the UI loop by spawned network tasks.
#[derive(Debug)]
enum NetworkEvent {
    Probe(std::result::Result<ProbeReport, String>),
    Sent { id: MessageId, outcome: SendOutcome },
}

pub struct App {
    pub should_quit: bool,
    pub state: AppState,
    pub input_mode: InputMode,
    /// Lines scrolled up from the newest message. Zero follows the tail.
    pub scroll_back: usize,
    /// Furthest `scroll_back` the last drawn transcript allows.
    max_scroll_back: usize,
    pub spinner_frame: usize,
    pub screen: ChatScreen,
    pub alerts: VecDeque<Alert>,
    pub last_probe: Option<ProbeReport>,

    client: ChatClient,
    probe_started: bool,
    seen_revision: u64,
    event_tx: mpsc::UnboundedSender<NetworkEvent>,
    event_rx: mpsc::UnboundedReceiver<NetworkEvent>,
}

impl App {
    pub fn new(client: ChatClient) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        Self {
            should_quit: false,
            state: AppState::Connecting,
            input_mode: InputMode::Editing,
            scroll_back: 0,
            max_scroll_back: 0,
            spinner_frame: 0,
            screen: ChatScreen::new(),
            alerts: VecDeque::new(),
            last_probe: None,

            client,
            probe_started: false,
            seen_revision: 0,
            event_tx,
            event_rx,
        }
    }

    pub fn server_url(&self) -> &str {
        self.client.base_url()
    }

    /// Runs once when the screen becomes active: starts the connectivity probe.
    pub fn mount(&mut self) {
        if self.probe_started {
            return;
        }
        self.probe_started = true;

        let client = self.client.clone();
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = client.health_check().await.map_err(|e| e.to_string());
            let _ = event_tx.send(NetworkEvent::Probe(result));
        });
    }

    pub fn handle_input(&mut self, event: Event) -> Result<()> {
        if let Event::Key(key) = event {
            if key.kind == KeyEventKind::Press {
                self.handle_key_event(key)?;
            }
        }
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Ok(());
        }

        // An open alert swallows input until dismissed.
        if !self.alerts.is_empty() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.alerts.pop_front();
            }
            return Ok(());
        }

        match self.input_mode {
            InputMode::Normal => match key.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                }
                KeyCode::Char('i') => {
                    self.input_mode = InputMode::Editing;
                }
                KeyCode::Up => {
                    self.scroll_up(1);
                }
                KeyCode::Down => {
                    self.scroll_back = self.scroll_back.saturating_sub(1);
                }
                KeyCode::PageUp => {
                    self.scroll_up(10);
                }
                KeyCode::PageDown => {
                    self.scroll_back = self.scroll_back.saturating_sub(10);
                }
                _ => {}
            },
            InputMode::Editing => {
                match key.code {
                    KeyCode::Enter => {
                        self.submit();
                        return Ok(());
                    }
                    KeyCode::Esc => {
                        self.input_mode = InputMode::Normal;
                        return Ok(());
                    }
                    _ => {}
                }
                // The field is read-only while a send is in flight.
                if self.screen.is_busy() {
                    return Ok(());
                }
                let draft = &mut self.screen.draft;
                match key.code {
                    KeyCode::Char(c) => {
                        draft.insert(c);
                    }
                    KeyCode::Backspace => draft.backspace(),
                    KeyCode::Delete => draft.delete(),
                    KeyCode::Left => draft.move_left(),
                    KeyCode::Right => draft.move_right(),
                    KeyCode::Home => draft.move_home(),
                    KeyCode::End => draft.move_end(),
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Optimistically appends the draft and sends it in the background.
    pub fn submit(&mut self) {
        let Some(outbound) = self.screen.submit() else {
            return;
        };
        self.follow_tail();
        tracing::debug!(id = %outbound.id, "sending message");

        let client = self.client.clone();
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            let outcome = match client.send_message(&outbound.text).await {
                Ok(reply) => SendOutcome::Reply(reply),
                Err(e) => {
                    tracing::error!(error = %e, "send failed");
                    SendOutcome::Failed(e.user_message())
                }
            };
            let _ = event_tx.send(NetworkEvent::Sent {
                id: outbound.id,
                outcome,
            });
        });
    }

    pub fn on_tick(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.apply(event);
        }

        if self.screen.is_busy() {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
        }
        self.follow_tail();
    }

    fn apply(&mut self, event: NetworkEvent) {
        match event {
            NetworkEvent::Probe(Ok(report)) => {
                self.state = if report.is_degraded() {
                    tracing::warn!(summary = %report.summary(), "chat server is degraded");
                    AppState::Degraded(report.summary())
                } else {
                    AppState::Connected
                };
                self.last_probe = Some(report);
            }
            NetworkEvent::Probe(Err(e)) => {
                tracing::error!(error = %e, "connection test failed");
                self.state = AppState::Unreachable;
                self.push_alert(CONNECTION_ERROR_TITLE, CONNECTION_ERROR_BODY);
            }
            NetworkEvent::Sent { id, outcome } => {
                if let Some(reason) = self.screen.complete(id, outcome) {
                    self.push_alert("Error", &reason);
                }
            }
        }
    }

    /// Records how many transcript lines were laid out and how many rows
    /// were available, so scrolling stops at the first line.
    pub fn set_viewport(&mut self, total_lines: usize, height: usize) {
        self.max_scroll_back = total_lines.saturating_sub(height);
        self.scroll_back = self.scroll_back.min(self.max_scroll_back);
    }

    fn scroll_up(&mut self, lines: usize) {
        self.scroll_back = (self.scroll_back + lines).min(self.max_scroll_back);
    }

    pub fn push_alert(&mut self, title: &str, body: &str) {
        self.alerts.push_back(Alert {
            title: title.to_string(),
            body: body.to_string(),
        });
    }

    fn follow_tail(&mut self) {
        let revision = self.screen.revision();
        if revision != self.seen_revision {
            self.seen_revision = revision;
            self.scroll_back = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn app() -> App {
        App::new(ChatClient::new("http://127.0.0.1:9", None).unwrap())
    }

    #[tokio::test]
    async fn typing_and_blank_submit() {
        let mut app = app();
        for c in "  ".chars() {
            app.handle_input(key(KeyCode::Char(c))).unwrap();
        }
        app.handle_input(key(KeyCode::Enter)).unwrap();
        assert!(app.screen.messages().is_empty());
        assert!(!app.screen.is_busy());
    }

    #[tokio::test]
    async fn alert_blocks_input_until_dismissed() {
        let mut app = app();
        app.push_alert("Error", "boom");
        app.handle_input(key(KeyCode::Char('x'))).unwrap();
        assert_eq!(app.screen.draft.as_str(), "");
        app.handle_input(key(KeyCode::Esc)).unwrap();
        assert!(app.alerts.is_empty());
        app.handle_input(key(KeyCode::Char('x'))).unwrap();
        assert_eq!(app.screen.draft.as_str(), "x");
    }

    #[tokio::test]
    async fn normal_mode_scrolls_and_quits() {
        let mut app = app();
        app.handle_input(key(KeyCode::Esc)).unwrap();
        assert_eq!(app.input_mode, InputMode::Normal);
        app.set_viewport(30, 10);
        app.handle_input(key(KeyCode::PageUp)).unwrap();
        app.handle_input(key(KeyCode::Down)).unwrap();
        assert_eq!(app.scroll_back, 9);
        app.handle_input(key(KeyCode::Char('q'))).unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn scrolling_stops_at_first_line() {
        let mut app = app();
        app.handle_input(key(KeyCode::Esc)).unwrap();
        for _ in 0..5 {
            app.handle_input(key(KeyCode::PageUp)).unwrap();
        }
        assert_eq!(app.scroll_back, 0);

        app.set_viewport(30, 10);
        for _ in 0..5 {
            app.handle_input(key(KeyCode::PageUp)).unwrap();
        }
        assert_eq!(app.scroll_back, 20);
        app.handle_input(key(KeyCode::Down)).unwrap();
        assert_eq!(app.scroll_back, 19);

        // A shorter transcript pulls the offset back in range.
        app.set_viewport(12, 10);
        assert_eq!(app.scroll_back, 2);
    }

    #[tokio::test]
    async fn ctrl_c_quits_even_with_alert_open() {
        let mut app = app();
        app.push_alert("Error", "boom");
        app.handle_input(Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)))
            .unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn submit_snaps_scroll_to_newest() {
        let mut app = app();
        app.scroll_back = 5;
        app.handle_input(key(KeyCode::Char('h'))).unwrap();
        app.handle_input(key(KeyCode::Enter)).unwrap();
        assert_eq!(app.scroll_back, 0);
        assert_eq!(app.screen.messages().len(), 1);
        assert!(app.screen.is_busy());

        // Draft is read-only while busy.
        app.handle_input(key(KeyCode::Char('z'))).unwrap();
        assert_eq!(app.screen.draft.as_str(), "");
    }
}
