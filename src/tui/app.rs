// src/tui/app.rs
//
// Dashboard application state and event loop. Telemetry from the
// broker is planned into panel mutations; the panel is redrawn on
// every message and on a fixed tick.

use std::io::Stdout;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;

use super::ui;
use crate::binding;
use crate::io::mqtt::{spawn_reader, MqttConfig};
use crate::io::{LinkState, SourceMessage, TelemetryMessage};
use crate::panel::Panel;

/// Application state for the dashboard.
pub struct App {
    /// Rendered element state
    pub panel: Panel,
    /// Broker link state
    pub link: LinkState,
    /// Broker address for the status bar
    pub broker: String,
    /// Granted subscription count
    pub subscriptions: usize,
    /// Messages applied to the panel
    pub messages_applied: u64,
    /// Messages that matched no channel or failed to apply
    pub messages_dropped: u64,
    /// Receive timestamp of the last applied message, microseconds
    pub last_update_us: Option<u64>,
    should_quit: bool,
}

impl App {
    pub fn new(broker: String) -> Self {
        Self {
            panel: Panel::cluster(),
            link: LinkState::Starting,
            broker,
            subscriptions: 0,
            messages_applied: 0,
            messages_dropped: 0,
            last_update_us: None,
            should_quit: false,
        }
    }

    /// Fold one reader message into the application state.
    pub fn handle_source(&mut self, message: SourceMessage) {
        match message {
            SourceMessage::Connected(_) => self.link = LinkState::Running,
            SourceMessage::Subscribed(granted) => self.subscriptions = granted,
            SourceMessage::Telemetry(telemetry) => self.apply(telemetry),
            SourceMessage::Ended(_) => {
                // A stream that died with an error stays in Error
                if !matches!(self.link, LinkState::Error(_)) {
                    self.link = LinkState::Stopped;
                }
            }
            SourceMessage::Error(message) => self.link = LinkState::Error(message),
        }
    }

    fn apply(&mut self, message: TelemetryMessage) {
        let plan = binding::plan(&message.topic, &message.payload);
        if plan.is_empty() {
            self.messages_dropped += 1;
            return;
        }

        match self.panel.apply_all(&plan) {
            Ok(()) => {
                self.messages_applied += 1;
                self.last_update_us = Some(message.timestamp_us);
            }
            Err(e) => {
                tlog!("[tui] {}: {}", message.topic, e);
                self.messages_dropped += 1;
            }
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            _ => {}
        }
    }
}

/// Run the dashboard until the user quits.
pub async fn run(config: MqttConfig, refresh_ms: u64) -> Result<(), String> {
    enable_raw_mode().map_err(|e| format!("Terminal setup failed: {}", e))?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .map_err(|e| format!("Terminal setup failed: {}", e))?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal =
        Terminal::new(backend).map_err(|e| format!("Terminal setup failed: {}", e))?;

    // Keep log output off the alternate screen
    crate::logging::set_stderr_quiet(true);
    let result = run_loop(&mut terminal, config, refresh_ms).await;
    crate::logging::set_stderr_quiet(false);

    let teardown = disable_raw_mode()
        .and_then(|_| {
            execute!(
                terminal.backend_mut(),
                LeaveAlternateScreen,
                DisableMouseCapture
            )
        })
        .and_then(|_| terminal.show_cursor());

    result?;
    teardown.map_err(|e| format!("Terminal teardown failed: {}", e))
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    config: MqttConfig,
    refresh_ms: u64,
) -> Result<(), String> {
    let broker = format!("{}:{}", config.host, config.port);
    let mut app = App::new(broker);

    let cancel_flag = Arc::new(AtomicBool::new(false));
    let (tx, mut rx) = mpsc::channel::<SourceMessage>(100);
    let reader = spawn_reader(config, cancel_flag.clone(), tx);

    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(Duration::from_millis(refresh_ms.max(10)));
    let mut rx_closed = false;

    let result = loop {
        if let Err(e) = terminal.draw(|f| ui::draw(f, &app)) {
            break Err(format!("Draw failed: {}", e));
        }

        tokio::select! {
            received = rx.recv(), if !rx_closed => {
                match received {
                    Some(message) => app.handle_source(message),
                    None => rx_closed = true,
                }
            }
            event = events.next() => {
                match event {
                    Some(Ok(Event::Key(key))) => app.on_key(key),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break Err(format!("Input error: {}", e)),
                    None => break Ok(()),
                }
            }
            _ = tick.tick() => {}
        }

        if app.should_quit {
            break Ok(());
        }
    };

    cancel_flag.store(true, Ordering::Relaxed);
    // Close the channel so a send parked on a full queue fails instead
    // of holding the reader open.
    drop(rx);
    if let Err(e) = reader.await {
        tlog!("[tui] Reader task failed: {}", e);
    }

    result
}
