//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! translates keyboard events into `core::Action` values, and carries out
//! the `Effect`s the core asks for.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Event Loop
//!
//! Each pass of the loop:
//!
//! 1. Draws, if anything changed since the last frame.
//! 2. Polls the terminal for up to the input poll interval (`ESCDELAY`).
//! 3. Drains actions sent by the connect task or the session tasks.
//! 4. Advances the connection phase: connect finished → start the session;
//!    session stop flag raised → leave the loop.
//!
//! The loop runs on the runtime's main future, so blocking briefly in the
//! terminal poll never stalls the receiver or writer tasks.

mod component;
mod components;
mod event;
mod ui;

use log::{debug, info, warn};
use std::io::{self, stdout};

use crossterm::cursor::{SetCursorStyle, Show};
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use ratatui::DefaultTerminal;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::state::{App, ConnectionStatus, Emphasis, LogLine};
use crate::net::{ClientStream, ConnectError, Launch, Session, SessionOptions};
use crate::tui::component::EventHandler;
use crate::tui::components::{MessageLogState, Prompt, PromptEvent};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub message_log: MessageLogState,
    pub prompt: Prompt,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            message_log: MessageLogState::new(),
            prompt: Prompt::new(),
        }
    }
}

/// What the user should be told once the terminal is restored.
#[derive(Debug)]
pub struct Summary {
    pub status: ConnectionStatus,
    /// Last error-emphasis line, if any.
    pub last_error: Option<String>,
}

enum Phase {
    Connecting {
        handle: JoinHandle<Result<ClientStream, ConnectError>>,
        /// Lines submitted after `Connected` was shown but before the
        /// session started; sent first once it does.
        queued: Vec<Vec<u8>>,
    },
    Connected(Session),
    Done,
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> io::Result<Self> {
        execute!(
            stdout(),
            EnableBracketedPaste,
            Show,                        // Show cursor for input editing
            SetCursorStyle::SteadyBlock, // Non-blinking: avoids blink timer reset from redraws
        )?;
        info!("Terminal modes enabled (bracketed paste, steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            DisableBracketedPaste,
            SetCursorStyle::DefaultUserShape
        );
    }
}

/// Run the chat client until the session ends.
///
/// Startup checks have already passed by the time a `Launch` exists; the
/// only remaining failures are connection and session errors, which are shown
/// in the log and summarised in the return value.
pub async fn run(config: ResolvedConfig, launch: Launch) -> io::Result<Summary> {
    let mut app = App::new(launch.endpoint().clone(), config.verify_server);
    let mut tui = TuiState::new();
    if !config.verify_server {
        app.push_line(
            "WARNING: server certificate verification is disabled; any certificate is accepted.",
            Emphasis::Error,
        );
    }

    let mut terminal = ratatui::try_init()?;

    // Channel for actions from background tasks
    let (tx, mut rx) = mpsc::unbounded_channel();

    let connect_events = tx.clone();
    let mut phase = Phase::Connecting {
        handle: tokio::spawn(async move { launch.connect(&connect_events).await }),
        queued: Vec::new(),
    };

    let result = match TerminalModeGuard::new() {
        Ok(_guard) => {
            let result =
                event_loop(&mut terminal, &config, &mut app, &mut tui, &mut phase, &tx, &mut rx)
                    .await;
            close_phase(phase).await;
            result
        }
        Err(e) => {
            close_phase(phase).await;
            Err(e)
        }
    };
    ratatui::restore();

    result.map(|()| Summary {
        status: app.status,
        last_error: last_error(&app.log),
    })
}

/// Abort a pending connect, or close an open session and its socket.
async fn close_phase(phase: Phase) {
    match phase {
        Phase::Connecting { handle, .. } => {
            debug!("Aborting connection attempt");
            handle.abort();
        }
        Phase::Connected(session) => session.shutdown().await,
        Phase::Done => {}
    }
}

async fn event_loop(
    terminal: &mut DefaultTerminal,
    config: &ResolvedConfig,
    app: &mut App,
    tui: &mut TuiState,
    phase: &mut Phase,
    tx: &UnboundedSender<Action>,
    rx: &mut UnboundedReceiver<Action>,
) -> io::Result<()> {
    let mut needs_redraw = true; // Force first frame

    loop {
        if needs_redraw {
            terminal.draw(|f| ui::draw_ui(f, app, tui))?;
            needs_redraw = false;
        }

        // Process first event + drain ALL pending events before next draw
        let mut end_session = false;
        let first_event = poll_event_timeout(config.input_poll)?;
        if first_event.is_some() {
            needs_redraw = true;
        }
        let mut next = first_event;
        while let Some(event) = next {
            if apply_event(app, tui, phase, event) == Effect::EndSession {
                end_session = true;
            }
            next = poll_event_immediate()?;
        }

        // Handle background task actions
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            if update(app, action) == Effect::EndSession {
                end_session = true;
            }
        }

        if end_session {
            break;
        }

        match phase {
            Phase::Connecting { handle, queued } if handle.is_finished() => {
                needs_redraw = true;
                let queued = std::mem::take(queued);
                match handle.await {
                    Ok(Ok(stream)) => {
                        *phase = Phase::Connected(start_session(
                            stream,
                            &config.session,
                            tx.clone(),
                            queued,
                        ));
                    }
                    Ok(Err(e)) => {
                        warn!("Connection failed: {}", e);
                        *phase = Phase::Done;
                        // ConnectFailed may already be queued; drain it so it is shown
                        while let Ok(action) = rx.try_recv() {
                            update(app, action);
                        }
                        break;
                    }
                    Err(e) => {
                        warn!("Connection task ended abnormally: {}", e);
                        *phase = Phase::Done;
                        break;
                    }
                }
            }
            Phase::Connected(session) if session.is_stopped() => {
                // The other side stopped first; pick up whatever it reported
                while let Ok(action) = rx.try_recv() {
                    update(app, action);
                }
                break;
            }
            _ => {}
        }
    }

    Ok(())
}

/// Start the session, sending lines queued while it was being set up first.
fn start_session<S>(
    stream: S,
    options: &SessionOptions,
    events: UnboundedSender<Action>,
    queued: Vec<Vec<u8>>,
) -> Session
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let session = Session::start(stream, options, events);
    for bytes in queued {
        if !session.send(bytes) {
            break;
        }
    }
    session
}

/// Route one terminal event. Returns the effect of any core action it caused.
fn apply_event(app: &mut App, tui: &mut TuiState, phase: &mut Phase, event: TuiEvent) -> Effect {
    match event {
        TuiEvent::Resize => Effect::None,
        TuiEvent::Quit => update(app, Action::Quit),
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown
        | TuiEvent::ScrollToBottom => {
            tui.message_log.handle_event(&event);
            Effect::None
        }
        _ => match tui.prompt.handle_event(&event) {
            Some(PromptEvent::Submit(line)) => {
                // Sending your own line jumps back to the newest output
                tui.message_log.scroll_to_bottom();
                submit(app, phase, line)
            }
            Some(PromptEvent::ContentChanged) | None => Effect::None,
        },
    }
}

fn submit(app: &mut App, phase: &mut Phase, line: String) -> Effect {
    match update(app, Action::Submit(line)) {
        Effect::Send(bytes) => match phase {
            Phase::Connected(session) => {
                if session.send(bytes) {
                    Effect::None
                } else {
                    update(app, Action::SendFailed("connection closed".to_string()))
                }
            }
            Phase::Connecting { queued, .. } => {
                debug!("Session not started yet, queueing {} bytes", bytes.len());
                queued.push(bytes);
                Effect::None
            }
            Phase::Done => update(app, Action::SendFailed("connection closed".to_string())),
        },
        effect => effect,
    }
}

fn last_error(log: &[LogLine]) -> Option<String> {
    log.iter()
        .rev()
        .find(|line| line.emphasis == Emphasis::Error)
        .map(|line| line.text.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{connected_app, test_app};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, DuplexStream, duplex};

    const WAIT: Duration = Duration::from_secs(5);

    fn type_line(tui: &mut TuiState, app: &mut App, phase: &mut Phase, text: &str) -> Effect {
        for c in text.chars() {
            apply_event(app, tui, phase, TuiEvent::InputChar(c));
        }
        apply_event(app, tui, phase, TuiEvent::Submit)
    }

    fn fast_options() -> SessionOptions {
        SessionOptions {
            read_timeout: Duration::from_millis(50),
            join_timeout: Duration::from_millis(200),
        }
    }

    /// A connected phase over an in-memory pipe, plus the server's end.
    fn connected_phase() -> (Phase, DuplexStream) {
        let (client, server) = duplex(1024);
        let (tx, _rx) = mpsc::unbounded_channel();
        let phase = Phase::Connected(Session::start(client, &fast_options(), tx));
        (phase, server)
    }

    fn pending_connect() -> Phase {
        Phase::Connecting {
            handle: tokio::spawn(std::future::pending::<Result<ClientStream, ConnectError>>()),
            queued: Vec::new(),
        }
    }

    async fn read_all(server: &mut DuplexStream) -> Vec<u8> {
        let mut received = Vec::new();
        tokio::time::timeout(WAIT, server.read_to_end(&mut received))
            .await
            .unwrap()
            .unwrap();
        received
    }

    #[test]
    fn test_typed_exit_ends_session() {
        let mut app = connected_app();
        let mut tui = TuiState::new();
        let effect = type_line(&mut tui, &mut app, &mut Phase::Done, "EXIT");
        assert_eq!(effect, Effect::EndSession);
        assert!(app.log.is_empty());
    }

    #[tokio::test]
    async fn test_typed_exit_closes_socket_without_sending() {
        let (mut phase, mut server) = connected_phase();
        let mut app = connected_app();
        let mut tui = TuiState::new();

        assert_eq!(
            type_line(&mut tui, &mut app, &mut phase, "EXIT"),
            Effect::EndSession
        );
        close_phase(phase).await;

        assert!(read_all(&mut server).await.is_empty());
        assert_eq!(app.status, ConnectionStatus::Closed);
    }

    #[test]
    fn test_send_without_session_fails_cleanly() {
        let mut app = connected_app();
        let mut tui = TuiState::new();
        let effect = type_line(&mut tui, &mut app, &mut Phase::Done, "hi");
        assert_eq!(effect, Effect::EndSession);
        assert_eq!(app.status, ConnectionStatus::Closed);
        assert_eq!(
            last_error(&app.log).as_deref(),
            Some("Error sending message: connection closed")
        );
    }

    #[tokio::test]
    async fn test_line_typed_before_session_start_is_queued() {
        // `Connected` has been applied but the connect task is not collected yet
        let mut phase = pending_connect();
        let mut app = connected_app();
        let mut tui = TuiState::new();

        assert_eq!(type_line(&mut tui, &mut app, &mut phase, "hi"), Effect::None);

        assert_eq!(app.status, ConnectionStatus::Connected);
        assert_eq!(last_error(&app.log), None);
        match &phase {
            Phase::Connecting { queued, .. } => assert_eq!(queued, &vec![b"hi".to_vec()]),
            _ => panic!("phase should still be connecting"),
        }
        close_phase(phase).await;
    }

    #[tokio::test]
    async fn test_queued_lines_are_sent_first() {
        let (client, mut server) = duplex(1024);
        let (tx, _rx) = mpsc::unbounded_channel();
        let session = start_session(
            client,
            &fast_options(),
            tx,
            vec![b"one".to_vec(), b"two".to_vec()],
        );
        assert!(session.send(b"three".to_vec()));
        session.shutdown().await;

        assert_eq!(read_all(&mut server).await, b"onetwothree");
    }

    #[test]
    fn test_quit_event_ends_session() {
        let mut app = test_app();
        let mut tui = TuiState::new();
        assert_eq!(
            apply_event(&mut app, &mut tui, &mut Phase::Done, TuiEvent::Quit),
            Effect::EndSession
        );
    }

    #[test]
    fn test_scroll_events_do_not_touch_prompt() {
        let mut app = test_app();
        let mut tui = TuiState::new();
        apply_event(&mut app, &mut tui, &mut Phase::Done, TuiEvent::InputChar('x'));
        apply_event(&mut app, &mut tui, &mut Phase::Done, TuiEvent::ScrollUp);
        assert_eq!(tui.prompt.buffer, "x");
    }

    #[tokio::test]
    async fn test_submit_forwards_to_session() {
        let (mut phase, mut server) = connected_phase();
        let mut app = connected_app();
        let mut tui = TuiState::new();

        assert_eq!(type_line(&mut tui, &mut app, &mut phase, "hi"), Effect::None);

        let mut buf = [0u8; 8];
        let n = tokio::time::timeout(WAIT, server.read(&mut buf))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(&buf[..n], b"hi");

        close_phase(phase).await;
    }
}
