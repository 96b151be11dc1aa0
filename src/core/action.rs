//! # Actions
//!
//! Everything that can happen in the client becomes an `Action`.
//! User presses Enter? That's `Action::Submit(line)`.
//! Server sends bytes? That's `Action::MessageReceived(text)`.
//!
//! The `update()` function takes the current state and an action, mutates the
//! state and returns an `Effect` describing the I/O the caller must perform.
//! No side effects here. I/O happens in `net` and `tui`.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```

use std::time::Duration;

use crate::core::state::{App, ConnectionStatus, Emphasis};

/// Typed by the user to end the session. Compared ignoring ASCII case.
pub const EXIT_COMMAND: &str = "exit";

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Free-form line for the scroll region.
    Notice { text: String, emphasis: Emphasis },
    ConnectAttempt { attempt: u32, of: u32 },
    AttemptFailed {
        attempt: u32,
        reason: String,
        /// `None` on the last attempt.
        retry_in: Option<Duration>,
    },
    Connected,
    ConnectFailed { attempts: u32 },
    MessageReceived(String),
    ServerDisconnected,
    ReceiveFailed(String),
    SendFailed(String),
    /// A line entered at the prompt.
    Submit(String),
    Quit,
}

/// I/O requested by `update()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Write these bytes to the connection, unframed.
    Send(Vec<u8>),
    EndSession,
}

pub fn is_exit_command(line: &str) -> bool {
    line.eq_ignore_ascii_case(EXIT_COMMAND)
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Notice { text, emphasis } => {
            app.push_line(text, emphasis);
            Effect::None
        }
        Action::ConnectAttempt { attempt, of } => {
            app.status = ConnectionStatus::Connecting { attempt, of };
            let line = format!("Connecting to {}... (Attempt {attempt})", app.endpoint);
            app.push_line(line, Emphasis::Info);
            Effect::None
        }
        Action::AttemptFailed {
            attempt,
            reason,
            retry_in,
        } => {
            app.push_line(
                format!("Connection attempt {attempt} failed: {reason}"),
                Emphasis::Error,
            );
            if let Some(delay) = retry_in {
                app.push_line(
                    format!("Retrying in {} seconds...", delay.as_secs_f64()),
                    Emphasis::Info,
                );
            }
            Effect::None
        }
        Action::Connected => {
            app.status = ConnectionStatus::Connected;
            app.push_line("Connected successfully!", Emphasis::Success);
            Effect::None
        }
        Action::ConnectFailed { attempts } => {
            app.status = ConnectionStatus::Failed;
            log::warn!("Giving up after {attempts} connection attempts");
            app.push_line("Maximum reconnection attempts reached.", Emphasis::Error);
            Effect::EndSession
        }
        Action::MessageReceived(text) => {
            app.push_line(format!("Server: {text}"), Emphasis::Success);
            Effect::None
        }
        Action::ServerDisconnected => {
            close(app);
            app.push_line("Server disconnected.", Emphasis::Error);
            Effect::EndSession
        }
        Action::ReceiveFailed(reason) => {
            close(app);
            app.push_line(format!("Error receiving message: {reason}"), Emphasis::Error);
            Effect::EndSession
        }
        Action::SendFailed(reason) => {
            close(app);
            app.push_line(format!("Error sending message: {reason}"), Emphasis::Error);
            Effect::EndSession
        }
        Action::Submit(line) => {
            if is_exit_command(&line) {
                close(app);
                return Effect::EndSession;
            }
            if line.is_empty() {
                return Effect::None;
            }
            if !app.is_connected() {
                app.push_line("Not connected, message not sent.", Emphasis::Error);
                return Effect::None;
            }
            app.push_line(format!("You: {line}"), Emphasis::Plain);
            Effect::Send(line.into_bytes())
        }
        Action::Quit => {
            close(app);
            Effect::EndSession
        }
    }
}

fn close(app: &mut App) {
    if app.status == ConnectionStatus::Connected {
        app.status = ConnectionStatus::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{connected_app, test_app};

    fn texts(app: &App) -> Vec<&str> {
        app.log.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_exit_in_any_casing_ends_without_sending() {
        for line in ["exit", "EXIT", "Exit", "eXiT"] {
            let mut app = connected_app();
            let effect = update(&mut app, Action::Submit(line.to_string()));
            assert_eq!(effect, Effect::EndSession, "{line}");
            assert_eq!(app.status, ConnectionStatus::Closed);
            assert!(app.log.is_empty(), "exit must not be echoed or sent");
        }
    }

    #[test]
    fn test_exit_with_padding_is_sent_as_text() {
        let mut app = connected_app();
        let effect = update(&mut app, Action::Submit(" exit".to_string()));
        assert_eq!(effect, Effect::Send(b" exit".to_vec()));
    }

    #[test]
    fn test_submit_forwards_raw_bytes() {
        let mut app = connected_app();
        let effect = update(&mut app, Action::Submit("hi".to_string()));
        assert_eq!(effect, Effect::Send(b"hi".to_vec()));
        assert_eq!(texts(&app), vec!["You: hi"]);
        assert_eq!(app.log[0].emphasis, Emphasis::Plain);
    }

    #[test]
    fn test_empty_submit_is_ignored() {
        let mut app = connected_app();
        assert_eq!(update(&mut app, Action::Submit(String::new())), Effect::None);
        assert!(app.log.is_empty());
    }

    #[test]
    fn test_submit_while_disconnected_is_not_sent() {
        let mut app = test_app();
        let effect = update(&mut app, Action::Submit("hi".to_string()));
        assert_eq!(effect, Effect::None);
        assert_eq!(texts(&app), vec!["Not connected, message not sent."]);
    }

    #[test]
    fn test_received_message_is_prefixed() {
        let mut app = connected_app();
        update(&mut app, Action::MessageReceived("hello".to_string()));
        assert_eq!(texts(&app), vec!["Server: hello"]);
        assert_eq!(app.log[0].emphasis, Emphasis::Success);
    }

    #[test]
    fn test_connect_progress_lines() {
        let mut app = test_app();
        update(&mut app, Action::ConnectAttempt { attempt: 1, of: 3 });
        assert_eq!(app.status, ConnectionStatus::Connecting { attempt: 1, of: 3 });
        update(
            &mut app,
            Action::AttemptFailed {
                attempt: 1,
                reason: "connection refused".to_string(),
                retry_in: Some(Duration::from_secs(2)),
            },
        );
        update(&mut app, Action::ConnectAttempt { attempt: 2, of: 3 });
        update(&mut app, Action::Connected);

        assert_eq!(
            texts(&app),
            vec![
                "Connecting to localhost:8443... (Attempt 1)",
                "Connection attempt 1 failed: connection refused",
                "Retrying in 2 seconds...",
                "Connecting to localhost:8443... (Attempt 2)",
                "Connected successfully!",
            ]
        );
        assert!(app.is_connected());
    }

    #[test]
    fn test_last_failed_attempt_has_no_retry_line() {
        let mut app = test_app();
        update(
            &mut app,
            Action::AttemptFailed {
                attempt: 3,
                reason: "timed out".to_string(),
                retry_in: None,
            },
        );
        let effect = update(&mut app, Action::ConnectFailed { attempts: 3 });
        assert_eq!(effect, Effect::EndSession);
        assert_eq!(app.status, ConnectionStatus::Failed);
        assert_eq!(
            texts(&app),
            vec![
                "Connection attempt 3 failed: timed out",
                "Maximum reconnection attempts reached.",
            ]
        );
    }

    #[test]
    fn test_session_errors_end_session() {
        let cases = [
            (Action::ServerDisconnected, "Server disconnected."),
            (
                Action::ReceiveFailed("reset".to_string()),
                "Error receiving message: reset",
            ),
            (
                Action::SendFailed("broken pipe".to_string()),
                "Error sending message: broken pipe",
            ),
        ];
        for (action, expected) in cases {
            let mut app = connected_app();
            assert_eq!(update(&mut app, action), Effect::EndSession);
            assert_eq!(app.status, ConnectionStatus::Closed);
            assert_eq!(texts(&app), vec![expected]);
            assert_eq!(app.log[0].emphasis, Emphasis::Error);
        }
    }

    #[test]
    fn test_quit_keeps_failed_status() {
        let mut app = test_app();
        app.status = ConnectionStatus::Failed;
        assert_eq!(update(&mut app, Action::Quit), Effect::EndSession);
        assert_eq!(app.status, ConnectionStatus::Failed);
    }
}
