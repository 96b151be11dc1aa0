//! # TitleBar Component
//!
//! Top status bar: endpoint, connection status, and two warnings.
//!
//! ## Conditional Formatting
//!
//! 1. **Insecure**: `"tlschat | host:8443 | Connected | certificate verification disabled"`
//! 2. **Unseen content**: `... | ↓ New` when the log is scrolled away from the bottom
//! 3. **Default**: `"tlschat | host:8443 | Connected"`
//!
//! The insecure marker is drawn in bold red so it cannot be missed.

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Top status bar component.
///
/// All fields are props supplied by the parent each frame.
pub struct TitleBar {
    /// `host:port` of the server
    pub endpoint: String,
    /// Connection status label (e.g. "Connecting (1/3)", "Connected")
    pub status: String,
    /// False when any server certificate is accepted
    pub verify_server: bool,
    /// Whether the log is scrolled up with newer lines below
    pub has_unseen_content: bool,
}

impl TitleBar {
    pub fn new(endpoint: String, status: String, verify_server: bool, has_unseen_content: bool) -> Self {
        Self {
            endpoint,
            status,
            verify_server,
            has_unseen_content,
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled(
            "tlschat",
            Style::default().add_modifier(Modifier::BOLD),
        )];
        spans.push(Span::raw(format!(" | {}", self.endpoint)));
        if !self.status.is_empty() {
            spans.push(Span::raw(format!(" | {}", self.status)));
        }
        if !self.verify_server {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(
                "certificate verification disabled",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ));
        }
        if self.has_unseen_content {
            spans.push(Span::raw(" | ↓ New"));
        }

        frame.render_widget(Line::from(spans), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render_text(title_bar: &mut TitleBar) -> String {
        let backend = TestBackend::new(100, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                title_bar.render(f, f.area());
            })
            .unwrap();

        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_title_bar_shows_endpoint_and_status() {
        let mut title_bar =
            TitleBar::new("localhost:8443".to_string(), "Connected".to_string(), true, false);
        let text = render_text(&mut title_bar);

        assert!(text.contains("tlschat"));
        assert!(text.contains("localhost:8443"));
        assert!(text.contains("Connected"));
        assert!(!text.contains("verification disabled"));
        assert!(!text.contains("↓ New"));
    }

    #[test]
    fn test_title_bar_flags_insecure_mode() {
        let mut title_bar =
            TitleBar::new("10.0.0.1:8443".to_string(), "Connected".to_string(), false, false);
        let text = render_text(&mut title_bar);

        assert!(text.contains("certificate verification disabled"));
    }

    #[test]
    fn test_title_bar_with_unseen_content() {
        let mut title_bar = TitleBar::new(
            "localhost:8443".to_string(),
            "Connecting (2/3)".to_string(),
            true,
            true,
        );
        let text = render_text(&mut title_bar);

        assert!(text.contains("Connecting (2/3)"));
        assert!(text.contains("↓ New"));
    }
}
