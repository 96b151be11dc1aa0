//! # Prompt Component
//!
//! The one-line `> ` input at the bottom of the screen.
//!
//! ## Responsibilities
//!
//! - Capture text input and bracketed paste (newlines flattened to spaces)
//! - Handle editing (backspace, delete, cursor movement, clear)
//! - Handle submission (Enter)
//! - Keep the cursor visible by scrolling long input horizontally
//!
//! Cursor position is a byte offset into `buffer`; display columns are
//! computed with `unicode-width` so wide characters line up.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

pub const PROMPT_PREFIX: &str = "> ";

/// High-level events emitted by the Prompt
#[derive(Debug, Clone, PartialEq)]
pub enum PromptEvent {
    /// User submitted the line (Enter pressed)
    Submit(String),
    /// Text or cursor changed
    ContentChanged,
}

pub struct Prompt {
    /// Text buffer (Internal State)
    pub buffer: String,
    /// Drawn dimmed while no connection is open (Prop)
    pub dimmed: bool,
    /// Cursor position as byte offset in buffer (0..=buffer.len())
    cursor: usize,
    /// Byte offset of the first visible character
    view_start: usize,
}

impl Default for Prompt {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompt {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            dimmed: false,
            cursor: 0,
            view_start: 0,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn insert_str(&mut self, text: &str) {
        self.buffer.insert_str(self.cursor, text);
        self.cursor += text.len();
    }

    fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.view_start = 0;
    }

    /// Slide the view so the cursor fits within `width` columns.
    fn update_view(&mut self, width: usize) {
        if self.view_start > self.cursor {
            self.view_start = self.cursor;
        }
        // Keep one column free for the cursor itself
        while self.view_start < self.cursor
            && self.buffer[self.view_start..self.cursor].width() >= width.max(1)
        {
            self.view_start = next_char_boundary(&self.buffer, self.view_start);
        }
    }
}

/// Find the byte offset of the previous character boundary before `pos` in `text`.
fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Find the byte offset of the next character boundary after `pos` in `text`.
fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(1)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}

impl Component for Prompt {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let prefix_width = PROMPT_PREFIX.width() as u16;
        let text_width = area.width.saturating_sub(prefix_width) as usize;
        self.update_view(text_width);

        let style = if self.dimmed {
            Style::default().add_modifier(Modifier::DIM)
        } else {
            Style::default().fg(Color::White)
        };
        let visible = &self.buffer[self.view_start..];
        let line = Line::from(vec![
            Span::styled(PROMPT_PREFIX, Style::default().fg(Color::Cyan)),
            Span::styled(visible.to_string(), style),
        ]);
        frame.render_widget(line, area);

        let cursor_col = self.buffer[self.view_start..self.cursor].width() as u16;
        let x = (area.x + prefix_width + cursor_col).min(area.right().saturating_sub(1));
        frame.set_cursor_position((x, area.y));
    }
}

impl EventHandler for Prompt {
    type Event = PromptEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => {
                let mut utf8 = [0u8; 4];
                self.insert_str(c.encode_utf8(&mut utf8));
                Some(PromptEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                let flat: String = text
                    .chars()
                    .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
                    .collect();
                self.insert_str(&flat);
                Some(PromptEvent::ContentChanged)
            }
            TuiEvent::Backspace => (self.cursor > 0).then(|| {
                let prev = prev_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                PromptEvent::ContentChanged
            }),
            TuiEvent::Delete => (self.cursor < self.buffer.len()).then(|| {
                let next = next_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(self.cursor..next);
                PromptEvent::ContentChanged
            }),
            TuiEvent::CursorLeft => (self.cursor > 0).then(|| {
                self.cursor = prev_char_boundary(&self.buffer, self.cursor);
                PromptEvent::ContentChanged
            }),
            TuiEvent::CursorRight => (self.cursor < self.buffer.len()).then(|| {
                self.cursor = next_char_boundary(&self.buffer, self.cursor);
                PromptEvent::ContentChanged
            }),
            TuiEvent::CursorHome => (self.cursor != 0).then(|| {
                self.cursor = 0;
                PromptEvent::ContentChanged
            }),
            TuiEvent::CursorEnd => (self.cursor != self.buffer.len()).then(|| {
                self.cursor = self.buffer.len();
                PromptEvent::ContentChanged
            }),
            TuiEvent::ClearInput => (!self.buffer.is_empty()).then(|| {
                self.clear();
                PromptEvent::ContentChanged
            }),
            TuiEvent::Submit => {
                if self.buffer.is_empty() {
                    return None;
                }
                let text = std::mem::take(&mut self.buffer);
                self.clear();
                Some(PromptEvent::Submit(text))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn type_str(prompt: &mut Prompt, text: &str) {
        for c in text.chars() {
            prompt.handle_event(&TuiEvent::InputChar(c));
        }
    }

    #[test]
    fn test_handle_input() {
        let mut prompt = Prompt::new();

        let res = prompt.handle_event(&TuiEvent::InputChar('a'));
        assert_eq!(res, Some(PromptEvent::ContentChanged));
        prompt.handle_event(&TuiEvent::InputChar('b'));
        assert_eq!(prompt.buffer, "ab");

        let res = prompt.handle_event(&TuiEvent::Backspace);
        assert_eq!(res, Some(PromptEvent::ContentChanged));
        assert_eq!(prompt.buffer, "a");
    }

    #[test]
    fn test_submit_takes_buffer() {
        let mut prompt = Prompt::new();
        type_str(&mut prompt, "hello");

        match prompt.handle_event(&TuiEvent::Submit) {
            Some(PromptEvent::Submit(text)) => assert_eq!(text, "hello"),
            other => panic!("Expected Submit event, got {other:?}"),
        }
        assert!(prompt.buffer.is_empty(), "Buffer should be cleared after submit");
        assert_eq!(prompt.cursor(), 0);
    }

    #[test]
    fn test_submit_empty_is_ignored() {
        let mut prompt = Prompt::new();
        assert_eq!(prompt.handle_event(&TuiEvent::Submit), None);
    }

    #[test]
    fn test_whitespace_is_submitted_verbatim() {
        let mut prompt = Prompt::new();
        type_str(&mut prompt, "  ");
        assert_eq!(
            prompt.handle_event(&TuiEvent::Submit),
            Some(PromptEvent::Submit("  ".to_string()))
        );
    }

    #[test]
    fn test_cursor_editing_with_multibyte() {
        let mut prompt = Prompt::new();
        type_str(&mut prompt, "héllo");
        prompt.handle_event(&TuiEvent::CursorHome);
        prompt.handle_event(&TuiEvent::CursorRight);
        prompt.handle_event(&TuiEvent::Delete);
        assert_eq!(prompt.buffer, "hllo");

        prompt.handle_event(&TuiEvent::InputChar('é'));
        prompt.handle_event(&TuiEvent::CursorEnd);
        prompt.handle_event(&TuiEvent::InputChar('!'));
        assert_eq!(prompt.buffer, "héllo!");
    }

    #[test]
    fn test_boundaries_report_no_change() {
        let mut prompt = Prompt::new();
        assert_eq!(prompt.handle_event(&TuiEvent::Backspace), None);
        assert_eq!(prompt.handle_event(&TuiEvent::CursorLeft), None);
        assert_eq!(prompt.handle_event(&TuiEvent::Delete), None);
        assert_eq!(prompt.handle_event(&TuiEvent::ClearInput), None);
    }

    #[test]
    fn test_paste_flattens_newlines() {
        let mut prompt = Prompt::new();
        prompt.handle_event(&TuiEvent::Paste("one\r\ntwo\nthree".to_string()));
        assert_eq!(prompt.buffer, "one  two three");
    }

    #[test]
    fn test_clear_input() {
        let mut prompt = Prompt::new();
        type_str(&mut prompt, "draft");
        prompt.handle_event(&TuiEvent::ClearInput);
        assert!(prompt.buffer.is_empty());
        assert_eq!(prompt.cursor(), 0);
    }

    #[test]
    fn test_render_shows_prefix_and_tail_of_long_input() {
        let backend = TestBackend::new(12, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut prompt = Prompt::new();
        type_str(&mut prompt, "abcdefghijklmnop");

        terminal.draw(|f| prompt.render(f, f.area())).unwrap();

        let text = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>();
        assert!(text.starts_with("> "));
        assert!(text.contains("hijklmnop"));
        assert!(!text.contains("abc"));
    }
}
