//! # MessageLog Component
//!
//! The scrolling text region. Newest lines sit at the bottom; once the
//! region is full, older lines scroll off the top.
//!
//! ## Architecture
//!
//! `MessageLog` is a transient component (created each frame) that wraps
//! `&'a mut MessageLogState` (persistent scroll state) and the log lines
//! (props). Wrapping is done with `textwrap` so the number of rows is known
//! before anything is drawn.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::core::state::{Emphasis, LogLine};
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// `HH:MM:SS ` prefix on every line.
const TIMESTAMP_WIDTH: u16 = 9;

/// Scroll state for the log. Must be persisted in the parent TuiState.
#[derive(Debug, Default)]
pub struct MessageLogState {
    /// Rows scrolled up from the bottom. 0 = pinned to newest line.
    pub scroll_back: usize,
    /// Last known viewport height (page size for PageUp/PageDown)
    pub viewport_height: u16,
    /// Total wrapped rows at the last render (for clamping)
    pub total_rows: usize,
}

impl MessageLogState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pinned(&self) -> bool {
        self.scroll_back == 0
    }

    pub fn scroll_up(&mut self, rows: usize) {
        let max = self.total_rows.saturating_sub(self.viewport_height as usize);
        self.scroll_back = (self.scroll_back + rows).min(max);
    }

    pub fn scroll_down(&mut self, rows: usize) {
        self.scroll_back = self.scroll_back.saturating_sub(rows);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_back = 0;
    }

    fn page(&self) -> usize {
        (self.viewport_height as usize).max(1)
    }
}

impl EventHandler for MessageLogState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<()> {
        match event {
            TuiEvent::ScrollUp => self.scroll_up(1),
            TuiEvent::ScrollDown => self.scroll_down(1),
            TuiEvent::ScrollPageUp => self.scroll_up(self.page()),
            TuiEvent::ScrollPageDown => self.scroll_down(self.page()),
            TuiEvent::ScrollToBottom => self.scroll_to_bottom(),
            _ => return None,
        }
        Some(())
    }
}

/// Colour for each emphasis: green success, yellow info, red error.
pub fn emphasis_style(emphasis: Emphasis) -> Style {
    match emphasis {
        Emphasis::Plain => Style::default(),
        Emphasis::Success => Style::default().fg(Color::Green),
        Emphasis::Info => Style::default().fg(Color::Yellow),
        Emphasis::Error => Style::default().fg(Color::Red),
    }
}

pub struct MessageLog<'a> {
    pub lines: &'a [LogLine],
    pub state: &'a mut MessageLogState,
}

impl<'a> MessageLog<'a> {
    pub fn new(lines: &'a [LogLine], state: &'a mut MessageLogState) -> Self {
        Self { lines, state }
    }
}

/// Wrap every log line to `width` columns, timestamp included.
fn layout_rows(lines: &[LogLine], width: u16) -> Vec<Line<'static>> {
    let text_width = width.saturating_sub(TIMESTAMP_WIDTH).max(1) as usize;
    let options = textwrap::Options::new(text_width)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace);
    let dim = Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM);
    let indent = " ".repeat(TIMESTAMP_WIDTH as usize);

    let mut rows = Vec::new();
    for line in lines {
        let style = emphasis_style(line.emphasis);
        let stamp = format!("{} ", line.at.format("%H:%M:%S"));
        let mut first = true;
        // Payloads may carry several lines of their own
        for segment in line.text.split('\n') {
            let wrapped = textwrap::wrap(segment, &options);
            let pieces: Vec<String> = if wrapped.is_empty() {
                vec![String::new()]
            } else {
                wrapped.into_iter().map(|c| c.into_owned()).collect()
            };
            for piece in pieces {
                let lead = if first {
                    first = false;
                    Span::styled(stamp.clone(), dim)
                } else {
                    Span::raw(indent.clone())
                };
                rows.push(Line::from(vec![lead, Span::styled(piece, style)]));
            }
        }
    }
    rows
}

impl Component for MessageLog<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let rows = layout_rows(self.lines, area.width);
        let height = area.height as usize;

        self.state.viewport_height = area.height;
        self.state.total_rows = rows.len();
        // Clamp in case the terminal grew or lines were evicted
        let max_back = rows.len().saturating_sub(height);
        self.state.scroll_back = self.state.scroll_back.min(max_back);

        let end = rows.len() - self.state.scroll_back;
        let start = end.saturating_sub(height);
        let visible: Vec<Line> = rows[start..end].to_vec();

        frame.render_widget(Paragraph::new(visible), area);
    }
}
