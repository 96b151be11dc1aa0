use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::core::state::App;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{MessageLog, TitleBar};

/// Title bar on top, log in the middle, prompt on the last row.
pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState) {
    use Constraint::{Length, Min};
    let layout = Layout::vertical([Length(1), Min(0), Length(1)]);
    let [title_area, log_area, prompt_area] = layout.areas(frame.area());

    MessageLog::new(&app.log, &mut tui.message_log).render(frame, log_area);

    // Rendered after the log so the unseen marker reflects this frame's clamp
    TitleBar::new(
        app.endpoint.to_string(),
        app.status.label(),
        app.verify_server,
        !tui.message_log.is_pinned(),
    )
    .render(frame, title_area);

    tui.prompt.dimmed = !app.is_connected();
    tui.prompt.render(frame, prompt_area);
}
