//! # TUI Components
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! - `TitleBar`: top status bar with endpoint, status and warnings
//!
//! ### Stateful Components (Event-Driven)
//!
//! - `Prompt`: one-line `> ` input field
//! - `MessageLog`: scrolling log region, state kept in `MessageLogState`
//!
//! Components receive external data as props (fields or constructor
//! arguments), never by reaching into `App` themselves:
//!
//! ```rust,ignore
//! // Good: dependencies are explicit
//! MessageLog::new(&app.log, &mut tui.message_log).render(frame, area);
//!
//! // Bad: hidden dependency on global state
//! message_log.render(frame, area); // reads from global App
//! ```
//!
//! ```text
//! components/
//! ├── mod.rs           (this file)
//! ├── title_bar.rs     (Top status bar)
//! ├── message_log.rs   (Scrolling log region)
//! └── prompt.rs        (Input line)
//! ```

pub mod message_log;
pub mod prompt;
mod title_bar;

pub use message_log::{MessageLog, MessageLogState};
pub use prompt::{Prompt, PromptEvent};
pub use title_bar::TitleBar;
