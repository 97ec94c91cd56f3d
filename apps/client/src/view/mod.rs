//! Screens and the View Gate.
//!
//! Screens only read the managers and mutate them through `login`, `logout`
//! and `set_language`. Rendering produces plain text frames.

pub mod dashboard;
pub mod header;
pub mod login;

use crate::i18n::TextDirection;
use crate::session::SessionStatus;
use crate::state::AppState;

pub use dashboard::Dashboard;
pub use header::Header;
pub use login::LoginScreen;

/// Width right-to-left frames are aligned against.
pub const FRAME_WIDTH: usize = 72;

/// Top-level screen chosen by the View Gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Loading,
    Login,
    MainShell,
}

/// The View Gate: maps session status to the screen to show.
pub fn select_screen(status: SessionStatus) -> Screen {
    match status {
        SessionStatus::Resolving => Screen::Loading,
        SessionStatus::Anonymous => Screen::Login,
        SessionStatus::Authenticated => Screen::MainShell,
    }
}

/// Lines of text laid out in a direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub lines: Vec<String>,
    pub direction: TextDirection,
}

impl Frame {
    pub fn new(direction: TextDirection) -> Self {
        Self {
            lines: Vec::new(),
            direction,
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn extend(&mut self, other: Frame) {
        self.lines.extend(other.lines);
    }

    pub fn render(&self) -> String {
        self.lines
            .iter()
            .map(|line| match self.direction {
                TextDirection::Ltr => line.clone(),
                TextDirection::Rtl => {
                    let pad = FRAME_WIDTH.saturating_sub(line.chars().count());
                    format!("{}{}", " ".repeat(pad), line)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn render_loading(state: &AppState) -> Frame {
    let mut frame = Frame::new(state.i18n.direction());
    frame.push(state.t("app_name"));
    frame.push(state.t("loading"));
    frame
}

/// Renders whichever screen the View Gate selects for the current session.
pub fn render_current(state: &AppState, login: &LoginScreen, dashboard: &Dashboard) -> Frame {
    match select_screen(state.session.current_session().status()) {
        Screen::Loading => render_loading(state),
        Screen::Login => login.render(),
        Screen::MainShell => {
            let mut frame = Header::render(state);
            frame.extend(dashboard.render(state));
            frame
        }
    }
}
