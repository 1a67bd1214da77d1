use super::{html::escape, progress::ProgressBar};
use serde::Serialize;
use std::time::Duration;

/// Length of the overlay fade-out; the backdrop is hidden afterwards.
pub const OVERLAY_FADE_OUT: Duration = Duration::from_millis(300);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OverlayState {
    #[default]
    Hidden,
    Visible,
    FadingOut,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Cursor {
    Wait,
    #[default]
    Default,
}

/// Page backdrop shown while the interface is unavailable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Overlay {
    state: OverlayState,
    cursor: Cursor,
}

impl Overlay {
    pub fn show(&mut self, loading_cursor: bool) {
        self.cursor = if loading_cursor {
            Cursor::Wait
        } else {
            Cursor::Default
        };
        self.state = OverlayState::Visible;
    }

    /// Start fading out; [`Overlay::finish_hide`] completes it after [`OVERLAY_FADE_OUT`].
    pub fn hide(&mut self) {
        if self.state == OverlayState::Visible {
            self.state = OverlayState::FadingOut;
        }
    }

    /// Complete a fade-out unless the overlay was shown again meanwhile.
    pub fn finish_hide(&mut self) {
        if self.state == OverlayState::FadingOut {
            self.state = OverlayState::Hidden;
        }
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn is_visible(&self) -> bool {
        self.state == OverlayState::Visible
    }

    pub fn render(&self) -> String {
        let (display, opacity) = match self.state {
            OverlayState::Hidden => ("none", 0),
            OverlayState::Visible => ("block", 1),
            OverlayState::FadingOut => ("block", 0),
        };
        let cursor = match self.cursor {
            Cursor::Wait => "wait",
            Cursor::Default => "default",
        };

        format!(
            r#"<div id="pageBackdrop" style="display: {display}; opacity: {opacity}; cursor: {cursor}"></div>"#
        )
    }
}

/// Modal banner with a spinner, a message and an optional progress bar.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LoadingBanner {
    message: String,
    shown: bool,
    progress_visible: bool,
    progress: ProgressBar,
}

impl LoadingBanner {
    pub fn show(&mut self, message: impl Into<String>, show_progress_bar: bool) {
        self.message = message.into();
        self.progress_visible = show_progress_bar;
        self.shown = true;
    }

    pub fn close(&mut self) {
        self.shown = false;
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn progress_visible(&self) -> bool {
        self.progress_visible
    }

    pub fn progress(&self) -> &ProgressBar {
        &self.progress
    }

    pub fn progress_mut(&mut self) -> &mut ProgressBar {
        &mut self.progress
    }

    pub fn render(&self) -> String {
        let show = if self.shown { " show" } else { "" };
        let progress_display = if self.progress_visible {
            "block"
        } else {
            "none"
        };

        format!(
            concat!(
                r#"<div id="loadingBanner" class="loading-banner{}">"#,
                r#"<p id="loadingBannerMessageField">{}</p>"#,
                r#"<div id="loadingBannerProgress" style="display: {}">{}</div>"#,
                r#"</div>"#
            ),
            show,
            escape(&self.message),
            progress_display,
            self.progress.render()
        )
    }
}
