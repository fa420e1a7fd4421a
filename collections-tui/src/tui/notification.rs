//! Single-slot transient notifications.
//!
//! A view owns at most one message at a time: a new trigger replaces the
//! current one and restarts the dwell timer (no queueing). Timers are
//! scheduled as commands on the owning view's channel, so view teardown
//! cancels them implicitly, and a token guards against a timer scheduled for
//! a replaced message acting on the new one.

use std::time::Duration;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::command::Command;
use super::theme::Theme;

/// How long a message stays visible before auto-dismissal.
pub const DWELL: Duration = Duration::from_millis(5000);
/// Grace period between fading out and removal, so the exit transition can
/// finish rendering.
pub const REMOVAL_GRACE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub text: String,
    pub severity: Severity,
    pub visible: bool,
}

#[derive(Debug, Default)]
pub struct NotificationState {
    current: Option<Notification>,
    token: u64,
}

impl NotificationState {
    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    /// Show a message and schedule its auto-dismissal. Replaces any message
    /// already showing.
    pub fn trigger<Msg>(
        &mut self,
        text: impl Into<String>,
        severity: Severity,
        expired: fn(u64) -> Msg,
    ) -> Command<Msg>
    where
        Msg: Send + 'static,
    {
        self.token += 1;
        let token = self.token;
        self.current = Some(Notification {
            text: text.into(),
            severity,
            visible: true,
        });
        Command::perform(
            async move {
                tokio::time::sleep(DWELL).await;
                token
            },
            expired,
        )
    }

    /// Dwell timer settled. Timers carrying a stale token (their message was
    /// replaced or dismissed in the meantime) are ignored.
    pub fn expired<Msg>(&mut self, token: u64, removed: fn(u64) -> Msg) -> Command<Msg>
    where
        Msg: Send + 'static,
    {
        if token != self.token {
            return Command::None;
        }
        self.hide(removed)
    }

    /// Explicit dismissal; short-circuits the dwell timer.
    pub fn dismiss<Msg>(&mut self, removed: fn(u64) -> Msg) -> Command<Msg>
    where
        Msg: Send + 'static,
    {
        if !self.current.as_ref().is_some_and(|n| n.visible) {
            return Command::None;
        }
        // Invalidate the pending dwell timer.
        self.token += 1;
        self.hide(removed)
    }

    /// Removal timer settled; empty the slot if it still holds the same
    /// faded-out message.
    pub fn removed(&mut self, token: u64) {
        if token == self.token && self.current.as_ref().is_some_and(|n| !n.visible) {
            self.current = None;
        }
    }

    fn hide<Msg>(&mut self, removed: fn(u64) -> Msg) -> Command<Msg>
    where
        Msg: Send + 'static,
    {
        let Some(notification) = self.current.as_mut() else {
            return Command::None;
        };
        notification.visible = false;
        let token = self.token;
        Command::perform(
            async move {
                tokio::time::sleep(REMOVAL_GRACE).await;
                token
            },
            removed,
        )
    }

    /// Draw the message as a toast in the top-right corner of `area`. A
    /// faded-out message in its removal grace period renders dimmed.
    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let Some(notification) = &self.current else {
            return;
        };
        let width = area.width.min(44);
        let rect = Rect {
            x: area.right().saturating_sub(width),
            y: area.y,
            width,
            height: area.height.min(3),
        };
        let color = match notification.severity {
            Severity::Info => theme.accent_primary,
            Severity::Success => theme.accent_success,
            Severity::Error => theme.accent_error,
        };
        let mut style = Style::default().fg(color);
        if !notification.visible {
            style = style.add_modifier(Modifier::DIM);
        }
        let paragraph = Paragraph::new(notification.text.clone())
            .wrap(Wrap { trim: true })
            .style(style)
            .block(Block::default().borders(Borders::ALL).border_style(style));
        frame.render_widget(Clear, rect);
        frame.render_widget(paragraph, rect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    enum TestMsg {
        Expired(u64),
        Removed(u64),
    }

    #[test]
    fn test_trigger_replaces_without_stacking() {
        let mut state = NotificationState::default();
        let cmd = state.trigger("first", Severity::Info, TestMsg::Expired);
        assert!(matches!(cmd, Command::Perform(_)));
        let _ = state.trigger("second", Severity::Error, TestMsg::Expired);

        let current = state.current().unwrap();
        assert_eq!(current.text, "second");
        assert_eq!(current.severity, Severity::Error);
        assert!(current.visible);
    }

    #[test]
    fn test_stale_dwell_timer_is_ignored() {
        let mut state = NotificationState::default();
        let _ = state.trigger("first", Severity::Info, TestMsg::Expired);
        let _ = state.trigger("second", Severity::Success, TestMsg::Expired);

        // The first trigger's timer settles; the replacement must stay up.
        let cmd = state.expired(1, TestMsg::Removed);
        assert!(cmd.is_none());
        assert!(state.current().unwrap().visible);
    }

    #[test]
    fn test_expiry_fades_then_removes() {
        let mut state = NotificationState::default();
        let _ = state.trigger("hello", Severity::Info, TestMsg::Expired);

        let cmd = state.expired(state.token, TestMsg::Removed);
        assert!(matches!(cmd, Command::Perform(_)));
        assert!(!state.current().unwrap().visible);

        state.removed(state.token);
        assert!(state.current().is_none());
    }

    #[test]
    fn test_dismiss_short_circuits_dwell() {
        let mut state = NotificationState::default();
        let _ = state.trigger("hello", Severity::Info, TestMsg::Expired);

        let cmd = state.dismiss(TestMsg::Removed);
        assert!(matches!(cmd, Command::Perform(_)));
        assert!(!state.current().unwrap().visible);

        // The original dwell timer now carries a stale token.
        let cmd = state.expired(1, TestMsg::Removed);
        assert!(cmd.is_none());

        state.removed(state.token);
        assert!(state.current().is_none());
    }

    #[test]
    fn test_retrigger_during_removal_grace_wins() {
        let mut state = NotificationState::default();
        let _ = state.trigger("first", Severity::Info, TestMsg::Expired);
        let _ = state.expired(state.token, TestMsg::Removed);
        let removal_token = state.token;

        let _ = state.trigger("second", Severity::Info, TestMsg::Expired);
        state.removed(removal_token);

        let current = state.current().unwrap();
        assert_eq!(current.text, "second");
        assert!(current.visible);
    }

    #[test]
    fn test_dismiss_without_message_is_inert() {
        let mut state = NotificationState::default();
        let cmd = state.dismiss(TestMsg::Removed);
        assert!(cmd.is_none());
    }
}
