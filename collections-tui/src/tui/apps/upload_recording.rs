//! Upload a voice recording against a pending customer.
//!
//! The candidate list is loaded once when the view activates; it is not
//! refreshed after a successful upload, so a customer resolved in the
//! meantime stays selectable until the view is reopened. Selection state is
//! cleared on success and preserved on failure so a retry needs no
//! re-picking.

use std::path::Path;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::api::models::Customer;
use crate::tui::app::App;
use crate::tui::command::Command;
use crate::tui::notification::{NotificationState, Severity};
use crate::tui::resource::Resource;
use crate::tui::theme::Theme;
use crate::tui::widgets::{TextInputField, render_text_input};

pub struct UploadRecordingApp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Customer,
    FilePath,
}

#[derive(Debug)]
pub enum Msg {
    CandidatesLoaded(Result<Vec<Customer>, String>),
    NextCandidate,
    PrevCandidate,
    FocusNext,
    Input(KeyCode),
    Submit,
    /// Settlement of the upload: the server message on success, the failure
    /// message otherwise.
    UploadSettled(Result<Option<String>, String>),
    DismissPrompt,
    NotificationExpired(u64),
    NotificationRemoved(u64),
    DismissNotification,
}

pub struct State {
    /// Pending customers eligible for an upload, fetched once at activation.
    pub candidates: Resource<Vec<Customer>>,
    /// Index into the candidate list; empty until the agent picks someone.
    pub chosen: Option<usize>,
    pub file_path: TextInputField,
    pub submitting: bool,
    /// Local precondition failure; blocks input until acknowledged.
    pub validation_prompt: Option<String>,
    focus: Focus,
    pub notification: NotificationState,
}

impl App for UploadRecordingApp {
    type State = State;
    type Msg = Msg;
    type InitParams = ();

    fn init(_params: ()) -> (State, Command<Msg>) {
        let state = State {
            candidates: Resource::Loading,
            chosen: None,
            file_path: TextInputField::default(),
            submitting: false,
            validation_prompt: None,
            focus: Focus::Customer,
            notification: NotificationState::default(),
        };
        let cmd = Command::perform(
            async move {
                crate::api_client()
                    .list_pending()
                    .await
                    .map_err(|e| e.to_string())
            },
            Msg::CandidatesLoaded,
        );
        (state, cmd)
    }

    fn update(state: &mut State, msg: Msg) -> Command<Msg> {
        match msg {
            Msg::CandidatesLoaded(result) => {
                state.candidates = match result {
                    Ok(customers) => Resource::Success(customers),
                    Err(e) => Resource::Failure(e),
                };
                Command::None
            }

            Msg::NextCandidate => {
                if let Some(candidates) = state.candidates.value() {
                    if !candidates.is_empty() {
                        state.chosen = Some(match state.chosen {
                            Some(i) => (i + 1) % candidates.len(),
                            None => 0,
                        });
                    }
                }
                Command::None
            }

            Msg::PrevCandidate => {
                if let Some(candidates) = state.candidates.value() {
                    if !candidates.is_empty() {
                        state.chosen = Some(match state.chosen {
                            Some(i) => (i + candidates.len() - 1) % candidates.len(),
                            None => candidates.len() - 1,
                        });
                    }
                }
                Command::None
            }

            Msg::FocusNext => {
                state.focus = match state.focus {
                    Focus::Customer => Focus::FilePath,
                    Focus::FilePath => Focus::Customer,
                };
                Command::None
            }

            Msg::Input(code) => {
                if state.focus == Focus::FilePath {
                    state.file_path.handle_key(code, None);
                }
                Command::None
            }

            Msg::Submit => submit(state),

            Msg::UploadSettled(result) => {
                state.submitting = false;
                match result {
                    Ok(message) => {
                        // Successful upload discards the selection.
                        state.chosen = None;
                        state.file_path.clear();
                        state.notification.trigger(
                            message.unwrap_or_else(|| "Recording successfully uploaded!".into()),
                            Severity::Success,
                            Msg::NotificationExpired,
                        )
                    }
                    Err(e) => {
                        // Selection is kept so the agent can retry without
                        // re-picking.
                        let text = if e.trim().is_empty() {
                            "Upload failed. Please try again.".to_string()
                        } else {
                            e
                        };
                        state
                            .notification
                            .trigger(text, Severity::Error, Msg::NotificationExpired)
                    }
                }
            }

            Msg::DismissPrompt => {
                state.validation_prompt = None;
                Command::None
            }

            Msg::NotificationExpired(token) => {
                state.notification.expired(token, Msg::NotificationRemoved)
            }
            Msg::NotificationRemoved(token) => {
                state.notification.removed(token);
                Command::None
            }
            Msg::DismissNotification => state.notification.dismiss(Msg::NotificationRemoved),
        }
    }

    fn view(state: &mut State, frame: &mut Frame, area: Rect, theme: &Theme) {
        let [selector_area, file_area, status_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(area);

        render_candidate_selector(state, frame, selector_area, theme);
        render_text_input(
            frame,
            file_area,
            "Voice File Path",
            &state.file_path,
            state.focus == Focus::FilePath && state.validation_prompt.is_none(),
            theme,
        );

        let status = if state.submitting {
            Line::from(Span::styled(
                "Uploading...",
                Style::default().fg(theme.accent_warning),
            ))
        } else {
            Line::from(Span::styled(
                "↑/↓ switch field · ←/→ choose customer · Enter upload",
                Style::default().fg(theme.text_secondary),
            ))
        };
        frame.render_widget(Paragraph::new(status), status_area);

        if let Some(prompt) = &state.validation_prompt {
            render_prompt(frame, area, prompt, theme);
        }
        state.notification.render(frame, area, theme);
    }

    fn on_key(state: &State, key: KeyEvent) -> Option<Msg> {
        // The validation prompt is blocking: nothing else reacts until it is
        // acknowledged.
        if state.validation_prompt.is_some() {
            return match key.code {
                KeyCode::Enter | KeyCode::Esc => Some(Msg::DismissPrompt),
                _ => None,
            };
        }
        match key.code {
            KeyCode::Up | KeyCode::Down => Some(Msg::FocusNext),
            KeyCode::Enter => Some(Msg::Submit),
            KeyCode::Left if state.focus == Focus::Customer => Some(Msg::PrevCandidate),
            KeyCode::Right if state.focus == Focus::Customer => Some(Msg::NextCandidate),
            KeyCode::Esc if state.notification.current().is_some() => {
                Some(Msg::DismissNotification)
            }
            _ if state.focus == Focus::FilePath => Some(Msg::Input(key.code)),
            _ => None,
        }
    }

    fn wants_text_input(state: &State) -> bool {
        state.focus == Focus::FilePath && state.validation_prompt.is_none()
    }

    fn title() -> &'static str {
        "Upload Voice Recording"
    }
}

fn submit(state: &mut State) -> Command<Msg> {
    // The submit action is inert while an upload is in flight.
    if state.submitting {
        return Command::None;
    }
    let chosen = state
        .chosen
        .and_then(|i| state.candidates.value().and_then(|c| c.get(i)));
    let (Some(customer), false) = (chosen, state.file_path.is_empty()) else {
        state.validation_prompt =
            Some("Please select a customer and a file to upload.".to_string());
        return Command::None;
    };

    state.submitting = true;
    let id = customer.id.clone();
    let path = state.file_path.value().trim().to_string();
    Command::perform(
        async move {
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| format!("Failed to read {path}: {e}"))?;
            let file_name = Path::new(&path)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("recording.wav")
                .to_string();
            crate::api_client()
                .upload_recording(&id, file_name, bytes)
                .await
                .map(|ack| ack.message)
                .map_err(|e| e.to_string())
        },
        Msg::UploadSettled,
    )
}

fn render_candidate_selector(state: &State, frame: &mut Frame, area: Rect, theme: &Theme) {
    let focused = state.focus == Focus::Customer && state.validation_prompt.is_none();
    let border = if focused {
        Style::default().fg(theme.accent_primary)
    } else {
        Style::default().fg(theme.text_secondary)
    };
    let content = match &state.candidates {
        Resource::NotAsked | Resource::Loading => Line::from(Span::styled(
            "Loading customers...",
            Style::default().fg(theme.text_secondary),
        )),
        Resource::Failure(e) => Line::from(Span::styled(
            format!("Error: {e}"),
            Style::default().fg(theme.accent_error),
        )),
        Resource::Success(candidates) if candidates.is_empty() => Line::from(Span::styled(
            "No pending customers.",
            Style::default().fg(theme.text_secondary),
        )),
        Resource::Success(candidates) => match state.chosen.and_then(|i| candidates.get(i)) {
            Some(customer) => Line::from(vec![
                Span::styled(
                    customer.name.clone(),
                    Style::default().fg(theme.text_primary),
                ),
                Span::styled(
                    format!("  (${:.2} due {})", customer.loan_amount, customer.due_date),
                    Style::default().fg(theme.text_secondary),
                ),
            ]),
            None => Line::from(Span::styled(
                format!("Select a customer ({} pending)", candidates.len()),
                Style::default().fg(theme.text_secondary).add_modifier(Modifier::ITALIC),
            )),
        },
    };
    let paragraph = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Choose a Person")
            .border_style(border),
    );
    frame.render_widget(paragraph, area);
}

fn render_prompt(frame: &mut Frame, area: Rect, prompt: &str, theme: &Theme) {
    let width = area.width.min(50);
    let rect = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + area.height.saturating_sub(5) / 2,
        width,
        height: area.height.min(5),
    };
    let paragraph = Paragraph::new(format!("{prompt}\n\nPress Enter to continue"))
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(theme.text_primary))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.accent_warning)),
        );
    frame.render_widget(Clear, rect);
    frame.render_widget(paragraph, rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::CallStatus;
    use chrono::NaiveDate;

    fn make_customer(id: &str, name: &str) -> Customer {
        Customer {
            id: id.to_string(),
            name: name.to_string(),
            phone: "555-0100".to_string(),
            loan_amount: 1000.0,
            due_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            call_status: CallStatus::Pending,
            notes: None,
        }
    }

    fn ready_state(candidates: Vec<Customer>) -> State {
        let (mut state, _) = UploadRecordingApp::init(());
        let cmd =
            UploadRecordingApp::update(&mut state, Msg::CandidatesLoaded(Ok(candidates)));
        assert!(cmd.is_none());
        state
    }

    fn set_file(state: &mut State, path: &str) {
        state.file_path.set_value(path.to_string());
    }

    #[test]
    fn test_submit_without_selection_never_hits_network() {
        let mut state = ready_state(vec![make_customer("1", "A")]);
        set_file(&mut state, "call.wav");
        // No customer chosen.
        let cmd = UploadRecordingApp::update(&mut state, Msg::Submit);
        assert!(cmd.is_none());
        assert!(!state.submitting);
        assert!(state.validation_prompt.is_some());
    }

    #[test]
    fn test_submit_without_file_never_hits_network() {
        let mut state = ready_state(vec![make_customer("1", "A")]);
        state.chosen = Some(0);
        let cmd = UploadRecordingApp::update(&mut state, Msg::Submit);
        assert!(cmd.is_none());
        assert!(!state.submitting);
        assert!(state.validation_prompt.is_some());
    }

    #[test]
    fn test_submit_with_full_selection_uploads() {
        let mut state = ready_state(vec![make_customer("1", "A")]);
        state.chosen = Some(0);
        set_file(&mut state, "call.wav");
        let cmd = UploadRecordingApp::update(&mut state, Msg::Submit);
        assert!(matches!(cmd, Command::Perform(_)));
        assert!(state.submitting);
    }

    #[test]
    fn test_resubmit_while_uploading_is_inert() {
        let mut state = ready_state(vec![make_customer("1", "A")]);
        state.chosen = Some(0);
        set_file(&mut state, "call.wav");
        let _ = UploadRecordingApp::update(&mut state, Msg::Submit);
        let cmd = UploadRecordingApp::update(&mut state, Msg::Submit);
        assert!(cmd.is_none());
    }

    #[test]
    fn test_failure_preserves_selection() {
        let mut state = ready_state(vec![make_customer("1", "A")]);
        state.chosen = Some(0);
        set_file(&mut state, "call.wav");
        let _ = UploadRecordingApp::update(&mut state, Msg::Submit);

        let cmd = UploadRecordingApp::update(
            &mut state,
            Msg::UploadSettled(Err("request failed with status 500".into())),
        );
        assert!(matches!(cmd, Command::Perform(_)));
        assert!(!state.submitting);
        assert_eq!(state.chosen, Some(0));
        assert_eq!(state.file_path.value(), "call.wav");

        let notification = state.notification.current().unwrap();
        assert_eq!(notification.severity, Severity::Error);
        assert_eq!(notification.text, "request failed with status 500");
    }

    #[test]
    fn test_success_clears_selection_and_uses_server_message() {
        let mut state = ready_state(vec![make_customer("1", "A")]);
        state.chosen = Some(0);
        set_file(&mut state, "call.wav");
        let _ = UploadRecordingApp::update(&mut state, Msg::Submit);

        let cmd = UploadRecordingApp::update(
            &mut state,
            Msg::UploadSettled(Ok(Some("stored".into()))),
        );
        assert!(matches!(cmd, Command::Perform(_)));
        assert_eq!(state.chosen, None);
        assert!(state.file_path.is_empty());

        let notification = state.notification.current().unwrap();
        assert_eq!(notification.severity, Severity::Success);
        assert_eq!(notification.text, "stored");
    }

    #[test]
    fn test_success_without_server_message_uses_default() {
        let mut state = ready_state(vec![make_customer("1", "A")]);
        state.chosen = Some(0);
        set_file(&mut state, "call.wav");
        let _ = UploadRecordingApp::update(&mut state, Msg::Submit);
        let _ = UploadRecordingApp::update(&mut state, Msg::UploadSettled(Ok(None)));
        assert_eq!(
            state.notification.current().unwrap().text,
            "Recording successfully uploaded!"
        );
    }

    #[test]
    fn test_validation_prompt_blocks_keys_until_acknowledged() {
        let mut state = ready_state(vec![make_customer("1", "A")]);
        let _ = UploadRecordingApp::update(&mut state, Msg::Submit);
        assert!(state.validation_prompt.is_some());

        // Printable keys are swallowed while the prompt is up.
        let key = KeyEvent::from(KeyCode::Char('x'));
        assert!(UploadRecordingApp::on_key(&state, key).is_none());

        let enter = KeyEvent::from(KeyCode::Enter);
        let msg = UploadRecordingApp::on_key(&state, enter).unwrap();
        let _ = UploadRecordingApp::update(&mut state, msg);
        assert!(state.validation_prompt.is_none());
    }

    #[test]
    fn test_candidate_cycling_wraps() {
        let mut state = ready_state(vec![make_customer("1", "A"), make_customer("2", "B")]);
        let _ = UploadRecordingApp::update(&mut state, Msg::NextCandidate);
        assert_eq!(state.chosen, Some(0));
        let _ = UploadRecordingApp::update(&mut state, Msg::NextCandidate);
        assert_eq!(state.chosen, Some(1));
        let _ = UploadRecordingApp::update(&mut state, Msg::NextCandidate);
        assert_eq!(state.chosen, Some(0));
        let _ = UploadRecordingApp::update(&mut state, Msg::PrevCandidate);
        assert_eq!(state.chosen, Some(1));
    }
}
