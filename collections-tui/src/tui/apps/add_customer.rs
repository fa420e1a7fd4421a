//! Add-customer form view.
//!
//! Validation failures stay local and render inline; only a payload that
//! passes validation reaches the backend. New customers always start in the
//! pending status.

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::api::models::NewCustomer;
use crate::tui::app::App;
use crate::tui::command::Command;
use crate::tui::theme::Theme;
use crate::tui::widgets::{TextInputField, render_text_input};

pub struct AddCustomerApp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Phone,
    LoanAmount,
    DueDate,
}

impl Field {
    const ORDER: [Field; 4] = [Field::Name, Field::Phone, Field::LoanAmount, Field::DueDate];

    fn next(self) -> Field {
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(idx + 1) % Self::ORDER.len()]
    }

    fn prev(self) -> Field {
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(idx + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

#[derive(Debug)]
pub enum Msg {
    Input(KeyCode),
    FocusNext,
    FocusPrev,
    Submit,
    Created(Result<(), String>),
}

pub struct State {
    pub name: TextInputField,
    pub phone: TextInputField,
    pub loan_amount: TextInputField,
    pub due_date: TextInputField,
    focus: Field,
    pub submitting: bool,
    pub error: Option<String>,
    pub success: Option<String>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            name: TextInputField::default(),
            phone: TextInputField::default(),
            loan_amount: TextInputField::default(),
            due_date: TextInputField::default(),
            focus: Field::Name,
            submitting: false,
            error: None,
            success: None,
        }
    }
}

impl App for AddCustomerApp {
    type State = State;
    type Msg = Msg;
    type InitParams = ();

    fn init(_params: ()) -> (State, Command<Msg>) {
        (State::default(), Command::None)
    }

    fn update(state: &mut State, msg: Msg) -> Command<Msg> {
        match msg {
            Msg::Input(code) => {
                let field = match state.focus {
                    Field::Name => &mut state.name,
                    Field::Phone => &mut state.phone,
                    Field::LoanAmount => &mut state.loan_amount,
                    Field::DueDate => &mut state.due_date,
                };
                field.handle_key(code, Some(100));
                Command::None
            }

            Msg::FocusNext => {
                state.focus = state.focus.next();
                Command::None
            }

            Msg::FocusPrev => {
                state.focus = state.focus.prev();
                Command::None
            }

            Msg::Submit => submit(state),

            Msg::Created(result) => {
                state.submitting = false;
                match result {
                    Ok(()) => {
                        state.name.clear();
                        state.phone.clear();
                        state.loan_amount.clear();
                        state.due_date.clear();
                        state.focus = Field::Name;
                        state.success = Some("Customer added successfully!".to_string());
                    }
                    Err(e) => state.error = Some(e),
                }
                Command::None
            }
        }
    }

    fn view(state: &mut State, frame: &mut Frame, area: Rect, theme: &Theme) {
        let [name_area, phone_area, amount_area, date_area, status_area, hint_area] =
            Layout::vertical([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .areas(area);

        render_text_input(frame, name_area, "Full Name", &state.name, state.focus == Field::Name, theme);
        render_text_input(frame, phone_area, "Phone Number", &state.phone, state.focus == Field::Phone, theme);
        render_text_input(
            frame,
            amount_area,
            "Loan Amount ($)",
            &state.loan_amount,
            state.focus == Field::LoanAmount,
            theme,
        );
        render_text_input(
            frame,
            date_area,
            "Due Date (YYYY-MM-DD)",
            &state.due_date,
            state.focus == Field::DueDate,
            theme,
        );

        let status = if state.submitting {
            Line::from(Span::styled("Adding...", Style::default().fg(theme.accent_warning)))
        } else if let Some(error) = &state.error {
            Line::from(Span::styled(error.clone(), Style::default().fg(theme.accent_error)))
        } else if let Some(success) = &state.success {
            Line::from(Span::styled(success.clone(), Style::default().fg(theme.accent_success)))
        } else {
            Line::from("")
        };
        frame.render_widget(Paragraph::new(status), status_area);

        let hint = Line::from(Span::styled(
            "↑/↓ switch field · Enter add customer",
            Style::default().fg(theme.text_secondary),
        ));
        frame.render_widget(Paragraph::new(hint), hint_area);
    }

    fn on_key(state: &State, key: KeyEvent) -> Option<Msg> {
        match key.code {
            KeyCode::Up => Some(Msg::FocusPrev),
            KeyCode::Down => Some(Msg::FocusNext),
            KeyCode::Enter if !state.submitting => Some(Msg::Submit),
            KeyCode::Enter => None,
            _ => Some(Msg::Input(key.code)),
        }
    }

    fn wants_text_input(_state: &State) -> bool {
        true
    }

    fn title() -> &'static str {
        "Add New Customer"
    }
}

fn submit(state: &mut State) -> Command<Msg> {
    if state.submitting {
        return Command::None;
    }
    state.error = None;
    state.success = None;
    let customer = match validate(state) {
        Ok(customer) => customer,
        Err(e) => {
            // Local precondition failure; nothing reaches the network.
            state.error = Some(e);
            return Command::None;
        }
    };
    state.submitting = true;
    Command::perform(
        async move {
            crate::api_client()
                .create_customer(&customer)
                .await
                .map(|_| ())
                .map_err(|e| e.to_string())
        },
        Msg::Created,
    )
}

fn validate(state: &State) -> Result<NewCustomer, String> {
    let name = state.name.value().trim();
    let phone = state.phone.value().trim();
    if name.is_empty() || phone.is_empty() {
        return Err("Name and phone are required.".to_string());
    }
    let loan_amount: f64 = state
        .loan_amount
        .value()
        .trim()
        .parse()
        .map_err(|_| "Loan amount must be a number.".to_string())?;
    if !loan_amount.is_finite() || loan_amount < 0.0 {
        return Err("Loan amount cannot be negative.".to_string());
    }
    let due_date = NaiveDate::parse_from_str(state.due_date.value().trim(), "%Y-%m-%d")
        .map_err(|_| "Due date must be YYYY-MM-DD.".to_string())?;
    Ok(NewCustomer::pending(
        name.to_string(),
        phone.to_string(),
        loan_amount,
        due_date,
    ))
}
