//! List views over the customer collection: all, pending and resolved.
//!
//! One app instance per view; activation fetches the list exactly once and a
//! refresh supersedes any fetch still in flight via the generation counter.
//! The resolved view is a display-side filter over the full list, not a
//! separate backend query.

use std::collections::HashSet;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};

use crate::api::models::{CallStatus, Customer};
use crate::tui::app::App;
use crate::tui::command::Command;
use crate::tui::notification::{NotificationState, Severity};
use crate::tui::resource::Resource;
use crate::tui::theme::Theme;

/// Which slice of the collection this view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    All,
    Pending,
    Resolved,
}

pub struct CustomerListApp;

#[derive(Debug)]
pub enum Msg {
    /// Settlement of the fetch issued under the given generation.
    CustomersLoaded(u64, Result<Vec<Customer>, String>),
    Refresh,
    SelectPrev,
    SelectNext,
    PlaceCall,
    /// Settlement of a call initiation: customer id plus either the customer
    /// name (for the acknowledgment) or the error message.
    CallSettled(String, Result<String, String>),
    NotificationExpired(u64),
    NotificationRemoved(u64),
    DismissNotification,
}

pub struct State {
    scope: ListScope,
    pub customers: Resource<Vec<Customer>>,
    pub selected: usize,
    table_state: TableState,
    /// Fetch generation; settlements carrying an older generation belong to a
    /// superseded fetch and are discarded.
    generation: u64,
    /// Customer ids with a call currently being initiated.
    pub calling: HashSet<String>,
    pub notification: NotificationState,
}

impl App for CustomerListApp {
    type State = State;
    type Msg = Msg;
    type InitParams = ListScope;

    fn init(scope: ListScope) -> (State, Command<Msg>) {
        let state = State {
            scope,
            customers: Resource::Loading,
            selected: 0,
            table_state: TableState::default(),
            generation: 1,
            calling: HashSet::new(),
            notification: NotificationState::default(),
        };
        (state, fetch(scope, 1))
    }

    fn update(state: &mut State, msg: Msg) -> Command<Msg> {
        match msg {
            Msg::CustomersLoaded(generation, result) => {
                if generation != state.generation {
                    log::debug!(
                        "discarding stale customer list settlement (generation {generation}, current {})",
                        state.generation
                    );
                    return Command::None;
                }
                state.customers = match result {
                    Ok(customers) => Resource::Success(visible_customers(state.scope, customers)),
                    Err(e) => Resource::Failure(e),
                };
                state.selected = 0;
                Command::None
            }

            Msg::Refresh => {
                state.generation += 1;
                state.customers = Resource::Loading;
                state.calling.clear();
                fetch(state.scope, state.generation)
            }

            Msg::SelectPrev => {
                state.selected = state.selected.saturating_sub(1);
                Command::None
            }

            Msg::SelectNext => {
                if let Resource::Success(customers) = &state.customers {
                    if state.selected + 1 < customers.len() {
                        state.selected += 1;
                    }
                }
                Command::None
            }

            Msg::PlaceCall => place_call(state),

            Msg::CallSettled(id, result) => {
                // Clear the busy flag whatever the outcome.
                state.calling.remove(&id);
                match result {
                    Ok(name) => state.notification.trigger(
                        format!("Call initiated to {name}"),
                        Severity::Info,
                        Msg::NotificationExpired,
                    ),
                    Err(e) => {
                        // Soft failure: the agent can simply press the button
                        // again, so no notification and no retry.
                        log::error!("call to customer {id} failed: {e}");
                        Command::None
                    }
                }
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
        match &state.customers {
            Resource::NotAsked | Resource::Loading => {
                let text = Paragraph::new("Loading customers...")
                    .style(Style::default().fg(theme.text_secondary));
                frame.render_widget(text, area);
            }
            Resource::Failure(e) => {
                let text = Paragraph::new(format!("Error: {e}"))
                    .style(Style::default().fg(theme.accent_error));
                frame.render_widget(text, area);
            }
            Resource::Success(customers) if customers.is_empty() => {
                let text = Paragraph::new("No customers found.")
                    .style(Style::default().fg(theme.text_secondary));
                frame.render_widget(text, area);
            }
            Resource::Success(customers) => {
                let rows: Vec<Row> = customers
                    .iter()
                    .map(|c| customer_row(state.scope, c, &state.calling, theme))
                    .collect();
                let table = Table::new(rows, column_widths(state.scope))
                    .header(
                        Row::new(header_cells(state.scope)).style(
                            Style::default()
                                .fg(theme.text_secondary)
                                .add_modifier(Modifier::BOLD),
                        ),
                    )
                    .row_highlight_style(
                        Style::default()
                            .bg(theme.bg_surface)
                            .add_modifier(Modifier::BOLD),
                    )
                    .block(Block::default().borders(Borders::ALL));
                state.selected = state.selected.min(customers.len().saturating_sub(1));
                state.table_state.select(Some(state.selected));
                frame.render_stateful_widget(table, area, &mut state.table_state);
            }
        }
        state.notification.render(frame, area, theme);
    }

    fn on_key(state: &State, key: KeyEvent) -> Option<Msg> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(Msg::SelectPrev),
            KeyCode::Down | KeyCode::Char('j') => Some(Msg::SelectNext),
            KeyCode::Char('r') => Some(Msg::Refresh),
            KeyCode::Char('c') | KeyCode::Enter if state.scope != ListScope::Resolved => {
                Some(Msg::PlaceCall)
            }
            KeyCode::Esc if state.notification.current().is_some() => {
                Some(Msg::DismissNotification)
            }
            _ => None,
        }
    }

    fn title() -> &'static str {
        "Customers"
    }
}

fn fetch(scope: ListScope, generation: u64) -> Command<Msg> {
    Command::perform(
        async move {
            let api = crate::api_client();
            let result = match scope {
                ListScope::All => api.list_all().await,
                ListScope::Pending => api.list_pending().await,
                ListScope::Resolved => api.list_resolved().await,
            };
            result.map_err(|e| e.to_string())
        },
        move |result| Msg::CustomersLoaded(generation, result),
    )
}

/// Apply the view's display filter. The resolved view keeps only successful
/// calls, in the order the backend returned them.
fn visible_customers(scope: ListScope, customers: Vec<Customer>) -> Vec<Customer> {
    match scope {
        ListScope::Resolved => customers
            .into_iter()
            .filter(|c| c.call_status.is_successful())
            .collect(),
        ListScope::All | ListScope::Pending => customers,
    }
}

fn place_call(state: &mut State) -> Command<Msg> {
    let Resource::Success(customers) = &state.customers else {
        return Command::None;
    };
    let Some(customer) = customers.get(state.selected) else {
        return Command::None;
    };
    // Only pending customers are actionable, and only one call per row at a
    // time. The row's status is not changed optimistically; the next list
    // load reflects whatever the backend recorded.
    if !customer.call_status.is_pending() || state.calling.contains(&customer.id) {
        return Command::None;
    }
    state.calling.insert(customer.id.clone());
    let id = customer.id.clone();
    let name = customer.name.clone();
    Command::perform(
        async move {
            let result = crate::api_client().start_call(&id).await;
            (id, result.map(|_| name).map_err(|e| e.to_string()))
        },
        |(id, result)| Msg::CallSettled(id, result),
    )
}

fn header_cells(scope: ListScope) -> Vec<&'static str> {
    match scope {
        ListScope::Resolved => vec!["Name", "Phone", "Loan Amount", "Notes", "Status"],
        _ => vec!["Name", "Phone", "Loan Amount", "Due Date", "Status", "Call"],
    }
}

fn column_widths(scope: ListScope) -> Vec<Constraint> {
    match scope {
        ListScope::Resolved => vec![
            Constraint::Fill(2),
            Constraint::Length(14),
            Constraint::Length(12),
            Constraint::Fill(3),
            Constraint::Length(14),
        ],
        _ => vec![
            Constraint::Fill(2),
            Constraint::Length(14),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(14),
            Constraint::Length(12),
        ],
    }
}

fn customer_row<'a>(
    scope: ListScope,
    customer: &Customer,
    calling: &HashSet<String>,
    theme: &Theme,
) -> Row<'a> {
    let status_color = if customer.call_status.is_pending() {
        theme.accent_warning
    } else if customer.call_status.is_successful() {
        theme.accent_success
    } else {
        theme.text_secondary
    };
    let status = Cell::from(customer.call_status.to_string())
        .style(Style::default().fg(status_color));

    let mut cells = vec![
        Cell::from(customer.name.clone()),
        Cell::from(customer.phone.clone()),
        Cell::from(format!("${:.2}", customer.loan_amount)),
    ];
    match scope {
        ListScope::Resolved => {
            cells.push(Cell::from(customer.notes.clone().unwrap_or_default()));
            cells.push(status);
        }
        _ => {
            cells.push(Cell::from(customer.due_date.to_string()));
            cells.push(status);
            cells.push(call_cell(customer, calling, theme));
        }
    }
    Row::new(cells)
}

fn call_cell<'a>(customer: &Customer, calling: &HashSet<String>, theme: &Theme) -> Cell<'a> {
    if calling.contains(&customer.id) {
        Cell::from("Calling...").style(Style::default().fg(theme.accent_warning))
    } else if customer.call_status.is_pending() {
        Cell::from(Line::from("[c] Call")).style(Style::default().fg(theme.accent_primary))
    } else {
        Cell::from("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_customer(id: &str, name: &str, status: CallStatus) -> Customer {
        Customer {
            id: id.to_string(),
            name: name.to_string(),
            phone: "555-0100".to_string(),
            loan_amount: 1000.0,
            due_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            call_status: status,
            notes: None,
        }
    }

    fn ready_state(scope: ListScope, customers: Vec<Customer>) -> State {
        let (mut state, _) = CustomerListApp::init(scope);
        let cmd = CustomerListApp::update(&mut state, Msg::CustomersLoaded(1, Ok(customers)));
        assert!(cmd.is_none());
        state
    }

    #[test]
    fn test_init_fetches_once() {
        let (state, cmd) = CustomerListApp::init(ListScope::All);
        assert_eq!(state.customers, Resource::Loading);
        assert!(matches!(cmd, Command::Perform(_)));
    }

    #[test]
    fn test_resolved_view_keeps_only_successful_in_order() {
        let state = ready_state(
            ListScope::Resolved,
            vec![
                make_customer("1", "A", CallStatus::Successful),
                make_customer("2", "B", CallStatus::Pending),
                make_customer("3", "C", CallStatus::Successful),
                make_customer("4", "D", CallStatus::Other("FAILED".into())),
            ],
        );
        let names: Vec<&str> = state
            .customers
            .value()
            .unwrap()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn test_all_view_shows_every_status() {
        let state = ready_state(
            ListScope::All,
            vec![
                make_customer("1", "A", CallStatus::Pending),
                make_customer("2", "B", CallStatus::Other("NEEDFOLLOWUP".into())),
            ],
        );
        assert_eq!(state.customers.value().unwrap().len(), 2);
    }

    #[test]
    fn test_load_failure_renders_error_state() {
        let (mut state, _) = CustomerListApp::init(ListScope::All);
        let cmd = CustomerListApp::update(
            &mut state,
            Msg::CustomersLoaded(1, Err("connection refused".into())),
        );
        assert!(cmd.is_none());
        assert_eq!(state.customers, Resource::Failure("connection refused".into()));
    }

    #[test]
    fn test_stale_generation_settlement_is_discarded() {
        let (mut state, _) = CustomerListApp::init(ListScope::All);
        // A refresh supersedes the initial fetch before it settles.
        let cmd = CustomerListApp::update(&mut state, Msg::Refresh);
        assert!(matches!(cmd, Command::Perform(_)));

        let cmd = CustomerListApp::update(
            &mut state,
            Msg::CustomersLoaded(1, Ok(vec![make_customer("1", "A", CallStatus::Pending)])),
        );
        assert!(cmd.is_none());
        assert_eq!(state.customers, Resource::Loading);

        // The superseding fetch still applies.
        let generation = state.generation;
        let cmd = CustomerListApp::update(
            &mut state,
            Msg::CustomersLoaded(
                generation,
                Ok(vec![make_customer("1", "A", CallStatus::Pending)]),
            ),
        );
        assert!(cmd.is_none());
        assert_eq!(state.customers.value().unwrap().len(), 1);
    }

    #[test]
    fn test_place_call_guards_reentry() {
        let mut state = ready_state(
            ListScope::Pending,
            vec![make_customer("1", "A", CallStatus::Pending)],
        );
        let first = CustomerListApp::update(&mut state, Msg::PlaceCall);
        assert!(matches!(first, Command::Perform(_)));
        assert!(state.calling.contains("1"));

        let second = CustomerListApp::update(&mut state, Msg::PlaceCall);
        assert!(second.is_none());
    }

    #[test]
    fn test_place_call_ignores_non_pending_rows() {
        let mut state = ready_state(
            ListScope::All,
            vec![make_customer("1", "A", CallStatus::Successful)],
        );
        let cmd = CustomerListApp::update(&mut state, Msg::PlaceCall);
        assert!(cmd.is_none());
        assert!(state.calling.is_empty());
    }

    #[test]
    fn test_call_success_acknowledges_and_clears_busy() {
        let mut state = ready_state(
            ListScope::Pending,
            vec![make_customer("1", "A", CallStatus::Pending)],
        );
        let _ = CustomerListApp::update(&mut state, Msg::PlaceCall);
        let cmd =
            CustomerListApp::update(&mut state, Msg::CallSettled("1".into(), Ok("A".into())));
        // The dwell timer for the acknowledgment.
        assert!(matches!(cmd, Command::Perform(_)));
        assert!(state.calling.is_empty());

        let notification = state.notification.current().unwrap();
        assert_eq!(notification.text, "Call initiated to A");
        assert_eq!(notification.severity, Severity::Info);
    }

    #[test]
    fn test_call_failure_is_soft() {
        let mut state = ready_state(
            ListScope::Pending,
            vec![make_customer("1", "A", CallStatus::Pending)],
        );
        let _ = CustomerListApp::update(&mut state, Msg::PlaceCall);
        let cmd = CustomerListApp::update(
            &mut state,
            Msg::CallSettled("1".into(), Err("service unavailable".into())),
        );
        assert!(cmd.is_none());
        // Busy flag cleared so the agent can press the button again.
        assert!(state.calling.is_empty());
        assert!(state.notification.current().is_none());
    }

    #[test]
    fn test_refresh_clears_busy_flags() {
        let mut state = ready_state(
            ListScope::Pending,
            vec![make_customer("1", "A", CallStatus::Pending)],
        );
        let _ = CustomerListApp::update(&mut state, Msg::PlaceCall);
        let _ = CustomerListApp::update(&mut state, Msg::Refresh);
        assert!(state.calling.is_empty());
        assert!(state.customers.is_loading());
    }
}
