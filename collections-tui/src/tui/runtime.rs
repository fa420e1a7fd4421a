//! Message-driven event loop.
//!
//! One view is active at a time. Each activation gets a fresh state and a
//! fresh message channel; command futures are spawned on tokio and settle by
//! sending into that channel. Switching views drops the receiver, which is
//! what cancels in-flight work: the remote side effect itself is not
//! revocable, but its settlement lands nowhere.

use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Paragraph, Tabs};
use ratatui::{DefaultTerminal, Frame};
use tokio::sync::mpsc;

use super::app::App;
use super::apps::{AddCustomerApp, CustomerListApp, ListScope, UploadRecordingApp, View};
use super::command::Command;
use super::theme::Theme;

enum Transition {
    SwitchTo(View),
    Quit,
}

pub async fn run() -> Result<()> {
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal).await;
    ratatui::restore();
    result
}

async fn event_loop(terminal: &mut DefaultTerminal) -> Result<()> {
    let theme = Theme::default();
    let mut events = EventStream::new();
    let mut view = View::AllCustomers;
    loop {
        let transition = match view {
            View::AllCustomers => {
                run_view::<CustomerListApp>(terminal, &mut events, &theme, view, ListScope::All)
                    .await?
            }
            View::PendingCustomers => {
                run_view::<CustomerListApp>(terminal, &mut events, &theme, view, ListScope::Pending)
                    .await?
            }
            View::ResolvedCustomers => {
                run_view::<CustomerListApp>(terminal, &mut events, &theme, view, ListScope::Resolved)
                    .await?
            }
            View::AddCustomer => {
                run_view::<AddCustomerApp>(terminal, &mut events, &theme, view, ()).await?
            }
            View::UploadRecording => {
                run_view::<UploadRecordingApp>(terminal, &mut events, &theme, view, ()).await?
            }
        };
        match transition {
            Transition::SwitchTo(next) => view = next,
            Transition::Quit => return Ok(()),
        }
    }
}

/// Drive one view until it is superseded or the dashboard quits.
async fn run_view<A: App>(
    terminal: &mut DefaultTerminal,
    events: &mut EventStream,
    theme: &Theme,
    current: View,
    params: A::InitParams,
) -> Result<Transition> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let (mut state, cmd) = A::init(params);
    dispatch(cmd, &tx);
    loop {
        terminal.draw(|frame| draw_chrome::<A>(frame, &mut state, theme, current))?;
        tokio::select! {
            event = events.next() => {
                let Some(event) = event else {
                    return Ok(Transition::Quit);
                };
                if let Event::Key(key) = event? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if let Some(transition) = global_key::<A>(&state, key, current) {
                        return Ok(transition);
                    }
                    if let Some(msg) = A::on_key(&state, key) {
                        dispatch(A::update(&mut state, msg), &tx);
                    }
                }
            }
            Some(msg) = rx.recv() => {
                dispatch(A::update(&mut state, msg), &tx);
            }
        }
    }
}

/// Bindings that work in every view. Printable keys are left alone while a
/// text field has focus; digit keys re-activate even the current view, which
/// always means a fresh fetch.
fn global_key<A: App>(state: &A::State, key: KeyEvent, current: View) -> Option<Transition> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Transition::Quit);
    }
    match key.code {
        KeyCode::Tab => Some(Transition::SwitchTo(current.next())),
        KeyCode::BackTab => Some(Transition::SwitchTo(current.prev())),
        KeyCode::Char('q') if !A::wants_text_input(state) => Some(Transition::Quit),
        KeyCode::Char(c) if !A::wants_text_input(state) => {
            View::from_digit(c).map(Transition::SwitchTo)
        }
        _ => None,
    }
}

/// Spawn the command's effects.
fn dispatch<Msg: Send + 'static>(command: Command<Msg>, tx: &mpsc::UnboundedSender<Msg>) {
    match command {
        Command::None => {}
        Command::Perform(future) => {
            let tx = tx.clone();
            tokio::spawn(async move {
                let msg = future.await;
                // A failed send means the view was torn down while the
                // operation was in flight; the settlement is dropped instead
                // of being applied to discarded state.
                if tx.send(msg).is_err() {
                    log::debug!("dropping settlement for a torn-down view");
                }
            });
        }
    }
}

fn draw_chrome<A: App>(frame: &mut Frame, state: &mut A::State, theme: &Theme, current: View) {
    let [tabs_area, body, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let titles = View::ALL
        .iter()
        .enumerate()
        .map(|(i, v)| format!("{} {}", i + 1, v.title()));
    let tabs = Tabs::new(titles)
        .select(current.index())
        .style(Style::default().fg(theme.text_secondary))
        .highlight_style(
            Style::default()
                .fg(theme.accent_primary)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, tabs_area);

    A::view(state, frame, body, theme);

    let hint = Paragraph::new(format!("{} · Tab/1-5 switch view · q quit", A::title()))
        .style(Style::default().fg(theme.text_secondary));
    frame.render_widget(hint, footer);
}
