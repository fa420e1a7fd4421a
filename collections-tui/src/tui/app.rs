use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

use super::command::Command;
use super::theme::Theme;

/// A single dashboard view.
///
/// Each view owns its state exclusively; nothing is shared across views.
/// Activation calls `init` (state is never cached across activations) and
/// teardown drops the state together with the message channel feeding it.
pub trait App {
    type State;
    type Msg: Send + 'static;
    type InitParams;

    fn init(params: Self::InitParams) -> (Self::State, Command<Self::Msg>);

    fn update(state: &mut Self::State, msg: Self::Msg) -> Command<Self::Msg>;

    fn view(state: &mut Self::State, frame: &mut Frame, area: Rect, theme: &Theme);

    fn on_key(state: &Self::State, key: KeyEvent) -> Option<Self::Msg>;

    /// When true, the runtime keeps printable keys out of the global bindings
    /// so they reach the focused text field.
    fn wants_text_input(_state: &Self::State) -> bool {
        false
    }

    fn title() -> &'static str;
}
