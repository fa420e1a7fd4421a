use std::future::Future;
use std::pin::Pin;

/// Effect returned by `App::init`/`App::update`.
///
/// `Perform` futures are spawned by the runtime and their output re-enters
/// the event loop as a message on the owning view's channel. Switching views
/// drops that channel, so a settlement for a torn-down view is discarded
/// instead of applied to discarded state.
pub enum Command<Msg> {
    None,
    Perform(Pin<Box<dyn Future<Output = Msg> + Send>>),
}

impl<Msg: Send + 'static> Command<Msg> {
    pub fn perform<T, Fut, F>(future: Fut, map: F) -> Self
    where
        T: Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        F: FnOnce(T) -> Msg + Send + 'static,
    {
        Command::Perform(Box::pin(async move { map(future.await) }))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Command::None)
    }
}
