/// Lifecycle of a remotely fetched value.
///
/// The enum keeps the loading/error/ready states mutually exclusive: the
/// items are only reachable through `Success`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Resource<T> {
    #[default]
    NotAsked,
    Loading,
    Success(T),
    Failure(String),
}

impl<T> Resource<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Resource::NotAsked | Resource::Loading)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Resource::Success(value) => Some(value),
            _ => None,
        }
    }
}
