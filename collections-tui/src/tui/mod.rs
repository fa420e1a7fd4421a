pub mod app;
pub mod apps;
pub mod command;
pub mod notification;
pub mod resource;
pub mod runtime;
pub mod theme;
pub mod widgets;

pub use runtime::run;
