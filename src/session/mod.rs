//! Wiring between user gestures, the three engines and the API client.

mod command;
mod view;

pub use command::SessionCommand;
pub use view::{LanguageSelection, SessionSnapshot, SessionView};
