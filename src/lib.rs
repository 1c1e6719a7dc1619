//! Study-session runtime for the language-learning reader.
//!
//! The crate is organized around three independent engines:
//! - `narration`: the single shared text-to-speech controller.
//! - `scroll`: proportional scroll linking for the dual-pane reading view.
//! - `search`: the translate-then-fan-out word lookup pipeline.
//!
//! `session` wires them to user gestures and to the HTTP client in `api`.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod narration;
pub mod scroll;
pub mod search;
pub mod session;
pub mod text_utils;

pub use error::{SessionError, SessionResult};
pub use models::Example;
