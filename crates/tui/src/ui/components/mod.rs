pub mod common;
pub mod field_input;
pub mod form_view;

pub use common::TextInputState;
pub use field_input::TerminalWidget;
pub use form_view::{ENTER_ACTION, FormHost, FormView, Outcome};
