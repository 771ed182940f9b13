//! # Metaform terminal front end
//!
//! Drives bound fields from a terminal: [`TerminalWidget`] implements the
//! widget side of a bound field on top of a UTF-8 safe text buffer,
//! [`FormView`] maps crossterm key events onto the field protocol and renders
//! the form with ratatui, and [`run_form`] owns the terminal while the view
//! runs.

pub mod ui;

pub use ui::components::{ENTER_ACTION, FormHost, FormView, Outcome, TerminalWidget, TextInputState};
pub use ui::runtime::run_form;
pub use ui::theme::{Theme, load as load_theme};
