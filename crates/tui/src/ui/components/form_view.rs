//! Keyboard driven view over a [`Form`] of terminal widgets.
//!
//! Keys are translated into the field protocol: Tab and Shift+Tab move focus
//! (focus stays put when verification fails), Esc asks for a rollback,
//! Enter fires the field's action command and printable keys edit the
//! focused input.

use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use metaform_binding::{CatalogLocalizer, Form, FormManager, FormMonitor, Localizer, StatusMessage};
use metaform_types::RefreshMode;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use tracing::{debug, info};
use unicode_width::UnicodeWidthStr;

use super::common::TextInputState;
use super::field_input::TerminalWidget;
use crate::ui::theme::Theme;

/// Command sent with Enter when the view has no other mapping.
pub const ENTER_ACTION: &str = "enter";

const HINTS: &str = "Tab/Shift+Tab move  Esc rollback  Enter action  F2 locale  Ctrl+S check  Ctrl+Q quit";

/// What the form view needs from the monitor driving its fields.
pub trait FormHost {
    fn status(&self) -> Option<StatusMessage>;

    /// Pending refresh request, reset once taken.
    fn take_refresh(&self) -> RefreshMode;

    /// Ask whether the form may close.
    fn request_exit(&self) -> bool;

    /// Whether an `Exit` decision was already approved.
    fn exit_approved(&self) -> bool;
}

impl<R, M: FormManager<R>> FormHost for FormMonitor<R, M> {
    fn status(&self) -> Option<StatusMessage> {
        FormMonitor::status(self)
    }

    fn take_refresh(&self) -> RefreshMode {
        FormMonitor::take_refresh(self)
    }

    fn request_exit(&self) -> bool {
        FormMonitor::request_exit(self)
    }

    fn exit_approved(&self) -> bool {
        FormMonitor::exit_approved(self)
    }
}

/// Result of handling one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Exit,
}

pub struct FormView {
    title: String,
    form: Form<TerminalWidget>,
    host: Rc<dyn FormHost>,
    catalog: Option<Rc<CatalogLocalizer>>,
    notice: Option<String>,
}

impl FormView {
    pub fn new(title: impl Into<String>, form: Form<TerminalWidget>, host: Rc<dyn FormHost>) -> Self {
        Self {
            title: title.into(),
            form,
            host,
            catalog: None,
            notice: None,
        }
    }

    /// Enable locale cycling with F2.
    pub fn with_catalog(mut self, catalog: Rc<CatalogLocalizer>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn form(&self) -> &Form<TerminalWidget> {
        &self.form
    }

    pub fn into_form(self) -> Form<TerminalWidget> {
        self.form
    }

    /// Show the form and focus its first focusable field.
    pub fn open(&mut self) {
        self.form.show();
        self.form.focus_next();
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Outcome {
        self.notice = None;
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => return self.close(),
            KeyCode::Char('s') if ctrl => self.check(),
            KeyCode::Tab => {
                self.form.focus_next();
            }
            KeyCode::BackTab => {
                self.form.focus_prev();
            }
            KeyCode::Esc => {
                if let Some(control) = self.form.focused_mut() {
                    control.on_rollback_key();
                }
            }
            KeyCode::Enter => {
                if let Some(control) = self.form.focused_mut() {
                    control.on_action(ENTER_ACTION);
                }
            }
            KeyCode::F(2) => self.cycle_locale(),
            KeyCode::Left => self.with_input(|input| input.move_left()),
            KeyCode::Right => self.with_input(|input| input.move_right()),
            KeyCode::Home => self.with_input(|input| input.move_home()),
            KeyCode::End => self.with_input(|input| input.move_end()),
            KeyCode::Backspace => self.edit(|input| input.backspace()),
            KeyCode::Delete => self.edit(|input| input.delete()),
            KeyCode::Char(c) if !ctrl => self.edit(|input| input.insert_char(c)),
            _ => {}
        }
        self.apply_refresh()
    }

    fn with_input(&mut self, apply: impl FnOnce(&mut TextInputState)) {
        if let Some(control) = self.form.focused_mut() {
            apply(&mut control.widget_mut().input);
        }
    }

    fn edit(&mut self, apply: impl FnOnce(&mut TextInputState)) {
        let Some(control) = self.form.focused_mut() else {
            return;
        };
        if !control.widget().is_editable() {
            return;
        }
        apply(&mut control.widget_mut().input);
        control.on_edit();
    }

    fn check(&mut self) {
        let failed = self.form.final_validation();
        self.notice = Some(if failed.is_empty() {
            "all fields are valid".to_string()
        } else {
            format!("invalid: {}", failed.join(", "))
        });
    }

    fn cycle_locale(&mut self) {
        let Some(catalog) = &self.catalog else {
            return;
        };
        let locales: Vec<String> = catalog.locales().map(str::to_string).collect();
        if locales.is_empty() {
            return;
        }
        let current = catalog.current_locale();
        let next = locales
            .iter()
            .position(|locale| *locale == current)
            .map(|position| (position + 1) % locales.len())
            .unwrap_or(0);
        match catalog.set_locale(&locales[next]) {
            Ok(()) => {
                self.form.locale_changed();
                self.notice = Some(format!("locale: {}", locales[next]));
            }
            Err(error) => self.notice = Some(error.to_string()),
        }
    }

    /// Commit the focused field, then ask the host whether the form may close.
    fn close(&mut self) -> Outcome {
        if !self.form.release_focus() {
            let hint = "fix or roll back (Esc) the current field to quit";
            self.notice = Some(match self.host.status() {
                Some(StatusMessage::Error(message)) => format!("{}: {}", hint, message),
                _ => hint.to_string(),
            });
            return Outcome::Continue;
        }
        if self.host.request_exit() {
            info!("form closed");
            Outcome::Exit
        } else {
            self.notice = Some("the form can't be closed now".to_string());
            self.form.focus_next();
            Outcome::Continue
        }
    }

    fn apply_refresh(&mut self) -> Outcome {
        let mode = self.host.take_refresh();
        if mode.requires_reload() {
            debug!(?mode, "refresh requested");
            self.form.reload();
        }
        if self.host.exit_approved() {
            Outcome::Exit
        } else {
            Outcome::Continue
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &dyn Theme) {
        let block = Block::default()
            .title(Span::styled(self.title.as_str(), theme.title_style()))
            .borders(Borders::ALL)
            .border_style(theme.border_style(true))
            .style(ratatui::style::Style::default().bg(theme.roles().background));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [fields_area, status_area, hints_area] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        let label_width = self
            .form
            .controls()
            .map(|control| control.label().width())
            .max()
            .unwrap_or(0) as u16
            + 2;

        let focused = self.form.focused_index();
        for (index, control) in self.form.controls().enumerate() {
            let y = fields_area.y + index as u16;
            if y >= fields_area.bottom() {
                break;
            }
            let widget = control.widget();
            let is_focused = focused == Some(index);
            let label_area = Rect::new(fields_area.x, y, label_width.min(fields_area.width), 1);
            let value_x = fields_area.x + label_area.width;
            let available = fields_area.right().saturating_sub(value_x);
            let value_width = widget
                .columns()
                .map(|columns| (columns as u16).min(available))
                .unwrap_or(available);
            let value_area = Rect::new(value_x, y, value_width, 1);

            frame.render_widget(
                Paragraph::new(control.label()).style(theme.label_style(widget.style(), is_focused)),
                label_area,
            );

            let mut value_style = theme.value_style(widget.highlight(), widget.is_invalid(), widget.is_editable());
            if is_focused {
                value_style = if widget.input.is_selected() {
                    value_style.patch(theme.selection_style())
                } else {
                    value_style.bg(theme.roles().surface)
                };
            }
            let alignment = match widget.alignment() {
                metaform_types::Alignment::Right => ratatui::layout::Alignment::Right,
                metaform_types::Alignment::Center => ratatui::layout::Alignment::Center,
                _ => ratatui::layout::Alignment::Left,
            };
            frame.render_widget(
                Paragraph::new(widget.input.input()).style(value_style).alignment(alignment),
                value_area,
            );

            if is_focused && matches!(alignment, ratatui::layout::Alignment::Left) {
                let column = widget.input.input()[..widget.input.cursor()].width() as u16;
                frame.set_cursor_position((value_area.x + column.min(value_area.width), y));
            }
        }

        frame.render_widget(Paragraph::new(self.status_line(theme)), status_area);
        frame.render_widget(Paragraph::new(HINTS).style(theme.text_muted_style()), hints_area);
    }

    fn status_line(&self, theme: &dyn Theme) -> Line<'static> {
        if let Some(notice) = &self.notice {
            return Line::from(Span::styled(notice.clone(), theme.text_primary_style()));
        }
        match self.host.status() {
            Some(StatusMessage::Error(message)) => Line::from(Span::styled(message, theme.status_error())),
            Some(StatusMessage::Tooltip(message)) => Line::from(Span::styled(message, theme.status_info())),
            None => Line::default(),
        }
    }
}
