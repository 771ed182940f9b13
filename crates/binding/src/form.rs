//! A set of bound fields sharing focus.
//!
//! [`Form`] owns its controls, broadcasts show and locale changes, and moves
//! focus between them. Focus leaves a field only when the field's input
//! verification succeeds.

use indexmap::IndexMap;
use metaform_types::{FieldMetadata, FieldValue};
use tracing::debug;

use crate::error::FormError;
use crate::field::{BoundField, FieldPhase};
use crate::kind::FieldKind;
use crate::monitor::FieldHandle;
use crate::widget::WidgetAdapter;

/// Type-erased view of a bound field sharing the widget type `W`.
pub trait FormControl<W> {
    fn name(&self) -> &str;
    fn metadata(&self) -> &FieldMetadata;
    fn label(&self) -> &str;
    fn phase(&self) -> FieldPhase;
    fn is_focusable(&self) -> bool;
    fn is_invalid(&self) -> bool;
    fn value(&self) -> Option<FieldValue>;

    fn on_shown(&mut self);
    fn reload(&mut self);
    fn on_focus_gained(&mut self);
    fn on_focus_lost(&mut self);
    fn on_edit(&mut self);
    fn on_validate(&mut self) -> bool;
    fn on_final_validation(&mut self) -> bool;
    fn on_rollback_key(&mut self) -> bool;
    fn on_action(&mut self, command: &str);
    fn locale_changed(&mut self);

    fn widget(&self) -> &W;
    fn widget_mut(&mut self) -> &mut W;
    fn handle(&mut self) -> &mut dyn FieldHandle;
}

impl<K: FieldKind, W: WidgetAdapter> FormControl<W> for BoundField<K, W> {
    fn name(&self) -> &str {
        BoundField::name(self)
    }

    fn metadata(&self) -> &FieldMetadata {
        FieldHandle::metadata(self)
    }

    fn label(&self) -> &str {
        BoundField::label(self)
    }

    fn phase(&self) -> FieldPhase {
        BoundField::phase(self)
    }

    fn is_focusable(&self) -> bool {
        !self.format().is_output()
    }

    fn is_invalid(&self) -> bool {
        FieldHandle::is_invalid(self)
    }

    fn value(&self) -> Option<FieldValue> {
        FieldHandle::value(self)
    }

    fn on_shown(&mut self) {
        BoundField::on_shown(self)
    }

    fn reload(&mut self) {
        BoundField::reload(self)
    }

    fn on_focus_gained(&mut self) {
        BoundField::on_focus_gained(self)
    }

    fn on_focus_lost(&mut self) {
        BoundField::on_focus_lost(self)
    }

    fn on_edit(&mut self) {
        BoundField::on_edit(self)
    }

    fn on_validate(&mut self) -> bool {
        BoundField::on_validate(self)
    }

    fn on_final_validation(&mut self) -> bool {
        BoundField::on_final_validation(self)
    }

    fn on_rollback_key(&mut self) -> bool {
        BoundField::on_rollback_key(self)
    }

    fn on_action(&mut self, command: &str) {
        BoundField::on_action(self, command)
    }

    fn locale_changed(&mut self) {
        BoundField::locale_changed(self)
    }

    fn widget(&self) -> &W {
        BoundField::widget(self)
    }

    fn widget_mut(&mut self) -> &mut W {
        BoundField::widget_mut(self)
    }

    fn handle(&mut self) -> &mut dyn FieldHandle {
        self
    }
}

/// Ordered ring of focusable positions.
#[derive(Debug, Default)]
struct FocusRing {
    nodes: Vec<usize>,
    current: Option<usize>,
}

impl FocusRing {
    fn position(&self, index: usize) -> Option<usize> {
        self.nodes.iter().position(|node| *node == index)
    }

    fn next_after(&self, index: Option<usize>) -> Option<usize> {
        if self.nodes.is_empty() {
            return None;
        }
        let next = match index.and_then(|index| self.position(index)) {
            Some(position) => (position + 1) % self.nodes.len(),
            None => 0,
        };
        self.nodes.get(next).copied()
    }

    fn prev_before(&self, index: Option<usize>) -> Option<usize> {
        if self.nodes.is_empty() {
            return None;
        }
        let len = self.nodes.len();
        let prev = match index.and_then(|index| self.position(index)) {
            Some(position) => (position + len - 1) % len,
            None => len - 1,
        };
        self.nodes.get(prev).copied()
    }
}

/// Fields of one screen, in focus traversal order.
pub struct Form<W> {
    controls: Vec<Box<dyn FormControl<W>>>,
    names: IndexMap<String, usize>,
    ring: FocusRing,
}

impl<W> Default for Form<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> Form<W> {
    pub fn new() -> Self {
        Self {
            controls: Vec::new(),
            names: IndexMap::new(),
            ring: FocusRing::default(),
        }
    }

    /// Append a control. Names must be unique within the form.
    pub fn push(&mut self, control: Box<dyn FormControl<W>>) -> Result<(), FormError> {
        let name = control.name().to_string();
        if self.names.contains_key(&name) {
            return Err(FormError::DuplicateField { name });
        }
        let index = self.controls.len();
        if control.is_focusable() {
            self.ring.nodes.push(index);
        }
        self.names.insert(name, index);
        self.controls.push(control);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    pub fn controls(&self) -> impl Iterator<Item = &dyn FormControl<W>> {
        self.controls.iter().map(|control| control.as_ref())
    }

    pub fn control(&self, name: &str) -> Option<&dyn FormControl<W>> {
        self.names.get(name).map(|index| self.controls[*index].as_ref())
    }

    pub fn control_mut(&mut self, name: &str) -> Option<&mut (dyn FormControl<W> + 'static)> {
        let index = *self.names.get(name)?;
        Some(self.controls[index].as_mut())
    }

    pub fn focused_index(&self) -> Option<usize> {
        self.ring.current
    }

    pub fn focused(&self) -> Option<&dyn FormControl<W>> {
        self.ring.current.map(|index| self.controls[index].as_ref())
    }

    pub fn focused_mut(&mut self) -> Option<&mut (dyn FormControl<W> + 'static)> {
        let index = self.ring.current?;
        Some(self.controls[index].as_mut())
    }

    /// First display of every control.
    pub fn show(&mut self) {
        for control in &mut self.controls {
            control.on_shown();
        }
    }

    /// Reload every control from its monitor.
    pub fn reload(&mut self) {
        debug!(fields = self.controls.len(), "reloading form");
        for control in &mut self.controls {
            control.reload();
        }
    }

    pub fn locale_changed(&mut self) {
        for control in &mut self.controls {
            control.locale_changed();
        }
    }

    /// Move focus to `name`. Returns `false` when the current field refused
    /// to release focus or the target can't take it.
    pub fn focus(&mut self, name: &str) -> Result<bool, FormError> {
        let index = *self.names.get(name).ok_or_else(|| FormError::UnknownField {
            name: name.to_string(),
        })?;
        Ok(self.focus_index(index))
    }

    pub fn focus_next(&mut self) -> bool {
        match self.ring.next_after(self.ring.current) {
            Some(index) => self.focus_index(index),
            None => false,
        }
    }

    pub fn focus_prev(&mut self) -> bool {
        match self.ring.prev_before(self.ring.current) {
            Some(index) => self.focus_index(index),
            None => false,
        }
    }

    fn focus_index(&mut self, index: usize) -> bool {
        if self.ring.current == Some(index) {
            return true;
        }
        if self.ring.position(index).is_none() {
            return false;
        }
        if !self.release_focus() {
            return false;
        }
        self.ring.current = Some(index);
        self.controls[index].on_focus_gained();
        true
    }

    /// Take focus away from the current field, if it agrees.
    pub fn release_focus(&mut self) -> bool {
        let Some(current) = self.ring.current else {
            return true;
        };
        let control = &mut self.controls[current];
        if !control.on_validate() {
            debug!(field = %control.name(), "focus kept by failed verification");
            return false;
        }
        control.on_focus_lost();
        self.ring.current = None;
        true
    }

    /// Run final validation on every control; returns the names that failed.
    pub fn final_validation(&mut self) -> Vec<String> {
        self.controls
            .iter_mut()
            .filter_map(|control| (!control.on_final_validation()).then(|| control.name().to_string()))
            .collect()
    }

    /// Committed values keyed by field name.
    pub fn values(&self) -> IndexMap<String, Option<FieldValue>> {
        self.controls
            .iter()
            .map(|control| (control.name().to_string(), control.value()))
            .collect()
    }
}
