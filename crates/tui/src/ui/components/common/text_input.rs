//! UTF-8 safe single-line text buffer with cursor management.
//!
//! Besides the cursor primitives it tracks a whole-content selection, as
//! fields select their content on focus when the format asks for it: the
//! next insertion or deletion replaces the selected text.

#[derive(Clone, Debug, Default)]
pub struct TextInputState {
    /// The underlying text buffer
    input: String,
    /// Cursor byte index into `input` (always on a UTF-8 boundary)
    cursor: usize,
    /// Whole content selected
    selected: bool,
}

impl TextInputState {
    pub fn new() -> Self {
        Self::default()
    }

    // ----- Getters -----
    pub fn input(&self) -> &str {
        &self.input
    }
    pub fn cursor(&self) -> usize {
        self.cursor
    }
    pub fn is_selected(&self) -> bool {
        self.selected
    }
    pub fn is_empty(&self) -> bool {
        self.input.trim().is_empty()
    }

    /// Cursor position in characters, for placing the terminal cursor.
    pub fn cursor_column(&self) -> usize {
        self.input[..self.cursor].chars().count()
    }

    // ----- Setters -----

    /// Replace the content and put the cursor at its end.
    pub fn set_input<S: Into<String>>(&mut self, s: S) {
        self.input = s.into();
        self.cursor = self.input.len();
        self.selected = false;
    }

    pub fn set_cursor(&mut self, cursor: usize) {
        let mut cursor = cursor.min(self.input.len());
        while !self.input.is_char_boundary(cursor) {
            cursor -= 1;
        }
        self.cursor = cursor;
    }

    pub fn select_all(&mut self) {
        self.selected = !self.input.is_empty();
        self.cursor = self.input.len();
    }

    // ----- Editing primitives (UTF-8 safe) -----

    /// Move cursor one Unicode scalar to the left.
    pub fn move_left(&mut self) {
        self.selected = false;
        if self.cursor == 0 {
            return;
        }
        let prev_len = self.input[..self.cursor].chars().last().map(|c| c.len_utf8()).unwrap_or(1);
        self.cursor = self.cursor.saturating_sub(prev_len);
    }

    /// Move cursor one Unicode scalar to the right.
    pub fn move_right(&mut self) {
        self.selected = false;
        if let Some(next) = self.input[self.cursor..].chars().next() {
            self.cursor += next.len_utf8();
        }
    }

    pub fn move_home(&mut self) {
        self.selected = false;
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.selected = false;
        self.cursor = self.input.len();
    }

    /// Insert a char at the cursor, replacing a selection.
    pub fn insert_char(&mut self, c: char) {
        self.take_selection();
        self.input.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Backspace the char immediately before the cursor, or the selection.
    pub fn backspace(&mut self) {
        if self.take_selection() || self.cursor == 0 {
            return;
        }
        let prev = self.input[..self.cursor].chars().last().map(|c| c.len_utf8()).unwrap_or(1);
        let start = self.cursor - prev;
        self.input.drain(start..self.cursor);
        self.cursor = start;
    }

    /// Delete the char under the cursor, or the selection.
    pub fn delete(&mut self) {
        if self.take_selection() {
            return;
        }
        if let Some(next) = self.input[self.cursor..].chars().next() {
            self.input.drain(self.cursor..self.cursor + next.len_utf8());
        }
    }

    /// Clear a pending selection together with the selected text.
    fn take_selection(&mut self) -> bool {
        if !self.selected {
            return false;
        }
        self.selected = false;
        self.input.clear();
        self.cursor = 0;
        true
    }
}
