/// Longest draft the input field accepts, in characters.
pub const MAX_DRAFT_CHARS: usize = 500;

/// The not-yet-sent input text. The cursor counts characters, not bytes.
#[derive(Debug, Clone, Default)]
pub struct Draft {
    text: String,
    cursor: usize,
}

impl Draft {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Trimmed text, or `None` when there is nothing worth sending.
    pub fn sendable(&self) -> Option<&str> {
        let trimmed = self.text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }

    /// Returns false when the draft is already at its limit.
    pub fn insert(&mut self, c: char) -> bool {
        if self.char_count() >= MAX_DRAFT_CHARS {
            return false;
        }
        let at = self.byte_offset(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
        true
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_offset(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.char_count() {
            let at = self.byte_offset(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.char_count() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }
}
