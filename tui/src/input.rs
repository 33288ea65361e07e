//! Single-line text editor used for field drafts and the import prompt.
//!
//! The buffer is a `Vec<char>` so cursor arithmetic is per character,
//! not per byte.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputLine {
    buffer: Vec<char>,
    cursor: usize,
}


impl InputLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// An editor holding `text` with the cursor at the end.
    pub fn with_text(text: &str) -> Self {
        let mut line = InputLine::new();
        line.set_text(text);
        line
    }

    /// Replace the buffer and put the cursor at the end.
    pub fn set_text(&mut self, text: &str) {
        self.buffer = text.chars().collect();
        self.cursor = self.buffer.len();
    }

    pub fn insert(&mut self, ch: char) {
        self.buffer.insert(self.cursor, ch);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, s: &str) {
        for ch in s.chars() {
            self.insert(ch);
        }
    }

    /// Backspace.
    pub fn delete_back(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.buffer.remove(self.cursor);
        }
    }

    pub fn delete_forward(&mut self) {
        if self.cursor < self.buffer.len() {
            self.buffer.remove(self.cursor);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.buffer.len() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.buffer.len();
    }

    /// Move to the start of the previous word.
    pub fn move_word_left(&mut self) {
        self.cursor = self.word_start_before(self.cursor);
    }

    /// Move past the current word and any separators after it.
    pub fn move_word_right(&mut self) {
        let len = self.buffer.len();
        let mut pos = self.cursor;
        while pos < len && is_word(self.buffer[pos]) {
            pos += 1;
        }
        while pos < len && !is_word(self.buffer[pos]) {
            pos += 1;
        }
        self.cursor = pos;
    }

    /// Ctrl-W.
    pub fn delete_word_back(&mut self) {
        let end = self.cursor;
        self.cursor = self.word_start_before(end);
        self.buffer.drain(self.cursor..end);
    }

    /// Ctrl-U: drop everything before the cursor.
    pub fn delete_to_start(&mut self) {
        self.buffer.drain(..self.cursor);
        self.cursor = 0;
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    pub fn text(&self) -> String {
        self.buffer.iter().collect()
    }

    /// Return the text and leave the editor empty.
    pub fn take(&mut self) -> String {
        let text = self.text();
        self.clear();
        text
    }

    pub fn cursor_pos(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// The slice of the buffer that fits in `width` columns, scrolled so the
    /// cursor stays visible, and the cursor column within that slice.
    pub fn visible(&self, width: usize) -> (String, usize) {
        if width == 0 {
            return (String::new(), 0);
        }
        // One column is reserved for the cursor when it sits past the end.
        let start = if self.cursor >= width {
            self.cursor + 1 - width
        } else {
            0
        };
        let end = (start + width).min(self.buffer.len());
        let shown: String = self.buffer[start..end].iter().collect();
        (shown, self.cursor - start)
    }

    fn word_start_before(&self, from: usize) -> usize {
        let mut pos = from;
        while pos > 0 && !is_word(self.buffer[pos - 1]) {
            pos -= 1;
        }
        while pos > 0 && is_word(self.buffer[pos - 1]) {
            pos -= 1;
        }
        pos
    }
}


fn is_word(ch: char) -> bool {
    ch.is_alphanumeric()
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
