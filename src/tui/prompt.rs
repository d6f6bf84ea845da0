use crate::util::unicode;

/// Single-line text input with a byte-offset cursor kept on grapheme boundaries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prompt {
    buffer: String,
    cursor: usize,
}

impl Prompt {
    /// A prompt holding `text` with the cursor at the end
    pub fn with_text(text: &str) -> Self {
        Prompt {
            buffer: text.to_string(),
            cursor: text.len(),
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Length in characters, as counted against the task text limit
    pub fn char_count(&self) -> usize {
        self.buffer.trim().chars().count()
    }

    pub fn insert(&mut self, c: char) {
        self.buffer.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_str(&mut self, s: &str) {
        // Single line only
        let clean = s.replace(['\n', '\r'], " ");
        self.buffer.insert_str(self.cursor, &clean);
        self.cursor += clean.len();
    }

    pub fn backspace(&mut self) {
        if let Some(prev) = unicode::prev_grapheme_boundary(&self.buffer, self.cursor) {
            self.buffer.drain(prev..self.cursor);
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if let Some(next) = unicode::next_grapheme_boundary(&self.buffer, self.cursor) {
            self.buffer.drain(self.cursor..next);
        }
    }

    pub fn left(&mut self) {
        if let Some(prev) = unicode::prev_grapheme_boundary(&self.buffer, self.cursor) {
            self.cursor = prev;
        }
    }

    pub fn right(&mut self) {
        if let Some(next) = unicode::next_grapheme_boundary(&self.buffer, self.cursor) {
            self.cursor = next;
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.buffer.len();
    }

    /// Ctrl+U: delete everything before the cursor
    pub fn kill_to_start(&mut self) {
        self.buffer.drain(..self.cursor);
        self.cursor = 0;
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    /// Text before and after the cursor, for rendering
    pub fn split(&self) -> (&str, &str) {
        self.buffer.split_at(self.cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typing_and_editing() {
        let mut p = Prompt::default();
        for c in "Buy mlk".chars() {
            p.insert(c);
        }
        p.left();
        p.left();
        p.insert('i');
        assert_eq!(p.text(), "Buy milk");
        assert_eq!(p.split(), ("Buy mi", "lk"));

        p.end();
        p.backspace();
        assert_eq!(p.text(), "Buy mil");
        p.home();
        p.delete();
        assert_eq!(p.text(), "uy mil");
    }

    #[test]
    fn test_cursor_steps_over_graphemes() {
        let mut p = Prompt::with_text("cafe\u{301}!");
        p.left();
        p.left();
        assert_eq!(p.split(), ("caf", "e\u{301}!"));
        p.delete();
        assert_eq!(p.text(), "caf!");
    }

    #[test]
    fn test_counts_trimmed_chars() {
        let p = Prompt::with_text("  日本語  ");
        assert_eq!(p.char_count(), 3);
    }

    #[test]
    fn test_kill_and_paste() {
        let mut p = Prompt::with_text("old text");
        p.left();
        p.left();
        p.kill_to_start();
        assert_eq!(p.text(), "xt");
        p.insert_str("ne\nxt ");
        assert_eq!(p.text(), "ne xt xt");
        assert_eq!(p.cursor(), 6);
    }

    #[test]
    fn test_edges_are_noops() {
        let mut p = Prompt::default();
        p.backspace();
        p.delete();
        p.left();
        p.right();
        assert_eq!(p, Prompt::default());
    }
}
