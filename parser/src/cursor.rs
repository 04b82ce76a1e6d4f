//! A line-and-column-aware cursor over help text.
//!
//! The grammars in this crate are hand-written recursive descent; the cursor
//! supplies the primitives they share: character classes for CLI tokens,
//! word scanning, literal matching, whitespace control, and cheap
//! save/restore so a failed alternative can rewind without side effects.
//! Columns are 1-based, matching the indentation stack's convention.

/// Characters that can start a CLI element, e.g. the `@` in `-@`.
pub fn is_element_start(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '@'
}

/// Characters that can appear inside a CLI element, e.g. `-some-arg`.
pub fn is_element_body(ch: char) -> bool {
    is_element_start(ch) || matches!(ch, '-' | '_' | '.')
}

/// Characters allowed inside a flag's argument, e.g. `<file.fa|file.fa.gz>`.
pub fn is_argument_body(ch: char) -> bool {
    is_element_body(ch) || ch == '|'
}

/// Characters allowed inside an angle-bracket-delimited argument, which may
/// contain spaces, e.g. `-arg <argument with space>`.
pub fn is_delimited_body(ch: char) -> bool {
    is_argument_body(ch) || matches!(ch, ' ' | '\\' | '/')
}

/// Characters that can separate two synonyms of one flag.
pub fn is_synonym_delim(ch: char) -> bool {
    matches!(ch, ',' | '|' | '/')
}

/// A restorable position within the input text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark(usize);

/// Cursor over one help text.
#[derive(Debug)]
pub struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.text.len()
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn mark(&self) -> Mark {
        Mark(self.pos)
    }

    pub fn reset(&mut self, mark: Mark) {
        self.pos = mark.0;
    }

    /// Moves the cursor to an absolute byte offset. The offset must lie on a
    /// character boundary of the original text.
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos.min(self.text.len());
    }

    pub fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    pub fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    /// 1-based column of the current position.
    pub fn col(&self) -> usize {
        let line_start = self.text[..self.pos]
            .rfind('\n')
            .map_or(0, |index| index + 1);
        self.pos - line_start + 1
    }

    /// True at offset 0 or just after a newline.
    pub fn at_line_start(&self) -> bool {
        self.pos == 0 || self.text.as_bytes().get(self.pos - 1) == Some(&b'\n')
    }

    /// Consumes `ch` if it is next.
    pub fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.pos += ch.len_utf8();
            true
        } else {
            false
        }
    }

    /// Consumes spaces and tabs, returning how many characters were skipped.
    pub fn skip_inline_ws(&mut self) -> usize {
        let mut count = 0;
        while matches!(self.peek(), Some(' ') | Some('\t')) {
            self.pos += 1;
            count += 1;
        }
        count
    }

    /// Consumes spaces, tabs, and newlines (with optional carriage returns).
    pub fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(' ') | Some('\t') | Some('\n') | Some('\r')) {
            self.pos += 1;
        }
    }

    /// True when the rest of the current line is blank.
    pub fn at_line_end(&self) -> bool {
        let mut rest = self.text[self.pos..].chars();
        loop {
            match rest.next() {
                None | Some('\n') => return true,
                Some(' ') | Some('\t') | Some('\r') => continue,
                Some(_) => return false,
            }
        }
    }

    /// Consumes and returns the rest of the current line (trimmed), plus the
    /// terminating newline if present.
    pub fn take_line(&mut self) -> &'a str {
        let rest = &self.text[self.pos..];
        match rest.find('\n') {
            Some(index) => {
                self.pos += index + 1;
                rest[..index].trim()
            }
            None => {
                self.pos = self.text.len();
                rest.trim()
            }
        }
    }

    /// Consumes a word whose first character satisfies `start` and whose
    /// remaining characters satisfy `body`. Returns `None` (without moving)
    /// when the next character is not a valid start.
    pub fn take_word(
        &mut self,
        start: fn(char) -> bool,
        body: fn(char) -> bool,
    ) -> Option<&'a str> {
        let first = self.peek()?;
        if !start(first) {
            return None;
        }
        let begin = self.pos;
        self.pos += first.len_utf8();
        while let Some(ch) = self.peek() {
            if body(ch) {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
        Some(&self.text[begin..self.pos])
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_col_is_one_based_across_lines() {
        let mut cursor = Cursor::new("ab\n  cd");
        assert_eq!(cursor.col(), 1);
        cursor.bump();
        assert_eq!(cursor.col(), 2);
        cursor.seek(3);
        assert!(cursor.at_line_start());
        assert_eq!(cursor.col(), 1);
        cursor.skip_inline_ws();
        assert_eq!(cursor.col(), 3);
    }

    #[test]
    fn test_take_word_respects_classes() {
        let mut cursor = Cursor::new("max-count=NUM");
        let word = cursor.take_word(is_element_start, is_element_body).unwrap();
        assert_eq!(word, "max-count");
        assert_eq!(cursor.peek(), Some('='));
    }

    #[test]
    fn test_take_line_trims_and_consumes_newline() {
        let mut cursor = Cursor::new("  hello world  \nnext");
        assert_eq!(cursor.take_line(), "hello world");
        assert!(cursor.at_line_start());
        assert_eq!(cursor.peek(), Some('n'));
    }

    #[test]
    fn test_reset_rewinds() {
        let mut cursor = Cursor::new("abc");
        let mark = cursor.mark();
        cursor.bump();
        cursor.bump();
        cursor.reset(mark);
        assert_eq!(cursor.peek(), Some('a'));
    }

}
