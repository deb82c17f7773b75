//! Mapping between byte offsets and line/column positions.

use text_size::TextSize;

/// Byte offsets of every line start plus the byte length of each line's
/// terminator.
///
/// Built in a single pass. Recognized terminators: `\n`, `\r`, `\r\n` (one
/// break) and the Unicode line/paragraph separators U+2028/U+2029. The final
/// line has terminator length 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    starts: Vec<TextSize>,
    break_lens: Vec<u8>,
    len: TextSize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut starts = vec![TextSize::new(0)];
        let mut break_lens = Vec::new();
        let mut i = 0usize;
        while i < bytes.len() {
            let break_len = match bytes[i] {
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => 2,
                b'\r' | b'\n' => 1,
                // U+2028 and U+2029 encode as E2 80 A8 / E2 80 A9.
                0xE2 if bytes.get(i + 1) == Some(&0x80)
                    && matches!(bytes.get(i + 2), Some(&0xA8) | Some(&0xA9)) =>
                {
                    3
                }
                _ => {
                    i += 1;
                    continue;
                }
            };
            i += break_len;
            break_lens.push(break_len as u8);
            starts.push(TextSize::new(i as u32));
        }
        break_lens.push(0);
        debug_assert_eq!(starts.len(), break_lens.len());
        Self {
            starts,
            break_lens,
            len: TextSize::of(text),
        }
    }

    /// Number of lines; at least 1 even for empty text.
    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Byte offsets of all line starts, in increasing order. The first entry
    /// is always 0.
    pub fn line_starts(&self) -> &[TextSize] {
        &self.starts
    }

    /// Terminator length in bytes of the given line (0 for the last line).
    pub fn line_break_length(&self, line: usize) -> u8 {
        self.break_lens[line]
    }

    pub fn line_start(&self, line: usize) -> TextSize {
        self.starts[line]
    }

    /// End of the line excluding its terminator.
    pub fn line_end(&self, line: usize) -> TextSize {
        self.line_end_including_break(line) - TextSize::new(u32::from(self.break_lens[line]))
    }

    /// End of the line including its terminator.
    pub fn line_end_including_break(&self, line: usize) -> TextSize {
        match self.starts.get(line + 1) {
            Some(&next) => next,
            None => self.len,
        }
    }

    /// The 0-based line containing `offset`. `offset` may equal the text
    /// length (the position right after the last character).
    ///
    /// # Panics
    /// Panics if `offset` is past the end of the text.
    pub fn line_number(&self, offset: TextSize) -> usize {
        assert!(
            offset <= self.len,
            "offset {offset:?} is out of range for text of length {:?}",
            self.len
        );
        self.starts.partition_point(|&start| start <= offset) - 1
    }
}
