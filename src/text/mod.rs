//! Source text and position mapping.
//!
//! [`SourceText`] owns the input, hands out slices by [`TextRange`] and maps
//! byte offsets to line/column positions through a lazily built
//! [`LineIndex`]. Offsets and widths are UTF-8 byte based, like everywhere
//! else in the crate.

mod line_index;

pub use line_index::LineIndex;

use std::fmt;

use once_cell::sync::OnceCell;
use text_size::{TextRange, TextSize};
use triomphe::Arc;

/// A line/column position; both are 0-based, the column counts bytes from the
/// line start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinePosition {
    pub line: u32,
    pub character: u32,
}

impl fmt::Display for LinePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.character + 1)
    }
}

/// A file path paired with a start/end [`LinePosition`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileLinePositionSpan {
    pub path: String,
    pub start: LinePosition,
    pub end: LinePosition,
}

impl fmt::Display for FileLinePositionSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.path, self.start, self.end)
    }
}

#[derive(Debug)]
struct SourceTextData {
    text: Box<str>,
    path: Option<Box<str>>,
    line_index: OnceCell<LineIndex>,
}

/// The immutable input of a parse. Cheap to clone and share.
#[derive(Debug, Clone)]
pub struct SourceText {
    data: Arc<SourceTextData>,
}

impl SourceText {
    pub fn new(text: impl Into<Box<str>>) -> Self {
        Self {
            data: Arc::new(SourceTextData {
                text: text.into(),
                path: None,
                line_index: OnceCell::new(),
            }),
        }
    }

    pub fn with_path(text: impl Into<Box<str>>, path: impl Into<Box<str>>) -> Self {
        Self {
            data: Arc::new(SourceTextData {
                text: text.into(),
                path: Some(path.into()),
                line_index: OnceCell::new(),
            }),
        }
    }

    pub fn path(&self) -> Option<&str> {
        self.data.path.as_deref()
    }

    pub fn as_str(&self) -> &str {
        &self.data.text
    }

    pub fn len(&self) -> TextSize {
        TextSize::of(self.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.data.text.is_empty()
    }

    /// The text covered by `span`.
    ///
    /// # Panics
    /// Panics if `span` is out of range or cuts a character in half.
    pub fn slice(&self, span: TextRange) -> &str {
        assert!(
            span.end() <= self.len(),
            "span {span:?} is out of range for text of length {:?}",
            self.len()
        );
        &self.as_str()[span]
    }

    /// The character starting at `offset`.
    ///
    /// # Panics
    /// Panics if `offset` is at or past the end of the text, or not on a
    /// character boundary.
    pub fn char_at(&self, offset: TextSize) -> char {
        self.as_str()[usize::from(offset)..]
            .chars()
            .next()
            .unwrap_or_else(|| {
                panic!(
                    "offset {offset:?} is out of range for text of length {:?}",
                    self.len()
                )
            })
    }

    pub fn line_index(&self) -> &LineIndex {
        self.data
            .line_index
            .get_or_init(|| LineIndex::new(self.as_str()))
    }

    /// 0-based line containing `offset`.
    pub fn line_number(&self, offset: TextSize) -> usize {
        self.line_index().line_number(offset)
    }

    pub fn line_position(&self, offset: TextSize) -> LinePosition {
        let index = self.line_index();
        let line = index.line_number(offset);
        LinePosition {
            line: line as u32,
            character: u32::from(offset - index.line_start(line)),
        }
    }

    /// Maps `span` to a path + line/column span. An unnamed source reports
    /// the empty path.
    pub fn file_span(&self, span: TextRange) -> FileLinePositionSpan {
        FileLinePositionSpan {
            path: self.path().unwrap_or("").to_owned(),
            start: self.line_position(span.start()),
            end: self.line_position(span.end()),
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_index().line_count()
    }

    /// The lines of this text, in order.
    pub fn lines(&self) -> Lines<'_> {
        Lines {
            source: self,
            line: 0,
        }
    }

    pub fn line(&self, line: usize) -> TextLine<'_> {
        assert!(
            line < self.line_count(),
            "line {line} is out of range, text has {} lines",
            self.line_count()
        );
        TextLine { source: self, line }
    }
}

impl From<&str> for SourceText {
    fn from(text: &str) -> Self {
        SourceText::new(text)
    }
}

impl From<String> for SourceText {
    fn from(text: String) -> Self {
        SourceText::new(text)
    }
}

impl fmt::Display for SourceText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of a [`SourceText`].
#[derive(Debug, Clone, Copy)]
pub struct TextLine<'t> {
    source: &'t SourceText,
    line: usize,
}

impl<'t> TextLine<'t> {
    /// Reconstructs the line a span covers.
    ///
    /// The span must begin exactly at a line start and end exactly at that
    /// line's end, either excluding or including the terminator.
    ///
    /// # Panics
    /// Panics when the span is not aligned to a single full line.
    pub fn from_span(source: &'t SourceText, span: TextRange) -> Self {
        let index = source.line_index();
        let line = index.line_number(span.start());
        assert!(
            index.line_start(line) == span.start(),
            "span does not include the start of a line"
        );
        assert!(
            span.end() == index.line_end(line) || span.end() == index.line_end_including_break(line),
            "span does not include the end of a line"
        );
        Self { source, line }
    }

    pub fn line_number(&self) -> usize {
        self.line
    }

    pub fn start(&self) -> TextSize {
        self.source.line_index().line_start(self.line)
    }

    /// End of the line, terminator excluded.
    pub fn end(&self) -> TextSize {
        self.source.line_index().line_end(self.line)
    }

    /// End of the line, terminator included.
    pub fn end_including_line_break(&self) -> TextSize {
        self.source.line_index().line_end_including_break(self.line)
    }

    pub fn span(&self) -> TextRange {
        TextRange::new(self.start(), self.end())
    }

    pub fn span_including_line_break(&self) -> TextRange {
        TextRange::new(self.start(), self.end_including_line_break())
    }

    /// The line's text, terminator excluded.
    pub fn text(&self) -> &'t str {
        self.source.slice(TextRange::new(self.start(), self.end()))
    }
}

/// Iterator over the [`TextLine`]s of a [`SourceText`].
#[derive(Debug, Clone)]
pub struct Lines<'t> {
    source: &'t SourceText,
    line: usize,
}

impl<'t> Iterator for Lines<'t> {
    type Item = TextLine<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.line >= self.source.line_count() {
            return None;
        }
        let line = TextLine {
            source: self.source,
            line: self.line,
        };
        self.line += 1;
        Some(line)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.source.line_count() - self.line;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Lines<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_cover_everything() {
        let source = SourceText::new("local x\nreturn x\r\n");
        let lines: Vec<_> = source.lines().map(|line| line.text().to_owned()).collect();
        assert_eq!(lines, ["local x", "return x", ""]);
    }

    #[test]
    fn line_positions() {
        let source = SourceText::new("a\r\nbb\nc");
        assert_eq!(
            source.line_position(TextSize::new(4)),
            LinePosition { line: 1, character: 1 }
        );
        assert_eq!(
            source.line_position(TextSize::new(0)),
            LinePosition { line: 0, character: 0 }
        );
    }

    #[test]
    fn from_span_accepts_both_ends() {
        let source = SourceText::new("ab\ncd");
        let with_break = TextLine::from_span(&source, TextRange::new(0.into(), 3.into()));
        assert_eq!(with_break.text(), "ab");
        let without_break = TextLine::from_span(&source, TextRange::new(0.into(), 2.into()));
        assert_eq!(without_break.line_number(), 0);
    }

    #[test]
    #[should_panic(expected = "start of a line")]
    fn from_span_rejects_misaligned_start() {
        let source = SourceText::new("ab\ncd");
        TextLine::from_span(&source, TextRange::new(1.into(), 2.into()));
    }

    #[test]
    #[should_panic(expected = "end of a line")]
    fn from_span_rejects_misaligned_end() {
        let source = SourceText::new("ab\ncd");
        TextLine::from_span(&source, TextRange::new(0.into(), 1.into()));
    }
}
