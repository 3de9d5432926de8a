use memchr::memchr_iter;

use crate::source::SourceBuffer;

/// Byte range of one line inside a [`SourceBuffer`], without its `\n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    pub offset: usize,
    pub len: usize,
}

impl LineSpan {
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Line spans over a borrowed buffer. Index `i` is line `i + 1`.
#[derive(Debug)]
pub struct LineIndex<'a> {
    bytes: &'a [u8],
    spans: Vec<LineSpan>,
}

impl<'a> LineIndex<'a> {
    pub fn build(buffer: &'a SourceBuffer) -> Self {
        Self::from_bytes(buffer.as_bytes())
    }

    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        let mut spans = Vec::new();
        let mut start = 0;
        for pos in memchr_iter(b'\n', bytes) {
            spans.push(LineSpan {
                offset: start,
                len: pos - start,
            });
            start = pos + 1;
        }
        if start != bytes.len() {
            spans.push(LineSpan {
                offset: start,
                len: bytes.len() - start,
            });
        }
        Self { bytes, spans }
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn spans(&self) -> &[LineSpan] {
        &self.spans
    }

    pub fn line(&self, index: usize) -> Option<&'a [u8]> {
        let span = self.spans.get(index)?;
        let bytes: &'a [u8] = self.bytes;
        bytes.get(span.offset..span.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines<'a>(index: &LineIndex<'a>) -> Vec<&'a [u8]> {
        (0..index.len()).filter_map(|i| index.line(i)).collect()
    }

    #[test]
    fn test_trailing_newline_adds_no_empty_line() {
        let index = LineIndex::from_bytes(b"a\nbb\n");
        assert_eq!(lines(&index), vec![&b"a"[..], b"bb"]);
    }

    #[test]
    fn test_unterminated_last_line_is_kept() {
        let index = LineIndex::from_bytes(b"a\nbb");
        assert_eq!(lines(&index), vec![&b"a"[..], b"bb"]);
        assert_eq!(index.spans()[1], LineSpan { offset: 2, len: 2 });
    }

    #[test]
    fn test_blank_lines_and_carriage_returns() {
        let index = LineIndex::from_bytes(b"\n\nx\r\n");
        assert_eq!(lines(&index), vec![&b""[..], b"", b"x\r"]);
    }

    #[test]
    fn test_empty_buffer() {
        let index = LineIndex::from_bytes(b"");
        assert!(index.is_empty());
        assert_eq!(index.line(0), None);
    }

    #[test]
    fn test_spans_cover_everything_but_delimiters() {
        let bytes = b"one\ntwo\n\nthree";
        let index = LineIndex::from_bytes(bytes);
        let covered: usize = index.spans().iter().map(|s| s.len).sum();
        let newlines = bytes.iter().filter(|&&b| b == b'\n').count();
        assert_eq!(covered + newlines, bytes.len());
        for pair in index.spans().windows(2) {
            assert_eq!(pair[0].end() + 1, pair[1].offset);
        }
    }
}
