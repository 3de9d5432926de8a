use crate::marker::{diff_marker, full_marker};
use crate::utils::{decode_best_effort, digit_width};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffKind {
    /// Line exists only in the first file.
    Addition,
    /// Line exists only in the second file.
    Deletion,
    /// Line exists in both files with different content.
    Modification,
}

/// One differing line index. `first` is the line of file A, `second` of B.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffRecord<'a> {
    pub line_number: usize,
    pub kind: DiffKind,
    pub first: Option<&'a [u8]>,
    pub second: Option<&'a [u8]>,
}

impl DiffRecord<'_> {
    pub fn marker(&self) -> String {
        match (self.first, self.second) {
            (Some(a), Some(b)) => diff_marker(b, a),
            (Some(line), None) | (None, Some(line)) => full_marker(line.len()),
            (None, None) => String::new(),
        }
    }
}

/// Formats records in the `+`/`-` report layout.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    width: usize,
}

impl Renderer {
    /// `max_line_count` is the larger line count of the two files.
    pub fn new(max_line_count: usize) -> Self {
        Self {
            width: digit_width(max_line_count),
        }
    }

    pub fn render(&self, record: &DiffRecord<'_>, out: &mut String) {
        match record.kind {
            DiffKind::Addition => {
                self.line(out, '+', record.line_number, record.first);
            }
            DiffKind::Deletion => {
                self.line(out, '-', record.line_number, record.second);
            }
            DiffKind::Modification => {
                self.line(out, '-', record.line_number, record.second);
                self.line(out, '+', record.line_number, record.first);
            }
        }
        out.push_str(&format!(
            "{:indent$}{}\n",
            "",
            record.marker(),
            indent = self.width + 3
        ));
    }

    pub fn render_all(&self, records: &[DiffRecord<'_>]) -> String {
        let mut out = String::new();
        for record in records {
            self.render(record, &mut out);
        }
        out
    }

    fn line(&self, out: &mut String, prefix: char, number: usize, text: Option<&[u8]>) {
        let text = decode_best_effort(text.unwrap_or_default());
        out.push_str(&format!("{prefix} {number:>width$}: {text}\n", width = self.width));
    }
}
