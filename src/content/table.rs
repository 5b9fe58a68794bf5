//! GitHub-flavored Markdown table rendering.
//!
//! Rows may be ragged. The column count is the widest row, and every
//! rendered row (header and separator included) is padded to it, so no
//! cell is ever dropped.

/// A table of plain cell strings. Row 0 is the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkdownTable {
    /// Cell contents: `rows[row_idx][col_idx]`.
    pub rows: Vec<Vec<String>>,
}

impl MarkdownTable {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Widest row across the whole table, not just the header.
    pub fn col_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Render this table as a GitHub-flavored markdown table.
    pub fn to_markdown(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        let col_count = self.col_count();
        if col_count == 0 {
            return String::new();
        }

        let mut md = String::new();

        // Header row
        push_row(&mut md, &self.rows[0], col_count);

        // Separator row
        md.push('|');
        for _ in 0..col_count {
            md.push_str(" --- |");
        }
        md.push('\n');

        // Data rows
        for row in self.rows.iter().skip(1) {
            push_row(&mut md, row, col_count);
        }

        md
    }
}

fn push_row(md: &mut String, row: &[String], col_count: usize) {
    md.push('|');
    for col in 0..col_count {
        let cell = row.get(col).map_or(String::new(), |c| escape_cell(c));
        if cell.is_empty() {
            md.push_str("  |");
        } else {
            md.push(' ');
            md.push_str(&cell);
            md.push_str(" |");
        }
    }
    md.push('\n');
}

/// Keep a cell on one line and inside its column.
fn escape_cell(cell: &str) -> String {
    let mut out = String::with_capacity(cell.len());
    let mut chars = cell.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                // already escaped
                out.push('\\');
                if let Some(pipe) = chars.next() {
                    out.push(pipe);
                }
            }
            '|' => out.push_str("\\|"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("<br>");
            }
            '\n' => out.push_str("<br>"),
            other => out.push(other),
        }
    }
    out
}
