//! [`Node`] tree → Markdown text.
//!
//! Output style: ATX headings, fenced code, `-` bullets, `---` rules,
//! tight lists, `*emphasis*` and `**strong**`, GFM tables.

use super::ast::{flatten_text, Node};
use crate::content::table::MarkdownTable;

/// Markers used when writing Markdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Code fence character (`` ` `` or `~`).
    pub fence: char,
    /// Bullet list marker (`-`, `*` or `+`).
    pub bullet: char,
    /// Thematic break character, written three times.
    pub rule: char,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            fence: '`',
            bullet: '-',
            rule: '-',
        }
    }
}

/// Serialize with the default options.
pub fn serialize(node: &Node) -> String {
    serialize_with(node, SerializeOptions::default())
}

/// Serialize a tree. Non-empty output always ends with one newline.
pub fn serialize_with(node: &Node, options: SerializeOptions) -> String {
    let writer = Writer { options };
    let body = match node {
        Node::Root(children) => writer.blocks(children, "\n\n"),
        other => writer.block(other),
    };
    let body = body.trim_end();
    if body.is_empty() {
        String::new()
    } else {
        format!("{body}\n")
    }
}

struct Writer {
    options: SerializeOptions,
}

impl Writer {
    /// Block sequence. Runs of inline nodes are treated as one paragraph.
    fn blocks(&self, nodes: &[Node], separator: &str) -> String {
        let mut out: Vec<String> = Vec::new();
        let mut pending_inline: Vec<Node> = Vec::new();

        for node in nodes {
            if node.is_inline() {
                pending_inline.push(node.clone());
                continue;
            }
            if !pending_inline.is_empty() {
                out.push(self.paragraph(&std::mem::take(&mut pending_inline)));
            }
            out.push(self.block(node));
        }
        if !pending_inline.is_empty() {
            out.push(self.paragraph(&pending_inline));
        }

        out.retain(|b| !b.trim().is_empty());
        out.join(separator)
    }

    fn block(&self, node: &Node) -> String {
        match node {
            Node::Root(children) => self.blocks(children, "\n\n"),
            Node::Heading { depth, children } => {
                let content = self.inline(children).replace('\n', " ");
                let content = content.trim();
                if content.is_empty() {
                    return String::new();
                }
                format!("{} {}", "#".repeat(usize::from((*depth).clamp(1, 6))), content)
            }
            Node::Paragraph(children) => self.paragraph(children),
            Node::List {
                ordered,
                start,
                children,
            } => self.list(*ordered, start.unwrap_or(1), children),
            Node::ListItem(children) => self.blocks(children, "\n"),
            Node::Blockquote(children) => {
                let inner = self.blocks(children, "\n\n");
                inner
                    .lines()
                    .map(|line| {
                        if line.is_empty() {
                            ">".to_string()
                        } else {
                            format!("> {line}")
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            Node::Code { lang, value } => self.code(lang.as_deref(), value),
            Node::ThematicBreak => self.options.rule.to_string().repeat(3),
            Node::Table(rows) => self.table(rows),
            Node::Html(html) => html.clone(),
            inline => self.paragraph(std::slice::from_ref(inline)),
        }
    }

    fn paragraph(&self, children: &[Node]) -> String {
        let text = self.inline(children);
        text.lines()
            .map(|line| escape_line_start(line.trim_start()))
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }

    fn list(&self, ordered: bool, start: u64, items: &[Node]) -> String {
        let mut lines = Vec::with_capacity(items.len());

        for (idx, item) in items.iter().enumerate() {
            let marker = if ordered {
                format!("{}.", start.saturating_add(idx as u64))
            } else {
                self.options.bullet.to_string()
            };
            let content = match item {
                Node::ListItem(children) => self.blocks(children, "\n"),
                other => self.block(other),
            };

            if content.is_empty() {
                lines.push(marker);
                continue;
            }

            let indent = " ".repeat(marker.len() + 1);
            let mut rendered = String::new();
            for (line_idx, line) in content.lines().enumerate() {
                if line_idx == 0 {
                    rendered.push_str(&marker);
                    rendered.push(' ');
                    rendered.push_str(line);
                } else {
                    rendered.push('\n');
                    if !line.is_empty() {
                        rendered.push_str(&indent);
                        rendered.push_str(line);
                    }
                }
            }
            lines.push(rendered);
        }

        lines.join("\n")
    }

    fn code(&self, lang: Option<&str>, value: &str) -> String {
        let longest_run = longest_run(value, self.options.fence);
        let fence = self.options.fence.to_string().repeat(longest_run.max(2) + 1);
        format!("{fence}{}\n{value}\n{fence}", lang.unwrap_or(""))
    }

    fn table(&self, rows: &[Vec<Vec<Node>>]) -> String {
        let rows = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| {
                        self.inline(cell)
                            .replace("\\\n", "<br>")
                            .trim()
                            .to_string()
                    })
                    .collect()
            })
            .collect();
        MarkdownTable::new(rows).to_markdown().trim_end().to_string()
    }

    fn inline(&self, nodes: &[Node]) -> String {
        let mut out = String::new();
        for node in nodes {
            out.push_str(&self.phrasing(node));
        }
        out
    }

    fn phrasing(&self, node: &Node) -> String {
        match node {
            Node::Text(text) => escape_text(text),
            Node::InlineCode(code) => inline_code(code),
            Node::Emphasis(children) => wrap("*", &self.inline(children)),
            Node::Strong(children) => wrap("**", &self.inline(children)),
            Node::Delete(children) => wrap("~~", &self.inline(children)),
            Node::Link {
                url,
                title,
                children,
            } => {
                let label = self.inline(children);
                format!("[{label}]({}{})", destination(url), title_suffix(title.as_deref()))
            }
            Node::Image { url, alt, title } => format!(
                "![{}]({}{})",
                escape_text(alt),
                destination(url),
                title_suffix(title.as_deref())
            ),
            Node::Break => "\\\n".to_string(),
            Node::Html(html) => html.clone(),
            block => escape_text(&flatten_text(block)),
        }
    }
}

/// Wrap `inner` in `marker`, moving edge whitespace outside the markers
/// so the result still parses as emphasis.
fn wrap(marker: &str, inner: &str) -> String {
    let trimmed = inner.trim();
    if trimmed.is_empty() {
        return inner.to_string();
    }
    let lead = &inner[..inner.len() - inner.trim_start().len()];
    let trail = &inner[inner.trim_end().len()..];
    format!("{lead}{marker}{trimmed}{marker}{trail}")
}

fn inline_code(code: &str) -> String {
    let ticks = "`".repeat(longest_run(code, '`') + 1);
    if code.starts_with('`') || code.ends_with('`') {
        format!("{ticks} {code} {ticks}")
    } else {
        format!("{ticks}{code}{ticks}")
    }
}

fn destination(url: &str) -> String {
    if url.contains(' ') || url.contains(')') || url.contains('(') {
        format!("<{url}>")
    } else {
        url.to_string()
    }
}

fn title_suffix(title: Option<&str>) -> String {
    title.map_or_else(String::new, |t| format!(" \"{}\"", t.replace('"', "\\\"")))
}

fn longest_run(s: &str, ch: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in s.chars() {
        if c == ch {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Escape characters that would start inline markup, raw HTML or an
/// entity reference.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '*' | '_' | '`' | '[' | ']' | '<' | '&') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape a leading character that would turn a paragraph line into a
/// heading, quote, list item or setext underline.
fn escape_line_start(line: &str) -> String {
    let Some(first) = line.chars().next() else {
        return String::new();
    };

    let needs_escape = match first {
        '#' | '>' => true,
        '-' | '+' => {
            line.len() == 1
                || line[1..].starts_with(' ')
                || line.chars().all(|c| c == first || c == ' ')
        }
        '=' => line.chars().all(|c| c == '=' || c == ' '),
        _ => false,
    };
    if needs_escape {
        return format!("\\{line}");
    }

    // "1. text" / "1) text"
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 && digits <= 9 {
        let rest = &line[digits..];
        if (rest.starts_with(". ") || rest.starts_with(") ") || rest == "." || rest == ")")
            && digits < line.len()
        {
            return format!("{}\\{}", &line[..digits], rest);
        }
    }

    line.to_string()
}
