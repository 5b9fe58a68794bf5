//! Structure recovery from positioned PDF text.
//!
//! PDFs carry no semantic markup, only positioned glyph runs. This module
//! turns the runs of one page into Markdown lines:
//!
//! ```text
//! runs → group_lines (vertical proximity) → classify_line → page text
//! ```
//!
//! Classification looks at one line at a time. It never looks back at
//! previous lines or ahead at following ones, so the output for a line
//! depends only on that line's text.

/// A positioned run of text as reported by the PDF text layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    /// Left edge in PDF points (1pt = 1/72 inch).
    pub x: f32,
    /// Baseline Y position (bottom-up coordinate system).
    pub y: f32,
}

impl TextRun {
    pub fn new(text: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
        }
    }
}

/// Default vertical tolerance for [`group_lines`].
pub const DEFAULT_LINE_TOLERANCE: f32 = 2.0;

/// Bullet glyphs recognised at the start of a line.
const BULLETS: [char; 4] = ['•', '·', '-', '*'];

/// Group runs into visual lines in a single pass.
///
/// A run joins the current line when its `y` is strictly within
/// `tolerance` of the previous run's `y`; otherwise the current line is
/// closed. Runs of a line are joined with one space. Document order is
/// kept: runs are never sorted, and lines are never merged afterwards.
pub fn group_lines(runs: &[TextRun], tolerance: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut last_y: Option<f32> = None;

    for run in runs {
        if let Some(y) = last_y {
            if (run.y - y).abs() >= tolerance {
                lines.push(current.join(" "));
                current.clear();
            }
        }
        current.push(&run.text);
        last_y = Some(run.y);
    }

    if !current.is_empty() {
        lines.push(current.join(" "));
    }

    lines
}

/// Map one line of page text to its Markdown form.
///
/// - empty → empty (paragraph break)
/// - bullet glyph + whitespace → `- item`
/// - short ALL-CAPS line, or short line ending in `:` → `### heading`
/// - anything else → verbatim
pub fn classify_line(line: &str) -> String {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    if let Some(item) = strip_bullet(trimmed) {
        return format!("- {item}");
    }

    if is_heading(trimmed) {
        let title = trimmed.strip_suffix(':').unwrap_or(trimmed).trim_end();
        return format!("### {title}");
    }

    trimmed.to_string()
}

fn strip_bullet(line: &str) -> Option<&str> {
    let mut chars = line.chars();
    let first = chars.next()?;
    if !BULLETS.contains(&first) {
        return None;
    }
    let rest = chars.as_str();
    if rest.starts_with(char::is_whitespace) {
        Some(rest.trim_start())
    } else {
        None
    }
}

fn is_heading(line: &str) -> bool {
    let len = line.chars().count();
    let all_caps = len < 60
        && line
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c.is_whitespace());
    let label = len < 80 && line.ends_with(':');
    all_caps || label
}

/// Classify every line of a page and join them with newlines.
pub fn render_page(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| classify_line(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Join rendered pages with a horizontal rule marking each page break.
pub fn join_pages(pages: &[String]) -> String {
    pages.join("\n\n---\n\n")
}

/// Runs of one page → Markdown for that page.
pub fn page_to_markdown(runs: &[TextRun], tolerance: f32) -> String {
    render_page(&group_lines(runs, tolerance))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, y: f32) -> TextRun {
        TextRun::new(text, 0.0, y)
    }

    #[test]
    fn groups_runs_within_tolerance() {
        let runs = vec![
            run("Tender", 100.0),
            run("No.", 100.5),
            run("42", 100.0),
            run("Closing date", 200.0),
        ];
        let lines = group_lines(&runs, DEFAULT_LINE_TOLERANCE);
        assert_eq!(lines, vec!["Tender No. 42", "Closing date"]);
    }

    #[test]
    fn tolerance_is_strict() {
        let runs = vec![run("a", 100.0), run("b", 102.0)];
        assert_eq!(group_lines(&runs, 2.0), vec!["a", "b"]);
        assert_eq!(group_lines(&runs, 2.5), vec!["a b"]);
    }

    #[test]
    fn tolerance_tracks_previous_run() {
        // drifts 1.5 per run; each step is within tolerance
        let runs = vec![run("a", 100.0), run("b", 101.5), run("c", 103.0)];
        assert_eq!(group_lines(&runs, 2.0), vec!["a b c"]);
    }

    #[test]
    fn no_runs_no_lines() {
        assert!(group_lines(&[], 2.0).is_empty());
    }

    #[test]
    fn blank_line_stays_blank() {
        assert_eq!(classify_line("   "), "");
    }

    #[test]
    fn bullets_become_list_items() {
        assert_eq!(classify_line("• Provide 3 quotes"), "- Provide 3 quotes");
        assert_eq!(classify_line("·  Valid license"), "- Valid license");
        assert_eq!(classify_line("- dash item"), "- dash item");
        assert_eq!(classify_line("* star item"), "- star item");
    }

    #[test]
    fn bullet_needs_whitespace() {
        assert_eq!(classify_line("-5 degrees is cold"), "-5 degrees is cold");
        assert_eq!(classify_line("*emphasis* here"), "*emphasis* here");
    }

    #[test]
    fn all_caps_short_line_is_heading() {
        assert_eq!(classify_line("SECTION 2 - SCOPE OF WORK"), "### SECTION 2 - SCOPE OF WORK");
    }

    #[test]
    fn long_all_caps_line_is_text() {
        let line = "A".repeat(60);
        assert_eq!(classify_line(&line), line);
    }

    #[test]
    fn colon_label_is_heading_without_colon() {
        assert_eq!(classify_line("Submission requirements:"), "### Submission requirements");
    }

    #[test]
    fn long_colon_line_is_text() {
        let line = format!("{}:", "x".repeat(80));
        assert_eq!(classify_line(&line), line);
    }

    #[test]
    fn mixed_case_sentence_is_text() {
        assert_eq!(
            classify_line("  Bids must be sealed.  "),
            "Bids must be sealed."
        );
    }

    #[test]
    fn pages_are_separated_by_rule() {
        let pages = vec!["page one".to_string(), "page two".to_string()];
        assert_eq!(join_pages(&pages), "page one\n\n---\n\npage two");
    }

    #[test]
    fn page_to_markdown_end_to_end() {
        let runs = vec![
            run("REQUEST FOR QUOTATION", 750.0),
            run("Items:", 700.0),
            run("•", 680.0),
            run("Laptops", 680.2),
            run("Delivery within 30 days.", 660.0),
        ];
        assert_eq!(
            page_to_markdown(&runs, DEFAULT_LINE_TOLERANCE),
            "### REQUEST FOR QUOTATION\n### Items\n- Laptops\nDelivery within 30 days."
        );
    }
}
