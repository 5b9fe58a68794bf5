//! DOCX to Markdown conversion handler.
//!
//! Two stages: the WordprocessingML body is rendered to an HTML fragment
//! (also the preview output of [`convert_docx_to_html`]), and that fragment
//! goes through [`super::html`] into Markdown.
//!
//! # Pipeline
//!
//! ```text
//! zip → document.xml (+ styles, numbering, rels) → body model → HTML → Markdown AST → Markdown
//! ```
//!
//! Only explicit structure is carried over: heading styles, numbered
//! paragraphs, bold/italic/strike runs, hyperlinks, images and tables.
//! Fonts, colours and spacing are dropped.

use std::collections::HashMap;
use std::time::Instant;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use html_escape::{encode_double_quoted_attribute, encode_text};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, instrument, warn};

use super::html::html_to_markdown;
use super::ooxml::{attr, resolve_target, split_part, Package, Relationship};
use super::{Converter, ConversionResult};
use crate::config::DocxOptions;
use crate::error::Result;

/// Elements whose whole subtree is ignored: tracked deletions, field
/// instructions, compatibility fallbacks, text boxes and revision history.
const SKIPPED: &[&[u8]] = &[
    b"del",
    b"moveFrom",
    b"delText",
    b"instrText",
    b"Fallback",
    b"txbxContent",
    b"pPrChange",
    b"rPrChange",
    b"sectPr",
];

fn is_skipped(local: &[u8]) -> bool {
    SKIPPED.contains(&local)
}

/// Converts DOCX documents to HTML and Markdown.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxConverter {
    options: DocxOptions,
}

impl DocxConverter {
    pub fn new(options: DocxOptions) -> Self {
        Self { options }
    }

    /// Render the document body as an HTML fragment.
    #[instrument(skip_all, fields(bytes = bytes.len()))]
    pub fn to_html(&self, bytes: &[u8]) -> Result<String> {
        let mut package = Package::open(bytes)?;
        let document_part = package.main_part("word/document.xml")?;
        let xml = package.require_text(&document_part)?;
        let rels = package.relationships(&document_part)?;
        let base_dir = split_part(&document_part).0.to_string();

        let styles = match related_part(&mut package, &rels, &base_dir, "/styles", "styles.xml")? {
            Some(xml) => parse_styles(&xml)?,
            None => HashMap::new(),
        };
        let numbering =
            match related_part(&mut package, &rels, &base_dir, "/numbering", "numbering.xml")? {
                Some(xml) => Numbering::parse(&xml)?,
                None => Numbering::default(),
            };

        let blocks = BodyParser::new(&xml, &rels).blocks(None)?;
        debug!(blocks = blocks.len(), styles = styles.len(), "parsed document body");

        let mut writer = HtmlWriter {
            package: &mut package,
            rels: &rels,
            base_dir: &base_dir,
            styles: &styles,
            numbering: &numbering,
            options: self.options,
        };
        let mut html = String::new();
        writer.write_blocks(&blocks, &mut html)?;
        Ok(html)
    }

    /// DOCX bytes → Markdown.
    pub fn convert(&self, bytes: &[u8]) -> Result<String> {
        let html = self.to_html(bytes)?;
        Ok(html_to_markdown(&html))
    }
}

impl Converter for DocxConverter {
    fn name(&self) -> &'static str {
        "docx"
    }

    fn matches(&self, extension: &str) -> bool {
        extension.contains("doc")
    }

    fn to_markdown(&self, bytes: &[u8]) -> Result<ConversionResult> {
        let start = Instant::now();
        let markdown = self.convert(bytes)?;

        Ok(ConversionResult {
            markdown,
            converter: self.name().to_string(),
            page_count: None,
            elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
        })
    }
}

/// DOCX bytes → HTML fragment with images inlined as `data:` URIs.
pub fn convert_docx_to_html(bytes: &[u8]) -> Result<String> {
    DocxConverter::default().to_html(bytes)
}

/// DOCX bytes → Markdown (fenced code, `-` bullets, `---` rules).
pub fn convert_docx_to_markdown(bytes: &[u8]) -> Result<String> {
    DocxConverter::default().convert(bytes)
}

fn related_part(
    package: &mut Package<'_>,
    rels: &HashMap<String, Relationship>,
    base_dir: &str,
    kind_suffix: &str,
    fallback: &str,
) -> Result<Option<String>> {
    let part = rels
        .values()
        .find(|r| r.kind.ends_with(kind_suffix))
        .map_or_else(
            || resolve_target(base_dir, fallback),
            |r| resolve_target(base_dir, &r.target),
        );
    package.read_text(&part)
}

// ── Body model ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Format {
    bold: bool,
    italic: bool,
    strike: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Inline {
    Text(String, Format),
    Break,
    Image { rel_id: String, alt: Option<String> },
    Link { href: String, children: Vec<Inline> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct NumberingRef {
    num_id: String,
    level: u8,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Paragraph {
    style: Option<String>,
    numbering: Option<NumberingRef>,
    inlines: Vec<Inline>,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct TableRow {
    header: bool,
    cells: Vec<Vec<Block>>,
}

#[derive(Debug, Clone, PartialEq)]
enum Block {
    Paragraph(Paragraph),
    Table(Vec<TableRow>),
}

/// `w:val` toggle semantics: absent or anything but an explicit "off".
fn toggle(e: &BytesStart<'_>) -> bool {
    attr(e, b"val").map_or(true, |v| !matches!(v.as_str(), "false" | "0" | "off" | "none"))
}

// ── document.xml parser ────────────────────────────────────────────────────

struct BodyParser<'a, 'r> {
    reader: Reader<&'a [u8]>,
    rels: &'r HashMap<String, Relationship>,
}

impl<'a, 'r> BodyParser<'a, 'r> {
    fn new(xml: &'a str, rels: &'r HashMap<String, Relationship>) -> Self {
        Self {
            reader: Reader::from_str(xml),
            rels,
        }
    }

    fn skip(&mut self, e: &BytesStart<'_>) -> Result<()> {
        self.reader.read_to_end(e.name())?;
        Ok(())
    }

    /// Block content up to the end tag `end` (or the end of input).
    /// Unknown containers (`sdt`, `ins`, `customXml`, ...) are transparent.
    fn blocks(&mut self, end: Option<&[u8]>) -> Result<Vec<Block>> {
        let mut blocks = Vec::new();
        loop {
            match self.reader.read_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"p" => blocks.push(Block::Paragraph(self.paragraph()?)),
                    b"tbl" => blocks.push(Block::Table(self.table()?)),
                    local if is_skipped(local) => self.skip(&e)?,
                    _ => {}
                },
                Event::End(e) if Some(e.local_name().as_ref()) == end => break,
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(blocks)
    }

    fn paragraph(&mut self) -> Result<Paragraph> {
        let mut paragraph = Paragraph::default();
        loop {
            match self.reader.read_event()? {
                Event::Start(e) if e.local_name().as_ref() == b"pPr" => {
                    self.paragraph_properties(&mut paragraph)?;
                }
                Event::Start(e) => self.inline_start(&e, &mut paragraph.inlines)?,
                Event::End(e) if e.local_name().as_ref() == b"p" => break,
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(paragraph)
    }

    /// Runs, hyperlinks and skipped subtrees inside paragraph content.
    fn inline_start(&mut self, e: &BytesStart<'_>, out: &mut Vec<Inline>) -> Result<()> {
        match e.local_name().as_ref() {
            b"r" => out.extend(self.run()?),
            b"hyperlink" => {
                let href = self.hyperlink_target(e);
                let children = self.inlines_until(b"hyperlink")?;
                match href {
                    Some(href) => out.push(Inline::Link { href, children }),
                    None => out.extend(children),
                }
            }
            local if is_skipped(local) => self.skip(e)?,
            _ => {}
        }
        Ok(())
    }

    fn inlines_until(&mut self, end: &[u8]) -> Result<Vec<Inline>> {
        let mut out = Vec::new();
        loop {
            match self.reader.read_event()? {
                Event::Start(e) => self.inline_start(&e, &mut out)?,
                Event::End(e) if e.local_name().as_ref() == end => break,
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(out)
    }

    fn hyperlink_target(&self, e: &BytesStart<'_>) -> Option<String> {
        let target = attr(e, b"id")
            .and_then(|id| self.rels.get(&id))
            .map(|rel| rel.target.clone());
        let anchor = attr(e, b"anchor");
        match (target, anchor) {
            (Some(target), Some(anchor)) => Some(format!("{target}#{anchor}")),
            (Some(target), None) => Some(target),
            (None, Some(anchor)) => Some(format!("#{anchor}")),
            (None, None) => None,
        }
    }

    fn paragraph_properties(&mut self, paragraph: &mut Paragraph) -> Result<()> {
        let mut num_id = None;
        let mut level = 0u8;
        loop {
            match self.reader.read_event()? {
                Event::Start(e)
                    if is_skipped(e.local_name().as_ref()) || e.local_name().as_ref() == b"rPr" =>
                {
                    self.skip(&e)?;
                }
                Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                    b"pStyle" => paragraph.style = attr(&e, b"val"),
                    b"numId" => num_id = attr(&e, b"val"),
                    b"ilvl" => {
                        level = attr(&e, b"val").and_then(|v| v.parse().ok()).unwrap_or(0);
                    }
                    _ => {}
                },
                Event::End(e) if e.local_name().as_ref() == b"pPr" => break,
                Event::Eof => break,
                _ => {}
            }
        }
        // numId 0 removes inherited numbering
        paragraph.numbering = num_id
            .filter(|id| id != "0")
            .map(|num_id| NumberingRef { num_id, level });
        Ok(())
    }

    fn run(&mut self) -> Result<Vec<Inline>> {
        let mut format = Format::default();
        let mut out = Vec::new();
        loop {
            match self.reader.read_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"rPr" => format = self.run_properties()?,
                    b"t" => out.push(Inline::Text(self.text_until(b"t")?, format)),
                    b"drawing" | b"pict" | b"object" => {
                        if let Some(image) = self.image(&e)? {
                            out.push(image);
                        }
                    }
                    local if is_skipped(local) => self.skip(&e)?,
                    _ => {}
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"tab" => out.push(Inline::Text("\t".to_string(), format)),
                    b"noBreakHyphen" => out.push(Inline::Text("-".to_string(), format)),
                    b"cr" => out.push(Inline::Break),
                    b"br" => {
                        if !matches!(attr(&e, b"type").as_deref(), Some("page" | "column")) {
                            out.push(Inline::Break);
                        }
                    }
                    _ => {}
                },
                Event::End(e) if e.local_name().as_ref() == b"r" => break,
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(out)
    }

    fn run_properties(&mut self) -> Result<Format> {
        let mut format = Format::default();
        loop {
            match self.reader.read_event()? {
                Event::Start(e) if is_skipped(e.local_name().as_ref()) => self.skip(&e)?,
                Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                    b"b" => format.bold = toggle(&e),
                    b"i" => format.italic = toggle(&e),
                    b"strike" | b"dstrike" => format.strike = toggle(&e),
                    _ => {}
                },
                Event::End(e) if e.local_name().as_ref() == b"rPr" => break,
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(format)
    }

    fn text_until(&mut self, end: &[u8]) -> Result<String> {
        let mut text = String::new();
        loop {
            match self.reader.read_event()? {
                Event::Text(t) => text.push_str(&t.unescape()?),
                Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c)),
                Event::End(e) if e.local_name().as_ref() == end => break,
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(text)
    }

    /// DrawingML (`a:blip`) or VML (`v:imagedata`) picture inside a run.
    fn image(&mut self, start: &BytesStart<'_>) -> Result<Option<Inline>> {
        let end = start.local_name().as_ref().to_vec();
        let mut rel_id = None;
        let mut alt = None;
        loop {
            match self.reader.read_event()? {
                Event::Start(e) if is_skipped(e.local_name().as_ref()) => self.skip(&e)?,
                Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                    b"docPr" => {
                        alt = attr(&e, b"descr")
                            .filter(|d| !d.trim().is_empty())
                            .or_else(|| attr(&e, b"title").filter(|t| !t.trim().is_empty()));
                    }
                    b"blip" => rel_id = attr(&e, b"embed").or_else(|| attr(&e, b"link")),
                    b"imagedata" => {
                        rel_id = attr(&e, b"id");
                        if alt.is_none() {
                            alt = attr(&e, b"title").filter(|t| !t.trim().is_empty());
                        }
                    }
                    _ => {}
                },
                Event::End(e) if e.local_name().as_ref() == end.as_slice() => break,
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(rel_id.map(|rel_id| Inline::Image { rel_id, alt }))
    }

    fn table(&mut self) -> Result<Vec<TableRow>> {
        let mut rows = Vec::new();
        loop {
            match self.reader.read_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"tr" => rows.push(self.table_row()?),
                    local if is_skipped(local) => self.skip(&e)?,
                    _ => {}
                },
                Event::End(e) if e.local_name().as_ref() == b"tbl" => break,
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(rows)
    }

    fn table_row(&mut self) -> Result<TableRow> {
        let mut row = TableRow::default();
        loop {
            match self.reader.read_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"trPr" => row.header = self.row_is_header()?,
                    b"tc" => row.cells.push(self.blocks(Some(b"tc"))?),
                    local if is_skipped(local) => self.skip(&e)?,
                    _ => {}
                },
                Event::End(e) if e.local_name().as_ref() == b"tr" => break,
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(row)
    }

    fn row_is_header(&mut self) -> Result<bool> {
        let mut header = false;
        loop {
            match self.reader.read_event()? {
                Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"tblHeader" => {
                    header = toggle(&e);
                }
                Event::End(e) if e.local_name().as_ref() == b"trPr" => break,
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(header)
    }
}

// ── styles.xml / numbering.xml ─────────────────────────────────────────────

/// Style id → style name (`Heading1` → `heading 1`).
fn parse_styles(xml: &str) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_str(xml);
    let mut styles = HashMap::new();
    let mut current: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"style" => {
                current = attr(&e, b"styleId");
            }
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"name" => {
                if let (Some(id), Some(name)) = (current.as_ref(), attr(&e, b"val")) {
                    styles.insert(id.clone(), name);
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"style" => current = None,
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(styles)
}

/// List definitions: `numId` → abstract definition → per-level `numFmt`.
#[derive(Debug, Default)]
struct Numbering {
    formats: HashMap<String, HashMap<u8, String>>,
    nums: HashMap<String, String>,
}

impl Numbering {
    fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut numbering = Self::default();
        let mut abstract_id: Option<String> = None;
        let mut level: Option<u8> = None;
        let mut num_id: Option<String> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                    b"abstractNum" => abstract_id = attr(&e, b"abstractNumId"),
                    b"lvl" => level = attr(&e, b"ilvl").and_then(|l| l.parse().ok()),
                    b"numFmt" => {
                        if let (Some(id), Some(lvl), Some(fmt)) =
                            (abstract_id.as_ref(), level, attr(&e, b"val"))
                        {
                            numbering.formats.entry(id.clone()).or_default().insert(lvl, fmt);
                        }
                    }
                    b"num" => num_id = attr(&e, b"numId"),
                    b"abstractNumId" => {
                        if let (Some(num), Some(target)) = (num_id.as_ref(), attr(&e, b"val")) {
                            numbering.nums.insert(num.clone(), target);
                        }
                    }
                    _ => {}
                },
                Event::End(e) => match e.local_name().as_ref() {
                    b"abstractNum" => abstract_id = None,
                    b"lvl" => level = None,
                    b"num" => num_id = None,
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(numbering)
    }

    /// Ordered unless the level is explicitly a bullet.
    fn is_ordered(&self, numbering: &NumberingRef) -> bool {
        self.nums
            .get(&numbering.num_id)
            .and_then(|abstract_id| self.formats.get(abstract_id))
            .and_then(|levels| levels.get(&numbering.level))
            .map_or(true, |fmt| fmt != "bullet")
    }
}

/// `heading N` (1..=6) or `Title`, matched on the style name, or on the
/// raw id (`Heading2`) when the document has no styles part.
fn heading_level(style: &str) -> Option<u8> {
    let lower = style.trim().to_lowercase();
    if lower == "title" {
        return Some(1);
    }
    let level: u8 = lower.strip_prefix("heading")?.trim_start().parse().ok()?;
    (1..=6).contains(&level).then_some(level)
}

// ── HTML rendering ─────────────────────────────────────────────────────────

struct HtmlWriter<'w, 'a> {
    package: &'w mut Package<'a>,
    rels: &'w HashMap<String, Relationship>,
    base_dir: &'w str,
    styles: &'w HashMap<String, String>,
    numbering: &'w Numbering,
    options: DocxOptions,
}

impl HtmlWriter<'_, '_> {
    fn write_blocks(&mut self, blocks: &[Block], out: &mut String) -> Result<()> {
        // open lists, innermost last; each has an open <li>
        let mut lists: Vec<bool> = Vec::new();

        for block in blocks {
            match block {
                Block::Paragraph(paragraph) if !self.has_content(&paragraph.inlines) => {}
                Block::Paragraph(paragraph) => {
                    let heading = paragraph
                        .style
                        .as_ref()
                        .and_then(|id| heading_level(self.styles.get(id).unwrap_or(id)));

                    match (&paragraph.numbering, heading) {
                        (Some(numbering), None) => {
                            let ordered = self.numbering.is_ordered(numbering);
                            open_list_item(&mut lists, usize::from(numbering.level) + 1, ordered, out);
                            self.write_inlines(&paragraph.inlines, out)?;
                        }
                        _ => {
                            close_lists(&mut lists, 0, out);
                            let tag = heading.map_or_else(|| "p".to_string(), |h| format!("h{h}"));
                            out.push_str(&format!("<{tag}>"));
                            self.write_inlines(&paragraph.inlines, out)?;
                            out.push_str(&format!("</{tag}>"));
                        }
                    }
                }
                Block::Table(rows) => {
                    close_lists(&mut lists, 0, out);
                    self.write_table(rows, out)?;
                }
            }
        }

        close_lists(&mut lists, 0, out);
        Ok(())
    }

    fn write_table(&mut self, rows: &[TableRow], out: &mut String) -> Result<()> {
        out.push_str("<table>");
        for row in rows {
            let cell_tag = if row.header { "th" } else { "td" };
            out.push_str("<tr>");
            for cell in &row.cells {
                out.push_str(&format!("<{cell_tag}>"));
                self.write_blocks(cell, out)?;
                out.push_str(&format!("</{cell_tag}>"));
            }
            out.push_str("</tr>");
        }
        out.push_str("</table>");
        Ok(())
    }

    fn has_content(&self, inlines: &[Inline]) -> bool {
        inlines.iter().any(|inline| match inline {
            Inline::Text(text, _) => !text.trim().is_empty(),
            Inline::Break => false,
            Inline::Image { .. } => self.options.inline_images,
            Inline::Link { children, .. } => self.has_content(children),
        })
    }

    fn write_inlines(&mut self, inlines: &[Inline], out: &mut String) -> Result<()> {
        let mut pending: Option<(String, Format)> = None;

        for inline in inlines {
            match inline {
                Inline::Text(text, format) => {
                    if let Some((buffer, current)) = pending.as_mut() {
                        if *current == *format {
                            buffer.push_str(text);
                            continue;
                        }
                    }
                    write_text(pending.take(), out);
                    pending = Some((text.clone(), *format));
                }
                Inline::Break => {
                    write_text(pending.take(), out);
                    out.push_str("<br />");
                }
                Inline::Image { rel_id, alt } => {
                    write_text(pending.take(), out);
                    self.write_image(rel_id, alt.as_deref(), out)?;
                }
                Inline::Link { href, children } => {
                    write_text(pending.take(), out);
                    out.push_str(&format!("<a href=\"{}\">", encode_double_quoted_attribute(href)));
                    self.write_inlines(children, out)?;
                    out.push_str("</a>");
                }
            }
        }

        write_text(pending, out);
        Ok(())
    }

    fn write_image(&mut self, rel_id: &str, alt: Option<&str>, out: &mut String) -> Result<()> {
        if !self.options.inline_images {
            return Ok(());
        }
        let Some(rel) = self.rels.get(rel_id) else {
            warn!(rel_id, "image relationship not found");
            return Ok(());
        };

        let src = if rel.external {
            rel.target.clone()
        } else {
            let part = resolve_target(self.base_dir, &rel.target);
            let Some(bytes) = self.package.read_bytes(&part)? else {
                warn!(%part, "image part missing");
                return Ok(());
            };
            format!("data:{};base64,{}", image_mime(&part), STANDARD.encode(bytes))
        };

        out.push_str(&format!("<img src=\"{}\"", encode_double_quoted_attribute(&src)));
        if let Some(alt) = alt {
            out.push_str(&format!(" alt=\"{}\"", encode_double_quoted_attribute(alt)));
        }
        out.push_str(" />");
        Ok(())
    }
}

/// Make the innermost open list a `depth`-deep list of the given kind with
/// a fresh `<li>` ready for content.
fn open_list_item(lists: &mut Vec<bool>, depth: usize, ordered: bool, out: &mut String) {
    close_lists(lists, depth, out);
    if lists.len() == depth {
        if lists.last() == Some(&ordered) {
            out.push_str("</li><li>");
            return;
        }
        close_lists(lists, depth - 1, out);
    }
    while lists.len() < depth {
        out.push_str(if ordered { "<ol><li>" } else { "<ul><li>" });
        lists.push(ordered);
    }
}

fn close_lists(lists: &mut Vec<bool>, depth: usize, out: &mut String) {
    while lists.len() > depth {
        if let Some(ordered) = lists.pop() {
            out.push_str(if ordered { "</li></ol>" } else { "</li></ul>" });
        }
    }
}

fn write_text(run: Option<(String, Format)>, out: &mut String) {
    let Some((text, format)) = run else {
        return;
    };
    if text.is_empty() {
        return;
    }
    if format.bold {
        out.push_str("<strong>");
    }
    if format.italic {
        out.push_str("<em>");
    }
    if format.strike {
        out.push_str("<s>");
    }
    out.push_str(&encode_text(&text));
    if format.strike {
        out.push_str("</s>");
    }
    if format.italic {
        out.push_str("</em>");
    }
    if format.bold {
        out.push_str("</strong>");
    }
}

fn image_mime(part: &str) -> &'static str {
    let extension = part.rsplit('.').next().unwrap_or_default().to_lowercase();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "emf" => "image/x-emf",
        "wmf" => "image/x-wmf",
        _ => "application/octet-stream",
    }
}
