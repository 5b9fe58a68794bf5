//! XLSX to Markdown conversion handler.
//!
//! Every sheet becomes a `## {name}` heading followed by one GFM table, in
//! workbook order. Cells are stringified without type coercion: shared and
//! inline strings verbatim, booleans as `true`/`false`, numbers in their
//! shortest round-trip form (`3`, `4.5`). Dates stay serial numbers.
//!
//! # Pipeline
//!
//! ```text
//! zip → workbook.xml (+ rels) → sharedStrings.xml → sheetN.xml rows → GFM tables
//! ```

use std::collections::BTreeMap;
use std::time::Instant;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, instrument};

use super::ooxml::{attr, resolve_target, split_part, Package};
use super::table::MarkdownTable;
use super::{Converter, ConversionResult};
use crate::error::Result;

/// A sheet row: `None` where the cell is absent.
pub type Row = Vec<Option<String>>;

/// Converts XLSX workbooks to Markdown tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxConverter;

impl XlsxConverter {
    /// Convert workbook bytes to Markdown, returning the sheet count too.
    #[instrument(skip_all, fields(bytes = bytes.len()))]
    pub fn convert(bytes: &[u8]) -> Result<(String, usize)> {
        let mut package = Package::open(bytes)?;
        let workbook_part = package.main_part("xl/workbook.xml")?;
        let workbook_xml = package.require_text(&workbook_part)?;
        let rels = package.relationships(&workbook_part)?;
        let (workbook_dir, _) = split_part(&workbook_part);

        let shared = match rels
            .values()
            .find(|r| r.kind.ends_with("/sharedStrings"))
            .map(|r| resolve_target(workbook_dir, &r.target))
        {
            Some(part) => match package.read_text(&part)? {
                Some(xml) => parse_shared_strings(&xml)?,
                None => Vec::new(),
            },
            None => match package.read_text("xl/sharedStrings.xml")? {
                Some(xml) => parse_shared_strings(&xml)?,
                None => Vec::new(),
            },
        };

        let sheets = parse_workbook(&workbook_xml)?;
        let mut rendered = Vec::with_capacity(sheets.len());

        for (idx, sheet) in sheets.iter().enumerate() {
            let part = sheet
                .rel_id
                .as_ref()
                .and_then(|id| rels.get(id))
                .map_or_else(
                    || format!("{workbook_dir}/worksheets/sheet{}.xml", idx + 1),
                    |rel| resolve_target(workbook_dir, &rel.target),
                );
            let rows = match package.read_text(&part)? {
                Some(xml) => parse_sheet_rows(&xml, &shared)?,
                None => Vec::new(),
            };
            debug!(sheet = %sheet.name, part = %part, rows = rows.len(), "read sheet");
            rendered.push(render_sheet(&sheet.name, &rows));
        }

        Ok((rendered.join("\n"), sheets.len()))
    }
}

impl Converter for XlsxConverter {
    fn name(&self) -> &'static str {
        "xlsx"
    }

    fn matches(&self, extension: &str) -> bool {
        extension.contains("xls")
    }

    fn to_markdown(&self, bytes: &[u8]) -> Result<ConversionResult> {
        let start = Instant::now();
        let (markdown, _sheets) = Self::convert(bytes)?;

        Ok(ConversionResult {
            markdown,
            converter: self.name().to_string(),
            page_count: None,
            elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
        })
    }
}

/// Convert XLSX bytes to Markdown, one table per sheet.
pub fn convert_xlsx_to_markdown(bytes: &[u8]) -> Result<String> {
    XlsxConverter::convert(bytes).map(|(markdown, _)| markdown)
}

/// Render one sheet: heading, blank line, then the table (if any rows).
///
/// The column count is the longest row in the sheet, so ragged rows never
/// lose cells and every rendered row has the same width.
pub fn render_sheet(name: &str, rows: &[Row]) -> String {
    let mut md = format!("## {name}\n\n");
    if rows.is_empty() {
        md.push('\n');
        return md;
    }

    let cells = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| cell.clone().unwrap_or_default())
                .collect()
        })
        .collect();
    md.push_str(&MarkdownTable::new(cells).to_markdown());
    md
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SheetEntry {
    name: String,
    rel_id: Option<String>,
}

fn parse_workbook(xml: &str) -> Result<Vec<SheetEntry>> {
    let mut reader = Reader::from_str(xml);
    let mut sheets = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                sheets.push(SheetEntry {
                    name: attr(&e, b"name").unwrap_or_default(),
                    rel_id: attr(&e, b"id"),
                });
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(sheets)
}

/// Shared string table. Rich-text runs are concatenated; phonetic
/// guides (`<rPh>`) are skipped.
fn parse_shared_strings(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut strings = Vec::new();
    let mut current: Option<String> = None;
    let mut in_t = false;
    let mut in_phonetic = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => current = Some(String::new()),
                b"t" => in_t = true,
                b"rPh" => in_phonetic = true,
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::End(e) => match e.local_name().as_ref() {
                b"si" => strings.push(current.take().unwrap_or_default()),
                b"t" => in_t = false,
                b"rPh" => in_phonetic = false,
                _ => {}
            },
            Event::Text(t) if in_t && !in_phonetic => {
                if let Some(s) = current.as_mut() {
                    s.push_str(&t.unescape()?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(strings)
}

/// Cell being read.
struct CellState {
    row: u32,
    col: u32,
    kind: Option<String>,
    value: String,
    has_value: bool,
}

/// Read a worksheet into rows over its used range.
///
/// The range starts at the `<dimension>` origin (or the first populated
/// cell) and ends at the last populated row. Blank rows inside the range
/// are empty vectors; a row's length is its last populated column + 1.
fn parse_sheet_rows(xml: &str, shared: &[String]) -> Result<Vec<Row>> {
    let mut reader = Reader::from_str(xml);
    let mut cells: BTreeMap<u32, BTreeMap<u32, String>> = BTreeMap::new();
    let mut origin: Option<(u32, u32)> = None;
    let mut row_idx: Option<u32> = None;
    let mut next_col: u32 = 0;
    let mut cell: Option<CellState> = None;
    let mut in_value = false;
    let mut in_inline_text = false;
    let mut in_phonetic = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"dimension" => origin = dimension_origin(&e),
                b"row" => {
                    row_idx = Some(next_row(&e, row_idx));
                    next_col = 0;
                }
                b"c" => {
                    let (row, col) = cell_position(&e, row_idx.unwrap_or(0), next_col);
                    next_col = col + 1;
                    cell = Some(CellState {
                        row,
                        col,
                        kind: attr(&e, b"t"),
                        value: String::new(),
                        has_value: false,
                    });
                }
                b"v" => in_value = true,
                b"t" => in_inline_text = true,
                b"rPh" => in_phonetic = true,
                b"is" => {
                    if let Some(c) = cell.as_mut() {
                        c.has_value = true;
                    }
                }
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"dimension" => origin = dimension_origin(&e),
                b"row" => {
                    row_idx = Some(next_row(&e, row_idx));
                    next_col = 0;
                }
                b"c" => {
                    let (_, col) = cell_position(&e, row_idx.unwrap_or(0), next_col);
                    next_col = col + 1;
                }
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"v" => in_value = false,
                b"t" => in_inline_text = false,
                b"rPh" => in_phonetic = false,
                b"c" => {
                    if let Some(c) = cell.take() {
                        if c.has_value {
                            let value = cell_value(c.kind.as_deref(), &c.value, shared);
                            cells.entry(c.row).or_default().insert(c.col, value);
                        }
                    }
                }
                _ => {}
            },
            Event::Text(t) if in_value || (in_inline_text && !in_phonetic) => {
                if let Some(c) = cell.as_mut() {
                    c.value.push_str(&t.unescape()?);
                    c.has_value = true;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(build_rows(&cells, origin))
}

fn build_rows(cells: &BTreeMap<u32, BTreeMap<u32, String>>, origin: Option<(u32, u32)>) -> Vec<Row> {
    let (Some(first_row), Some(last_row)) = (cells.keys().next(), cells.keys().next_back()) else {
        return Vec::new();
    };
    let first_col = cells
        .values()
        .filter_map(|cols| cols.keys().next())
        .min()
        .copied()
        .unwrap_or(0);

    let (start_row, start_col) = match origin {
        Some((r, c)) => (r.min(*first_row), c.min(first_col)),
        None => (*first_row, first_col),
    };

    (start_row..=*last_row)
        .map(|r| {
            let Some(cols) = cells.get(&r) else {
                return Vec::new();
            };
            let Some(last_col) = cols.keys().next_back() else {
                return Vec::new();
            };
            (start_col..=*last_col).map(|c| cols.get(&c).cloned()).collect()
        })
        .collect()
}

fn cell_value(kind: Option<&str>, raw: &str, shared: &[String]) -> String {
    match kind {
        Some("s") => raw
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|idx| shared.get(idx))
            .cloned()
            .unwrap_or_default(),
        Some("b") => if raw.trim() == "1" { "true" } else { "false" }.to_string(),
        Some("inlineStr" | "str" | "e" | "d") => raw.to_string(),
        _ => format_number(raw),
    }
}

/// Numbers the way JavaScript prints them: shortest round-trip decimal
/// (`3`, `0.1`, `-2.5`) inside `[1e-6, 1e21)`, exponent form outside
/// (`1e+21`, `1.5e-7`).
fn format_number(raw: &str) -> String {
    match raw.trim().parse::<f64>() {
        Ok(n) if n == 0.0 => "0".to_string(),
        Ok(n) if n.is_finite() => {
            if (1e-6..1e21).contains(&n.abs()) {
                return format!("{n}");
            }
            let exp = format!("{n:e}");
            match exp.split_once('e') {
                Some((mantissa, power)) if !power.starts_with('-') => {
                    format!("{mantissa}e+{power}")
                }
                _ => exp,
            }
        }
        _ => raw.to_string(),
    }
}

fn next_row(e: &BytesStart<'_>, previous: Option<u32>) -> u32 {
    attr(e, b"r")
        .and_then(|r| r.parse::<u32>().ok())
        .and_then(|r| r.checked_sub(1))
        .unwrap_or_else(|| previous.map_or(0, |p| p + 1))
}

fn cell_position(e: &BytesStart<'_>, row: u32, next_col: u32) -> (u32, u32) {
    attr(e, b"r")
        .and_then(|r| parse_cell_ref(&r))
        .unwrap_or((row, next_col))
}

fn dimension_origin(e: &BytesStart<'_>) -> Option<(u32, u32)> {
    let reference = attr(e, b"ref")?;
    let first = reference.split(':').next()?;
    parse_cell_ref(first)
}

/// `"B3"` → `(2, 1)` as zero-based (row, col). `$` anchors are ignored.
pub fn parse_cell_ref(reference: &str) -> Option<(u32, u32)> {
    let reference = reference.replace('$', "");
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let mut col: u32 = 0;
    for c in letters.chars() {
        let value = u32::from(c.to_ascii_uppercase() as u8 - b'A') + 1;
        col = col.checked_mul(26)?.checked_add(value)?;
    }
    let row: u32 = digits.parse().ok()?;
    Some((row.checked_sub(1)?, col - 1))
}

/// Sheet names in workbook order.
pub fn sheet_names(bytes: &[u8]) -> Result<Vec<String>> {
    let mut package = Package::open(bytes)?;
    let workbook_part = package.main_part("xl/workbook.xml")?;
    let xml = package.require_text(&workbook_part)?;
    Ok(parse_workbook(&xml)?.into_iter().map(|s| s.name).collect())
}
