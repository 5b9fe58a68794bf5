//! In-memory OOXML fixtures for unit tests.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_WORKSHEET: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
const REL_SHARED_STRINGS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings";
pub const REL_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
pub const REL_HYPERLINK: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Zip the given `(name, content)` parts.
pub fn zip_parts(parts: &[(&str, &str)]) -> Vec<u8> {
    let binary: Vec<(&str, &[u8])> = parts.iter().map(|(n, c)| (*n, c.as_bytes())).collect();
    zip_binary_parts(&binary)
}

pub fn zip_binary_parts(parts: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, content) in parts {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn rels(entries: &[(String, &str, String)]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (id, kind, target) in entries {
        let mode = if kind.ends_with("/hyperlink") {
            r#" TargetMode="External""#
        } else {
            ""
        };
        xml.push_str(&format!(
            r#"<Relationship Id="{id}" Type="{kind}" Target="{target}"{mode}/>"#
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn col_letter(mut col: usize) -> String {
    let mut out = Vec::new();
    loop {
        out.push(b'A' + (col % 26) as u8);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    out.reverse();
    String::from_utf8(out).unwrap()
}

/// Build a workbook. Numeric-looking cells are stored as numbers, empty
/// strings are left out, everything else goes through shared strings.
pub fn xlsx(sheets: &[(&str, Vec<Vec<&str>>)]) -> Vec<u8> {
    let mut shared: Vec<String> = Vec::new();
    let mut sheet_parts = Vec::new();

    for (rows_idx, (_, rows)) in sheets.iter().enumerate() {
        let mut xml = String::from(
            r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
        );
        for (r, row) in rows.iter().enumerate() {
            xml.push_str(&format!(r#"<row r="{}">"#, r + 1));
            for (c, value) in row.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                let reference = format!("{}{}", col_letter(c), r + 1);
                if value.parse::<f64>().is_ok() {
                    xml.push_str(&format!(r#"<c r="{reference}"><v>{value}</v></c>"#));
                } else {
                    let idx = shared.iter().position(|s| s == value).unwrap_or_else(|| {
                        shared.push((*value).to_string());
                        shared.len() - 1
                    });
                    xml.push_str(&format!(r#"<c r="{reference}" t="s"><v>{idx}</v></c>"#));
                }
            }
            xml.push_str("</row>");
        }
        xml.push_str("</sheetData></worksheet>");
        sheet_parts.push((format!("xl/worksheets/sheet{}.xml", rows_idx + 1), xml));
    }

    let mut workbook = String::from(
        r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
    );
    let mut workbook_rels = Vec::new();
    for (idx, (name, _)) in sheets.iter().enumerate() {
        let id = format!("rId{}", idx + 1);
        workbook.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}" r:id="{id}"/>"#,
            html_escape::encode_double_quoted_attribute(name),
            idx + 1
        ));
        workbook_rels.push((id, REL_WORKSHEET, format!("worksheets/sheet{}.xml", idx + 1)));
    }
    workbook.push_str("</sheets></workbook>");
    workbook_rels.push(("rIdSst".to_string(), REL_SHARED_STRINGS, "sharedStrings.xml".to_string()));

    let mut sst = String::from(
        r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    );
    for s in &shared {
        sst.push_str(&format!(
            r#"<si><t xml:space="preserve">{}</t></si>"#,
            html_escape::encode_text(s)
        ));
    }
    sst.push_str("</sst>");

    let root_rels = rels(&[("rId1".to_string(), REL_OFFICE_DOCUMENT, "xl/workbook.xml".to_string())]);
    let workbook_rels = rels(&workbook_rels);

    let mut parts: Vec<(&str, &str)> = vec![
        ("_rels/.rels", root_rels.as_str()),
        ("xl/workbook.xml", workbook.as_str()),
        ("xl/_rels/workbook.xml.rels", workbook_rels.as_str()),
        ("xl/sharedStrings.xml", sst.as_str()),
    ];
    for (name, xml) in &sheet_parts {
        parts.push((name.as_str(), xml.as_str()));
    }
    zip_parts(&parts)
}

/// Optional parts of a test document.
#[derive(Default)]
pub struct DocxParts<'a> {
    pub styles: Option<&'a str>,
    pub numbering: Option<&'a str>,
    /// `(id, type, target)`; hyperlink relationships are marked external.
    pub relationships: Vec<(&'a str, &'a str, &'a str)>,
    /// Binary parts such as `word/media/image1.png`.
    pub media: Vec<(&'a str, &'a [u8])>,
}

/// Wrap `body` in a `w:document` and package it.
pub fn docx(body: &str, extra: &DocxParts<'_>) -> Vec<u8> {
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{W_NS}" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture" xmlns:v="urn:schemas-microsoft-com:vml" xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006"><w:body>{body}</w:body></w:document>"#
    );
    let root_rels = rels(&[("rId1".to_string(), REL_OFFICE_DOCUMENT, "word/document.xml".to_string())]);
    let doc_rels = rels(
        &extra
            .relationships
            .iter()
            .map(|(id, kind, target)| ((*id).to_string(), *kind, (*target).to_string()))
            .collect::<Vec<_>>(),
    );

    let mut parts: Vec<(&str, &[u8])> = vec![
        ("_rels/.rels", root_rels.as_bytes()),
        ("word/document.xml", document.as_bytes()),
        ("word/_rels/document.xml.rels", doc_rels.as_bytes()),
    ];
    if let Some(styles) = extra.styles {
        parts.push(("word/styles.xml", styles.as_bytes()));
    }
    if let Some(numbering) = extra.numbering {
        parts.push(("word/numbering.xml", numbering.as_bytes()));
    }
    for (name, bytes) in &extra.media {
        parts.push((*name, *bytes));
    }
    zip_binary_parts(&parts)
}

#[test]
fn column_letters() {
    assert_eq!(col_letter(0), "A");
    assert_eq!(col_letter(25), "Z");
    assert_eq!(col_letter(26), "AA");
}
