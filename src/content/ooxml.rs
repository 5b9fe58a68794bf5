//! Shared plumbing for Office Open XML packages (DOCX, XLSX).
//!
//! An OOXML file is a zip of XML parts wired together by relationship
//! parts (`_rels/*.rels`). These helpers read parts, resolve
//! relationship targets and pull attributes off `quick-xml` events.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{ConvertError, Result};

/// An opened OOXML package over in-memory bytes.
pub struct Package<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
}

impl<'a> Package<'a> {
    pub fn open(bytes: &'a [u8]) -> Result<Self> {
        Ok(Self {
            archive: ZipArchive::new(Cursor::new(bytes))?,
        })
    }

    /// Read a part as UTF-8 text. `Ok(None)` when the part does not exist.
    pub fn read_text(&mut self, name: &str) -> Result<Option<String>> {
        let Some(bytes) = self.read_bytes(name)? else {
            return Ok(None);
        };
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e).into())
    }

    /// Read a part as raw bytes. `Ok(None)` when the part does not exist.
    pub fn read_bytes(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        let name = name.trim_start_matches('/');
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut out = Vec::new();
        file.read_to_end(&mut out)?;
        Ok(Some(out))
    }

    /// Read a part that must exist.
    pub fn require_text(&mut self, name: &str) -> Result<String> {
        self.read_text(name)?
            .ok_or_else(|| ConvertError::MissingPart(name.to_string()))
    }

    /// Locate the main document part through the package relationships,
    /// falling back to the conventional name.
    pub fn main_part(&mut self, fallback: &str) -> Result<String> {
        let Some(rels_xml) = self.read_text("_rels/.rels")? else {
            return Ok(fallback.to_string());
        };
        let rels = parse_relationships(&rels_xml)?;
        Ok(rels
            .values()
            .find(|r| r.kind.ends_with("/officeDocument"))
            .map_or_else(|| fallback.to_string(), |r| resolve_target("", &r.target)))
    }

    /// Relationships of `part` (e.g. `word/document.xml` →
    /// `word/_rels/document.xml.rels`). Empty when the part has none.
    pub fn relationships(&mut self, part: &str) -> Result<HashMap<String, Relationship>> {
        let (dir, file) = split_part(part);
        let rels_name = if dir.is_empty() {
            format!("_rels/{file}.rels")
        } else {
            format!("{dir}/_rels/{file}.rels")
        };
        match self.read_text(&rels_name)? {
            Some(xml) => parse_relationships(&xml),
            None => Ok(HashMap::new()),
        }
    }
}

/// One `<Relationship>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub target: String,
    /// Full relationship type URI.
    pub kind: String,
    /// `TargetMode="External"` (hyperlinks).
    pub external: bool,
}

/// Parse a `.rels` part into `Id → Relationship`.
pub fn parse_relationships(xml: &str) -> Result<HashMap<String, Relationship>> {
    let mut reader = Reader::from_str(xml);
    let mut rels = HashMap::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let (Some(id), Some(target)) = (attr(&e, b"Id"), attr(&e, b"Target")) else {
                    continue;
                };
                rels.insert(
                    id,
                    Relationship {
                        target,
                        kind: attr(&e, b"Type").unwrap_or_default(),
                        external: attr(&e, b"TargetMode").is_some_and(|m| m == "External"),
                    },
                );
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(rels)
}

/// Resolve a relationship target against the directory of its source part.
///
/// Absolute targets (`/xl/worksheets/sheet1.xml`) are package-rooted;
/// relative ones may climb with `..`.
pub fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Split `word/document.xml` into (`word`, `document.xml`).
pub fn split_part(part: &str) -> (&str, &str) {
    let part = part.trim_start_matches('/');
    part.rsplit_once('/').unwrap_or(("", part))
}

/// Value of the attribute whose local name is `local`, ignoring the
/// namespace prefix (`w:val`, `r:id`, ...).
pub fn attr(e: &BytesStart<'_>, local: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(std::result::Result::ok)
        .find(|a| a.key.local_name().as_ref() == local)
        .and_then(|a| a.unescape_value().ok().map(std::borrow::Cow::into_owned))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
  <Relationship Id="rId9" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/?a=1&amp;b=2" TargetMode="External"/>
</Relationships>"#;

    #[test]
    fn parses_relationships() {
        let rels = parse_relationships(RELS).unwrap();
        assert_eq!(rels.len(), 2);
        assert_eq!(rels["rId1"].target, "worksheets/sheet1.xml");
        assert!(!rels["rId1"].external);
        assert_eq!(rels["rId9"].target, "https://example.com/?a=1&b=2");
        assert!(rels["rId9"].external);
    }

    #[test]
    fn resolves_targets() {
        assert_eq!(resolve_target("xl", "worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
        assert_eq!(resolve_target("xl", "/xl/worksheets/sheet2.xml"), "xl/worksheets/sheet2.xml");
        assert_eq!(resolve_target("word/glossary", "../media/image1.png"), "word/media/image1.png");
        assert_eq!(resolve_target("", "word/document.xml"), "word/document.xml");
    }

    #[test]
    fn splits_part_names() {
        assert_eq!(split_part("word/document.xml"), ("word", "document.xml"));
        assert_eq!(split_part("/xl/workbook.xml"), ("xl", "workbook.xml"));
        assert_eq!(split_part("file.xml"), ("", "file.xml"));
    }

    #[test]
    fn not_a_zip_is_archive_error() {
        let err = Package::open(b"plain text").err().unwrap();
        assert!(matches!(err, ConvertError::Archive(_)));
    }
}
