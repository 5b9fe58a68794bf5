//! Type-aware document conversion to Markdown.
//!
//! Routes a document to the converter for its declared type. Each
//! converter implements [`Converter`] to turn raw bytes into Markdown.
//!
//! # Routing
//!
//! The routing key is `lowercase(file_type ?? extension of file_name)`.
//! Converters are tried in order and the first whose predicate matches
//! wins:
//!
//! | Order | Predicate | Converter | Feature Flag |
//! |-------|-----------|-----------|-------------|
//! | 1 | contains `pdf` | [`pdf::PdfConverter`] | `pdf` |
//! | 2 | contains `doc` | [`docx::DocxConverter`] | always |
//! | 3 | contains `xls` | [`xlsx::XlsxConverter`] | always |
//! | - | no match | [`unsupported_stub`] | always |
//!
//! # Example
//!
//! ```rust
//! use docshift::content::ConverterRouter;
//!
//! let router = ConverterRouter::new();
//! let result = router.convert_bytes(b"\x89PNG", "logo.png", Some("image/png")).unwrap();
//! assert!(result.markdown.starts_with("# Unsupported file type"));
//! ```

pub mod docx;
pub mod html;
pub mod layout;
pub mod ooxml;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod table;
#[cfg(test)]
pub(crate) mod test_support;
pub mod xlsx;

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::error::Result;
use crate::http_client::FetchClient;

/// Metadata about a content conversion result.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    /// The converted markdown content.
    pub markdown: String,
    /// Name of the converter that produced it (`"unsupported"` for the stub).
    pub converter: String,
    /// Number of pages (for paginated formats like PDF).
    pub page_count: Option<usize>,
    /// Conversion time in milliseconds.
    pub elapsed_ms: f64,
}

/// Converts document bytes into markdown.
///
/// Implementations are stateless apart from their options and are
/// synchronous. The router runs them inside `tokio::task::spawn_blocking`
/// when converting fetched sources.
pub trait Converter: Send + Sync {
    /// Short name used in logs and results (e.g., `"docx"`).
    fn name(&self) -> &'static str;

    /// Routing predicate over the lowercased type/extension.
    fn matches(&self, extension: &str) -> bool;

    /// Convert raw document bytes to markdown.
    fn to_markdown(&self, bytes: &[u8]) -> Result<ConversionResult>;
}

/// Compute the routing key for a document.
///
/// A declared type always wins, even an empty one; only an absent type
/// falls back to the text after the last `.` of the file name (the whole
/// name if it has none).
pub fn resolve_extension(file_name: &str, file_type: Option<&str>) -> String {
    file_type
        .unwrap_or_else(|| file_name.rsplit('.').next().unwrap_or(file_name))
        .to_lowercase()
}

/// Markdown returned for documents no converter accepts.
pub fn unsupported_stub(file_name: &str, file_type: Option<&str>) -> String {
    let declared = file_type
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("unknown");
    format!(
        "# Unsupported file type\n\nCannot convert **{}** ({declared}) to Markdown.\n",
        file_name.replace('*', "\\*")
    )
}

/// Routes documents to the first matching [`Converter`].
///
/// Dispatch is O(n) over registered converters, evaluated in
/// registration order.
#[derive(Clone)]
pub struct ConverterRouter {
    converters: Vec<Arc<dyn Converter>>,
}

impl ConverterRouter {
    /// Create a router with all available converters and default options.
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    /// Create a router whose converters use the given config.
    ///
    /// PDF converter is included only when the `pdf` feature flag is enabled.
    pub fn with_config(config: &Config) -> Self {
        let mut converters: Vec<Arc<dyn Converter>> = Vec::with_capacity(3);
        #[cfg(feature = "pdf")]
        converters.push(Arc::new(pdf::PdfConverter::new(config.pdf)));
        converters.push(Arc::new(docx::DocxConverter::new(config.docx)));
        converters.push(Arc::new(xlsx::XlsxConverter));

        Self { converters }
    }

    /// Create a router from an explicit ordered converter list.
    pub fn from_converters(converters: Vec<Arc<dyn Converter>>) -> Self {
        Self { converters }
    }

    /// Names of the registered converters, in priority order.
    pub fn converter_names(&self) -> Vec<&'static str> {
        self.converters.iter().map(|c| c.name()).collect()
    }

    /// First converter whose predicate accepts `extension`.
    pub fn route(&self, extension: &str) -> Option<Arc<dyn Converter>> {
        self.converters
            .iter()
            .find(|c| c.matches(extension))
            .cloned()
    }

    /// Convert bytes that are already in memory.
    pub fn convert_bytes(
        &self,
        bytes: &[u8],
        file_name: &str,
        file_type: Option<&str>,
    ) -> Result<ConversionResult> {
        let extension = resolve_extension(file_name, file_type);
        match self.route(&extension) {
            Some(converter) => {
                debug!(converter = converter.name(), %extension, "routing document");
                converter.to_markdown(bytes)
            }
            None => Ok(stub_result(file_name, file_type)),
        }
    }

    /// Fetch a source and convert it.
    ///
    /// The source is fetched once whatever its type, so transport and
    /// HTTP status failures propagate even for unsupported types. The
    /// converter then runs on the blocking pool; types no converter
    /// accepts are answered with the stub.
    #[instrument(skip(self, client), fields(converter = tracing::field::Empty))]
    pub async fn convert_source(
        &self,
        client: &FetchClient,
        source: &str,
        file_name: &str,
        file_type: Option<&str>,
    ) -> Result<ConversionResult> {
        let extension = resolve_extension(file_name, file_type);
        let bytes = client.fetch_bytes(source).await?;

        let Some(converter) = self.route(&extension) else {
            info!(%extension, bytes = bytes.len(), "unsupported file type");
            return Ok(stub_result(file_name, file_type));
        };
        tracing::Span::current().record("converter", converter.name());

        let result =
            tokio::task::spawn_blocking(move || converter.to_markdown(&bytes)).await??;

        info!(
            chars = result.markdown.len(),
            pages = ?result.page_count,
            elapsed_ms = result.elapsed_ms,
            "converted"
        );
        Ok(result)
    }
}

impl Default for ConverterRouter {
    fn default() -> Self {
        Self::new()
    }
}

fn stub_result(file_name: &str, file_type: Option<&str>) -> ConversionResult {
    let start = Instant::now();
    ConversionResult {
        markdown: unsupported_stub(file_name, file_type),
        converter: "unsupported".to_string(),
        page_count: None,
        elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_prefers_declared_type() {
        assert_eq!(
            resolve_extension("report.pdf", Some("Application/VND.ms-excel")),
            "application/vnd.ms-excel"
        );
    }

    #[test]
    fn extension_falls_back_to_file_name() {
        assert_eq!(resolve_extension("Pricing.Final.XLSX", None), "xlsx");
        assert_eq!(resolve_extension("README", None), "readme");
    }

    #[test]
    fn empty_declared_type_does_not_fall_back() {
        assert_eq!(resolve_extension("Pricing.xlsx", Some("")), "");
        let result = ConverterRouter::new()
            .convert_bytes(b"PK", "Pricing.xlsx", Some(""))
            .unwrap();
        assert_eq!(result.converter, "unsupported");
        assert!(result.markdown.contains("**Pricing.xlsx** (unknown)"));
    }

    #[test]
    fn router_order_is_pdf_docx_xlsx() {
        let router = ConverterRouter::new();
        #[cfg(feature = "pdf")]
        assert_eq!(router.converter_names(), vec!["pdf", "docx", "xlsx"]);
        #[cfg(not(feature = "pdf"))]
        assert_eq!(router.converter_names(), vec!["docx", "xlsx"]);
    }

    #[test]
    fn router_routes_by_substring() {
        let router = ConverterRouter::new();
        let name = |ext: &str| router.route(ext).map(|c| c.name());
        assert_eq!(name("docx"), Some("docx"));
        assert_eq!(name("doc"), Some("docx"));
        assert_eq!(
            name("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
            Some("docx")
        );
        assert_eq!(name("xlsx"), Some("xlsx"));
        // OOXML spreadsheet MIME contains "officedocument", so "doc" wins
        assert_eq!(
            name("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
            Some("docx")
        );
        assert_eq!(name("application/vnd.ms-excel"), None);
        assert_eq!(name("image/png"), None);
        #[cfg(feature = "pdf")]
        assert_eq!(name("application/pdf"), Some("pdf"));
    }

    #[test]
    fn first_match_wins() {
        // "pdf.docx" contains both "pdf" and "doc"
        let router = ConverterRouter::new();
        let first = router.route("pdf.docx").map(|c| c.name());
        #[cfg(feature = "pdf")]
        assert_eq!(first, Some("pdf"));
        #[cfg(not(feature = "pdf"))]
        assert_eq!(first, Some("docx"));
    }

    #[test]
    fn unsupported_type_yields_stub() {
        let router = ConverterRouter::new();
        let result = router
            .convert_bytes(b"\x89PNG\r\n", "site-photo.png", Some("image/png"))
            .unwrap();
        assert!(result.markdown.contains("# Unsupported file type"));
        assert!(result.markdown.contains("site-photo.png"));
        assert!(result.markdown.contains("image/png"));
        assert_eq!(result.converter, "unsupported");
    }

    #[test]
    fn stub_without_type_says_unknown() {
        let stub = unsupported_stub("notes", None);
        assert_eq!(
            stub,
            "# Unsupported file type\n\nCannot convert **notes** (unknown) to Markdown.\n"
        );
    }

    #[test]
    fn corrupt_docx_is_an_error() {
        let router = ConverterRouter::new();
        assert!(router.convert_bytes(b"not a zip", "rfp.docx", None).is_err());
    }

    struct Echo;

    impl Converter for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn matches(&self, extension: &str) -> bool {
            extension == "txt"
        }

        fn to_markdown(&self, bytes: &[u8]) -> Result<ConversionResult> {
            Ok(ConversionResult {
                markdown: String::from_utf8_lossy(bytes).into_owned(),
                converter: self.name().to_string(),
                page_count: None,
                elapsed_ms: 0.0,
            })
        }
    }

    #[test]
    fn custom_converter_list() {
        let router = ConverterRouter::from_converters(vec![Arc::new(Echo)]);
        let result = router.convert_bytes(b"hello", "a.txt", None).unwrap();
        assert_eq!(result.markdown, "hello");
        let result = router.convert_bytes(b"hello", "a.docx", None).unwrap();
        assert_eq!(result.converter, "unsupported");
    }

    #[tokio::test]
    async fn unsupported_source_is_still_fetched() {
        let router = ConverterRouter::new();
        let client = FetchClient::new().unwrap();
        let err = router
            .convert_source(&client, "/no/such/file.png", "file.png", None)
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::ConvertError::Io(_)));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        std::fs::write(&path, b"\x89PNG").unwrap();
        let result = router
            .convert_source(&client, path.to_str().unwrap(), "logo.png", None)
            .await
            .unwrap();
        assert!(result.markdown.contains("# Unsupported file type"));
        assert_eq!(result.converter, "unsupported");
    }
}
