//! `docshift` - document import and Markdown projection
//!
//! # Features
//!
//! - **Import**: DOCX, XLSX and PDF (feature `pdf`) to Markdown, routed by
//!   declared type or file extension
//! - **Preview**: DOCX to an HTML fragment with images inlined
//! - **Projection**: Markdown to id-keyed editor block records
//!
//! # Example
//!
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let markdown = docshift::convert_file_url_to_markdown(
//!         "https://files.example.com/rfq-2024-117.docx",
//!         "rfq-2024-117.docx",
//!         None,
//!     )
//!     .await?;
//!     let blocks = docshift::markdown_to_blocks(&markdown);
//!     println!("{} blocks", blocks.len());
//!     Ok(())
//! }
//! ```

pub mod blocks;
pub mod config;
pub mod content;
pub mod error;
pub mod http_client;
pub mod markdown;

pub use blocks::{in_order, markdown_to_blocks, Block, BlockMap, BlockType};
pub use config::Config;
pub use content::docx::{convert_docx_to_html, convert_docx_to_markdown};
pub use content::xlsx::convert_xlsx_to_markdown;
pub use content::{resolve_extension, unsupported_stub, ConversionResult, Converter, ConverterRouter};
pub use error::{ConvertError, Result};
pub use http_client::{FetchClient, Source};

/// Version of docshift
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fetch a document and convert it to Markdown.
///
/// The routing key is `file_type` when given, otherwise the extension of
/// `file_name`. The source is always fetched; unsupported types then
/// return the "Unsupported file type" stub.
pub async fn convert_file_url_to_markdown(
    url: &str,
    file_name: &str,
    file_type: Option<&str>,
) -> Result<String> {
    let client = FetchClient::new()?;
    let router = ConverterRouter::new();
    let result = router
        .convert_source(&client, url, file_name, file_type)
        .await?;
    Ok(result.markdown)
}

/// Fetch a PDF and convert it to Markdown.
#[cfg(feature = "pdf")]
pub async fn convert_pdf_to_markdown(url: &str) -> Result<String> {
    use content::pdf::PdfConverter;

    let client = FetchClient::new()?;
    let bytes = client.fetch_bytes(url).await?;
    let (markdown, _pages) =
        tokio::task::spawn_blocking(move || PdfConverter::default().convert(&bytes)).await??;
    Ok(markdown)
}
