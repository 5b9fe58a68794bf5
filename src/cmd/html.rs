use std::path::PathBuf;

use anyhow::{Context, Result};

use docshift::config::DocxOptions;
use docshift::content::docx::DocxConverter;
use docshift::{Config, FetchClient};

use super::output::write_output;

pub async fn cmd_html(
    config: &Config,
    source: &str,
    output: Option<PathBuf>,
    no_images: bool,
) -> Result<()> {
    let client = FetchClient::with_config(&config.fetch)?;
    let bytes = client
        .fetch_bytes(source)
        .await
        .with_context(|| format!("failed to fetch {source}"))?;

    let options = DocxOptions {
        inline_images: config.docx.inline_images && !no_images,
    };
    let html = tokio::task::spawn_blocking(move || DocxConverter::new(options).to_html(&bytes))
        .await?
        .with_context(|| format!("failed to render {source}"))?;

    write_output(&html, output)
}
