use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::json;

use docshift::{in_order, markdown_to_blocks, Config, ConverterRouter, FetchClient};

use super::output::{display_name, write_output};

/// Document → Markdown → editor blocks in one step.
pub async fn cmd_import(
    config: &Config,
    source: &str,
    name: Option<&str>,
    file_type: Option<&str>,
    output: Option<PathBuf>,
) -> Result<()> {
    let client = FetchClient::with_config(&config.fetch)?;
    let router = ConverterRouter::with_config(config);
    let name = display_name(source, name);

    let result = router
        .convert_source(&client, source, &name, file_type)
        .await
        .with_context(|| format!("failed to convert {source}"))?;
    let blocks = markdown_to_blocks(&result.markdown);
    eprintln!(
        "📄 {name}: {} chars of Markdown → {} blocks ({})",
        result.markdown.len(),
        blocks.len(),
        result.converter
    );

    let value = json!({
        "name": name,
        "converter": result.converter,
        "blocks": blocks,
        "order": in_order(&blocks).iter().map(|b| b.id.as_str()).collect::<Vec<_>>(),
    });
    write_output(&serde_json::to_string_pretty(&value)?, output)
}
