use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::json;

use docshift::{Config, ConverterRouter, FetchClient};

use super::output::{display_name, write_output};
use crate::OutputFormat;

pub async fn cmd_convert(
    config: &Config,
    source: &str,
    name: Option<&str>,
    file_type: Option<&str>,
    output: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let client = FetchClient::with_config(&config.fetch)?;
    let router = ConverterRouter::with_config(config);
    let name = display_name(source, name);

    let result = router
        .convert_source(&client, source, &name, file_type)
        .await
        .with_context(|| format!("failed to convert {source}"))?;

    match format {
        OutputFormat::Markdown => write_output(&result.markdown, output),
        OutputFormat::Json => {
            let value = json!({
                "source": source,
                "name": name,
                "converter": result.converter,
                "page_count": result.page_count,
                "elapsed_ms": result.elapsed_ms,
                "markdown": result.markdown,
            });
            write_output(&serde_json::to_string_pretty(&value)?, output)
        }
    }
}
