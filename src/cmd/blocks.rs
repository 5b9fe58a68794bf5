use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};

use docshift::markdown_to_blocks;

use super::output::write_output;

pub fn cmd_blocks(input: Option<&str>, output: Option<PathBuf>, compact: bool) -> Result<()> {
    let markdown = match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?
        }
    };

    let blocks = markdown_to_blocks(&markdown);
    let json = if compact {
        serde_json::to_string(&blocks)?
    } else {
        serde_json::to_string_pretty(&blocks)?
    };
    write_output(&json, output)
}
