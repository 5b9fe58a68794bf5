use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};

use docshift::Source;

/// Write `text` to `output`, or to stdout when no file is given.
pub fn write_output(text: &str, output: Option<PathBuf>) -> Result<()> {
    if let Some(path) = output {
        fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("💾 Saved {} bytes to {}", text.len(), path.display());
        return Ok(());
    }

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    if !text.is_empty() && !text.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    Ok(())
}

/// `--name` when given, else the last segment of the source.
pub fn display_name(source: &str, name: Option<&str>) -> String {
    name.map(str::to_string)
        .or_else(|| Source::parse(source).file_name())
        .unwrap_or_else(|| source.to_string())
}
