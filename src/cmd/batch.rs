use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use serde_json::json;
use tokio::sync::Semaphore;

use docshift::{Config, ConverterRouter, FetchClient};

use super::output::display_name;

/// Convert every source independently with at most `parallel` in flight.
///
/// One JSON line per source is printed in input order. A failing source
/// does not stop the others; the command fails at the end if any did.
pub async fn cmd_batch(config: &Config, sources: Vec<String>, parallel: usize) -> Result<()> {
    let parallel = parallel.max(1);
    eprintln!("📦 Converting {} sources (concurrency: {parallel})", sources.len());

    let client = FetchClient::with_config(&config.fetch)?;
    let router = ConverterRouter::with_config(config);
    let semaphore = Arc::new(Semaphore::new(parallel));
    let total = sources.len();

    let handles: Vec<_> = sources
        .into_iter()
        .map(|source| {
            let semaphore = Arc::clone(&semaphore);
            let client = client.clone();
            let router = router.clone();
            tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return json!({ "source": source, "error": "semaphore closed" });
                };
                let start = Instant::now();
                let name = display_name(&source, None);

                match router.convert_source(&client, &source, &name, None).await {
                    Ok(result) => json!({
                        "source": source,
                        "converter": result.converter,
                        "chars": result.markdown.len(),
                        "page_count": result.page_count,
                        "elapsed_ms": start.elapsed().as_secs_f64() * 1000.0,
                    }),
                    Err(e) => json!({
                        "source": source,
                        "error": e.to_string(),
                        "elapsed_ms": start.elapsed().as_secs_f64() * 1000.0,
                    }),
                }
            })
        })
        .collect();

    let mut failed = 0;
    for result in futures::future::join_all(handles).await {
        let line = match result {
            Ok(line) => line,
            Err(e) => json!({ "error": format!("task failed: {e}") }),
        };
        if line.get("error").is_some() {
            failed += 1;
        }
        println!("{line}");
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {total} sources failed");
    }
    Ok(())
}
