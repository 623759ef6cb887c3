use std::path::Path;

use futures::stream::{self, StreamExt};
use mailverify::{to_public_result, verify, Config};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::proxy::build_proxy;
use crate::Cli;

#[derive(Serialize)]
#[serde(untagged)]
enum Row {
    Ok {
        email: String,
        #[serde(flatten)]
        result: Value,
    },
    Err {
        email: String,
        error: String,
    },
}

/// Verifies every `@`-containing line of `path` in batches of the
/// configured concurrency and writes `results.json` (§6 Bulk verification).
pub async fn run(cli: &Cli, path: &Path, config: &Config) -> anyhow::Result<()> {
    let contents = tokio::fs::read_to_string(path).await?;
    let addresses: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|line| line.contains('@'))
        .map(str::to_string)
        .collect();

    info!(count = addresses.len(), "starting bulk verification");

    let proxy = build_proxy(cli)?;
    let concurrency = config.clamp_concurrency(cli.concurrency);

    let rows: Vec<Row> = stream::iter(addresses.into_iter().enumerate())
        .map(|(idx, email)| {
            let config = config.clone();
            let proxy = proxy.clone();
            async move {
                info!(idx, %email, "verifying");
                let task_email = email.clone();
                let handle = tokio::spawn(async move {
                    let verdict = verify(&task_email, proxy.as_ref(), &config).await;
                    to_public_result(&verdict)
                });
                match handle.await {
                    Ok(result) => Row::Ok {
                        email,
                        result: serde_json::to_value(result).unwrap_or(Value::Null),
                    },
                    Err(join_err) => Row::Err {
                        email,
                        error: join_err.to_string(),
                    },
                }
            }
        })
        .buffer_unordered(concurrency)
        .collect()
        .await;

    let json = serde_json::to_string_pretty(&rows)?;
    tokio::fs::write("results.json", json).await?;
    info!("wrote results.json");
    Ok(())
}
