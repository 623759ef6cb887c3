mod args;
mod bulk;
mod proxy;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use mailverify::{to_public_result, verify, Config};
use tracing_subscriber::EnvFilter;

use args::Cli;
use proxy::build_proxy;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let Some(target) = cli.target.clone() else {
        eprintln!("usage: mailverify-cli <email | path-to-address-list>");
        return ExitCode::from(1);
    };

    let config = Config::default();

    if Path::new(&target).is_file() {
        return match bulk::run(&cli, Path::new(&target), &config).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{}", error_json(&e));
                ExitCode::from(1)
            }
        };
    }

    let proxy = match build_proxy(&cli) {
        Ok(proxy) => proxy,
        Err(e) => {
            eprintln!("{}", error_json(&e));
            return ExitCode::from(1);
        }
    };

    let verdict = verify(&target, proxy.as_ref(), &config).await;
    let result = to_public_result(&verdict);
    match serde_json::to_string_pretty(&result) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", error_json(&e.into()));
            ExitCode::from(1)
        }
    }
}

/// `{ error, can_connect_smtp: false, is_deliverable: false }`, on a
/// catastrophic failure outside the verification pipeline itself
/// (§6 CLI — single verification).
fn error_json(err: &anyhow::Error) -> String {
    serde_json::json!({
        "error": err.to_string(),
        "can_connect_smtp": false,
        "is_deliverable": false,
    })
    .to_string()
}
