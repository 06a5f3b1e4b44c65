pub mod batch;
pub mod exec;
pub mod health;
pub mod introspect;

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// Read wire input from a file, the argument itself, or stdin
pub(crate) fn read_input(inline: Option<String>, file: Option<&PathBuf>) -> Result<String> {
    if let Some(path) = file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }
    match inline {
        Some(raw) if raw != "-" => Ok(raw),
        _ => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read stdin")?;
            Ok(raw)
        }
    }
}

pub(crate) fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let rendered = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{rendered}");
    Ok(())
}

/// Token cancelled on Ctrl-C
pub(crate) fn interrupt_token() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!(component = module_path!(), op = "interrupt", "cancelling dispatch");
            trigger.cancel();
        }
    });
    token
}
