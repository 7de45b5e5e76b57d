use anyhow::{Context, bail};

use svcdeck_core::backend::Backend;
use svcdeck_core::model::ControlAction;

pub async fn run_control(
    backend: &dyn Backend,
    name: &str,
    action: ControlAction,
) -> anyhow::Result<()> {
    println!("Sending {} signal to {}...", action, name);
    match backend.control(name, action).await {
        Ok(message) => {
            println!("  \x1b[32m✓\x1b[0m {}: {}", name, message);
            Ok(())
        }
        Err(e) => bail!(e.notice_text()),
    }
}

pub async fn run_logs(backend: &dyn Backend, name: &str) -> anyhow::Result<()> {
    let bundle = backend
        .logs(name)
        .await
        .with_context(|| format!("failed to load logs for {}", name))?;
    println!("{}", bundle.text);
    Ok(())
}
