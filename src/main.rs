use anyhow::Result;
use script2stage::core::config::Config;
use script2stage::core::io::NativeStorage;
use script2stage::services::workflow::WorkflowManager;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    // 1. Load config (optionally from the path given as first argument)
    let loaded = match std::env::args().nth(1) {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = match loaded {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            eprintln!("Please ensure 'config.yml' exists (an empty file uses all defaults).");
            return Err(e);
        }
    };

    config.ensure_directories()?;

    // 2. Parse every pending script in the input folder
    let storage = Arc::new(NativeStorage::new());
    let mut manager = WorkflowManager::new(config, storage).await?;
    let summary = manager.run().await?;

    println!(
        "Done: {} parsed, {} skipped, {} failed.",
        summary.parsed.len(),
        summary.skipped.len(),
        summary.failed.len()
    );
    for (file, reason) in &summary.failed {
        println!("  {}: {}", file, reason);
    }

    Ok(())
}
