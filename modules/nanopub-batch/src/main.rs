use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use nanopub_batch::runner::BatchRunner;
use nanopub_common::BatchConfig;

#[tokio::main]
async fn main() {
    let code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Fatal error: {e:#}");
            1
        }
    };
    std::process::exit(code);
}

async fn run() -> Result<i32> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("nanopub_batch=info".parse()?)
                .add_directive("nanopub_client=info".parse()?),
        )
        .init();

    info!("Nanopub batch processor starting...");

    // Load config
    let config = BatchConfig::from_env();
    info!(
        batch_id = config.batch_id.as_str(),
        records = config.urls.len(),
        out_dir = %config.out_dir.display(),
        "Configuration loaded"
    );

    let runner = BatchRunner::new(config);
    let summary = runner.run().await?;
    info!("{summary}");

    Ok(summary.exit_code())
}
