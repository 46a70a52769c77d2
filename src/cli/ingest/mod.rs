//! Ingest command - one-shot graph and index build for a document

use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::logging;

#[derive(Args)]
pub struct IngestArgs {
    /// URL of the policy document to ingest
    pub url: String,

    /// Rebuild even if a persisted snapshot already exists
    #[arg(long)]
    pub force: bool,
}

/// Fetch, segment and index a document, then print its statistics
pub async fn run(args: IngestArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging);

    let state = crate::create_app_state_with_config(&config).await?;

    let status = if args.force {
        state.query_service.rebuild(&args.url).await?
    } else {
        match state.query_service.status(&args.url).await {
            Ok(status) => {
                info!(url = %args.url, "Document already ingested, pass --force to rebuild");
                status
            }
            Err(_) => state.query_service.rebuild(&args.url).await?,
        }
    };

    info!(
        url = %args.url,
        clauses = status.clause_count,
        edges = status.edge_count,
        dimension = ?status.dimension,
        "Ingestion complete"
    );
    println!("{}", serde_json::to_string_pretty(&status)?);

    Ok(())
}
