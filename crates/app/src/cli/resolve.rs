use std::{fs, io};

use clap::Args;
use promo_engine::context::SearchRequest;

use super::SourceArgs;

#[derive(Debug, Args)]
pub(crate) struct ResolveArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// JSON file holding the search request
    #[arg(long)]
    request: String,
}

pub(crate) async fn run(args: ResolveArgs) -> Result<(), String> {
    let raw = fs::read_to_string(&args.request)
        .map_err(|error| format!("failed to read {}: {error}", args.request))?;

    let request: SearchRequest = serde_json::from_str(&raw)
        .map_err(|error| format!("invalid search request: {error}"))?;

    let ctx = args.source.context().await?;

    let resolution = ctx.promotions.search_promos(&request).await;

    resolution
        .write_to(io::stdout().lock())
        .map_err(|error| format!("failed to print resolution: {error}"))
}
