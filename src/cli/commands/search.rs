//! Implementation of the `fooddb search` command.

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};

use super::AppContext;
use crate::domain::models::{Config, SearchHit};
use crate::services::SearchService;

#[derive(Args)]
pub struct SearchArgs {
    /// Text to search for (e.g. "high protein breakfast")
    pub query: String,

    /// Maximum number of results to return
    #[arg(long, short = 'k', default_value_t = 10)]
    pub limit: usize,
}

pub async fn execute(args: SearchArgs, config: Config, json: bool) -> Result<()> {
    let ctx = AppContext::build(&config).await?;

    let service = SearchService::new(ctx.provider.clone(), ctx.index.clone(), ctx.records.clone());
    let hits = service
        .search(&args.query, args.limit)
        .await
        .context("Search failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    if hits.is_empty() {
        println!("No results found for '{}'.", args.query);
        return Ok(());
    }

    println!("{} results for '{}':\n", hits.len(), args.query);
    println!("{}", format_hits_table(&hits));

    Ok(())
}

fn format_hits_table(hits: &[SearchHit]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            ["ID", "SIMILARITY", "DESCRIPTION"]
                .iter()
                .map(|h| Cell::new(h).set_alignment(CellAlignment::Left)),
        );

    for hit in hits {
        table.add_row(vec![
            Cell::new(hit.fdc_id),
            Cell::new(hit.similarity_pct()),
            Cell::new(&hit.description),
        ]);
    }

    table
}
