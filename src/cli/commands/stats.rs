//! Implementation of the `fooddb stats` command.

use anyhow::{Context, Result};

use super::AppContext;
use crate::domain::models::Config;
use crate::domain::ports::{RecordSource, VectorIndex};

pub async fn execute(config: &Config, json: bool) -> Result<()> {
    let ctx = AppContext::build(config).await?;

    let total = ctx
        .records
        .count_total()
        .await
        .context("Failed to count food records; has the food data been imported?")?;

    // Before `init` there is no embedding schema; report everything missing.
    let (embedded, missing, dimension) = match ctx.index.configured_dimension().await? {
        Some(dimension) => {
            let embedded = ctx.index.count().await?;
            let missing = ctx.records.count_missing().await?;
            (embedded, missing, Some(dimension))
        }
        None => (0, total, None),
    };

    if json {
        let payload = serde_json::json!({
            "total_records": total,
            "embedded": embedded,
            "missing": missing,
            "dimension": dimension,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("Food records:  {total}");
        println!("Embedded:      {embedded}");
        println!("Missing:       {missing}");
        match dimension {
            Some(d) => println!("Dimension:     {d}"),
            None => println!("Dimension:     (schema not initialized, run `fooddb init`)"),
        }
    }

    Ok(())
}
