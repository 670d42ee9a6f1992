//! Implementation of the `fooddb init` command.

use anyhow::{Context, Result};

use super::AppContext;
use crate::domain::models::Config;
use crate::domain::ports::VectorIndex;

pub async fn execute(config: &Config, json: bool) -> Result<()> {
    let ctx = AppContext::build(config).await?;

    ctx.index
        .ensure_schema(config.embedding.dimension)
        .await
        .context("Failed to initialize the embedding schema")?;

    if json {
        let payload = serde_json::json!({
            "database": config.database.path,
            "dimension": config.embedding.dimension,
            "model": config.embedding.model,
            "backend": format!("{:?}", ctx.index.backend()),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!(
            "Embedding schema ready at {} (dimension {}, model {}, backend {:?})",
            config.database.path,
            config.embedding.dimension,
            config.embedding.model,
            ctx.index.backend()
        );
    }

    Ok(())
}
