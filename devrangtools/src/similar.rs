use anyhow::{anyhow, Context, Result};
use devrang_engine::{CatalogApi, SqliteDatabase};

use crate::{formatting::format_similar_products, SimilarParams};

pub async fn print_similar_products(url: &str, params: SimilarParams) -> Result<()> {
    let db = SqliteDatabase::new_with_url(url, 1).await.with_context(|| format!("Could not open {url}"))?;
    let api = CatalogApi::new(db.clone());
    let result = async {
        let product =
            api.product(params.product).await?.ok_or_else(|| anyhow!("Product {} does not exist", params.product))?;
        let similar = api.similar_products(params.product, params.limit).await?;
        Ok::<_, anyhow::Error>(format_similar_products(&product, &similar))
    }
    .await;
    db.close().await;
    println!("{}", result?);
    Ok(())
}
