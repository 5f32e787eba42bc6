use std::fs;

use anyhow::{Context, Result};
use devrang_engine::{
    db_types::{NewCustomer, NewProduct},
    traits::{CustomerManagement, ProductCatalog},
    CatalogApi,
    CustomerApi,
    SqliteDatabase,
};
use log::*;
use serde::Deserialize;

use crate::{formatting::format_seed_report, SeedParams};

/// The contents of a seed file. Both lists are optional.
#[derive(Debug, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub products: Vec<NewProduct>,
    #[serde(default)]
    pub customers: Vec<NewCustomer>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub products_added: usize,
    pub products_skipped: usize,
    pub customers_added: usize,
    pub customers_skipped: usize,
    /// Entries that failed validation
    pub rejected: usize,
}

pub async fn seed_database(url: &str, params: SeedParams) -> Result<()> {
    let contents = fs::read_to_string(&params.file).with_context(|| format!("Could not read {}", params.file))?;
    let seed: SeedFile = serde_json::from_str(&contents).with_context(|| format!("{} is not a seed file", params.file))?;
    let db = SqliteDatabase::new_with_url(url, 1).await.with_context(|| format!("Could not open {url}"))?;
    db.run_migrations().await.context("Could not migrate the database")?;
    let report = apply_seed(&db, seed, &params.created_by).await;
    db.close().await;
    println!("{}", format_seed_report(&report?));
    Ok(())
}

/// Adds every product whose name, and every customer whose phone number, is not in the database yet.
pub async fn apply_seed<B>(db: &B, seed: SeedFile, created_by: &str) -> Result<SeedReport>
where B: ProductCatalog + CustomerManagement + Clone {
    let mut report = SeedReport::default();
    let catalog = CatalogApi::new(db.clone());
    for product in seed.products {
        if db.fetch_product_by_name(&product.name).await?.is_some() {
            debug!("🌱️ {} is already in the catalog", product.name);
            report.products_skipped += 1;
            continue;
        }
        let name = product.name.clone();
        match catalog.add_product(product).await {
            Ok(p) => {
                info!("🌱️ Added product #{} ({})", p.id, p.name);
                report.products_added += 1;
            },
            Err(e) => {
                warn!("🌱️ Product '{name}' was not added. {e}");
                report.rejected += 1;
            },
        }
    }
    let customers = CustomerApi::new(db.clone());
    for customer in seed.customers {
        let phone = customer.phone.as_deref().map(str::trim).unwrap_or_default().to_string();
        if !phone.is_empty() && db.fetch_customer_by_phone(&phone).await?.is_some() {
            debug!("🌱️ A customer with phone {phone} already exists");
            report.customers_skipped += 1;
            continue;
        }
        match customers.create_customer(created_by, customer).await {
            Ok(c) => {
                info!("🌱️ Added customer #{} ({})", c.id, c.name);
                report.customers_added += 1;
            },
            Err(e) => {
                warn!("🌱️ Customer with phone '{phone}' was not added. {e}");
                report.rejected += 1;
            },
        }
    }
    Ok(report)
}
